//! Core library for the csv-to-excel command line application.
//!
//! A conversion resolves a data source (one CSV file or a directory of them),
//! streams every file into its own sheet of a single workbook and writes the
//! workbook once at the end. Readers and writers live under [`io`], sheet
//! accumulation and naming in [`workbook`], and the end-to-end pipeline in
//! [`convert`].

pub mod convert;
pub mod error;
pub mod io;
pub mod logging;
pub mod workbook;

pub use convert::{ConversionReport, SkippedFile, build};
pub use error::{ConversionError, Result};
pub use workbook::{ConvertOptions, DuplicatePolicy, SheetSummary, WorkbookBuilder};
