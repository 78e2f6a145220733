//! Accumulates CSV files as sheets of a single workbook.

pub mod naming;

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{ConversionError, Result};
use crate::io::csv_read::CsvRecords;
use crate::io::excel_write;
use naming::{SheetNameRegistry, sanitize_sheet_name, sheet_name_for};

/// What to do when a file maps onto a sheet name that is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Reject the file with [`ConversionError::DuplicateSheetName`].
    #[default]
    Error,
    /// Append `_1`, `_2`, ... until the name is free.
    Rename,
}

/// Runtime options for a conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub duplicate_policy: DuplicatePolicy,
}

/// Describes one sheet added to the workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub source: PathBuf,
    pub rows: u32,
    /// Widest row seen in the file.
    pub columns: u16,
}

/// Owns the in-progress workbook until it is saved.
pub struct WorkbookBuilder {
    workbook: Workbook,
    names: SheetNameRegistry,
    policy: DuplicatePolicy,
    sheets: Vec<SheetSummary>,
}

impl WorkbookBuilder {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            workbook: Workbook::new(),
            names: SheetNameRegistry::default(),
            policy: options.duplicate_policy,
            sheets: Vec::new(),
        }
    }

    /// Sheets added so far, in workbook order.
    pub fn sheets(&self) -> &[SheetSummary] {
        &self.sheets
    }

    /// Streams the CSV file at `path` into a new sheet named after the file.
    ///
    /// The sheet is only attached once every record has been written, so on
    /// error the workbook is left exactly as it was.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn add_file(&mut self, path: &Path) -> Result<&SheetSummary> {
        let name = self.resolve_name(path)?;
        let mut records = CsvRecords::open(path)?;

        let mut worksheet = Worksheet::new();
        worksheet.set_name(&name).map_err(|source| sheet_error(path, source))?;

        let mut rows: u32 = 0;
        let mut columns: u16 = 0;
        while let Some(record) = records.next_record()? {
            // Blank lines keep their place as empty rows.
            rows = u32::try_from(record.blank_lines_before)
                .ok()
                .and_then(|blank| rows.checked_add(blank))
                .ok_or_else(|| row_limit_error(path))?;

            let width = u16::try_from(record.fields.len()).map_err(|_| row_limit_error(path))?;
            for (col, field) in (0..width).zip(record.fields.iter()) {
                worksheet
                    .write_string(rows, col, field)
                    .map_err(|source| sheet_error(path, source))?;
            }
            columns = columns.max(width);
            rows = rows.checked_add(1).ok_or_else(|| row_limit_error(path))?;
        }

        self.names.claim(&name);
        self.workbook.push_worksheet(worksheet);
        debug!(sheet = %name, rows, columns, "sheet attached");

        self.sheets.push(SheetSummary {
            name,
            source: path.to_path_buf(),
            rows,
            columns,
        });
        Ok(&self.sheets[self.sheets.len() - 1])
    }

    /// Serializes the workbook to `output`, appending `.xlsx` when missing.
    /// Returns the path actually written.
    #[instrument(level = "debug", skip_all, fields(output = %output.display()))]
    pub fn save(mut self, output: &Path) -> Result<PathBuf> {
        let path = excel_write::normalize_output_path(output)?;
        excel_write::write_workbook(&path, &mut self.workbook)?;
        Ok(path)
    }

    fn resolve_name(&self, path: &Path) -> Result<String> {
        let name = sanitize_sheet_name(&sheet_name_for(path));
        if !self.names.contains(&name) {
            return Ok(name);
        }

        match self.policy {
            DuplicatePolicy::Error => Err(ConversionError::DuplicateSheetName {
                name,
                path: path.to_path_buf(),
            }),
            DuplicatePolicy::Rename => {
                let renamed = self.names.next_free(&name);
                debug!(original = %name, renamed = %renamed, "renamed duplicate sheet");
                Ok(renamed)
            }
        }
    }
}

fn sheet_error(path: &Path, source: rust_xlsxwriter::XlsxError) -> ConversionError {
    ConversionError::SheetWrite {
        path: path.to_path_buf(),
        source,
    }
}

fn row_limit_error(path: &Path) -> ConversionError {
    sheet_error(path, rust_xlsxwriter::XlsxError::RowColumnLimitError)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn write_csv(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::create_dir_all(dir).expect("directory created");
        fs::write(&path, contents).expect("csv written");
        path
    }

    #[test]
    fn add_file_reports_dimensions() {
        let dir = tempdir().expect("temporary directory");
        let path = write_csv(dir.path(), "sales.csv", b"Name,Amount\nAlice,10\nBob,20,extra\n");

        let mut builder = WorkbookBuilder::new(ConvertOptions::default());
        let summary = builder.add_file(&path).expect("file added").clone();

        assert_eq!(summary.name, "sales");
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 3);
        assert_eq!(builder.sheets(), &[summary]);
    }

    #[test]
    fn blank_lines_keep_row_positions() {
        let dir = tempdir().expect("temporary directory");
        let path = write_csv(dir.path(), "gap.csv", b"a,b\n\nc,d\n");

        let mut builder = WorkbookBuilder::new(ConvertOptions::default());
        let summary = builder.add_file(&path).expect("file added");

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 2);
    }

    #[test]
    fn oversized_cell_is_a_sheet_write_error() {
        let dir = tempdir().expect("temporary directory");
        let mut contents = b"id,text\n1,".to_vec();
        contents.resize(contents.len() + 40_000, b'x');
        contents.push(b'\n');
        let path = write_csv(dir.path(), "big.csv", &contents);

        let mut builder = WorkbookBuilder::new(ConvertOptions::default());
        let error = builder.add_file(&path).expect_err("cell limit enforced");

        assert!(matches!(
            error,
            ConversionError::SheetWrite {
                source: rust_xlsxwriter::XlsxError::MaxStringLengthExceeded,
                ..
            }
        ));
        assert!(builder.sheets().is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected_by_default() {
        let dir = tempdir().expect("temporary directory");
        let lower = write_csv(&dir.path().join("a"), "data.csv", b"a\n");
        let upper = write_csv(&dir.path().join("b"), "DATA.CSV", b"b\n");

        let mut builder = WorkbookBuilder::new(ConvertOptions::default());
        builder.add_file(&lower).expect("first file added");
        let error = builder.add_file(&upper).expect_err("duplicate rejected");

        assert!(matches!(error, ConversionError::DuplicateSheetName { ref name, .. } if name == "DATA"));
        assert_eq!(builder.sheets().len(), 1);
    }

    #[test]
    fn duplicate_names_are_suffixed_under_rename_policy() {
        let dir = tempdir().expect("temporary directory");
        let first = write_csv(&dir.path().join("a"), "data.csv", b"a\n");
        let second = write_csv(&dir.path().join("b"), "data.CSV", b"b\n");
        let third = write_csv(&dir.path().join("c"), "Data.csv", b"c\n");

        let mut builder = WorkbookBuilder::new(ConvertOptions {
            duplicate_policy: DuplicatePolicy::Rename,
        });
        for path in [&first, &second, &third] {
            builder.add_file(path).expect("file added");
        }

        let names: Vec<&str> = builder.sheets().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["data", "data_1", "Data_2"]);
    }

    #[test]
    fn failed_file_does_not_claim_its_name() {
        let dir = tempdir().expect("temporary directory");
        let broken = write_csv(dir.path(), "report.csv", b"ok\n\xff\xfe\n");
        let mut builder = WorkbookBuilder::new(ConvertOptions::default());

        let error = builder.add_file(&broken).expect_err("invalid UTF-8 rejected");
        assert!(matches!(error, ConversionError::Encoding { .. }));
        assert!(builder.sheets().is_empty());

        let fixed = write_csv(&dir.path().join("sub"), "report.csv", b"ok\n");
        builder.add_file(&fixed).expect("same name is still free");
        assert_eq!(builder.sheets()[0].name, "report");
    }

    #[test]
    fn save_appends_extension() {
        let dir = tempdir().expect("temporary directory");
        let path = write_csv(dir.path(), "one.csv", b"x,y\n");
        let mut builder = WorkbookBuilder::new(ConvertOptions::default());
        builder.add_file(&path).expect("file added");

        let written = builder.save(&dir.path().join("bundle")).expect("workbook saved");
        assert_eq!(written, dir.path().join("bundle.xlsx"));
        assert!(written.is_file());
    }
}
