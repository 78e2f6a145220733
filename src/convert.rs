use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::io::source::DataSource;
use crate::workbook::{ConvertOptions, SheetSummary, WorkbookBuilder};

/// Outcome of a conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Workbook path after extension normalization.
    pub output: PathBuf,
    pub sheets: Vec<SheetSummary>,
    /// Directory entries left out of the workbook and why.
    pub skipped: Vec<SkippedFile>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl ConversionReport {
    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Converts the CSV file or directory at `source` into a workbook at `output`.
///
/// A failure on a single file source is returned as is. For a directory, files
/// that fail are skipped and listed in the report; only a failure to list the
/// directory or to write the workbook aborts the run.
#[instrument(
    level = "info",
    skip_all,
    fields(source = %source.display(), output = %output.display())
)]
pub fn build(source: &Path, output: &Path, options: ConvertOptions) -> Result<ConversionReport> {
    let started = Instant::now();
    let data_source = DataSource::resolve(source)?;
    let mut builder = WorkbookBuilder::new(options);
    let mut skipped = Vec::new();

    if data_source.is_directory() {
        info!(file_count = data_source.files().len(), "converting directory");
        for file in data_source.files() {
            if let Err(error) = add_with_progress(&mut builder, file) {
                warn!(file = %file.display(), %error, "skipping file");
                skipped.push(SkippedFile {
                    path: file.clone(),
                    reason: error.to_string(),
                });
            }
        }
    } else {
        for file in data_source.files() {
            add_with_progress(&mut builder, file)?;
        }
    }

    if builder.sheets().is_empty() {
        warn!("no sheets were added; writing an empty workbook");
    }

    let sheets = builder.sheets().to_vec();
    let output = builder.save(output)?;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        output = %output.display(),
        sheet_count = sheets.len(),
        skipped_count = skipped.len(),
        elapsed_ms,
        "processing completed"
    );

    Ok(ConversionReport {
        output,
        sheets,
        skipped,
        elapsed_ms,
    })
}

fn add_with_progress(builder: &mut WorkbookBuilder, path: &Path) -> Result<()> {
    info!(file = %path.display(), "adding sheet");
    let summary = builder.add_file(path)?;
    info!(sheet = %summary.name, rows = summary.rows, "sheet added");
    Ok(())
}
