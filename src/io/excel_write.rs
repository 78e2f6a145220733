use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use crate::error::{ConversionError, Result};

/// Extension every written workbook carries.
pub const WORKBOOK_EXTENSION: &str = "xlsx";

/// Appends `.xlsx` to `path` unless it already ends with it (in any case).
///
/// Other extensions are kept, so `report.csv` becomes `report.csv.xlsx`.
pub fn normalize_output_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(ConversionError::InvalidArguments(
            "output path must not be empty".to_string(),
        ));
    }

    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(WORKBOOK_EXTENSION));
    if has_extension {
        return Ok(path.to_path_buf());
    }

    let mut normalized = path.as_os_str().to_os_string();
    normalized.push(".");
    normalized.push(WORKBOOK_EXTENSION);
    Ok(PathBuf::from(normalized))
}

/// Serializes the workbook and writes it to `path` in one write.
///
/// The archive is assembled in memory first so a serialization failure never
/// leaves a file behind.
pub fn write_workbook(path: &Path, workbook: &mut Workbook) -> Result<()> {
    let output_failure = |reason: String| ConversionError::OutputWrite {
        path: path.to_path_buf(),
        reason,
    };

    let buffer = workbook
        .save_to_buffer()
        .map_err(|error| output_failure(error.to_string()))?;
    fs::write(path, buffer).map_err(|error| output_failure(error.to_string()))?;
    Ok(())
}
