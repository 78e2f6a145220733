use std::fs::File;
use std::io::{Chain, Read};
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, StringRecord, Terminator};

use crate::error::{ConversionError, Result};

type Source = Chain<File, &'static [u8]>;

/// A parsed record and the number of blank lines found right before it.
pub struct CsvRecord<'a> {
    pub blank_lines_before: u64,
    pub fields: &'a StringRecord,
}

/// Streams the records of a comma separated file one at a time.
///
/// Only a single record is buffered, so arbitrarily large inputs can be
/// converted. Records may carry different field counts.
///
/// Records end at `\n`; a `\r` left at the end of the last field is dropped so
/// CRLF files read the same as LF ones. Blank lines are not records, but each
/// record reports how many preceded it so callers can keep line positions.
pub struct CsvRecords {
    path: PathBuf,
    reader: Reader<Source>,
    record: StringRecord,
}

impl CsvRecords {
    /// Opens the file at `path` for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|error| ConversionError::from_csv(path.to_path_buf(), error.into()))?;

        // A final newline makes every record terminated, so each one consumes
        // exactly one line beyond its embedded newlines.
        let reader = ReaderBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .flexible(true)
            .from_reader(file.chain(&b"\n"[..]));

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            record: StringRecord::new(),
        })
    }

    /// Advances to the next record, returning `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<CsvRecord<'_>>> {
        let line_before = self.reader.position().line();
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {}
            Ok(false) => return Ok(None),
            Err(error) => return Err(ConversionError::from_csv(self.path.clone(), error)),
        }
        strip_carriage_return(&mut self.record);

        let consumed = self.reader.position().line() - line_before;
        let embedded: u64 = self
            .record
            .iter()
            .map(|field| field.bytes().filter(|byte| *byte == b'\n').count() as u64)
            .sum();

        Ok(Some(CsvRecord {
            blank_lines_before: consumed.saturating_sub(embedded + 1),
            fields: &self.record,
        }))
    }
}

fn strip_carriage_return(record: &mut StringRecord) {
    let stripped = record
        .iter()
        .last()
        .and_then(|field| field.strip_suffix('\r'))
        .map(str::to_owned);
    if let Some(field) = stripped {
        record.truncate(record.len() - 1);
        record.push_field(&field);
    }
}
