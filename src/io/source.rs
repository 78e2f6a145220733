use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConversionError, Result};

/// The input of a conversion: one CSV file or a directory of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    /// Regular files found directly inside the directory, sorted by name.
    Directory { path: PathBuf, files: Vec<PathBuf> },
}

impl DataSource {
    /// Inspects `path` and lists the files a conversion will visit.
    ///
    /// Directories are not descended into. Entries that are not regular files
    /// (subdirectories, sockets, broken links) are left out.
    pub fn resolve(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|error| match error.kind() {
            std::io::ErrorKind::NotFound => ConversionError::SourceNotFound(path.to_path_buf()),
            _ => ConversionError::SourceUnreadable {
                path: path.to_path_buf(),
                reason: error.to_string(),
            },
        })?;

        if metadata.is_file() {
            return Ok(DataSource::File(path.to_path_buf()));
        }

        if !metadata.is_dir() {
            return Err(ConversionError::SourceUnreadable {
                path: path.to_path_buf(),
                reason: "not a regular file or directory".to_string(),
            });
        }

        let unreadable = |error: std::io::Error| ConversionError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: error.to_string(),
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(path).map_err(unreadable)? {
            let entry_path = entry.map_err(unreadable)?.path();
            if entry_path.is_file() {
                files.push(entry_path);
            } else {
                debug!(entry = %entry_path.display(), "skipping non-file directory entry");
            }
        }
        files.sort();

        Ok(DataSource::Directory {
            path: path.to_path_buf(),
            files,
        })
    }

    /// Files to convert, in processing order.
    pub fn files(&self) -> &[PathBuf] {
        match self {
            DataSource::File(path) => std::slice::from_ref(path),
            DataSource::Directory { files, .. } => files,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, DataSource::Directory { .. })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn directory_lists_sorted_files_and_skips_subdirectories() {
        let dir = tempdir().expect("temporary directory");
        fs::write(dir.path().join("b.csv"), "1\n").expect("file written");
        fs::write(dir.path().join("a.csv"), "1\n").expect("file written");
        fs::create_dir(dir.path().join("nested.csv")).expect("subdirectory created");

        let source = DataSource::resolve(dir.path()).expect("directory resolved");
        assert!(source.is_directory());
        let names: Vec<String> = source
            .files()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn single_file_resolves_to_itself() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join("only.csv");
        fs::write(&path, "x\n").expect("file written");

        let source = DataSource::resolve(&path).expect("file resolved");
        assert_eq!(source, DataSource::File(path.clone()));
        assert_eq!(source.files(), &[path]);
    }

    #[test]
    fn missing_path_is_reported() {
        let dir = tempdir().expect("temporary directory");
        let missing = dir.path().join("nope");
        let error = DataSource::resolve(&missing).expect_err("resolution should fail");
        assert!(matches!(error, ConversionError::SourceNotFound(path) if path == missing));
    }
}
