//! File descriptors: where a table lives and how to read it.
//!
//! A [`FileDescriptor`] pairs a plain path with [`ImportOptions`]. Native
//! files (`imported == false`) use the serialized table format; imported
//! files are delimited text governed by `has_header` and `delimiter`.

use crate::constants::DEFAULT_DELIMITER;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a file should be read and written
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Delimited text instead of the native format
    pub imported: bool,
    /// First record holds column names (delimited only)
    pub has_header: bool,
    /// Field separator (delimited only)
    pub delimiter: char,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            imported: false,
            has_header: true,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// A path plus the metadata needed to load it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    path: PathBuf,
    pub options: ImportOptions,
}

impl FileDescriptor {
    /// A file in the native table format
    pub fn native(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: ImportOptions::default(),
        }
    }

    /// A delimited text file
    pub fn delimited(path: impl Into<PathBuf>, has_header: bool, delimiter: char) -> Self {
        Self {
            path: path.into(),
            options: ImportOptions {
                imported: true,
                has_header,
                delimiter,
            },
        }
    }

    /// Guess options from the extension using built-in defaults.
    ///
    /// See [`FileDescriptor::from_path_with`].
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::from_path_with(path, &Settings::default())
    }

    /// Guess options from the extension.
    ///
    /// `.tsv` is tab separated, `.csv` comma separated, `.txt` uses the
    /// configured default delimiter. Anything else is read as a native file.
    pub fn from_path_with(path: impl Into<PathBuf>, settings: &Settings) -> Self {
        let path = path.into();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("tsv") => Self::delimited(path, settings.default_has_header, '\t'),
            Some("csv") => Self::delimited(path, settings.default_has_header, ','),
            Some("txt") => {
                Self::delimited(path, settings.default_has_header, settings.default_delimiter)
            }
            _ => Self::native(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn is_imported(&self) -> bool {
        self.options.imported
    }

    pub fn has_header(&self) -> bool {
        self.options.has_header
    }

    pub fn delimiter(&self) -> char {
        self.options.delimiter
    }

    pub fn with_imported(mut self, imported: bool) -> Self {
        self.options.imported = imported;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.options.has_header = has_header;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    /// Human-readable name (file stem)
    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Data")
            .to_string()
    }
}
