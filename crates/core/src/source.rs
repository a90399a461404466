//! Source files - the spreadsheets documents are loaded from

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Separator between the parts of a source file name (`<prefix>_<date>_...`)
pub const NAME_SEPARATOR: char = '_';

/// A spreadsheet on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as it was listed
    pub path: PathBuf,

    /// Final path component
    pub file_name: String,
}

impl SourceFile {
    /// Create a source from a path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, file_name }
    }

    /// File name without its extension
    pub fn file_stem(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name.clone())
    }

    /// Second `_`-separated token of the full file name, if any.
    ///
    /// This is the raw positional token: for `news_2023-11-13.xlsx` it is
    /// `2023-11-13.xlsx`.
    pub fn raw_date_token(&self) -> Option<String> {
        second_token(&self.file_name)
    }

    /// Second `_`-separated token of the file stem, if any.
    pub fn stem_date_token(&self) -> Option<String> {
        second_token(&self.file_stem())
    }

    /// Extension, lowercased
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

fn second_token(name: &str) -> Option<String> {
    let mut parts = name.split(NAME_SEPARATOR);
    parts.next()?;
    parts.next().map(str::to_string)
}
