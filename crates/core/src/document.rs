//! Document types - one per source spreadsheet

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::SourceFile;

/// Metadata attached to a document and inherited by its chunks
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Source file name
    pub file_name: String,

    /// Date token parsed from the file name (`None` when the name has none)
    pub date_time: Option<String>,
}

impl DocumentMetadata {
    pub fn new(file_name: impl Into<String>, date_time: Option<String>) -> Self {
        Self {
            file_name: file_name.into(),
            date_time,
        }
    }

    /// Look up a metadata value by key name
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "file_name" => Some(self.file_name.as_str()),
            "date_time" => self.date_time.as_deref(),
            _ => None,
        }
    }
}

/// Text extracted from one spreadsheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Where the text came from
    pub source: SourceFile,

    /// The extracted text
    pub text: String,

    /// Empty until the normalizer runs
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document from loaded text
    pub fn new(source: SourceFile, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Builder pattern: set metadata
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Doc: {}", self.source.path.display())?;
        writeln!(f, "file_name: {}", self.metadata.file_name)?;
        writeln!(
            f,
            "date_time: {}",
            self.metadata.date_time.as_deref().unwrap_or("(none)")
        )?;
        write!(f, "Text: {}", self.text)
    }
}
