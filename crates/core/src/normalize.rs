//! Metadata normalization - date extraction and chat-template cleanup

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::{Document, DocumentMetadata};
use crate::error::{CoreError, Result};

/// Chat-template markers removed from document text, in removal order
pub const CHAT_TEMPLATE_MARKERS: [&str; 5] = ["<|system|>", "<|user|>", "<|assistant|>", "</s>", "<s>"];

/// Expected shape of the date token
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How the date token is derived from a file name
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Second token of the file stem, must parse as `YYYY-MM-DD`
    #[default]
    Strict,
    /// Second token of the file name taken verbatim, `None` if absent
    Lenient,
}

/// Remove every chat-template marker from `text`
pub fn strip_markers(text: &str) -> String {
    CHAT_TEMPLATE_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
}

/// `token` rendered as zero-padded `YYYY-MM-DD`, if it parses as a date
pub fn canonical_date(token: &str) -> std::result::Result<String, chrono::ParseError> {
    NaiveDate::parse_from_str(token, DATE_FORMAT).map(|date| date.format(DATE_FORMAT).to_string())
}

/// Derive the date token for a document under `policy`
pub fn derive_date(document: &Document, policy: DatePolicy) -> Result<Option<String>> {
    let source = &document.source;
    match policy {
        DatePolicy::Strict => {
            let token = source.stem_date_token().ok_or_else(|| CoreError::MalformedFileName {
                file_name: source.file_name.clone(),
                reason: "expected <prefix>_<date>_... but found no '_'".into(),
            })?;
            let date = canonical_date(&token).map_err(|e| CoreError::MalformedFileName {
                file_name: source.file_name.clone(),
                reason: format!("date token {token:?} is not {DATE_FORMAT}: {e}"),
            })?;
            Ok(Some(date))
        }
        DatePolicy::Lenient => {
            let token = source.raw_date_token();
            if token.is_none() {
                warn!(
                    file_name = %source.file_name,
                    "file name has no date token, document will not match date filters"
                );
            }
            Ok(token)
        }
    }
}

/// Assign `{file_name, date_time}` and strip markers from the text
pub fn normalize_document(document: Document, policy: DatePolicy) -> Result<Document> {
    let date_time = derive_date(&document, policy)?;
    let metadata = DocumentMetadata::new(document.source.file_name.clone(), date_time);
    let text = strip_markers(&document.text);

    Ok(Document { text, ..document }.with_metadata(metadata))
}
