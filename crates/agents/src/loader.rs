//! Spreadsheet loading - one document per file

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use newsrag_core::{Document, SourceFile};
use tracing::{debug, info, instrument};

use crate::capability::DocumentLoader;
use crate::{AgentError, Result};

/// Default text column
pub const DEFAULT_COLUMN: &str = "answer";

/// Extensions calamine can open
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Reads one named column from the first worksheet.
///
/// Row 0 is the header. Non-empty cells below it are joined with `\n`.
#[derive(Debug, Clone)]
pub struct ExcelColumnLoader {
    column: String,
}

impl Default for ExcelColumnLoader {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN)
    }
}

impl ExcelColumnLoader {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl DocumentLoader for ExcelColumnLoader {
    fn accepts(&self, path: &Path) -> bool {
        let source = SourceFile::new(path);
        if source.file_name.starts_with('.') || source.file_name.starts_with("~$") {
            return false;
        }
        source
            .extension()
            .map(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    #[instrument(skip(self), fields(column = %self.column))]
    fn load_text(&self, path: &Path) -> Result<String> {
        let spreadsheet_error = |message: String| AgentError::Spreadsheet {
            path: path.display().to_string(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| spreadsheet_error("workbook has no worksheets".into()))?
            .map_err(|e| spreadsheet_error(e.to_string()))?;

        let values = extract_column(&range, &self.column).ok_or_else(|| AgentError::MissingColumn {
            path: path.display().to_string(),
            column: self.column.clone(),
        })?;

        debug!("Read {} cells from {}", values.len(), path.display());
        Ok(values.join("\n"))
    }
}

/// Non-empty values of the column whose header is `column`, in row order.
///
/// `None` if no header cell matches.
pub fn extract_column(range: &Range<Data>, column: &str) -> Option<Vec<String>> {
    let mut rows = range.rows();
    let header = rows.next()?;
    let index = header
        .iter()
        .position(|cell| cell_text(cell).trim() == column)?;

    Some(
        rows.filter_map(|row| row.get(index))
            .map(cell_text)
            .filter(|text| !text.trim().is_empty())
            .collect(),
    )
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Spreadsheets in `dir` accepted by `loader`, sorted by file name
#[instrument(skip(loader))]
pub fn list_source_files(dir: &Path, loader: &dyn DocumentLoader) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            debug!("Skipping non-file entry {}", path.display());
            continue;
        }
        if !loader.accepts(&path) {
            debug!("Skipping unsupported file {}", path.display());
            continue;
        }
        sources.push(SourceFile::new(path));
    }

    sources.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(sources)
}

/// Load one document per accepted file in `dir`
#[instrument(skip(loader))]
pub fn load_documents(dir: &Path, loader: &dyn DocumentLoader) -> Result<Vec<Document>> {
    let sources = list_source_files(dir, loader)?;
    let mut documents = Vec::with_capacity(sources.len());

    for source in sources {
        let text = loader.load_text(&source.path)?;
        documents.push(Document::new(source, text));
    }

    info!("Loaded {} documents from {}", documents.len(), dir.display());
    Ok(documents)
}
