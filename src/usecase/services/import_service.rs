use std::collections::HashSet;
use std::path::Path;

use crate::domain::entities::dataset::TabularData;
use crate::infra::import::csv::{parse_csv_with_progress, read_csv_file, LoadProgress};

/// Rows between progress events while parsing.
pub const DEFAULT_PROGRESS_CHUNK: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    MissingHeaders,
    /// Two header columns share a name; their cells could not be told apart.
    DuplicateHeader(String),
    NoRows,
    AllRowsEmpty,
    Parse(String),
    Io(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::MissingHeaders => write!(f, "csv file has no header row"),
            LoadError::DuplicateHeader(name) => {
                write!(f, "csv header {name:?} appears more than once")
            }
            LoadError::NoRows => write!(f, "csv file has no data rows"),
            LoadError::AllRowsEmpty => write!(f, "every row in the csv file is empty"),
            LoadError::Parse(message) => write!(f, "failed to parse csv: {message}"),
            LoadError::Io(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for LoadError {}

pub struct ImportService {
    chunk_rows: usize,
}

impl Default for ImportService {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_CHUNK)
    }
}

impl ImportService {
    pub fn new(chunk_rows: usize) -> Self {
        Self { chunk_rows }
    }

    /// Parses and validates `text`. Rows that are blank after trimming are
    /// dropped; the returned table always has headers and at least one row.
    pub fn import_text<F>(&self, text: &str, on_progress: F) -> Result<TabularData, LoadError>
    where
        F: FnMut(LoadProgress),
    {
        let parsed = parse_csv_with_progress(text, self.chunk_rows, on_progress)
            .map_err(|err| LoadError::Parse(format!("{err:#}")))?;
        validate(parsed)
    }

    pub fn import_file<F>(&self, path: &Path, on_progress: F) -> Result<TabularData, LoadError>
    where
        F: FnMut(LoadProgress),
    {
        let text = read_csv_file(path).map_err(|err| LoadError::Io(format!("{err:#}")))?;
        self.import_text(&text, on_progress)
    }
}

fn validate(parsed: TabularData) -> Result<TabularData, LoadError> {
    if parsed.headers.iter().all(|header| header.is_empty()) {
        return Err(LoadError::MissingHeaders);
    }
    if let Some(name) = first_duplicate(&parsed.headers) {
        return Err(LoadError::DuplicateHeader(name.to_string()));
    }
    if parsed.rows.is_empty() {
        return Err(LoadError::NoRows);
    }

    let rows: Vec<_> = parsed
        .rows
        .into_iter()
        .filter(|row| !row.is_blank())
        .collect();
    if rows.is_empty() {
        return Err(LoadError::AllRowsEmpty);
    }

    Ok(TabularData {
        headers: parsed.headers,
        rows,
    })
}

fn first_duplicate(headers: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .find(|header| !seen.insert(header.as_str()))
        .map(String::as_str)
}
