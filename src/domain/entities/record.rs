use std::collections::BTreeMap;

/// Placeholder shown for absent or empty cells.
pub const EMPTY_CELL_PLACEHOLDER: &str = "—";

/// One row of a table: column name to cell value.
///
/// A record may lack a value for a header column; readers treat an absent
/// value as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    cells: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Builds a record by zipping `headers` with `values`; missing trailing
    /// values stay absent and surplus values are dropped.
    pub fn from_row(headers: &[String], values: &[String]) -> Self {
        Self {
            cells: headers
                .iter()
                .zip(values.iter())
                .map(|(header, value)| (header.clone(), value.clone()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.cells.get(field).map(String::as_str)
    }

    /// Cell value with absent coerced to `""`.
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.values().map(String::as_str)
    }

    /// Returns a new record equal to `self` except for `field`.
    pub fn with_value(&self, field: &str, value: impl Into<String>) -> Self {
        let mut cells = self.cells.clone();
        cells.insert(field.to_string(), value.into());
        Self { cells }
    }

    /// True when every cell is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|value| value.trim().is_empty())
    }

    /// Values in `headers` order, absent as `""`.
    pub fn to_row(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|header| self.value(header).to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

pub fn format_cell_value(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => EMPTY_CELL_PLACEHOLDER,
    }
}
