use crate::domain::entities::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Transient view state: search term, sort and the 1-indexed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: usize,
    pub global_search: String,
    pub sort: Option<SortSpec>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            global_search: String::new(),
            sort: None,
        }
    }
}

/// A projected row. `row_idx` is the row's position in the working table and
/// is what edits submitted from the view must use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRow<'a> {
    pub row_idx: usize,
    pub record: &'a Record,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<'a> {
    pub rows: Vec<ViewRow<'a>>,
    pub page: usize,
    pub total_rows: usize,
    pub total_pages: usize,
}

/// Header list plus rows, as produced by the CSV codec and stored in the
/// persistence cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularData {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}
