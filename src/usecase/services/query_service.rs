use std::collections::BTreeSet;

use crate::domain::diff::{diff, is_cell_modified, modified_rows};
use crate::domain::entities::dataset::{PageQuery, PageResult, SortDirection, SortSpec};
use crate::domain::entities::edit::EditedCell;
use crate::domain::store::RecordStore;
use crate::domain::view::{clamp_page, filter_rows, total_pages, view};

/// Holds the transient view state (search, sort, page) and answers read
/// queries against a [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct QueryService {
    query: PageQuery,
}

impl QueryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    /// Changing the search term returns to the first page.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.global_search = term.into();
        self.query.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.query.sort = sort;
    }

    /// Header-click behaviour: a new field sorts ascending, the current field
    /// flips direction.
    pub fn toggle_sort(&mut self, field: &str) {
        self.query.sort = Some(match self.query.sort.take() {
            Some(current) if current.field == field => SortSpec {
                direction: current.direction.toggled(),
                ..current
            },
            _ => SortSpec {
                field: field.to_string(),
                direction: SortDirection::Asc,
            },
        });
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.page = page;
    }

    pub fn next_page(&mut self, store: &RecordStore) {
        let last = self.total_pages(store);
        self.query.page = clamp_page(self.query.page.saturating_add(1), last);
    }

    pub fn previous_page(&mut self, store: &RecordStore) {
        let last = self.total_pages(store);
        self.query.page = clamp_page(self.query.page.saturating_sub(1), last);
    }

    pub fn total_pages(&self, store: &RecordStore) -> usize {
        total_pages(filter_rows(store.working(), &self.query.global_search).len())
    }

    /// The current page, with the page number clamped into range first.
    pub fn current_page<'a>(&mut self, store: &'a RecordStore) -> PageResult<'a> {
        let last = self.total_pages(store);
        self.query.page = clamp_page(self.query.page, last);
        view(store.working(), &self.query)
    }

    pub fn edited_cells(&self, store: &RecordStore) -> Vec<EditedCell> {
        diff(store.working(), store.original())
    }

    pub fn is_cell_modified(&self, store: &RecordStore, row_idx: usize, field: &str) -> bool {
        is_cell_modified(store.working(), store.original(), row_idx, field)
    }

    pub fn modified_rows(&self, store: &RecordStore) -> BTreeSet<usize> {
        modified_rows(store.working(), store.original())
    }
}
