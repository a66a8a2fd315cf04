use std::sync::Arc;

use crate::domain::store::RecordStore;
use crate::usecase::ports::cache::{CacheOrigin, TableCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The cell was replaced. `persisted` is false when the cache rejected
    /// the save; the edit itself still stands.
    Applied { persisted: bool },
    /// The row or field did not resolve; nothing changed.
    Ignored,
}

pub struct EditService {
    cache: Arc<dyn TableCache>,
}

impl EditService {
    pub fn new(cache: Arc<dyn TableCache>) -> Self {
        Self { cache }
    }

    /// Sets one cell of the working table, addressed by its working-table row
    /// index, then saves the whole working table to the cache under `origin`.
    pub fn apply_edit(
        &self,
        store: &mut RecordStore,
        origin: &CacheOrigin,
        row_idx: usize,
        field: &str,
        value: impl Into<String>,
    ) -> EditOutcome {
        if !store.set_cell(row_idx, field, value) {
            tracing::debug!("ignoring edit of unknown cell (row {row_idx}, field {field:?})");
            return EditOutcome::Ignored;
        }

        EditOutcome::Applied {
            persisted: self.persist(origin, store),
        }
    }

    pub fn persist(&self, origin: &CacheOrigin, store: &RecordStore) -> bool {
        match self.cache.save(origin, &store.working_data()) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("changes may not survive a reload: {err}");
                false
            }
        }
    }

    pub fn discard_saved(&self) -> bool {
        match self.cache.clear() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("failed to clear cached table: {err}");
                false
            }
        }
    }
}
