use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::entities::dataset::{PageResult, TabularData};
use crate::domain::entities::edit::EditedCell;
use crate::domain::store::RecordStore;
use crate::infra::import::csv::{serialize_csv, write_csv_file, LoadProgress};
use crate::usecase::ports::cache::{CacheOrigin, TableCache};
use crate::usecase::services::edit_service::{EditOutcome, EditService};
use crate::usecase::services::import_service::{ImportService, LoadError};
use crate::usecase::services::query_service::QueryService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    Absent,
    /// The cached table was edited from another file, or from a different
    /// version of this one.
    Rejected,
    Failed(String),
}

/// One editing session: a loaded table, its view state and the services
/// that act on it.
pub struct App {
    store: RecordStore,
    import_service: ImportService,
    edit_service: EditService,
    query_service: QueryService,
    cache: Arc<dyn TableCache>,
    origin: Option<CacheOrigin>,
}

impl App {
    pub fn new(cache: Arc<dyn TableCache>) -> Self {
        Self::with_import_service(cache, ImportService::default())
    }

    pub fn with_import_service(cache: Arc<dyn TableCache>, import_service: ImportService) -> Self {
        Self {
            store: RecordStore::new(),
            import_service,
            edit_service: EditService::new(cache.clone()),
            query_service: QueryService::new(),
            cache,
            origin: None,
        }
    }

    /// Replaces the current session with the table parsed from `text`. On
    /// error the session is left without a table.
    pub fn load_text<F>(&mut self, name: &str, text: &str, on_progress: F) -> Result<usize, LoadError>
    where
        F: FnMut(LoadProgress),
    {
        let result = self.import_service.import_text(text, on_progress);
        self.install(name, result)
    }

    pub fn load_file<F>(&mut self, path: &Path, on_progress: F) -> Result<usize, LoadError>
    where
        F: FnMut(LoadProgress),
    {
        let result = self.import_service.import_file(path, on_progress);
        let source = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.install(&source.display().to_string(), result)
    }

    fn install(
        &mut self,
        name: &str,
        result: Result<TabularData, LoadError>,
    ) -> Result<usize, LoadError> {
        self.store.clear();
        self.query_service = QueryService::new();
        self.origin = None;

        let data = result.inspect_err(|err| tracing::info!("load of {name} failed: {err}"))?;
        let row_count = data.rows.len();
        tracing::info!(
            "loaded {name}: {row_count} rows, {} columns",
            data.headers.len()
        );
        self.store.load(data);
        self.origin = Some(CacheOrigin {
            source: name.to_string(),
            fingerprint: self.store.fingerprint(),
        });
        Ok(row_count)
    }

    /// Adopts the cached working table when it was saved from the same source
    /// with the same original contents, and its headers and row count match
    /// the loaded table. The original snapshot is kept from the load.
    pub fn restore_from_cache(&mut self) -> RestoreOutcome {
        let Some(origin) = self.origin.as_ref() else {
            return RestoreOutcome::Absent;
        };

        let cached = match self.cache.load() {
            Ok(Some(cached)) => cached,
            Ok(None) => return RestoreOutcome::Absent,
            Err(err) => {
                tracing::warn!("failed to load cached table: {err}");
                return RestoreOutcome::Failed(err.to_string());
            }
        };

        if cached.origin.source != origin.source {
            tracing::warn!(
                "ignoring cached table from {} while {} is loaded",
                cached.origin.source,
                origin.source
            );
            return RestoreOutcome::Rejected;
        }
        if cached.origin.fingerprint != origin.fingerprint {
            tracing::warn!(
                "ignoring cached table: {} changed since it was edited",
                origin.source
            );
            return RestoreOutcome::Rejected;
        }
        if cached.data.headers != self.store.headers() {
            tracing::warn!("ignoring cached table with different columns");
            return RestoreOutcome::Rejected;
        }
        match self.store.replace_working(cached.data.rows) {
            Ok(()) => {
                tracing::debug!("restored {} cached rows", self.store.len());
                RestoreOutcome::Restored
            }
            Err(err) => {
                tracing::warn!("ignoring cached table: {err}");
                RestoreOutcome::Rejected
            }
        }
    }

    pub fn edit(&mut self, row_idx: usize, field: &str, value: impl Into<String>) -> EditOutcome {
        let Some(origin) = self.origin.as_ref() else {
            return EditOutcome::Ignored;
        };
        self.edit_service
            .apply_edit(&mut self.store, origin, row_idx, field, value)
    }

    /// Restores every cell to its loaded value and drops the cached edits.
    /// Returns whether the cache entry was cleared.
    pub fn reset(&mut self) -> bool {
        self.store.reset_to_original();
        tracing::info!("reset working table to original values");
        self.edit_service.discard_saved()
    }

    pub fn page(&mut self) -> PageResult<'_> {
        self.query_service.current_page(&self.store)
    }

    pub fn query(&self) -> &QueryService {
        &self.query_service
    }

    pub fn query_mut(&mut self) -> &mut QueryService {
        &mut self.query_service
    }

    pub fn edited_cells(&self) -> Vec<EditedCell> {
        self.query_service.edited_cells(&self.store)
    }

    pub fn is_cell_modified(&self, row_idx: usize, field: &str) -> bool {
        self.query_service
            .is_cell_modified(&self.store, row_idx, field)
    }

    pub fn modified_rows(&self) -> BTreeSet<usize> {
        self.query_service.modified_rows(&self.store)
    }

    /// The full working table in its loaded order, regardless of the
    /// current search or sort.
    pub fn export_csv(&self) -> Result<String> {
        if !self.store.is_loaded() {
            anyhow::bail!("no table loaded");
        }
        serialize_csv(self.store.headers(), self.store.working())
    }

    pub fn export_to_path(&self, path: &Path) -> Result<()> {
        let text = self.export_csv()?;
        write_csv_file(path, &text)?;
        tracing::info!("exported {} rows to {}", self.store.len(), path.display());
        Ok(())
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Identity of the loaded file: the name given to `load_text`, or the
    /// canonical path given to `load_file`.
    pub fn source_name(&self) -> Option<&str> {
        self.origin.as_ref().map(|origin| origin.source.as_str())
    }
}
