use crate::domain::entities::dataset::TabularData;
use crate::domain::entities::record::Record;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;
const UNIT_SEPARATOR: u8 = 0x1f;
const RECORD_SEPARATOR: u8 = 0x1e;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Misaligned { working: usize, original: usize },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Misaligned { working, original } => write!(
                f,
                "working table has {working} rows but original snapshot has {original}"
            ),
        }
    }
}

impl std::error::Error for StoreError {}

/// Working table plus the pristine snapshot it was loaded from.
///
/// Both tables always have the same length and are positionally aligned.
/// The only mutation is [`RecordStore::set_cell`]; rows are never inserted or
/// removed until the whole store is replaced.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    headers: Vec<String>,
    working: Vec<Record>,
    original: Vec<Record>,
    loaded: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `data` as the working table and a deep copy of it as the
    /// original snapshot.
    pub fn load(&mut self, data: TabularData) {
        let original = data.rows.clone();
        self.headers = data.headers;
        self.working = data.rows;
        self.original = original;
        self.loaded = true;
    }

    pub fn replace(
        &mut self,
        headers: Vec<String>,
        working: Vec<Record>,
        original: Vec<Record>,
    ) -> Result<(), StoreError> {
        debug_assert_eq!(
            working.len(),
            original.len(),
            "working and original tables must be aligned"
        );
        if working.len() != original.len() {
            return Err(StoreError::Misaligned {
                working: working.len(),
                original: original.len(),
            });
        }

        self.headers = headers;
        self.working = working;
        self.original = original;
        self.loaded = true;
        Ok(())
    }

    /// Swaps in a new working table while keeping the original snapshot.
    pub fn replace_working(&mut self, working: Vec<Record>) -> Result<(), StoreError> {
        if working.len() != self.original.len() {
            return Err(StoreError::Misaligned {
                working: working.len(),
                original: self.original.len(),
            });
        }
        self.working = working;
        Ok(())
    }

    pub fn reset_to_original(&mut self) {
        self.working = self.original.clone();
    }

    pub fn clear(&mut self) {
        self.headers.clear();
        self.working.clear();
        self.original.clear();
        self.loaded = false;
    }

    /// Replaces one cell of one row. The target row becomes a new record;
    /// every other row is left as is. Returns `false` without touching
    /// anything when the row or the field does not exist.
    pub fn set_cell(&mut self, row_idx: usize, field: &str, value: impl Into<String>) -> bool {
        if !self.headers.iter().any(|header| header == field) {
            return false;
        }
        let Some(row) = self.working.get_mut(row_idx) else {
            return false;
        };
        *row = row.with_value(field, value);
        true
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn working(&self) -> &[Record] {
        &self.working
    }

    pub fn original(&self) -> &[Record] {
        &self.original
    }

    pub fn working_data(&self) -> TabularData {
        TabularData {
            headers: self.headers.clone(),
            rows: self.working.clone(),
        }
    }

    /// Stable 64-bit FNV-1a hash of the headers and the original snapshot in
    /// header order. Edits to the working table do not change it.
    pub fn fingerprint(&self) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        for header in &self.headers {
            fnv_feed(&mut hash, header.as_bytes());
            fnv_feed(&mut hash, &[UNIT_SEPARATOR]);
        }
        for row in &self.original {
            fnv_feed(&mut hash, &[RECORD_SEPARATOR]);
            for header in &self.headers {
                let cell = row.get(header);
                fnv_feed(&mut hash, &[u8::from(cell.is_some())]);
                fnv_feed(&mut hash, cell.unwrap_or("").as_bytes());
                fnv_feed(&mut hash, &[UNIT_SEPARATOR]);
            }
        }
        hash
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

fn fnv_feed(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(FNV_PRIME);
    }
}
