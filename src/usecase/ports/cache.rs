use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::dataset::TabularData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    Message(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for CacheError {}

/// The loaded file a cached working table was edited from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOrigin {
    pub source: String,
    /// [`RecordStore::fingerprint`](crate::domain::store::RecordStore::fingerprint)
    /// of the original snapshot.
    pub fingerprint: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedTable {
    pub origin: CacheOrigin,
    pub data: TabularData,
}

/// Single-slot store for the working table.
///
/// Implementations stamp each entry with the save time and the connectivity
/// flag at save time, and decide expiry themselves: `load` returns `None` for
/// an expired entry.
pub trait TableCache: Send + Sync {
    fn save(&self, origin: &CacheOrigin, data: &TabularData) -> Result<(), CacheError>;
    fn load(&self) -> Result<Option<CachedTable>, CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}

/// Queried by a cache at save time.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStamp {
    pub saved_at: DateTime<Utc>,
    pub saved_online: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub offline_ttl: Duration,
    /// `None` keeps entries saved while online indefinitely.
    pub online_ttl: Option<Duration>,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            offline_ttl: Duration::hours(24),
            online_ttl: None,
        }
    }
}

impl ExpiryPolicy {
    pub fn is_expired(&self, stamp: &EntryStamp, now: DateTime<Utc>) -> bool {
        let ttl = if stamp.saved_online {
            self.online_ttl
        } else {
            Some(self.offline_ttl)
        };
        match ttl {
            Some(ttl) => now.signed_duration_since(stamp.saved_at) > ttl,
            None => false,
        }
    }
}
