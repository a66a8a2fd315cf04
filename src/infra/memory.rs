use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::domain::entities::dataset::TabularData;
use crate::usecase::ports::cache::{
    CacheError, CacheOrigin, CachedTable, Connectivity, EntryStamp, ExpiryPolicy, TableCache,
};

/// In-process cache for sessions that should not touch disk.
pub struct MemoryTableCache {
    entry: Mutex<Option<(CachedTable, EntryStamp)>>,
    policy: ExpiryPolicy,
    connectivity: Arc<dyn Connectivity>,
}

impl MemoryTableCache {
    pub fn new(policy: ExpiryPolicy, connectivity: Arc<dyn Connectivity>) -> Self {
        Self {
            entry: Mutex::new(None),
            policy,
            connectivity,
        }
    }

    fn load_at(&self, now: DateTime<Utc>) -> Result<Option<CachedTable>, CacheError> {
        let mut entry = self
            .entry
            .lock()
            .map_err(|_| CacheError::Message("memory cache lock poisoned".to_string()))?;
        if let Some((_, stamp)) = entry.as_ref() {
            if self.policy.is_expired(stamp, now) {
                *entry = None;
            }
        }
        Ok(entry.as_ref().map(|(cached, _)| cached.clone()))
    }
}

impl TableCache for MemoryTableCache {
    fn save(&self, origin: &CacheOrigin, data: &TabularData) -> Result<(), CacheError> {
        let stamp = EntryStamp {
            saved_at: Utc::now(),
            saved_online: self.connectivity.is_online(),
        };
        let mut entry = self
            .entry
            .lock()
            .map_err(|_| CacheError::Message("memory cache lock poisoned".to_string()))?;
        let cached = CachedTable {
            origin: origin.clone(),
            data: data.clone(),
        };
        *entry = Some((cached, stamp));
        Ok(())
    }

    fn load(&self) -> Result<Option<CachedTable>, CacheError> {
        self.load_at(Utc::now())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut entry = self
            .entry
            .lock()
            .map_err(|_| CacheError::Message("memory cache lock poisoned".to_string()))?;
        *entry = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::record::Record;
    use crate::infra::connectivity::StaticConnectivity;
    use chrono::Duration;

    fn sample() -> TabularData {
        TabularData {
            headers: vec!["a".to_string()],
            rows: vec![Record::from_pairs([("a", "1")])],
        }
    }

    fn origin() -> CacheOrigin {
        CacheOrigin {
            source: "sample.csv".to_string(),
            fingerprint: 7,
        }
    }

    #[test]
    fn save_load_clear() {
        let cache = MemoryTableCache::new(
            ExpiryPolicy::default(),
            Arc::new(StaticConnectivity::new(true)),
        );

        cache.save(&origin(), &sample()).expect("save should succeed");
        assert_eq!(
            cache.load(),
            Ok(Some(CachedTable {
                origin: origin(),
                data: sample(),
            }))
        );

        cache.clear().expect("clear should succeed");
        assert_eq!(cache.load(), Ok(None));
    }

    #[test]
    fn offline_entry_expires() {
        let cache = MemoryTableCache::new(
            ExpiryPolicy::default(),
            Arc::new(StaticConnectivity::new(false)),
        );
        cache.save(&origin(), &sample()).expect("save should succeed");

        let later = Utc::now() + Duration::hours(25);

        assert_eq!(cache.load_at(later), Ok(None));
        assert_eq!(cache.load(), Ok(None), "expired entry should be dropped");
    }
}
