use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::domain::entities::dataset::TabularData;
use crate::infra::import::csv::{parse_csv, serialize_csv};
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::cache::{
    CacheError, CacheOrigin, CachedTable, Connectivity, EntryStamp, ExpiryPolicy, TableCache,
};

/// SQLite-backed single-slot table cache. The table is stored as CSV text.
pub struct SqliteTableCache {
    db_path: PathBuf,
    policy: ExpiryPolicy,
    connectivity: Arc<dyn Connectivity>,
}

impl SqliteTableCache {
    pub fn open(
        db_path: impl Into<PathBuf>,
        policy: ExpiryPolicy,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<Self> {
        let db_path = db_path.into();
        init_db(&db_path)?;
        Ok(Self {
            db_path,
            policy,
            connectivity,
        })
    }

    fn save_entry(
        &self,
        origin: &CacheOrigin,
        data: &TabularData,
        stamp: EntryStamp,
    ) -> Result<()> {
        let payload = serialize_csv(&data.headers, &data.rows)?;
        let conn = open_connection(&self.db_path)?;
        conn.execute(
            "INSERT INTO table_cache(
                slot, payload, row_count, saved_at_ms, saved_online, source, fingerprint
             )
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                row_count = excluded.row_count,
                saved_at_ms = excluded.saved_at_ms,
                saved_online = excluded.saved_online,
                source = excluded.source,
                fingerprint = excluded.fingerprint",
            params![
                payload,
                data.rows.len() as i64,
                stamp.saved_at.timestamp_millis(),
                if stamp.saved_online { 1 } else { 0 },
                origin.source,
                // stored bit for bit; SQLite integers are signed
                origin.fingerprint as i64,
            ],
        )
        .context("failed to upsert cached table")?;
        Ok(())
    }

    fn load_entry(&self, now: DateTime<Utc>) -> Result<Option<CachedTable>> {
        let conn = open_connection(&self.db_path)?;
        let entry = conn
            .query_row(
                "SELECT payload, row_count, saved_at_ms, saved_online, source, fingerprint
                 FROM table_cache
                 WHERE slot = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()
            .context("failed to query cached table")?;

        let Some((payload, row_count, saved_at_ms, saved_online, source, fingerprint)) = entry
        else {
            return Ok(None);
        };

        let saved_at = DateTime::<Utc>::from_timestamp_millis(saved_at_ms)
            .ok_or_else(|| anyhow!("cached table has invalid timestamp: {saved_at_ms}"))?;
        let stamp = EntryStamp {
            saved_at,
            saved_online: saved_online != 0,
        };
        if self.policy.is_expired(&stamp, now) {
            tracing::debug!(
                "discarding cached table saved at {} (online: {})",
                stamp.saved_at,
                stamp.saved_online
            );
            self.clear_entry()?;
            return Ok(None);
        }

        let data = parse_csv(&payload).context("failed to decode cached table")?;
        if data.rows.len() as i64 != row_count {
            anyhow::bail!(
                "cached table is truncated: expected {row_count} rows, found {}",
                data.rows.len()
            );
        }
        Ok(Some(CachedTable {
            origin: CacheOrigin {
                source,
                fingerprint: fingerprint as u64,
            },
            data,
        }))
    }

    fn clear_entry(&self) -> Result<()> {
        let conn = open_connection(&self.db_path)?;
        conn.execute("DELETE FROM table_cache WHERE slot = 1", [])
            .context("failed to clear cached table")?;
        Ok(())
    }
}

impl TableCache for SqliteTableCache {
    fn save(&self, origin: &CacheOrigin, data: &TabularData) -> Result<(), CacheError> {
        let stamp = EntryStamp {
            saved_at: Utc::now(),
            saved_online: self.connectivity.is_online(),
        };
        self.save_entry(origin, data, stamp)
            .map_err(|err| CacheError::Message(format!("{err:#}")))
    }

    fn load(&self) -> Result<Option<CachedTable>, CacheError> {
        self.load_entry(Utc::now())
            .map_err(|err| CacheError::Message(format!("{err:#}")))
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.clear_entry()
            .map_err(|err| CacheError::Message(format!("{err:#}")))
    }
}
