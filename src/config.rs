//! Runtime configuration.
//!
//! Defaults come from the platform data directory; environment variables
//! override them:
//! - `CSVDESK_CACHE_PATH`: SQLite cache file
//! - `CSVDESK_OFFLINE_TTL_HOURS`: lifetime of entries saved while offline
//! - `CSVDESK_ONLINE_TTL_HOURS`: lifetime of entries saved while online
//! - `CSVDESK_OFFLINE`: `1`/`true` marks the session offline

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use directories::ProjectDirs;

use crate::usecase::ports::cache::ExpiryPolicy;

pub const ENV_CACHE_PATH: &str = "CSVDESK_CACHE_PATH";
pub const ENV_OFFLINE_TTL_HOURS: &str = "CSVDESK_OFFLINE_TTL_HOURS";
pub const ENV_ONLINE_TTL_HOURS: &str = "CSVDESK_ONLINE_TTL_HOURS";
pub const ENV_OFFLINE: &str = "CSVDESK_OFFLINE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub cache_path: PathBuf,
    pub expiry: ExpiryPolicy,
    pub online: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_path = match lookup(ENV_CACHE_PATH).filter(|value| !value.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_cache_path()?,
        };

        let mut expiry = ExpiryPolicy::default();
        if let Some(hours) = lookup(ENV_OFFLINE_TTL_HOURS) {
            expiry.offline_ttl = parse_hours(ENV_OFFLINE_TTL_HOURS, &hours)?;
        }
        if let Some(hours) = lookup(ENV_ONLINE_TTL_HOURS) {
            expiry.online_ttl = Some(parse_hours(ENV_ONLINE_TTL_HOURS, &hours)?);
        }

        let online = match lookup(ENV_OFFLINE) {
            Some(flag) => !parse_flag(ENV_OFFLINE, &flag)?,
            None => true,
        };

        Ok(Self {
            cache_path,
            expiry,
            online,
        })
    }
}

pub fn default_cache_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "csvdesk", "csvdesk")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("table-cache.sqlite"))
}

fn parse_hours(key: &str, value: &str) -> Result<Duration> {
    let hours: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of hours, got {value:?}"))?;
    if hours < 0 {
        anyhow::bail!("{key} must not be negative, got {hours}");
    }
    Duration::try_hours(hours).ok_or_else(|| anyhow!("{key} is out of range: {hours}"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("{key} must be a boolean, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn overrides_apply() {
        let config = config(&[
            (ENV_CACHE_PATH, "/tmp/cache.sqlite"),
            (ENV_OFFLINE_TTL_HOURS, "6"),
            (ENV_ONLINE_TTL_HOURS, "72"),
            (ENV_OFFLINE, "true"),
        ])
        .expect("config should load");

        assert_eq!(config.cache_path, PathBuf::from("/tmp/cache.sqlite"));
        assert_eq!(config.expiry.offline_ttl, Duration::hours(6));
        assert_eq!(config.expiry.online_ttl, Some(Duration::hours(72)));
        assert!(!config.online);
    }

    #[test]
    fn defaults_without_overrides() {
        let config = config(&[(ENV_CACHE_PATH, "cache.sqlite")]).expect("config should load");

        assert_eq!(config.expiry, ExpiryPolicy::default());
        assert!(config.online);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config(&[(ENV_CACHE_PATH, "c.sqlite"), (ENV_OFFLINE_TTL_HOURS, "soon")])
            .expect_err("invalid hours should fail");
        assert!(err.to_string().contains(ENV_OFFLINE_TTL_HOURS), "{err}");

        let err = config(&[(ENV_CACHE_PATH, "c.sqlite"), (ENV_OFFLINE, "maybe")])
            .expect_err("invalid flag should fail");
        assert!(err.to_string().contains(ENV_OFFLINE), "{err}");
    }
}
