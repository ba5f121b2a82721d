use super::StatKind;
use crate::city::types::DistrictStat;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86400); // 24 hours

/// Configuration for the district statistics cache
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
    pub ttl: Duration,
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_CACHE_TTL,
            path: get_cache_path(),
        }
    }
}

/// Get the platform-appropriate cache directory for lifequal
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("lifequal/stats"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/lifequal/stats",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the statistics cache directory
pub fn clear_cache(path: &std::path::Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// All-districts table with the time it was fetched
#[derive(Debug, Serialize, Deserialize)]
struct CachedStats {
    fetched_at: DateTime<Utc>,
    stats: Vec<DistrictStat>,
}

impl CachedStats {
    fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match (now - self.fetched_at).to_std() {
            Ok(age) => age < ttl,
            Err(_) => false, // fetched "in the future": clock moved, refetch
        }
    }
}

/// Disk cache for the all-districts statistic tables.
///
/// The tables change once a year at most but every score needs them, so the
/// HTTP source keeps them in cacache between runs. All errors are swallowed by
/// callers; a broken cache only costs a refetch.
#[derive(Clone, Debug)]
pub struct StatsCache {
    config: CacheConfig,
}

impl StatsCache {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    fn key(kind: StatKind) -> String {
        format!("district-stats:{}", kind.label())
    }

    /// Cached table for `kind` if present and younger than the TTL
    pub async fn read(&self, kind: StatKind) -> Option<Vec<DistrictStat>> {
        if !self.config.enabled {
            return None;
        }
        let bytes = cacache::read(&self.config.path, Self::key(kind)).await.ok()?;
        let cached: CachedStats = serde_json::from_slice(&bytes).ok()?;
        if cached.is_fresh(self.config.ttl, Utc::now()) {
            Some(cached.stats)
        } else {
            None
        }
    }

    pub async fn write(&self, kind: StatKind, stats: &[DistrictStat]) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let entry = CachedStats {
            fetched_at: Utc::now(),
            stats: stats.to_vec(),
        };
        let json = serde_json::to_vec(&entry)?;
        cacache::write(&self.config.path, Self::key(kind), &json)
            .await
            .context("Failed to write statistics cache")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn config_in(dir: &tempfile::TempDir) -> CacheConfig {
        CacheConfig {
            enabled: true,
            ttl: DEFAULT_CACHE_TTL,
            path: dir.path().join("stats"),
        }
    }

    fn sample_stats() -> Vec<DistrictStat> {
        vec![
            DistrictStat {
                district: "Favoriten".to_string(),
                value: 400.0,
            },
            DistrictStat {
                district: "Hietzing".to_string(),
                value: 120.0,
            },
        ]
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StatsCache::new(config_in(&dir));

        cache.write(StatKind::Crime, &sample_stats()).await.unwrap();

        assert_eq!(cache.read(StatKind::Crime).await, Some(sample_stats()));
        // Kinds are cached separately
        assert_eq!(cache.read(StatKind::Rent).await, None);
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.enabled = false;
        let cache = StatsCache::new(config);

        cache.write(StatKind::Crime, &sample_stats()).await.unwrap();
        assert_eq!(cache.read(StatKind::Crime).await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.ttl = Duration::from_secs(0);
        let cache = StatsCache::new(config);

        cache.write(StatKind::Rent, &sample_stats()).await.unwrap();
        assert_eq!(cache.read(StatKind::Rent).await, None);
    }

    #[test]
    fn test_freshness() {
        let now = Utc::now();
        let entry = CachedStats {
            fetched_at: now - ChronoDuration::hours(2),
            stats: vec![],
        };
        assert!(entry.is_fresh(Duration::from_secs(3 * 3600), now));
        assert!(!entry.is_fresh(Duration::from_secs(3600), now));

        let future = CachedStats {
            fetched_at: now + ChronoDuration::hours(1),
            stats: vec![],
        };
        assert!(!future.is_fresh(DEFAULT_CACHE_TTL, now));
    }

    #[test]
    fn test_clear_cache_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(clear_cache(&dir.path().join("does-not-exist")).is_ok());
    }

    #[tokio::test]
    async fn test_clear_cache_removes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let cache = StatsCache::new(config.clone());
        cache.write(StatKind::Crime, &sample_stats()).await.unwrap();

        clear_cache(&config.path).unwrap();
        assert_eq!(cache.read(StatKind::Crime).await, None);
    }
}
