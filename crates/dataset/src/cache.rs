use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::source::DataSource;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry {
    dataset: Arc<Dataset>,
    loaded_at: Instant,
}

/// A read-through cache over a `DataSource`.
///
/// A loaded dataset is served until `ttl` has elapsed since it was loaded,
/// even if the file changes on disk meanwhile. Failed loads are not cached.
pub struct DatasetCache {
    source: DataSource,
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    pub fn new(source: DataSource, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: None,
        }
    }

    /// Returns the cached dataset, reloading it if absent or expired.
    pub fn get_or_reload(&mut self) -> Result<Arc<Dataset>, DatasetError> {
        self.get_or_reload_at(Instant::now())
    }

    fn get_or_reload_at(&mut self, now: Instant) -> Result<Arc<Dataset>, DatasetError> {
        if let Some(entry) = &self.entry {
            if now.saturating_duration_since(entry.loaded_at) < self.ttl {
                return Ok(Arc::clone(&entry.dataset));
            }
            tracing::debug!(age = ?now.saturating_duration_since(entry.loaded_at), "Cached dataset expired.");
        }

        match self.source.load() {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                self.entry = Some(CacheEntry {
                    dataset: Arc::clone(&dataset),
                    loaded_at: now,
                });
                Ok(dataset)
            }
            Err(e) => {
                self.entry = None;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str =
        "date,net_pnl,sentiment_score,avg_leverage,total_volume,max_adverse_excursion,trade_frequency\n";

    fn write_rows(path: &std::path::Path, rows: usize) {
        let mut body = HEADER.to_string();
        for day in 1..=rows {
            body.push_str(&format!("2024-01-{:02},1,50,1,1,0,1\n", day));
        }
        fs::write(path, body).unwrap();
    }

    #[test]
    fn serves_cached_copy_until_ttl_expires() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        write_rows(&path, 2);

        let mut cache = DatasetCache::new(DataSource::new(vec![path.clone()]), Duration::from_secs(60));
        let t0 = Instant::now();

        let first = cache.get_or_reload_at(t0).unwrap();
        assert_eq!(first.records.len(), 2);

        write_rows(&path, 5);

        let within = cache.get_or_reload_at(t0 + Duration::from_secs(30)).unwrap();
        assert!(Arc::ptr_eq(&first, &within));
        assert_eq!(within.records.len(), 2);

        let after = cache.get_or_reload_at(t0 + Duration::from_secs(61)).unwrap();
        assert_eq!(after.records.len(), 5);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");

        let mut cache = DatasetCache::new(DataSource::new(vec![path.clone()]), Duration::from_secs(3600));
        assert!(matches!(cache.get_or_reload(), Err(DatasetError::NotFound { .. })));

        write_rows(&path, 4);
        assert_eq!(cache.get_or_reload().unwrap().records.len(), 4);
    }
}
