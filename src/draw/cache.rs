//! Per-period draw cache.
//!
//! Keeps every fetched record in memory for the life of the process and,
//! when a directory is configured, as `<period>.json` on disk. Records whose
//! floating-tier amounts are fallbacks stay in memory only, so a later run
//! can pick up the published figures.
//!
//! Concurrent lookups of the same period wait on one fetch instead of each
//! going to the inner source.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::record::{DrawRecord, DrawSource};
use crate::log;
use crate::ticket::DrawPeriod;

pub struct CachedDrawSource<S> {
    inner: S,
    dir: Option<PathBuf>,
    memory: Mutex<HashMap<DrawPeriod, DrawRecord>>,
    /// One lock per period being looked up
    pending: Mutex<HashMap<DrawPeriod, Arc<Mutex<()>>>>,
}

impl<S: DrawSource> CachedDrawSource<S> {
    /// Memory-only cache.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            dir: None,
            memory: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Cache that also persists confirmed records under `dir`.
    pub fn with_dir(inner: S, dir: PathBuf) -> Self {
        Self {
            dir: Some(dir),
            ..Self::new(inner)
        }
    }

    fn remember(&self, record: &DrawRecord) {
        let mut memory = self.memory.lock().unwrap_or_else(|e| e.into_inner());
        memory.insert(record.period().clone(), record.clone());
    }

    fn recall(&self, period: &DrawPeriod) -> Option<DrawRecord> {
        let memory = self.memory.lock().unwrap_or_else(|e| e.into_inner());
        memory.get(period).cloned()
    }

    fn period_lock(&self, period: &DrawPeriod) -> Arc<Mutex<()>> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(pending.entry(period.clone()).or_default())
    }

    fn load(&self, period: &DrawPeriod) -> Option<DrawRecord> {
        if let Some(dir) = &self.dir {
            match read_cached(dir, period) {
                Ok(Some(record)) => {
                    log(&format!("Draw {} loaded from cache", period));
                    self.remember(&record);
                    return Some(record);
                }
                Ok(None) => {}
                Err(e) => log(&format!("Ignoring cached draw {}: {:#}", period, e)),
            }
        }

        let record = self.inner.fetch(period)?;

        if let Some(dir) = &self.dir {
            if !record.prizes().estimated {
                if let Err(e) = write_cached(dir, &record) {
                    log(&format!("Failed to cache draw {}: {:#}", period, e));
                }
            }
        }

        self.remember(&record);
        Some(record)
    }
}

impl<S: DrawSource> DrawSource for CachedDrawSource<S> {
    fn fetch(&self, period: &DrawPeriod) -> Option<DrawRecord> {
        if let Some(record) = self.recall(period) {
            return Some(record);
        }

        let lock = self.period_lock(period);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        // Another caller may have finished while we waited
        if let Some(record) = self.recall(period) {
            return Some(record);
        }
        self.load(period)
    }
}

fn cache_path(dir: &Path, period: &DrawPeriod) -> PathBuf {
    dir.join(format!("{}.json", period))
}

/// Reads a cached record. A missing file is `Ok(None)`.
fn read_cached(dir: &Path, period: &DrawPeriod) -> Result<Option<DrawRecord>> {
    let path = cache_path(dir, period);
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let record: DrawRecord = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if record.period() != period {
        return Ok(None);
    }
    Ok(Some(record))
}

fn write_cached(dir: &Path, record: &DrawRecord) -> Result<()> {
    fs::create_dir_all(dir).context("Failed to create draw cache directory")?;
    let path = cache_path(dir, record.period());
    let json = serde_json::to_string_pretty(record).context("Failed to serialize draw")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::record::PrizeTable;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Counts how often the wrapped source is hit.
    struct CountingSource {
        calls: AtomicUsize,
        prizes: PrizeTable,
        available: bool,
    }

    impl CountingSource {
        fn new(prizes: PrizeTable) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                prizes,
                available: true,
            }
        }
    }

    impl DrawSource for CountingSource {
        fn fetch(&self, period: &DrawPeriod) -> Option<DrawRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.available {
                return None;
            }
            DrawRecord::new(period.clone(), [1, 2, 3, 4, 5], [1, 2], self.prizes)
        }
    }

    fn period() -> DrawPeriod {
        DrawPeriod::parse("23056").unwrap()
    }

    #[test]
    fn test_memory_cache_hits_once() {
        let cache = CachedDrawSource::new(CountingSource::new(PrizeTable::new(100, 10)));

        let first = cache.fetch(&period()).unwrap();
        let second = cache.fetch(&period()).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_lookups_fetch_once() {
        let cache = CachedDrawSource::new(CountingSource::new(PrizeTable::new(100, 10)));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| assert!(cache.fetch(&period()).is_some()));
            }
        });

        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unavailable_not_cached() {
        let mut source = CountingSource::new(PrizeTable::new(100, 10));
        source.available = false;
        let cache = CachedDrawSource::new(source);

        assert!(cache.fetch(&period()).is_none());
        assert!(cache.fetch(&period()).is_none());
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disk_cache_round_trip() {
        let dir = tempdir().unwrap();

        let cache = CachedDrawSource::with_dir(
            CountingSource::new(PrizeTable::new(100, 10)),
            dir.path().to_path_buf(),
        );
        let fetched = cache.fetch(&period()).unwrap();
        assert!(dir.path().join("23056.json").exists());

        // A fresh cache over a source that has nothing still answers from disk
        let mut offline = CountingSource::new(PrizeTable::new(100, 10));
        offline.available = false;
        let reloaded = CachedDrawSource::with_dir(offline, dir.path().to_path_buf());
        assert_eq!(reloaded.fetch(&period()), Some(fetched));
        assert_eq!(reloaded.inner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_estimated_prizes_stay_in_memory() {
        let dir = tempdir().unwrap();
        let cache = CachedDrawSource::with_dir(
            CountingSource::new(PrizeTable::fallback(100, 10)),
            dir.path().to_path_buf(),
        );

        assert!(cache.fetch(&period()).is_some());
        assert!(!dir.path().join("23056.json").exists());
    }

    #[test]
    fn test_corrupt_cache_file_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("23056.json"), "{not json").unwrap();

        let cache = CachedDrawSource::with_dir(
            CountingSource::new(PrizeTable::new(100, 10)),
            dir.path().to_path_buf(),
        );
        assert!(cache.fetch(&period()).is_some());
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
    }
}
