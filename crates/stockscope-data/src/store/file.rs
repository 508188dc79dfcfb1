//! Directory of JSON cache files, one per symbol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use stockscope_core::error::StoreError;
use stockscope_core::types::Symbol;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{CacheEntry, SeriesStore};

const FORMAT_VERSION: u32 = 1;
const EXTENSION: &str = "json";

#[derive(Serialize)]
struct StoredEntryRef<'a> {
    format_version: u32,
    entry: &'a CacheEntry,
}

#[derive(Deserialize)]
struct StoredEntry {
    format_version: u32,
    entry: CacheEntry,
}

/// Persists each entry as `<dir>/<SYMBOL>.json`.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous entry intact.
#[derive(Debug)]
pub struct FileSeriesStore {
    dir: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileSeriesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tmp_counter: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.dir.join(format!("{}.{}", symbol, EXTENSION))
    }

    fn tmp_path_for(&self, symbol: &Symbol) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}.{}.tmp", symbol, std::process::id(), n))
    }

    fn decode(symbol: &Symbol, bytes: &[u8]) -> Result<CacheEntry, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            symbol: symbol.to_string(),
            reason,
        };

        let stored: StoredEntry =
            serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
        if stored.format_version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {}",
                stored.format_version
            )));
        }
        if &stored.entry.symbol != symbol || stored.entry.series.symbol() != symbol {
            return Err(corrupt(format!(
                "file holds data for {}",
                stored.entry.symbol
            )));
        }
        stored
            .entry
            .series
            .validate()
            .map_err(|e| corrupt(e.to_string()))?;
        Ok(stored.entry)
    }

    /// Symbol named by a cache file path, if it is one.
    fn symbol_of(path: &Path) -> Option<Symbol> {
        if path.extension()? != EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if stem.starts_with('.') {
            return None;
        }
        Symbol::parse(stem).ok()
    }
}

#[async_trait]
impl SeriesStore for FileSeriesStore {
    async fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        debug!(dir = %self.dir.display(), "Series store ready");
        Ok(())
    }

    async fn load(&self, symbol: &Symbol) -> Result<Option<CacheEntry>, StoreError> {
        let bytes = match fs::read(self.path_for(symbol)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Self::decode(symbol, &bytes).map(Some)
    }

    async fn put(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&StoredEntryRef {
            format_version: FORMAT_VERSION,
            entry,
        })
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

        fs::create_dir_all(&self.dir).await?;
        let tmp = self.tmp_path_for(&entry.symbol);
        let written = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            fs::rename(&tmp, self.path_for(&entry.symbol)).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, symbol: &Symbol) -> Result<bool, StoreError> {
        match fs::remove_file(self.path_for(symbol)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut removed = 0;
        for symbol in self.symbols().await? {
            if self.remove(&symbol).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn symbols(&self) -> Result<Vec<Symbol>, StoreError> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut symbols = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            if let Some(symbol) = Self::symbol_of(&item.path()) {
                symbols.push(symbol);
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::entry;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeriesStore::new(dir.path().join("cache"));
        store.init().await.unwrap();

        let acme = entry("ACME", 20);
        store.put(&acme).await.unwrap();

        let loaded = store.load(&acme.symbol).await.unwrap().unwrap();
        assert_eq!(loaded, acme);
        assert!(dir.path().join("cache/ACME.json").exists());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let acme = entry("ACME", 5);
        {
            let store = FileSeriesStore::new(dir.path());
            store.put(&acme).await.unwrap();
        }

        let reopened = FileSeriesStore::new(dir.path());
        assert_eq!(reopened.get(&acme.symbol).await, Some(acme));
    }

    #[tokio::test]
    async fn test_put_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeriesStore::new(dir.path());

        store.put(&entry("ACME", 5)).await.unwrap();
        let newer = entry("ACME", 8);
        store.put(&newer).await.unwrap();

        assert_eq!(store.get(&newer.symbol).await, Some(newer));
        // No temporary files left behind.
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("ACME.json")]);
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeriesStore::new(dir.path());

        let symbol = Symbol::parse("NONE").unwrap();
        assert!(store.load(&symbol).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeriesStore::new(dir.path());
        let symbol = Symbol::parse("ACME").unwrap();

        std::fs::write(dir.path().join("ACME.json"), b"{ not json").unwrap();

        assert!(matches!(
            store.load(&symbol).await,
            Err(StoreError::Corrupt { .. })
        ));
        assert!(store.get(&symbol).await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_symbol_or_version_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeriesStore::new(dir.path());
        let beta = entry("BETA", 3);
        store.put(&beta).await.unwrap();

        std::fs::copy(dir.path().join("BETA.json"), dir.path().join("ACME.json")).unwrap();
        let acme = Symbol::parse("ACME").unwrap();
        assert!(matches!(store.load(&acme).await, Err(StoreError::Corrupt { .. })));

        let mut json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("BETA.json")).unwrap()).unwrap();
        json["format_version"] = serde_json::json!(99);
        std::fs::write(dir.path().join("BETA.json"), json.to_string()).unwrap();
        assert!(matches!(
            store.load(&beta.symbol).await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_unordered_series_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeriesStore::new(dir.path());
        let acme = entry("ACME", 3);
        store.put(&acme).await.unwrap();

        let path = dir.path().join("ACME.json");
        let mut json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let points = json["entry"]["series"]["points"].as_array_mut().unwrap();
        points.swap(0, 2);
        std::fs::write(&path, json.to_string()).unwrap();

        assert!(store.get(&acme.symbol).await.is_none());
    }

    #[tokio::test]
    async fn test_symbols_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSeriesStore::new(dir.path());
        store.put(&entry("BETA", 3)).await.unwrap();
        store.put(&entry("ACME", 3)).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let symbols = store.symbols().await.unwrap();
        assert_eq!(
            symbols,
            vec![Symbol::parse("ACME").unwrap(), Symbol::parse("BETA").unwrap()]
        );

        assert!(store.remove(&symbols[0]).await.unwrap());
        assert!(!store.remove(&symbols[0]).await.unwrap());
        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.symbols().await.unwrap().is_empty());
    }
}
