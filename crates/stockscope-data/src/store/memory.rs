//! Process-local series store.

use async_trait::async_trait;
use std::collections::HashMap;
use stockscope_core::error::StoreError;
use stockscope_core::types::Symbol;
use tokio::sync::RwLock;

use super::{CacheEntry, SeriesStore};

/// In-memory store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySeriesStore {
    entries: RwLock<HashMap<Symbol, CacheEntry>>,
}

impl MemorySeriesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeriesStore for MemorySeriesStore {
    async fn load(&self, symbol: &Symbol) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.read().await.get(symbol).cloned())
    }

    async fn put(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(entry.symbol.clone(), entry.clone());
        Ok(())
    }

    async fn remove(&self, symbol: &Symbol) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(symbol).is_some())
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        Ok(count)
    }

    async fn symbols(&self) -> Result<Vec<Symbol>, StoreError> {
        let mut symbols: Vec<Symbol> = self.entries.read().await.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::entry;

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = MemorySeriesStore::new();
        let acme = entry("ACME", 5);

        assert!(store.get(&acme.symbol).await.is_none());
        store.put(&acme).await.unwrap();
        assert_eq!(store.get(&acme.symbol).await, Some(acme.clone()));

        store.put(&entry("BETA", 3)).await.unwrap();
        assert_eq!(
            store.symbols().await.unwrap(),
            vec![Symbol::parse("ACME").unwrap(), Symbol::parse("BETA").unwrap()]
        );

        assert!(store.remove(&acme.symbol).await.unwrap());
        assert!(!store.remove(&acme.symbol).await.unwrap());
        assert_eq!(store.clear().await.unwrap(), 1);
    }
}
