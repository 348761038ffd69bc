use crate::document::read_file;
use crate::error::LoadError;
use crate::index::VectorIndex;
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct CachedIndex {
    index: Arc<VectorIndex>,
    built_at: Instant,
}

/// Built indexes keyed by document content hash.
///
/// A changed file hashes to a new key, so it is indexed again. Entries older
/// than the TTL are dropped on access. A zero TTL disables the cache.
pub struct IndexCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedIndex>>,
}

impl IndexCache {
    pub fn new(ttl: Duration) -> Self {
        IndexCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, key: &str) -> Option<Arc<VectorIndex>> {
        let mut entries = self.entries.lock().await;
        let fresh = entries.get(key)?.built_at.elapsed() < self.ttl;
        if fresh {
            return entries.get(key).map(|entry| entry.index.clone());
        }
        debug!("Index cache entry {} expired", key);
        entries.remove(key);
        None
    }

    pub async fn insert(&self, key: String, index: Arc<VectorIndex>) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.lock().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.built_at.elapsed() < ttl);
        entries.insert(
            key,
            CachedIndex {
                index,
                built_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// SHA-256 of the file contents, hex encoded
pub async fn fingerprint(path: &Path) -> Result<String, LoadError> {
    let bytes = read_file(path).await?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
