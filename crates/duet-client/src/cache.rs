use std::future::Future;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use duet_types::models::Pair;

use crate::error::ClientError;

/// What the client remembers between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPair {
    pub pair_id: Uuid,
    pub join_code: String,
}

impl From<&Pair> for CachedPair {
    fn from(pair: &Pair) -> Self {
        Self {
            pair_id: pair.id,
            join_code: pair.join_code.clone(),
        }
    }
}

/// Authoritative pair lookups the cache reconciles against.
pub trait PairLookup {
    /// `None` when the pair does not exist or the user is not in it.
    fn pair_by_id(&self, pair_id: Uuid) -> impl Future<Output = Result<Option<Pair>, ClientError>> + Send;

    /// The user's most recent pair, if any.
    fn current_pair(&self) -> impl Future<Output = Result<Option<Pair>, ClientError>> + Send;
}

/// Local cache of the user's pair id and join code.
///
/// Advisory only: every `resolve` confirms the cached id with the server,
/// and a cached id the server does not recognise is dropped and looked up
/// again from scratch.
#[derive(Debug, Default)]
pub struct PairCache {
    path: Option<PathBuf>,
    entry: Option<CachedPair>,
}

impl PairCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the cache file at `path`. A missing file is an empty cache; an
    /// unreadable one is discarded.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let entry = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Discarding corrupt pair cache {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            entry,
        })
    }

    pub fn get(&self) -> Option<&CachedPair> {
        self.entry.as_ref()
    }

    pub fn store(&mut self, pair: &Pair) -> Result<(), ClientError> {
        let entry = CachedPair::from(pair);
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(path, serde_json::to_vec_pretty(&entry)?)?;
        }
        self.entry = Some(entry);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), ClientError> {
        self.entry = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Find the user's pair, preferring the cached id.
    pub async fn resolve<L: PairLookup>(&mut self, lookup: &L) -> Result<Option<Pair>, ClientError> {
        if let Some(cached) = self.entry.clone() {
            if let Some(pair) = lookup.pair_by_id(cached.pair_id).await? {
                if pair.join_code != cached.join_code {
                    self.store(&pair)?;
                }
                return Ok(Some(pair));
            }

            debug!(pair_id = %cached.pair_id, "Cached pair rejected by server, re-resolving");
            self.clear()?;
        }

        match lookup.current_pair().await? {
            Some(pair) => {
                self.store(&pair)?;
                Ok(Some(pair))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    #[derive(Default)]
    struct FakeLookup {
        pairs: HashMap<Uuid, Pair>,
        current: Option<Pair>,
        by_id_calls: AtomicUsize,
        current_calls: AtomicUsize,
    }

    impl PairLookup for FakeLookup {
        async fn pair_by_id(&self, pair_id: Uuid) -> Result<Option<Pair>, ClientError> {
            self.by_id_calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.pairs.get(&pair_id).cloned())
        }

        async fn current_pair(&self) -> Result<Option<Pair>, ClientError> {
            self.current_calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.current.clone())
        }
    }

    fn pair(code: &str) -> Pair {
        Pair {
            id: Uuid::new_v4(),
            join_code: code.into(),
            user_a: Uuid::new_v4(),
            user_b: None,
            created_at: Utc::now(),
        }
    }

    fn lookup_with(current: &Pair) -> FakeLookup {
        FakeLookup {
            pairs: HashMap::from([(current.id, current.clone())]),
            current: Some(current.clone()),
            ..FakeLookup::default()
        }
    }

    #[tokio::test]
    async fn empty_cache_asks_for_current_pair() {
        let p = pair("ABC234");
        let lookup = lookup_with(&p);
        let mut cache = PairCache::in_memory();

        let resolved = cache.resolve(&lookup).await.unwrap();
        assert_eq!(resolved, Some(p.clone()));
        assert_eq!(cache.get(), Some(&CachedPair::from(&p)));
        assert_eq!(lookup.by_id_calls.load(Ordering::Relaxed), 0);
        assert_eq!(lookup.current_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn valid_cached_id_skips_current_lookup() {
        let p = pair("ABC234");
        let lookup = lookup_with(&p);
        let mut cache = PairCache::in_memory();
        cache.store(&p).unwrap();

        assert_eq!(cache.resolve(&lookup).await.unwrap(), Some(p));
        assert_eq!(lookup.by_id_calls.load(Ordering::Relaxed), 1);
        assert_eq!(lookup.current_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn stale_cached_id_is_dropped_and_re_resolved() {
        let stale = pair("OLD234");
        let fresh = pair("NEW789");
        let lookup = lookup_with(&fresh);
        let mut cache = PairCache::in_memory();
        cache.store(&stale).unwrap();

        let resolved = cache.resolve(&lookup).await.unwrap();
        assert_eq!(resolved.map(|p| p.id), Some(fresh.id));
        assert_eq!(cache.get().map(|c| c.join_code.as_str()), Some("NEW789"));
        assert_eq!(lookup.current_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn stale_cache_without_any_pair_ends_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.json");

        let mut cache = PairCache::load(&path).unwrap();
        cache.store(&pair("OLD234")).unwrap();
        assert!(path.exists());

        let lookup = FakeLookup::default();
        assert_eq!(cache.resolve(&lookup).await.unwrap(), None);
        assert!(cache.get().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn cache_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pair.json");
        let p = pair("KX7P2Q");

        PairCache::load(&path).unwrap().store(&p).unwrap();

        let reloaded = PairCache::load(&path).unwrap();
        assert_eq!(reloaded.get(), Some(&CachedPair::from(&p)));
    }

    #[test]
    fn corrupt_cache_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.json");
        std::fs::write(&path, b"{not json").unwrap();

        let cache = PairCache::load(&path).unwrap();
        assert!(cache.get().is_none());
    }
}
