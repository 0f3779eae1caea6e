//! In-process tag-aware cache store with single-flight computation.
//!
//! One lock guards both the key→entry map and the tag→keys index, so tag
//! invalidation is atomic with respect to readers: no reader can observe a
//! half-purged tag. Missing keys are computed under a per-key async gate,
//! so concurrent callers for the same key run the expensive computation
//! exactly once.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use gamedex_common::error::AppError;

struct StoredEntry {
    value: Value,
    tags: Vec<String>,
    inserted: Instant,
}

struct StoreState {
    entries: HashMap<String, StoredEntry>,
    tags: HashMap<String, HashSet<String>>,
    /// Per-key single-flight gates. A gate is dropped once its key is
    /// populated; it stays if the computation failed, so consecutive
    /// failures for one key still serialize.
    inflight: HashMap<String, Arc<AsyncMutex<()>>>,
    /// Bumped on every invalidation. A computation that started before an
    /// invalidation must not re-populate the store afterwards, or a page
    /// predating the write would become reachable again.
    version: u64,
}

/// Snapshot of cache counters at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Shared tag-aware cache for serialized catalog pages.
pub struct TagCache {
    state: Mutex<StoreState>,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TagCache {
    /// Create a cache whose entries expire `ttl` after insertion.
    /// `None` disables expiry; tag invalidation remains the coherence
    /// mechanism either way.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                entries: HashMap::new(),
                tags: HashMap::new(),
                inflight: HashMap::new(),
                version: 0,
            }),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, or run `compute`, store its result
    /// under `tags`, and return it.
    ///
    /// Concurrent callers for the same missing key serialize on a per-key
    /// gate; the losers re-check the store after the winner populates it.
    /// A failed computation propagates to the caller and leaves the store
    /// unmodified; errors are never cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        tags: &[&str],
        compute: F,
    ) -> Result<Value, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, AppError>>,
    {
        if let Some(value) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        let gate = self.gate(key);
        let _guard = gate.lock().await;

        // Another caller may have populated the key while we waited.
        if let Some(value) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let version = self.state.lock().unwrap_or_else(|e| e.into_inner()).version;
        let value = compute().await?;
        self.insert(key, tags, value.clone(), version);
        Ok(value)
    }

    /// Remove every key registered under `tag`, atomically with respect to
    /// readers. Returns the number of entries purged.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.version = state.version.wrapping_add(1);

        let Some(keys) = state.tags.remove(tag) else {
            return 0;
        };

        let mut purged = 0;
        for key in keys {
            if let Some(entry) = state.entries.remove(&key) {
                purged += 1;
                for other in &entry.tags {
                    if other != tag {
                        deregister(&mut state.tags, other, &key);
                    }
                }
            }
        }

        tracing::debug!(tag, purged, "Cache tag invalidated");
        purged
    }

    /// Counter snapshot, for health/diagnostic endpoints.
    pub fn stats(&self) -> CacheStats {
        let entries = self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let expired = match state.entries.get(key) {
            None => return None,
            Some(entry) => matches!(self.ttl, Some(ttl) if entry.inserted.elapsed() > ttl),
        };

        if expired {
            // Lazy eviction: an expired entry is a miss.
            if let Some(entry) = state.entries.remove(key) {
                for tag in &entry.tags {
                    deregister(&mut state.tags, tag, key);
                }
            }
            return None;
        }

        state.entries.get(key).map(|entry| entry.value.clone())
    }

    fn gate(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn insert(&self, key: &str, tags: &[&str], value: Value, version: u64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if state.version != version {
            // An invalidation raced this computation; the value may predate
            // the write that triggered it. The caller still gets its result,
            // the store stays empty so the next reader recomputes.
            tracing::debug!(key, "Discarding computed page superseded by invalidation");
            state.inflight.remove(key);
            return;
        }

        state.entries.insert(
            key.to_string(),
            StoredEntry {
                value,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                inserted: Instant::now(),
            },
        );
        for tag in tags {
            state
                .tags
                .entry(tag.to_string())
                .or_default()
                .insert(key.to_string());
        }
        state.inflight.remove(key);
    }
}

fn deregister(tags: &mut HashMap<String, HashSet<String>>, tag: &str, key: &str) {
    if let Some(keys) = tags.get_mut(tag) {
        keys.remove(key);
        if keys.is_empty() {
            tags.remove(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicU32;

    fn cache() -> Arc<TagCache> {
        Arc::new(TagCache::new(None))
    }

    #[tokio::test]
    async fn test_hit_skips_recompute() {
        let cache = cache();
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let value = cache
                .get_or_compute("videogame-1-5", &["videogame"], move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(["zelda"]))
                })
                .await
                .unwrap();
            assert_eq!(value, json!(["zelda"]));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_callers_compute_once() {
        let cache = cache();
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute("editor-1-5", &["editor"], move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(json!({"page": 1}))
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), json!({"page": 1}));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_compute_failure_is_not_cached() {
        let cache = cache();

        let err = cache
            .get_or_compute("category-1-5", &["category"], || async {
                Err(AppError::Internal("repository unavailable".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        // The failure must not have left a placeholder behind.
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let value = cache
            .get_or_compute("category-1-5", &["category"], move || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(json!(["rpg"]))
            })
            .await
            .unwrap();
        assert_eq!(value, json!(["rpg"]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_tag_purges_every_page() {
        let cache = cache();

        for page in 1..=3 {
            let key = format!("videogame-{}-5", page);
            cache
                .get_or_compute(&key, &["videogame"], || async { Ok(json!(page)) })
                .await
                .unwrap();
        }
        cache
            .get_or_compute("editor-1-5", &["editor"], || async { Ok(json!("ubisoft")) })
            .await
            .unwrap();

        assert_eq!(cache.invalidate_tag("videogame"), 3);
        assert_eq!(cache.stats().entries, 1);

        // Purged pages recompute; the other tag's page survives.
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        cache
            .get_or_compute("videogame-1-5", &["videogame"], move || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(json!("fresh"))
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let editors = cache
            .get_or_compute("editor-1-5", &["editor"], || async {
                panic!("editor page should still be cached")
            })
            .await
            .unwrap();
        assert_eq!(editors, json!("ubisoft"));
    }

    #[tokio::test]
    async fn test_invalidate_unknown_tag_is_noop() {
        let cache = cache();
        assert_eq!(cache.invalidate_tag("videogame"), 0);
    }

    #[tokio::test]
    async fn test_ttl_expiry_forces_recompute() {
        let cache = Arc::new(TagCache::new(Some(Duration::from_millis(10))));
        let calls = Arc::new(AtomicU32::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            cache
                .get_or_compute("videogame-1-5", &["videogame"], move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!("page"))
                })
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(25)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_invalidation_during_compute_is_not_overwritten() {
        let cache = cache();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let release = Arc::new(tokio::sync::Notify::new());

        let task = {
            let cache = cache.clone();
            let release = release.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute("videogame-1-5", &["videogame"], move || async move {
                        let _ = started_tx.send(());
                        release.notified().await;
                        Ok(json!("stale"))
                    })
                    .await
                    .unwrap()
            })
        };

        started_rx.await.unwrap();
        // A write lands while the page is still being computed.
        cache.invalidate_tag("videogame");
        release.notify_one();

        // The racing caller still gets its computed value...
        assert_eq!(task.await.unwrap(), json!("stale"));

        // ...but the store must not have kept it.
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let value = cache
            .get_or_compute("videogame-1-5", &["videogame"], move || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(json!("fresh"))
            })
            .await
            .unwrap();
        assert_eq!(value, json!("fresh"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
