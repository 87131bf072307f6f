use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use crate::errors::FetchError;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, FetchError>>>;

enum Entry<V> {
    Pending(SharedFetch<V>),
    Resolved(V),
}

/// memoizing cache for async requests keyed by `K`
///
/// a key is either pending, shared by every caller awaiting it, or resolved.
/// failed requests are forgotten so the next caller retries.
pub struct RequestCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> Default for RequestCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> RequestCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        // entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// resolved value for `key`, or the result of joining / starting `fetch`
    ///
    /// `fetch` is only called when nothing is cached or in flight for `key`.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
    {
        let request = {
            let mut entries = self.lock();
            match entries.get(&key) {
                Some(Entry::Resolved(value)) => return Ok(value.clone()),
                Some(Entry::Pending(request)) => request.clone(),
                None => {
                    let request = fetch().boxed().shared();
                    entries.insert(key.clone(), Entry::Pending(request.clone()));
                    request
                }
            }
        };

        let result = request.clone().await;

        let mut entries = self.lock();
        let still_ours = matches!(
            entries.get(&key),
            Some(Entry::Pending(pending)) if pending.ptr_eq(&request)
        );
        if still_ours {
            match &result {
                Ok(value) => {
                    entries.insert(key, Entry::Resolved(value.clone()));
                }
                Err(_) => {
                    entries.remove(&key);
                }
            }
        }
        result
    }

    /// resolved value, if any
    pub fn get(&self, key: &K) -> Option<V> {
        match self.lock().get(key) {
            Some(Entry::Resolved(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        matches!(self.lock().get(key), Some(Entry::Pending(_)))
    }

    /// drop a resolved or pending entry, waiters already joined still complete
    pub fn invalidate(&self, key: &K) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// number of resolved entries
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|entry| matches!(entry, Entry::Resolved(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_resolved_values_are_reused() {
        let cache: RequestCache<u32, String> = RequestCache::new();
        let calls = AtomicUsize::new(0);

        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, FetchError>("nav".to_string()) }
        };
        assert_eq!(block_on(cache.get_or_fetch(1, fetch)).unwrap(), "nav");

        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, FetchError>("other".to_string()) }
        };
        assert_eq!(block_on(cache.get_or_fetch(1, fetch)).unwrap(), "nav");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&1), Some("nav".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_callers_share_one_request() {
        let cache: RequestCache<&str, u64> = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();
        let gate = gate.shared();

        let start = |calls: Arc<AtomicUsize>, gate: Shared<oneshot::Receiver<()>>| {
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    gate.await.map_err(|e| FetchError::Request { message: e.to_string() })?;
                    Ok::<u64, FetchError>(42)
                }
            }
        };

        let first = cache.get_or_fetch("120503-365", start(calls.clone(), gate.clone()));
        let second = cache.get_or_fetch("120503-365", start(calls.clone(), gate.clone()));
        let open = async {
            let _ = release.send(());
        };

        let (a, b, _) = block_on(async { futures::join!(first, second, open) });
        assert_eq!(a.unwrap(), 42);
        assert_eq!(b.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!cache.is_pending(&"120503-365"));
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache: RequestCache<u32, u32> = RequestCache::new();

        let failed = block_on(cache.get_or_fetch(7, || async {
            Err(FetchError::Request { message: "timeout".to_string() })
        }));
        assert_eq!(failed, Err(FetchError::Request { message: "timeout".to_string() }));
        assert!(cache.get(&7).is_none());
        assert!(!cache.is_pending(&7));

        let retried = block_on(cache.get_or_fetch(7, || async { Ok(3) }));
        assert_eq!(retried, Ok(3));
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let cache: RequestCache<u32, u32> = RequestCache::new();
        block_on(cache.get_or_fetch(1, || async { Ok(1) })).unwrap();
        cache.invalidate(&1);
        assert!(cache.is_empty());
        assert_eq!(block_on(cache.get_or_fetch(1, || async { Ok(2) })), Ok(2));

        cache.clear();
        assert!(cache.get(&1).is_none());
    }
}
