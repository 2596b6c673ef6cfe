//! Coalescing of concurrent identical requests.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use pin_project_lite::pin_project;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll, ready};

/// A cloneable handle to a request that may still be running.
///
/// Every clone resolves to a clone of the same output. Two handles returned
/// for the same key while the request was in flight are the same shared
/// future ([`Shared::ptr_eq`] holds).
pub type InFlight<T> = Shared<BoxFuture<'static, T>>;

struct Registry<T> {
    entries: Mutex<HashMap<String, InFlight<T>>>,
}
impl<T> Registry<T> {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, InFlight<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pin_project! {
    /// Drives the factory future and drops its registration the moment it
    /// completes, before the output is handed to any waiting caller.
    struct Settle<F, T> {
        #[pin]
        inner: F,
        registry: Weak<Registry<T>>,
        key: String,
    }
}
impl<F, T> Future for Settle<F, T>
where
    F: Future<Output = T>,
{
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.project();
        let output = ready!(this.inner.poll(cx));
        if let Some(registry) = this.registry.upgrade() {
            registry.lock().remove(this.key.as_str());
        }
        Poll::Ready(output)
    }
}

/// In-flight request registry keyed by request identity.
///
/// While a request for a key is unsettled, every call to
/// [`dedupe()`](Self::dedupe) with that key returns the same shared future
/// and the factory is not invoked again. Once it settles (success or
/// failure alike) the key is released, so the next call starts fresh work.
/// That is what makes a failed load retryable.
///
/// There is no cancellation. If every caller drops its handle before the
/// request completes, the registration stays in place and the next caller
/// for that key resumes the same request rather than starting another one.
///
/// # Examples
///
/// ```
/// use wiki_asyncutils::Deduplicator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let dedup = Deduplicator::new();
/// let first = dedup.dedupe("events", || async { 12 });
/// let second = dedup.dedupe("events", || async { 0 });
/// assert!(first.ptr_eq(&second));
/// assert_eq!(tokio::join!(first, second), (12, 12));
/// assert!(!dedup.is_pending("events"));
/// # }
/// ```
pub struct Deduplicator<T> {
    registry: Arc<Registry<T>>,
}
impl<T> Default for Deduplicator<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Registry { entries: Mutex::new(HashMap::new()) }),
        }
    }
}
impl<T> Deduplicator<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the in-flight request for `key`, or starts one with `factory`.
    ///
    /// The factory is called while the registry lock is held, so it must
    /// only *construct* the future (an `async` block or an `async fn` call)
    /// and must not call back into this deduplicator synchronously.
    pub fn dedupe<F, Fut>(&self, key: impl Into<String>, factory: F) -> InFlight<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let key = key.into();
        let mut entries = self.registry.lock();
        if let Some(existing) = entries.get(&key) {
            tracing::debug!(key, "joining in-flight request");
            return existing.clone();
        }
        let settle = Settle {
            inner: factory(),
            registry: Arc::downgrade(&self.registry),
            key: key.clone(),
        };
        let shared = settle.boxed().shared();
        tracing::debug!(key, "starting request");
        entries.insert(key, shared.clone());
        shared
    }

    /// Whether a request for `key` is currently registered.
    pub fn is_pending(&self, key: &str) -> bool {
        self.registry.lock().contains_key(key)
    }

    /// Keys of every registered request, sorted.
    pub fn pending(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.registry.lock().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}
