//! Ordered, ejectable interceptor registries.
//!
//! # Design
//! A registry is an arena of optional entries. `register` appends and returns
//! the slot index; `eject` empties the slot but never compacts, so ids handed
//! out earlier stay valid and are never reused.
//!
//! Registries are shared by every call made through the same client. Drains
//! re-read the arena before each step and hold the lock only while cloning
//! the next handler, so an entry registered or ejected mid-drain is seen by
//! any call that has not yet reached its slot.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use tracing::trace;

use crate::config::Config;
use crate::error::{ResponseError, Result};
use crate::response::HttpResponse;

/// Stable index of a registered interceptor.
pub type InterceptorId = usize;

/// Success transform; may suspend, and an `Err` aborts the call.
pub type OnFulfilled<T> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Error transform applied to a failed response.
pub type OnRejected = Arc<dyn Fn(ResponseError) -> ResponseError + Send + Sync>;

/// Wrap an async closure as a success transform.
pub fn fulfilled<T, F, Fut>(f: F) -> OnFulfilled<T>
where
    T: 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(move |value: T| -> BoxFuture<'static, Result<T>> { Box::pin(f(value)) })
}

/// Wrap a synchronous closure as a success transform.
pub fn fulfilled_sync<T, F>(f: F) -> OnFulfilled<T>
where
    T: Send + 'static,
    F: Fn(T) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(move |value: T| -> BoxFuture<'static, Result<T>> {
        let result = f(value);
        Box::pin(async move { result })
    })
}

pub fn rejected<F>(f: F) -> OnRejected
where
    F: Fn(ResponseError) -> ResponseError + Send + Sync + 'static,
{
    Arc::new(f)
}

struct Entry<T> {
    on_fulfilled: Option<OnFulfilled<T>>,
    on_rejected: Option<OnRejected>,
}

/// Interceptors for one pipeline stage. Clones share the same arena.
pub struct InterceptorRegistry<T> {
    entries: Arc<Mutex<Vec<Option<Entry<T>>>>>,
}

impl<T> Clone for InterceptorRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for InterceptorRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T> std::fmt::Debug for InterceptorRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorRegistry")
            .field("slots", &self.len())
            .field("active", &self.active())
            .finish()
    }
}

impl<T> InterceptorRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Option<Entry<T>>>> {
        // Entries are replaced whole, so a poisoned arena is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a handler pair and return its id. Either half may be absent.
    pub fn register(
        &self,
        on_fulfilled: Option<OnFulfilled<T>>,
        on_rejected: Option<OnRejected>,
    ) -> InterceptorId {
        let mut entries = self.lock();
        entries.push(Some(Entry {
            on_fulfilled,
            on_rejected,
        }));
        entries.len() - 1
    }

    /// Tombstone `id`. Unknown or already ejected ids are ignored.
    pub fn eject(&self, id: InterceptorId) {
        if let Some(slot) = self.lock().get_mut(id) {
            *slot = None;
        }
    }

    /// Slots handed out so far, tombstones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots that have not been ejected.
    pub fn active(&self) -> usize {
        self.lock().iter().filter(|slot| slot.is_some()).count()
    }

    fn fulfilled_at(&self, index: usize) -> Option<Option<OnFulfilled<T>>> {
        let entries = self.lock();
        let slot = entries.get(index)?;
        Some(slot.as_ref().and_then(|entry| entry.on_fulfilled.clone()))
    }

    fn rejected_at(&self, index: usize) -> Option<Option<OnRejected>> {
        let entries = self.lock();
        let slot = entries.get(index)?;
        Some(slot.as_ref().and_then(|entry| entry.on_rejected.clone()))
    }

    /// Fold the success halves over `value`, awaiting each before the next.
    pub async fn run_fulfilled(&self, mut value: T) -> Result<T> {
        let mut index = 0;
        while let Some(step) = self.fulfilled_at(index) {
            if let Some(transform) = step {
                trace!(index, "running success interceptor");
                value = transform(value).await?;
            }
            index += 1;
        }
        Ok(value)
    }

    /// Fold the error halves over `error` in registration order.
    pub fn run_rejected(&self, mut error: ResponseError) -> ResponseError {
        let mut index = 0;
        while let Some(step) = self.rejected_at(index) {
            if let Some(transform) = step {
                trace!(index, "running error interceptor");
                error = transform(error);
            }
            index += 1;
        }
        error
    }
}

/// The two registries owned by a client.
#[derive(Debug, Clone, Default)]
pub struct Interceptors {
    /// Rewrites the effective `Config` before the request is built.
    pub request: InterceptorRegistry<Config>,
    /// Rewrites failed responses before they are raised.
    pub response: InterceptorRegistry<HttpResponse>,
}
