//! Read-through cache in front of another [`StateStore`].

use std::time::{Duration, Instant};

use {async_trait::async_trait, chrono::Utc, tokio::sync::Mutex, tracing::debug};

use crate::{Result, store::StateStore, types::SubscriptionState};

struct Cached {
    state: SubscriptionState,
    loaded_at: Instant,
}

/// Serves loads from memory for `ttl` and writes through on save.
///
/// Loads always hand out a deep copy. The cache lock is held across the
/// inner save so a concurrent load never sees a document newer than what
/// is durable.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    cache: Mutex<Option<Cached>>,
}

impl<S: StateStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the cached copy so the next load goes to the inner store.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }
}

#[async_trait]
impl<S: StateStore> StateStore for CachedStore<S> {
    async fn load(&self) -> Result<SubscriptionState> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref()
            && cached.loaded_at.elapsed() < self.ttl
        {
            return Ok(cached.state.clone());
        }

        let state = self.inner.load().await?;
        debug!(count = state.len(), "subscription state cache refreshed");
        *cache = Some(Cached {
            state: state.clone(),
            loaded_at: Instant::now(),
        });
        Ok(state)
    }

    async fn save(&self, state: &SubscriptionState) -> Result<()> {
        let mut cache = self.cache.lock().await;
        if let Err(e) = self.inner.save(state).await {
            *cache = None;
            return Err(e);
        }
        let mut doc = state.clone();
        doc.stamp(Utc::now());
        *cache = Some(Cached {
            state: doc,
            loaded_at: Instant::now(),
        });
        Ok(())
    }
}
