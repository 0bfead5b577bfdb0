//! In-memory store for tests and dry runs.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use {async_trait::async_trait, chrono::Utc};

use crate::{Error, Result, store::StateStore, types::SubscriptionState};

/// In-memory store. No persistence.
///
/// Counts every `load` and `save` and can be told to fail either, which is
/// how callers check that validation happens before any I/O and that a
/// failed save is surfaced.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<SubscriptionState>,
    loads: AtomicUsize,
    saves: AtomicUsize,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    pub fn with_state(state: SubscriptionState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Copy of what is currently stored, without counting as a load.
    pub fn snapshot(&self) -> SubscriptionState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn load(&self) -> Result<SubscriptionState> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Error::storage("injected load failure"));
        }
        Ok(self.snapshot())
    }

    async fn save(&self, state: &SubscriptionState) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::storage("injected save failure"));
        }
        let mut doc = state.clone();
        doc.stamp(Utc::now());
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = doc;
        Ok(())
    }
}
