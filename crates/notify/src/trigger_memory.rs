//! Recording trigger for tests.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::{Error, Result, entry::Entry, trigger::WorkflowTrigger};

/// Remembers every entry it was asked to trigger for.
pub struct InMemoryTrigger {
    configured: bool,
    fail: AtomicBool,
    triggered: Mutex<Vec<Entry>>,
}

impl InMemoryTrigger {
    pub fn new() -> Self {
        Self {
            configured: true,
            fail: AtomicBool::new(false),
            triggered: Mutex::new(Vec::new()),
        }
    }

    /// A trigger that reports itself as not configured.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn triggered(&self) -> Vec<Entry> {
        self.triggered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for InMemoryTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowTrigger for InMemoryTrigger {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn trigger(&self, entry: &Entry) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::downstream("dispatch returned 500 Internal Server Error"));
        }
        self.triggered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
        Ok(())
    }
}
