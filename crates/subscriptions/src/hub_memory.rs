//! Recording hub for tests and offline runs.

use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    Error, Result,
    hub::{HubMode, PubSubHub},
};

/// One request seen by [`InMemoryHub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubCall {
    pub mode: HubMode,
    pub channel_id: String,
    pub lease_seconds: Option<u64>,
}

/// Accepts everything unless told otherwise and remembers every call.
#[derive(Default)]
pub struct InMemoryHub {
    calls: Mutex<Vec<HubCall>>,
    failing: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
}

impl InMemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every request for `channel_id`.
    pub fn fail_channel(&self, channel_id: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel_id.into());
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<HubCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn record(&self, call: HubCall) -> Result<String> {
        let rejected = self.fail_all.load(Ordering::SeqCst)
            || self
                .failing
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .contains(&call.channel_id);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if rejected {
            return Err(Error::hub("hub returned 503 Service Unavailable"));
        }
        Ok("202 Accepted".into())
    }
}

#[async_trait]
impl PubSubHub for InMemoryHub {
    async fn subscribe(&self, channel_id: &str, lease_seconds: u64) -> Result<String> {
        self.record(HubCall {
            mode: HubMode::Subscribe,
            channel_id: channel_id.to_string(),
            lease_seconds: Some(lease_seconds),
        })
    }

    async fn unsubscribe(&self, channel_id: &str) -> Result<String> {
        self.record(HubCall {
            mode: HubMode::Unsubscribe,
            channel_id: channel_id.to_string(),
            lease_seconds: None,
        })
    }
}
