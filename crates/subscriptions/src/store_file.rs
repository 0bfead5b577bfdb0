//! JSON file-backed state store with atomic writes.

use std::{
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

use {
    async_trait::async_trait,
    chrono::Utc,
    tokio::fs,
    tracing::{debug, warn},
};

use crate::{Error, Result, error::Context, store::StateStore, types::SubscriptionState};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Keeps the document as pretty-printed JSON at a fixed path, e.g.
/// `<data_dir>/subscriptions/state.json`.
pub struct FileStore {
    path: PathBuf,
    timeout: Duration,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound each load and save by `timeout` instead of 30s.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn bounded<T>(&self, op: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    path = %self.path.display(),
                    op,
                    timeout_secs = self.timeout.as_secs(),
                    "state file I/O timed out"
                );
                Err(Error::storage(format!(
                    "{op} {} timed out after {}s",
                    self.path.display(),
                    self.timeout.as_secs()
                )))
            },
        }
    }

    async fn read(&self) -> Result<SubscriptionState> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            debug!(path = %self.path.display(), "state file missing, starting empty");
            return Ok(SubscriptionState::default());
        }
        let data = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        if data.trim().is_empty() {
            return Ok(SubscriptionState::default());
        }
        let state: SubscriptionState = serde_json::from_str(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(state)
    }

    /// Atomic write: write to temp, rename over target, keep `.bak`.
    async fn atomic_write(&self, json: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes())
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;

        if fs::try_exists(&self.path).await.unwrap_or(false) {
            let bak = self.path.with_extension("json.bak");
            let _ = fs::copy(&self.path, &bak).await;
        }

        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn load(&self) -> Result<SubscriptionState> {
        self.bounded("reading", self.read()).await
    }

    async fn save(&self, state: &SubscriptionState) -> Result<()> {
        let mut doc = state.clone();
        doc.stamp(Utc::now());
        let json = serde_json::to_string_pretty(&doc)?;
        self.bounded("writing", self.atomic_write(&json)).await?;
        debug!(path = %self.path.display(), count = doc.len(), "saved subscription state");
        Ok(())
    }
}
