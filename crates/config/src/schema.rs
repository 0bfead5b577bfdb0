//! Typed configuration for the relay.

use std::{path::PathBuf, time::Duration};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub hub: HubConfig,
    pub renewal: RenewalConfig,
    pub github: GithubConfig,
    pub storage: StorageConfig,
}

/// HTTP listener and the public URL the hub calls back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Public URL of this service, registered as `hub.callback`.
    pub callback_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
            callback_url: String::new(),
        }
    }
}

/// PubSubHubbub hub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub url: String,
    /// Lease requested on subscribe and on every renewal.
    pub lease_seconds: u64,
    pub timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: "https://pubsubhubbub.appspot.com/subscribe".into(),
            lease_seconds: 86_400,
            timeout_secs: 30,
        }
    }
}

impl HubConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Renewal policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenewalConfig {
    /// Subscriptions expiring within this many hours are renewed.
    pub threshold_hours: u64,
    /// Consecutive failed renewals after which a subscription is left alone.
    pub max_attempts: u32,
    /// Run renewal inside `serve` on this interval. Unset means an external
    /// scheduler calls `POST /renew`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<u64>,
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            threshold_hours: 12,
            max_attempts: 3,
            interval_minutes: None,
        }
    }
}

impl RenewalConfig {
    /// Threshold in seconds, or `None` when `threshold_hours` overflows.
    #[must_use]
    pub fn threshold_secs(&self) -> Option<u64> {
        self.threshold_hours.checked_mul(3600)
    }

    /// Interval in seconds, or `None` when `interval_minutes` overflows.
    #[must_use]
    pub fn interval_secs(&self) -> Option<u64> {
        self.interval_minutes.and_then(|m| m.checked_mul(60))
    }

    /// Saturates on overflow; `validate` reports such values as errors.
    #[must_use]
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(self.threshold_hours.saturating_mul(3600))
    }

    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.interval_minutes
            .filter(|m| *m > 0)
            .map(|m| Duration::from_secs(m.saturating_mul(60)))
    }
}

/// Repository-dispatch target.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,
    pub repo_owner: String,
    pub repo_name: String,
    pub api_base_url: String,
    pub event_type: String,
    /// Forwarded verbatim as `client_payload.environment`.
    pub environment: String,
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            repo_owner: String::new(),
            repo_name: String::new(),
            api_base_url: "https://api.github.com".into(),
            event_type: "youtube-video-published".into(),
            environment: "production".into(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &"[REDACTED]")
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("api_base_url", &self.api_base_url)
            .field("event_type", &self.event_type)
            .field("environment", &self.environment)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GithubConfig {
    /// Token, owner and repository are all present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token.expose_secret().is_empty()
            && !self.repo_owner.is_empty()
            && !self.repo_name.is_empty()
    }

    /// Some but not all of token, owner and repository are present.
    #[must_use]
    pub fn is_partially_configured(&self) -> bool {
        let set = [
            !self.token.expose_secret().is_empty(),
            !self.repo_owner.is_empty(),
            !self.repo_name.is_empty(),
        ];
        set.iter().any(|s| *s) && !set.iter().all(|s| *s)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Where the subscription state document lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory. Defaults to the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Document path relative to `data_dir`.
    pub state_path: String,
    /// Read-through cache TTL. `0` disables caching.
    pub cache_ttl_secs: u64,
    /// Upper bound on a single load or save.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            state_path: "subscriptions/state.json".into(),
            cache_ttl_secs: 300,
            timeout_secs: 30,
        }
    }
}

impl StorageConfig {
    /// Absolute location of the state document.
    #[must_use]
    pub fn resolved_state_path(&self) -> PathBuf {
        let base = self
            .data_dir
            .clone()
            .or_else(crate::loader::data_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(&self.state_path)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}
