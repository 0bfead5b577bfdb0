//! Semantic checks on a loaded [`RelayConfig`].
//!
//! Parsing already guarantees the shape; these checks catch values that parse
//! fine but would make the relay misbehave at runtime.

use crate::schema::RelayConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "hub.lease_seconds"
    pub path: &'static str,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path,
            message: message.into(),
        });
    }
}

/// Check a configuration for values that would break subscribing, renewing or
/// dispatching.
#[must_use]
pub fn validate(config: &RelayConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    let callback = config.server.callback_url.trim();
    if callback.is_empty() {
        result.push(
            Severity::Error,
            "server.callback_url",
            "callback URL is empty; the hub cannot deliver notifications",
        );
    } else if !(callback.starts_with("https://") || callback.starts_with("http://")) {
        result.push(
            Severity::Error,
            "server.callback_url",
            format!("callback URL must be absolute http(s), got {callback:?}"),
        );
    } else if callback.starts_with("http://") {
        result.push(
            Severity::Info,
            "server.callback_url",
            "callback URL is plain http",
        );
    }

    if config.hub.url.trim().is_empty() {
        result.push(Severity::Error, "hub.url", "hub URL is empty");
    }

    if config.hub.lease_seconds == 0 {
        result.push(
            Severity::Error,
            "hub.lease_seconds",
            "lease must be greater than zero",
        );
    }

    if config.renewal.max_attempts == 0 {
        result.push(
            Severity::Warning,
            "renewal.max_attempts",
            "max_attempts is 0; every renewal candidate fails without contacting the hub",
        );
    }

    match config.renewal.threshold_secs() {
        None => {
            result.push(
                Severity::Error,
                "renewal.threshold_hours",
                format!(
                    "threshold of {}h is out of range",
                    config.renewal.threshold_hours
                ),
            );
        },
        Some(secs) if secs >= config.hub.lease_seconds && config.hub.lease_seconds > 0 => {
            result.push(
                Severity::Warning,
                "renewal.threshold_hours",
                format!(
                    "threshold of {}h is not shorter than the {}s lease; every subscription is renewed on every run",
                    config.renewal.threshold_hours, config.hub.lease_seconds
                ),
            );
        },
        Some(_) => {},
    }

    if config.renewal.interval_minutes.is_some() && config.renewal.interval_secs().is_none() {
        result.push(
            Severity::Error,
            "renewal.interval_minutes",
            "renewal interval is out of range",
        );
    }

    if config.github.is_partially_configured() {
        result.push(
            Severity::Warning,
            "github",
            "token, repo_owner and repo_name must all be set; workflow dispatch stays disabled",
        );
    } else if !config.github.is_configured() {
        result.push(
            Severity::Info,
            "github",
            "workflow dispatch is not configured; new videos are only logged",
        );
    }

    if config.hub.timeout_secs == 0 || config.github.timeout_secs == 0 {
        result.push(
            Severity::Warning,
            "hub.timeout_secs",
            "a zero timeout makes every outbound call fail immediately",
        );
    }

    if config.storage.timeout_secs == 0 {
        result.push(
            Severity::Warning,
            "storage.timeout_secs",
            "a zero timeout makes every state load and save fail",
        );
    }

    result
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::loader::apply_env_overrides_with,
        secrecy::Secret,
    };

    fn valid() -> RelayConfig {
        let mut cfg = RelayConfig::default();
        cfg.server.callback_url = "https://relay.example.com/".into();
        cfg.github.token = Secret::new("ghp".into());
        cfg.github.repo_owner = "octo".into();
        cfg.github.repo_name = "site".into();
        cfg
    }

    #[test]
    fn complete_config_is_clean() {
        let result = validate(&valid());
        assert!(!result.has_errors());
        assert_eq!(result.count(Severity::Warning), 0);
    }

    #[test]
    fn missing_callback_is_an_error() {
        let mut cfg = valid();
        cfg.server.callback_url.clear();
        let result = validate(&cfg);
        assert!(result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "server.callback_url")
        );
    }

    #[test]
    fn relative_callback_is_an_error() {
        let mut cfg = valid();
        cfg.server.callback_url = "/webhook".into();
        assert!(validate(&cfg).has_errors());
    }

    #[test]
    fn zero_lease_is_an_error() {
        let mut cfg = valid();
        cfg.hub.lease_seconds = 0;
        assert!(validate(&cfg).has_errors());
    }

    #[test]
    fn threshold_longer_than_lease_warns() {
        let mut cfg = valid();
        cfg.hub.lease_seconds = 3600;
        let result = validate(&cfg);
        assert!(!result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "renewal.threshold_hours" && d.severity == Severity::Warning)
        );
    }

    #[test]
    fn partial_github_warns() {
        let mut cfg = valid();
        cfg.github.repo_name.clear();
        let result = validate(&cfg);
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "github" && d.severity == Severity::Warning)
        );
    }

    #[test]
    fn absent_github_is_informational() {
        let mut cfg = RelayConfig::default();
        cfg.server.callback_url = "https://relay.example.com/".into();
        let result = validate(&cfg);
        assert_eq!(result.count(Severity::Warning), 0);
        assert_eq!(result.count(Severity::Info), 1);
    }

    #[test]
    fn oversized_threshold_from_env_is_an_error() {
        let mut cfg = valid();
        apply_env_overrides_with(&mut cfg, |key| {
            (key == "RENEWAL_THRESHOLD_HOURS").then(|| "6000000000000000".to_string())
        });
        assert_eq!(cfg.renewal.threshold_hours, 6_000_000_000_000_000);

        let result = validate(&cfg);
        assert!(result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "renewal.threshold_hours" && d.severity == Severity::Error)
        );
    }

    #[test]
    fn oversized_interval_is_an_error() {
        let mut cfg = valid();
        cfg.renewal.interval_minutes = Some(u64::MAX);
        let result = validate(&cfg);
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "renewal.interval_minutes" && d.severity == Severity::Error)
        );
    }
}
