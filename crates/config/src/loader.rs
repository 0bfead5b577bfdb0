use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::schema::RelayConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["ytrelay.toml", "ytrelay.yaml", "ytrelay.yml", "ytrelay.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<RelayConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./ytrelay.{toml,yaml,yml,json}`
/// 2. `~/.config/ytrelay/ytrelay.{toml,yaml,yml,json}`
///
/// Returns `RelayConfig::default()` if no file is found or the file is
/// unreadable.
pub fn discover_and_load() -> RelayConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    RelayConfig::default()
}

/// Load from `path` when given, otherwise discover, then apply environment
/// overrides from the process environment.
pub fn load(path: Option<&Path>) -> anyhow::Result<RelayConfig> {
    let mut config = match path {
        Some(p) => load_config(p)?,
        None => discover_and_load(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/ytrelay/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "ytrelay").map(|d| d.config_dir().to_path_buf())
}

/// Returns the platform data directory used when `storage.data_dir` is unset.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "ytrelay").map(|d| d.data_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<RelayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Overlay environment variables on top of file values.
pub fn apply_env_overrides(config: &mut RelayConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

/// Same as [`apply_env_overrides`] with an injectable lookup so tests do not
/// touch the process environment.
///
/// Empty values are ignored. Numeric values that fail to parse are logged and
/// ignored.
pub fn apply_env_overrides_with(config: &mut RelayConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("YTRELAY_BIND") {
        config.server.bind = v;
    }
    if let Some(v) = get("YTRELAY_PORT").or_else(|| get("PORT")) {
        set_parsed(&mut config.server.port, "PORT", &v);
    }
    if let Some(v) = get("CALLBACK_URL") {
        config.server.callback_url = v;
    }
    if let Some(v) = get("HUB_URL") {
        config.hub.url = v;
    }
    if let Some(v) = get("LEASE_SECONDS") {
        set_parsed(&mut config.hub.lease_seconds, "LEASE_SECONDS", &v);
    }
    if let Some(v) = get("RENEWAL_THRESHOLD_HOURS") {
        set_parsed(
            &mut config.renewal.threshold_hours,
            "RENEWAL_THRESHOLD_HOURS",
            &v,
        );
    }
    if let Some(v) = get("MAX_RENEWAL_ATTEMPTS") {
        set_parsed(&mut config.renewal.max_attempts, "MAX_RENEWAL_ATTEMPTS", &v);
    }
    if let Some(v) = get("GITHUB_TOKEN") {
        config.github.token = Secret::new(v);
    }
    if let Some(v) = get("REPO_OWNER") {
        config.github.repo_owner = v;
    }
    if let Some(v) = get("REPO_NAME") {
        config.github.repo_name = v;
    }
    if let Some(v) = get("GITHUB_API_BASE_URL") {
        config.github.api_base_url = v;
    }
    if let Some(v) = get("ENVIRONMENT") {
        config.github.environment = v;
    }
    if let Some(v) = get("YTRELAY_DATA_DIR") {
        config.storage.data_dir = Some(PathBuf::from(v));
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, name: &str, raw: &str) {
    match raw.trim().parse() {
        Ok(v) => *slot = v,
        Err(_) => warn!(name, value = raw, "ignoring unparsable environment override"),
    }
}
