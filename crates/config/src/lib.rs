//! Configuration loading, environment overrides and validation.
//!
//! Config files: `ytrelay.toml`, `ytrelay.yaml` or `ytrelay.json`,
//! searched in `./` then `~/.config/ytrelay/`. Environment variables
//! (`GITHUB_TOKEN`, `CALLBACK_URL`, ...) override file values.

pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        apply_env_overrides, apply_env_overrides_with, config_dir, data_dir, discover_and_load,
        load, load_config,
    },
    schema::{GithubConfig, HubConfig, RelayConfig, RenewalConfig, ServerConfig, StorageConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
