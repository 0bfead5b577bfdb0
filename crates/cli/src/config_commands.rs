use anyhow::Result;

use ytrelay_config::{RelayConfig, Severity, validate};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print diagnostics for the effective configuration. Returns `false` when
/// there is at least one error.
pub fn check(config: &RelayConfig, verbose: bool) -> bool {
    let result = validate(config);

    eprintln!(
        "State file: {}\n",
        config.storage.resolved_state_path().display()
    );

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    errors == 0
}

/// Log diagnostics at startup and refuse to continue on errors.
pub fn ensure_valid(config: &RelayConfig) -> Result<()> {
    let result = validate(config);
    for d in &result.diagnostics {
        match d.severity {
            Severity::Error => tracing::error!(path = d.path, "{}", d.message),
            Severity::Warning => tracing::warn!(path = d.path, "{}", d.message),
            Severity::Info => tracing::info!(path = d.path, "{}", d.message),
        }
    }
    if result.has_errors() {
        anyhow::bail!(
            "configuration has {} error(s); run `ytrelay check-config` for details",
            result.count(Severity::Error)
        );
    }
    Ok(())
}
