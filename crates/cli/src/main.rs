mod config_commands;
mod subscription_commands;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    ytrelay_config::RelayConfig,
    ytrelay_gateway::{AppState, serve, shutdown_signal},
};

#[derive(Parser)]
#[command(
    name = "ytrelay",
    version,
    about = "ytrelay: YouTube upload notifications to GitHub Actions"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (default: ./ytrelay.{toml,yaml,json}, then the user config dir).
    #[arg(long, global = true, env = "YTRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Base directory for the subscription state file.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default when no subcommand is provided).
    Serve,
    /// Renew subscriptions close to expiry once and print the summary.
    Renew,
    /// Subscribe to a channel's upload feed.
    Subscribe {
        /// Channel id, `UC` followed by 22 characters.
        channel_id: String,
    },
    /// Unsubscribe from a channel.
    Unsubscribe { channel_id: String },
    /// List subscriptions with their lease status.
    List {
        /// Print the raw JSON summary.
        #[arg(long)]
        json: bool,
    },
    /// Validate the configuration and report errors and warnings.
    CheckConfig {
        /// Show informational diagnostics too.
        #[arg(long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// File, then environment, then command-line flags.
fn load_config(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let mut config = ytrelay_config::load(cli.config.as_deref())?;
    if let Some(ref bind) = cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref dir) = cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    Ok(config)
}

async fn run_server(config: RelayConfig) -> anyhow::Result<()> {
    config_commands::ensure_valid(&config)?;
    let state = AppState::from_config(&config)?;

    let renewal_task = config.renewal.interval().map(|every| {
        info!(
            interval_secs = every.as_secs(),
            "in-process renewal enabled"
        );
        Arc::clone(&state.renewal).spawn_periodic(every)
    });

    let result = serve(&config.server, state, shutdown_signal()).await;

    if let Some(task) = renewal_task {
        task.abort();
    }
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    let config = load_config(&cli)?;

    match cli.command {
        None | Some(Commands::Serve) => {
            info!(version = env!("CARGO_PKG_VERSION"), "ytrelay starting");
            run_server(config).await
        },
        Some(Commands::CheckConfig { verbose }) => {
            if !config_commands::check(&config, verbose) {
                std::process::exit(1);
            }
            Ok(())
        },
        Some(Commands::Renew) => {
            let state = AppState::from_config(&config)?;
            subscription_commands::renew(&state).await
        },
        Some(Commands::Subscribe { channel_id }) => {
            config_commands::ensure_valid(&config)?;
            let state = AppState::from_config(&config)?;
            subscription_commands::subscribe(&state, &channel_id).await
        },
        Some(Commands::Unsubscribe { channel_id }) => {
            config_commands::ensure_valid(&config)?;
            let state = AppState::from_config(&config)?;
            subscription_commands::unsubscribe(&state, &channel_id).await
        },
        Some(Commands::List { json }) => {
            let state = AppState::from_config(&config)?;
            subscription_commands::list(&state, json).await
        },
    }
}
