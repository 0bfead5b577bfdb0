use std::{future::Future, net::SocketAddr};

use {
    axum::{
        Router,
        routing::{delete, get, post},
    },
    tower::ServiceBuilder,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::info,
    ytrelay_config::ServerConfig,
};

use crate::{routes, state::AppState};

/// Build the router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/",
            get(routes::verify_challenge)
                .post(routes::receive_notification)
                .options(routes::options_ok),
        )
        .route(
            "/subscribe",
            post(routes::subscribe).options(routes::options_ok),
        )
        .route(
            "/unsubscribe",
            delete(routes::unsubscribe).options(routes::options_ok),
        )
        .route(
            "/subscriptions",
            get(routes::list_subscriptions).options(routes::options_ok),
        )
        .route("/renew", post(routes::renew).options(routes::options_ok))
        .route("/health", get(routes::health))
        .fallback(routes::fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Bind `server.bind:server.port` and serve until `shutdown` resolves.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, callback_url = %config.callback_url, "ytrelay listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
