//! HTTP gateway: PubSubHubbub callback, subscription API and renewal trigger.
//!
//! Routes:
//! - `GET /`: hub verification challenge
//! - `POST /`: Atom push notification
//! - `POST /subscribe`, `DELETE /unsubscribe`, `GET /subscriptions`
//! - `POST /renew`: run the renewal engine once
//! - `GET /health`

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use {
    error::ApiError,
    server::{build_app, serve, shutdown_signal},
    state::AppState,
};
