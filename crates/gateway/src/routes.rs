//! Request handlers.

use std::collections::HashMap;

use {
    axum::{
        Json,
        extract::{Query, State, rejection::BytesRejection},
        http::{Method, StatusCode},
        response::IntoResponse,
    },
    bytes::Bytes,
    serde::Deserialize,
    serde_json::json,
    tracing::info,
};

use crate::{
    error::{ApiError, PlainError},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub channel_id: Option<String>,
}

impl ChannelQuery {
    fn require(self) -> Result<String, ApiError> {
        match self.channel_id.map(|c| c.trim().to_string()) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ApiError::bad_request("channel_id query parameter is required")),
        }
    }
}

/// Hub verification: echo `hub.challenge` back as plain text.
pub async fn verify_challenge(
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, PlainError> {
    let Some(challenge) = params.get("hub.challenge").filter(|c| !c.is_empty()) else {
        return Err(ApiError::bad_request("Missing hub.challenge").into());
    };
    info!(
        mode = params.get("hub.mode").map(String::as_str).unwrap_or(""),
        topic = params.get("hub.topic").map(String::as_str).unwrap_or(""),
        lease_seconds = params.get("hub.lease_seconds").map(String::as_str).unwrap_or(""),
        "hub verification"
    );
    Ok(challenge.clone())
}

/// Atom push from the hub.
pub async fn receive_notification(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<String, PlainError> {
    let body = body.map_err(ytrelay_notify::Error::read_body)?;
    let outcome = state.dispatcher.dispatch(&body).await?;
    Ok(outcome.message())
}

pub async fn subscribe(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let channel_id = query.require()?;
    let sub = state.manager.create(&channel_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Subscribed to channel {channel_id}"),
        "channel_id": sub.channel_id,
        "expires_at": sub.expires_at,
    })))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let channel_id = query.require()?;
    state.manager.remove(&channel_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": format!("Unsubscribed from channel {channel_id}"),
        "channel_id": channel_id,
    })))
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.manager.list().await?))
}

pub async fn renew(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.renewal.run().await?))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": state.version,
    }))
}

/// Bare `OPTIONS` outside a CORS preflight.
pub async fn options_ok() -> StatusCode {
    StatusCode::OK
}

/// Unknown paths: `OPTIONS` still succeeds, anything else is a 404.
pub async fn fallback(method: Method) -> StatusCode {
    if method == Method::OPTIONS {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}
