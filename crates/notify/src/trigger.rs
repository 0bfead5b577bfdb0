//! Downstream workflow trigger.

use {async_trait::async_trait, serde::Serialize};

use crate::{Result, entry::Entry};

/// Starts the downstream workflow for a new video.
#[async_trait]
pub trait WorkflowTrigger: Send + Sync {
    /// Credentials and target are present. An unconfigured trigger is a soft
    /// skip, not an error.
    fn is_configured(&self) -> bool;

    async fn trigger(&self, entry: &Entry) -> Result<()>;
}

/// `client_payload` of a repository dispatch.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClientPayload {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    pub published: String,
    pub updated: String,
    pub video_url: String,
    pub environment: String,
}

/// Body of `POST /repos/{owner}/{repo}/dispatches`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DispatchRequest {
    pub event_type: String,
    pub client_payload: ClientPayload,
}

impl DispatchRequest {
    #[must_use]
    pub fn new(event_type: &str, environment: &str, entry: &Entry) -> Self {
        Self {
            event_type: event_type.to_string(),
            client_payload: ClientPayload {
                video_id: entry.video_id.clone(),
                channel_id: entry.channel_id.clone(),
                title: entry.title.clone(),
                published: entry.published.clone(),
                updated: entry.updated.clone(),
                video_url: entry.video_url(),
                environment: environment.to_string(),
            },
        }
    }
}
