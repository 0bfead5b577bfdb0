//! Classify a push notification and trigger the workflow when it is new.

use std::sync::Arc;

use {
    chrono::{DateTime, Utc},
    tracing::{debug, info},
};

use crate::{
    Error, Result,
    classifier::is_new_video_at,
    entry::parse_feed,
    trigger::WorkflowTrigger,
};

/// Non-error results of handling a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The feed carried no entry.
    NoVideoData,
    /// An edit or re-push of an older video.
    Ignored { video_id: String },
    /// New video, but no trigger target is configured.
    NotConfigured { video_id: String },
    Triggered { video_id: String },
}

impl DispatchOutcome {
    /// Plain-text body returned to the hub.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NoVideoData => "No video data in notification".into(),
            Self::Ignored { video_id } => {
                format!("Ignored notification for {video_id}: not a new video")
            },
            Self::NotConfigured { video_id } => {
                format!("Workflow trigger not configured, skipped video {video_id}")
            },
            Self::Triggered { video_id } => format!("Triggered workflow for video {video_id}"),
        }
    }
}

impl std::fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

pub struct NotificationDispatcher {
    trigger: Arc<dyn WorkflowTrigger>,
}

impl NotificationDispatcher {
    pub fn new(trigger: Arc<dyn WorkflowTrigger>) -> Self {
        Self { trigger }
    }

    pub async fn dispatch(&self, body: &[u8]) -> Result<DispatchOutcome> {
        self.dispatch_at(body, Utc::now()).await
    }

    pub async fn dispatch_at(&self, body: &[u8], now: DateTime<Utc>) -> Result<DispatchOutcome> {
        let Some(entry) = parse_feed(body)? else {
            debug!("notification without entry");
            return Ok(DispatchOutcome::NoVideoData);
        };
        if entry.video_id.is_empty() {
            return Err(Error::InvalidEntry);
        }

        let video_id = entry.video_id.clone();
        if !is_new_video_at(&entry, now) {
            info!(%video_id, "ignoring update to existing video");
            return Ok(DispatchOutcome::Ignored { video_id });
        }

        if !self.trigger.is_configured() {
            info!(%video_id, "new video but workflow trigger is not configured");
            return Ok(DispatchOutcome::NotConfigured { video_id });
        }

        self.trigger.trigger(&entry).await?;
        info!(%video_id, channel_id = %entry.channel_id, title = %entry.title, "new video dispatched");
        Ok(DispatchOutcome::Triggered { video_id })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{entry::tests::atom, trigger_memory::InMemoryTrigger},
        chrono::TimeDelta,
        ytrelay_common::ErrorKind,
    };

    fn make(trigger: InMemoryTrigger) -> (NotificationDispatcher, Arc<InMemoryTrigger>) {
        let trigger = Arc::new(trigger);
        (NotificationDispatcher::new(trigger.clone()), trigger)
    }

    fn fresh_body(now: DateTime<Utc>) -> String {
        let published = (now - TimeDelta::minutes(10)).to_rfc3339();
        let updated = (now - TimeDelta::minutes(9)).to_rfc3339();
        atom("dQw4w9WgXcQ", &published, &updated)
    }

    #[tokio::test]
    async fn new_video_is_triggered() {
        let now = Utc::now();
        let (dispatcher, trigger) = make(InMemoryTrigger::new());
        let outcome = dispatcher
            .dispatch_at(fresh_body(now).as_bytes(), now)
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Triggered {
            video_id: "dQw4w9WgXcQ".into()
        });
        assert!(outcome.message().contains("dQw4w9WgXcQ"));
        let sent = trigger.triggered();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel_id, "UCXuqSBlHAE6Xw-yeJA0Tunw");
    }

    #[tokio::test]
    async fn old_video_is_ignored() {
        let now = Utc::now();
        let old = (now - TimeDelta::hours(2)).to_rfc3339();
        let body = atom("dQw4w9WgXcQ", &old, &old);
        let (dispatcher, trigger) = make(InMemoryTrigger::new());
        let outcome = dispatcher.dispatch_at(body.as_bytes(), now).await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Ignored { .. }));
        assert!(trigger.triggered().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_trigger_is_soft_skip() {
        let now = Utc::now();
        let (dispatcher, trigger) = make(InMemoryTrigger::unconfigured());
        let outcome = dispatcher
            .dispatch_at(fresh_body(now).as_bytes(), now)
            .await
            .unwrap();
        assert!(matches!(outcome, DispatchOutcome::NotConfigured { .. }));
        assert!(trigger.triggered().is_empty());
    }

    #[tokio::test]
    async fn empty_feed_is_no_video_data() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>t</title></feed>"#;
        let (dispatcher, _) = make(InMemoryTrigger::new());
        let outcome = dispatcher.dispatch(body.as_bytes()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::NoVideoData);
    }

    #[tokio::test]
    async fn entry_without_video_id_is_invalid() {
        let body = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <title>t</title>
  <entry>
    <id>tag:example.com,2024:1</id>
    <title>no id</title>
    <updated>2024-05-01T12:00:00Z</updated>
  </entry>
</feed>"#;
        let (dispatcher, _) = make(InMemoryTrigger::new());
        let err = dispatcher.dispatch(body.as_bytes()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidEntry));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_xml() {
        let (dispatcher, _) = make(InMemoryTrigger::new());
        let err = dispatcher.dispatch(b"<feed").await.unwrap_err();
        assert!(matches!(err, Error::InvalidXml { .. }));
    }

    #[tokio::test]
    async fn trigger_failure_is_downstream_error() {
        let now = Utc::now();
        let (dispatcher, trigger) = make(InMemoryTrigger::new());
        trigger.set_fail(true);
        let err = dispatcher
            .dispatch_at(fresh_body(now).as_bytes(), now)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Downstream { .. }));
    }
}
