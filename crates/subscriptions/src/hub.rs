//! PubSubHubbub hub client.

use std::time::Duration;

use {async_trait::async_trait, tracing::debug};

use crate::{Error, Result};

/// `hub.mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubMode {
    Subscribe,
    Unsubscribe,
}

impl HubMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}

/// Subscribes and unsubscribes channel topics at a hub.
///
/// Success carries a short diagnostic (e.g. `"202 Accepted"`) that callers
/// store as `hubResponse`. Any non-accepted answer is
/// [`Error::HubUnavailable`].
#[async_trait]
pub trait PubSubHub: Send + Sync {
    async fn subscribe(&self, channel_id: &str, lease_seconds: u64) -> Result<String>;

    async fn unsubscribe(&self, channel_id: &str) -> Result<String>;
}

/// Form-POST client for a real hub such as `pubsubhubbub.appspot.com`.
pub struct HttpHub {
    client: reqwest::Client,
    hub_url: String,
    callback_url: String,
}

impl HttpHub {
    pub fn new(
        hub_url: impl Into<String>,
        callback_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::hub)?;
        Ok(Self {
            client,
            hub_url: hub_url.into(),
            callback_url: callback_url.into(),
        })
    }

    async fn send(
        &self,
        mode: HubMode,
        channel_id: &str,
        lease_seconds: Option<u64>,
    ) -> Result<String> {
        let topic = ytrelay_common::youtube::topic_url(channel_id);
        let lease = lease_seconds.map(|l| l.to_string());
        let mut form = vec![
            ("hub.callback", self.callback_url.as_str()),
            ("hub.topic", topic.as_str()),
            ("hub.mode", mode.as_str()),
            ("hub.verify", "async"),
        ];
        if let Some(lease) = lease.as_deref() {
            form.push(("hub.lease_seconds", lease));
        }

        let resp = self
            .client
            .post(&self.hub_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::hub)?;

        let status = resp.status();
        if status == reqwest::StatusCode::ACCEPTED || status == reqwest::StatusCode::NO_CONTENT {
            debug!(channel_id, mode = mode.as_str(), %status, "hub accepted request");
            return Ok(status.to_string());
        }

        let body = resp.text().await.unwrap_or_default();
        let body = body.trim();
        Err(if body.is_empty() {
            Error::hub(format!("hub returned {status}"))
        } else {
            Error::hub(format!("hub returned {status}: {body}"))
        })
    }
}

#[async_trait]
impl PubSubHub for HttpHub {
    async fn subscribe(&self, channel_id: &str, lease_seconds: u64) -> Result<String> {
        self.send(HubMode::Subscribe, channel_id, Some(lease_seconds))
            .await
    }

    async fn unsubscribe(&self, channel_id: &str) -> Result<String> {
        self.send(HubMode::Unsubscribe, channel_id, None).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        mockito::{Matcher, Server},
        ytrelay_common::ErrorKind,
    };

    const CHANNEL: &str = "UCXuqSBlHAE6Xw-yeJA0Tunw";

    fn hub_for(server: &Server) -> HttpHub {
        HttpHub::new(
            format!("{}/subscribe", server.url()),
            "https://relay.example.com/",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn subscribe_posts_form_and_accepts_202() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/subscribe")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("hub.callback".into(), "https://relay.example.com/".into()),
                Matcher::UrlEncoded(
                    "hub.topic".into(),
                    format!("https://www.youtube.com/xml/feeds/videos.xml?channel_id={CHANNEL}"),
                ),
                Matcher::UrlEncoded("hub.mode".into(), "subscribe".into()),
                Matcher::UrlEncoded("hub.verify".into(), "async".into()),
                Matcher::UrlEncoded("hub.lease_seconds".into(), "86400".into()),
            ]))
            .with_status(202)
            .create_async()
            .await;

        let resp = hub_for(&server).subscribe(CHANNEL, 86_400).await.unwrap();
        assert_eq!(resp, "202 Accepted");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unsubscribe_accepts_204() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/subscribe")
            .match_body(Matcher::UrlEncoded("hub.mode".into(), "unsubscribe".into()))
            .with_status(204)
            .create_async()
            .await;

        hub_for(&server).unsubscribe(CHANNEL).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejection_is_hub_unavailable_with_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/subscribe")
            .with_status(400)
            .with_body("Invalid value for hub.topic")
            .create_async()
            .await;

        let err = hub_for(&server).subscribe(CHANNEL, 60).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Invalid value for hub.topic"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn plain_200_is_not_accepted() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/subscribe")
            .with_status(200)
            .create_async()
            .await;

        let err = hub_for(&server).subscribe(CHANNEL, 60).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn unreachable_hub_is_hub_unavailable() {
        let hub = HttpHub::new(
            "http://127.0.0.1:1/subscribe",
            "https://relay.example.com/",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = hub.subscribe(CHANNEL, 60).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }
}
