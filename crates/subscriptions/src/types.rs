//! The persisted subscription document and its entries.

use std::collections::HashMap;

use {
    chrono::{DateTime, Duration, Utc},
    serde::{Deserialize, Serialize},
};

/// Format tag written when a document is saved without one.
pub const STATE_VERSION: &str = "1.0";

/// Lease requested when nothing else is configured.
pub const DEFAULT_LEASE_SECONDS: u64 = 86_400;

/// Lease status, derived from `expires_at` at read time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Expired,
}

impl SubscriptionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One hub subscription for one channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "channelID")]
    pub channel_id: String,
    #[serde(rename = "topicURL")]
    pub topic_url: String,
    #[serde(rename = "callbackURL")]
    pub callback_url: String,
    /// Last written status. May lag behind `expires_at`; use
    /// [`Subscription::status_at`] for the real value.
    #[serde(default)]
    pub status: SubscriptionStatus,
    pub lease_seconds: u64,
    pub subscribed_at: DateTime<Utc>,
    pub last_renewal: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Consecutive failed renewals since the last success.
    #[serde(default)]
    pub renewal_attempts: u32,
    #[serde(default)]
    pub hub_response: String,
}

impl Subscription {
    /// A fresh, active subscription whose lease starts at `now`.
    #[must_use]
    pub fn new(
        channel_id: impl Into<String>,
        callback_url: impl Into<String>,
        lease_seconds: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let channel_id = channel_id.into();
        Self {
            topic_url: ytrelay_common::youtube::topic_url(&channel_id),
            channel_id,
            callback_url: callback_url.into(),
            status: SubscriptionStatus::Active,
            lease_seconds,
            subscribed_at: now,
            last_renewal: now,
            expires_at: lease_end(now, lease_seconds),
            renewal_attempts: 0,
            hub_response: String::new(),
        }
    }

    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        if self.expires_at > now {
            SubscriptionStatus::Active
        } else {
            SubscriptionStatus::Expired
        }
    }

    /// Time left on the lease. Negative once expired.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    #[must_use]
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> f64 {
        self.remaining(now).num_seconds() as f64 / 86_400.0
    }
}

/// `now + lease_seconds`, saturating instead of overflowing.
#[must_use]
pub fn lease_end(now: DateTime<Utc>, lease_seconds: u64) -> DateTime<Utc> {
    let secs = i64::try_from(lease_seconds).unwrap_or(i64::MAX);
    Duration::try_seconds(secs)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Document bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StateMetadata {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// The whole persisted document: every subscription keyed by channel id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SubscriptionState {
    #[serde(default)]
    pub subscriptions: HashMap<String, Subscription>,
    #[serde(default)]
    pub metadata: StateMetadata,
}

impl SubscriptionState {
    #[must_use]
    pub fn get(&self, channel_id: &str) -> Option<&Subscription> {
        self.subscriptions.get(channel_id)
    }

    /// Insert or replace the entry for `sub.channel_id`.
    pub fn upsert(&mut self, sub: Subscription) {
        self.subscriptions.insert(sub.channel_id.clone(), sub);
    }

    pub fn remove(&mut self, channel_id: &str) -> Option<Subscription> {
        self.subscriptions.remove(channel_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Stamp the metadata the way every save does: default the version and
    /// record the save time.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        if self.metadata.version.is_empty() {
            self.metadata.version = STATE_VERSION.to_string();
        }
        self.metadata.last_updated = Some(now);
    }
}
