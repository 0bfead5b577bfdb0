//! Renewal of leases that are close to expiry.

use std::{sync::Arc, time::Duration};

use {
    chrono::{DateTime, TimeDelta, Utc},
    serde::Serialize,
    tokio::task::JoinHandle,
    tracing::{debug, error, info, warn},
};

use crate::{
    Result,
    hub::PubSubHub,
    store::StateStore,
    types::{DEFAULT_LEASE_SECONDS, SubscriptionStatus, lease_end},
};

/// Hub response recorded on a successful renewal.
pub const RENEWED_HUB_RESPONSE: &str = "202 Accepted (Renewed)";

#[derive(Debug, Clone)]
pub struct RenewalPolicy {
    /// Renew when `expiresAt - now` is at most this.
    pub threshold: Duration,
    /// Consecutive failures after which a subscription is no longer sent to
    /// the hub.
    pub max_attempts: u32,
    pub lease_seconds: u64,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(12 * 3600),
            max_attempts: 3,
            lease_seconds: DEFAULT_LEASE_SECONDS,
        }
    }
}

/// Outcome for one renewal candidate.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenewalResult {
    #[serde(rename = "channelID")]
    pub channel_id: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_expiry_time: Option<DateTime<Utc>>,
    pub attempt_count: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenewalSummary {
    pub status: String,
    pub total_checked: usize,
    pub renewals_candidates: usize,
    pub renewals_succeeded: usize,
    pub renewals_failed: usize,
    pub results: Vec<RenewalResult>,
}

/// Scans the state document and re-subscribes what is about to lapse.
///
/// Assumes a single writer: two concurrent runs may both renew the same
/// subscription and the last save wins.
pub struct RenewalEngine {
    store: Arc<dyn StateStore>,
    hub: Arc<dyn PubSubHub>,
    policy: RenewalPolicy,
}

impl RenewalEngine {
    pub fn new(store: Arc<dyn StateStore>, hub: Arc<dyn PubSubHub>, policy: RenewalPolicy) -> Self {
        Self { store, hub, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &RenewalPolicy {
        &self.policy
    }

    pub async fn run(&self) -> Result<RenewalSummary> {
        self.run_at(Utc::now()).await
    }

    /// One renewal pass as of `now`. Loads once, saves once. A failed load or
    /// save fails the whole run; hub failures only fail their candidate.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RenewalSummary> {
        let mut state = self.store.load().await?;
        let threshold = TimeDelta::from_std(self.policy.threshold).unwrap_or(TimeDelta::MAX);

        let mut channel_ids: Vec<String> = state.subscriptions.keys().cloned().collect();
        channel_ids.sort();

        let mut results = Vec::new();
        let total_checked = channel_ids.len();

        for channel_id in channel_ids {
            let Some(sub) = state.subscriptions.get_mut(&channel_id) else {
                continue;
            };

            if sub.remaining(now) > threshold {
                debug!(%channel_id, expires_at = %sub.expires_at, "not due for renewal");
                continue;
            }

            if sub.renewal_attempts >= self.policy.max_attempts {
                warn!(
                    %channel_id,
                    attempts = sub.renewal_attempts,
                    "renewal attempts exhausted, skipping"
                );
                results.push(RenewalResult {
                    channel_id,
                    success: false,
                    message: format!(
                        "Max renewal attempts ({}) exceeded",
                        self.policy.max_attempts
                    ),
                    new_expiry_time: None,
                    attempt_count: sub.renewal_attempts,
                });
                continue;
            }

            match self
                .hub
                .subscribe(&channel_id, self.policy.lease_seconds)
                .await
            {
                Ok(_) => {
                    sub.expires_at = lease_end(now, self.policy.lease_seconds);
                    sub.last_renewal = now;
                    sub.lease_seconds = self.policy.lease_seconds;
                    sub.renewal_attempts = 0;
                    sub.status = SubscriptionStatus::Active;
                    sub.hub_response = RENEWED_HUB_RESPONSE.to_string();
                    debug!(%channel_id, expires_at = %sub.expires_at, "subscription renewed");
                    results.push(RenewalResult {
                        channel_id,
                        success: true,
                        message: "Subscription renewed".into(),
                        new_expiry_time: Some(sub.expires_at),
                        attempt_count: 0,
                    });
                },
                Err(e) => {
                    sub.renewal_attempts = sub.renewal_attempts.saturating_add(1);
                    warn!(
                        %channel_id,
                        attempts = sub.renewal_attempts,
                        error = %e,
                        "renewal failed"
                    );
                    results.push(RenewalResult {
                        channel_id,
                        success: false,
                        message: e.to_string(),
                        new_expiry_time: None,
                        attempt_count: sub.renewal_attempts,
                    });
                },
            }
        }

        self.store.save(&state).await?;

        let succeeded = results.iter().filter(|r| r.success).count();
        let summary = RenewalSummary {
            status: "completed".into(),
            total_checked,
            renewals_candidates: results.len(),
            renewals_succeeded: succeeded,
            renewals_failed: results.len() - succeeded,
            results,
        };
        info!(
            total_checked = summary.total_checked,
            candidates = summary.renewals_candidates,
            succeeded = summary.renewals_succeeded,
            failed = summary.renewals_failed,
            "renewal run finished"
        );
        Ok(summary)
    }

    /// Run renewal every `every`, starting one interval from now. Errors are
    /// logged and the loop keeps going. Abort the handle to stop.
    pub fn spawn_periodic(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run().await {
                    error!(error = %e, "scheduled renewal run failed");
                }
            }
        })
    }
}
