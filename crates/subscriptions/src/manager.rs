//! Create, remove and list subscriptions.

use std::sync::Arc;

use {
    chrono::{DateTime, Utc},
    serde::Serialize,
    tracing::{info, warn},
};

use crate::{
    Error, Result,
    hub::PubSubHub,
    store::StateStore,
    types::{Subscription, SubscriptionStatus},
};

/// One row of [`ListSummary`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionView {
    pub channel_id: String,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
    /// Negative once the lease has run out.
    pub days_until_expiry: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListSummary {
    pub subscriptions: Vec<SubscriptionView>,
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

/// Subscription lifecycle against one store and one hub.
pub struct SubscriptionManager {
    store: Arc<dyn StateStore>,
    hub: Arc<dyn PubSubHub>,
    callback_url: String,
    lease_seconds: u64,
}

impl SubscriptionManager {
    pub fn new(
        store: Arc<dyn StateStore>,
        hub: Arc<dyn PubSubHub>,
        callback_url: impl Into<String>,
        lease_seconds: u64,
    ) -> Self {
        Self {
            store,
            hub,
            callback_url: callback_url.into(),
            lease_seconds,
        }
    }

    pub async fn create(&self, channel_id: &str) -> Result<Subscription> {
        self.create_at(channel_id, Utc::now()).await
    }

    /// Subscribe `channel_id` at the hub and record it.
    ///
    /// The id is validated before any store or hub access. An expired entry
    /// for the same channel is replaced; an active one is a conflict.
    pub async fn create_at(&self, channel_id: &str, now: DateTime<Utc>) -> Result<Subscription> {
        if !ytrelay_common::youtube::is_valid_channel_id(channel_id) {
            return Err(Error::invalid_channel_id(channel_id));
        }

        let mut state = self.store.load().await?;
        if state
            .get(channel_id)
            .is_some_and(|s| s.status_at(now) == SubscriptionStatus::Active)
        {
            return Err(Error::already_subscribed(channel_id));
        }

        let hub_response = self
            .hub
            .subscribe(channel_id, self.lease_seconds)
            .await
            .inspect_err(|e| warn!(channel_id, error = %e, "hub subscribe failed"))?;

        let mut sub = Subscription::new(channel_id, &self.callback_url, self.lease_seconds, now);
        sub.hub_response = hub_response;
        state.upsert(sub.clone());

        if let Err(e) = self.store.save(&state).await {
            warn!(channel_id, error = %e, "hub subscribed but state save failed");
            return Err(Error::partial(channel_id, e));
        }

        info!(channel_id, expires_at = %sub.expires_at, "subscription created");
        Ok(sub)
    }

    /// Unsubscribe at the hub, then forget the entry. The entry is kept when
    /// the hub call fails.
    pub async fn remove(&self, channel_id: &str) -> Result<()> {
        let mut state = self.store.load().await?;
        if state.get(channel_id).is_none() {
            return Err(Error::not_found(channel_id));
        }

        self.hub
            .unsubscribe(channel_id)
            .await
            .inspect_err(|e| warn!(channel_id, error = %e, "hub unsubscribe failed"))?;

        state.remove(channel_id);
        if let Err(e) = self.store.save(&state).await {
            warn!(channel_id, error = %e, "hub unsubscribed but state save failed");
            return Err(Error::partial(channel_id, e));
        }

        info!(channel_id, "subscription removed");
        Ok(())
    }

    pub async fn list(&self) -> Result<ListSummary> {
        self.list_at(Utc::now()).await
    }

    /// Every subscription with its status as of `now`. Never writes.
    pub async fn list_at(&self, now: DateTime<Utc>) -> Result<ListSummary> {
        let state = self.store.load().await?;

        let mut subscriptions: Vec<SubscriptionView> = state
            .subscriptions
            .values()
            .map(|s| SubscriptionView {
                channel_id: s.channel_id.clone(),
                status: s.status_at(now),
                expires_at: s.expires_at,
                days_until_expiry: s.days_until_expiry(now),
            })
            .collect();
        subscriptions.sort_by(|a, b| a.channel_id.cmp(&b.channel_id));

        let active = subscriptions
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .count();
        Ok(ListSummary {
            total: subscriptions.len(),
            expired: subscriptions.len() - active,
            active,
            subscriptions,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            hub::HubMode, hub_memory::InMemoryHub, store_memory::InMemoryStore,
            types::SubscriptionState,
        },
        chrono::Duration,
        rstest::rstest,
        ytrelay_common::ErrorKind,
    };

    const CHANNEL: &str = "UCXuqSBlHAE6Xw-yeJA0Tunw";

    fn make_manager() -> (SubscriptionManager, Arc<InMemoryStore>, Arc<InMemoryHub>) {
        let store = Arc::new(InMemoryStore::new());
        let hub = Arc::new(InMemoryHub::new());
        let mgr = SubscriptionManager::new(
            store.clone(),
            hub.clone(),
            "https://relay.example.com/",
            86_400,
        );
        (mgr, store, hub)
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (mgr, store, hub) = make_manager();
        let now = Utc::now();

        let sub = mgr.create_at(CHANNEL, now).await.unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.lease_seconds, 86_400);
        assert_eq!(sub.hub_response, "202 Accepted");

        let summary = mgr.list_at(now).await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.expired, 0);
        assert_eq!(summary.subscriptions[0].channel_id, CHANNEL);
        assert!((summary.subscriptions[0].days_until_expiry - 1.0).abs() < 1e-6);

        assert_eq!(store.snapshot().len(), 1);
        let calls = hub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].mode, HubMode::Subscribe);
        assert_eq!(calls[0].lease_seconds, Some(86_400));
    }

    #[rstest]
    #[case("")]
    #[case("UCshort")]
    #[case("XXXuqSBlHAE6Xw-yeJA0Tunw")]
    #[case("UCXuqSBlHAE6Xw-yeJA0Tun!")]
    #[case("UCXuqSBlHAE6Xw-yeJA0Tunwx")]
    #[tokio::test]
    async fn test_invalid_channel_id_touches_nothing(#[case] channel_id: &str) {
        let (mgr, store, hub) = make_manager();
        let err = mgr.create(channel_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(store.load_count(), 0);
        assert_eq!(store.save_count(), 0);
        assert_eq!(hub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let (mgr, store, hub) = make_manager();
        mgr.create(CHANNEL).await.unwrap();
        let err = mgr.create(CHANNEL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(hub.call_count(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_create_replaces_expired_entry() {
        let (mgr, store, _hub) = make_manager();
        let then = Utc::now() - Duration::days(3);
        mgr.create_at(CHANNEL, then).await.unwrap();

        let now = Utc::now();
        let sub = mgr.create_at(CHANNEL, now).await.unwrap();
        assert_eq!(sub.subscribed_at, now);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_create_hub_failure_leaves_state_unchanged() {
        let (mgr, store, hub) = make_manager();
        hub.set_fail_all(true);
        let err = mgr.create(CHANNEL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(store.save_count(), 0);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_create_save_failure_is_partial() {
        let (mgr, store, hub) = make_manager();
        store.set_fail_saves(true);
        let err = mgr.create(CHANNEL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PartialFailure);
        assert!(err.to_string().contains(CHANNEL));
        assert_eq!(hub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let (mgr, store, hub) = make_manager();
        mgr.create(CHANNEL).await.unwrap();
        mgr.remove(CHANNEL).await.unwrap();
        assert!(store.snapshot().is_empty());
        assert_eq!(hub.calls()[1].mode, HubMode::Unsubscribe);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let (mgr, _store, hub) = make_manager();
        let err = mgr.remove(CHANNEL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(hub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_hub_failure_keeps_entry() {
        let (mgr, store, hub) = make_manager();
        mgr.create(CHANNEL).await.unwrap();
        hub.set_fail_all(true);
        let err = mgr.remove(CHANNEL).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_list_counts_expired_without_writing() {
        let now = Utc::now();
        let mut state = SubscriptionState::default();
        state.upsert(Subscription::new(CHANNEL, "https://cb/", 86_400, now));
        state.upsert(Subscription::new(
            "UC_x5XG1OV2P6uZZ5FSM9Ttw",
            "https://cb/",
            86_400,
            now - Duration::days(2),
        ));
        let store = Arc::new(InMemoryStore::with_state(state));
        let mgr = SubscriptionManager::new(
            store.clone(),
            Arc::new(InMemoryHub::new()),
            "https://cb/",
            86_400,
        );

        let summary = mgr.list_at(now).await.unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.expired, 1);
        let expired = &summary.subscriptions[0];
        assert_eq!(expired.channel_id, "UC_x5XG1OV2P6uZZ5FSM9Ttw");
        assert_eq!(expired.status, SubscriptionStatus::Expired);
        assert!(expired.days_until_expiry < 0.0);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_list_serializes_snake_case() {
        let (mgr, _store, _hub) = make_manager();
        mgr.create(CHANNEL).await.unwrap();
        let json = serde_json::to_value(mgr.list().await.unwrap()).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["subscriptions"][0]["channel_id"], CHANNEL);
        assert_eq!(json["subscriptions"][0]["status"], "active");
        assert!(json["subscriptions"][0]["expires_at"].is_string());
        assert!(json["subscriptions"][0]["days_until_expiry"].is_number());
    }
}
