use std::sync::Arc;

use {
    tracing::info,
    ytrelay_config::RelayConfig,
    ytrelay_notify::{
        NotificationDispatcher, github::GithubDispatcher, trigger::WorkflowTrigger,
    },
    ytrelay_subscriptions::{
        hub::{HttpHub, PubSubHub},
        manager::SubscriptionManager,
        renewal::{RenewalEngine, RenewalPolicy},
        store::StateStore,
        store_cached::CachedStore,
        store_file::FileStore,
    },
};

/// Everything a handler needs, built once at startup and cloned per request.
///
/// Tests build it with in-memory stores, hubs and triggers through
/// [`AppState::new`]; production wiring goes through
/// [`AppState::from_config`].
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SubscriptionManager>,
    pub renewal: Arc<RenewalEngine>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub version: &'static str,
}

impl AppState {
    pub fn new(
        store: Arc<dyn StateStore>,
        hub: Arc<dyn PubSubHub>,
        trigger: Arc<dyn WorkflowTrigger>,
        config: &RelayConfig,
    ) -> Self {
        let manager = SubscriptionManager::new(
            Arc::clone(&store),
            Arc::clone(&hub),
            config.server.callback_url.clone(),
            config.hub.lease_seconds,
        );
        let renewal = RenewalEngine::new(store, hub, renewal_policy(config));
        Self {
            manager: Arc::new(manager),
            renewal: Arc::new(renewal),
            dispatcher: Arc::new(NotificationDispatcher::new(trigger)),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// File-backed store (cached when `storage.cache_ttl_secs > 0`), HTTP hub
    /// and GitHub dispatcher.
    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        let path = config.storage.resolved_state_path();
        info!(path = %path.display(), "subscription state file");

        let file = FileStore::new(path).with_timeout(config.storage.timeout());
        let store: Arc<dyn StateStore> = match config.storage.cache_ttl() {
            Some(ttl) => Arc::new(CachedStore::new(file, ttl)),
            None => Arc::new(file),
        };
        let hub = HttpHub::new(
            config.hub.url.clone(),
            config.server.callback_url.clone(),
            config.hub.timeout(),
        )?;
        let trigger = GithubDispatcher::from_config(&config.github)?;

        Ok(Self::new(store, Arc::new(hub), Arc::new(trigger), config))
    }
}

#[must_use]
pub fn renewal_policy(config: &RelayConfig) -> RenewalPolicy {
    RenewalPolicy {
        threshold: config.renewal.threshold(),
        max_attempts: config.renewal.max_attempts,
        lease_seconds: config.hub.lease_seconds,
    }
}
