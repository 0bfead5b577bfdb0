//! Persistence trait for the subscription document.

use async_trait::async_trait;

use crate::{Result, types::SubscriptionState};

/// Durable home of the single [`SubscriptionState`] document.
///
/// `load` returns an owned value the caller may mutate freely; no
/// implementation may hand out shared references into its own copy.
/// A missing document loads as an empty state.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<SubscriptionState>;

    /// Persist `state`. Implementations stamp `metadata` (version default and
    /// `lastUpdated`) on what they write.
    async fn save(&self, state: &SubscriptionState) -> Result<()>;
}
