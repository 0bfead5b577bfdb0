//! PubSubHubbub subscription lifecycle.
//!
//! State lives in a single JSON document (`subscriptions/state.json`) behind
//! the [`store::StateStore`] trait. The hub is reached through
//! [`hub::PubSubHub`]. [`manager::SubscriptionManager`] handles create, remove
//! and list; [`renewal::RenewalEngine`] re-subscribes leases that are about to
//! expire.

pub mod error;
pub mod hub;
pub mod hub_memory;
pub mod manager;
pub mod renewal;
pub mod store;
pub mod store_cached;
pub mod store_file;
pub mod store_memory;
pub mod types;

pub use error::{Error, Result};
