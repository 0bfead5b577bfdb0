//! Inbound YouTube push notifications.
//!
//! The hub POSTs an Atom document for every upload or metadata edit.
//! [`entry::parse_feed`] pulls out the first entry, [`classifier`] decides
//! whether it is a fresh upload, and [`dispatcher::NotificationDispatcher`]
//! fires the downstream [`trigger::WorkflowTrigger`] when it is.

pub mod classifier;
pub mod dispatcher;
pub mod entry;
pub mod error;
pub mod github;
pub mod trigger;
pub mod trigger_memory;

pub use {
    classifier::{is_new_video, is_new_video_at},
    dispatcher::{DispatchOutcome, NotificationDispatcher},
    entry::Entry,
    error::{Error, Result},
};
