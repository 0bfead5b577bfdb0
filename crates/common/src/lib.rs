//! Shared types and helpers used across all ytrelay crates.

pub mod error;
pub mod youtube;

pub use error::{ErrorKind, FromMessage};
