//! Shared test utilities for the hotconf workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`dir`]: [`ConfigDir`] scratch directory for config files
//! - [`wait`]: polling helpers for asserting on background watch sessions

pub mod dir;
pub mod wait;

pub use dir::ConfigDir;
pub use wait::{recv_until, wait_for};

/// Upper bound for anything a watch session is expected to do.
pub const WATCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
