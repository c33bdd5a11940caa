//! Typed configuration runtime for hotconf
//!
//! Binds configuration files to explicit schemas, creates them with defaults
//! when absent, and keeps the reloadable entries of a live instance in sync
//! with external edits.
//!
//! # Example
//!
//! ```no_run
//! use hotconf_core::{Config, ConfigManager, EntrySpec};
//!
//! struct Service;
//!
//! impl Config for Service {
//!     const NAME: &'static str = "Service";
//!
//!     fn entries() -> Vec<EntrySpec> {
//!         vec![
//!             EntrySpec::integer("retries", 3).reloadable(),
//!             EntrySpec::string("name", "svc"),
//!         ]
//!     }
//! }
//!
//! let config = ConfigManager::new().initialize::<Service>("cfg.json5")?;
//! let retries: u32 = config.get("retries")?;
//! # Ok::<(), hotconf_core::Error>(())
//! ```

pub mod binder;
pub mod error;
pub mod instance;
pub mod io;
pub mod manager;
pub mod schema;
pub mod value;
pub mod watch;

pub use binder::{EntryChange, from_document, merge_reloadable, to_defaults, to_document};
pub use error::{Error, Result};
pub use instance::ConfigInstance;
pub use manager::ConfigManager;
pub use schema::{Config, EntrySpec, Schema};
pub use value::{FromValue, Mismatch, TypeTag, Value};
pub use watch::{WatchEvent, WatchOptions, WatchSession, WatchStats, WatchStatus};

pub use hotconf_format::{Document, Format, Serializer, SerializerRegistry};
