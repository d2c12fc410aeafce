//! adtsync core library — domain types, work item resolution, settings.
//!
//! - [`types`] — newtypes and domain structs
//! - [`resolver`] — locator list → deduplicated [`WorkItem`]s
//! - [`config`] — optional YAML settings file
//! - [`text`] — string helpers
//! - [`error`] — [`ResolveError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod resolver;
pub mod text;
pub mod types;

pub use error::{ConfigError, ResolveError};
pub use types::{ActivationProtocol, Label, RunMode, TransportRequest, WorkItem};
