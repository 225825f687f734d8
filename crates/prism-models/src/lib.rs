//! Model identifier parsing and resolution for the Prism gateway
//!
//! Maps caller-facing model identifiers (`vendor/family:variant` plus
//! structured options) onto concrete upstream endpoints using an embedded
//! catalog. Resolution is pure: the same identifier always yields the same
//! `ResolvedModel`.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod catalog;
mod error;
mod identifier;
mod resolve;

pub use catalog::{Capabilities, Catalog, Endpoint, ModelEntry, ProviderKind, Vendor};
pub use error::ResolveError;
pub use identifier::{ModelIdentifier, ModelOptions, ProviderPriority, Variant};
pub use resolve::ResolvedModel;
