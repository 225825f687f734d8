//! Shared request-scoped types for the Prism gateway
//!
//! Feature crates depend on this instead of each other, keeping domain
//! errors and caller identity decoupled from the HTTP layer.

mod context;
mod error;

pub use context::{CallerIdentity, RequestContext};
pub use error::HttpError;
