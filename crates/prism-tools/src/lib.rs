//! Tool augmentation subsystem
//!
//! Resolves logical tool names against a connected-accounts directory,
//! producing bindings a completion can execute through, and reporting every
//! missing connection in one pass.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod directory;
mod error;
mod resolve;
mod scheme;

pub use directory::{
    AccountPage, AppInfo, ConnectedAccount, HttpToolDirectory, ToolDirectory, ToolSchema,
};
pub use error::{ConnectionRequest, ToolError};
pub use resolve::{app_of, register_auth_fields, resolve_tools, ToolBinding};
pub use scheme::AuthScheme;
