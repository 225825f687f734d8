//! Multi-provider completion pipeline
//!
//! Parses caller-facing model identifiers, resolves them against the
//! embedded catalog, dispatches to the configured vendor adapter, and
//! shapes the result into an OpenAI-style envelope or a streaming body.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod orchestrator;
pub mod protocol;
pub mod provider;
pub mod registry;
pub mod router;
pub mod schema;
pub mod stream;
pub mod types;

pub use error::LlmError;
pub use orchestrator::GatewayState;
pub use registry::ProviderRegistry;
pub use router::llm_router;
