use http::StatusCode;
use prism_core::HttpError;
use thiserror::Error;

/// Errors produced while resolving a model identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No catalog entry matches the identifier
    #[error("model not found: {model}")]
    ModelNotFound { model: String },

    /// The model exists but cannot satisfy a requested capability
    #[error("model {model} is incompatible with the request: {reason}")]
    ModelIncompatible { model: String, reason: String },
}

impl HttpError for ResolveError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ModelNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ModelIncompatible { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::ModelNotFound { .. } => "model_not_found",
            Self::ModelIncompatible { .. } => "model_incompatible",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}
