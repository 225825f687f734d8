use http::StatusCode;
use prism_core::HttpError;
use prism_models::ResolveError;
use prism_tools::{ConnectionRequest, ToolError};
use thiserror::Error;

/// Errors surfaced by the completion pipeline, all terminal
#[derive(Debug, Error)]
pub enum LlmError {
    /// No catalog entry matches the requested model
    #[error("model not found: {model}")]
    ModelNotFound { model: String },

    /// The model cannot satisfy a requested capability
    #[error("model {model} is incompatible with the request: {reason}")]
    ModelIncompatible { model: String, reason: String },

    /// One or more tool applications have no connection for the caller
    #[error("missing connections for {} application(s)", requests.len())]
    ToolAuthorizationRequired { requests: Vec<ConnectionRequest> },

    /// Recognized auth scheme that cannot be registered via fields
    #[error("auth scheme {scheme} for {app} cannot be registered with credential fields")]
    UnsupportedAuthScheme { app: String, scheme: String },

    /// Auth scheme string the gateway does not recognize
    #[error("unknown auth scheme {scheme} for {app}")]
    UnknownAuthScheme { app: String, scheme: String },

    /// The upstream call failed; no retry is attempted
    #[error("upstream call failed with status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Failure inside an already-open stream
    #[error("streaming error: {0}")]
    Streaming(String),

    /// Malformed or contradictory request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or unusable caller credentials
    #[error("authentication required")]
    Unauthorized,

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ResolveError> for LlmError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::ModelNotFound { model } => Self::ModelNotFound { model },
            ResolveError::ModelIncompatible { model, reason } => Self::ModelIncompatible { model, reason },
        }
    }
}

impl From<ToolError> for LlmError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::AuthorizationRequired { requests } => Self::ToolAuthorizationRequired { requests },
            ToolError::UnsupportedAuthScheme { app, scheme } => Self::UnsupportedAuthScheme {
                app,
                scheme: scheme.as_str().to_owned(),
            },
            ToolError::UnknownAuthScheme { app, scheme } => Self::UnknownAuthScheme { app, scheme },
            ToolError::NotConfigured => Self::InvalidRequest("no tool directory is configured".to_owned()),
            ToolError::Directory { message } => Self::Upstream { status: 502, message },
        }
    }
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ModelNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ToolAuthorizationRequired { .. } => StatusCode::FORBIDDEN,
            Self::ModelIncompatible { .. }
            | Self::UnsupportedAuthScheme { .. }
            | Self::UnknownAuthScheme { .. }
            | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Streaming(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::ModelNotFound { .. } => "model_not_found",
            Self::ModelIncompatible { .. } => "model_incompatible",
            Self::ToolAuthorizationRequired { .. } => "tool_authorization_required",
            Self::UnsupportedAuthScheme { .. } => "unsupported_auth_scheme",
            Self::UnknownAuthScheme { .. } => "unknown_auth_scheme",
            Self::Upstream { .. } => "upstream_call_failure",
            Self::Streaming(_) => "streaming_error",
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Unauthorized => "authentication_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}
