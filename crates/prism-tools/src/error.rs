use http::StatusCode;
use prism_core::HttpError;
use serde::Serialize;
use thiserror::Error;

use crate::scheme::AuthScheme;

/// One missing application connection, with the ways it can be established
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionRequest {
    /// Application slug the caller has no connection for
    pub app: String,
    /// Authentication modes the application supports
    pub methods: Vec<AuthScheme>,
}

/// Errors from tool resolution, registration, and execution
#[derive(Debug, Error)]
pub enum ToolError {
    /// One or more tool applications have no connected account for the caller
    #[error("missing connections for {} application(s)", requests.len())]
    AuthorizationRequired { requests: Vec<ConnectionRequest> },

    /// A recognized scheme that cannot be connected by submitting fields
    #[error("auth scheme {scheme} for {app} cannot be registered with credential fields")]
    UnsupportedAuthScheme { app: String, scheme: AuthScheme },

    /// A scheme string the gateway does not recognize
    #[error("unknown auth scheme {scheme} for {app}")]
    UnknownAuthScheme { app: String, scheme: String },

    /// Tool augmentation requested but no directory is configured
    #[error("no tool directory is configured")]
    NotConfigured,

    /// The directory call itself failed
    #[error("tool directory call failed: {message}")]
    Directory { message: String },
}

impl HttpError for ToolError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthorizationRequired { .. } => StatusCode::FORBIDDEN,
            Self::UnsupportedAuthScheme { .. }
            | Self::UnknownAuthScheme { .. }
            | Self::NotConfigured => StatusCode::BAD_REQUEST,
            Self::Directory { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::AuthorizationRequired { .. } => "tool_authorization_required",
            Self::UnsupportedAuthScheme { .. } => "unsupported_auth_scheme",
            Self::UnknownAuthScheme { .. } => "unknown_auth_scheme",
            Self::NotConfigured => "invalid_request",
            Self::Directory { .. } => "upstream_call_failure",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}
