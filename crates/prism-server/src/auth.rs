use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;

use crate::identity::{IdentityError, IdentityResolver};

/// Resolves bearer credentials to a `CallerIdentity` extension
///
/// Requests without an Authorization header pass through anonymous;
/// downstream handlers decide whether identity is required. A credential
/// the identity API rejects is a hard 401.
pub async fn identity_middleware(resolver: IdentityResolver, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(ToOwned::to_owned);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match resolver.resolve(&token).await {
        Ok(identity) => {
            let mut request = request;
            request.extensions_mut().insert(identity.as_ref().clone());
            next.run(request).await
        }
        Err(IdentityError::InvalidCredential) => {
            tracing::warn!("credential rejected by identity api");
            unauthorized("invalid credential")
        }
        Err(e @ IdentityError::Api { .. }) => {
            tracing::error!(error = %e, "identity resolution failed");
            unauthorized("credential could not be verified")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": {"message": message, "type": "authentication_error", "code": null}
        })),
    )
        .into_response()
}
