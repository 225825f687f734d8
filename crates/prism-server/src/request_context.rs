use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prism_core::{CallerIdentity, RequestContext};
use secrecy::SecretString;

/// Builds a `RequestContext` from the incoming request
///
/// Runs innermost, after the identity layer, so a resolved
/// `CallerIdentity` extension is already present when there is one.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let api_key = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| SecretString::from(token.to_owned()));

    let caller = request.extensions().get::<CallerIdentity>().cloned();

    let context = RequestContext { api_key, caller };
    request.extensions_mut().insert(context);

    next.run(request).await
}
