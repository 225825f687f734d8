//! HTTP routes for the completion gateway

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Path, RawQuery, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use http::StatusCode;
use prism_core::{HttpError, RequestContext};
use prism_models::ModelIdentifier;
use prism_tools::register_auth_fields;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::LlmError;
use crate::orchestrator::GatewayState;
use crate::protocol::gateway::ChatCompletionBody;
use crate::stream::{data_stream_response, raw_stream_response};
use crate::types::ChatRequest;

pub fn llm_router(state: GatewayState) -> Router {
    Router::new()
        .route("/chat/completions", post(chat_completions))
        .route("/models", get(list_models))
        .route("/tools/{tool_id}", post(register_tool_auth))
        .route("/images/models/{*model_id}", get(model_icon))
        .route("/images/tools/{tool_id}", get(tool_icon))
        .with_state(state)
}

async fn chat_completions(
    State(state): State<GatewayState>,
    context: Option<Extension<RequestContext>>,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Response {
    let context = context.map_or_else(RequestContext::empty, |Extension(ctx)| ctx);

    let body = merge_query(body, query.as_deref());
    let body: ChatCompletionBody = match serde_json::from_value(body) {
        Ok(body) => body,
        Err(e) => return error_response(&LlmError::InvalidRequest(e.to_string())),
    };
    let request: ChatRequest = match body.try_into() {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    if request.stream {
        let use_chat = request.use_chat;
        match state.complete_stream(request, &context).await {
            Ok((events, schema_mode)) => {
                if use_chat {
                    data_stream_response(events, schema_mode)
                } else {
                    raw_stream_response(events)
                }
            }
            Err(e) => error_response(&e),
        }
    } else {
        match state.complete(request, &context).await {
            Ok(envelope) => Json(envelope).into_response(),
            Err(e) => error_response(&e),
        }
    }
}

/// Query-string parameters override body fields before validation.
///
/// Values that parse as JSON are merged as such, everything else as a
/// string, so `?stream=true` yields a boolean.
fn merge_query(mut body: Value, query: Option<&str>) -> Value {
    let Some(query) = query else { return body };
    let Some(object) = body.as_object_mut() else { return body };

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let parsed = serde_json::from_str(&value).unwrap_or_else(|_| Value::String(value.to_string()));
        object.insert(key.to_string(), parsed);
    }
    body
}

async fn list_models(State(state): State<GatewayState>) -> Json<Value> {
    let created = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let data: Vec<Value> = state
        .catalog()
        .entries()
        .iter()
        .map(|entry| {
            json!({
                "id": entry.slug(),
                "object": "model",
                "created": created,
                "owned_by": entry.vendor,
                "permission": [],
            })
        })
        .collect();

    Json(json!({"object": "list", "data": data}))
}

#[derive(Debug, Deserialize)]
struct RegisterAuthBody {
    scheme: String,
    #[serde(default)]
    fields: Value,
    #[serde(default)]
    user: Option<String>,
}

async fn register_tool_auth(
    State(state): State<GatewayState>,
    Path(tool_id): Path<String>,
    context: Option<Extension<RequestContext>>,
    Json(body): Json<RegisterAuthBody>,
) -> Response {
    let context = context.map_or_else(RequestContext::empty, |Extension(ctx)| ctx);

    let Some(directory) = state.directory() else {
        return error_response(&LlmError::InvalidRequest(
            "tool augmentation is not configured".to_owned(),
        ));
    };
    let Some(user) = body.user.or_else(|| context.user_id().map(ToOwned::to_owned)) else {
        return error_response(&LlmError::InvalidRequest(
            "registering credentials requires a user identifier".to_owned(),
        ));
    };

    match register_auth_fields(directory, &user, &tool_id, &body.scheme, body.fields).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e.into()),
    }
}

async fn model_icon(State(state): State<GatewayState>, Path(model_id): Path<String>) -> Response {
    let identifier = ModelIdentifier::parse(&model_id, prism_models::ModelOptions::default());
    match state.catalog().find(identifier.vendor.as_deref(), &identifier.family) {
        Some(entry) => Redirect::temporary(entry.icon).into_response(),
        None => error_response(&LlmError::ModelNotFound { model: model_id }),
    }
}

async fn tool_icon(State(state): State<GatewayState>, Path(tool_id): Path<String>) -> Response {
    let app = prism_tools::app_of(&tool_id);
    match state.tool_icon_base() {
        Some(base) => {
            let target = format!("{}/{app}/icon", base.as_str().trim_end_matches('/'));
            Redirect::temporary(&target).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": "no icon source configured", "type": "not_found", "code": null}})),
        )
            .into_response(),
    }
}

/// Serializes a pipeline error into the gateway's error body.
fn error_response(err: &LlmError) -> Response {
    let mut body = json!({
        "error": {
            "message": err.client_message(),
            "type": err.error_type(),
            "code": null,
        }
    });
    if let LlmError::ToolAuthorizationRequired { requests } = err {
        body["connection_requests"] = json!(requests);
    }
    (err.status_code(), Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_parameters_override_the_body() {
        let merged = merge_query(
            json!({"model": "gpt-4.1", "stream": false}),
            Some("stream=true&user=u-1"),
        );
        assert_eq!(merged["stream"], json!(true));
        assert_eq!(merged["user"], json!("u-1"));
        assert_eq!(merged["model"], json!("gpt-4.1"));
    }

    #[test]
    fn unparseable_query_values_merge_as_strings() {
        let merged = merge_query(json!({}), Some("model=openai/gpt-4.1"));
        assert_eq!(merged["model"], json!("openai/gpt-4.1"));
    }

    #[test]
    fn authorization_errors_carry_connection_requests() {
        let err = LlmError::ToolAuthorizationRequired {
            requests: vec![prism_tools::ConnectionRequest {
                app: "github".to_owned(),
                methods: vec![prism_tools::AuthScheme::Oauth2],
            }],
        };
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
