use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::directory::{ToolDirectory, ToolSchema};
use crate::error::{ConnectionRequest, ToolError};
use crate::scheme::AuthScheme;

/// A tool resolved against the caller's connected accounts
#[derive(Debug, Clone)]
pub struct ToolBinding {
    /// Fully qualified tool name as the caller sent it
    pub name: String,
    /// Owning application slug
    pub app: String,
    /// The caller's connection id for the owning application
    ///
    /// Empty for applications that need no authentication.
    pub connection_id: String,
    /// Raw parameter schema from the directory, before vendor normalization
    pub schema: ToolSchema,
}

/// Owning application of a tool, from its namespace prefix
///
/// `github.create_issue` belongs to `github`; an unqualified name is its own
/// application.
pub fn app_of(tool_name: &str) -> &str {
    tool_name.split_once('.').map_or(tool_name, |(app, _)| app)
}

/// Resolves tool names into executable bindings.
///
/// Walks the caller's connected accounts page by page, then checks every
/// requested application before failing, so one response reports all missing
/// connections. Applications that need no authentication are never reported
/// as missing.
///
/// # Errors
///
/// `AuthorizationRequired` listing every unconnected application, or a
/// directory error.
pub async fn resolve_tools(
    directory: &dyn ToolDirectory,
    user_id: &str,
    tool_names: &[String],
) -> Result<Vec<ToolBinding>, ToolError> {
    if tool_names.is_empty() {
        return Ok(Vec::new());
    }

    let apps = requested_apps(tool_names);
    let connections = connected_apps(directory, user_id, &apps).await?;
    debug!(user_id, connected = connections.len(), "resolved connected accounts");

    let mut missing: Vec<ConnectionRequest> = Vec::new();
    let mut no_auth_apps: Vec<String> = Vec::new();
    for &app in &apps {
        if connections.contains_key(app) {
            continue;
        }
        let info = directory.app_info(app).await?;
        if info.no_auth {
            no_auth_apps.push(app.to_owned());
            continue;
        }
        missing.push(ConnectionRequest {
            app: app.to_owned(),
            methods: info.schemes()?,
        });
    }
    if !missing.is_empty() {
        return Err(ToolError::AuthorizationRequired { requests: missing });
    }

    let mut bindings = Vec::with_capacity(tool_names.len());
    for name in tool_names {
        let app = app_of(name);
        let connection_id = connections.get(app).cloned().unwrap_or_default();
        let schema = directory.tool_schema(name).await?;
        bindings.push(ToolBinding {
            name: name.clone(),
            app: app.to_owned(),
            connection_id,
            schema,
        });
    }
    Ok(bindings)
}

/// Registers credential fields for a tool's application.
///
/// # Errors
///
/// `UnknownAuthScheme` for unrecognized scheme strings, `UnsupportedAuthScheme`
/// for schemes that need a browser flow instead of fields.
pub async fn register_auth_fields(
    directory: &dyn ToolDirectory,
    user_id: &str,
    tool_id: &str,
    scheme: &str,
    fields: Value,
) -> Result<Value, ToolError> {
    let app = app_of(tool_id);
    let scheme: AuthScheme = scheme.parse().map_err(|()| ToolError::UnknownAuthScheme {
        app: app.to_owned(),
        scheme: scheme.to_owned(),
    })?;
    if !scheme.supports_field_registration() {
        return Err(ToolError::UnsupportedAuthScheme {
            app: app.to_owned(),
            scheme,
        });
    }
    directory.register_auth_fields(user_id, app, scheme, fields).await
}

/// Requested applications in first-appearance order, deduplicated
fn requested_apps(tool_names: &[String]) -> Vec<&str> {
    let mut apps = Vec::new();
    for name in tool_names {
        let app = app_of(name);
        if !apps.contains(&app) {
            apps.push(app);
        }
    }
    apps
}

/// Connected account per application, walking pages only until every
/// requested application is matched or a page comes back empty
async fn connected_apps(
    directory: &dyn ToolDirectory,
    user_id: &str,
    apps: &[&str],
) -> Result<HashMap<String, String>, ToolError> {
    let mut connections = HashMap::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = directory.connected_accounts(user_id, cursor.as_deref()).await?;
        let exhausted = page.items.is_empty();
        for account in page.items {
            connections.entry(account.app).or_insert(account.id);
        }
        if exhausted || apps.iter().all(|app| connections.contains_key(*app)) {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(connections)
}
