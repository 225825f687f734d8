//! Vendor-specific JSON Schema normalization
//!
//! Every transform is pure and returns a new value; input schemas are never
//! mutated in place.

use prism_models::{ProviderKind, Vendor};
use serde_json::{Map, Value};

/// Normalizes a tool or output schema for the resolved vendor.
pub fn normalize_for(kind: ProviderKind, schema: &Value) -> Value {
    match kind {
        ProviderKind::Aggregator => strip_unsupported_keywords(schema),
        ProviderKind::Direct(Vendor::OpenAi) => enforce_strict_objects(schema),
        ProviderKind::Direct(Vendor::Google) => to_openapi(schema),
        // Anthropic accepts plain JSON Schema for tool inputs
        ProviderKind::Direct(Vendor::Anthropic) => schema.clone(),
    }
}

/// Removes `default`, `minimum`, `maximum`, and `examples` at every depth.
///
/// Aggregator backends reject these keywords on several hosted models.
pub fn strip_unsupported_keywords(schema: &Value) -> Value {
    const STRIPPED: &[&str] = &["default", "minimum", "maximum", "examples"];
    transform_objects(schema, &|object| {
        for key in STRIPPED {
            object.remove(*key);
        }
    })
}

/// Adds `additionalProperties: false` to every object schema.
///
/// OpenAI strict mode requires closed objects throughout the tree.
pub fn enforce_strict_objects(schema: &Value) -> Value {
    transform_objects(schema, &|object| {
        if object.get("type").and_then(Value::as_str) == Some("object") {
            object.insert("additionalProperties".to_owned(), Value::Bool(false));
        }
    })
}

/// Reshapes JSON Schema into the OpenAPI subset Google accepts.
///
/// Drops `$schema` and `additionalProperties`, which `generateContent`
/// rejects.
pub fn to_openapi(schema: &Value) -> Value {
    transform_objects(schema, &|object| {
        object.remove("$schema");
        object.remove("additionalProperties");
    })
}

/// Strips a Markdown code fence wrapping a JSON payload, if present.
///
/// Vendors without native structured output tend to wrap the requested JSON
/// in a ```` ```json ```` block.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text.to_owned();
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text.to_owned();
    };
    // The opening fence may carry a language tag on its own line
    let body = body.strip_prefix("json").unwrap_or(body);
    body.trim().to_owned()
}

/// Applies `edit` to every JSON object in the tree, leaves first.
fn transform_objects(value: &Value, edit: &dyn Fn(&mut Map<String, Value>)) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                out.insert(key.clone(), transform_objects(child, edit));
            }
            edit(&mut out);
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| transform_objects(v, edit)).collect()),
        other => other.clone(),
    }
}
