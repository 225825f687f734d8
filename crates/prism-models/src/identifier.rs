use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Parsed caller-facing model identifier
///
/// Identifiers take the form `[vendor/]family[:variant]`. The raw string is
/// kept verbatim so response envelopes can echo exactly what the caller sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelIdentifier {
    raw: String,
    /// Explicit vendor prefix, when present
    pub vendor: Option<String>,
    /// Model family without vendor prefix or variant tag
    pub family: String,
    /// Trailing variant tag, when recognized
    pub variant: Option<Variant>,
    /// Structured options carried alongside the identifier
    pub options: ModelOptions,
}

impl ModelIdentifier {
    /// Parses an identifier string together with its options.
    ///
    /// Unrecognized `:suffix` tags stay part of the family so that catalog
    /// lookup reports them as unknown models rather than silently dropping
    /// them.
    pub fn parse(raw: impl Into<String>, options: ModelOptions) -> Self {
        let raw = raw.into();
        let (vendor, rest) = match raw.split_once('/') {
            Some((vendor, rest)) if !vendor.is_empty() => (Some(vendor.to_owned()), rest),
            _ => (None, raw.as_str()),
        };
        let (family, variant) = match rest.rsplit_once(':') {
            Some((family, tag)) => match tag.parse::<Variant>() {
                Ok(variant) => (family.to_owned(), Some(variant)),
                Err(()) => (rest.to_owned(), None),
            },
            None => (rest.to_owned(), None),
        };
        Self {
            raw,
            vendor,
            family,
            variant,
            options,
        }
    }

    /// The identifier exactly as the caller sent it
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Variant tag appended to an identifier after `:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Forces extended reasoning on
    Thinking,
    /// Requests web-grounded completion where the upstream supports it
    Online,
}

impl Variant {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Online => "online",
        }
    }
}

impl FromStr for Variant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thinking" => Ok(Self::Thinking),
            "online" => Ok(Self::Online),
            _ => Err(()),
        }
    }
}

/// Per-request model options supplied in the request body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ModelOptions {
    /// Endpoint ranking criteria, applied in order
    pub provider_priorities: Vec<ProviderPriority>,
    /// Names of directory tools to augment the completion with
    pub tools: Vec<String>,
    /// Named output schema reference
    pub output_schema: Option<String>,
    /// Ceiling on endpoint output cost, in dollars per million tokens
    pub max_price: Option<f64>,
}

impl ModelOptions {
    /// Whether any option deviates from the defaults
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Criterion for ranking candidate endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPriority {
    /// Cheapest combined token cost first
    Cost,
    /// Highest tokens-per-second first
    Throughput,
    /// Lowest time-to-first-token first
    Latency,
}
