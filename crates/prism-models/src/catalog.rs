//! Embedded model catalog
//!
//! Each entry maps a caller-facing family to the upstream identifier sent to
//! the owning provider, together with capability flags and the endpoints the
//! family is served from. Table order is load-bearing for bare-family lookup:
//! direct vendors come before aggregator-only entries.

use serde::Serialize;

/// Vendors the gateway speaks to with a dedicated protocol adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    OpenAi,
    Anthropic,
    Google,
}

/// Which adapter a resolved model is dispatched through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Multi-vendor aggregator speaking the OpenAI wire protocol
    Aggregator,
    /// First-party vendor API
    Direct(Vendor),
}

/// What a model family can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Supports tool / function calling
    pub tools: bool,
    /// Supports native structured output (JSON schema enforcement)
    pub structured_output: bool,
    /// Supports extended reasoning
    pub reasoning: bool,
}

/// One endpoint serving a model family
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Endpoint {
    /// Short label identifying the hosting endpoint
    pub tag: &'static str,
    /// Dollars per million input tokens
    pub input_cost: f64,
    /// Dollars per million output tokens
    pub output_cost: f64,
    /// Sustained output tokens per second
    pub throughput: f64,
    /// Median time-to-first-token in seconds
    pub latency: f64,
}

/// Catalog row for one model family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelEntry {
    /// Vendor segment of the caller-facing identifier
    pub vendor: &'static str,
    /// Family segment of the caller-facing identifier
    pub family: &'static str,
    /// Identifier sent upstream to the owning provider
    pub upstream_id: &'static str,
    pub capabilities: Capabilities,
    /// Accepted input modalities
    pub modalities: &'static [&'static str],
    pub endpoints: &'static [Endpoint],
    /// Vendor icon asset, served via the image redirect endpoints
    pub icon: &'static str,
}

impl ModelEntry {
    /// Caller-facing `vendor/family` slug
    pub fn slug(&self) -> String {
        format!("{}/{}", self.vendor, self.family)
    }

    /// Adapter this entry is dispatched through
    pub fn provider_kind(&self) -> ProviderKind {
        match self.vendor {
            "openai" => ProviderKind::Direct(Vendor::OpenAi),
            "anthropic" => ProviderKind::Direct(Vendor::Anthropic),
            "google" => ProviderKind::Direct(Vendor::Google),
            _ => ProviderKind::Aggregator,
        }
    }
}

const TEXT: &[&str] = &["text"];
const TEXT_IMAGE: &[&str] = &["text", "image"];

const OPENAI_ICON: &str = "https://icons.prism.omni.dev/openai.svg";
const ANTHROPIC_ICON: &str = "https://icons.prism.omni.dev/anthropic.svg";
const GOOGLE_ICON: &str = "https://icons.prism.omni.dev/google.svg";
const DEEPSEEK_ICON: &str = "https://icons.prism.omni.dev/deepseek.svg";
const META_ICON: &str = "https://icons.prism.omni.dev/meta.svg";
const MISTRAL_ICON: &str = "https://icons.prism.omni.dev/mistral.svg";

macro_rules! caps {
    ($tools:expr, $structured:expr, $reasoning:expr) => {
        Capabilities {
            tools: $tools,
            structured_output: $structured,
            reasoning: $reasoning,
        }
    };
}

static ENTRIES: &[ModelEntry] = &[
    ModelEntry {
        vendor: "openai",
        family: "gpt-4.1",
        upstream_id: "gpt-4.1",
        capabilities: caps!(true, true, false),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "openai",
            input_cost: 2.0,
            output_cost: 8.0,
            throughput: 120.0,
            latency: 0.45,
        }],
        icon: OPENAI_ICON,
    },
    ModelEntry {
        vendor: "openai",
        family: "gpt-4.1-mini",
        upstream_id: "gpt-4.1-mini",
        capabilities: caps!(true, true, false),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "openai",
            input_cost: 0.4,
            output_cost: 1.6,
            throughput: 160.0,
            latency: 0.35,
        }],
        icon: OPENAI_ICON,
    },
    ModelEntry {
        vendor: "openai",
        family: "gpt-4o",
        upstream_id: "gpt-4o",
        capabilities: caps!(true, true, false),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "openai",
            input_cost: 2.5,
            output_cost: 10.0,
            throughput: 110.0,
            latency: 0.4,
        }],
        icon: OPENAI_ICON,
    },
    ModelEntry {
        vendor: "openai",
        family: "gpt-4o-mini",
        upstream_id: "gpt-4o-mini",
        capabilities: caps!(true, true, false),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "openai",
            input_cost: 0.15,
            output_cost: 0.6,
            throughput: 170.0,
            latency: 0.3,
        }],
        icon: OPENAI_ICON,
    },
    ModelEntry {
        vendor: "openai",
        family: "o3",
        upstream_id: "o3",
        capabilities: caps!(true, true, true),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "openai",
            input_cost: 2.0,
            output_cost: 8.0,
            throughput: 90.0,
            latency: 1.2,
        }],
        icon: OPENAI_ICON,
    },
    ModelEntry {
        vendor: "openai",
        family: "o4-mini",
        upstream_id: "o4-mini",
        capabilities: caps!(true, true, true),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "openai",
            input_cost: 1.1,
            output_cost: 4.4,
            throughput: 130.0,
            latency: 0.9,
        }],
        icon: OPENAI_ICON,
    },
    ModelEntry {
        vendor: "anthropic",
        family: "claude-opus-4",
        upstream_id: "claude-opus-4-20250514",
        capabilities: caps!(true, false, true),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "anthropic",
            input_cost: 15.0,
            output_cost: 75.0,
            throughput: 50.0,
            latency: 1.1,
        }],
        icon: ANTHROPIC_ICON,
    },
    ModelEntry {
        vendor: "anthropic",
        family: "claude-sonnet-4",
        upstream_id: "claude-sonnet-4-20250514",
        capabilities: caps!(true, false, true),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "anthropic",
            input_cost: 3.0,
            output_cost: 15.0,
            throughput: 75.0,
            latency: 0.8,
        }],
        icon: ANTHROPIC_ICON,
    },
    ModelEntry {
        vendor: "anthropic",
        family: "claude-3-7-sonnet",
        upstream_id: "claude-3-7-sonnet-20250219",
        capabilities: caps!(true, false, true),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "anthropic",
            input_cost: 3.0,
            output_cost: 15.0,
            throughput: 70.0,
            latency: 0.8,
        }],
        icon: ANTHROPIC_ICON,
    },
    ModelEntry {
        vendor: "anthropic",
        family: "claude-3-5-haiku",
        upstream_id: "claude-3-5-haiku-20241022",
        capabilities: caps!(true, false, false),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "anthropic",
            input_cost: 0.8,
            output_cost: 4.0,
            throughput: 120.0,
            latency: 0.5,
        }],
        icon: ANTHROPIC_ICON,
    },
    ModelEntry {
        vendor: "google",
        family: "gemini-2.5-pro",
        upstream_id: "gemini-2.5-pro",
        capabilities: caps!(true, true, true),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "google",
            input_cost: 1.25,
            output_cost: 10.0,
            throughput: 100.0,
            latency: 0.9,
        }],
        icon: GOOGLE_ICON,
    },
    ModelEntry {
        vendor: "google",
        family: "gemini-2.5-flash",
        upstream_id: "gemini-2.5-flash",
        capabilities: caps!(true, true, true),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "google",
            input_cost: 0.3,
            output_cost: 2.5,
            throughput: 200.0,
            latency: 0.4,
        }],
        icon: GOOGLE_ICON,
    },
    ModelEntry {
        vendor: "google",
        family: "gemini-2.0-flash",
        upstream_id: "gemini-2.0-flash",
        capabilities: caps!(true, true, false),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "google",
            input_cost: 0.1,
            output_cost: 0.4,
            throughput: 220.0,
            latency: 0.35,
        }],
        icon: GOOGLE_ICON,
    },
    ModelEntry {
        vendor: "deepseek",
        family: "deepseek-chat",
        upstream_id: "deepseek/deepseek-chat-v3-0324",
        capabilities: caps!(true, true, false),
        modalities: TEXT,
        endpoints: &[
            Endpoint {
                tag: "deepinfra",
                input_cost: 0.3,
                output_cost: 0.85,
                throughput: 60.0,
                latency: 0.7,
            },
            Endpoint {
                tag: "novita",
                input_cost: 0.27,
                output_cost: 1.1,
                throughput: 40.0,
                latency: 1.3,
            },
        ],
        icon: DEEPSEEK_ICON,
    },
    ModelEntry {
        vendor: "deepseek",
        family: "deepseek-reasoner",
        upstream_id: "deepseek/deepseek-r1-0528",
        capabilities: caps!(false, false, true),
        modalities: TEXT,
        endpoints: &[
            Endpoint {
                tag: "deepinfra",
                input_cost: 0.5,
                output_cost: 2.15,
                throughput: 45.0,
                latency: 1.5,
            },
            Endpoint {
                tag: "together",
                input_cost: 3.0,
                output_cost: 7.0,
                throughput: 110.0,
                latency: 0.6,
            },
        ],
        icon: DEEPSEEK_ICON,
    },
    ModelEntry {
        vendor: "meta-llama",
        family: "llama-4-maverick",
        upstream_id: "meta-llama/llama-4-maverick",
        capabilities: caps!(true, true, false),
        modalities: TEXT_IMAGE,
        endpoints: &[
            Endpoint {
                tag: "deepinfra",
                input_cost: 0.17,
                output_cost: 0.6,
                throughput: 90.0,
                latency: 0.5,
            },
            Endpoint {
                tag: "groq",
                input_cost: 0.2,
                output_cost: 0.6,
                throughput: 550.0,
                latency: 0.25,
            },
        ],
        icon: META_ICON,
    },
    ModelEntry {
        vendor: "meta-llama",
        family: "llama-3.3-70b-instruct",
        upstream_id: "meta-llama/llama-3.3-70b-instruct",
        capabilities: caps!(true, false, false),
        modalities: TEXT,
        endpoints: &[
            Endpoint {
                tag: "deepinfra",
                input_cost: 0.23,
                output_cost: 0.4,
                throughput: 35.0,
                latency: 0.8,
            },
            Endpoint {
                tag: "groq",
                input_cost: 0.59,
                output_cost: 0.79,
                throughput: 300.0,
                latency: 0.3,
            },
        ],
        icon: META_ICON,
    },
    ModelEntry {
        vendor: "mistralai",
        family: "mistral-small-3.1",
        upstream_id: "mistralai/mistral-small-3.1-24b-instruct",
        capabilities: caps!(true, false, false),
        modalities: TEXT_IMAGE,
        endpoints: &[Endpoint {
            tag: "mistral",
            input_cost: 0.1,
            output_cost: 0.3,
            throughput: 130.0,
            latency: 0.4,
        }],
        icon: MISTRAL_ICON,
    },
];

/// Immutable lookup table over the embedded entries
///
/// The catalog is passed explicitly to everything that resolves models; there
/// is no process-global instance.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    entries: &'static [ModelEntry],
}

impl Catalog {
    /// Catalog backed by the embedded table
    pub const fn builtin() -> Self {
        Self { entries: ENTRIES }
    }

    pub fn entries(&self) -> &'static [ModelEntry] {
        self.entries
    }

    /// Looks up an entry by explicit vendor, or by table order when the
    /// identifier carries no vendor prefix.
    pub fn find(&self, vendor: Option<&str>, family: &str) -> Option<&'static ModelEntry> {
        match vendor {
            Some(vendor) => self
                .entries
                .iter()
                .find(|e| e.vendor == vendor && e.family == family),
            None => self.entries.iter().find(|e| e.family == family),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_vendors_map_to_their_adapter() {
        let catalog = Catalog::builtin();
        let entry = catalog.find(Some("anthropic"), "claude-sonnet-4").unwrap();
        assert_eq!(entry.provider_kind(), ProviderKind::Direct(Vendor::Anthropic));
    }

    #[test]
    fn non_direct_vendors_go_through_the_aggregator() {
        let catalog = Catalog::builtin();
        for vendor in ["deepseek", "meta-llama", "mistralai"] {
            let entry = catalog
                .entries()
                .iter()
                .find(|e| e.vendor == vendor)
                .unwrap();
            assert_eq!(entry.provider_kind(), ProviderKind::Aggregator);
        }
    }

    #[test]
    fn bare_family_lookup_follows_table_order() {
        let catalog = Catalog::builtin();
        let entry = catalog.find(None, "gpt-4o").unwrap();
        assert_eq!(entry.vendor, "openai");
    }

    #[test]
    fn every_entry_has_at_least_one_endpoint() {
        for entry in Catalog::builtin().entries() {
            assert!(!entry.endpoints.is_empty(), "{} has no endpoints", entry.slug());
        }
    }
}
