use std::cmp::Ordering;

use crate::catalog::{Capabilities, Catalog, Endpoint, ModelEntry, ProviderKind};
use crate::error::ResolveError;
use crate::identifier::{ModelIdentifier, ProviderPriority, Variant};

/// Outcome of resolving a model identifier against the catalog
///
/// Structurally comparable: resolving the same identifier twice yields equal
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    /// Adapter the completion is dispatched through
    pub kind: ProviderKind,
    /// Canonical `vendor/family[:variant]` slug
    pub slug: String,
    /// Identifier sent to the upstream API
    pub upstream_id: String,
    /// Capabilities after variant tags are applied
    pub capabilities: Capabilities,
    /// Accepted input modalities
    pub modalities: &'static [&'static str],
    /// Endpoint chosen under the request's priorities and price ceiling
    pub endpoint: Endpoint,
}

impl Catalog {
    /// Resolves an identifier to a concrete upstream target.
    ///
    /// Bare identifiers missing from the table fall through to the
    /// aggregator unchanged.
    ///
    /// # Errors
    ///
    /// `ModelNotFound` when an explicit vendor prefix matches no entry,
    /// `ModelIncompatible` when the entry cannot satisfy the requested
    /// tools, output schema, or price ceiling.
    pub fn resolve(&self, id: &ModelIdentifier) -> Result<ResolvedModel, ResolveError> {
        let Some(entry) = self.find(id.vendor.as_deref(), &id.family) else {
            // Bare names outside the embedded table are passed through to
            // the aggregator, which serves a far larger catalog. Explicit
            // vendor prefixes stay strict.
            if id.vendor.is_none() {
                return Ok(aggregator_fallback(id));
            }
            return Err(ResolveError::ModelNotFound {
                model: id.raw().to_owned(),
            });
        };

        let mut capabilities = entry.capabilities;
        if id.variant == Some(Variant::Thinking) {
            capabilities.reasoning = true;
        }

        if !id.options.tools.is_empty() && !capabilities.tools {
            return Err(ResolveError::ModelIncompatible {
                model: id.raw().to_owned(),
                reason: "model does not support tool calling".to_owned(),
            });
        }
        // An output schema can still be honored via tool calling when the
        // model lacks native structured output.
        if id.options.output_schema.is_some()
            && !capabilities.structured_output
            && !capabilities.tools
        {
            return Err(ResolveError::ModelIncompatible {
                model: id.raw().to_owned(),
                reason: "model supports neither structured output nor tools".to_owned(),
            });
        }

        let endpoint = select_endpoint(entry, id)?;

        let kind = entry.provider_kind();
        let mut slug = entry.slug();
        let mut upstream_id = entry.upstream_id.to_owned();
        if let Some(variant) = id.variant {
            slug.push(':');
            slug.push_str(variant.as_str());
            // The aggregator interprets variant tags itself, so they travel
            // on the upstream id. Direct vendors take them as capability
            // flags instead.
            if kind == ProviderKind::Aggregator {
                upstream_id.push(':');
                upstream_id.push_str(variant.as_str());
            }
        }

        Ok(ResolvedModel {
            kind,
            slug,
            upstream_id,
            capabilities,
            modalities: entry.modalities,
            endpoint,
        })
    }
}

const FALLBACK_MODALITIES: &[&str] = &["text"];

/// Placeholder endpoint for models the embedded table does not list
const FALLBACK_ENDPOINT: Endpoint = Endpoint {
    tag: "aggregator",
    input_cost: 0.0,
    output_cost: 0.0,
    throughput: 0.0,
    latency: 0.0,
};

/// Routes an unlisted bare identifier through the aggregator as-is.
///
/// Capabilities are assumed permissive for tools and emulated for
/// structured output; the aggregator rejects what its model cannot do.
fn aggregator_fallback(id: &ModelIdentifier) -> ResolvedModel {
    let mut upstream_id = id.family.clone();
    if let Some(variant) = id.variant {
        upstream_id.push(':');
        upstream_id.push_str(variant.as_str());
    }
    ResolvedModel {
        kind: ProviderKind::Aggregator,
        slug: upstream_id.clone(),
        upstream_id,
        capabilities: Capabilities {
            tools: true,
            structured_output: false,
            reasoning: id.variant == Some(Variant::Thinking),
        },
        modalities: FALLBACK_MODALITIES,
        endpoint: FALLBACK_ENDPOINT,
    }
}

/// Picks the best endpoint under the price ceiling and priority order.
///
/// Without priorities the first surviving endpoint wins, preserving table
/// order.
fn select_endpoint(entry: &ModelEntry, id: &ModelIdentifier) -> Result<Endpoint, ResolveError> {
    let mut candidates: Vec<Endpoint> = entry
        .endpoints
        .iter()
        .filter(|e| id.options.max_price.is_none_or(|ceiling| e.output_cost <= ceiling))
        .copied()
        .collect();

    if candidates.is_empty() {
        return Err(ResolveError::ModelIncompatible {
            model: id.raw().to_owned(),
            reason: "no endpoint within the requested price ceiling".to_owned(),
        });
    }

    if !id.options.provider_priorities.is_empty() {
        candidates.sort_by(|a, b| rank(a, b, &id.options.provider_priorities));
    }

    Ok(candidates[0])
}

fn rank(a: &Endpoint, b: &Endpoint, priorities: &[ProviderPriority]) -> Ordering {
    for priority in priorities {
        let ordering = match priority {
            ProviderPriority::Cost => {
                (a.input_cost + a.output_cost).total_cmp(&(b.input_cost + b.output_cost))
            }
            ProviderPriority::Throughput => b.throughput.total_cmp(&a.throughput),
            ProviderPriority::Latency => a.latency.total_cmp(&b.latency),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
