//! Contract with the idea-generation service.
//!
//! The service is a black box: given a seed it proposes variations, given a
//! base idea plus selected variations it proposes combined concepts. Both
//! calls may fail with a human-readable message and are safe to retry; the
//! pipeline applies results all-or-nothing.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::types::{ConceptDraft, SeedIdea, Variation, VariationDraft};

/// Failure at the generation boundary. Pipeline state is unchanged when
/// one of these surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The service call itself failed (network, backend).
    #[error("idea service error: {0}")]
    Service(String),

    /// The service answered with something unusable.
    #[error("idea service returned a malformed result: {0}")]
    Malformed(String),

    /// The call exceeded the configured deadline.
    #[error("idea service timed out after {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }
}

/// The opaque idea-generation backend.
///
/// Single-item regeneration reuses `variations` with a seed produced by
/// [`regeneration_seed`]; whether the service varies further or replaces
/// outright is its own business.
#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    /// Propose a batch of variations for the seed.
    async fn variations(&self, seed: &SeedIdea) -> Result<Vec<VariationDraft>, GenerationError>;

    /// Synthesize combined concepts from the selected variations.
    async fn combinations(
        &self,
        base_title: &str,
        selected: &[Variation],
    ) -> Result<Vec<ConceptDraft>, GenerationError>;
}

/// Build the seed used to regenerate a single variation: the original seed
/// with the prior variation's content folded into the inspiration as extra
/// context for the service.
pub fn regeneration_seed(seed: &SeedIdea, prior: &Variation) -> SeedIdea {
    let mut inspiration = seed.inspiration.clone();
    if !inspiration.is_empty() {
        inspiration.push_str("\n\n");
    }
    inspiration.push_str(&format!(
        "Propose a fresh take distinct from this earlier angle: \"{}\": {} (differentiator: {})",
        prior.title, prior.description, prior.differentiator
    ));

    SeedIdea {
        title: seed.title.clone(),
        inspiration,
        concept_type: seed.concept_type.clone(),
    }
}
