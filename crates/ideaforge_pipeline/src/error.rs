//! Error taxonomy for the pipeline.
//!
//! Three recoverable families: preconditions (`ValidationError`), the
//! generation boundary (`GenerationError`), and the persistence gateway
//! (`PersistError`). None are fatal; the pipeline stays usable after any of
//! them and the caller re-prompts or retries.

use thiserror::Error;

use ideaforge_ids::VariationId;

use crate::generate::GenerationError;
use crate::stage::PipelineStage;
use crate::store::PersistError;

/// A precondition for a transition, edit, or commit was not met.
///
/// State is always left unchanged; the messages are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("give your idea a title before generating variations")]
    EmptySeedTitle,

    #[error("select at least two variations")]
    NeedTwoSelections,

    #[error("select an idea to continue")]
    NoFinalSelection,

    #[error("combine the selected variations before continuing")]
    CombineRequired,

    #[error("the seed idea is locked while variations exist")]
    SeedLocked,

    #[error("unknown variation: {0}")]
    UnknownVariation(VariationId),

    #[error("a generation request is already in flight")]
    GenerationInFlight,

    #[error("{action} is not available at the {stage} stage")]
    WrongStage {
        action: &'static str,
        stage: PipelineStage,
    },
}

/// Umbrella error surfaced by pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("idea generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("failed to save idea: {0}")]
    Persist(#[from] PersistError),
}

impl PipelineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, PipelineError::Generation(_))
    }

    pub fn is_persist(&self) -> bool {
        matches!(self, PipelineError::Persist(_))
    }
}
