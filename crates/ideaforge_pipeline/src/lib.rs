//! Guided idea-refinement pipeline.
//!
//! A three-stage workflow that turns a raw seed idea into a persisted
//! concept: the seed produces a batch of variations, selected variations
//! can be combined into refined concepts, and the final selection commits
//! through a persistence gateway. Items are individually selectable and
//! editable in place; a single selected variation finalizes directly,
//! skipping the combination stage.
//!
//! The generation backend and the durable store are collaborators behind
//! the [`IdeaGenerator`] and [`IdeaStore`] traits; the pipeline itself is a
//! pure in-process state machine whose only suspension points are the
//! generation calls.

pub mod config;
pub mod draft;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod sessions;
pub mod stage;
pub mod store;
pub mod types;

pub use ideaforge_ids::{ConceptId, IdeaId, SessionId, VariationId};

pub use config::PipelineConfig;
pub use draft::{DraftBoard, DraftRef};
pub use error::{PipelineError, ValidationError};
pub use generate::{regeneration_seed, GenerationError, IdeaGenerator};
pub use pipeline::{Advance, ApplyOutcome, GenerationTicket, IdeaPipeline, PipelineSnapshot};
pub use sessions::SessionRegistry;
pub use stage::{PipelineStage, StageTransition};
pub use store::{IdeaStore, MemoryIdeaStore, PersistError};
pub use types::{
    AiFeedback, CombinedConcept, ConceptDraft, ConceptFeedback, EditBuffer, EditField,
    FinalizedIdeaRecord, IdeaStatus, SeedIdea, Variation, VariationDraft, VariationFeedback,
};
