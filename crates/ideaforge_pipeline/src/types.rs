//! Core data model for the idea-refinement pipeline.
//!
//! These types are the contract between the pipeline, the idea-generation
//! service, and the persistence gateway. Everything serializes so a session
//! can be snapshotted and restored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use ideaforge_ids::{ConceptId, VariationId};

// ============================================================================
// Seed Idea
// ============================================================================

/// The user's starting point: a one-line idea plus context.
///
/// Mutable only while the pipeline sits at the `Initial` stage; once a
/// variation batch exists the seed is read-only until the user navigates
/// back or resets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedIdea {
    /// One-line description. Required before variations can be generated.
    pub title: String,
    /// Free-text context: where the idea came from, what prompted it.
    pub inspiration: String,
    /// Free-text classification: product, service, technology.
    pub concept_type: String,
}

impl SeedIdea {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// True when the seed carries enough content to request variations.
    pub fn is_ready(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

// ============================================================================
// Edit sub-state
// ============================================================================

/// Draft buffer for an in-place edit.
///
/// Exists only while an item is being edited; discarded on cancel and
/// copied into the canonical fields on save. Canonical fields are never
/// touched while the buffer is live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBuffer {
    pub title: String,
    pub description: String,
}

/// Addressable fields of an edit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditField {
    Title,
    Description,
}

// ============================================================================
// Variation
// ============================================================================

/// Content fields for a variation, as returned by the generation service.
///
/// The pipeline assigns the id and the selection/edit sub-state; the
/// service only ever produces content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationDraft {
    pub title: String,
    pub description: String,
    pub differentiator: String,
    pub target_market: String,
    pub revenue_model: String,
}

/// One proposed angle on the seed idea, independently selectable/editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    /// Stable within a pipeline run; survives single-item regeneration.
    pub id: VariationId,
    pub title: String,
    pub description: String,
    pub differentiator: String,
    pub target_market: String,
    pub revenue_model: String,
    /// Multi-select: any number of variations may be selected at once.
    pub selected: bool,
    /// What the user likes about this angle. Meaningful while selected.
    pub liked_aspects: String,
    /// Live edit buffer, present only while editing.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub edit: Option<EditBuffer>,
}

impl Variation {
    pub(crate) fn from_draft(id: VariationId, draft: VariationDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            differentiator: draft.differentiator,
            target_market: draft.target_market,
            revenue_model: draft.revenue_model,
            selected: false,
            liked_aspects: String::new(),
            edit: None,
        }
    }

    /// Replace content in place, preserving id, selection, and liked
    /// aspects. Any live edit is dropped.
    pub(crate) fn replace_content(&mut self, draft: VariationDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.differentiator = draft.differentiator;
        self.target_market = draft.target_market;
        self.revenue_model = draft.revenue_model;
        self.edit = None;
    }

    pub fn editing(&self) -> bool {
        self.edit.is_some()
    }
}

// ============================================================================
// Combined Concept
// ============================================================================

/// Content fields for a combined concept, as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDraft {
    pub title: String,
    pub description: String,
    pub target_market: String,
    pub revenue_model: String,
    pub value_proposition: String,
}

/// A synthesis of two or more selected variations into one refined idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedConcept {
    pub id: ConceptId,
    pub title: String,
    pub description: String,
    /// Differentiators of the variations that contributed, in order.
    pub source_elements: Vec<String>,
    pub target_market: String,
    pub revenue_model: String,
    pub value_proposition: String,
    /// Mutually exclusive: at most one concept is selected at any time.
    pub selected: bool,
    /// Live edit buffer, present only while editing.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub edit: Option<EditBuffer>,
}

impl CombinedConcept {
    pub(crate) fn from_draft(
        id: ConceptId,
        draft: ConceptDraft,
        source_elements: Vec<String>,
    ) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            source_elements,
            target_market: draft.target_market,
            revenue_model: draft.revenue_model,
            value_proposition: draft.value_proposition,
            selected: false,
            edit: None,
        }
    }

    pub fn editing(&self) -> bool {
        self.edit.is_some()
    }
}

// ============================================================================
// Finalized record
// ============================================================================

/// Lifecycle status of a persisted idea.
///
/// The pipeline only ever writes `Draft`; the remaining statuses are set by
/// later workflow stages outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    Draft,
    Exploring,
    Validated,
    Archived,
}

impl IdeaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaStatus::Draft => "draft",
            IdeaStatus::Exploring => "exploring",
            IdeaStatus::Validated => "validated",
            IdeaStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit entry for one selected variation that shaped the final idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationFeedback {
    pub id: VariationId,
    pub title: String,
    pub liked_aspects: String,
}

/// Audit entry for the combined concept the user finalized, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptFeedback {
    pub id: ConceptId,
    pub title: String,
    pub source_elements: Vec<String>,
}

/// Audit payload capturing which generated items produced the final idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiFeedback {
    /// Title of the seed the run started from.
    pub seed_title: String,
    /// The selected variations, with the user's liked aspects.
    pub original_variations: Vec<VariationFeedback>,
    /// Present when the final selection came from the Combined stage.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub combined_concept: Option<ConceptFeedback>,
}

/// The record persisted through the gateway. Created exactly once per
/// successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedIdeaRecord {
    pub title: String,
    pub description: String,
    pub target_market: String,
    pub solution_concept: String,
    pub status: IdeaStatus,
    pub created_at: DateTime<Utc>,
    pub ai_feedback: AiFeedback,
}

impl FinalizedIdeaRecord {
    /// Assemble a record from a single selected variation (the shortcut
    /// branch that bypasses the Combined stage).
    pub fn from_variation(seed_title: &str, variation: &Variation) -> Self {
        Self {
            title: variation.title.clone(),
            description: variation.description.clone(),
            target_market: variation.target_market.clone(),
            solution_concept: variation.differentiator.clone(),
            status: IdeaStatus::Draft,
            created_at: Utc::now(),
            ai_feedback: AiFeedback {
                seed_title: seed_title.to_string(),
                original_variations: vec![VariationFeedback {
                    id: variation.id,
                    title: variation.title.clone(),
                    liked_aspects: variation.liked_aspects.clone(),
                }],
                combined_concept: None,
            },
        }
    }

    /// Assemble a record from the finalized combined concept plus the
    /// variations that fed into it.
    pub fn from_concept(
        seed_title: &str,
        concept: &CombinedConcept,
        contributing: &[&Variation],
    ) -> Self {
        Self {
            title: concept.title.clone(),
            description: concept.description.clone(),
            target_market: concept.target_market.clone(),
            solution_concept: concept.value_proposition.clone(),
            status: IdeaStatus::Draft,
            created_at: Utc::now(),
            ai_feedback: AiFeedback {
                seed_title: seed_title.to_string(),
                original_variations: contributing
                    .iter()
                    .map(|v| VariationFeedback {
                        id: v.id,
                        title: v.title.clone(),
                        liked_aspects: v.liked_aspects.clone(),
                    })
                    .collect(),
                combined_concept: Some(ConceptFeedback {
                    id: concept.id,
                    title: concept.title.clone(),
                    source_elements: concept.source_elements.clone(),
                }),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
