//! The pipeline itself: stage control, generation tickets, commit.
//!
//! One `IdeaPipeline` owns one refinement run: the seed, the draft board,
//! the current stage, and the transition history. Generation calls are the
//! only suspension points. They follow a two-phase shape: `begin_*` hands
//! out a ticket and the request payload, `apply_*`/`abort_generation`
//! resolve it. A caller that interleaves user actions with an outstanding
//! request gets at most one request in flight, and late results for an
//! abandoned stage are discarded instead of applied out of context. The
//! async convenience methods wrap the two phases plus the configured
//! deadline for callers that do not interleave.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use ideaforge_ids::{IdeaId, VariationId};

use crate::config::PipelineConfig;
use crate::draft::DraftBoard;
use crate::error::{PipelineError, ValidationError};
use crate::generate::{regeneration_seed, GenerationError, IdeaGenerator};
use crate::stage::{PipelineStage, StageTransition};
use crate::store::IdeaStore;
use crate::types::{ConceptDraft, FinalizedIdeaRecord, SeedIdea, Variation, VariationDraft};

// ============================================================================
// Generation tickets
// ============================================================================

/// Receipt for an in-flight generation request.
///
/// Captures the pipeline epoch at issue time; back-navigation and reset
/// bump the epoch, so resolving a ticket from an abandoned context is a
/// no-op rather than a corruption.
#[derive(Debug)]
pub struct GenerationTicket {
    epoch: u64,
}

/// What happened when a generation result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The batch was installed.
    Applied,
    /// The result arrived for a context the user has left; dropped.
    DiscardedStale,
}

/// Result of the "continue" action from the Variations stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Exactly one variation selected: finalize directly, skipping the
    /// Combined stage.
    ReadyToFinalize,
    /// Two or more selected: a concept batch was generated and the
    /// pipeline moved to Combined.
    Combined,
}

#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Variations,
    Regenerate(VariationId),
    Combine { source_elements: Vec<String> },
}

// ============================================================================
// Pipeline
// ============================================================================

/// Serializable capture of a pipeline for save/restore. Never carries an
/// in-flight request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub stage: PipelineStage,
    pub seed: SeedIdea,
    pub board: DraftBoard,
    pub history: Vec<StageTransition>,
}

/// One guided idea-refinement run.
#[derive(Debug)]
pub struct IdeaPipeline {
    config: PipelineConfig,
    stage: PipelineStage,
    seed: SeedIdea,
    board: DraftBoard,
    history: Vec<StageTransition>,
    epoch: u64,
    pending: Option<Pending>,
}

impl IdeaPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            stage: PipelineStage::Initial,
            seed: SeedIdea::default(),
            board: DraftBoard::default(),
            history: Vec::new(),
            epoch: 0,
            pending: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn seed(&self) -> &SeedIdea {
        &self.seed
    }

    /// Mutable seed access, only while the pipeline sits at `Initial`.
    /// Once a variation batch exists the seed is read-only context.
    pub fn seed_mut(&mut self) -> Result<&mut SeedIdea, ValidationError> {
        if self.stage != PipelineStage::Initial {
            return Err(ValidationError::SeedLocked);
        }
        Ok(&mut self.seed)
    }

    pub fn board(&self) -> &DraftBoard {
        &self.board
    }

    /// Selection and edit operations go through the board directly; batch
    /// installation stays with the pipeline.
    pub fn board_mut(&mut self) -> &mut DraftBoard {
        &mut self.board
    }

    pub fn history(&self) -> &[StageTransition] {
        &self.history
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn generation_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    // ========================================================================
    // Two-phase generation: variations
    // ========================================================================

    /// Reserve the variation-generation slot and hand back the seed to send
    /// to the service. Fails without state change if the seed has no title,
    /// the stage is wrong, or a request is already outstanding.
    pub fn begin_variations(&mut self) -> Result<(GenerationTicket, SeedIdea), ValidationError> {
        self.ensure_idle()?;
        if self.stage != PipelineStage::Initial {
            return Err(ValidationError::WrongStage {
                action: "generate variations",
                stage: self.stage,
            });
        }
        if !self.seed.is_ready() {
            return Err(ValidationError::EmptySeedTitle);
        }

        self.pending = Some(Pending::Variations);
        Ok((self.ticket(), self.seed.clone()))
    }

    /// Install a variation batch. All-or-nothing: an empty batch is a
    /// malformed result and leaves the stage at `Initial`.
    pub fn apply_variations(
        &mut self,
        ticket: GenerationTicket,
        drafts: Vec<VariationDraft>,
    ) -> Result<ApplyOutcome, PipelineError> {
        if self.is_stale(&ticket) {
            return Ok(ApplyOutcome::DiscardedStale);
        }
        if !matches!(self.pending, Some(Pending::Variations)) {
            warn!("variation result resolved against a different request; dropping");
            return Ok(ApplyOutcome::DiscardedStale);
        }
        self.pending = None;

        let mut drafts = drafts;
        if drafts.is_empty() {
            return Err(GenerationError::Malformed(
                "service returned no variations".to_string(),
            )
            .into());
        }
        if drafts.len() > self.config.max_variations {
            warn!(
                returned = drafts.len(),
                kept = self.config.max_variations,
                "truncating oversized variation batch"
            );
            drafts.truncate(self.config.max_variations);
        }

        let ids = self.board.install_variations(drafts);
        debug!(count = ids.len(), "installed variation batch");
        self.transition(PipelineStage::Variations);
        Ok(ApplyOutcome::Applied)
    }

    // ========================================================================
    // Two-phase generation: single-variation regeneration
    // ========================================================================

    /// Reserve a regeneration of one variation. The returned seed embeds
    /// the prior content as extra inspiration for the service.
    pub fn begin_regeneration(
        &mut self,
        id: VariationId,
    ) -> Result<(GenerationTicket, SeedIdea), ValidationError> {
        self.ensure_idle()?;
        if self.stage != PipelineStage::Variations {
            return Err(ValidationError::WrongStage {
                action: "regenerate a variation",
                stage: self.stage,
            });
        }
        let Some(prior) = self.board.variation(id) else {
            return Err(ValidationError::UnknownVariation(id));
        };

        let seed = regeneration_seed(&self.seed, prior);
        self.pending = Some(Pending::Regenerate(id));
        Ok((self.ticket(), seed))
    }

    /// Replace the targeted variation's content with the first draft of the
    /// batch. Id, selection, and liked aspects survive; a live edit does
    /// not.
    pub fn apply_regeneration(
        &mut self,
        ticket: GenerationTicket,
        drafts: Vec<VariationDraft>,
    ) -> Result<ApplyOutcome, PipelineError> {
        if self.is_stale(&ticket) {
            return Ok(ApplyOutcome::DiscardedStale);
        }
        let target = match self.pending {
            Some(Pending::Regenerate(id)) => id,
            _ => {
                warn!("regeneration result resolved against a different request; dropping");
                return Ok(ApplyOutcome::DiscardedStale);
            }
        };
        self.pending = None;

        let Some(draft) = drafts.into_iter().next() else {
            return Err(GenerationError::Malformed(
                "service returned no variations".to_string(),
            )
            .into());
        };

        if !self.board.replace_variation(target, draft) {
            // The batch cannot change while a request is pending, so the
            // target is still present unless the caller bypassed the board.
            warn!(variation = %target, "regeneration target vanished; dropping result");
            return Ok(ApplyOutcome::DiscardedStale);
        }
        debug!(variation = %target, "regenerated variation in place");
        Ok(ApplyOutcome::Applied)
    }

    // ========================================================================
    // Two-phase generation: combination
    // ========================================================================

    /// Reserve a combination call. Valid from `Variations` (first
    /// combination) and from `Combined` (regenerate the whole batch); both
    /// require at least two selected variations. Returns the base title and
    /// the selected variations to send to the service.
    pub fn begin_combination(
        &mut self,
    ) -> Result<(GenerationTicket, String, Vec<Variation>), ValidationError> {
        self.ensure_idle()?;
        if self.stage == PipelineStage::Initial {
            return Err(ValidationError::WrongStage {
                action: "combine variations",
                stage: self.stage,
            });
        }

        let selected: Vec<_> = self
            .board
            .selected_variations()
            .into_iter()
            .cloned()
            .collect();
        if selected.len() < 2 {
            return Err(ValidationError::NeedTwoSelections);
        }

        let source_elements = selected.iter().map(|v| v.differentiator.clone()).collect();
        self.pending = Some(Pending::Combine { source_elements });
        Ok((self.ticket(), self.seed.title.clone(), selected))
    }

    /// Install a concept batch wholesale, advancing to `Combined` when the
    /// call originated there from `Variations`.
    pub fn apply_combination(
        &mut self,
        ticket: GenerationTicket,
        drafts: Vec<ConceptDraft>,
    ) -> Result<ApplyOutcome, PipelineError> {
        if self.is_stale(&ticket) {
            return Ok(ApplyOutcome::DiscardedStale);
        }
        let source_elements = match self.pending.take() {
            Some(Pending::Combine { source_elements }) => source_elements,
            other => {
                self.pending = other;
                warn!("combination result resolved against a different request; dropping");
                return Ok(ApplyOutcome::DiscardedStale);
            }
        };

        if drafts.is_empty() {
            return Err(GenerationError::Malformed(
                "service returned no combined concepts".to_string(),
            )
            .into());
        }

        let count = drafts.len();
        self.board.install_concepts(drafts, source_elements);
        debug!(count, "installed combined-concept batch");
        if self.stage == PipelineStage::Variations {
            self.transition(PipelineStage::Combined);
        }
        Ok(ApplyOutcome::Applied)
    }

    /// Release the generation slot after a failed service call. Stale
    /// tickets are ignored; a newer request keeps its slot.
    pub fn abort_generation(&mut self, ticket: GenerationTicket) {
        if !self.is_stale(&ticket) {
            self.pending = None;
        }
    }

    // ========================================================================
    // Async convenience wrappers
    // ========================================================================

    /// Generate the first variation batch from the seed.
    pub async fn generate_variations(
        &mut self,
        generator: &dyn IdeaGenerator,
    ) -> Result<(), PipelineError> {
        let (ticket, seed) = self.begin_variations()?;
        match with_deadline(self.config.generation_timeout, generator.variations(&seed)).await {
            Ok(drafts) => {
                self.apply_variations(ticket, drafts)?;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "variation generation failed");
                self.abort_generation(ticket);
                Err(err.into())
            }
        }
    }

    /// Regenerate one variation in place.
    pub async fn regenerate_variation(
        &mut self,
        generator: &dyn IdeaGenerator,
        id: VariationId,
    ) -> Result<(), PipelineError> {
        let (ticket, seed) = self.begin_regeneration(id)?;
        match with_deadline(self.config.generation_timeout, generator.variations(&seed)).await {
            Ok(drafts) => {
                self.apply_regeneration(ticket, drafts)?;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, variation = %id, "variation regeneration failed");
                self.abort_generation(ticket);
                Err(err.into())
            }
        }
    }

    /// Combine the selected variations into concepts.
    pub async fn combine(&mut self, generator: &dyn IdeaGenerator) -> Result<(), PipelineError> {
        let (ticket, base_title, selected) = self.begin_combination()?;
        let call = generator.combinations(&base_title, &selected);
        match with_deadline(self.config.generation_timeout, call).await {
            Ok(drafts) => {
                self.apply_combination(ticket, drafts)?;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "combination failed");
                self.abort_generation(ticket);
                Err(err.into())
            }
        }
    }

    /// Re-run the combination with the same selected variations, replacing
    /// the whole concept batch. Only meaningful from `Combined`.
    pub async fn regenerate_concepts(
        &mut self,
        generator: &dyn IdeaGenerator,
    ) -> Result<(), PipelineError> {
        if self.stage != PipelineStage::Combined {
            return Err(ValidationError::WrongStage {
                action: "regenerate concepts",
                stage: self.stage,
            }
            .into());
        }
        self.combine(generator).await
    }

    /// The "continue" action from `Variations`: with one selection the run
    /// finalizes directly (skipping `Combined`); with two or more the
    /// selected variations are combined.
    pub async fn advance(
        &mut self,
        generator: &dyn IdeaGenerator,
    ) -> Result<Advance, PipelineError> {
        if self.stage != PipelineStage::Variations {
            return Err(ValidationError::WrongStage {
                action: "continue",
                stage: self.stage,
            }
            .into());
        }
        match self.board.selected_variation_count() {
            0 => Err(ValidationError::NoFinalSelection.into()),
            1 => Ok(Advance::ReadyToFinalize),
            _ => {
                self.combine(generator).await?;
                Ok(Advance::Combined)
            }
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Step back one stage, discarding the later stage's data and leaving
    /// the earlier stage's intact. Any in-flight request is orphaned: its
    /// result will be discarded when it resolves.
    pub fn back(&mut self) -> Result<PipelineStage, ValidationError> {
        let Some(previous) = self.stage.previous() else {
            return Err(ValidationError::WrongStage {
                action: "go back",
                stage: self.stage,
            });
        };

        match self.stage {
            PipelineStage::Combined => self.board.clear_concepts(),
            PipelineStage::Variations => self.board.clear_variations(),
            PipelineStage::Initial => unreachable!("Initial has no previous stage"),
        }
        self.invalidate_inflight();
        self.transition(previous);
        Ok(previous)
    }

    /// Throw the whole run away and start a new idea. Not a stage
    /// transition: stage, seed, board, and history all reset.
    pub fn reset(&mut self) {
        debug!("pipeline reset");
        self.seed = SeedIdea::default();
        self.board = DraftBoard::default();
        self.stage = PipelineStage::Initial;
        self.history.clear();
        self.invalidate_inflight();
    }

    // ========================================================================
    // Finalization
    // ========================================================================

    /// Assemble the record the current selection would commit, without
    /// committing it.
    pub fn build_record(&self) -> Result<FinalizedIdeaRecord, ValidationError> {
        match self.stage {
            PipelineStage::Initial => Err(ValidationError::WrongStage {
                action: "commit",
                stage: self.stage,
            }),
            PipelineStage::Variations => {
                let selected = self.board.selected_variations();
                match selected.as_slice() {
                    [] => Err(ValidationError::NoFinalSelection),
                    [only] => Ok(FinalizedIdeaRecord::from_variation(&self.seed.title, only)),
                    _ => Err(ValidationError::CombineRequired),
                }
            }
            PipelineStage::Combined => {
                let Some(concept) = self.board.selected_concept() else {
                    return Err(ValidationError::NoFinalSelection);
                };
                let contributing = self.board.selected_variations();
                Ok(FinalizedIdeaRecord::from_concept(
                    &self.seed.title,
                    concept,
                    &contributing,
                ))
            }
        }
    }

    /// Commit the finalized selection through the gateway. Draft state is
    /// untouched either way: on success the caller decides when to
    /// `reset`, on failure the user retries without losing work.
    pub fn commit(&self, store: &mut dyn IdeaStore) -> Result<IdeaId, PipelineError> {
        let record = self.build_record()?;
        let id = store.commit(record)?;
        info!(idea_id = %id, stage = %self.stage, "idea committed");
        Ok(id)
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            stage: self.stage,
            seed: self.seed.clone(),
            board: self.board.clone(),
            history: self.history.clone(),
        }
    }

    pub fn restore(snapshot: PipelineSnapshot, config: PipelineConfig) -> Self {
        Self {
            config,
            stage: snapshot.stage,
            seed: snapshot.seed,
            board: snapshot.board,
            history: snapshot.history,
            epoch: 0,
            pending: None,
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ticket(&self) -> GenerationTicket {
        GenerationTicket { epoch: self.epoch }
    }

    fn is_stale(&self, ticket: &GenerationTicket) -> bool {
        if ticket.epoch != self.epoch {
            debug!(
                ticket_epoch = ticket.epoch,
                current_epoch = self.epoch,
                "discarding generation result from an abandoned context"
            );
            return true;
        }
        false
    }

    fn ensure_idle(&self) -> Result<(), ValidationError> {
        if self.pending.is_some() {
            return Err(ValidationError::GenerationInFlight);
        }
        Ok(())
    }

    fn invalidate_inflight(&mut self) {
        self.epoch += 1;
        self.pending = None;
    }

    fn transition(&mut self, to: PipelineStage) {
        debug_assert!(self.stage.can_transition_to(to));
        debug!(from = %self.stage, to = %to, "stage transition");
        self.history.push(StageTransition::new(self.stage, to));
        self.stage = to;
    }
}

async fn with_deadline<T>(
    limit: Option<Duration>,
    call: impl Future<Output = Result<T, GenerationError>>,
) -> Result<T, GenerationError> {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(limit)),
        },
        None => call.await,
    }
}

// ============================================================================
// Tests
// ============================================================================
