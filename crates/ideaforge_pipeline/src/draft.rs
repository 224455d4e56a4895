//! Draft board: selection and edit sub-state for generated items.
//!
//! The board mutates variations and combined concepts independently of the
//! active stage. Variations are multi-select; concepts are mutually
//! exclusive. Edit buffers live beside the canonical fields and only land
//! on explicit save.

use serde::{Deserialize, Serialize};

use ideaforge_ids::{ConceptId, VariationId};

use crate::types::{
    CombinedConcept, ConceptDraft, EditBuffer, EditField, Variation, VariationDraft,
};

/// Addresses one item on the board: the collection and the id in one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftRef {
    Variation(VariationId),
    Concept(ConceptId),
}

impl From<VariationId> for DraftRef {
    fn from(id: VariationId) -> Self {
        DraftRef::Variation(id)
    }
}

impl From<ConceptId> for DraftRef {
    fn from(id: ConceptId) -> Self {
        DraftRef::Concept(id)
    }
}

// Edit operations are identical across both collections; this seam keeps
// them written once.
trait EditableItem {
    fn canonical(&self) -> (&str, &str);
    fn set_canonical(&mut self, title: String, description: String);
    fn edit_mut(&mut self) -> &mut Option<EditBuffer>;
}

impl EditableItem for Variation {
    fn canonical(&self) -> (&str, &str) {
        (&self.title, &self.description)
    }

    fn set_canonical(&mut self, title: String, description: String) {
        self.title = title;
        self.description = description;
    }

    fn edit_mut(&mut self) -> &mut Option<EditBuffer> {
        &mut self.edit
    }
}

impl EditableItem for CombinedConcept {
    fn canonical(&self) -> (&str, &str) {
        (&self.title, &self.description)
    }

    fn set_canonical(&mut self, title: String, description: String) {
        self.title = title;
        self.description = description;
    }

    fn edit_mut(&mut self) -> &mut Option<EditBuffer> {
        &mut self.edit
    }
}

// ============================================================================
// Draft Board
// ============================================================================

/// In-memory holder for the two generated collections.
///
/// Batch installation and replacement are crate-internal: only the stage
/// controller may change what exists; callers change selection and content
/// through the operations below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftBoard {
    variations: Vec<Variation>,
    concepts: Vec<CombinedConcept>,
}

impl DraftBoard {
    // ========================================================================
    // Selection
    // ========================================================================

    /// Flip an item's `selected` flag. Returns false if the item is gone.
    ///
    /// Concepts enforce mutual exclusivity in a single pass: turning one on
    /// turns every other off, so no caller ever observes two selected.
    pub fn toggle_select(&mut self, item: impl Into<DraftRef>) -> bool {
        match item.into() {
            DraftRef::Variation(id) => {
                let Some(variation) = self.variations.iter_mut().find(|v| v.id == id) else {
                    return false;
                };
                variation.selected = !variation.selected;
                true
            }
            DraftRef::Concept(id) => {
                let Some(pos) = self.concepts.iter().position(|c| c.id == id) else {
                    return false;
                };
                let turning_on = !self.concepts[pos].selected;
                for concept in &mut self.concepts {
                    concept.selected = false;
                }
                self.concepts[pos].selected = turning_on;
                true
            }
        }
    }

    /// Record what the user likes about a variation. No precondition on
    /// `selected`; the text only matters once the variation is.
    pub fn update_liked_aspects(&mut self, id: VariationId, text: impl Into<String>) -> bool {
        let Some(variation) = self.variations.iter_mut().find(|v| v.id == id) else {
            return false;
        };
        variation.liked_aspects = text.into();
        true
    }

    // ========================================================================
    // Edit lifecycle
    // ========================================================================

    /// Start editing: seed the buffer from the canonical fields. No-op if
    /// the item is already in edit mode.
    pub fn begin_edit(&mut self, item: impl Into<DraftRef>) -> bool {
        let Some(target) = self.editable_mut(item.into()) else {
            return false;
        };
        if target.edit_mut().is_some() {
            return true;
        }
        let (title, description) = target.canonical();
        let buffer = EditBuffer {
            title: title.to_string(),
            description: description.to_string(),
        };
        *target.edit_mut() = Some(buffer);
        true
    }

    /// Mutate the edit buffer only. Silent no-op when the item is missing
    /// or not in edit mode; the canonical fields are never touched here.
    pub fn update_edit_buffer(
        &mut self,
        item: impl Into<DraftRef>,
        field: EditField,
        value: impl Into<String>,
    ) {
        let Some(target) = self.editable_mut(item.into()) else {
            return;
        };
        let Some(buffer) = target.edit_mut().as_mut() else {
            return;
        };
        match field {
            EditField::Title => buffer.title = value.into(),
            EditField::Description => buffer.description = value.into(),
        }
    }

    /// Copy the buffer into the canonical fields and leave edit mode.
    pub fn commit_edit(&mut self, item: impl Into<DraftRef>) -> bool {
        let Some(target) = self.editable_mut(item.into()) else {
            return false;
        };
        let Some(buffer) = target.edit_mut().take() else {
            return false;
        };
        target.set_canonical(buffer.title, buffer.description);
        true
    }

    /// Throw the buffer away and leave edit mode; canonical fields stay.
    pub fn cancel_edit(&mut self, item: impl Into<DraftRef>) -> bool {
        let Some(target) = self.editable_mut(item.into()) else {
            return false;
        };
        target.edit_mut().take().is_some()
    }

    fn editable_mut(&mut self, item: DraftRef) -> Option<&mut dyn EditableItem> {
        match item {
            DraftRef::Variation(id) => self
                .variations
                .iter_mut()
                .find(|v| v.id == id)
                .map(|v| v as &mut dyn EditableItem),
            DraftRef::Concept(id) => self
                .concepts
                .iter_mut()
                .find(|c| c.id == id)
                .map(|c| c as &mut dyn EditableItem),
        }
    }

    // ========================================================================
    // Batch management (stage controller only)
    // ========================================================================

    /// Install a fresh variation batch, discarding whatever was there.
    pub(crate) fn install_variations(&mut self, drafts: Vec<VariationDraft>) -> Vec<VariationId> {
        self.variations = drafts
            .into_iter()
            .map(|draft| Variation::from_draft(VariationId::new(), draft))
            .collect();
        self.variations.iter().map(|v| v.id).collect()
    }

    /// Replace one variation's content in place, keeping id, selection, and
    /// liked aspects. Returns false if the id is unknown.
    pub(crate) fn replace_variation(&mut self, id: VariationId, draft: VariationDraft) -> bool {
        let Some(variation) = self.variations.iter_mut().find(|v| v.id == id) else {
            return false;
        };
        variation.replace_content(draft);
        true
    }

    /// Install a concept batch wholesale. `source_elements` is shared by
    /// every concept of the batch: the contributing differentiators.
    pub(crate) fn install_concepts(
        &mut self,
        drafts: Vec<ConceptDraft>,
        source_elements: Vec<String>,
    ) {
        self.concepts = drafts
            .into_iter()
            .map(|draft| {
                CombinedConcept::from_draft(ConceptId::new(), draft, source_elements.clone())
            })
            .collect();
    }

    pub(crate) fn clear_variations(&mut self) {
        self.variations.clear();
    }

    pub(crate) fn clear_concepts(&mut self) {
        self.concepts.clear();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    pub fn concepts(&self) -> &[CombinedConcept] {
        &self.concepts
    }

    pub fn variation(&self, id: VariationId) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == id)
    }

    pub fn concept(&self, id: ConceptId) -> Option<&CombinedConcept> {
        self.concepts.iter().find(|c| c.id == id)
    }

    pub fn selected_variations(&self) -> Vec<&Variation> {
        self.variations.iter().filter(|v| v.selected).collect()
    }

    pub fn selected_variation_count(&self) -> usize {
        self.variations.iter().filter(|v| v.selected).count()
    }

    pub fn selected_concept(&self) -> Option<&CombinedConcept> {
        self.concepts.iter().find(|c| c.selected)
    }
}

// ============================================================================
// Tests
// ============================================================================
