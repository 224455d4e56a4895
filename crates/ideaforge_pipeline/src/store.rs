//! Persistence gateway contract.
//!
//! The real store lives outside this core (it enforces ownership and
//! uniqueness itself). The contract is one atomic logical write: either the
//! full record exists afterwards or nothing does. `MemoryIdeaStore` is the
//! in-crate reference implementation used by the demo and tests.

use thiserror::Error;
use tracing::debug;

use ideaforge_ids::IdeaId;

use crate::types::FinalizedIdeaRecord;

/// The gateway rejected or could not perform the write. The pipeline's
/// draft state is retained so the user can retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("the idea store rejected the record: {0}")]
    Rejected(String),

    #[error("the idea store is unavailable: {0}")]
    Unavailable(String),
}

/// Gateway for committing a finalized idea.
pub trait IdeaStore {
    /// Persist the record as a single logical write.
    fn commit(&mut self, record: FinalizedIdeaRecord) -> Result<IdeaId, PersistError>;
}

// ============================================================================
// In-memory reference implementation
// ============================================================================

/// Vec-backed idea store. Rejects records missing required fields the way
/// the upstream relational store would.
#[derive(Debug, Default)]
pub struct MemoryIdeaStore {
    ideas: Vec<(IdeaId, FinalizedIdeaRecord)>,
}

impl MemoryIdeaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: IdeaId) -> Option<&FinalizedIdeaRecord> {
        self.ideas
            .iter()
            .find(|(stored, _)| *stored == id)
            .map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }
}

impl IdeaStore for MemoryIdeaStore {
    fn commit(&mut self, record: FinalizedIdeaRecord) -> Result<IdeaId, PersistError> {
        if record.title.trim().is_empty() {
            return Err(PersistError::Rejected("title is required".to_string()));
        }
        if record.description.trim().is_empty() {
            return Err(PersistError::Rejected(
                "description is required".to_string(),
            ));
        }

        let id = IdeaId::new();
        debug!(idea_id = %id, title = %record.title, "stored idea record");
        self.ideas.push((id, record));
        Ok(id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Variation, VariationDraft};
    use ideaforge_ids::VariationId;

    fn record(title: &str, description: &str) -> FinalizedIdeaRecord {
        let variation = Variation::from_draft(
            VariationId::new(),
            VariationDraft {
                title: title.to_string(),
                description: description.to_string(),
                differentiator: "edge".to_string(),
                target_market: "founders".to_string(),
                revenue_model: "subscription".to_string(),
            },
        );
        FinalizedIdeaRecord::from_variation("seed", &variation)
    }

    #[test]
    fn commit_assigns_id_and_keeps_record() {
        let mut store = MemoryIdeaStore::new();
        let id = store.commit(record("Pony tutus", "tulle for all")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).unwrap().title, "Pony tutus");
    }

    #[test]
    fn commit_rejects_incomplete_record_without_writing() {
        let mut store = MemoryIdeaStore::new();
        let err = store.commit(record("", "desc")).unwrap_err();

        assert!(matches!(err, PersistError::Rejected(_)));
        assert!(store.is_empty());
    }
}
