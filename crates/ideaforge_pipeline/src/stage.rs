//! Pipeline stage state machine.
//!
//! Canonical definitions for `PipelineStage` and the transitions the stage
//! controller is allowed to make. Committing an idea is a terminal action,
//! not a stage: the pipeline stays at `Variations` or `Combined` until the
//! caller resets it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Pipeline Stage
// ============================================================================

/// The pipeline's current phase. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    /// Seed entry: the user is describing the raw idea.
    Initial,
    /// A variation batch exists; the user selects, edits, regenerates.
    Variations,
    /// A combined-concept batch exists; the user picks exactly one.
    Combined,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 3] = [
        PipelineStage::Initial,
        PipelineStage::Variations,
        PipelineStage::Combined,
    ];

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Initial => "INITIAL",
            PipelineStage::Variations => "VARIATIONS",
            PipelineStage::Combined => "COMBINED",
        }
    }

    /// Get valid transitions from this stage.
    ///
    /// Forward moves happen when a generation batch is applied; backward
    /// moves discard the later stage's data. Same-stage actions
    /// (regeneration, finalize shortcut) are not transitions.
    pub fn valid_transitions(&self) -> &'static [PipelineStage] {
        match self {
            PipelineStage::Initial => &[PipelineStage::Variations],
            PipelineStage::Variations => &[PipelineStage::Combined, PipelineStage::Initial],
            PipelineStage::Combined => &[PipelineStage::Variations],
        }
    }

    /// Check if a transition to the target stage is valid.
    pub fn can_transition_to(&self, target: PipelineStage) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// The stage back-navigation lands on, if any.
    pub fn previous(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Initial => None,
            PipelineStage::Variations => Some(PipelineStage::Initial),
            PipelineStage::Combined => Some(PipelineStage::Variations),
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when parsing a PipelineStage from string.
#[derive(Debug, Error, Clone)]
#[error("invalid stage: {0}")]
pub struct StageParseError(String);

impl std::str::FromStr for PipelineStage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIAL" => Ok(PipelineStage::Initial),
            "VARIATIONS" => Ok(PipelineStage::Variations),
            "COMBINED" => Ok(PipelineStage::Combined),
            _ => Err(StageParseError(s.to_string())),
        }
    }
}

// ============================================================================
// Stage Transition
// ============================================================================

/// One accepted stage change, kept in the pipeline's history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: PipelineStage,
    pub to: PipelineStage,
    pub at: DateTime<Utc>,
}

impl StageTransition {
    pub fn new(from: PipelineStage, to: PipelineStage) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_roundtrip() {
        for stage in PipelineStage::ALL {
            let parsed: PipelineStage = stage.as_str().parse().unwrap();
            assert_eq!(stage, parsed);
        }
        assert!("BOGUS".parse::<PipelineStage>().is_err());
    }

    #[test]
    fn stage_serde_roundtrip() {
        let encoded = serde_json::to_string(&PipelineStage::Variations).unwrap();
        assert_eq!(encoded, "\"VARIATIONS\"");
        let decoded: PipelineStage = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, PipelineStage::Variations);
    }

    #[test]
    fn forward_transitions() {
        assert!(PipelineStage::Initial.can_transition_to(PipelineStage::Variations));
        assert!(PipelineStage::Variations.can_transition_to(PipelineStage::Combined));
        assert!(!PipelineStage::Initial.can_transition_to(PipelineStage::Combined));
        assert!(!PipelineStage::Combined.can_transition_to(PipelineStage::Initial));
    }

    #[test]
    fn back_navigation_mirrors_previous() {
        assert_eq!(PipelineStage::Initial.previous(), None);
        assert_eq!(
            PipelineStage::Variations.previous(),
            Some(PipelineStage::Initial)
        );
        assert_eq!(
            PipelineStage::Combined.previous(),
            Some(PipelineStage::Variations)
        );
        for stage in PipelineStage::ALL {
            if let Some(prev) = stage.previous() {
                assert!(stage.can_transition_to(prev));
            }
        }
    }
}
