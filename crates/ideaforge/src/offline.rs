//! Deterministic generation backend for offline use.
//!
//! Stands in for the remote idea service in the demo and in tests: the same
//! seed always produces the same drafts, so runs are reproducible. Angle
//! templates rotate with the inspiration text, which also gives single-item
//! regeneration (its seed embeds the prior content as inspiration) a fresh
//! result.

use async_trait::async_trait;
use ideaforge_pipeline::{
    ConceptDraft, GenerationError, IdeaGenerator, SeedIdea, Variation, VariationDraft,
};

struct AngleTemplate {
    label: &'static str,
    pitch: &'static str,
    edge: &'static str,
    market: &'static str,
    revenue: &'static str,
}

const ANGLES: &[AngleTemplate] = &[
    AngleTemplate {
        label: "Premium",
        pitch: "a high-touch, high-margin take aimed at customers who pay for craft",
        edge: "hand-finished quality over mass production",
        market: "affluent early adopters",
        revenue: "direct sales at premium pricing",
    },
    AngleTemplate {
        label: "Subscription",
        pitch: "a recurring-delivery take that turns one-off buyers into members",
        edge: "convenience of never re-ordering",
        market: "busy repeat customers",
        revenue: "monthly subscription tiers",
    },
    AngleTemplate {
        label: "Community",
        pitch: "a marketplace take where enthusiasts supply each other",
        edge: "network effects between buyers and makers",
        market: "hobbyist communities",
        revenue: "commission on marketplace transactions",
    },
    AngleTemplate {
        label: "B2B",
        pitch: "a wholesale take selling through businesses that already own the audience",
        edge: "distribution through established partners",
        market: "specialty retailers",
        revenue: "wholesale contracts",
    },
];

/// Offline, reproducible [`IdeaGenerator`].
#[derive(Debug, Default)]
pub struct OfflineGenerator;

impl OfflineGenerator {
    pub fn new() -> Self {
        Self
    }

    // Rotate the angle window with the inspiration so regeneration seeds
    // (which append prior content to the inspiration) land elsewhere.
    fn rotation(seed: &SeedIdea) -> usize {
        seed.inspiration.len() % ANGLES.len()
    }
}

#[async_trait]
impl IdeaGenerator for OfflineGenerator {
    async fn variations(&self, seed: &SeedIdea) -> Result<Vec<VariationDraft>, GenerationError> {
        let rotation = Self::rotation(seed);
        Ok((0..3)
            .map(|i| {
                let angle = &ANGLES[(rotation + i) % ANGLES.len()];
                VariationDraft {
                    title: format!("{} ({})", seed.title, angle.label),
                    description: format!("{}: {}", seed.title, angle.pitch),
                    differentiator: angle.edge.to_string(),
                    target_market: angle.market.to_string(),
                    revenue_model: angle.revenue.to_string(),
                }
            })
            .collect())
    }

    async fn combinations(
        &self,
        base_title: &str,
        selected: &[Variation],
    ) -> Result<Vec<ConceptDraft>, GenerationError> {
        if selected.len() < 2 {
            return Err(GenerationError::service(
                "need at least two variations to combine",
            ));
        }

        let labels: Vec<_> = selected.iter().map(|v| v.title.as_str()).collect();
        let edges: Vec<_> = selected
            .iter()
            .map(|v| v.differentiator.as_str())
            .collect();

        Ok(vec![
            ConceptDraft {
                title: format!("{base_title}, unified"),
                description: format!(
                    "One offer that folds together {}.",
                    labels.join(" and ")
                ),
                target_market: selected[0].target_market.clone(),
                revenue_model: selected[0].revenue_model.clone(),
                value_proposition: format!("combines {}", edges.join(" with ")),
            },
            ConceptDraft {
                title: format!("{base_title} platform"),
                description: format!(
                    "A platform where {} operate as tiers of the same product.",
                    labels.join(" and ")
                ),
                target_market: "all segments of the original angles".to_string(),
                revenue_model: "tiered pricing".to_string(),
                value_proposition: format!("one roof over {}", edges.join(", ")),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_seed_same_drafts() {
        let generator = OfflineGenerator::new();
        let seed = SeedIdea::new("Tutus for ponies");

        let first = generator.variations(&seed).await.unwrap();
        let second = generator.variations(&seed).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn longer_inspiration_rotates_the_angles() {
        let generator = OfflineGenerator::new();
        let plain = SeedIdea::new("Tutus for ponies");
        let mut annotated = plain.clone();
        annotated.inspiration = "x".to_string();

        let a = generator.variations(&plain).await.unwrap();
        let b = generator.variations(&annotated).await.unwrap();
        assert_ne!(a[0].title, b[0].title);
    }

    #[tokio::test]
    async fn combinations_mention_every_contributor() {
        let generator = OfflineGenerator::new();
        let seed = SeedIdea::new("Tutus for ponies");
        let drafts = generator.variations(&seed).await.unwrap();

        let selected: Vec<Variation> = drafts
            .into_iter()
            .map(|d| Variation {
                id: ideaforge_pipeline::VariationId::new(),
                title: d.title,
                description: d.description,
                differentiator: d.differentiator,
                target_market: d.target_market,
                revenue_model: d.revenue_model,
                selected: true,
                liked_aspects: String::new(),
                edit: None,
            })
            .collect();

        let concepts = generator
            .combinations("Tutus for ponies", &selected[..2])
            .await
            .unwrap();
        assert_eq!(concepts.len(), 2);
        assert!(concepts[0].description.contains("(Premium)"));
        assert!(concepts[0].description.contains("(Subscription)"));
    }
}
