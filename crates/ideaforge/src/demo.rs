//! Scripted end-to-end refinement session.
//!
//! Plays the role of the UI: seeds the pipeline, generates variations,
//! applies the requested selections, continues (combining when more than
//! one is picked), and commits to the in-memory store.

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use ideaforge_pipeline::{
    Advance, IdeaPipeline, MemoryIdeaStore, PipelineConfig, VariationId,
};

use crate::offline::OfflineGenerator;
use crate::output;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Seed idea title
    #[arg(long, default_value = "Tailored capes for therapy ponies")]
    seed: String,

    /// Where the idea came from
    #[arg(long, default_value = "")]
    inspiration: String,

    /// Free-text classification: product, service, technology
    #[arg(long, default_value = "product")]
    concept_type: String,

    /// 1-based variation numbers to select
    #[arg(long, value_delimiter = ',', default_value = "1,2")]
    pick: Vec<usize>,

    /// What you like about each pick, in pick order
    #[arg(long, value_delimiter = ',')]
    like: Vec<String>,
}

pub async fn run(args: DemoArgs) -> Result<()> {
    if args.pick.is_empty() {
        bail!("pick at least one variation");
    }

    let generator = OfflineGenerator::new();
    let mut store = MemoryIdeaStore::new();
    let mut pipeline = IdeaPipeline::new(PipelineConfig::from_env());

    {
        let seed = pipeline.seed_mut()?;
        seed.title = args.seed.clone();
        seed.inspiration = args.inspiration.clone();
        seed.concept_type = args.concept_type.clone();
    }

    pipeline
        .generate_variations(&generator)
        .await
        .context("variation generation failed")?;

    let ids: Vec<VariationId> = pipeline.board().variations().iter().map(|v| v.id).collect();
    for (slot, pick) in args.pick.iter().enumerate() {
        let id = *ids
            .get(pick.checked_sub(1).context("picks are 1-based")?)
            .with_context(|| format!("no variation #{pick}; {} available", ids.len()))?;
        pipeline.board_mut().toggle_select(id);
        if let Some(liked) = args.like.get(slot) {
            pipeline.board_mut().update_liked_aspects(id, liked.clone());
        }
    }

    println!("Variations for \"{}\":", args.seed);
    println!("{}", output::variation_table(pipeline.board().variations()));

    match pipeline
        .advance(&generator)
        .await
        .context("could not continue past variations")?
    {
        Advance::ReadyToFinalize => {
            info!("single selection; finalizing directly from the variations stage");
        }
        Advance::Combined => {
            println!("Combined concepts:");
            println!("{}", output::concept_table(pipeline.board().concepts()));

            // The demo keeps the first synthesis.
            let chosen = pipeline.board().concepts()[0].id;
            pipeline.board_mut().toggle_select(chosen);
        }
    }

    let idea_id = pipeline
        .commit(&mut store)
        .context("could not save the refined idea")?;
    let record = store
        .get(idea_id)
        .context("the committed idea is in the store")?;

    println!("Saved idea {idea_id}:");
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
