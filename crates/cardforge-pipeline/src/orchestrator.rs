//! Run orchestration
//!
//! Owns the whole-set state: accumulated cards, the collector number
//! counter, the art manifest and the miss tally. Batches run strictly
//! in order and each one is checkpointed before the next starts. After
//! every batch the collector counter is recomputed from the highest
//! numeric collector number seen so far, so basic lands continue the
//! sequence even if a batch numbered cards unexpectedly.

use crate::art::ArtCommissioner;
use crate::backend::{CompletionBackend, ImageJobBackend};
use crate::batch::BatchStageRunner;
use crate::checkpoint::CheckpointWriter;
use crate::config::{ForgeConfig, RunConfig};
use crate::convert::convert_cards;
use crate::inspiration::load_inspiration_cards;
use crate::lands::LandGenerator;
use crate::manifest::ArtManifest;
use crate::render::RenderBackend;
use crate::stats::Statistics;
use crate::synth::CardSynthesizer;
use crate::theme::resolve_theme;
use cardforge_core::{Card, Result};
use std::path::PathBuf;

/// What a completed run produced
pub struct RunSummary {
    pub theme: String,
    pub cards: Vec<Card>,
    pub statistics: Statistics,
    pub art_misses: u32,
    pub final_checkpoint: PathBuf,
}

/// The collector number the next card should receive, given everything
/// processed so far. Non-numeric collector numbers count as 0.
pub fn next_collector_number(cards: &[Card]) -> u32 {
    cards
        .iter()
        .map(Card::numeric_collector_number)
        .max()
        .unwrap_or(0)
        + 1
}

pub struct Orchestrator<'a> {
    run: &'a RunConfig,
    forge: &'a ForgeConfig,
    completion: &'a dyn CompletionBackend,
    image: &'a dyn ImageJobBackend,
    renderer: &'a dyn RenderBackend,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        run: &'a RunConfig,
        forge: &'a ForgeConfig,
        completion: &'a dyn CompletionBackend,
        image: &'a dyn ImageJobBackend,
        renderer: &'a dyn RenderBackend,
    ) -> Self {
        Self {
            run,
            forge,
            completion,
            image,
            renderer,
        }
    }

    /// Run the full generation pipeline: every batch, then basic lands,
    /// then finalization.
    pub fn run(&self) -> Result<RunSummary> {
        println!("\n=== Starting Set Generation ===");
        std::fs::create_dir_all(&self.run.output_dir)?;

        println!("\n--- Initializing Set ---");
        let inspiration = load_inspiration_cards(
            &self.run.csv_file_path,
            self.run.inspiration_cards_count,
        )?;
        let theme = resolve_theme(self.completion, self.run, self.forge)?;

        let synthesizer =
            CardSynthesizer::new(self.completion, self.run, self.forge, &theme, inspiration);
        let commissioner =
            ArtCommissioner::new(self.completion, self.image, self.run, self.forge, &theme);
        let runner = BatchStageRunner::new(&synthesizer, &commissioner, self.renderer, self.run);
        let checkpoints = CheckpointWriter::new(self.run, self.forge);
        let mut manifest = ArtManifest::new(&self.run.set_id);

        let mut all_cards: Vec<Card> = Vec::new();
        let mut collector_counter = 1u32;
        let mut art_misses = 0u32;

        for batch_num in 1..=self.run.batches_count {
            println!(
                "\n=== Processing Batch {}/{} ===",
                batch_num, self.run.batches_count
            );

            let existing_names: Vec<String> =
                all_cards.iter().map(|c| c.name.clone()).collect();
            let outcome = runner.run_batch(
                batch_num,
                &existing_names,
                &mut collector_counter,
                &mut manifest,
            )?;

            art_misses += outcome.art_misses;
            all_cards.extend(outcome.cards);

            println!("\n--- Saving Progress for Batch {} ---", batch_num);
            checkpoints.write_batch(&theme, &all_cards, batch_num)?;

            println!("\n--- Statistics after Batch {} ---", batch_num);
            Statistics::summarize(&all_cards).print_summary();

            collector_counter = next_collector_number(&all_cards);

            // The batch is checkpointed; a render failure still ends the run
            if let Some(e) = outcome.render_error {
                self.save_manifest(&manifest)?;
                return Err(e);
            }
        }

        if self.run.generate_basic_lands {
            println!("\n=== Generating Basic Lands ===");
            let mut land_generator = LandGenerator::new(
                self.completion,
                self.image,
                self.run,
                self.forge,
                &theme,
                collector_counter,
            );
            let lands = land_generator.generate_basic_lands(&mut manifest)?;

            println!("\n--- Converting Lands to Rendering Format ---");
            let land_paths = convert_cards(self.run, &lands)?;

            println!("\n--- Rendering Land Cards ---");
            if let Err(e) = self.renderer.render(&land_paths) {
                eprintln!("Rendering lands failed: {}", e);
            }

            all_cards.extend(lands);
        }

        println!("\n=== Finalizing Set ===");
        let statistics = Statistics::summarize(&all_cards);
        let final_checkpoint = checkpoints.write_final(&theme, &all_cards)?;
        self.save_manifest(&manifest)?;

        println!("\n=== Set Generation Complete ===");
        println!("Total cards: {}", all_cards.len());
        if art_misses > 0 {
            println!(
                "{} of {} cards are missing art",
                art_misses,
                all_cards.len()
            );
        }

        Ok(RunSummary {
            theme,
            cards: all_cards,
            statistics,
            art_misses,
            final_checkpoint,
        })
    }

    fn save_manifest(&self, manifest: &ArtManifest) -> Result<()> {
        manifest.save(&self.run.output_path("art_manifest.toml"))
    }
}
