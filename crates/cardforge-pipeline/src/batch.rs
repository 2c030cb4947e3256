//! Per-batch stage execution
//!
//! A batch runs four stages in a fixed order: synthesize card bodies,
//! commission art, convert to render format, render. Synthesis and
//! conversion failures are fatal for the run. Art misses are soft and
//! tallied per card. A render failure is captured in the outcome rather
//! than returned, so the caller can still checkpoint the batch before
//! propagating it.

use crate::art::ArtCommissioner;
use crate::config::RunConfig;
use crate::convert::convert_cards;
use crate::manifest::ArtManifest;
use crate::render::RenderBackend;
use crate::synth::CardSynthesizer;
use cardforge_core::{Card, ForgeError, Result};

/// What one batch produced
#[derive(Debug)]
pub struct BatchOutcome {
    pub cards: Vec<Card>,
    pub art_misses: u32,
    /// Set when rendering failed; the batch's cards and side files are
    /// still valid
    pub render_error: Option<ForgeError>,
}

/// Assign consecutive collector numbers, advancing the counter.
pub fn assign_collector_numbers(cards: &mut [Card], next: &mut u32) {
    for card in cards {
        card.collector_number = Some(next.to_string());
        *next += 1;
    }
}

pub struct BatchStageRunner<'a> {
    synthesizer: &'a CardSynthesizer<'a>,
    commissioner: &'a ArtCommissioner<'a>,
    renderer: &'a dyn RenderBackend,
    run: &'a RunConfig,
}

impl<'a> BatchStageRunner<'a> {
    pub fn new(
        synthesizer: &'a CardSynthesizer<'a>,
        commissioner: &'a ArtCommissioner<'a>,
        renderer: &'a dyn RenderBackend,
        run: &'a RunConfig,
    ) -> Self {
        Self {
            synthesizer,
            commissioner,
            renderer,
            run,
        }
    }

    /// Run all four stages for one batch.
    pub fn run_batch(
        &self,
        batch_num: u32,
        existing_names: &[String],
        collector_counter: &mut u32,
        manifest: &mut ArtManifest,
    ) -> Result<BatchOutcome> {
        println!("\n--- Generating Cards for Batch {} ---", batch_num);
        let mut cards = self
            .synthesizer
            .synthesize_batch(existing_names)
            .map_err(|e| ForgeError::fatal("synthesis", e.to_string()))?;
        assign_collector_numbers(&mut cards, collector_counter);
        println!("Generated {} cards", cards.len());

        println!("\n--- Generating Art for Batch {} ---", batch_num);
        let art_misses = self
            .commissioner
            .process_cards(&mut cards, manifest)
            .map_err(|e| ForgeError::fatal("art", e.to_string()))?;

        println!("\n--- Converting Batch {} to Rendering Format ---", batch_num);
        let render_paths = convert_cards(self.run, &cards)
            .map_err(|e| ForgeError::fatal("conversion", e.to_string()))?;

        println!("\n--- Rendering Cards for Batch {} ---", batch_num);
        let render_error = match self.renderer.render(&render_paths) {
            Ok(()) => None,
            Err(e) => {
                eprintln!("Rendering batch {} failed: {}", batch_num, e);
                Some(e)
            }
        };

        Ok(BatchOutcome {
            cards,
            art_misses,
            render_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::{
        test_png_bytes, MockCompletion, MockImageBackend, MockRenderBackend,
    };
    use crate::config::ForgeConfig;

    const SYNTH_REPLY: &str = r#"[
  {"name": "Tide Caller", "mana_cost": "2U", "type": "Creature — Merfolk",
   "rarity": "Rare", "text": "", "flavor": "", "colors": ["U"],
   "power": "2", "toughness": "3", "description": "a merfolk"},
  {"name": "Sunken Monument", "mana_cost": "", "type": "Land",
   "rarity": "Common", "text": "", "flavor": "", "colors": [],
   "description": "an obelisk"}
]"#;

    fn test_setup() -> (RunConfig, ForgeConfig) {
        let mut run = RunConfig::default();
        run.max_art_attempts = 1;
        run.art_retry_delay_secs = 0;
        run.set_id = "testset".to_string();
        run.output_dir =
            std::env::temp_dir().join(format!("cardforge_batch_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&run.output_dir).unwrap();

        let mut forge = ForgeConfig::default();
        forge.generation.poll_interval_secs = 0;
        forge.generation.job_timeout_secs = 5;
        (run, forge)
    }

    #[test]
    fn test_stages_run_in_order_and_number_cards() {
        let (run, forge) = test_setup();
        let completion = MockCompletion::with_replies(vec![SYNTH_REPLY.to_string()]);
        let image = MockImageBackend::instant(test_png_bytes(125, 100));
        let renderer = MockRenderBackend::new();

        let synthesizer = CardSynthesizer::new(&completion, &run, &forge, "theme", Vec::new());
        let commissioner = ArtCommissioner::new(&completion, &image, &run, &forge, "theme");
        let runner = BatchStageRunner::new(&synthesizer, &commissioner, &renderer, &run);

        let mut counter = 5;
        let mut manifest = ArtManifest::new(&run.set_id);
        let outcome = runner
            .run_batch(1, &[], &mut counter, &mut manifest)
            .unwrap();

        assert_eq!(outcome.cards.len(), 2);
        assert_eq!(outcome.cards[0].collector_number.as_deref(), Some("5"));
        assert_eq!(outcome.cards[1].collector_number.as_deref(), Some("6"));
        assert_eq!(counter, 7);
        assert!(outcome.render_error.is_none());

        // Side files were written and handed to the renderer in order
        let batches = renderer.rendered_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert!(batches[0][0].ends_with("Tide_Caller.json"));

        std::fs::remove_dir_all(&run.output_dir).ok();
    }

    #[test]
    fn test_synthesis_failure_is_fatal() {
        let (run, forge) = test_setup();
        let completion = MockCompletion::failing();
        let image = MockImageBackend::instant(test_png_bytes(125, 100));
        let renderer = MockRenderBackend::new();

        let synthesizer = CardSynthesizer::new(&completion, &run, &forge, "theme", Vec::new());
        let commissioner = ArtCommissioner::new(&completion, &image, &run, &forge, "theme");
        let runner = BatchStageRunner::new(&synthesizer, &commissioner, &renderer, &run);

        let mut counter = 1;
        let mut manifest = ArtManifest::new(&run.set_id);
        let err = runner
            .run_batch(1, &[], &mut counter, &mut manifest)
            .unwrap_err();

        assert!(matches!(
            err,
            ForgeError::FatalStage { ref stage, .. } if stage == "synthesis"
        ));
        // Nothing rendered, counter untouched
        assert!(renderer.rendered_batches().is_empty());
        assert_eq!(counter, 1);

        std::fs::remove_dir_all(&run.output_dir).ok();
    }

    #[test]
    fn test_render_failure_is_captured_not_returned() {
        let (run, forge) = test_setup();
        let completion = MockCompletion::with_replies(vec![SYNTH_REPLY.to_string()]);
        let image = MockImageBackend::instant(test_png_bytes(125, 100));
        let renderer = MockRenderBackend::failing();

        let synthesizer = CardSynthesizer::new(&completion, &run, &forge, "theme", Vec::new());
        let commissioner = ArtCommissioner::new(&completion, &image, &run, &forge, "theme");
        let runner = BatchStageRunner::new(&synthesizer, &commissioner, &renderer, &run);

        let mut counter = 1;
        let mut manifest = ArtManifest::new(&run.set_id);
        let outcome = runner
            .run_batch(1, &[], &mut counter, &mut manifest)
            .unwrap();

        assert!(outcome.render_error.is_some());
        assert_eq!(outcome.cards.len(), 2);
        // Side files survive a render failure
        assert!(run.output_path("Tide_Caller.json").exists());

        std::fs::remove_dir_all(&run.output_dir).ok();
    }

    #[test]
    fn test_art_misses_are_soft_and_counted() {
        let (run, forge) = test_setup();
        let completion = MockCompletion::with_replies(vec![SYNTH_REPLY.to_string()]);
        let image = MockImageBackend::rejecting_submissions();
        let renderer = MockRenderBackend::new();

        let synthesizer = CardSynthesizer::new(&completion, &run, &forge, "theme", Vec::new());
        let commissioner = ArtCommissioner::new(&completion, &image, &run, &forge, "theme");
        let runner = BatchStageRunner::new(&synthesizer, &commissioner, &renderer, &run);

        let mut counter = 1;
        let mut manifest = ArtManifest::new(&run.set_id);
        let outcome = runner
            .run_batch(1, &[], &mut counter, &mut manifest)
            .unwrap();

        // Art prompt generation succeeds but image jobs are rejected
        assert_eq!(outcome.art_misses, 2);
        assert!(outcome.cards.iter().all(|c| c.image_path.is_none()));

        std::fs::remove_dir_all(&run.output_dir).ok();
    }

    #[test]
    fn test_assign_collector_numbers() {
        let mut counter = 10;
        let mut cards: Vec<Card> = Vec::new();
        assign_collector_numbers(&mut cards, &mut counter);
        assert_eq!(counter, 10);
    }
}
