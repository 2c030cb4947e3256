//! Basic land generation
//!
//! After all batches complete, each of the five basic land types gets a
//! configurable number of art variations. Land cards are synthesized
//! locally (no completion call for the card body, only for the art
//! prompt) and numbered consecutively from the collector counter the
//! orchestrator hands over.

use crate::backend::{CompletionBackend, ImageJobBackend};
use crate::config::{ForgeConfig, RunConfig};
use crate::crop::{crop_to_ratio, AspectRatio};
use crate::manifest::{ArtManifest, ArtManifestEntry};
use crate::poller::JobPoller;
use crate::timefmt;
use cardforge_core::{sanitize_name, Card, Color, ContentHash, Rarity, Result};

const LAND_TYPES: [(&str, Color); 5] = [
    ("Plains", Color::W),
    ("Island", Color::U),
    ("Swamp", Color::B),
    ("Mountain", Color::R),
    ("Forest", Color::G),
];

pub struct LandGenerator<'a> {
    completion: &'a dyn CompletionBackend,
    image: &'a dyn ImageJobBackend,
    run: &'a RunConfig,
    forge: &'a ForgeConfig,
    theme: String,
    next_collector_number: u32,
}

impl<'a> LandGenerator<'a> {
    pub fn new(
        completion: &'a dyn CompletionBackend,
        image: &'a dyn ImageJobBackend,
        run: &'a RunConfig,
        forge: &'a ForgeConfig,
        theme: &str,
        start_collector_number: u32,
    ) -> Self {
        Self {
            completion,
            image,
            run,
            forge,
            theme: theme.to_string(),
            next_collector_number: start_collector_number,
        }
    }

    /// Build the card body for one land variation and advance the counter.
    fn make_land_card(&mut self, land_type: &str, color: Color, variation: u32) -> Card {
        let number = self.next_collector_number;
        self.next_collector_number += 1;

        Card {
            name: format!("{} {}", land_type, variation),
            mana_cost: String::new(),
            type_line: format!("Basic Land — {}", land_type),
            rarity: Rarity::Common,
            text: String::new(),
            flavor: String::new(),
            colors: vec![color],
            power: None,
            toughness: None,
            loyalty: None,
            set_name: self.run.set_id.clone(),
            description: format!(
                "A {} from which {} mana can be drawn. Variation {}.",
                land_type.to_lowercase(),
                color,
                variation
            ),
            art_prompt: None,
            image_path: None,
            collector_number: Some(number.to_string()),
        }
    }

    /// The instruction text asking the completion backend for a land art
    /// prompt. Pure; exercised by tests.
    pub fn build_land_prompt_request(&self, land_type: &str) -> String {
        format!(
            "Create a detailed art prompt for a {land_type} basic land card in a trading \
             card game.\n\n\
             Set Theme Context:\n{theme}\n\n\
             This is a variation of the {land_type} for this set. Make it unique and \
             distinct from other variations while still fitting the overall set theme.\n\n\
             Create a vivid, detailed landscape that captures the essence of a \
             {land_type}, reflecting its color identity and incorporating elements from \
             the set's theme. Mention weather, time of day and lighting.\n\
             The prompt should begin with \"Oil on canvas painting. Trading card art. \
             Detailed landscape.\"\n\
             Return only the art prompt text with no additional explanation.",
            land_type = land_type,
            theme = self.theme,
        )
    }

    /// Commission art for one land card. Lands get a single attempt; a
    /// failure leaves the card without art, same as the batch soft
    /// failure.
    fn commission_land_art(&self, card: &mut Card, manifest: &mut ArtManifest) -> Result<()> {
        let land_type = card
            .type_line
            .rsplit(' ')
            .next()
            .unwrap_or("Plains")
            .to_string();
        let request = self.build_land_prompt_request(&land_type);
        let art_prompt = self
            .completion
            .complete(&self.forge.generation.main_model, &request)?;

        let (width, height) = AspectRatio::Standard.generation_size();
        let poller = JobPoller::new(
            self.image,
            self.forge.generation.poll_interval_secs,
            self.forge.generation.job_timeout_secs,
        );
        let bytes = poller.run(&art_prompt, width, height)?;
        let cropped = crop_to_ratio(&bytes, AspectRatio::Standard)?;

        let image_path = self
            .run
            .output_path(&format!("{}.png", sanitize_name(&card.name)));
        std::fs::write(&image_path, &cropped)?;
        println!("  Saved image to {}", image_path.display());

        manifest.add_entry(ArtManifestEntry {
            card_name: card.name.clone(),
            backend: self.image.name().to_string(),
            prompt: art_prompt.clone(),
            attempts: 1,
            content_hash: ContentHash::from_bytes(&cropped).to_prefixed_hex(),
            generated_at: timefmt::now_iso8601(),
            image_path: Some(image_path.to_string_lossy().to_string()),
        });

        card.art_prompt = Some(art_prompt);
        card.image_path = Some(image_path.to_string_lossy().to_string());
        Ok(())
    }

    /// Generate every land variation for the set.
    pub fn generate_basic_lands(&mut self, manifest: &mut ArtManifest) -> Result<Vec<Card>> {
        let mut all_lands = Vec::new();

        for (land_type, color) in LAND_TYPES {
            println!(
                "\nGenerating {} variations of {}",
                self.run.land_variations_per_type, land_type
            );

            for variation in 1..=self.run.land_variations_per_type {
                println!("  Processing {} variation {}...", land_type, variation);
                let mut card = self.make_land_card(land_type, color, variation);

                if let Err(e) = self.commission_land_art(&mut card, manifest) {
                    eprintln!("  Failed to generate art for {}: {}", card.name, e);
                }

                all_lands.push(card);
            }
        }

        println!("\nGenerated {} basic land variations", all_lands.len());
        Ok(all_lands)
    }

    /// The collector number the next card would receive.
    pub fn next_collector_number(&self) -> u32 {
        self.next_collector_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::{test_png_bytes, MockCompletion, MockImageBackend};

    fn test_setup() -> (RunConfig, ForgeConfig) {
        let mut run = RunConfig::default();
        run.land_variations_per_type = 2;
        run.set_id = "testset".to_string();
        run.output_dir =
            std::env::temp_dir().join(format!("cardforge_lands_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&run.output_dir).unwrap();

        let mut forge = ForgeConfig::default();
        forge.generation.poll_interval_secs = 0;
        forge.generation.job_timeout_secs = 5;
        (run, forge)
    }

    #[test]
    fn test_generates_all_types_with_consecutive_numbers() {
        let (run, forge) = test_setup();
        let completion = MockCompletion::new();
        let image = MockImageBackend::instant(test_png_bytes(125, 100));
        let mut generator = LandGenerator::new(&completion, &image, &run, &forge, "theme", 121);
        let mut manifest = ArtManifest::new(&run.set_id);

        let lands = generator.generate_basic_lands(&mut manifest).unwrap();

        // 5 types x 2 variations
        assert_eq!(lands.len(), 10);
        assert_eq!(lands[0].name, "Plains 1");
        assert_eq!(lands[0].collector_number.as_deref(), Some("121"));
        assert_eq!(lands[9].name, "Forest 2");
        assert_eq!(lands[9].collector_number.as_deref(), Some("130"));
        assert_eq!(generator.next_collector_number(), 131);
        assert_eq!(manifest.entries.len(), 10);

        std::fs::remove_dir_all(&run.output_dir).ok();
    }

    #[test]
    fn test_land_card_shape() {
        let (run, forge) = test_setup();
        let completion = MockCompletion::new();
        let image = MockImageBackend::instant(test_png_bytes(125, 100));
        let mut generator = LandGenerator::new(&completion, &image, &run, &forge, "theme", 1);

        let card = generator.make_land_card("Island", Color::U, 3);
        assert_eq!(card.name, "Island 3");
        assert_eq!(card.type_line, "Basic Land — Island");
        assert_eq!(card.rarity, Rarity::Common);
        assert_eq!(card.colors, vec![Color::U]);
        assert!(card.mana_cost.is_empty());
        assert!(card.description.contains("island"));

        std::fs::remove_dir_all(&run.output_dir).ok();
    }

    #[test]
    fn test_art_failure_is_soft() {
        let (run, forge) = test_setup();
        let completion = MockCompletion::new();
        let image = MockImageBackend::rejecting_submissions();
        let mut generator = LandGenerator::new(&completion, &image, &run, &forge, "theme", 1);
        let mut manifest = ArtManifest::new(&run.set_id);

        let lands = generator.generate_basic_lands(&mut manifest).unwrap();

        assert_eq!(lands.len(), 10);
        assert!(lands.iter().all(|l| l.image_path.is_none()));
        // Numbering is unaffected by art failures
        assert_eq!(lands[9].collector_number.as_deref(), Some("10"));
        assert!(manifest.entries.is_empty());

        std::fs::remove_dir_all(&run.output_dir).ok();
    }

    #[test]
    fn test_prompt_request_names_land_type_and_theme() {
        let (run, forge) = test_setup();
        let completion = MockCompletion::new();
        let image = MockImageBackend::instant(test_png_bytes(64, 64));
        let generator =
            LandGenerator::new(&completion, &image, &run, &forge, "volcanic ruin", 1);

        let request = generator.build_land_prompt_request("Mountain");
        assert!(request.contains("Mountain basic land"));
        assert!(request.contains("volcanic ruin"));

        std::fs::remove_dir_all(&run.output_dir).ok();
    }
}
