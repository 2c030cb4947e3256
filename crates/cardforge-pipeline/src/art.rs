//! Art commissioning with bounded retries
//!
//! Each card gets an art prompt synthesized by the completion backend,
//! then an image generated through the job queue. Attempts that fail are
//! retried with a delay; later attempts append escalating safe-content
//! clauses to the prompt. Exhausting the budget is a soft failure: the
//! card continues through the pipeline without art.

use crate::backend::{CompletionBackend, ImageJobBackend};
use crate::config::{ForgeConfig, RunConfig};
use crate::crop::{crop_to_ratio, AspectRatio};
use crate::manifest::{ArtManifest, ArtManifestEntry};
use crate::poller::JobPoller;
use crate::timefmt;
use cardforge_core::{sanitize_name, Card, ContentHash, Result};
use std::time::Duration;

const SAFE_CLAUSE: &str =
    "Please make sure it is a really SAFE prompt! Don't include words that could trigger \
     NSFW filters. This is crucial.";
const EXTRA_SAFE_CLAUSE: &str =
    "Don't put any words in the prompt that might be considered harmful by anyone. \
     Make it really safe!";

/// Ordered table mapping attempt indices to additional prompt constraints.
///
/// A fixed policy, not adaptive to the failure reason: every attempt at or
/// past a step's index gets that step's clause appended.
#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    steps: Vec<(u32, String)>,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            steps: vec![
                (2, SAFE_CLAUSE.to_string()),
                (4, EXTRA_SAFE_CLAUSE.to_string()),
            ],
        }
    }
}

impl EscalationPolicy {
    pub fn new(steps: Vec<(u32, String)>) -> Self {
        let mut steps = steps;
        steps.sort_by_key(|(threshold, _)| *threshold);
        Self { steps }
    }

    /// All clauses active at the given 0-based attempt index
    pub fn clauses_for(&self, attempt: u32) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|(threshold, _)| attempt >= *threshold)
            .map(|(_, clause)| clause.as_str())
            .collect()
    }
}

/// The outcome of commissioning art for one card
#[derive(Debug, Clone)]
pub struct ArtOutcome {
    pub prompt: String,
    pub bytes: Vec<u8>,
    /// 1-based attempt on which the image succeeded, or the full budget
    /// for a miss
    pub attempts: u32,
}

impl ArtOutcome {
    /// The soft-failure outcome: empty prompt, empty artifact
    pub fn missing(attempts: u32) -> Self {
        Self {
            prompt: String::new(),
            bytes: Vec::new(),
            attempts,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Commissions art for cards, one at a time
pub struct ArtCommissioner<'a> {
    completion: &'a dyn CompletionBackend,
    image: &'a dyn ImageJobBackend,
    run: &'a RunConfig,
    forge: &'a ForgeConfig,
    theme: String,
    policy: EscalationPolicy,
}

impl<'a> ArtCommissioner<'a> {
    pub fn new(
        completion: &'a dyn CompletionBackend,
        image: &'a dyn ImageJobBackend,
        run: &'a RunConfig,
        forge: &'a ForgeConfig,
        theme: &str,
    ) -> Self {
        Self {
            completion,
            image,
            run,
            forge,
            theme: theme.to_string(),
            policy: EscalationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: EscalationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the instruction text sent to the completion backend when
    /// asking for an art prompt. Pure; exercised directly by tests.
    pub fn build_prompt_request(&self, card: &Card, attempt: u32) -> String {
        let saga_instructions = if card.is_saga() {
            "\nIMPORTANT: This is a Saga card which requires VERTICAL art composition \
             (portrait orientation). The art runs along the right side of the card, so \
             create a tall composition rather than a wide one.\n"
        } else {
            ""
        };

        let colors = if card.colors.is_empty() {
            "Colorless".to_string()
        } else {
            card.colors
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let stats = match (&card.power, &card.toughness, &card.loyalty) {
            (Some(p), Some(t), _) => format!("Power/Toughness: {}/{}\n", p, t),
            (_, _, Some(l)) => format!("Loyalty: {}\n", l),
            _ => String::new(),
        };

        let mut prompt = format!(
            "Create a detailed art prompt for a trading card with the following details:\n\
             {saga_instructions}\n\
             Set Theme Context:\n{theme}\n\n\
             Card Name: {name}\n\
             Type: {type_line}\n\
             Rarity: {rarity}\n\
             Card Text: {text}\n\
             Flavor Text: {flavor}\n\
             Colors: {colors}\n\
             {stats}\
             Description: {description}\n\n\
             Consider all the card's details when creating the art prompt, and make \
             sure the art reflects both the card and the overall set theme.\n\
             Say something about the composition, lighting, mood, and important details.\n\
             The prompt should begin with \"Oil on canvas painting. Trading card art. \
             Rough brushstrokes.\"\n\
             Return only the prompt text with no additional explanation.",
            saga_instructions = saga_instructions,
            theme = self.theme,
            name = card.name,
            type_line = card.type_line,
            rarity = card.rarity,
            text = card.text,
            flavor = card.flavor,
            colors = colors,
            stats = stats,
            description = card.description,
        );

        for clause in self.policy.clauses_for(attempt) {
            prompt.push_str("\n\n");
            prompt.push_str(clause);
        }

        prompt
    }

    fn generate_art_prompt(&self, card: &Card, attempt: u32) -> Result<String> {
        let request = self.build_prompt_request(card, attempt);
        self.completion
            .complete(&self.forge.generation.main_model, &request)
    }

    fn attempt_once(&self, card: &Card, attempt: u32) -> Result<(String, Vec<u8>)> {
        let art_prompt = self.generate_art_prompt(card, attempt)?;

        let ratio = if card.is_saga() {
            AspectRatio::Tall
        } else {
            AspectRatio::Standard
        };
        let (width, height) = ratio.generation_size();

        let poller = JobPoller::new(
            self.image,
            self.forge.generation.poll_interval_secs,
            self.forge.generation.job_timeout_secs,
        );
        let bytes = poller.run(&art_prompt, width, height)?;
        let cropped = crop_to_ratio(&bytes, ratio)?;

        Ok((art_prompt, cropped))
    }

    /// Commission art for one card with the configured attempt budget.
    ///
    /// Never errors: exhausting all attempts returns the missing outcome
    /// and the pipeline continues with an art-less card.
    pub fn commission(&self, card: &Card) -> ArtOutcome {
        let max_attempts = self.run.max_art_attempts;

        for attempt in 0..max_attempts {
            match self.attempt_once(card, attempt) {
                Ok((prompt, bytes)) => {
                    println!(
                        "  Art for '{}' succeeded on attempt {}",
                        card.name,
                        attempt + 1
                    );
                    return ArtOutcome {
                        prompt,
                        bytes,
                        attempts: attempt + 1,
                    };
                }
                Err(e) if attempt + 1 < max_attempts => {
                    eprintln!(
                        "  Attempt {} for '{}' failed: {}. Retrying in {}s...",
                        attempt + 1,
                        card.name,
                        e,
                        self.run.art_retry_delay_secs
                    );
                    std::thread::sleep(Duration::from_secs(self.run.art_retry_delay_secs));
                }
                Err(e) => {
                    eprintln!(
                        "  Failed to generate art for '{}' after {} attempts: {}",
                        card.name, max_attempts, e
                    );
                }
            }
        }

        ArtOutcome::missing(max_attempts)
    }

    /// Commission art for a batch of cards, strictly in order. Saves each
    /// successful image next to the checkpoints, updates the card's
    /// `art_prompt`/`image_path` and records provenance in the manifest.
    /// Returns the number of cards left without art.
    pub fn process_cards(&self, cards: &mut [Card], manifest: &mut ArtManifest) -> Result<u32> {
        let mut misses = 0;

        for card in cards.iter_mut() {
            println!("\nProcessing card: {}", card.name);
            let outcome = self.commission(card);

            if outcome.is_missing() {
                misses += 1;
                continue;
            }

            let image_path = self
                .run
                .output_path(&format!("{}.png", sanitize_name(&card.name)));
            std::fs::write(&image_path, &outcome.bytes)?;
            println!("  Image saved to {}", image_path.display());

            manifest.add_entry(ArtManifestEntry {
                card_name: card.name.clone(),
                backend: self.image.name().to_string(),
                prompt: outcome.prompt.clone(),
                attempts: outcome.attempts,
                content_hash: ContentHash::from_bytes(&outcome.bytes).to_prefixed_hex(),
                generated_at: timefmt::now_iso8601(),
                image_path: Some(image_path.to_string_lossy().to_string()),
            });

            card.art_prompt = Some(outcome.prompt);
            card.image_path = Some(image_path.to_string_lossy().to_string());
        }

        Ok(misses)
    }
}
