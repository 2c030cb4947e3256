//! JSON checkpoints
//!
//! After every batch the full accumulated state is rewritten to
//! `set_batch_<n>.json`, and finalization writes `set_complete.json`.
//! Checkpoints are self-contained: theme, run configuration summary,
//! statistics and every processed card, so a run can be inspected from
//! any of them.

use crate::config::{ColorWeights, ForgeConfig, RunConfig};
use crate::stats::Statistics;
use crate::timefmt;
use cardforge_core::{Card, ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub main: String,
    pub json: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandSummary {
    pub enabled: bool,
    pub variations_per_type: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaSummary {
    pub mythic_per_batch: u32,
    pub rare_per_batch: u32,
    pub uncommon_per_batch: u32,
    pub common_per_batch: u32,
}

/// The run configuration snapshot embedded in every checkpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub inspiration_cards_count: usize,
    pub total_cards: u32,
    pub theme_prompt: Option<String>,
    pub rarity_distribution: QuotaSummary,
    pub target_color_distribution: ColorWeights,
    pub models: ModelSummary,
    pub basic_lands: LandSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetInfo {
    pub theme: String,
    pub generation_date: String,
    pub config: ConfigSummary,
    #[serde(flatten)]
    pub statistics: Statistics,
}

/// A complete checkpoint document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDocument {
    pub set_info: SetInfo,
    pub cards: Vec<Card>,
}

impl SetDocument {
    /// Read a checkpoint back from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ForgeError::Checkpoint(format!(
                "Failed to parse checkpoint {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Writes batch and final checkpoints for one run
pub struct CheckpointWriter {
    run: RunConfig,
    config_summary: ConfigSummary,
}

impl CheckpointWriter {
    pub fn new(run: &RunConfig, forge: &ForgeConfig) -> Self {
        let config_summary = ConfigSummary {
            inspiration_cards_count: run.inspiration_cards_count,
            total_cards: run.batches_count * run.cards_per_batch(),
            theme_prompt: run.theme_prompt.clone(),
            rarity_distribution: QuotaSummary {
                mythic_per_batch: run.mythics_per_batch,
                rare_per_batch: run.rares_per_batch,
                uncommon_per_batch: run.uncommons_per_batch,
                common_per_batch: run.commons_per_batch,
            },
            target_color_distribution: run.color_weights.clone(),
            models: ModelSummary {
                main: forge.generation.main_model.clone(),
                json: forge.generation.json_model.clone(),
                image: forge.generation.image_model.clone(),
            },
            basic_lands: LandSummary {
                enabled: run.generate_basic_lands,
                variations_per_type: run.land_variations_per_type,
            },
        };
        Self {
            run: run.clone(),
            config_summary,
        }
    }

    /// Assemble the full document for the current accumulated state.
    pub fn document(&self, theme: &str, cards: &[Card]) -> SetDocument {
        SetDocument {
            set_info: SetInfo {
                theme: theme.to_string(),
                generation_date: timefmt::now_iso8601(),
                config: self.config_summary.clone(),
                statistics: Statistics::summarize(cards),
            },
            cards: cards.to_vec(),
        }
    }

    /// Write the checkpoint for a completed batch.
    pub fn write_batch(&self, theme: &str, cards: &[Card], batch_num: u32) -> Result<PathBuf> {
        let path = self.run.output_path(&format!("set_batch_{}.json", batch_num));
        self.write(&path, theme, cards)?;
        println!("\nBatch {} data saved to {}", batch_num, path.display());
        Ok(path)
    }

    /// Write the final complete-set checkpoint.
    pub fn write_final(&self, theme: &str, cards: &[Card]) -> Result<PathBuf> {
        let path = self.run.output_path("set_complete.json");
        self.write(&path, theme, cards)?;
        println!("\nComplete set data saved to {}", path.display());
        Ok(path)
    }

    fn write(&self, path: &Path, theme: &str, cards: &[Card]) -> Result<()> {
        let doc = self.document(theme, cards);
        let content = serde_json::to_string_pretty(&doc)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
