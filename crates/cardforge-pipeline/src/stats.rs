//! Set statistics
//!
//! Recomputed from scratch over all processed cards after every batch
//! and again at finalization. A multicolor card counts once per color;
//! colorless cards get their own bucket.

use cardforge_core::{Card, Color, Rarity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityDistribution {
    pub mythic: u32,
    pub rare: u32,
    pub uncommon: u32,
    pub common: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorDistribution {
    #[serde(rename = "W")]
    pub white: u32,
    #[serde(rename = "U")]
    pub blue: u32,
    #[serde(rename = "B")]
    pub black: u32,
    #[serde(rename = "R")]
    pub red: u32,
    #[serde(rename = "G")]
    pub green: u32,
    pub colorless: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub card_count: usize,
    pub rarity_distribution: RarityDistribution,
    pub color_distribution: ColorDistribution,
}

impl Statistics {
    /// Compute statistics over a card collection.
    pub fn summarize(cards: &[Card]) -> Self {
        let mut stats = Statistics {
            card_count: cards.len(),
            ..Default::default()
        };

        for card in cards {
            match card.rarity {
                Rarity::MythicRare => stats.rarity_distribution.mythic += 1,
                Rarity::Rare => stats.rarity_distribution.rare += 1,
                Rarity::Uncommon => stats.rarity_distribution.uncommon += 1,
                Rarity::Common => stats.rarity_distribution.common += 1,
            }

            if card.colors.is_empty() {
                stats.color_distribution.colorless += 1;
            }
            for color in &card.colors {
                match color {
                    Color::W => stats.color_distribution.white += 1,
                    Color::U => stats.color_distribution.blue += 1,
                    Color::B => stats.color_distribution.black += 1,
                    Color::R => stats.color_distribution.red += 1,
                    Color::G => stats.color_distribution.green += 1,
                }
            }
        }

        stats
    }

    pub fn print_summary(&self) {
        println!("\n=== Set Statistics ===");
        println!("Total cards: {}", self.card_count);

        println!("\nRarity Distribution:");
        println!("- Mythic: {}", self.rarity_distribution.mythic);
        println!("- Rare: {}", self.rarity_distribution.rare);
        println!("- Uncommon: {}", self.rarity_distribution.uncommon);
        println!("- Common: {}", self.rarity_distribution.common);

        println!("\nColor Distribution:");
        println!("- W: {}", self.color_distribution.white);
        println!("- U: {}", self.color_distribution.blue);
        println!("- B: {}", self.color_distribution.black);
        println!("- R: {}", self.color_distribution.red);
        println!("- G: {}", self.color_distribution.green);
        println!("- Colorless: {}", self.color_distribution.colorless);
    }
}
