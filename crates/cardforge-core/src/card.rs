//! The card entity model
//!
//! `Card` is the canonical representation of a generated card or basic
//! land. Its serde form is the dictionary shape written into checkpoint
//! documents and per-card side files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five mana colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    W,
    U,
    B,
    R,
    G,
}

impl Color {
    /// All colors in canonical WUBRG order
    pub const ALL: [Color; 5] = [Color::W, Color::U, Color::B, Color::R, Color::G];

    /// Parse a single color symbol
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s.trim() {
            "W" => Some(Color::W),
            "U" => Some(Color::U),
            "B" => Some(Color::B),
            "R" => Some(Color::R),
            "G" => Some(Color::G),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Color::W => "W",
            Color::U => "U",
            Color::B => "B",
            Color::R => "R",
            Color::G => "G",
        };
        write!(f, "{}", s)
    }
}

/// Card rarity, four buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    #[serde(rename = "Mythic Rare")]
    MythicRare,
    Rare,
    Uncommon,
    Common,
}

impl Rarity {
    /// Tolerant parse for model-produced rarity strings
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mythic rare" | "mythic" => Some(Rarity::MythicRare),
            "rare" => Some(Rarity::Rare),
            "uncommon" => Some(Rarity::Uncommon),
            "common" => Some(Rarity::Common),
            _ => None,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rarity::MythicRare => "Mythic Rare",
            Rarity::Rare => "Rare",
            Rarity::Uncommon => "Uncommon",
            Rarity::Common => "Common",
        };
        write!(f, "{}", s)
    }
}

/// A generated card or basic land
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    #[serde(default)]
    pub mana_cost: String,
    #[serde(rename = "type")]
    pub type_line: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub flavor: String,
    #[serde(default)]
    pub colors: Vec<Color>,
    /// Power, for creatures (string-typed: "*" is legal)
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    /// Loyalty, for planeswalkers; mutually exclusive with power/toughness
    #[serde(default)]
    pub loyalty: Option<String>,
    #[serde(default)]
    pub set_name: String,
    #[serde(default)]
    pub description: String,
    /// Populated only after successful art commissioning
    #[serde(default)]
    pub art_prompt: Option<String>,
    /// Never set to a placeholder: absent art stays `None`
    #[serde(default)]
    pub image_path: Option<String>,
    /// Unique, strictly increasing across the run once assigned
    #[serde(default)]
    pub collector_number: Option<String>,
}

impl Card {
    /// Saga cards use a vertical art layout
    pub fn is_saga(&self) -> bool {
        self.type_line.contains("Saga")
    }

    /// A card with an empty color set counts as colorless
    pub fn is_colorless(&self) -> bool {
        self.colors.is_empty()
    }

    /// The collector number as a number; non-numeric values count as 0
    /// for high-water-mark recomputation.
    pub fn numeric_collector_number(&self) -> u32 {
        self.collector_number
            .as_deref()
            .and_then(|n| n.parse::<u32>().ok())
            .unwrap_or(0)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.rarity, self.mana_cost)
    }
}

/// Filesystem-safe transform of a card name for side files
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' | ':' => '-',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str) -> Card {
        Card {
            name: name.to_string(),
            mana_cost: "2R".to_string(),
            type_line: "Creature — Goblin".to_string(),
            rarity: Rarity::Common,
            text: "Haste".to_string(),
            flavor: String::new(),
            colors: vec![Color::R],
            power: Some("2".to_string()),
            toughness: Some("1".to_string()),
            loyalty: None,
            set_name: String::new(),
            description: String::new(),
            art_prompt: None,
            image_path: None,
            collector_number: None,
        }
    }

    #[test]
    fn test_rarity_parse() {
        assert_eq!(Rarity::parse("Mythic Rare"), Some(Rarity::MythicRare));
        assert_eq!(Rarity::parse("mythic"), Some(Rarity::MythicRare));
        assert_eq!(Rarity::parse("COMMON"), Some(Rarity::Common));
        assert_eq!(Rarity::parse("basic"), None);
    }

    #[test]
    fn test_card_serde_roundtrip() {
        let mut c = card("Ember Raider");
        c.collector_number = Some("12".to_string());

        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"type\":\"Creature — Goblin\""));
        assert!(json.contains("\"rarity\":\"Common\""));

        let parsed: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "Ember Raider");
        assert_eq!(parsed.colors, vec![Color::R]);
        assert_eq!(parsed.collector_number.as_deref(), Some("12"));
    }

    #[test]
    fn test_mythic_rare_serializes_with_space() {
        let mut c = card("Dawnbringer");
        c.rarity = Rarity::MythicRare;
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"Mythic Rare\""));
    }

    #[test]
    fn test_numeric_collector_number() {
        let mut c = card("Test");
        assert_eq!(c.numeric_collector_number(), 0);
        c.collector_number = Some("41".to_string());
        assert_eq!(c.numeric_collector_number(), 41);
        c.collector_number = Some("land-X".to_string());
        assert_eq!(c.numeric_collector_number(), 0);
    }

    #[test]
    fn test_is_saga() {
        let mut c = card("Fall of the Hall");
        assert!(!c.is_saga());
        c.type_line = "Enchantment — Saga".to_string();
        assert!(c.is_saga());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Ember Raider"), "Ember_Raider");
        assert_eq!(sanitize_name("Life/Death: Cycle"), "Life-Death-_Cycle");
    }
}
