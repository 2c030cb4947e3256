//! Card-to-render-format conversion
//!
//! Writes one JSON side file per card, wrapped as `{"card": {...}}`,
//! which is the document shape the render backend consumes. File names
//! come from the sanitized card name.

use crate::config::RunConfig;
use cardforge_core::{sanitize_name, Card, Result};
use std::path::PathBuf;

/// Write a side file for each card. Returns the paths in card order.
pub fn convert_cards(run: &RunConfig, cards: &[Card]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(cards.len());
    for card in cards {
        paths.push(write_card_file(run, card)?);
    }
    println!("Converted {} cards to render format", paths.len());
    Ok(paths)
}

/// Write the `{"card": {...}}` document for one card.
pub fn write_card_file(run: &RunConfig, card: &Card) -> Result<PathBuf> {
    let path = run.output_path(&format!("{}.json", sanitize_name(&card.name)));
    let doc = serde_json::json!({ "card": card });
    let content = serde_json::to_string_pretty(&doc)?;
    std::fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardforge_core::{Color, Rarity};

    fn test_run() -> RunConfig {
        let mut run = RunConfig::default();
        run.output_dir =
            std::env::temp_dir().join(format!("cardforge_convert_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&run.output_dir).unwrap();
        run
    }

    fn test_card(name: &str) -> Card {
        Card {
            name: name.to_string(),
            mana_cost: "1W".to_string(),
            type_line: "Creature — Soldier".to_string(),
            rarity: Rarity::Common,
            text: "Vigilance".to_string(),
            flavor: String::new(),
            colors: vec![Color::W],
            power: Some("1".to_string()),
            toughness: Some("1".to_string()),
            loyalty: None,
            set_name: "testset".to_string(),
            description: String::new(),
            art_prompt: None,
            image_path: None,
            collector_number: Some("3".to_string()),
        }
    }

    #[test]
    fn test_side_file_is_wrapped_in_card_key() {
        let run = test_run();
        let path = write_card_file(&run, &test_card("Dawn Sentry")).unwrap();

        assert_eq!(path.file_name().unwrap(), "Dawn_Sentry.json");
        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["card"]["name"], "Dawn Sentry");
        assert_eq!(value["card"]["type"], "Creature — Soldier");

        std::fs::remove_dir_all(&run.output_dir).ok();
    }

    #[test]
    fn test_convert_preserves_card_order() {
        let run = test_run();
        let cards = vec![test_card("Alpha"), test_card("Beta")];
        let paths = convert_cards(&run, &cards).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].file_name().unwrap(), "Alpha.json");
        assert_eq!(paths[1].file_name().unwrap(), "Beta.json");

        std::fs::remove_dir_all(&run.output_dir).ok();
    }
}
