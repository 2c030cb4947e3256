//! Inspiration card loading
//!
//! Reads a CSV of existing cards and samples a handful to anchor theme
//! and card synthesis. The format is a plain header-row CSV with quoted
//! fields; only the `name` column is required, everything else is
//! best-effort.

use cardforge_core::{ForgeError, Result};
use rand::seq::SliceRandom;
use std::path::Path;

/// One row from the inspiration CSV
#[derive(Debug, Clone, Default)]
pub struct InspirationCard {
    pub name: String,
    pub mana_cost: String,
    pub type_line: String,
    pub text: String,
    pub power: String,
    pub toughness: String,
    pub rarity: String,
}

impl InspirationCard {
    /// One-line rendering used in synthesis prompts
    pub fn summary(&self) -> String {
        let mut line = format!("{} | {} | {}", self.name, self.mana_cost, self.type_line);
        if !self.power.is_empty() || !self.toughness.is_empty() {
            line.push_str(&format!(" | {}/{}", self.power, self.toughness));
        }
        if !self.text.is_empty() {
            line.push_str(" | ");
            line.push_str(&self.text.replace('\n', " "));
        }
        line
    }
}

/// Load the CSV and sample up to `count` cards at random.
pub fn load_inspiration_cards(path: &Path, count: usize) -> Result<Vec<InspirationCard>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ForgeError::Config(format!(
            "Failed to read inspiration CSV {}: {}",
            path.display(),
            e
        ))
    })?;
    let mut cards = parse_inspiration_csv(&content)?;

    let mut rng = rand::thread_rng();
    cards.shuffle(&mut rng);
    cards.truncate(count);
    println!("Loaded {} inspiration cards from {}", cards.len(), path.display());
    Ok(cards)
}

/// Parse the whole CSV document. The first row is the header.
pub fn parse_inspiration_csv(content: &str) -> Result<Vec<InspirationCard>> {
    let mut rows = parse_csv(content).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| ForgeError::Parse("Inspiration CSV is empty".to_string()))?;

    let columns = ColumnMap::from_header(&header)?;
    let mut cards = Vec::new();
    for row in rows {
        if row.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let card = columns.card_from_row(&row);
        if !card.name.is_empty() {
            cards.push(card);
        }
    }
    Ok(cards)
}

struct ColumnMap {
    name: usize,
    mana_cost: Option<usize>,
    type_line: Option<usize>,
    text: Option<usize>,
    power: Option<usize>,
    toughness: Option<usize>,
    rarity: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |candidates: &[&str]| {
            header.iter().position(|h| {
                let h = h.trim().to_ascii_lowercase();
                candidates.contains(&h.as_str())
            })
        };

        let name = find(&["name", "card_name"]).ok_or_else(|| {
            ForgeError::Parse("Inspiration CSV has no 'name' column".to_string())
        })?;

        Ok(Self {
            name,
            mana_cost: find(&["mana_cost", "manacost", "mana cost", "cost"]),
            type_line: find(&["type", "type_line", "types"]),
            text: find(&["text", "rules_text", "oracle_text"]),
            power: find(&["power"]),
            toughness: find(&["toughness"]),
            rarity: find(&["rarity"]),
        })
    }

    fn card_from_row(&self, row: &[String]) -> InspirationCard {
        let get = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        InspirationCard {
            name: row
                .get(self.name)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            mana_cost: get(self.mana_cost),
            type_line: get(self.type_line),
            text: get(self.text),
            power: get(self.power),
            toughness: get(self.toughness),
            rarity: get(self.rarity),
        }
    }
}

/// Minimal CSV parser: comma separated, double-quoted fields with `""`
/// escapes, quoted fields may contain newlines.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    row.push(std::mem::take(&mut field));
                }
                '\r' => {}
                '\n' => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}
