//! Card synthesis via the completion backend
//!
//! Builds the batch synthesis prompt from the set theme, rarity quotas,
//! color weights and inspiration cards, then parses the model reply.
//! Model output is prose-tolerant: the JSON array is extracted from
//! whatever text surrounds it, and common field sloppiness (numeric
//! power, rarity casing, colors as a string) is normalized before
//! deserialization.

use crate::backend::CompletionBackend;
use crate::config::{ForgeConfig, RunConfig};
use crate::inspiration::InspirationCard;
use cardforge_core::{Card, ForgeError, Rarity, Result};
use serde_json::Value;

pub struct CardSynthesizer<'a> {
    completion: &'a dyn CompletionBackend,
    run: &'a RunConfig,
    forge: &'a ForgeConfig,
    theme: String,
    inspiration: Vec<InspirationCard>,
}

impl<'a> CardSynthesizer<'a> {
    pub fn new(
        completion: &'a dyn CompletionBackend,
        run: &'a RunConfig,
        forge: &'a ForgeConfig,
        theme: &str,
        inspiration: Vec<InspirationCard>,
    ) -> Self {
        Self {
            completion,
            run,
            forge,
            theme: theme.to_string(),
            inspiration,
        }
    }

    /// The full instruction text for one batch. Pure; exercised by tests.
    pub fn build_batch_prompt(&self, existing_names: &[String]) -> String {
        let w = &self.run.color_weights;
        let quotas = format!(
            "- {} Mythic Rare\n- {} Rare\n- {} Uncommon\n- {} Common",
            self.run.mythics_per_batch,
            self.run.rares_per_batch,
            self.run.uncommons_per_batch,
            self.run.commons_per_batch,
        );

        let inspiration_lines = self
            .inspiration
            .iter()
            .map(|c| c.summary())
            .collect::<Vec<_>>()
            .join("\n");

        let existing = if existing_names.is_empty() {
            String::new()
        } else {
            format!(
                "\nCards already in the set, do NOT repeat any of these names:\n{}\n",
                existing_names.join(", ")
            )
        };

        format!(
            "You are designing cards for a trading card set with this theme:\n\n\
             {theme}\n\n\
             Generate exactly {total} new cards for the set with this rarity breakdown:\n\
             {quotas}\n\n\
             Color distribution guidance (approximate share of colored cards):\n\
             W: {ww:.2}, U: {wu:.2}, B: {wb:.2}, R: {wr:.2}, G: {wg:.2}\n\
             {existing}\n\
             Here are some existing cards for style and power-level reference:\n\
             {inspiration_lines}\n\n\
             Return ONLY a JSON array. Each element must be an object with these keys:\n\
             \"name\", \"mana_cost\", \"type\", \"rarity\", \"text\", \"flavor\", \
             \"colors\" (array of \"W\"/\"U\"/\"B\"/\"R\"/\"G\", empty for colorless), \
             \"power\" and \"toughness\" (creatures only), \"loyalty\" (planeswalkers \
             only), \"description\" (one sentence describing the card visually).\n\
             Rarity must be one of \"Mythic Rare\", \"Rare\", \"Uncommon\", \"Common\".\n\
             Do not include any text outside the JSON array.",
            theme = self.theme,
            total = self.run.cards_per_batch(),
            quotas = quotas,
            ww = w.white,
            wu = w.blue,
            wb = w.black,
            wr = w.red,
            wg = w.green,
            existing = existing,
            inspiration_lines = inspiration_lines,
        )
    }

    /// Generate one batch of cards. Collector numbers are NOT assigned
    /// here; the orchestrator owns that counter.
    pub fn synthesize_batch(&self, existing_names: &[String]) -> Result<Vec<Card>> {
        let prompt = self.build_batch_prompt(existing_names);
        let reply = self
            .completion
            .complete(&self.forge.generation.json_model, &prompt)?;

        let mut cards = parse_cards_reply(&reply)?;
        for card in &mut cards {
            card.set_name = self.run.set_id.clone();
        }

        let expected = self.run.cards_per_batch() as usize;
        if cards.len() != expected {
            eprintln!(
                "  Warning: model returned {} cards, expected {}",
                cards.len(),
                expected
            );
        }
        Ok(cards)
    }
}

/// Parse a model reply into cards, tolerating surrounding prose and
/// code fences.
pub fn parse_cards_reply(reply: &str) -> Result<Vec<Card>> {
    let json = extract_json_array(reply)?;
    let value: Value = serde_json::from_str(&json)
        .map_err(|e| ForgeError::Parse(format!("Invalid card JSON: {}", e)))?;

    let items = value
        .as_array()
        .ok_or_else(|| ForgeError::Parse("Expected a JSON array of cards".to_string()))?;

    let mut cards = Vec::with_capacity(items.len());
    for item in items {
        let mut item = item.clone();
        normalize_card_value(&mut item)?;
        let card: Card = serde_json::from_value(item)
            .map_err(|e| ForgeError::Parse(format!("Invalid card object: {}", e)))?;
        cards.push(card);
    }
    Ok(cards)
}

/// Extract the outermost JSON array from free text.
pub fn extract_json_array(reply: &str) -> Result<String> {
    let start = reply
        .find('[')
        .ok_or_else(|| ForgeError::Parse("No JSON array in reply".to_string()))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in reply[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(reply[start..start + offset + 1].to_string());
                }
            }
            _ => {}
        }
    }
    Err(ForgeError::Parse(
        "Unterminated JSON array in reply".to_string(),
    ))
}

/// Repair common model deviations in a single card object so the strict
/// serde deserialization succeeds.
fn normalize_card_value(value: &mut Value) -> Result<()> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| ForgeError::Parse("Card entry is not an object".to_string()))?;

    // type_line instead of type
    if !obj.contains_key("type") {
        if let Some(t) = obj.remove("type_line") {
            obj.insert("type".to_string(), t);
        }
    }

    // rarity casing and "Mythic" shorthand
    if let Some(r) = obj.get("rarity").and_then(Value::as_str) {
        let rarity = Rarity::parse(r)
            .ok_or_else(|| ForgeError::Parse(format!("Unknown rarity '{}'", r)))?;
        obj.insert("rarity".to_string(), Value::String(rarity.to_string()));
    }

    // colors as a compact string like "WU"
    if let Some(Value::String(s)) = obj.get("colors") {
        let symbols: Vec<Value> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| Value::String(c.to_string()))
            .collect();
        let symbols = Value::Array(symbols);
        obj.insert("colors".to_string(), symbols);
    }

    // numeric or null power/toughness/loyalty
    for key in ["power", "toughness", "loyalty"] {
        match obj.get(key) {
            Some(Value::Number(n)) => {
                let s = n.to_string();
                obj.insert(key.to_string(), Value::String(s));
            }
            Some(Value::String(s)) if s.is_empty() => {
                obj.insert(key.to_string(), Value::Null);
            }
            _ => {}
        }
    }

    Ok(())
}
