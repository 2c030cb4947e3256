//! Init command - write a starter run configuration

use anyhow::{bail, Result};
use std::path::Path;

const TEMPLATE: &str = r#"# Cardforge run configuration
#
# set_id and output_dir are omitted so each run gets a fresh timestamped
# output directory. Backend URLs live in .cardforge/config.toml or the
# CARDFORGE_* environment variables, not here.

csv_file_path = "assets/cards_english.csv"
inspiration_cards_count = 50
batches_count = 20
theme_prompt = "{theme}"

generate_basic_lands = true
land_variations_per_type = 3

mythics_per_batch = 1
rares_per_batch = 3
uncommons_per_batch = 4
commons_per_batch = 5

max_art_attempts = 5
art_retry_delay_secs = 3

[color_weights]
W = 0.2
U = 0.2
B = 0.2
R = 0.2
G = 0.2
"#;

pub fn run(theme: Option<&str>, output: &str) -> Result<()> {
    let path = Path::new(output);
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    let theme = theme.unwrap_or("A world of your choosing");
    let content = TEMPLATE.replace("{theme}", theme);
    std::fs::write(path, content)?;

    println!("Wrote run configuration to {}", path.display());
    println!("Edit the theme prompt, then start with: cardforge run --config {}", output);
    Ok(())
}
