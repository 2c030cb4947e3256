//! Stats command - inspect a checkpoint

use anyhow::Result;
use cardforge_pipeline::SetDocument;
use std::path::Path;

pub fn run(checkpoint: &str) -> Result<()> {
    let doc = SetDocument::load(Path::new(checkpoint))?;

    println!("Checkpoint: {}", checkpoint);
    println!("Generated at: {}", doc.set_info.generation_date);

    let theme_preview: String = doc.set_info.theme.chars().take(200).collect();
    println!("\nTheme:\n{}", theme_preview);
    if doc.set_info.theme.chars().count() > 200 {
        println!("...");
    }

    doc.set_info.statistics.print_summary();

    let missing = doc.cards.iter().filter(|c| c.image_path.is_none()).count();
    if missing > 0 {
        println!("\n{} of {} cards are missing art", missing, doc.cards.len());
    }
    Ok(())
}
