//! Check command - show the resolved backend configuration

use anyhow::Result;
use cardforge_pipeline::ForgeConfig;

pub fn run() -> Result<()> {
    let config = ForgeConfig::load()?;

    println!("Resolved backend configuration:\n");
    for backend in ["completion", "image", "render"] {
        let key = match config.api_key(backend) {
            Some(_) => "set",
            None => "not set",
        };
        println!(
            "  {:<12} url={} api_key={} enabled={}",
            backend,
            config.api_url(backend),
            key,
            config.is_enabled(backend)
        );
    }

    println!("\nModels:");
    println!("  main:  {}", config.generation.main_model);
    println!("  json:  {}", config.generation.json_model);
    println!("  image: {}", config.generation.image_model);
    println!(
        "\nImage jobs: poll every {}s, timeout {}s",
        config.generation.poll_interval_secs, config.generation.job_timeout_secs
    );
    Ok(())
}
