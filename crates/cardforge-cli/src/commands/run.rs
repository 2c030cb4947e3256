//! Run command - execute the full generation pipeline

use anyhow::Result;
use cardforge_pipeline::backends::{
    create_completion_backend, create_image_backend, create_render_backend,
};
use cardforge_pipeline::{ForgeConfig, Orchestrator, RunConfig};
use std::path::{Path, PathBuf};

pub struct RunArgs {
    pub config: String,
    pub batches: Option<u32>,
    pub theme: Option<String>,
    pub output: Option<String>,
    pub completion_backend: String,
    pub image_backend: String,
    pub render_backend: String,
    pub no_lands: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    let forge = ForgeConfig::load()?;

    let config_path = Path::new(&args.config);
    let mut run_config = if config_path.exists() {
        RunConfig::load(config_path)?
    } else {
        println!(
            "No run config at {}, using defaults",
            config_path.display()
        );
        RunConfig::default()
    };

    if let Some(batches) = args.batches {
        run_config.batches_count = batches;
    }
    if let Some(theme) = args.theme {
        run_config.theme_prompt = Some(theme);
    }
    if let Some(output) = args.output {
        run_config.output_dir = PathBuf::from(output);
    }
    if args.no_lands {
        run_config.generate_basic_lands = false;
    }

    let completion = create_completion_backend(&args.completion_backend, &forge)?;
    let image = create_image_backend(&args.image_backend, &forge)?;
    let renderer = create_render_backend(&args.render_backend, &forge)?;

    println!(
        "Backends: completion={}, image={}, render={}",
        completion.name(),
        image.name(),
        renderer.name()
    );

    let orchestrator = Orchestrator::new(
        &run_config,
        &forge,
        completion.as_ref(),
        image.as_ref(),
        renderer.as_ref(),
    );
    let summary = orchestrator.run()?;

    println!(
        "\nSet '{}' complete: {} cards, final checkpoint at {}",
        run_config.set_id,
        summary.cards.len(),
        summary.final_checkpoint.display()
    );
    Ok(())
}
