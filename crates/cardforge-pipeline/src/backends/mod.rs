//! Backend registry
//!
//! Maps backend names from the config to concrete client implementations.

pub mod comfy;
pub mod mock;
pub mod ollama;

use crate::backend::{CompletionBackend, ImageJobBackend};
use crate::config::ForgeConfig;
use crate::render::RenderBackend;
use cardforge_core::{ForgeError, Result};

/// Create the completion backend named in the config
pub fn create_completion_backend(
    name: &str,
    config: &ForgeConfig,
) -> Result<Box<dyn CompletionBackend>> {
    match name {
        "mock" => Ok(Box::new(mock::MockCompletion::new())),
        "ollama" => Ok(Box::new(ollama::OllamaCompletion::from_config(config))),
        _ => Err(ForgeError::Config(format!(
            "Unknown completion backend '{}'. Available: mock, ollama",
            name
        ))),
    }
}

/// Create the image job backend named in the config
pub fn create_image_backend(
    name: &str,
    config: &ForgeConfig,
) -> Result<Box<dyn ImageJobBackend>> {
    match name {
        "mock" => Ok(Box::new(mock::MockImageBackend::instant(
            mock::test_png_bytes(1024, 768),
        ))),
        "comfy" => Ok(Box::new(comfy::ComfyImageBackend::from_config(config)?)),
        _ => Err(ForgeError::Config(format!(
            "Unknown image backend '{}'. Available: mock, comfy",
            name
        ))),
    }
}

/// Create the render backend named in the config
pub fn create_render_backend(name: &str, config: &ForgeConfig) -> Result<Box<dyn RenderBackend>> {
    match name {
        "mock" => Ok(Box::new(mock::MockRenderBackend::new())),
        "http" => Ok(Box::new(crate::render::HttpRenderBackend::from_config(
            config,
        ))),
        _ => Err(ForgeError::Config(format!(
            "Unknown render backend '{}'. Available: mock, http",
            name
        ))),
    }
}
