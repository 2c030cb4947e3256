//! Card rendering backend
//!
//! Rendering turns a converted card description (JSON side file) into a
//! finished card image. The engine itself is external; the pipeline only
//! hands over the batch's description files and waits for completion.

use crate::config::ForgeConfig;
use cardforge_core::{ForgeError, Result};
use std::path::PathBuf;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 300;

/// The rendering engine seam. Invoked once per batch with the full set of
/// converted descriptions; returns only when every card image is produced.
pub trait RenderBackend: Send {
    /// Backend name for progress output
    fn name(&self) -> &str;

    /// Render all of the given card descriptions
    fn render(&self, description_paths: &[PathBuf]) -> Result<()>;
}

/// HTTP render service client: posts each description document to the
/// service's `/render` endpoint.
pub struct HttpRenderBackend {
    base_url: String,
}

impl HttpRenderBackend {
    pub fn from_config(config: &ForgeConfig) -> Self {
        Self {
            base_url: config.api_url("render").to_string(),
        }
    }
}

impl RenderBackend for HttpRenderBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn render(&self, description_paths: &[PathBuf]) -> Result<()> {
        let url = format!("{}/render", self.base_url);

        for path in description_paths {
            let content = std::fs::read_to_string(path)?;
            let document: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
                ForgeError::Backend(format!(
                    "Invalid card description {}: {}",
                    path.display(),
                    e
                ))
            })?;

            let agent = build_agent();
            agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send_json(&document)
                .map_err(|e| {
                    ForgeError::Backend(format!(
                        "Render request for {} failed: {}",
                        path.display(),
                        e
                    ))
                })?;
        }

        Ok(())
    }
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}
