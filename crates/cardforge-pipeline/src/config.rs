//! Layered configuration system
//!
//! Backend settings are loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `CARDFORGE_{BACKEND}_URL` / `CARDFORGE_{BACKEND}_API_KEY`
//! 2. Project-local: `.cardforge/config.toml`
//! 3. Global: `~/.cardforge/config.toml`
//!
//! `RunConfig` is separate: it holds the per-run parameters (batch counts,
//! rarity quotas, land generation) and stays immutable for the run's
//! lifetime. Backend clients are constructed from `ForgeConfig` in a
//! second phase and passed into components alongside it.

use crate::timefmt;
use cardforge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Target color-balance weights for synthesis (conceptually summing to 1.0,
/// not enforced)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorWeights {
    #[serde(rename = "W")]
    pub white: f64,
    #[serde(rename = "U")]
    pub blue: f64,
    #[serde(rename = "B")]
    pub black: f64,
    #[serde(rename = "R")]
    pub red: f64,
    #[serde(rename = "G")]
    pub green: f64,
}

impl Default for ColorWeights {
    fn default() -> Self {
        Self {
            white: 0.2,
            blue: 0.2,
            black: 0.2,
            red: 0.2,
            green: 0.2,
        }
    }
}

/// Immutable per-run parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Path to the inspiration card CSV
    pub csv_file_path: PathBuf,
    /// How many inspiration cards to sample for theme/synthesis context
    pub inspiration_cards_count: usize,
    /// Number of batches to generate
    pub batches_count: u32,
    /// Optional prompt used to generate the set theme
    #[serde(default)]
    pub theme_prompt: Option<String>,
    /// Complete theme text supplied verbatim; takes precedence over
    /// `theme_prompt`
    #[serde(default)]
    pub complete_theme_override: Option<String>,
    /// Identifier for this run, used in the output directory name
    pub set_id: String,
    /// Directory receiving checkpoints, side files and images
    pub output_dir: PathBuf,

    // Basic land generation
    pub generate_basic_lands: bool,
    pub land_variations_per_type: u32,

    // Rarity quotas per batch
    pub mythics_per_batch: u32,
    pub rares_per_batch: u32,
    pub uncommons_per_batch: u32,
    pub commons_per_batch: u32,

    #[serde(default)]
    pub color_weights: ColorWeights,

    /// Total art attempts per card before soft failure
    pub max_art_attempts: u32,
    /// Delay between art attempts, in seconds
    pub art_retry_delay_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        let set_id = timefmt::now_compact();
        let output_dir = PathBuf::from("output").join(&set_id);
        Self {
            csv_file_path: PathBuf::from("assets/cards_english.csv"),
            inspiration_cards_count: 50,
            batches_count: 20,
            theme_prompt: None,
            complete_theme_override: None,
            set_id,
            output_dir,
            generate_basic_lands: true,
            land_variations_per_type: 3,
            mythics_per_batch: 1,
            rares_per_batch: 3,
            uncommons_per_batch: 4,
            commons_per_batch: 5,
            color_weights: ColorWeights::default(),
            max_art_attempts: 5,
            art_retry_delay_secs: 3,
        }
    }
}

impl RunConfig {
    /// Full path for an output file
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    /// Cards per batch implied by the rarity quotas
    pub fn cards_per_batch(&self) -> u32 {
        self.mythics_per_batch
            + self.rares_per_batch
            + self.uncommons_per_batch
            + self.commons_per_batch
    }

    /// Load a run config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content).map_err(|e| {
            ForgeError::Config(format!("Failed to parse run config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }
}

/// Per-backend connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Model and polling defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_main_model")]
    pub main_model: String,
    #[serde(default = "default_json_model")]
    pub json_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    /// Image job poll interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Image job completion budget in seconds
    #[serde(default = "default_job_timeout")]
    pub job_timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            main_model: default_main_model(),
            json_model: default_json_model(),
            image_model: default_image_model(),
            poll_interval_secs: default_poll_interval(),
            job_timeout_secs: default_job_timeout(),
        }
    }
}

fn default_main_model() -> String {
    "gemma3:12b".to_string()
}
fn default_json_model() -> String {
    "gemma3:4b".to_string()
}
fn default_image_model() -> String {
    "flux1-dev".to_string()
}
fn default_poll_interval() -> u64 {
    2
}
fn default_job_timeout() -> u64 {
    300
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgeConfigFile {
    #[serde(default)]
    pub backends: HashMap<String, BackendSettings>,
    #[serde(default)]
    pub generation: GenerationSettings,
}

/// Resolved configuration with environment overrides applied
#[derive(Debug, Clone, Default)]
pub struct ForgeConfig {
    pub backends: HashMap<String, BackendSettings>,
    pub generation: GenerationSettings,
}

impl ForgeConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = ForgeConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".cardforge/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config);

        Ok(ForgeConfig {
            backends: config.backends,
            generation: config.generation,
        })
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(ForgeConfig {
            backends: config.backends,
            generation: config.generation,
        })
    }

    /// Get the base URL for a backend (falling back to its default)
    pub fn api_url(&self, backend: &str) -> &str {
        self.backends
            .get(backend)
            .and_then(|b| b.api_url.as_deref())
            .unwrap_or(match backend {
                "completion" => "http://localhost:11434",
                "image" => "http://localhost:8188",
                "render" => "http://localhost:8000",
                _ => "",
            })
    }

    /// Get the API key for a backend, if configured
    pub fn api_key(&self, backend: &str) -> Option<&str> {
        self.backends
            .get(backend)
            .and_then(|b| b.api_key.as_deref())
    }

    /// Check if a backend is enabled
    pub fn is_enabled(&self, backend: &str) -> bool {
        self.backends.get(backend).map(|b| b.enabled).unwrap_or(true)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".cardforge").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ForgeConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let config: ForgeConfigFile = toml::from_str(&content).map_err(|e| {
            ForgeError::Config(format!(
                "Failed to parse config {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    fn merge_into(base: &mut ForgeConfigFile, overlay: ForgeConfigFile) {
        for (name, settings) in overlay.backends {
            let entry = base.backends.entry(name).or_default();
            if settings.api_url.is_some() {
                entry.api_url = settings.api_url;
            }
            if settings.api_key.is_some() {
                entry.api_key = settings.api_key;
            }
            entry.enabled = settings.enabled;
        }

        if overlay.generation.main_model != default_main_model() {
            base.generation.main_model = overlay.generation.main_model;
        }
        if overlay.generation.json_model != default_json_model() {
            base.generation.json_model = overlay.generation.json_model;
        }
        if overlay.generation.image_model != default_image_model() {
            base.generation.image_model = overlay.generation.image_model;
        }
        if overlay.generation.poll_interval_secs != default_poll_interval() {
            base.generation.poll_interval_secs = overlay.generation.poll_interval_secs;
        }
        if overlay.generation.job_timeout_secs != default_job_timeout() {
            base.generation.job_timeout_secs = overlay.generation.job_timeout_secs;
        }
    }

    fn apply_env_overrides(config: &mut ForgeConfigFile) {
        let backend_names = ["completion", "image", "render"];
        for name in &backend_names {
            let upper = name.to_uppercase();
            if let Ok(url) = std::env::var(format!("CARDFORGE_{}_URL", upper)) {
                let entry = config.backends.entry(name.to_string()).or_default();
                entry.api_url = Some(url);
            }
            if let Ok(key) = std::env::var(format!("CARDFORGE_{}_API_KEY", upper)) {
                let entry = config.backends.entry(name.to_string()).or_default();
                entry.api_key = Some(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("cardforge_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_config_from_file() {
        std::env::remove_var("CARDFORGE_COMPLETION_URL");

        let config_str = r#"
[backends.completion]
api_url = "http://llmbox:11434"
enabled = true

[backends.image]
api_url = "http://gpu-node:8188"
enabled = false

[generation]
main_model = "gemma3:27b"
poll_interval_secs = 5
"#;
        let path = temp_config(config_str);
        let config = ForgeConfig::load_from_file(&path).unwrap();

        assert_eq!(config.api_url("completion"), "http://llmbox:11434");
        assert!(!config.is_enabled("image"));
        assert_eq!(config.generation.main_model, "gemma3:27b");
        assert_eq!(config.generation.poll_interval_secs, 5);
        // Untouched settings keep their defaults
        assert_eq!(config.generation.job_timeout_secs, 300);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_default_urls() {
        let config = ForgeConfig {
            backends: HashMap::new(),
            generation: GenerationSettings::default(),
        };
        assert_eq!(config.api_url("completion"), "http://localhost:11434");
        assert_eq!(config.api_url("image"), "http://localhost:8188");
        assert!(config.is_enabled("image"));
        assert_eq!(config.api_key("image"), None);
    }

    #[test]
    fn test_env_var_override() {
        let config_str = r#"
[backends.render]
api_url = "http://file-configured:8000"
"#;
        let path = temp_config(config_str);

        std::env::set_var("CARDFORGE_RENDER_URL", "http://env-configured:9000");
        let config = ForgeConfig::load_from_file(&path).unwrap();
        assert_eq!(config.api_url("render"), "http://env-configured:9000");
        std::env::remove_var("CARDFORGE_RENDER_URL");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.cards_per_batch(), 13);
        assert_eq!(config.max_art_attempts, 5);
        assert!(config.output_dir.starts_with("output"));
    }

    #[test]
    fn test_run_config_load() {
        let config_str = r#"
csv_file_path = "assets/cards.csv"
inspiration_cards_count = 25
batches_count = 4
set_id = "test_set"
output_dir = "output/test_set"
generate_basic_lands = false
land_variations_per_type = 2
mythics_per_batch = 1
rares_per_batch = 2
uncommons_per_batch = 3
commons_per_batch = 4
max_art_attempts = 3
art_retry_delay_secs = 1
theme_prompt = "Deep sea ruins"
"#;
        let path = temp_config(config_str);
        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.batches_count, 4);
        assert_eq!(config.cards_per_batch(), 10);
        assert!(!config.generate_basic_lands);
        assert_eq!(config.theme_prompt.as_deref(), Some("Deep sea ruins"));

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }
}
