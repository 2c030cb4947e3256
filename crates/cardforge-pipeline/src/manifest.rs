//! Art manifest for tracking commissioned images
//!
//! Records every saved card image with its provenance (backend, prompt,
//! attempt count, content hash, time) for reproducibility and auditing.

use crate::timefmt;
use cardforge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A record of a single commissioned image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtManifestEntry {
    pub card_name: String,
    pub backend: String,
    pub prompt: String,
    /// 1-based attempt on which the image succeeded
    pub attempts: u32,
    pub content_hash: String,
    pub generated_at: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Manifest covering all images in one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtManifest {
    pub generated_at: String,
    pub set_id: String,
    pub entries: Vec<ArtManifestEntry>,
}

/// TOML wrapper
#[derive(Debug, Serialize, Deserialize)]
struct ManifestFile {
    manifest: ArtManifest,
}

impl ArtManifest {
    pub fn new(set_id: &str) -> Self {
        Self {
            generated_at: timefmt::now_iso8601(),
            set_id: set_id.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn add_entry(&mut self, entry: ArtManifestEntry) {
        self.entries.push(entry);
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: ManifestFile = toml::from_str(&content)
            .map_err(|e| ForgeError::Checkpoint(format!("Failed to parse manifest: {}", e)))?;
        Ok(file.manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = ManifestFile {
            manifest: self.clone(),
        };
        let content = toml::to_string_pretty(&file)
            .map_err(|e| ForgeError::Checkpoint(format!("Failed to serialize manifest: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cardforge_manifest_test_{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_manifest_roundtrip() {
        let dir = temp_dir();
        let path = dir.join("art_manifest.toml");

        let mut manifest = ArtManifest::new("20260829_120000");
        manifest.add_entry(ArtManifestEntry {
            card_name: "Tide Caller".to_string(),
            backend: "comfy".to_string(),
            prompt: "Oil on canvas painting of a merfolk.".to_string(),
            attempts: 2,
            content_hash: "sha256:abc123".to_string(),
            generated_at: manifest.generated_at.clone(),
            image_path: Some("output/20260829_120000/Tide_Caller.png".to_string()),
        });

        manifest.save(&path).unwrap();
        let loaded = ArtManifest::load(&path).unwrap();

        assert_eq!(loaded.set_id, "20260829_120000");
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].card_name, "Tide Caller");
        assert_eq!(loaded.entries[0].attempts, 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_manifest_empty() {
        let manifest = ArtManifest::new("s");
        assert!(manifest.entries.is_empty());
        assert!(manifest.generated_at.contains('T'));
    }
}
