//! Content-based hashing for artifact provenance

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// A SHA-256 content hash.
///
/// Recorded in the art manifest so a generated image can be tied back to
/// the prompt and backend that produced it.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute a hash from bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Compute a hash from a file's contents
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(&data))
    }

    /// Get the hash as a hex string
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the hash as a prefixed hex string (e.g., "sha256:abcdef...")
    pub fn to_prefixed_hex(&self) -> String {
        format!("sha256:{}", self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let a = ContentHash::from_bytes(b"card art");
        let b = ContentHash::from_bytes(b"card art");
        let c = ContentHash::from_bytes(b"other art");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_prefixed_hex() {
        let h = ContentHash::from_bytes(b"x");
        let hex = h.to_prefixed_hex();
        assert!(hex.starts_with("sha256:"));
        assert_eq!(hex.len(), 7 + 64);
    }
}
