//! Cardforge Core - Foundational types for the Cardforge set generator
//!
//! This crate provides the types that all other Cardforge crates depend on:
//! - `Card` - The generated card entity (playable card or basic land)
//! - `Color`, `Rarity` - Classification enums
//! - `ContentHash` - SHA-256 based artifact hashing
//! - Error types and Result alias

mod card;
mod error;
mod hash;

pub use card::{sanitize_name, Card, Color, Rarity};
pub use error::{ForgeError, Result};
pub use hash::ContentHash;
