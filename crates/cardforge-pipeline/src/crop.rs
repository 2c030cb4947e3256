//! Aspect-ratio center crop for fetched art
//!
//! Card frames expect 5:4 art; Saga layouts run the art down the right
//! side of the card and need a vertical 4:5 composition instead. The crop
//! keeps the center portion and is a pure function on the fetched bytes.

use cardforge_core::{ForgeError, Result};
use std::io::Cursor;

/// Target aspect ratio for card art
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// 5:4, the standard horizontal card art frame
    Standard,
    /// 4:5, the vertical frame used by Saga layouts
    Tall,
}

impl AspectRatio {
    fn value(self) -> f64 {
        match self {
            AspectRatio::Standard => 5.0 / 4.0,
            AspectRatio::Tall => 4.0 / 5.0,
        }
    }

    /// Latent dimensions to request from the image backend; generation
    /// happens slightly wider/taller than the final frame and the crop
    /// takes care of the rest.
    pub fn generation_size(self) -> (u32, u32) {
        match self {
            AspectRatio::Standard => (1024, 768),
            AspectRatio::Tall => (768, 1024),
        }
    }
}

/// Center-crop image bytes to the target ratio.
///
/// Bytes already within 1% of the target ratio are returned unchanged.
pub fn crop_to_ratio(image_data: &[u8], ratio: AspectRatio) -> Result<Vec<u8>> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| ForgeError::Fetch(format!("Failed to decode image: {}", e)))?;

    let (width, height) = (img.width(), img.height());
    let current_ratio = width as f64 / height as f64;
    let target_ratio = ratio.value();

    if (current_ratio - target_ratio).abs() < 0.01 {
        return Ok(image_data.to_vec());
    }

    let cropped = if current_ratio > target_ratio {
        // Too wide: crop width
        let new_width = (height as f64 * target_ratio) as u32;
        let left = (width - new_width) / 2;
        img.crop_imm(left, 0, new_width, height)
    } else {
        // Too tall: crop height
        let new_height = (width as f64 / target_ratio) as u32;
        let top = (height - new_height) / 2;
        img.crop_imm(0, top, width, new_height)
    };

    let mut out = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| ForgeError::Fetch(format!("Failed to encode cropped image: {}", e)))?;
    Ok(out)
}
