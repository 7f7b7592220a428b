//! 8x8 4bpp minitiles

use serde::{Deserialize, Serialize};

/// Width and height of a minitile in pixels
pub const MINITILE_SIZE: usize = 8;
/// Pixels per minitile layer
pub const MINITILE_PIXELS: usize = MINITILE_SIZE * MINITILE_SIZE;

/// Which of the two minitile layers a pixel belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinitileLayer {
    Background,
    Foreground,
}

/// An 8x8 bitmap of subpalette indices (0-15), with no palette attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minitile {
    pub background: Vec<u8>,
    pub foreground: Vec<u8>,
}

impl Default for Minitile {
    fn default() -> Self {
        Self {
            background: vec![0; MINITILE_PIXELS],
            foreground: vec![0; MINITILE_PIXELS],
        }
    }
}

impl Minitile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from two 64-entry index arrays. Entries are masked to 4 bits.
    pub fn from_layers(background: &[u8], foreground: &[u8]) -> Self {
        debug_assert_eq!(background.len(), MINITILE_PIXELS);
        debug_assert_eq!(foreground.len(), MINITILE_PIXELS);
        Self {
            background: background.iter().map(|v| v & 0x0F).collect(),
            foreground: foreground.iter().map(|v| v & 0x0F).collect(),
        }
    }

    pub fn layer(&self, layer: MinitileLayer) -> &[u8] {
        match layer {
            MinitileLayer::Background => &self.background,
            MinitileLayer::Foreground => &self.foreground,
        }
    }

    pub fn layer_mut(&mut self, layer: MinitileLayer) -> &mut [u8] {
        match layer {
            MinitileLayer::Background => &mut self.background,
            MinitileLayer::Foreground => &mut self.foreground,
        }
    }

    /// Get a pixel's colour index
    pub fn pixel(&self, layer: MinitileLayer, x: usize, y: usize) -> u8 {
        assert!(x < MINITILE_SIZE && y < MINITILE_SIZE, "minitile pixel out of range");
        self.layer(layer)[y * MINITILE_SIZE + x]
    }

    /// Set a pixel's colour index
    pub fn set_pixel(&mut self, layer: MinitileLayer, x: usize, y: usize, value: u8) {
        assert!(x < MINITILE_SIZE && y < MINITILE_SIZE, "minitile pixel out of range");
        self.layer_mut(layer)[y * MINITILE_SIZE + x] = value & 0x0F;
    }

    pub fn is_blank(&self) -> bool {
        self.background.iter().chain(&self.foreground).all(|&p| p == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_minitile_is_blank() {
        let minitile = Minitile::new();
        assert_eq!(minitile.background.len(), MINITILE_PIXELS);
        assert_eq!(minitile.foreground.len(), MINITILE_PIXELS);
        assert!(minitile.is_blank());
    }

    #[test]
    fn test_pixel_access_masks_value() {
        let mut minitile = Minitile::new();
        minitile.set_pixel(MinitileLayer::Foreground, 7, 7, 0x1F);
        assert_eq!(minitile.pixel(MinitileLayer::Foreground, 7, 7), 0x0F);
        assert_eq!(minitile.foreground[63], 0x0F);
        assert_eq!(minitile.pixel(MinitileLayer::Background, 7, 7), 0);
    }
}
