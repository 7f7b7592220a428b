//! Sprite groups and their sheets, used to draw NPCs on the map

use crate::error::FormatError;
use crate::npc::Direction;
use image::{imageops, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

/// Size and palette of one sprite group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteGroup {
    pub width: u32,
    pub height: u32,
    pub palette: u8,
    pub length: u8,
}

/// Persisted sprite group. Unrecognised keys are ignored; the table is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteGroupRecord {
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "Palette")]
    pub palette: u8,
    #[serde(rename = "Length", default)]
    pub length: u8,
}

impl TryFrom<&SpriteGroupRecord> for SpriteGroup {
    type Error = FormatError;

    fn try_from(record: &SpriteGroupRecord) -> Result<Self, FormatError> {
        let invalid = || FormatError::Invalid(format!("invalid sprite size {:?}", record.size));
        let (w, h) = record.size.split_once('x').ok_or_else(invalid)?;
        Ok(SpriteGroup {
            width: w.trim().parse().map_err(|_| invalid())?,
            height: h.trim().parse().map_err(|_| invalid())?,
            palette: record.palette,
            length: record.length,
        })
    }
}

/// A decoded sprite sheet, frames laid out left to right, top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub group: SpriteGroup,
    pub image: RgbaImage,
}

impl SpriteSheet {
    pub fn from_png(group: SpriteGroup, bytes: &[u8]) -> Result<Self, FormatError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| FormatError::Invalid(format!("sprite sheet: {}", e)))?
            .to_rgba8();
        Ok(Self { group, image })
    }

    pub fn frame_count(&self) -> u32 {
        if self.group.width == 0 || self.group.height == 0 {
            return 0;
        }
        (self.image.width() / self.group.width) * (self.image.height() / self.group.height)
    }

    /// Copy out one frame
    pub fn frame(&self, index: u32) -> Option<RgbaImage> {
        if index >= self.frame_count() {
            return None;
        }
        let columns = self.image.width() / self.group.width;
        let x = (index % columns) * self.group.width;
        let y = (index / columns) * self.group.height;
        Some(
            imageops::crop_imm(&self.image, x, y, self.group.width, self.group.height).to_image(),
        )
    }

    /// Standing frame for a facing direction
    pub fn facing(&self, direction: Direction) -> Option<RgbaImage> {
        let index = match direction {
            Direction::Up => 0,
            Direction::Right => 2,
            Direction::Down => 4,
            Direction::Left => 6,
        };
        self.frame(index).or_else(|| self.frame(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn sheet_png() -> Vec<u8> {
        // 4x2 frames of 16x24, frame n filled with red = n * 10
        let mut image = RgbaImage::new(64, 48);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let frame = (y / 24) * 4 + x / 16;
            *pixel = Rgba([(frame * 10) as u8, 0, 0, 255]);
        }
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_size_parsing() {
        let record = SpriteGroupRecord {
            size: "16x24".to_string(),
            palette: 3,
            length: 8,
        };
        let group = SpriteGroup::try_from(&record).unwrap();
        assert_eq!((group.width, group.height), (16, 24));

        let bad = SpriteGroupRecord {
            size: "16by24".to_string(),
            ..record
        };
        assert!(SpriteGroup::try_from(&bad).is_err());
    }

    #[test]
    fn test_frames() {
        let group = SpriteGroup {
            width: 16,
            height: 24,
            palette: 0,
            length: 8,
        };
        let sheet = SpriteSheet::from_png(group, &sheet_png()).unwrap();
        assert_eq!(sheet.frame_count(), 8);
        let frame = sheet.frame(5).unwrap();
        assert_eq!(frame.dimensions(), (16, 24));
        assert_eq!(frame.get_pixel(0, 0).0[0], 50);
        assert!(sheet.frame(8).is_none());
        assert_eq!(sheet.facing(Direction::Left).unwrap().get_pixel(3, 3).0[0], 60);
    }

    #[test]
    fn test_garbage_png_is_format_error() {
        let group = SpriteGroup {
            width: 16,
            height: 16,
            palette: 0,
            length: 0,
        };
        assert!(matches!(
            SpriteSheet::from_png(group, b"not a png"),
            Err(FormatError::Invalid(_))
        ));
    }
}
