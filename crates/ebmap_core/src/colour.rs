//! `#rrggbb` display colours used by hotspots and enemy map groups

use crate::error::FormatError;
use image::Rgb;

/// Parse `#rrggbb` (the `#` is optional)
pub fn parse_hex_colour(text: &str) -> Result<Rgb<u8>, FormatError> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(FormatError::Invalid(format!("invalid colour {:?}", text)));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| FormatError::Invalid(format!("invalid colour {:?}", text)))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Format as lowercase `#rrggbb`
pub fn hex_colour(colour: Rgb<u8>) -> String {
    let Rgb([r, g, b]) = colour;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Serde adapter for an optional colour stored as `#rrggbb`
pub mod optional_hex {
    use super::{hex_colour, parse_hex_colour};
    use image::Rgb;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Rgb<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(colour) => s.serialize_str(&hex_colour(*colour)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Rgb<u8>>, D::Error> {
        let text: Option<String> = Option::deserialize(d)?;
        text.map(|t| parse_hex_colour(&t).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        assert_eq!(parse_hex_colour("#3C3C50").unwrap(), Rgb([0x3c, 0x3c, 0x50]));
        assert_eq!(parse_hex_colour("ff0000").unwrap(), Rgb([255, 0, 0]));
        assert_eq!(hex_colour(Rgb([1, 2, 255])), "#0102ff");
        assert!(parse_hex_colour("#12345").is_err());
        assert!(parse_hex_colour("#12345z").is_err());
    }
}
