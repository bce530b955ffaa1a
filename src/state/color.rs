use egui::Color32;

use crate::error::{DesignerError, Result};

/// Parses opaque CSS hex notation: `#rgb` or `#rrggbb`
pub fn parse_hex_color(value: &str) -> Result<Color32> {
    let invalid = || DesignerError::InvalidColor(value.to_owned());
    let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(digits.chars()) {
                let nibble = c.to_digit(16).ok_or_else(invalid)? as u8;
                *slot = nibble * 17;
            }
            Ok(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => Ok(Color32::from_rgb(byte(&digits[0..2])?, byte(&digits[2..4])?, byte(&digits[4..6])?)),
        _ => Err(invalid()),
    }
}

/// Lowercase `#rrggbb`. Alpha is not part of the format.
pub fn format_hex_color(color: Color32) -> String {
    let [r, g, b, _] = opaque(color).to_array();
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Drops the alpha channel, keeping the unmultiplied color
pub fn opaque(color: Color32) -> Color32 {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(parse_hex_color("#fff").unwrap(), Color32::WHITE);
        assert_eq!(parse_hex_color("#FF6347").unwrap(), Color32::from_rgb(0xff, 0x63, 0x47));
        assert_eq!(parse_hex_color(" #000000 ").unwrap(), Color32::BLACK);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "fff", "#ff", "#gggggg", "#12345", "red", "#ffé", "#12345680", "#ff000000"] {
            assert!(parse_hex_color(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn formats_lowercase() {
        assert_eq!(format_hex_color(Color32::from_rgb(0xDD, 0xA0, 0xDD)), "#dda0dd");
        assert_eq!(format_hex_color(parse_hex_color("#4682B4").unwrap()), "#4682b4");
    }

    #[test]
    fn every_accepted_string_formats_back_unchanged() {
        for hex in ["#123456", "#abcdef", "#ff0000", "#000000", "#fffffe"] {
            assert_eq!(format_hex_color(parse_hex_color(hex).unwrap()), hex);
        }
    }
}
