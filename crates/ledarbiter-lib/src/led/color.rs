//! Color parsing and formatting for light requests.
//!
//! Request colors use the host format `0xAARRGGBB`; the alpha byte is ignored
//! everywhere, so parsed colors come back as `0x00RRGGBB`.

use serde::Serialize;

/// One zone's three channel levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Unpack `0xAARRGGBB`, dropping the alpha byte.
    pub fn from_packed(color: u32) -> Self {
        Rgb {
            r: ((color >> 16) & 0xFF) as u8,
            g: ((color >> 8) & 0xFF) as u8,
            b: (color & 0xFF) as u8,
        }
    }

    /// Levels in R, G, B write order.
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Parse a color string into `0x00RRGGBB`.
///
/// Accepts:
/// - Hex: `"#FF0000"`, `"FF0000"`, `"#ff0000"`
/// - Named: `"red"`, `"green"`, `"blue"`, `"white"`, `"orange"`, `"yellow"`, `"purple"`, `"cyan"`, `"off"`
pub fn parse_color(s: &str) -> crate::error::Result<u32> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "red" => return Ok(0x00FF_0000),
        "green" => return Ok(0x0000_FF00),
        "blue" => return Ok(0x0000_00FF),
        "white" => return Ok(0x00FF_FFFF),
        "orange" => return Ok(0x00FF_8000),
        "yellow" => return Ok(0x00FF_FF00),
        "purple" => return Ok(0x0080_00FF),
        "cyan" => return Ok(0x0000_FFFF),
        "off" | "black" => return Ok(0),
        _ => {}
    }

    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(crate::LightsError::Color(format!(
            "Invalid color: {s} (use #RRGGBB or a color name)"
        )));
    }
    u32::from_str_radix(hex, 16)
        .map_err(|_| crate::LightsError::Color(format!("Invalid hex color: {s}")))
}

/// Format a packed color as `#RRGGBB`.
pub fn format_color(val: u32) -> String {
    let Rgb { r, g, b } = Rgb::from_packed(val);
    format!("#{r:02X}{g:02X}{b:02X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_packed_drops_alpha() {
        assert_eq!(Rgb::from_packed(0xFF11_2233), Rgb::new(0x11, 0x22, 0x33));
    }

    #[test]
    fn channels_in_write_order() {
        assert_eq!(Rgb::new(1, 2, 3).channels(), [1, 2, 3]);
    }

    #[test]
    fn parse_named() {
        assert_eq!(parse_color("red").unwrap(), 0x00FF_0000);
        assert_eq!(parse_color("green").unwrap(), 0x0000_FF00);
        assert_eq!(parse_color("blue").unwrap(), 0x0000_00FF);
        assert_eq!(parse_color("off").unwrap(), 0);
        assert_eq!(parse_color("black").unwrap(), 0);
    }

    #[test]
    fn parse_named_case_insensitive() {
        assert_eq!(parse_color("  Orange ").unwrap(), 0x00FF_8000);
    }

    #[test]
    fn parse_hex_with_and_without_hash() {
        assert_eq!(parse_color("#123456").unwrap(), 0x0012_3456);
        assert_eq!(parse_color("abcdef").unwrap(), 0x00AB_CDEF);
    }

    #[test]
    fn parse_invalid() {
        assert!(parse_color("#FFF").is_err());
        assert!(parse_color("#FF000000").is_err());
        assert!(parse_color("chartreuse").is_err());
        assert!(parse_color("#GGHHII").is_err());
    }

    #[test]
    fn parse_rejects_sign_prefix() {
        assert!(parse_color("+12345").is_err());
        assert!(parse_color("#+12345").is_err());
        assert!(parse_color("-12345").is_err());
    }

    #[test]
    fn format_ignores_alpha() {
        assert_eq!(format_color(0xFF00_FF00), "#00FF00");
        assert_eq!(format_color(0), "#000000");
    }

    #[test]
    fn parse_format_roundtrip_hex() {
        let val = parse_color("#AB12CD").unwrap();
        assert_eq!(format_color(val), "#AB12CD");
    }
}
