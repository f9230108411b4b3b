use image::Rgba;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fallback used wherever an empty or unreadable cell has to be shown.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Light-gray grid lines drawn around every exported cell.
pub const GRID_LINE: Rgba<u8> = Rgba([0xCC, 0xCC, 0xCC, 255]);

// ============================================================================
// Color: an opaque cell color, stored exactly as the user typed it
// ============================================================================

/// A cell color as a CSS-style string (`#F00`, `#FF0000`, `rgb(255, 0, 0)`, `red`).
///
/// The string is passed through untouched so saved works and share tokens round-trip
/// byte-for-byte. [`Color::to_rgba`] resolves it only when pixels are needed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color(String);

impl Color {
    /// Returns `None` for an empty (or all-whitespace) string, which means "unpainted".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// For compile-time palette entries, which are never empty.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to an opaque RGBA pixel.
    pub fn to_rgba(&self) -> Option<Rgba<u8>> {
        parse_css_color(&self.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Cell (de)serialization: empty cells travel as ""
// ============================================================================

/// Serde adapter for `Vec<Option<Color>>` as a flat list of strings.
pub mod cell_strings {
    use super::*;

    pub fn serialize<S: Serializer>(cells: &[Option<Color>], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(cells.iter().map(|c| c.as_ref().map(Color::as_str).unwrap_or("")))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Option<Color>>, D::Error> {
        let raw: Vec<String> = Vec::deserialize(d)?;
        Ok(raw.into_iter().map(Color::new).collect())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

// ============================================================================
// CSS color parsing
// ============================================================================

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("cyan", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("forestgreen", [34, 139, 34]),
];

/// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA` (alpha dropped), `rgb(r, g, b)`, `rgba(r, g, b, a)`
/// and a small set of named colors. Everything comes back fully opaque.
pub fn parse_css_color(input: &str) -> Option<Rgba<u8>> {
    let s = input.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let r = parts[0].parse::<u8>().ok()?;
        let g = parts[1].parse::<u8>().ok()?;
        let b = parts[2].parse::<u8>().ok()?;
        return Some(Rgba([r, g, b, 255]));
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, [r, g, b])| Rgba([*r, *g, *b, 255]))
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let val = u16::from_str_radix(hex, 16).ok()?;
            // Expand each nibble: 0xF -> 0xFF
            let r = ((val >> 8) & 0xF) as u8 * 17;
            let g = ((val >> 4) & 0xF) as u8 * 17;
            let b = (val & 0xF) as u8 * 17;
            Some(Rgba([r, g, b, 255]))
        }
        6 | 8 => {
            let val = u32::from_str_radix(&hex[..6], 16).ok()?;
            let r = ((val >> 16) & 0xFF) as u8;
            let g = ((val >> 8) & 0xFF) as u8;
            let b = (val & 0xFF) as u8;
            Some(Rgba([r, g, b, 255]))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_mean_unpainted() {
        assert!(Color::new("").is_none());
        assert!(Color::new("   ").is_none());
        assert_eq!(Color::new("#FF0000").unwrap().as_str(), "#FF0000");
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_css_color("#FF0000"), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(parse_css_color("#0f0"), Some(Rgba([0, 255, 0, 255])));
        assert_eq!(parse_css_color("#228B22"), Some(Rgba([34, 139, 34, 255])));
        assert_eq!(parse_css_color("#228B2280"), Some(Rgba([34, 139, 34, 255])));
        assert_eq!(parse_css_color("#12345"), None);
        assert_eq!(parse_css_color("#GGGGGG"), None);
    }

    #[test]
    fn parses_browser_normalized_rgb() {
        // Browsers hand back background colors as rgb(...), so saved works contain these.
        assert_eq!(parse_css_color("rgb(255, 165, 0)"), Some(Rgba([255, 165, 0, 255])));
        assert_eq!(parse_css_color("RGBA(1,2,3,0.5)"), Some(Rgba([1, 2, 3, 255])));
        assert_eq!(parse_css_color("rgb(300, 0, 0)"), None);
        assert_eq!(parse_css_color("rgb(1, 2)"), None);
    }

    #[test]
    fn parses_named_colors_case_insensitively() {
        assert_eq!(parse_css_color("Red"), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(parse_css_color("forestgreen"), Some(Rgba([34, 139, 34, 255])));
        assert_eq!(parse_css_color("papayawhip-ish"), None);
    }

    #[test]
    fn cells_serialize_empty_as_blank_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "cell_strings")]
            cells: Vec<Option<Color>>,
        }

        let w = Wrapper { cells: vec![Color::new("#FFF"), None] };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r##"{"cells":["#FFF",""]}"##);

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cells, w.cells);
    }
}
