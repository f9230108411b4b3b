use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::canvas::{Grid, MAX_GRID_SIZE};
use crate::catalog::SavedWork;
use crate::components::colors::{Color, GRID_LINE, WHITE, cell_strings};
use crate::error::{Error, Result};
use crate::log_warn;

/// Magnification used for PNG export when the caller has no preference.
pub const DEFAULT_EXPORT_SCALE: u32 = 20;

/// Largest exported image side, in pixels.
pub const MAX_EXPORT_SIDE: u32 = 16_384;

/// Query parameter that carries the share token.
pub const SHARE_PARAM: &str = "art";

// ============================================================================
// SAVED-WORK RECORDS
// ============================================================================

/// Snapshot the grid into an immutable catalog record.
pub fn to_record(grid: &Grid, name: &str, id: u64, timestamp: DateTime<Utc>) -> Result<SavedWork> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    Ok(SavedWork {
        id,
        name: name.to_string(),
        created_at: timestamp,
        grid_size: grid.size(),
        cells: grid.to_color_sequence(),
        painted_count: grid.painted_count(),
    })
}

// ============================================================================
// SHARE TOKENS
// ============================================================================

/// Payload of a share token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedArt {
    pub grid_size: usize,
    #[serde(with = "cell_strings")]
    pub cells: Vec<Option<Color>>,
    pub timestamp: DateTime<Utc>,
}

impl SharedArt {
    /// Rebuild a grid from the payload. Shape was checked when the token was decoded.
    pub fn to_grid(&self) -> Result<Grid> {
        Grid::from_cells(self.grid_size, self.cells.clone())
    }
}

/// Encode the grid as URL-safe base64 of its JSON snapshot.
pub fn to_share_token(grid: &Grid, timestamp: DateTime<Utc>) -> Result<String> {
    let art = SharedArt {
        grid_size: grid.size(),
        cells: grid.to_color_sequence(),
        timestamp,
    };
    let json = serde_json::to_vec(&art)?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(json))
}

/// Decode a share token.
///
/// Accepts URL-safe or standard base64, with or without `=` padding. A `+` that a
/// query-string decoder turned into a space is also accepted. Every failure comes back
/// as [`Error::Decode`].
pub fn from_share_token(token: &str) -> Result<SharedArt> {
    let normalized: String = token
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    if normalized.is_empty() {
        return Err(Error::Decode("token is empty".into()));
    }

    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| Error::Decode(format!("bad base64: {}", e)))?;
    let json = String::from_utf8(bytes).map_err(|e| Error::Decode(format!("bad UTF-8: {}", e)))?;
    let art: SharedArt =
        serde_json::from_str(&json).map_err(|e| Error::Decode(format!("bad payload: {}", e)))?;

    if art.grid_size == 0 || art.grid_size > MAX_GRID_SIZE {
        return Err(Error::Decode(format!(
            "gridSize must be between 1 and {}, got {}",
            MAX_GRID_SIZE, art.grid_size
        )));
    }
    let expected = art.grid_size.checked_mul(art.grid_size);
    if expected != Some(art.cells.len()) {
        return Err(Error::Decode(format!(
            "{} cells do not fill a {}x{} grid",
            art.cells.len(),
            art.grid_size,
            art.grid_size
        )));
    }
    Ok(art)
}

/// `base` with `?art=<token>` (or `&art=` when `base` already has a query).
pub fn share_url(base: &str, token: &str) -> Result<String> {
    let mut url = url::Url::parse(base).map_err(|e| Error::Decode(format!("bad base URL: {}", e)))?;
    url.query_pairs_mut().append_pair(SHARE_PARAM, token);
    Ok(url.into())
}

/// Pull the share token out of a full share URL.
pub fn token_from_url(share_url: &str) -> Result<String> {
    let url =
        url::Url::parse(share_url).map_err(|e| Error::Decode(format!("bad share URL: {}", e)))?;
    url.query_pairs()
        .find(|(k, _)| k == SHARE_PARAM)
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| Error::Decode(format!("URL has no '{}' parameter", SHARE_PARAM)))
}

// ============================================================================
// RASTER EXPORT
// ============================================================================

/// Render the grid as `size * cell_px` square pixels.
///
/// Each cell is a flat square of its color (white when empty or unreadable). Grid lines
/// are 1 px light gray: the top and left edge of every cell, plus the right and bottom
/// edge of the whole image. The image side may not exceed [`MAX_EXPORT_SIDE`].
pub fn to_raster_image(grid: &Grid, cell_px: u32) -> Result<RgbaImage> {
    let side = u32::try_from(grid.size())
        .ok()
        .and_then(|size| size.checked_mul(cell_px))
        .filter(|&side| side > 0 && side <= MAX_EXPORT_SIDE)
        .ok_or(Error::InvalidSize(cell_px as usize))?;
    let mut img = RgbaImage::from_pixel(side, side, WHITE);

    for (x, y, cell) in grid.iter() {
        let fill = cell.map(resolve_or_white).unwrap_or(WHITE);
        let x0 = x as u32 * cell_px;
        let y0 = y as u32 * cell_px;
        for py in y0..y0 + cell_px {
            for px in x0..x0 + cell_px {
                let on_line = px == x0 || py == y0 || px == side - 1 || py == side - 1;
                img.put_pixel(px, py, if on_line { GRID_LINE } else { fill });
            }
        }
    }
    Ok(img)
}

fn resolve_or_white(color: &Color) -> Rgba<u8> {
    color.to_rgba().unwrap_or_else(|| {
        log_warn!("Unreadable color '{}' exported as white", color);
        WHITE
    })
}

/// Render and write the grid as a PNG file.
pub fn export_png(grid: &Grid, cell_px: u32, path: &Path) -> Result<()> {
    let image = to_raster_image(grid, cell_px)?;
    write_png(&image, path)
}

/// Encode an RGBA image as PNG at `path`.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    PngEncoder::new(writer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tools::{BrushSize, paint_stroke};
    use crate::ops::patterns::fill;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 123_000_000).unwrap()
    }

    fn red() -> Color {
        Color::new("#FF0000").unwrap()
    }

    #[test]
    fn record_snapshots_grid() {
        let mut grid = Grid::new(8).unwrap();
        paint_stroke(&mut grid, (3, 3), BrushSize::Medium, &red()).unwrap();
        let work = to_record(&grid, "  Heart  ", 42, at(1_700_000_000)).unwrap();
        assert_eq!(work.id, 42);
        assert_eq!(work.name, "Heart");
        assert_eq!(work.grid_size, 8);
        assert_eq!(work.painted_count, 9);
        assert_eq!(work.cells, grid.to_color_sequence());

        // Later edits never reach the snapshot.
        grid.clear();
        assert_eq!(work.painted_count, 9);
        assert!(work.cells.iter().any(Option::is_some));
    }

    #[test]
    fn record_requires_a_name() {
        let grid = Grid::new(8).unwrap();
        assert!(matches!(to_record(&grid, "   ", 1, at(0)), Err(Error::EmptyName)));
    }

    #[test]
    fn share_token_round_trips() {
        let empty = Grid::new(8).unwrap();
        let mut full = Grid::new(16).unwrap();
        fill(&mut full, &Color::new("rgb(34, 139, 34)").unwrap());
        let mut mixed = Grid::new(24).unwrap();
        paint_stroke(&mut mixed, (0, 0), BrushSize::Large, &red()).unwrap();
        mixed.set(23, 23, Color::new("#0f0")).unwrap();

        for grid in [empty, full, mixed] {
            let token = to_share_token(&grid, at(1_720_000_000)).unwrap();
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            let art = from_share_token(&token).unwrap();
            assert_eq!(art.grid_size, grid.size());
            assert_eq!(art.cells, grid.to_color_sequence());
            assert_eq!(art.timestamp, at(1_720_000_000));
            assert_eq!(art.to_grid().unwrap(), grid);
        }
    }

    #[test]
    fn share_token_survives_non_ascii_colors() {
        let mut grid = Grid::new(2).unwrap();
        grid.set(0, 0, Color::new("红色")).unwrap();
        let token = to_share_token(&grid, at(5)).unwrap();
        let art = from_share_token(&token).unwrap();
        assert_eq!(art.cells[0].as_ref().map(Color::as_str), Some("红色"));
    }

    #[test]
    fn standard_padded_base64_is_accepted() {
        let json = r##"{"gridSize":1,"cells":["#FFF"],"timestamp":"2024-05-01T10:00:00.000Z"}"##;
        let token = general_purpose::STANDARD.encode(json);
        let art = from_share_token(&token).unwrap();
        assert_eq!(art.grid_size, 1);
        assert_eq!(art.cells, vec![Color::new("#FFF")]);
    }

    #[test]
    fn malformed_tokens_are_decode_errors() {
        let encode = |s: &str| general_purpose::URL_SAFE_NO_PAD.encode(s);
        let cases = [
            String::new(),
            "!!!not base64!!!".to_string(),
            general_purpose::URL_SAFE_NO_PAD.encode([0xFF, 0xFE, 0x00]),
            encode("not json"),
            encode(r#"{"cells":[],"timestamp":"2024-05-01T10:00:00Z"}"#),
            encode(r#"{"gridSize":0,"cells":[],"timestamp":"2024-05-01T10:00:00Z"}"#),
            encode(r#"{"gridSize":2,"cells":["","",""],"timestamp":"2024-05-01T10:00:00Z"}"#),
            encode(r#"{"gridSize":1,"cells":[""],"timestamp":"yesterday"}"#),
        ];
        for token in cases {
            assert!(
                matches!(from_share_token(&token), Err(Error::Decode(_))),
                "token {token:?} should fail"
            );
        }
    }

    #[test]
    fn share_urls_carry_the_token() {
        let grid = Grid::new(8).unwrap();
        let token = to_share_token(&grid, at(9)).unwrap();
        let url = share_url("https://example.com/board/index.html", &token).unwrap();
        assert!(url.starts_with("https://example.com/board/index.html?art="));
        assert_eq!(token_from_url(&url).unwrap(), token);

        let with_query = share_url("https://example.com/?lang=zh", &token).unwrap();
        assert_eq!(token_from_url(&with_query).unwrap(), token);

        assert!(matches!(
            token_from_url("https://example.com/?lang=zh"),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn raster_draws_cells_and_grid_lines() {
        let mut grid = Grid::new(2).unwrap();
        grid.set(1, 0, Some(red())).unwrap();
        let img = to_raster_image(&grid, 10).unwrap();
        assert_eq!(img.dimensions(), (20, 20));

        // Cell interiors.
        assert_eq!(*img.get_pixel(5, 5), WHITE);
        assert_eq!(*img.get_pixel(15, 5), Rgba([255, 0, 0, 255]));
        // Lines: cell edges and the outer right/bottom border.
        assert_eq!(*img.get_pixel(10, 5), GRID_LINE);
        assert_eq!(*img.get_pixel(5, 0), GRID_LINE);
        assert_eq!(*img.get_pixel(19, 15), GRID_LINE);
        assert_eq!(*img.get_pixel(15, 19), GRID_LINE);
    }

    #[test]
    fn raster_rejects_zero_scale() {
        let grid = Grid::new(2).unwrap();
        assert!(matches!(to_raster_image(&grid, 0), Err(Error::InvalidSize(0))));
    }

    #[test]
    fn raster_rejects_scales_past_the_export_limit() {
        let grid = Grid::new(16).unwrap();
        for scale in [MAX_EXPORT_SIDE / 16 + 1, 300_000_000, u32::MAX] {
            assert!(
                matches!(to_raster_image(&grid, scale), Err(Error::InvalidSize(s)) if s == scale as usize),
                "scale {scale}"
            );
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        assert!(export_png(&grid, u32::MAX, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn oversized_share_tokens_are_decode_errors() {
        let json = format!(
            r#"{{"gridSize":{},"cells":[],"timestamp":"2024-05-01T10:00:00Z"}}"#,
            MAX_GRID_SIZE + 1
        );
        let token = general_purpose::URL_SAFE_NO_PAD.encode(json);
        assert!(matches!(from_share_token(&token), Err(Error::Decode(_))));
    }

    #[test]
    fn unreadable_colors_export_white() {
        let mut grid = Grid::new(1).unwrap();
        grid.set(0, 0, Color::new("no-such-color")).unwrap();
        let img = to_raster_image(&grid, 4).unwrap();
        assert_eq!(*img.get_pixel(1, 1), WHITE);
    }

    #[test]
    fn png_export_writes_a_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.png");
        let mut grid = Grid::new(8).unwrap();
        paint_stroke(&mut grid, (4, 4), BrushSize::Large, &red()).unwrap();

        export_png(&grid, DEFAULT_EXPORT_SCALE, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (160, 160));
        assert_eq!(*decoded.get_pixel(90, 90), Rgba([255, 0, 0, 255]));
    }
}
