// ============================================================================
// PATTERN STAMPER: stencils, full-canvas fill, preset patterns
// ============================================================================

use crate::canvas::Grid;
use crate::components::colors::Color;
use crate::error::{Error, Result};
use crate::ops::stencils::{Stencil, stencil_for};

/// Overlay `stencil` onto the grid with its top-left corner at `(offset_x, offset_y)`.
///
/// Every inked stencil cell that lands inside the grid is set to `color`; the rest are
/// skipped. Returns the number of cells written.
pub fn stamp(
    grid: &mut Grid,
    stencil: &Stencil,
    color: &Color,
    offset_x: i64,
    offset_y: i64,
) -> usize {
    let size = grid.size() as i64;
    let mut written = 0;
    for (px, py) in stencil.inked() {
        let tx = offset_x + px as i64;
        let ty = offset_y + py as i64;
        if tx < 0 || ty < 0 || tx >= size || ty >= size {
            continue;
        }
        let i = ty as usize * grid.size() + tx as usize;
        grid.write_index(i, Some(color.clone()));
        written += 1;
    }
    written
}

/// Set every cell to `color`. Returns how many cells went from unpainted to painted.
pub fn fill(grid: &mut Grid, color: &Color) -> usize {
    let before = grid.painted_count();
    for i in 0..grid.cell_count() {
        grid.write_index(i, Some(color.clone()));
    }
    grid.painted_count() - before
}

// ============================================================================
// Presets
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    Heart,
    Smiley,
    /// Blue / white / red vertical tricolor, computed for any grid size.
    Flag,
    House,
    Tree,
}

const FLAG_STRIPES: [&str; 3] = ["#0000FF", "#FFFFFF", "#FF0000"];

impl Pattern {
    pub fn all() -> &'static [Pattern] {
        &[
            Pattern::Heart,
            Pattern::Smiley,
            Pattern::Flag,
            Pattern::House,
            Pattern::Tree,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Heart => "heart",
            Pattern::Smiley => "smiley",
            Pattern::Flag => "flag",
            Pattern::House => "house",
            Pattern::Tree => "tree",
        }
    }

    pub fn parse(name: &str) -> Option<Pattern> {
        Pattern::all()
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Ink color for stencil patterns. The flag has its own stripe palette.
    pub fn ink(&self) -> Option<Color> {
        let hex = match self {
            Pattern::Heart => "#FF0000",
            Pattern::Smiley => "#FFFF00",
            Pattern::House => "#FFA500",
            Pattern::Tree => "#228B22",
            Pattern::Flag => return None,
        };
        Some(Color::from_static(hex))
    }
}

/// Replace the grid content with `pattern`: clear, then stamp at the origin.
///
/// The grid is left untouched when the pattern has no stencil for this size.
/// Returns the painted count afterwards.
pub fn apply_preset(grid: &mut Grid, pattern: Pattern) -> Result<usize> {
    match pattern.ink() {
        None => {
            grid.clear();
            draw_flag(grid);
        }
        Some(ink) => {
            let stencil = stencil_for(pattern, grid.size()).ok_or(Error::NoStencil {
                pattern: pattern.name(),
                size: grid.size(),
            })?;
            grid.clear();
            stamp(grid, &stencil, &ink, 0, 0);
        }
    }
    Ok(grid.painted_count())
}

/// Three vertical stripes, `size / 3` wide; the last stripe takes the remainder.
fn draw_flag(grid: &mut Grid) {
    let size = grid.size();
    let third = size / 3;
    let stripes = FLAG_STRIPES.map(Color::from_static);
    for i in 0..grid.cell_count() {
        let x = i % size;
        let stripe = if x < third {
            0
        } else if x < 2 * third {
            1
        } else {
            2
        };
        grid.write_index(i, Some(stripes[stripe].clone()));
    }
}
