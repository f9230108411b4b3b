use crate::canvas::Grid;
use crate::components::colors::Color;
use crate::error::{Error, Result};

// ============================================================================
// Tool modes
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    /// Pressing anywhere floods the whole canvas with the current color.
    Fill,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Eraser => "eraser",
            Tool::Fill => "fill",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Pencil, Tool::Eraser, Tool::Fill]
    }

    pub fn parse(name: &str) -> Option<Tool> {
        Tool::all()
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(name.trim()))
    }
}

// ============================================================================
// Brush sizes, three fixed square stencils
// ============================================================================

/// Brush radius 1/2/3, covering a 1×1, 3×3 or 5×5 square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BrushSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BrushSize {
    pub fn from_radius(radius: u8) -> Option<BrushSize> {
        match radius {
            1 => Some(BrushSize::Small),
            2 => Some(BrushSize::Medium),
            3 => Some(BrushSize::Large),
            _ => None,
        }
    }

    pub fn radius(&self) -> u8 {
        match self {
            BrushSize::Small => 1,
            BrushSize::Medium => 2,
            BrushSize::Large => 3,
        }
    }

    /// Side length of the covered square: `2 * radius - 1`.
    pub fn side(&self) -> usize {
        2 * self.radius() as usize - 1
    }

    pub fn label(&self) -> &'static str {
        match self {
            BrushSize::Small => "small (1×1)",
            BrushSize::Medium => "medium (3×3)",
            BrushSize::Large => "large (5×5)",
        }
    }
}

// ============================================================================
// Stroke geometry
// ============================================================================

/// Cells covered by one stroke centred at `center`, clipped to `[0, grid_size)²`.
///
/// Row-major order, no duplicates. Neighbors past an edge are dropped, never wrapped.
pub fn cells_for_stroke(
    center: (usize, usize),
    brush: BrushSize,
    grid_size: usize,
) -> Vec<(usize, usize)> {
    let (cx, cy) = center;
    let reach = brush.radius() as usize - 1;

    let min_x = cx.saturating_sub(reach);
    let min_y = cy.saturating_sub(reach);
    let max_x = cx.saturating_add(reach).min(grid_size.saturating_sub(1));
    let max_y = cy.saturating_add(reach).min(grid_size.saturating_sub(1));

    if grid_size == 0 || min_x > max_x || min_y > max_y {
        return Vec::new();
    }

    let mut cells = Vec::with_capacity((max_x - min_x + 1) * (max_y - min_y + 1));
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            cells.push((x, y));
        }
    }
    cells
}

/// Paint one stroke. This is the only freehand paint path.
/// Returns the number of cells the brush covered.
pub fn paint_stroke(
    grid: &mut Grid,
    center: (usize, usize),
    brush: BrushSize,
    color: &Color,
) -> Result<usize> {
    apply_stroke(grid, center, brush, Some(color))
}

/// Erase one stroke. Same footprint as [`paint_stroke`].
pub fn erase_stroke(grid: &mut Grid, center: (usize, usize), brush: BrushSize) -> Result<usize> {
    apply_stroke(grid, center, brush, None)
}

fn apply_stroke(
    grid: &mut Grid,
    center: (usize, usize),
    brush: BrushSize,
    color: Option<&Color>,
) -> Result<usize> {
    let (cx, cy) = center;
    if !grid.in_bounds(cx, cy) {
        return Err(Error::OutOfBounds {
            x: cx,
            y: cy,
            size: grid.size(),
        });
    }

    let cells = cells_for_stroke(center, brush, grid.size());
    for &(x, y) in &cells {
        grid.set(x, y, color.cloned())?;
    }
    Ok(cells.len())
}

// ============================================================================
// Keyboard shortcuts
// ============================================================================

/// Actions bound to single keys on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Brush(BrushSize),
    Clear,
    SelectTool(Tool),
}

impl Shortcut {
    /// `1`-`3` brush size, space or `C` clear, `F` fill, `E` eraser, `P` pencil.
    pub fn from_key(key: char) -> Option<Shortcut> {
        match key.to_ascii_lowercase() {
            '1' => Some(Shortcut::Brush(BrushSize::Small)),
            '2' => Some(Shortcut::Brush(BrushSize::Medium)),
            '3' => Some(Shortcut::Brush(BrushSize::Large)),
            ' ' | 'c' => Some(Shortcut::Clear),
            'f' => Some(Shortcut::SelectTool(Tool::Fill)),
            'e' => Some(Shortcut::SelectTool(Tool::Eraser)),
            'p' => Some(Shortcut::SelectTool(Tool::Pencil)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn red() -> Color {
        Color::new("#FF0000").unwrap()
    }

    #[test]
    fn stroke_is_a_clipped_square_without_duplicates() {
        for size in [1usize, 2, 5, 8, 16] {
            for brush in [BrushSize::Small, BrushSize::Medium, BrushSize::Large] {
                for cy in 0..size {
                    for cx in 0..size {
                        let cells = cells_for_stroke((cx, cy), brush, size);
                        let unique: HashSet<_> = cells.iter().copied().collect();
                        assert_eq!(unique.len(), cells.len());

                        let reach = brush.radius() as isize - 1;
                        let expected: HashSet<_> = (-reach..=reach)
                            .flat_map(|dy| (-reach..=reach).map(move |dx| (dx, dy)))
                            .map(|(dx, dy)| (cx as isize + dx, cy as isize + dy))
                            .filter(|&(x, y)| {
                                x >= 0 && y >= 0 && (x as usize) < size && (y as usize) < size
                            })
                            .map(|(x, y)| (x as usize, y as usize))
                            .collect();
                        assert_eq!(unique, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn small_brush_covers_only_the_center() {
        assert_eq!(cells_for_stroke((3, 4), BrushSize::Small, 8), vec![(3, 4)]);
    }

    #[test]
    fn medium_stroke_paints_nine_cells() {
        let mut grid = Grid::new(8).unwrap();
        let covered = paint_stroke(&mut grid, (3, 3), BrushSize::Medium, &red()).unwrap();
        assert_eq!(covered, 9);
        assert_eq!(grid.painted_count(), 9);
        for y in 2..=4 {
            for x in 2..=4 {
                assert_eq!(grid.get(x, y).unwrap(), Some(&red()));
            }
        }
        assert_eq!(grid.get(1, 1).unwrap(), None);
    }

    #[test]
    fn large_stroke_in_the_corner_is_clipped() {
        let mut grid = Grid::new(8).unwrap();
        paint_stroke(&mut grid, (0, 0), BrushSize::Large, &red()).unwrap();
        assert_eq!(grid.painted_count(), 9);
        for y in 0..=2 {
            for x in 0..=2 {
                assert!(grid.get(x, y).unwrap().is_some());
            }
        }
    }

    #[test]
    fn erase_undoes_paint_on_the_same_footprint() {
        let mut grid = Grid::new(8).unwrap();
        for brush in [BrushSize::Small, BrushSize::Medium, BrushSize::Large] {
            paint_stroke(&mut grid, (7, 4), brush, &red()).unwrap();
            erase_stroke(&mut grid, (7, 4), brush).unwrap();
            assert_eq!(grid.painted_count(), 0);
        }
    }

    #[test]
    fn erasing_empty_cells_keeps_count_at_zero() {
        let mut grid = Grid::new(8).unwrap();
        erase_stroke(&mut grid, (4, 4), BrushSize::Large).unwrap();
        assert_eq!(grid.painted_count(), 0);
    }

    #[test]
    fn stroke_outside_grid_is_rejected() {
        let mut grid = Grid::new(8).unwrap();
        assert!(matches!(
            paint_stroke(&mut grid, (8, 0), BrushSize::Medium, &red()),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(grid.painted_count(), 0);
    }

    #[test]
    fn shortcuts_match_board_keys() {
        assert_eq!(Shortcut::from_key('1'), Some(Shortcut::Brush(BrushSize::Small)));
        assert_eq!(Shortcut::from_key('3'), Some(Shortcut::Brush(BrushSize::Large)));
        assert_eq!(Shortcut::from_key(' '), Some(Shortcut::Clear));
        assert_eq!(Shortcut::from_key('C'), Some(Shortcut::Clear));
        assert_eq!(Shortcut::from_key('F'), Some(Shortcut::SelectTool(Tool::Fill)));
        assert_eq!(Shortcut::from_key('e'), Some(Shortcut::SelectTool(Tool::Eraser)));
        assert_eq!(Shortcut::from_key('p'), Some(Shortcut::SelectTool(Tool::Pencil)));
        assert_eq!(Shortcut::from_key('4'), None);
    }

    #[test]
    fn brush_and_tool_parsing() {
        assert_eq!(BrushSize::from_radius(2).map(|b| b.side()), Some(3));
        assert_eq!(BrushSize::from_radius(0), None);
        assert_eq!(Tool::parse(" Eraser "), Some(Tool::Eraser));
        assert_eq!(Tool::parse("lasso"), None);
    }
}
