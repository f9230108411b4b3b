use crate::components::colors::Color;
use crate::error::{Error, Result};

/// Canvas sizes offered by the size picker. Any positive size works; these are the
/// ones that ship with preset stencils.
pub const SUPPORTED_SIZES: &[usize] = &[8, 16, 24];

/// Largest board side accepted anywhere: scripts, `--size`, share tokens, saved works.
pub const MAX_GRID_SIZE: usize = 256;

// ============================================================================
// GRID: fixed-size row-major buffer of cell colors
// ============================================================================

/// The pixel canvas.
///
/// Cells are stored row-major (`index = y * size + x`). `None` is an unpainted cell.
/// The number of painted cells is tracked on every write, so [`Grid::painted_count`]
/// never has to scan the buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Color>>,
    painted: usize,
}

impl Grid {
    // ---- construction -------------------------------------------------------

    /// Create an empty `size × size` grid.
    pub fn new(size: usize) -> Result<Self> {
        let count = cell_count_for(size)?;
        Ok(Self {
            size,
            cells: vec![None; count],
            painted: 0,
        })
    }

    /// Rebuild a grid from a row-major snapshot (saved work or share token).
    pub fn from_cells(size: usize, cells: Vec<Option<Color>>) -> Result<Self> {
        let expected = cell_count_for(size)?;
        if cells.len() != expected {
            return Err(Error::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        let painted = cells.iter().filter(|c| c.is_some()).count();
        Ok(Self {
            size,
            cells,
            painted,
        })
    }

    // ---- access -------------------------------------------------------------

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn painted_count(&self) -> usize {
        self.painted
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    /// Flat index of `(x, y)`.
    pub fn index_of(&self, x: usize, y: usize) -> Result<usize> {
        if self.in_bounds(x, y) {
            Ok(y * self.size + x)
        } else {
            Err(Error::OutOfBounds {
                x,
                y,
                size: self.size,
            })
        }
    }

    /// Inverse of [`Grid::index_of`].
    pub fn coords_of(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.cells.len()).then(|| (index % self.size, index / self.size))
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Option<&Color>> {
        let i = self.index_of(x, y)?;
        Ok(self.cells[i].as_ref())
    }

    /// Overwrite one cell. Writing the value a cell already holds changes nothing.
    pub fn set(&mut self, x: usize, y: usize, color: Option<Color>) -> Result<()> {
        let i = self.index_of(x, y)?;
        self.write_index(i, color);
        Ok(())
    }

    /// Reset every cell to unpainted and return how many were painted before.
    pub fn clear(&mut self) -> usize {
        let was = self.painted;
        self.cells.iter_mut().for_each(|c| *c = None);
        self.painted = 0;
        was
    }

    /// Row-major snapshot of every cell.
    pub fn to_color_sequence(&self) -> Vec<Option<Color>> {
        self.cells.clone()
    }

    pub fn cells(&self) -> &[Option<Color>] {
        &self.cells
    }

    /// `(x, y, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Option<&Color>)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (i % size, i / size, c.as_ref()))
    }

    // ---- internals ----------------------------------------------------------

    /// Single write path; keeps `painted` exact.
    pub(crate) fn write_index(&mut self, index: usize, color: Option<Color>) {
        let slot = &mut self.cells[index];
        match (slot.is_some(), color.is_some()) {
            (false, true) => self.painted += 1,
            (true, false) => self.painted -= 1,
            _ => {}
        }
        *slot = color;
    }
}

fn cell_count_for(size: usize) -> Result<usize> {
    if size == 0 || size > MAX_GRID_SIZE {
        return Err(Error::InvalidSize(size));
    }
    Ok(size * size)
}
