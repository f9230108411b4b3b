//! Preset stencil table, keyed by `(pattern, grid size)`.
//!
//! Rows are drawn with `#` for an inked cell and `.` for a blank one. Stencils are
//! never scaled: a pattern either has a table entry for the exact grid size or it is
//! unavailable at that size.

use crate::ops::patterns::Pattern;

/// A boolean matrix describing a shape, independent of color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stencil {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Stencil {
    /// Build from `#`/`.` rows. Short rows are padded with blanks.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let matrix: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.chars().map(|c| c == '#').collect())
            .collect();
        Self::from_matrix_padded(width, matrix)
    }

    /// Build from a boolean matrix (`matrix[y][x]`). Short rows are padded with blanks.
    pub fn from_matrix(matrix: Vec<Vec<bool>>) -> Self {
        let width = matrix.iter().map(Vec::len).max().unwrap_or(0);
        Self::from_matrix_padded(width, matrix)
    }

    fn from_matrix_padded(width: usize, matrix: Vec<Vec<bool>>) -> Self {
        let height = matrix.len();
        let mut bits = Vec::with_capacity(width * height);
        for mut row in matrix {
            row.resize(width, false);
            bits.extend(row);
        }
        Self { width, height, bits }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Positions of every inked cell, row-major.
    pub fn inked(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.is_set(x, y))
    }
}

/// Look up the stencil for `pattern` at exactly `grid_size`.
pub fn stencil_for(pattern: Pattern, grid_size: usize) -> Option<Stencil> {
    STENCILS
        .iter()
        .find(|(p, size, _)| *p == pattern && *size == grid_size)
        .map(|(_, _, rows)| Stencil::from_rows(rows))
}

/// Grid sizes that have a stencil for `pattern`.
pub fn sizes_for(pattern: Pattern) -> Vec<usize> {
    STENCILS
        .iter()
        .filter(|(p, _, _)| *p == pattern)
        .map(|(_, size, _)| *size)
        .collect()
}

const STENCILS: &[(Pattern, usize, &[&str])] = &[
    (Pattern::Heart, 8, HEART_8),
    (Pattern::Heart, 16, HEART_16),
    (Pattern::Heart, 24, HEART_24),
    (Pattern::Smiley, 8, SMILEY_8),
    (Pattern::Smiley, 16, SMILEY_16),
    (Pattern::Smiley, 24, SMILEY_24),
    (Pattern::House, 8, HOUSE_8),
    (Pattern::House, 16, HOUSE_16),
    (Pattern::House, 24, HOUSE_24),
    (Pattern::Tree, 8, TREE_8),
    (Pattern::Tree, 16, TREE_16),
    (Pattern::Tree, 24, TREE_24),
];

// ============================================================================
// Table data
// ============================================================================

const HEART_8: &[&str] = &[
    "..####..",
    ".######.",
    "########",
    "########",
    ".######.",
    "..####..",
    "...##...",
    "........",
];

const HEART_16: &[&str] = &[
    "................",
    "...##......##...",
    "..####....####..",
    ".######..######.",
    "################",
    "################",
    "################",
    ".##############.",
    "..############..",
    "...##########...",
    "....########....",
    ".....######.....",
    "......####......",
    ".......##.......",
    "................",
    "................",
];

const HEART_24: &[&str] = &[
    "........................",
    "........................",
    "........##....##........",
    ".......####..####.......",
    "......############......",
    ".....##############.....",
    "....################....",
    "...##################...",
    "..####################..",
    ".######################.",
    "########################",
    "########################",
    "########################",
    ".######################.",
    "..####################..",
    "...##################...",
    "....################....",
    ".....##############.....",
    "......############......",
    ".......##########.......",
    "........########........",
    ".........######.........",
    "..........####..........",
    "...........##...........",
];

const SMILEY_8: &[&str] = &[
    ".######.",
    "#......#",
    "#.#..#.#",
    "#......#",
    "#.#..#.#",
    "#..##..#",
    ".#....#.",
    "..####..",
];

const SMILEY_16: &[&str] = &[
    "....########....",
    "..############..",
    ".##############.",
    "###..........###",
    "##............##",
    "##.##......##.##",
    "##.##......##.##",
    "##............##",
    "##............##",
    "##.##......##.##",
    "##..##....##..##",
    "###..######..###",
    ".###........###.",
    "..############..",
    "....########....",
    "................",
];

const SMILEY_24: &[&str] = &[
    "......############......",
    "....################....",
    "...##################...",
    "..####################..",
    ".####..............####.",
    "####................####",
    "###..................###",
    "##..##............##..##",
    "##..##............##..##",
    "##....................##",
    "##....................##",
    "##....................##",
    "##....................##",
    "##..##............##..##",
    "##..##............##..##",
    "###...##........##...###",
    "####...###....###...####",
    ".####....######....####.",
    "..####............####..",
    "...#####........#####...",
    "....################....",
    "......############......",
    "........................",
    "........................",
];

const HOUSE_8: &[&str] = &[
    "...##...",
    "..####..",
    ".######.",
    "##.##.##",
    "##.##.##",
    "########",
    "#.#..#.#",
    "#.#..#.#",
];

const HOUSE_16: &[&str] = &[
    "......####......",
    ".....######.....",
    "....########....",
    "...##########...",
    "..############..",
    ".###..####..###.",
    "###....##....###",
    "###....##....###",
    "################",
    "##..##....##..##",
    "##..##....##..##",
    "##..##....##..##",
    "##..##....##..##",
    "################",
    "################",
    "################",
];

const HOUSE_24: &[&str] = &[
    "...........####.........",
    "..........######........",
    ".........########.......",
    "........##########......",
    ".......############.....",
    "......##############....",
    ".....####..####..####...",
    "....####....##....####..",
    "...####.....##.....####.",
    "..####......##......####",
    ".#######################",
    "####.................###",
    "###...................##",
    "###...####....####....##",
    "###...####....####....##",
    "###...####....####....##",
    "###...####....####....##",
    "########################",
    "########################",
    "##....................##",
    "##....................##",
    "##....................##",
    "##....................##",
    "########################",
];

const TREE_8: &[&str] = &[
    "...##...",
    "..####..",
    ".######.",
    "########",
    "...##...",
    "...##...",
    "...##...",
    "...##...",
];

const TREE_16: &[&str] = &[
    "......####......",
    ".....######.....",
    "....########....",
    "...##########...",
    "..############..",
    ".##############.",
    "################",
    "################",
    "......####......",
    "......####......",
    "......####......",
    "......####......",
    "......####......",
    "......####......",
    "......####......",
    "......####......",
];

const TREE_24: &[&str] = &[
    "........................",
    "........................",
    "..........####..........",
    ".........######.........",
    "........########........",
    ".......##########.......",
    "......############......",
    ".....##############.....",
    "....################....",
    "...##################...",
    "..####################..",
    ".######################.",
    "########################",
    "########################",
    "..........####..........",
    "..........####..........",
    "..........####..........",
    "..........####..........",
    "..........####..........",
    "..........####..........",
    "..........####..........",
    "..........####..........",
    "..........####..........",
    "..........####..........",
];
