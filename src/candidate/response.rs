//! Per-point similarity response over the search window.

/// Scores of every tested offset for one candidate point.
///
/// Cell `(ix, iy)` holds the score of offset `(ix − rx, iy − ry)`. Undefined
/// scores (a flat or out-of-range target block) are stored as
/// `f32::NEG_INFINITY`.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseMap {
    radius_x: usize,
    radius_y: usize,
    data: Vec<f32>,
}

impl ResponseMap {
    /// Creates a map for search radii `(rx, ry)` with every cell undefined.
    pub fn new(radius_x: usize, radius_y: usize) -> Self {
        let len = (2 * radius_x + 1) * (2 * radius_y + 1);
        Self {
            radius_x,
            radius_y,
            data: vec![f32::NEG_INFINITY; len],
        }
    }

    /// Returns the map width, `2·rx + 1`.
    pub fn width(&self) -> usize {
        2 * self.radius_x + 1
    }

    /// Returns the map height, `2·ry + 1`.
    pub fn height(&self) -> usize {
        2 * self.radius_y + 1
    }

    /// Returns the cell at `(ix, iy)`.
    ///
    /// Panics if the cell is outside the map.
    pub fn get(&self, ix: usize, iy: usize) -> f32 {
        self.data[iy * self.width() + ix]
    }

    /// Stores the score of cell `(ix, iy)`.
    pub fn set(&mut self, ix: usize, iy: usize, score: f32) {
        let w = self.width();
        self.data[iy * w + ix] = score;
    }

    /// Converts a cell to its integer search offset.
    pub fn offset_of(&self, ix: usize, iy: usize) -> (i64, i64) {
        (
            ix as i64 - self.radius_x as i64,
            iy as i64 - self.radius_y as i64,
        )
    }

    /// Returns the 3x3 neighborhood of an interior cell as `s[row][col]`.
    pub fn neighborhood(&self, ix: usize, iy: usize) -> [[f32; 3]; 3] {
        let mut s = [[0.0f32; 3]; 3];
        for (row, dy) in s.iter_mut().zip(0..3) {
            for (cell, dx) in row.iter_mut().zip(0..3) {
                *cell = self.get(ix + dx - 1, iy + dy - 1);
            }
        }
        s
    }

    /// Returns the cells in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
