//! Grid domain and cell coordinates for a single generation run.

use serde::{Deserialize, Serialize};

use crate::error::LichtenbergError;

/// Offsets of the eight Moore neighbours, orthogonal ones first.
const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// Integer cell coordinate inside a [`Domain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two cells.
    pub fn distance(self, other: GridPos) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Stable 64-bit key for this cell, used as a PRNG lane.
    pub fn key(self) -> u64 {
        ((self.x as u64) << 32) | (self.y as u64 & 0xFFFF_FFFF)
    }
}

/// Immutable `width x height` coordinate space for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    width: usize,
    height: usize,
}

impl Domain {
    /// Creates a domain.
    ///
    /// Returns `LichtenbergError::InvalidConfig` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, LichtenbergError> {
        if width == 0 || height == 0 {
            return Err(LichtenbergError::InvalidConfig(format!(
                "domain dimensions must be positive, got {width}x{height}"
            )));
        }
        width.checked_mul(height).ok_or_else(|| {
            LichtenbergError::InvalidConfig(format!("domain {width}x{height} is too large"))
        })?;
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in the domain.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Whether the signed coordinate lies inside the domain.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    /// Converts a signed coordinate to a [`GridPos`].
    ///
    /// Returns `LichtenbergError::OutOfDomain` for coordinates outside the grid.
    pub fn pos(&self, x: i64, y: i64) -> Result<GridPos, LichtenbergError> {
        if self.contains(x, y) {
            Ok(GridPos::new(x as usize, y as usize))
        } else {
            Err(self.out_of_domain(x, y))
        }
    }

    /// Row-major index of an in-domain cell.
    pub fn index(&self, pos: GridPos) -> usize {
        pos.y * self.width + pos.x
    }

    /// In-domain Moore neighbours of `pos`, orthogonal neighbours first.
    pub fn neighbours(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        NEIGHBOUR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let x = pos.x as i64 + dx;
            let y = pos.y as i64 + dy;
            self.contains(x, y).then(|| GridPos::new(x as usize, y as usize))
        })
    }

    pub(crate) fn out_of_domain(&self, x: i64, y: i64) -> LichtenbergError {
        LichtenbergError::OutOfDomain {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}
