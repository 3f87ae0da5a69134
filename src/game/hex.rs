//! Hexagonal coordinate system using offset coordinates (odd-r).
//!
//! Based on Red Blob Games' guide:
//! https://www.redblobgames.com/grids/hexagons/
//!
//! Odd rows are shifted right by one bubble radius, which packs round
//! bubbles hexagonally on a plain rectangular row/column index space.
//! Rows are spaced `1.8 * radius` apart, slightly tighter than a true hex.

use bevy::prelude::*;

/// Vertical distance between row centers, as a multiple of the radius.
pub const ROW_SPACING: f32 = 1.8;

/// Offset hex coordinate (odd-r system).
///
/// - q is the column (increases to the right)
/// - r is the row (increases downward, row 0 is the ceiling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct HexCoord {
    /// Column (x-axis)
    pub q: i32,
    /// Row (y-axis)
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    #[inline]
    pub const fn is_odd_row(&self) -> bool {
        self.r.rem_euclid(2) == 1
    }

    /// Get all 6 neighboring coordinates, unclipped.
    ///
    /// Order: top-left, top-right, left, right, bottom-left, bottom-right.
    /// On even rows the diagonal neighbors sit at columns q-1 and q,
    /// on odd rows at q and q+1.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let (left, right) = if self.is_odd_row() {
            (self.q, self.q + 1)
        } else {
            (self.q - 1, self.q)
        };

        [
            HexCoord::new(left, self.r - 1),
            HexCoord::new(right, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(left, self.r + 1),
            HexCoord::new(right, self.r + 1),
        ]
    }

    /// Cell center in canvas coordinates.
    ///
    /// - x = q * 2r + r (+ r on odd rows)
    /// - y = row * 1.8r + r
    pub fn to_pixel(&self, radius: f32) -> Vec2 {
        let row_offset = if self.is_odd_row() { radius } else { 0.0 };
        let x = self.q as f32 * radius * 2.0 + radius + row_offset;
        let y = self.r as f32 * radius * ROW_SPACING + radius;
        Vec2::new(x, y)
    }

    /// Nearest cell to a canvas position.
    ///
    /// The row is found first, then the column with that row's offset removed.
    pub fn from_pixel(pos: Vec2, radius: f32) -> Self {
        let r = ((pos.y - radius) / (radius * ROW_SPACING)).round() as i32;
        let row_offset = if r.rem_euclid(2) == 1 { radius } else { 0.0 };
        let q = ((pos.x - radius - row_offset) / (radius * 2.0)).round() as i32;
        Self { q, r }
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(row {}, col {})", self.r, self.q)
    }
}
