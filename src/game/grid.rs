//! The hexagonal grid that holds all bubbles.
//!
//! A dense `rows x cols` array of optional colors. It is the only record of
//! which bubbles exist; everything else (positions, the list of bubbles to
//! draw or collide with) is derived from it on demand.

use bevy::prelude::*;
use rand::Rng;
use std::collections::HashSet;

use super::{
    bubble::{Bubble, BubbleColor},
    hex::HexCoord,
};

/// The grid of bubble slots.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleGrid {
    rows: usize,
    cols: usize,
    radius: f32,
    cells: Vec<Option<BubbleColor>>,
}

impl BubbleGrid {
    /// Create an empty grid.
    pub fn new(rows: usize, cols: usize, radius: f32) -> Self {
        Self {
            rows,
            cols,
            radius,
            cells: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Check if a coordinate is inside the grid.
    pub fn contains(&self, coord: HexCoord) -> bool {
        coord.r >= 0
            && coord.q >= 0
            && (coord.r as usize) < self.rows
            && (coord.q as usize) < self.cols
    }

    fn index(&self, coord: HexCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.r as usize * self.cols + coord.q as usize)
    }

    /// Get the bubble color at a position, if any.
    pub fn get(&self, coord: HexCoord) -> Option<BubbleColor> {
        self.index(coord).and_then(|i| self.cells[i])
    }

    /// Check if a cell is occupied.
    pub fn is_occupied(&self, coord: HexCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Insert a bubble at a position.
    ///
    /// Returns the previous color if the cell was occupied. Writing outside
    /// the grid is a bug: it asserts in debug builds and is refused otherwise.
    pub fn insert(&mut self, coord: HexCoord, color: BubbleColor) -> Option<BubbleColor> {
        debug_assert!(self.contains(coord), "insert outside grid at {coord}");
        let Some(i) = self.index(coord) else {
            warn!("Refusing to place {:?} outside the grid at {}", color, coord);
            return None;
        };
        self.cells[i].replace(color)
    }

    /// Remove a bubble from a position.
    pub fn remove(&mut self, coord: HexCoord) -> Option<BubbleColor> {
        self.index(coord).and_then(|i| self.cells[i].take())
    }

    /// Get the number of bubbles in the grid.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Center of a cell in canvas coordinates.
    pub fn center(&self, coord: HexCoord) -> Vec2 {
        coord.to_pixel(self.radius)
    }

    /// All occupied coordinates, row by row.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_some())
            .map(move |(i, _)| HexCoord::new((i % cols) as i32, (i / cols) as i32))
    }

    /// Iterate over all bubbles, row by row.
    pub fn iter(&self) -> impl Iterator<Item = Bubble> + '_ {
        self.coords().filter_map(|coord| {
            self.get(coord).map(|color| Bubble {
                coord,
                color,
                position: self.center(coord),
                radius: self.radius,
            })
        })
    }

    /// In-bounds neighbors of a cell. Neighbors off the edge are omitted.
    pub fn neighbors(&self, coord: HexCoord) -> impl Iterator<Item = HexCoord> + '_ {
        coord
            .neighbors()
            .into_iter()
            .filter(move |n| self.contains(*n))
    }

    /// Find empty neighbors of a cell.
    pub fn empty_neighbors(&self, coord: HexCoord) -> Vec<HexCoord> {
        self.neighbors(coord)
            .filter(|n| !self.is_occupied(*n))
            .collect()
    }

    /// Occupied cells of the ceiling row.
    pub fn top_row_coords(&self) -> Vec<HexCoord> {
        (0..self.cols as i32)
            .map(|q| HexCoord::new(q, 0))
            .filter(|c| self.is_occupied(*c))
            .collect()
    }

    /// Find the closest empty cell to a canvas position.
    ///
    /// Starts from the cell under the position (clamped into the grid) and
    /// searches outward ring by ring. Returns `None` only on a full grid.
    pub fn closest_empty_cell(&self, pos: Vec2) -> Option<HexCoord> {
        if self.rows == 0 || self.cols == 0 {
            return None;
        }

        let raw = HexCoord::from_pixel(pos, self.radius);
        let target = HexCoord::new(
            raw.q.clamp(0, self.cols as i32 - 1),
            raw.r.clamp(0, self.rows as i32 - 1),
        );

        let mut checked = HashSet::new();
        let mut to_check = vec![target];

        while !to_check.is_empty() {
            let mut best: Option<(HexCoord, f32)> = None;
            let mut next_ring = Vec::new();

            for coord in to_check {
                if !checked.insert(coord) {
                    continue;
                }

                if !self.is_occupied(coord) {
                    let distance = self.center(coord).distance_squared(pos);
                    if best.is_none_or(|(_, d)| distance < d) {
                        best = Some((coord, distance));
                    }
                }

                next_ring.extend(self.neighbors(coord).filter(|n| !checked.contains(n)));
            }

            if let Some((coord, _)) = best {
                return Some(coord);
            }
            to_check = next_ring;
        }

        None
    }

    /// Fill the top `rows` rows completely with random colors.
    pub fn fill_rows(&mut self, rows: usize, rng: &mut impl Rng) {
        for r in 0..rows.min(self.rows) {
            for q in 0..self.cols {
                self.insert(HexCoord::new(q as i32, r as i32), BubbleColor::random(rng));
            }
        }
    }

    /// Move every row down by one. The last row falls off the grid.
    ///
    /// Returns how many bubbles were pushed out.
    pub fn shift_down(&mut self) -> usize {
        if self.rows == 0 {
            return 0;
        }

        let last_row_start = (self.rows - 1) * self.cols;
        let ejected = self.cells[last_row_start..]
            .iter()
            .filter(|c| c.is_some())
            .count();

        self.cells.truncate(last_row_start);
        let mut shifted = vec![None; self.cols];
        shifted.append(&mut self.cells);
        self.cells = shifted;

        ejected
    }

    /// Fill the ceiling row, each cell independently with probability `chance`.
    ///
    /// Returns how many bubbles were added.
    pub fn inject_ceiling_row(&mut self, chance: f64, rng: &mut impl Rng) -> usize {
        let mut added = 0;
        for q in 0..self.cols as i32 {
            let coord = HexCoord::new(q, 0);
            if rng.random_bool(chance) {
                self.insert(coord, BubbleColor::random(rng));
                added += 1;
            } else {
                self.remove(coord);
            }
        }
        added
    }
}
