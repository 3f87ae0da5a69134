//! Projectile - the bubble being shot.
//!
//! The projectile travels in a straight line, bouncing off the side walls,
//! until it touches the ceiling or overlaps a bubble on the grid. It is then
//! snapped into a free slot and becomes part of the grid.

use bevy::prelude::*;

use super::{bubble::BubbleColor, grid::BubbleGrid, hex::HexCoord};

/// The active shooter bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Canvas-space center.
    pub position: Vec2,
    /// Travel per tick.
    pub velocity: Vec2,
    pub color: BubbleColor,
    pub radius: f32,
    pub moving: bool,
}

/// What stopped the projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// The top edge crossed y = 0.
    Ceiling,
    /// The projectile overlapped the bubble at this cell.
    Bubble(HexCoord),
}

impl Projectile {
    /// A resting projectile at the launch position.
    pub fn loaded(color: BubbleColor, position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            color,
            radius,
            moving: false,
        }
    }

    /// Start moving along `angle_degrees` (90 is straight up).
    pub fn launch(&mut self, angle_degrees: f32, speed: f32) {
        let radians = angle_degrees.to_radians();
        // Canvas y grows downward, so "up" is negative y.
        self.velocity = Vec2::new(radians.cos(), -radians.sin()) * speed;
        self.moving = true;
    }

    /// Advance one tick inside a field `field_width` wide.
    ///
    /// Returns the contact that stopped the projectile, if any. A stopped
    /// projectile no longer moves.
    pub fn step(&mut self, grid: &BubbleGrid, field_width: f32) -> Option<Contact> {
        if !self.moving {
            return None;
        }

        self.position += self.velocity;

        if self.position.x - self.radius < 0.0 || self.position.x + self.radius > field_width {
            self.velocity.x = -self.velocity.x;
        }

        if self.position.y - self.radius < 0.0 {
            self.moving = false;
            return Some(Contact::Ceiling);
        }

        let hit = grid
            .iter()
            .find(|bubble| bubble.overlaps(self.position, self.radius))?;
        self.moving = false;
        Some(Contact::Bubble(hit.coord))
    }
}

/// Column a ceiling contact at canvas x lands in, clamped into the grid.
pub fn ceiling_column(x: f32, radius: f32, cols: usize) -> i32 {
    let col = ((x - radius) / (radius * 2.0)).round() as i32;
    col.clamp(0, cols.saturating_sub(1) as i32)
}

/// Pick the grid slot a stopped projectile at `position` attaches to.
///
/// - Bubble contact: the empty neighbor of the hit bubble nearest to the
///   projectile (squared distance).
/// - Ceiling contact, or a hit bubble with no empty neighbor: row 0 at the
///   column under the projectile.
/// - If that ceiling slot is taken, the nearest empty cell anywhere.
///
/// `None` means the grid is full.
pub fn resolve_slot(grid: &BubbleGrid, position: Vec2, contact: Contact) -> Option<HexCoord> {
    if let Contact::Bubble(hit) = contact {
        let nearest = grid
            .empty_neighbors(hit)
            .into_iter()
            .map(|coord| (coord, grid.center(coord).distance_squared(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((coord, _)) = nearest {
            return Some(coord);
        }
        warn!("No empty neighbor around {}, falling back to the ceiling", hit);
    }

    let ceiling = HexCoord::new(ceiling_column(position.x, grid.radius(), grid.cols()), 0);
    if !grid.is_occupied(ceiling) {
        return Some(ceiling);
    }

    debug!("Ceiling slot {} taken, searching nearest empty cell", ceiling);
    grid.closest_empty_cell(position)
}
