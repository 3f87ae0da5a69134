//! Bubbles - colors, the read-only bubble view, and drawing.
//!
//! Bubbles live in the grid as plain colors. A `Bubble` is produced on
//! demand when something needs its position, so its pixel center can never
//! drift from its row/column.

use bevy::prelude::*;
use rand::Rng;

use super::{config::GameConfig, hex::HexCoord, state::GameSession};
use crate::AppSystems;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BubbleColor>();
    app.add_systems(Update, draw_bubbles.in_set(AppSystems::Render));
}

/// The six bubble colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default)]
pub enum BubbleColor {
    #[default]
    Purple,
    Pink,
    Cyan,
    Yellow,
    Green,
    Orange,
}

impl BubbleColor {
    pub const ALL: [BubbleColor; 6] = [
        BubbleColor::Purple,
        BubbleColor::Pink,
        BubbleColor::Cyan,
        BubbleColor::Yellow,
        BubbleColor::Green,
        BubbleColor::Orange,
    ];

    /// Get the actual color for rendering.
    pub fn to_color(self) -> Color {
        match self {
            BubbleColor::Purple => Color::srgb_u8(0x64, 0x41, 0xff),
            BubbleColor::Pink => Color::srgb_u8(0xff, 0x66, 0xa3),
            BubbleColor::Cyan => Color::srgb_u8(0x4d, 0xf0, 0xff),
            BubbleColor::Yellow => Color::srgb_u8(0xff, 0xde, 0x59),
            BubbleColor::Green => Color::srgb_u8(0x6a, 0xff, 0x87),
            BubbleColor::Orange => Color::srgb_u8(0xff, 0x7b, 0x54),
        }
    }

    /// Pick a color uniformly.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// An attached bubble as seen from outside the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bubble {
    pub coord: HexCoord,
    pub color: BubbleColor,
    /// Canvas-space center, always the center of `coord`.
    pub position: Vec2,
    pub radius: f32,
}

impl Bubble {
    /// Whether two circles overlap (strictly closer than the sum of radii).
    pub fn overlaps(&self, center: Vec2, radius: f32) -> bool {
        self.position.distance(center) < self.radius + radius
    }

    /// Lowest canvas y covered by this bubble.
    pub fn bottom(&self) -> f32 {
        self.position.y + self.radius
    }
}

/// Draw a bubble as a few nested rings plus a small highlight.
pub fn draw_bubble(
    gizmos: &mut Gizmos,
    config: &GameConfig,
    center: Vec2,
    radius: f32,
    color: BubbleColor,
) {
    let world = config.to_world(center);
    let base = color.to_color();

    for step in 0..4 {
        let scale = 1.0 - step as f32 * 0.22;
        gizmos.circle_2d(world, radius * scale, base.with_alpha(1.0 - step as f32 * 0.2));
    }

    let highlight = world + Vec2::new(-radius * 0.3, radius * 0.3);
    gizmos.circle_2d(highlight, radius * 0.2, Color::srgba(1.0, 1.0, 1.0, 0.3));
}

fn draw_bubbles(mut gizmos: Gizmos, session: Res<GameSession>) {
    let config = session.config();
    for bubble in session.bubbles() {
        draw_bubble(&mut gizmos, config, bubble.position, bubble.radius, bubble.color);
    }
}
