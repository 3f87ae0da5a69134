use bevy::prelude::*;

/// #1a1033
pub const BACKGROUND: Color = Color::srgb(0.102, 0.063, 0.200);

/// White text for score, level and overlay lines
pub const HUD_TEXT: Color = Color::WHITE;

/// #ff66a3, same pink as the bubbles
pub const GAME_OVER_TEXT: Color = Color::srgb(1.0, 0.400, 0.639);

/// Dimmed black behind the game over text
pub const OVERLAY_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);

pub const AIM_LINE: Color = Color::srgba(1.0, 1.0, 1.0, 0.5);

pub const WALL: Color = Color::srgba(1.0, 1.0, 1.0, 0.3);

pub const DANGER_LINE: Color = Color::srgba(1.0, 0.2, 0.2, 0.5);
