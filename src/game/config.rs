//! Game configuration - every tunable number in one place.
//!
//! Loaded once at startup from a JSON file in the user's config directory.
//! Any missing field falls back to its default, so a config file only needs
//! to list what it overrides.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const PREVIEW_SCALE: f32 = 0.7;

/// Tunables for the play field, the grid and the shooter.
///
/// All positions in the simulation are canvas coordinates: origin at the
/// top-left corner, y grows downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub rows: usize,
    pub cols: usize,
    pub bubble_radius: f32,
    /// Projectile travel per tick, in pixels.
    pub bubble_speed: f32,
    /// Rows filled when a session starts.
    pub initial_rows: usize,
    /// Chance of each ceiling cell holding a bubble after a level-up.
    pub ceiling_fill_chance: f64,
    /// Degrees added or removed per aim command.
    pub angle_step: f32,
    pub min_angle: f32,
    pub max_angle: f32,
    /// Gap between the loaded bubble and the bottom of the field.
    pub launch_margin: f32,
    pub aim_line_length: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 500.0,
            canvas_height: 500.0,
            rows: 8,
            cols: 8,
            bubble_radius: 25.0,
            bubble_speed: 5.0,
            initial_rows: 3,
            ceiling_fill_chance: 0.7,
            angle_step: 5.0,
            min_angle: 30.0,
            max_angle: 150.0,
            launch_margin: 10.0,
            aim_line_length: 100.0,
        }
    }
}

impl GameConfig {
    /// Where the loaded bubble sits before it is fired.
    pub fn launch_position(&self) -> Vec2 {
        Vec2::new(
            self.canvas_width / 2.0,
            self.canvas_height - self.bubble_radius - self.launch_margin,
        )
    }

    /// Where the next-bubble preview is drawn.
    pub fn preview_position(&self) -> Vec2 {
        Vec2::new(
            self.canvas_width - self.bubble_radius - 20.0,
            self.canvas_height - self.bubble_radius - self.launch_margin,
        )
    }

    /// Preview bubbles are drawn smaller than real ones.
    pub fn preview_radius(&self) -> f32 {
        self.bubble_radius * PREVIEW_SCALE
    }

    /// Where the "NEXT" caption under the preview is centered.
    pub fn preview_label_position(&self) -> Vec2 {
        self.preview_position() + Vec2::new(0.0, self.preview_radius() + 20.0)
    }

    /// Bubbles whose bottom edge reaches this y end the game.
    pub fn danger_line(&self) -> f32 {
        self.canvas_height - self.bubble_radius * 2.0
    }

    /// Map a canvas position to Bevy world space (centered, y up).
    pub fn to_world(&self, canvas: Vec2) -> Vec2 {
        Vec2::new(
            canvas.x - self.canvas_width / 2.0,
            self.canvas_height / 2.0 - canvas.y,
        )
    }

    pub fn clamp_angle(&self, degrees: f32) -> f32 {
        degrees.clamp(self.min_angle, self.max_angle)
    }

    /// Pull out-of-range values back to something playable.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.canvas_width.is_nan() || self.canvas_width <= 0.0 {
            warn!("canvas_width {} is not positive, using default", self.canvas_width);
            self.canvas_width = defaults.canvas_width;
        }
        if self.canvas_height.is_nan() || self.canvas_height <= 0.0 {
            warn!("canvas_height {} is not positive, using default", self.canvas_height);
            self.canvas_height = defaults.canvas_height;
        }
        self.rows = self.rows.max(1);
        self.cols = self.cols.max(1);
        self.initial_rows = self.initial_rows.min(self.rows);
        if self.bubble_radius.is_nan() || self.bubble_radius <= 0.0 {
            warn!("bubble_radius {} is not positive, using default", self.bubble_radius);
            self.bubble_radius = defaults.bubble_radius;
        }
        if self.bubble_speed.is_nan() || self.bubble_speed <= 0.0 {
            warn!("bubble_speed {} is not positive, using default", self.bubble_speed);
            self.bubble_speed = defaults.bubble_speed;
        }
        if self.angle_step.is_nan() || self.angle_step <= 0.0 {
            warn!("angle_step {} is not positive, using default", self.angle_step);
            self.angle_step = defaults.angle_step;
        }
        if self.launch_margin.is_nan() || self.launch_margin < 0.0 {
            warn!("launch_margin {} is negative, using default", self.launch_margin);
            self.launch_margin = defaults.launch_margin;
        }
        if !(0.0..=1.0).contains(&self.ceiling_fill_chance) {
            warn!(
                "ceiling_fill_chance {} outside [0, 1], using default",
                self.ceiling_fill_chance
            );
            self.ceiling_fill_chance = defaults.ceiling_fill_chance;
        }
        if self.min_angle > self.max_angle {
            std::mem::swap(&mut self.min_angle, &mut self.max_angle);
        }

        self
    }

    /// Get the file path for the config file.
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bubble-blast").join("config.json"))
    }

    /// Load the config from disk, falling back to defaults on any failure.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine config directory, using default config");
            return Self::default();
        };

        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }
}
