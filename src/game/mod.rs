//! The main game module for the bubble shooter.
//!
//! This module contains all the gameplay logic including:
//! - Hexagonal offset grid and bubble storage
//! - Projectile physics and slot attachment
//! - Cluster popping and floating bubble removal
//! - Session state: score, level, game over
//! - Shooter input and drawing

mod bubble;
mod cluster;
mod config;
mod grid;
mod hex;
mod projectile;
mod shooter;
mod state;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<hex::HexCoord>();

    app.add_plugins((state::plugin, bubble::plugin, shooter::plugin));
}
