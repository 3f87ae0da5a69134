//! Colors shared by the HUD and the field drawing.

pub mod palette;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(ClearColor(palette::BACKGROUND));
}
