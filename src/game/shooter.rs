//! The shooter/launcher at the bottom of the field.
//!
//! The player turns the aim with the arrow keys and fires with space or
//! up. The loaded bubble sits at the launch point with the next color
//! previewed beside it.

use bevy::prelude::*;

use super::{
    bubble::draw_bubble,
    state::{GameEvent, GameSession, setup_session},
};
use crate::{AppSystems, theme::palette};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_preview_label.after(setup_session));
    app.add_systems(Update, handle_shooter_input.in_set(AppSystems::RecordInput));
    app.add_systems(
        Update,
        (draw_walls, draw_aim_line, draw_projectile, draw_preview).in_set(AppSystems::Render),
    );
}

/// Marker for the caption under the preview bubble.
#[derive(Component)]
struct PreviewLabel;

/// Forward keyboard input to the session.
///
/// Left raises the angle, turning the aim toward the left wall; right
/// lowers it.
/// The session ignores aim and fire commands it cannot honor, so this
/// system does not need to check the session state itself.
fn handle_shooter_input(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<GameSession>,
    mut events: MessageWriter<GameEvent>,
) {
    if keyboard_input.just_pressed(KeyCode::KeyR) {
        events.write_batch(session.restart());
        return;
    }

    let step = session.config().angle_step;
    if keyboard_input.just_pressed(KeyCode::ArrowLeft) {
        session.adjust_angle(step);
    }
    if keyboard_input.just_pressed(KeyCode::ArrowRight) {
        session.adjust_angle(-step);
    }

    if keyboard_input.just_pressed(KeyCode::Space) || keyboard_input.just_pressed(KeyCode::ArrowUp)
    {
        session.fire();
    }
}

/// Draw the aim line from the resting projectile.
fn draw_aim_line(mut gizmos: Gizmos, session: Res<GameSession>) {
    let projectile = session.projectile();
    if projectile.moving || !session.is_running() {
        return;
    }

    let config = session.config();
    let radians = session.angle().to_radians();
    let direction = Vec2::new(radians.cos(), -radians.sin());
    let start = projectile.position;
    let end = start + direction * config.aim_line_length;

    gizmos.line_2d(config.to_world(start), config.to_world(end), palette::AIM_LINE);
    gizmos.circle_2d(config.to_world(end), 5.0, palette::AIM_LINE);
}

fn draw_projectile(mut gizmos: Gizmos, session: Res<GameSession>) {
    let projectile = session.projectile();
    draw_bubble(
        &mut gizmos,
        session.config(),
        projectile.position,
        projectile.radius,
        projectile.color,
    );
}

fn draw_preview(mut gizmos: Gizmos, session: Res<GameSession>) {
    let config = session.config();
    let radius = config.preview_radius();
    let position = config.preview_position();

    draw_bubble(&mut gizmos, config, position, radius, session.preview());
    gizmos.circle_2d(config.to_world(position), radius, palette::AIM_LINE);
}

fn spawn_preview_label(mut commands: Commands, session: Res<GameSession>) {
    let config = session.config();
    let position = config.to_world(config.preview_label_position());
    commands.spawn((
        Name::new("Preview Label"),
        PreviewLabel,
        Text2d::new("NEXT"),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        TextColor(palette::HUD_TEXT),
        Transform::from_translation(position.extend(1.0)),
    ));
}

/// Outline the play field and the danger line.
fn draw_walls(mut gizmos: Gizmos, session: Res<GameSession>) {
    let config = session.config();
    let size = Vec2::new(config.canvas_width, config.canvas_height);
    gizmos.rect_2d(Isometry2d::IDENTITY, size, palette::WALL);

    let y = config.danger_line();
    gizmos.line_2d(
        config.to_world(Vec2::new(0.0, y)),
        config.to_world(Vec2::new(config.canvas_width, y)),
        palette::DANGER_LINE,
    );
}
