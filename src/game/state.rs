//! Game state management - score, level, game over.
//!
//! `GameSession` owns the grid, the projectile and the preview color and
//! advances them one tick at a time. Everything that happens during a tick is
//! reported as a `GameEvent` so the HUD and logs can follow along without
//! touching the session.
//!
//! Level up: the grid was cleared. Game over: a bubble reached the floor.

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use super::{
    bubble::{Bubble, BubbleColor},
    cluster::{pop_cluster, remove_floating},
    config::GameConfig,
    grid::BubbleGrid,
    hex::HexCoord,
    projectile::{Contact, Projectile, resolve_slot},
};
use crate::{AppSystems, theme::palette};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<GameEvent>();

    app.add_systems(Startup, (setup_session, spawn_hud).chain());

    app.add_systems(Update, advance_session.in_set(AppSystems::Update));
    app.add_systems(
        Update,
        (log_game_events, update_hud, update_game_over_overlay).in_set(AppSystems::Render),
    );
}

/// Points per bubble in a popped cluster, before the level multiplier.
const POINTS_PER_MATCH: u32 = 10;

/// Points per dropped floating bubble, before the level multiplier.
const POINTS_PER_FLOATING: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Running,
    GameOver,
}

/// Everything observable that a session does.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The projectile became a grid bubble.
    Attached { coord: HexCoord, color: BubbleColor },
    /// A shot found no free slot and was thrown away.
    ShotDiscarded,
    ClusterPopped {
        coords: Vec<HexCoord>,
        color: BubbleColor,
        points: u32,
    },
    FloatingRemoved { coords: Vec<HexCoord>, points: u32 },
    LevelUp { level: u32, ejected: usize },
    GameOver { score: u32, level: u32 },
    Restarted,
}

/// One play-through: grid, shooter, score and level.
#[derive(Resource, Debug)]
pub struct GameSession {
    config: GameConfig,
    grid: BubbleGrid,
    projectile: Projectile,
    preview: BubbleColor,
    /// Aim in degrees, 90 is straight up.
    angle: f32,
    score: u32,
    level: u32,
    status: GameStatus,
    rng: StdRng,
}

impl GameSession {
    /// Start a fresh session with the given config.
    pub fn new(config: GameConfig, mut rng: StdRng) -> Self {
        let mut grid = BubbleGrid::new(config.rows, config.cols, config.bubble_radius);
        grid.fill_rows(config.initial_rows, &mut rng);

        let projectile = Projectile::loaded(
            BubbleColor::random(&mut rng),
            config.launch_position(),
            config.bubble_radius,
        );
        let preview = BubbleColor::random(&mut rng);

        Self {
            angle: config.clamp_angle(90.0),
            config,
            grid,
            projectile,
            preview,
            score: 0,
            level: 1,
            status: GameStatus::Running,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &BubbleGrid {
        &self.grid
    }

    /// All bubbles currently on the grid.
    pub fn bubbles(&self) -> impl Iterator<Item = Bubble> + '_ {
        self.grid.iter()
    }

    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    /// Color of the bubble loaded after the current one.
    pub fn preview(&self) -> BubbleColor {
        self.preview
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    /// Aiming is only possible while running with the projectile at rest.
    fn can_aim(&self) -> bool {
        self.is_running() && !self.projectile.moving
    }

    /// Turn the aim by `delta` degrees. Returns false if ignored.
    pub fn adjust_angle(&mut self, delta: f32) -> bool {
        self.set_angle(self.angle + delta)
    }

    /// Aim at an absolute angle in degrees. Returns false if ignored.
    pub fn set_angle(&mut self, degrees: f32) -> bool {
        if !self.can_aim() {
            return false;
        }
        self.angle = self.config.clamp_angle(degrees);
        true
    }

    /// Launch the loaded bubble. Returns false if ignored.
    pub fn fire(&mut self) -> bool {
        if !self.can_aim() {
            return false;
        }
        self.projectile.launch(self.angle, self.config.bubble_speed);
        debug!(
            "Fired {:?} bubble at {} degrees",
            self.projectile.color, self.angle
        );
        true
    }

    /// Throw everything away and start over with the same config.
    pub fn restart(&mut self) -> Vec<GameEvent> {
        let rng = StdRng::from_rng(&mut self.rng);
        *self = Self::new(self.config.clone(), rng);
        info!("Session restarted");
        vec![GameEvent::Restarted]
    }

    /// Simulate one frame.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.is_running() {
            return events;
        }

        if let Some(contact) = self.projectile.step(&self.grid, self.config.canvas_width) {
            self.attach(contact, &mut events);
        }
        events
    }

    /// Turn the stopped projectile into a grid bubble, reload, and resolve
    /// the consequences of the landing.
    fn attach(&mut self, contact: Contact, events: &mut Vec<GameEvent>) {
        let color = self.projectile.color;
        let slot = resolve_slot(&self.grid, self.projectile.position, contact);

        self.projectile = Projectile::loaded(
            self.preview,
            self.config.launch_position(),
            self.config.bubble_radius,
        );
        self.preview = BubbleColor::random(&mut self.rng);

        let Some(coord) = slot else {
            warn!("Grid is full, discarding {:?} shot", color);
            events.push(GameEvent::ShotDiscarded);
            return;
        };

        self.grid.insert(coord, color);
        events.push(GameEvent::Attached { coord, color });

        self.resolve_matches(coord, events);
        self.check_game_over(events);
    }

    /// Pop the cluster at `coord`, then drop floaters and level up if the
    /// grid ends up empty.
    fn resolve_matches(&mut self, coord: HexCoord, events: &mut Vec<GameEvent>) {
        let Some(color) = self.grid.get(coord) else {
            return;
        };
        let Some(popped) = pop_cluster(&mut self.grid, coord) else {
            return;
        };

        let points = popped.len() as u32 * POINTS_PER_MATCH * self.level;
        self.score += points;
        events.push(GameEvent::ClusterPopped {
            coords: popped,
            color,
            points,
        });

        self.drop_floating(events);

        if self.grid.is_empty() {
            self.level_up(events);
        }
    }

    /// Remove bubbles cut off from the ceiling and score them.
    fn drop_floating(&mut self, events: &mut Vec<GameEvent>) {
        let floating = remove_floating(&mut self.grid);
        if floating.is_empty() {
            return;
        }

        let points = floating.len() as u32 * POINTS_PER_FLOATING * self.level;
        self.score += points;
        events.push(GameEvent::FloatingRemoved {
            coords: floating,
            points,
        });
    }

    /// Advance a level: push every row down and add a new partial ceiling row.
    fn level_up(&mut self, events: &mut Vec<GameEvent>) {
        self.level += 1;
        let ejected = self.grid.shift_down();
        self.grid
            .inject_ceiling_row(self.config.ceiling_fill_chance, &mut self.rng);

        events.push(GameEvent::LevelUp {
            level: self.level,
            ejected,
        });
        self.check_game_over(events);
    }

    /// End the game if any bubble reaches the danger line.
    fn check_game_over(&mut self, events: &mut Vec<GameEvent>) {
        if !self.is_running() {
            return;
        }

        let danger_line = self.config.danger_line();
        if self.grid.iter().any(|b| b.bottom() >= danger_line) {
            self.status = GameStatus::GameOver;
            events.push(GameEvent::GameOver {
                score: self.score,
                level: self.level,
            });
        }
    }
}

/// Load the config and start the first session.
pub(super) fn setup_session(mut commands: Commands) {
    let session = GameSession::new(GameConfig::load(), StdRng::from_os_rng());
    info!(
        "Session started: {}x{} grid, {} bubbles",
        session.grid().rows(),
        session.grid().cols(),
        session.grid().len()
    );
    commands.insert_resource(session);
}

/// Run one simulation tick per frame.
fn advance_session(mut session: ResMut<GameSession>, mut events: MessageWriter<GameEvent>) {
    events.write_batch(session.tick());
}

fn log_game_events(mut events: MessageReader<GameEvent>) {
    for event in events.read() {
        match event {
            GameEvent::Attached { coord, color } => {
                info!("Bubble landed at {} with color {:?}", coord, color);
            }
            GameEvent::ShotDiscarded => warn!("Shot discarded, no free slot"),
            GameEvent::ClusterPopped {
                coords,
                color,
                points,
            } => {
                info!(
                    "Cluster popped: {} {:?} bubbles, +{} points",
                    coords.len(),
                    color,
                    points
                );
            }
            GameEvent::FloatingRemoved { coords, points } => {
                info!(
                    "Floating bubbles removed: {}, +{} points",
                    coords.len(),
                    points
                );
            }
            GameEvent::LevelUp { level, ejected } => {
                info!("Level up! Now level {} ({} bubbles pushed out)", level, ejected);
            }
            GameEvent::GameOver { score, level } => {
                info!("GAME OVER! Final score: {} at level {}", score, level);
            }
            GameEvent::Restarted => info!("New game"),
        }
    }
}

/// Marker for the score/level text.
#[derive(Component)]
struct HudText;

/// Marker for the game over overlay root.
#[derive(Component)]
struct GameOverOverlay;

/// Marker for the final score line of the overlay.
#[derive(Component)]
struct FinalScoreText;

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("HUD"),
        HudText,
        Text::new("Score: 0   Level: 1"),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(palette::HUD_TEXT),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));

    commands
        .spawn((
            Name::new("Game Over Overlay"),
            GameOverOverlay,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(10.0),
                ..default()
            },
            BackgroundColor(palette::OVERLAY_BACKGROUND),
            GlobalZIndex(2),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("GAME OVER"),
                TextFont {
                    font_size: 30.0,
                    ..default()
                },
                TextColor(palette::GAME_OVER_TEXT),
            ));
            parent.spawn((
                FinalScoreText,
                Text::new(""),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(palette::HUD_TEXT),
            ));
            parent.spawn((
                Text::new("Press R to restart"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(palette::HUD_TEXT),
            ));
        });
}

fn update_hud(session: Res<GameSession>, mut query: Query<&mut Text, With<HudText>>) {
    if !session.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = format!("Score: {}   Level: {}", session.score(), session.level());
    }
}

fn update_game_over_overlay(
    session: Res<GameSession>,
    mut overlay_query: Query<&mut Visibility, With<GameOverOverlay>>,
    mut score_query: Query<&mut Text, With<FinalScoreText>>,
) {
    let game_over = session.status() == GameStatus::GameOver;

    if let Ok(mut visibility) = overlay_query.single_mut() {
        *visibility = if game_over {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    if game_over && let Ok(mut text) = score_query.single_mut() {
        text.0 = format!(
            "Final Score: {}\nLevel: {}",
            session.score(),
            session.level()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(config: GameConfig) -> GameSession {
        let grid = BubbleGrid::new(config.rows, config.cols, config.bubble_radius);
        let mut session = GameSession::new(config, StdRng::seed_from_u64(42));
        session.grid = grid;
        session
    }

    fn session() -> GameSession {
        session_with(GameConfig::default())
    }

    /// Put a moving projectile of `color` at `position` heading straight up.
    fn aim_projectile(session: &mut GameSession, color: BubbleColor, position: Vec2) {
        session.projectile = Projectile {
            position,
            velocity: Vec2::new(0.0, -5.0),
            color,
            radius: 25.0,
            moving: true,
        };
    }

    #[test]
    fn test_new_session() {
        let session = GameSession::new(GameConfig::default(), StdRng::seed_from_u64(1));
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.status(), GameStatus::Running);
        assert_eq!(session.angle(), 90.0);
        assert_eq!(session.grid().len(), 24);
        assert!(session.bubbles().all(|b| b.coord.r < 3));
        assert!(!session.projectile().moving);
        assert_eq!(session.projectile().position, Vec2::new(250.0, 465.0));
    }

    #[test]
    fn test_angle_is_clamped() {
        let mut session = session();
        for _ in 0..20 {
            session.adjust_angle(5.0);
        }
        assert_eq!(session.angle(), 150.0);
        for _ in 0..40 {
            session.adjust_angle(-5.0);
        }
        assert_eq!(session.angle(), 30.0);
        assert!(session.set_angle(75.0));
        assert_eq!(session.angle(), 75.0);
    }

    #[test]
    fn test_cannot_aim_or_fire_while_moving() {
        let mut session = session();
        assert!(session.fire());
        assert!(session.projectile().moving);
        assert!(!session.fire());
        assert!(!session.adjust_angle(5.0));
        assert_eq!(session.angle(), 90.0);
    }

    #[test]
    fn test_straight_shot_lands_on_ceiling() {
        let mut session = session();
        let loaded = session.projectile().color;
        let preview = session.preview();
        session.fire();

        let mut events = Vec::new();
        for _ in 0..200 {
            events = session.tick();
            if !events.is_empty() {
                break;
            }
        }

        // x = 250 -> round(225 / 50) = 5 (4.5 rounds away from zero).
        let coord = HexCoord::new(5, 0);
        assert_eq!(events, vec![GameEvent::Attached { coord, color: loaded }]);
        assert_eq!(session.grid().get(coord), Some(loaded));
        assert_eq!(session.projectile().color, preview);
        assert!(!session.projectile().moving);
        assert_eq!(
            session.projectile().position,
            session.config().launch_position()
        );
    }

    #[test]
    fn test_attached_bubble_snaps_to_cell_center() {
        let mut session = session();
        session.grid.insert(HexCoord::new(2, 0), BubbleColor::Cyan);
        aim_projectile(&mut session, BubbleColor::Green, Vec2::new(143.0, 67.0));

        let events = session.tick();
        let GameEvent::Attached { coord, .. } = &events[0] else {
            panic!("expected an attachment, got {events:?}");
        };
        assert_eq!(*coord, HexCoord::new(2, 1));
        let bubble = session.bubbles().find(|b| b.coord == *coord).unwrap();
        assert_eq!(bubble.position, coord.to_pixel(25.0));
    }

    #[test]
    fn test_match_of_four_scores_forty() {
        let mut session = session();
        for q in 0..3 {
            session.grid.insert(HexCoord::new(q, 0), BubbleColor::Pink);
        }
        aim_projectile(&mut session, BubbleColor::Pink, Vec2::new(170.0, 35.0));

        let events = session.tick();
        assert_eq!(
            events[0],
            GameEvent::Attached {
                coord: HexCoord::new(3, 0),
                color: BubbleColor::Pink
            }
        );
        let GameEvent::ClusterPopped { coords, points, .. } = &events[1] else {
            panic!("expected a pop, got {events:?}");
        };
        assert_eq!(coords.len(), 4);
        assert_eq!(*points, 40);
        assert_eq!(session.score(), 40);

        // The grid was cleared, so the session moved on to level 2.
        assert_eq!(session.level(), 2);
        assert!(session.bubbles().all(|b| b.coord.r == 0));
    }

    #[test]
    fn test_two_bubbles_do_not_pop() {
        let mut session = session();
        session.grid.insert(HexCoord::new(0, 0), BubbleColor::Pink);
        session.grid.insert(HexCoord::new(5, 0), BubbleColor::Cyan);
        aim_projectile(&mut session, BubbleColor::Pink, Vec2::new(70.0, 35.0));

        let events = session.tick();
        assert_eq!(events.len(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.grid().len(), 3);
    }

    #[test]
    fn test_match_and_floating_scores_add_up() {
        let mut session = session();
        session.level = 2;
        session.grid.insert(HexCoord::new(0, 0), BubbleColor::Pink);
        session.grid.insert(HexCoord::new(1, 0), BubbleColor::Pink);
        session.grid.insert(HexCoord::new(6, 0), BubbleColor::Green);
        // Held up only by the pink pair.
        session.grid.insert(HexCoord::new(0, 1), BubbleColor::Cyan);
        session.grid.insert(HexCoord::new(4, 3), BubbleColor::Yellow);
        aim_projectile(&mut session, BubbleColor::Pink, Vec2::new(120.0, 35.0));

        let events = session.tick();
        assert!(matches!(
            &events[1],
            GameEvent::ClusterPopped { points: 60, .. }
        ));
        let GameEvent::FloatingRemoved { coords, points } = &events[2] else {
            panic!("expected floating removal, got {events:?}");
        };
        let mut coords = coords.clone();
        coords.sort_by_key(|c| (c.r, c.q));
        assert_eq!(coords, vec![HexCoord::new(0, 1), HexCoord::new(4, 3)]);
        assert_eq!(*points, 2 * 5 * 2);
        assert_eq!(session.score(), 60 + 20);

        assert_eq!(session.grid().len(), 1);
        assert_eq!(session.level(), 2);
    }

    #[test]
    fn test_lone_floater_scores_by_level() {
        let mut session = session();
        session.level = 3;
        session.grid.insert(HexCoord::new(4, 3), BubbleColor::Yellow);

        let mut events = Vec::new();
        session.drop_floating(&mut events);
        assert_eq!(
            events,
            vec![GameEvent::FloatingRemoved {
                coords: vec![HexCoord::new(4, 3)],
                points: 15
            }]
        );
        assert_eq!(session.score(), 15);
        assert!(session.grid().is_empty());
    }

    #[test]
    fn test_level_up_shifts_rows_and_adds_ceiling() {
        let mut session = session();
        session.grid.insert(HexCoord::new(3, 1), BubbleColor::Orange);

        let mut events = Vec::new();
        session.level_up(&mut events);

        assert_eq!(session.level(), 2);
        assert_eq!(
            events[0],
            GameEvent::LevelUp {
                level: 2,
                ejected: 0
            }
        );
        assert!(!session.grid().is_occupied(HexCoord::new(3, 1)));
        let moved = session
            .bubbles()
            .find(|b| b.coord == HexCoord::new(3, 2))
            .unwrap();
        assert_eq!(moved.color, BubbleColor::Orange);
        assert_eq!(moved.position.y, 2.0 * 45.0 + 25.0);
        assert!(session
            .bubbles()
            .all(|b| b.coord.r == 0 || b.coord == HexCoord::new(3, 2)));
    }

    #[test]
    fn test_level_up_can_end_the_game() {
        let config = GameConfig {
            canvas_height: 300.0,
            ..GameConfig::default()
        };
        let mut session = session_with(config);
        session.grid.insert(HexCoord::new(0, 4), BubbleColor::Pink);

        let mut events = Vec::new();
        session.level_up(&mut events);

        // Row 5 sits at y = 250, its bottom edge at 275 is past the line at 250.
        assert_eq!(session.grid().get(HexCoord::new(0, 5)), Some(BubbleColor::Pink));
        assert_eq!(session.status(), GameStatus::GameOver);
        assert_eq!(
            events,
            vec![
                GameEvent::LevelUp {
                    level: 2,
                    ejected: 0
                },
                GameEvent::GameOver { score: 0, level: 2 },
            ]
        );
    }

    #[test]
    fn test_full_grid_discards_shot() {
        let config = GameConfig {
            rows: 2,
            cols: 2,
            ..GameConfig::default()
        };
        let mut session = session_with(config);
        for (coord, color) in [
            (HexCoord::new(0, 0), BubbleColor::Purple),
            (HexCoord::new(1, 0), BubbleColor::Pink),
            (HexCoord::new(0, 1), BubbleColor::Cyan),
            (HexCoord::new(1, 1), BubbleColor::Yellow),
        ] {
            session.grid.insert(coord, color);
        }
        session.preview = BubbleColor::Orange;
        aim_projectile(&mut session, BubbleColor::Green, Vec2::new(30.0, 27.0));

        assert_eq!(session.tick(), vec![GameEvent::ShotDiscarded]);
        assert_eq!(session.grid().len(), 4);
        assert!(session.bubbles().all(|b| b.color != BubbleColor::Green));
        assert_eq!(session.projectile().color, BubbleColor::Orange);
        assert!(!session.projectile().moving);
        assert_eq!(session.status(), GameStatus::Running);
    }

    #[test]
    fn test_bubble_near_floor_ends_game() {
        let config = GameConfig {
            canvas_height: 300.0,
            ..GameConfig::default()
        };
        let mut session = session_with(config);
        session.grid.insert(HexCoord::new(0, 5), BubbleColor::Green);

        let mut events = Vec::new();
        session.check_game_over(&mut events);
        assert_eq!(session.status(), GameStatus::GameOver);
        assert_eq!(events, vec![GameEvent::GameOver { score: 0, level: 1 }]);

        assert!(!session.fire());
        assert!(!session.adjust_angle(5.0));
        assert!(!session.set_angle(45.0));
        assert!(session.tick().is_empty());

        // Terminal: checking again does not report twice.
        let mut events = Vec::new();
        session.check_game_over(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_bubble_above_floor_keeps_running() {
        let config = GameConfig {
            canvas_height: 300.0,
            ..GameConfig::default()
        };
        let mut session = session_with(config);
        session.grid.insert(HexCoord::new(0, 4), BubbleColor::Green);

        let mut events = Vec::new();
        session.check_game_over(&mut events);
        assert_eq!(session.status(), GameStatus::Running);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = session();
        session.score = 120;
        session.level = 4;
        session.status = GameStatus::GameOver;
        session.angle = 40.0;

        assert_eq!(session.restart(), vec![GameEvent::Restarted]);
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.status(), GameStatus::Running);
        assert_eq!(session.angle(), 90.0);
        assert_eq!(session.grid().len(), 24);
    }
}
