/*
Viking Run
*/
use bevy::math::bounding::{Aabb3d, IntersectsVolume};
use bevy::prelude::*;
use rand::RngExt;

use crate::audio::{PlaySfx, SfxKind};
use crate::config::RunnerConfig;
use crate::game_state::{ObstacleHit, ObstaclePassed};
use crate::player::{runner_bounds, Player, Shield};
use crate::track::{self, box_bounds, lane_x, LANE_COUNT};
use crate::world::LevelEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Log,
    Barrel,
    Rock,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Log, ObstacleKind::Barrel, ObstacleKind::Rock];

    pub const fn size(self) -> Vec3 {
        match self {
            ObstacleKind::Log => Vec3::new(1.6, 0.6, 0.8),
            ObstacleKind::Barrel => Vec3::new(1.0, 1.0, 1.0),
            ObstacleKind::Rock => Vec3::new(1.6, 1.5, 1.2),
        }
    }

    pub fn color(self) -> Color {
        match self {
            ObstacleKind::Log => Color::srgb(0.45, 0.30, 0.15),
            ObstacleKind::Barrel => Color::srgb(0.55, 0.38, 0.20),
            ObstacleKind::Rock => Color::srgb(0.50, 0.50, 0.52),
        }
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Obstacle {
    pub lane: usize,
    pub kind: ObstacleKind,
    pub scored: bool,
}

impl Obstacle {
    pub fn bounds(&self, pos: Vec3) -> Aabb3d {
        box_bounds(pos, self.kind.size())
    }
}

/// Ticks Up; Spawns When it Reaches Interval
#[derive(Resource, Debug, Clone)]
pub struct ObstacleSpawner {
    pub timer: f32,
}

impl ObstacleSpawner {
    /// Starts Full so First Obstacle Appears Immediately
    pub fn new(interval: f32) -> Self {
        Self { timer: interval }
    }

    pub fn tick(&mut self, dt: f32, interval: f32) -> bool {
        self.timer += dt;
        if self.timer < interval {
            return false;
        }
        self.timer = 0.0;
        true
    }
}

#[derive(Resource, Clone)]
pub struct ObstacleAssets {
    meshes: [Handle<Mesh>; 3],
    materials: [Handle<StandardMaterial>; 3],
}

impl FromWorld for ObstacleAssets {
    fn from_world(world: &mut World) -> Self {
        let meshes = {
            let mut m = world.resource_mut::<Assets<Mesh>>();
            ObstacleKind::ALL.map(|k| m.add(Cuboid::from_size(k.size())))
        };
        let materials = {
            let mut m = world.resource_mut::<Assets<StandardMaterial>>();
            ObstacleKind::ALL.map(|k| m.add(k.color()))
        };
        Self { meshes, materials }
    }
}

/// Obstacle Sits on Ground in Its Lane
pub fn obstacle_spawn_point(lane: usize, kind: ObstacleKind, player_progress: f32, distance: f32) -> Vec3 {
    track::track_point(lane_x(lane), kind.size().y * 0.5, player_progress + distance)
}

/// Has the Player Run Past It?
#[inline]
pub fn is_passed(obstacle_progress: f32, player_progress: f32) -> bool {
    obstacle_progress < player_progress
}

#[inline]
pub fn is_far_behind(progress: f32, player_progress: f32, behind: f32) -> bool {
    progress < player_progress - behind
}

pub fn spawn_obstacles(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<RunnerConfig>,
    assets: Res<ObstacleAssets>,
    mut spawner: ResMut<ObstacleSpawner>,
    q_player: Query<&Transform, With<Player>>,
) {
    if !spawner.tick(time.delta_secs(), config.obstacle_interval) {
        return;
    }
    let Ok(player_tf) = q_player.single() else {
        warn!("No player to spawn obstacles ahead of");
        return;
    };

    let mut rng = rand::rng();
    let lane = rng.random_range(0..LANE_COUNT);
    let kind_idx = rng.random_range(0..ObstacleKind::ALL.len());
    let kind = ObstacleKind::ALL[kind_idx];

    let pos = obstacle_spawn_point(
        lane,
        kind,
        track::progress(player_tf.translation),
        config.obstacle_spawn_distance,
    );

    commands.spawn((
        Name::new("obstacle"),
        LevelEntity,
        Obstacle { lane, kind, scored: false },
        Mesh3d(assets.meshes[kind_idx].clone()),
        MeshMaterial3d(assets.materials[kind_idx].clone()),
        Transform::from_translation(pos),
    ));
}

pub fn score_and_cleanup_obstacles(
    mut commands: Commands,
    config: Res<RunnerConfig>,
    q_player: Query<&Transform, With<Player>>,
    mut q: Query<(Entity, &Transform, &mut Obstacle), Without<Player>>,
    mut passed: MessageWriter<ObstaclePassed>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let player = track::progress(player_tf.translation);

    for (e, tf, mut obstacle) in q.iter_mut() {
        let p = track::progress(tf.translation);

        if !obstacle.scored && is_passed(p, player) {
            obstacle.scored = true;
            passed.write(ObstaclePassed);
        }

        if is_far_behind(p, player, config.obstacle_cleanup_behind) {
            commands.entity(e).despawn();
        }
    }
}

pub fn detect_obstacle_collisions(
    mut commands: Commands,
    q_player: Query<(Entity, &Transform, Option<&Shield>), With<Player>>,
    q: Query<(Entity, &Transform, &Obstacle), Without<Player>>,
    mut hit: MessageWriter<ObstacleHit>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    let Ok((player_e, player_tf, shield)) = q_player.single() else {
        return;
    };
    let player_box = runner_bounds(player_tf.translation);

    for (e, tf, obstacle) in q.iter() {
        if !player_box.intersects(&obstacle.bounds(tf.translation)) {
            continue;
        }

        if shield.is_some() {
            commands.entity(player_e).remove::<Shield>();
            commands.entity(e).despawn();
            sfx.write(PlaySfx {
                kind: SfxKind::ShieldBreak,
                pos: tf.translation,
            });
            info!("Shield absorbed a {:?}", obstacle.kind);
        } else {
            hit.write(ObstacleHit);
            sfx.write(PlaySfx {
                kind: SfxKind::Crash,
                pos: tf.translation,
            });
        }
        // One Collision per Frame
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::MessageCursor;
    use crate::player::RUNNER_HALF_HEIGHT;

    fn obstacle_app() -> App {
        let mut app = App::new();
        app.insert_resource(RunnerConfig::default())
            .add_message::<ObstacleHit>()
            .add_message::<ObstaclePassed>()
            .add_message::<PlaySfx>()
            .add_systems(
                Update,
                (score_and_cleanup_obstacles, detect_obstacle_collisions).chain(),
            );
        app
    }

    fn spawn_runner(app: &mut App, progress: f32) -> Entity {
        app.world_mut()
            .spawn((
                Player,
                Transform::from_translation(track::track_point(0.0, RUNNER_HALF_HEIGHT, progress)),
            ))
            .id()
    }

    fn spawn_rock(app: &mut App, progress: f32) -> Entity {
        let kind = ObstacleKind::Rock;
        app.world_mut()
            .spawn((
                Obstacle { lane: 1, kind, scored: false },
                Transform::from_translation(obstacle_spawn_point(1, kind, progress, 0.0)),
            ))
            .id()
    }

    fn count<M: Message>(app: &App, cursor: &mut MessageCursor<M>) -> usize {
        cursor.read(app.world().resource::<Messages<M>>()).count()
    }

    #[test]
    fn spawner_fires_immediately_then_every_interval() {
        let mut s = ObstacleSpawner::new(5.0);
        assert!(s.tick(0.016, 5.0));
        assert!(!s.tick(2.5, 5.0));
        assert!(!s.tick(2.4, 5.0));
        assert!(s.tick(0.2, 5.0));
        assert_eq!(s.timer, 0.0);
    }

    #[test]
    fn spawn_point_is_ahead_in_lane_on_ground() {
        let p = obstacle_spawn_point(0, ObstacleKind::Rock, 10.0, 20.0);
        assert_eq!(p.x, -2.0);
        assert_eq!(p.y, 0.75);
        assert_eq!(track::progress(p), 30.0);
    }

    #[test]
    fn passed_and_cleanup_thresholds() {
        assert!(!is_passed(10.0, 10.0));
        assert!(is_passed(9.9, 10.0));
        assert!(!is_far_behind(0.5, 10.0, 10.0));
        assert!(is_far_behind(-0.5, 10.0, 10.0));
    }

    #[test]
    fn jumping_clears_a_log_but_not_a_rock() {
        let log = Obstacle { lane: 1, kind: ObstacleKind::Log, scored: false };
        let rock = Obstacle { lane: 1, kind: ObstacleKind::Rock, scored: false };
        let log_pos = obstacle_spawn_point(1, ObstacleKind::Log, 0.0, 5.0);
        let rock_pos = obstacle_spawn_point(1, ObstacleKind::Rock, 0.0, 5.0);

        let standing = runner_bounds(track::track_point(0.0, RUNNER_HALF_HEIGHT, 5.0));
        assert!(standing.intersects(&log.bounds(log_pos)));

        // Feet at 1.0 After Jump
        let airborne = runner_bounds(track::track_point(0.0, RUNNER_HALF_HEIGHT + 1.0, 5.0));
        assert!(!airborne.intersects(&log.bounds(log_pos)));
        assert!(airborne.intersects(&rock.bounds(rock_pos)));
    }

    #[test]
    fn neighbouring_lane_does_not_collide() {
        let rock = Obstacle { lane: 0, kind: ObstacleKind::Rock, scored: false };
        let pos = obstacle_spawn_point(0, ObstacleKind::Rock, 0.0, 5.0);
        let runner = runner_bounds(track::track_point(0.0, RUNNER_HALF_HEIGHT, 5.0));
        assert!(!runner.intersects(&rock.bounds(pos)));
    }

    #[test]
    fn shield_absorbs_exactly_one_hit() {
        let mut app = obstacle_app();
        let mut hits = MessageCursor::<ObstacleHit>::default();
        let runner = spawn_runner(&mut app, 5.0);
        app.world_mut().entity_mut(runner).insert(Shield);
        spawn_rock(&mut app, 5.0);
        spawn_rock(&mut app, 5.2);

        app.update();
        assert_eq!(count(&app, &mut hits), 0);
        assert!(app.world().get::<Shield>(runner).is_none());
        let world = app.world_mut();
        assert_eq!(world.query::<&Obstacle>().iter(world).count(), 1);

        app.update();
        assert_eq!(count(&app, &mut hits), 1);
    }

    #[test]
    fn passing_an_obstacle_scores_once() {
        let mut app = obstacle_app();
        let mut passed = MessageCursor::<ObstaclePassed>::default();
        spawn_runner(&mut app, 0.0);
        let rock = spawn_rock(&mut app, -3.0);

        let mut total = 0;
        for _ in 0..3 {
            app.update();
            total += count(&app, &mut passed);
        }
        assert_eq!(total, 1);
        assert!(app.world().get::<Obstacle>(rock).is_some_and(|o| o.scored));
    }

    #[test]
    fn obstacles_far_behind_are_removed() {
        let mut app = obstacle_app();
        spawn_runner(&mut app, 0.0);
        let rock = spawn_rock(&mut app, -10.5);
        app.update();
        assert!(app.world().get_entity(rock).is_err());
    }
}
