/*
Viking Run
*/
use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;

use crate::config::RunnerConfig;
use crate::game_state::PickupActivated;
use crate::obstacles::Obstacle;
use crate::pickups::PickupKind;
use crate::player::{Player, Runner};
use crate::track::{self, lane_x, LANE_COUNT};
use crate::world::LevelEntity;

const WOLF_SIZE: Vec3 = Vec3::new(0.6, 0.7, 1.2);
const WOLF_HALF_HEIGHT: f32 = 0.35;

// Ray Starts Slightly Above and Ahead of Wolf
const RAY_LIFT: f32 = 0.5;
const RAY_NUDGE: f32 = 0.2;

/// Guide That Runs Ahead and Picks Clear Lanes
#[derive(Component, Debug, Clone)]
pub struct Wolf {
    pub active: bool,
    pub elapsed: f32,
    pub duration: f32,
    pub lane: usize,
    pub target_x: f32,
    pub pathfinding: Timer,
}

impl Wolf {
    pub fn new(check_interval: f32) -> Self {
        Self {
            active: false,
            elapsed: 0.0,
            duration: 0.0,
            lane: 1,
            target_x: lane_x(1),
            pathfinding: Timer::from_seconds(check_interval, TimerMode::Repeating),
        }
    }

    /// True When the Wolf Newly Appears
    /// Already Active: Only Timer and Duration Reset
    pub fn activate(&mut self, duration: f32, player_lane: usize) -> bool {
        self.elapsed = 0.0;
        self.duration = duration;
        if self.active {
            return false;
        }
        self.active = true;
        self.lane = player_lane;
        self.target_x = lane_x(player_lane);
        self.pathfinding.reset();
        true
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
        self.pathfinding.reset();
    }

    /// Advances the Clock; False Once Time is Up
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed < self.duration
    }

    pub fn retarget(&mut self, lane: usize) -> bool {
        if lane == self.lane {
            return false;
        }
        self.lane = lane;
        self.target_x = lane_x(lane);
        true
    }
}

#[derive(Component)]
pub struct WolfTrail;

/// Lane x Lerp Step, Clamped so It Never Overshoots
pub fn approach_lane(x: f32, target_x: f32, dt: f32, switch_speed: f32) -> f32 {
    x + (target_x - x) * (dt * switch_speed).min(1.0)
}

/// `hits[i]` = Distance to Nearest Obstacle in Lane i (None = Clear)
pub fn choose_safe_lane(current: usize, hits: &[Option<f32>]) -> usize {
    let clear = hits
        .iter()
        .enumerate()
        .filter(|(_, h)| h.is_none())
        .map(|(i, _)| i)
        .min_by_key(|i| (i.abs_diff(current), *i));

    if let Some(lane) = clear {
        return lane;
    }

    // Everything Blocked: Take the Lane Whose Hit is Farthest
    let mut best = current;
    let mut best_dist = f32::NEG_INFINITY;
    for (i, h) in hits.iter().enumerate() {
        if let Some(d) = h
            && *d > best_dist
        {
            best = i;
            best_dist = *d;
        }
    }
    best
}

/// Nearest Hit Along Lane Within `look_ahead`
pub fn lane_hit(lane: usize, wolf_pos: Vec3, look_ahead: f32, obstacles: &[Aabb3d]) -> Option<f32> {
    let origin = track::track_point(
        lane_x(lane),
        wolf_pos.y + RAY_LIFT,
        track::progress(wolf_pos) + RAY_NUDGE,
    );
    let ray = RayCast3d::new(origin, Dir3::NEG_Z, look_ahead);

    obstacles
        .iter()
        .filter_map(|b| ray.aabb_intersection_at(b))
        .min_by(|a, b| a.total_cmp(b))
}

pub fn spawn_wolf(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    config: &RunnerConfig,
) -> Entity {
    let trail_mat = materials.add(StandardMaterial {
        base_color: Color::srgba(0.6, 0.8, 1.0, 0.5),
        emissive: LinearRgba::rgb(0.4, 0.6, 1.0),
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    commands
        .spawn((
            Name::new("wolf"),
            LevelEntity,
            Wolf::new(config.wolf_check_interval),
            Mesh3d(meshes.add(Cuboid::from_size(WOLF_SIZE))),
            MeshMaterial3d(materials.add(Color::srgb(0.55, 0.57, 0.62))),
            Transform::from_translation(track::track_point(lane_x(1), WOLF_HALF_HEIGHT, 0.0)),
            Visibility::Hidden,
        ))
        .with_children(|p| {
            p.spawn((
                Name::new("wolf trail"),
                WolfTrail,
                Mesh3d(meshes.add(Cuboid::new(0.15, 0.05, 2.5))),
                MeshMaterial3d(trail_mat),
                Transform::from_xyz(0.0, -0.3, 1.6),
            ));
        })
        .id()
}

pub fn activate_wolf_on_pickup(
    mut activated: MessageReader<PickupActivated>,
    config: Res<RunnerConfig>,
    q_player: Query<(&Transform, &Runner), (With<Player>, Without<Wolf>)>,
    mut q_wolf: Query<(&mut Transform, &mut Visibility, &mut Wolf)>,
) {
    if !activated.read().any(|p| p.kind == PickupKind::Wolf) {
        return;
    }
    let Ok((player_tf, runner)) = q_player.single() else {
        return;
    };
    let Ok((mut tf, mut vis, mut wolf)) = q_wolf.single_mut() else {
        warn!("Wolf pickup collected but no wolf in level");
        return;
    };

    if !wolf.activate(config.wolf_duration, runner.lane) {
        debug!("Wolf already running, timer reset");
        return;
    }

    tf.translation = track::track_point(
        lane_x(runner.lane),
        WOLF_HALF_HEIGHT,
        track::progress(player_tf.translation) + config.wolf_lead_distance,
    );
    *vis = Visibility::Visible;
    info!("Wolf summoned for {}s", config.wolf_duration);
}

pub fn wolf_follow(
    time: Res<Time>,
    config: Res<RunnerConfig>,
    q_player: Query<&Transform, (With<Player>, Without<Wolf>)>,
    mut q_wolf: Query<(&mut Transform, &mut Visibility, &mut Wolf)>,
) {
    let Ok((mut tf, mut vis, mut wolf)) = q_wolf.single_mut() else {
        return;
    };
    if !wolf.active {
        return;
    }

    let dt = time.delta_secs();
    let Ok(player_tf) = q_player.single() else {
        wolf.deactivate();
        *vis = Visibility::Hidden;
        return;
    };
    if !wolf.tick(dt) {
        wolf.deactivate();
        *vis = Visibility::Hidden;
        info!("Wolf left");
        return;
    }

    let x = approach_lane(tf.translation.x, wolf.target_x, dt, config.wolf_lane_switch_speed);
    tf.translation = track::track_point(
        x,
        tf.translation.y,
        track::progress(player_tf.translation) + config.wolf_lead_distance,
    );
}

pub fn wolf_pathfinding(
    time: Res<Time>,
    config: Res<RunnerConfig>,
    q_obstacles: Query<(&Transform, &Obstacle)>,
    mut q_wolf: Query<(&Transform, &mut Wolf)>,
) {
    let Ok((tf, mut wolf)) = q_wolf.single_mut() else {
        return;
    };
    if !wolf.active || !wolf.pathfinding.tick(time.delta()).just_finished() {
        return;
    }

    let blockers: Vec<Aabb3d> = q_obstacles
        .iter()
        .map(|(otf, o)| o.bounds(otf.translation))
        .collect();

    let hits: Vec<Option<f32>> = (0..LANE_COUNT)
        .map(|lane| lane_hit(lane, tf.translation, config.wolf_look_ahead, &blockers))
        .collect();

    let lane = choose_safe_lane(wolf.lane, &hits);
    if wolf.retarget(lane) {
        debug!("Wolf switching to lane {lane} ({hits:?})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::{obstacle_spawn_point, ObstacleKind};

    #[test]
    fn stays_in_current_lane_when_clear() {
        assert_eq!(choose_safe_lane(1, &[Some(3.0), None, None]), 1);
    }

    #[test]
    fn moves_to_nearest_clear_lane_ties_go_low() {
        assert_eq!(choose_safe_lane(1, &[None, Some(4.0), None]), 0);
        assert_eq!(choose_safe_lane(0, &[Some(2.0), Some(5.0), None]), 2);
        assert_eq!(choose_safe_lane(2, &[None, None, Some(1.0)]), 1);
    }

    #[test]
    fn all_blocked_picks_farthest_hit() {
        assert_eq!(choose_safe_lane(0, &[Some(2.0), Some(9.0), Some(4.0)]), 1);
        assert_eq!(choose_safe_lane(2, &[Some(6.0), Some(6.0), Some(1.0)]), 0);
    }

    #[test]
    fn activate_twice_only_resets_clock() {
        let mut w = Wolf::new(0.2);
        assert!(w.activate(15.0, 0));
        w.retarget(2);
        assert!(w.tick(10.0));
        assert!(!w.activate(15.0, 1));
        assert_eq!(w.elapsed, 0.0);
        assert_eq!(w.lane, 2);
        assert!(w.tick(14.9));
        assert!(!w.tick(0.2));
    }

    #[test]
    fn lerp_never_overshoots() {
        assert_eq!(approach_lane(0.0, 2.0, 1.0, 12.0), 2.0);
        let x = approach_lane(0.0, 2.0, 1.0 / 60.0, 12.0);
        assert!((x - 0.4).abs() < 1e-5);
    }

    #[test]
    fn ray_sees_obstacle_ahead_in_its_lane_only() {
        let wolf = track::track_point(lane_x(1), WOLF_HALF_HEIGHT, 5.0);
        let pos = obstacle_spawn_point(1, ObstacleKind::Barrel, 5.0, 8.0);
        let barrel = Obstacle { lane: 1, kind: ObstacleKind::Barrel, scored: false }.bounds(pos);

        let d = lane_hit(1, wolf, 15.0, &[barrel]);
        assert!(d.is_some_and(|d| d > 7.0 && d < 8.0));
        assert_eq!(lane_hit(0, wolf, 15.0, &[barrel]), None);
        assert_eq!(lane_hit(1, wolf, 5.0, &[barrel]), None);
    }

    fn follow_app(duration: f32) -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(RunnerConfig::default())
            .add_systems(Update, wolf_follow);
        app.world_mut().spawn((
            Player,
            Transform::from_translation(track::track_point(0.0, 0.8, 0.0)),
        ));
        let mut wolf = Wolf::new(0.2);
        wolf.activate(duration, 1);
        app.world_mut()
            .spawn((wolf, Transform::default(), Visibility::Visible));
        app
    }

    fn step(app: &mut App, secs: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(std::time::Duration::from_secs_f32(secs));
        app.update();
    }

    #[test]
    fn wolf_runs_ahead_then_leaves_on_timeout() {
        let mut app = follow_app(1.0);

        step(&mut app, 0.6);
        let world = app.world_mut();
        let (tf, vis, wolf) = world
            .query::<(&Transform, &Visibility, &Wolf)>()
            .single(world)
            .unwrap();
        assert!(wolf.active);
        assert_eq!(*vis, Visibility::Visible);
        assert!((track::progress(tf.translation) - 5.0).abs() < 1e-4);

        step(&mut app, 0.6);
        let world = app.world_mut();
        let (vis, wolf) = world.query::<(&Visibility, &Wolf)>().single(world).unwrap();
        assert!(!wolf.active);
        assert_eq!(*vis, Visibility::Hidden);
    }
}
