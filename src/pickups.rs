/*
Viking Run
*/
use bevy::math::bounding::{Aabb3d, BoundingSphere, IntersectsVolume};
use bevy::prelude::*;
use rand::RngExt;

use crate::audio::{PlaySfx, SfxKind};
use crate::config::RunnerConfig;
use crate::game_state::PickupActivated;
use crate::obstacles::{is_far_behind, Obstacle};
use crate::player::{runner_bounds, Player, Runner, Shield, SlowEffect};
use crate::track::{self, lane_x, LANE_COUNT};
use crate::world::LevelEntity;

pub const PICKUP_HEIGHT: f32 = 0.5;
pub const PICKUP_RADIUS: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickupKind {
    /// Slows Runner for a While
    Berry,
    /// Summons Wolf Guide
    Wolf,
    /// Absorbs One Hit
    Shield,
}

impl PickupKind {
    pub const ALL: [PickupKind; 3] = [PickupKind::Berry, PickupKind::Wolf, PickupKind::Shield];

    pub fn color(self) -> Color {
        match self {
            PickupKind::Berry => Color::srgb(0.70, 0.10, 0.35),
            PickupKind::Wolf => Color::srgb(0.62, 0.64, 0.70),
            PickupKind::Shield => Color::srgb(0.85, 0.70, 0.20),
        }
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Pickup {
    pub kind: PickupKind,
}

#[derive(Resource, Debug, Clone)]
pub struct PickupSpawner {
    pub timer: f32,
}

impl PickupSpawner {
    pub fn new(interval: f32) -> Self {
        Self { timer: interval }
    }

    /// Timer Resets Whether or Not Spawn Succeeds
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
pub struct PickupAssets {
    mesh: Handle<Mesh>,
    materials: [Handle<StandardMaterial>; 3],
}

impl FromWorld for PickupAssets {
    fn from_world(world: &mut World) -> Self {
        let mesh = world
            .resource_mut::<Assets<Mesh>>()
            .add(Sphere::new(PICKUP_RADIUS));
        let materials = {
            let mut m = world.resource_mut::<Assets<StandardMaterial>>();
            PickupKind::ALL.map(|k| {
                m.add(StandardMaterial {
                    base_color: k.color(),
                    emissive: k.color().to_linear() * 0.6,
                    ..default()
                })
            })
        };
        Self { mesh, materials }
    }
}

pub fn pickup_spawn_point(lane: usize, player_progress: f32, distance: f32) -> Vec3 {
    track::track_point(lane_x(lane), PICKUP_HEIGHT, player_progress + distance)
}

/// Clearance Sphere Must Not Touch Any Obstacle
pub fn spawn_point_is_clear(point: Vec3, radius: f32, obstacles: &[Aabb3d]) -> bool {
    let clearance = BoundingSphere::new(point, radius);
    !obstacles.iter().any(|b| clearance.intersects(b))
}

pub fn spawn_pickups(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<RunnerConfig>,
    assets: Res<PickupAssets>,
    mut spawner: ResMut<PickupSpawner>,
    q_player: Query<&Transform, With<Player>>,
    q_obstacles: Query<(&Transform, &Obstacle)>,
) {
    if !spawner.tick(time.delta_secs(), config.pickup_interval) {
        return;
    }
    let Ok(player_tf) = q_player.single() else {
        warn!("Player missing, cannot spawn pickup");
        return;
    };

    let mut rng = rand::rng();
    let lane = rng.random_range(0..LANE_COUNT);
    let point = pickup_spawn_point(
        lane,
        track::progress(player_tf.translation),
        config.pickup_spawn_distance,
    );

    let blockers: Vec<Aabb3d> = q_obstacles
        .iter()
        .map(|(tf, o)| o.bounds(tf.translation))
        .collect();

    if !spawn_point_is_clear(point, config.pickup_clearance_radius, &blockers) {
        debug!("Pickup spawn in lane {lane} blocked by obstacle, skipping");
        return;
    }

    let kind_idx = rng.random_range(0..PickupKind::ALL.len());
    let kind = PickupKind::ALL[kind_idx];

    commands.spawn((
        Name::new("pickup"),
        LevelEntity,
        Pickup { kind },
        Mesh3d(assets.mesh.clone()),
        MeshMaterial3d(assets.materials[kind_idx].clone()),
        Transform::from_translation(point),
    ));
}

pub fn collect_pickups(
    mut commands: Commands,
    config: Res<RunnerConfig>,
    mut q_player: Query<(Entity, &Transform, &mut Runner), With<Player>>,
    q: Query<(Entity, &Transform, &Pickup), Without<Player>>,
    mut activated: MessageWriter<PickupActivated>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    let Ok((player_e, player_tf, mut runner)) = q_player.single_mut() else {
        return;
    };
    let player_box = runner_bounds(player_tf.translation);

    for (e, tf, pickup) in q.iter() {
        let sphere = BoundingSphere::new(tf.translation, PICKUP_RADIUS);
        if !sphere.intersects(&player_box) {
            continue;
        }

        commands.entity(e).despawn();

        match pickup.kind {
            PickupKind::Berry => {
                runner.speed = config.slowed_speed;
                commands.entity(player_e).insert(SlowEffect {
                    remaining: config.slow_duration,
                });
            }
            PickupKind::Shield => {
                commands.entity(player_e).insert(Shield);
            }
            // Wolf Plugin Reacts to the Message
            PickupKind::Wolf => {}
        }

        activated.write(PickupActivated { kind: pickup.kind });
        sfx.write(PlaySfx {
            kind: SfxKind::Pickup(pickup.kind),
            pos: tf.translation,
        });
    }
}

pub fn cleanup_pickups(
    mut commands: Commands,
    config: Res<RunnerConfig>,
    q_player: Query<&Transform, With<Player>>,
    q: Query<(Entity, &Transform), (With<Pickup>, Without<Player>)>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let player = track::progress(player_tf.translation);

    for (e, tf) in q.iter() {
        if is_far_behind(track::progress(tf.translation), player, config.pickup_cleanup_behind) {
            commands.entity(e).despawn();
        }
    }
}
