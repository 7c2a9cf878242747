/*
Viking Run
*/
use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

use crate::audio::{PlaySfx, SfxKind};
use crate::config::RunnerConfig;
use crate::track::{self, box_bounds, lane_x, step_lane};
use crate::world::LevelEntity;

pub const RUNNER_SIZE: Vec3 = Vec3::new(0.8, 1.6, 0.8);
pub const RUNNER_HALF_HEIGHT: f32 = 0.8;
pub const START_LANE: usize = 1;

#[derive(Component)]
pub struct Player;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Runner {
    pub lane: usize,
    /// Current Forward Speed (Berry Slows This)
    pub speed: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
}

impl Runner {
    pub fn new(speed: f32) -> Self {
        Self {
            lane: START_LANE,
            speed,
            vertical_velocity: 0.0,
            grounded: true,
        }
    }
}

/// Berry: Slowed Until `remaining` Runs Out
#[derive(Component, Debug, Clone, Copy)]
pub struct SlowEffect {
    pub remaining: f32,
}

/// Absorbs Next Obstacle Hit
#[derive(Component, Debug, Clone, Copy)]
pub struct Shield;

pub fn runner_bounds(pos: Vec3) -> Aabb3d {
    box_bounds(pos, RUNNER_SIZE)
}

/// One Step of Jump Arc; Lands at Ground Height
/// Returns (y, vertical_velocity, grounded)
pub fn integrate_jump(y: f32, vy: f32, gravity: f32, dt: f32) -> (f32, f32, bool) {
    let vy = vy + gravity * dt;
    let y = y + vy * dt;
    if y <= RUNNER_HALF_HEIGHT {
        (RUNNER_HALF_HEIGHT, 0.0, true)
    } else {
        (y, vy, false)
    }
}

pub fn spawn_player(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    config: &RunnerConfig,
) -> Entity {
    commands
        .spawn((
            Name::new("player"),
            LevelEntity,
            Player,
            Runner::new(config.player_speed),
            Mesh3d(meshes.add(Cuboid::from_size(RUNNER_SIZE))),
            MeshMaterial3d(materials.add(Color::srgb(0.75, 0.55, 0.30))),
            Transform::from_translation(track::track_point(
                lane_x(START_LANE),
                RUNNER_HALF_HEIGHT,
                0.0,
            )),
        ))
        .id()
}

// A / Left and D / Right, One Lane per Press
pub fn switch_lane(
    keys: Res<ButtonInput<KeyCode>>,
    mut q: Query<(&mut Transform, &mut Runner), With<Player>>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    let Ok((mut tf, mut runner)) = q.single_mut() else {
        return;
    };

    let mut dir = 0;
    if keys.any_just_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        dir -= 1;
    }
    if keys.any_just_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        dir += 1;
    }
    if dir == 0 {
        return;
    }

    let target = step_lane(runner.lane, dir);
    if target == runner.lane {
        return;
    }

    runner.lane = target;
    tf.translation.x = lane_x(target);

    sfx.write(PlaySfx {
        kind: SfxKind::LaneSwitch,
        pos: tf.translation,
    });
}

pub fn jump(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<RunnerConfig>,
    mut q: Query<(&Transform, &mut Runner), With<Player>>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    if !keys.any_just_pressed([KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp]) {
        return;
    }
    let Ok((tf, mut runner)) = q.single_mut() else {
        return;
    };
    if !runner.grounded {
        return;
    }

    runner.grounded = false;
    runner.vertical_velocity = config.jump_velocity;

    sfx.write(PlaySfx {
        kind: SfxKind::Jump,
        pos: tf.translation,
    });
}

pub fn run_forward(
    time: Res<Time<Fixed>>,
    config: Res<RunnerConfig>,
    mut q: Query<(&mut Transform, &mut Runner), With<Player>>,
) {
    let Ok((mut tf, mut runner)) = q.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    tf.translation += track::FORWARD * runner.speed * dt;

    if runner.grounded {
        return;
    }

    let (y, vy, grounded) =
        integrate_jump(tf.translation.y, runner.vertical_velocity, config.gravity, dt);
    tf.translation.y = y;
    runner.vertical_velocity = vy;
    runner.grounded = grounded;
}

pub fn tick_slow_effect(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<RunnerConfig>,
    mut q: Query<(Entity, &mut Runner, &mut SlowEffect), With<Player>>,
) {
    for (e, mut runner, mut slow) in q.iter_mut() {
        slow.remaining -= time.delta_secs();
        if slow.remaining > 0.0 {
            continue;
        }
        runner.speed = config.player_speed;
        commands.entity(e).remove::<SlowEffect>();
        info!("Berry slow wore off, speed back to {}", config.player_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_rises_then_lands_on_ground() {
        let (mut y, mut vy, mut grounded) = (RUNNER_HALF_HEIGHT, 7.0, false);
        let mut apex = y;
        let dt = 1.0 / 60.0;

        for _ in 0..240 {
            (y, vy, grounded) = integrate_jump(y, vy, -20.0, dt);
            apex = apex.max(y);
            if grounded {
                break;
            }
        }

        assert!(grounded);
        assert_eq!(y, RUNNER_HALF_HEIGHT);
        assert_eq!(vy, 0.0);
        // v^2 / 2g ~= 1.22
        assert!(apex - RUNNER_HALF_HEIGHT > 1.0);
        assert!(apex - RUNNER_HALF_HEIGHT < 1.3);
    }

    #[test]
    fn new_runner_starts_grounded_in_middle_lane() {
        let r = Runner::new(4.0);
        assert_eq!(r.lane, 1);
        assert!(r.grounded);
        assert_eq!(r.speed, 4.0);
    }

    #[test]
    fn bounds_are_centered_on_runner() {
        let b = runner_bounds(Vec3::new(0.0, RUNNER_HALF_HEIGHT, -3.0));
        assert_eq!(b.min.y, 0.0);
        assert!((b.max.y - 1.6).abs() < 1e-6);
        assert!((b.min.x + 0.4).abs() < 1e-6);
    }
}
