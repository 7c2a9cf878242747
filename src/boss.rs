/*
Viking Run
*/
use bevy::math::bounding::{Aabb3d, IntersectsVolume};
use bevy::prelude::*;
use rand::RngExt;

use crate::audio::{PlaySfx, SfxKind};
use crate::camera::ScreenShake;
use crate::config::RunnerConfig;
use crate::game_state::{BossBeaten, BossLost, BossSpawned, RunState};
use crate::obstacles::is_far_behind;
use crate::player::{runner_bounds, Player};
use crate::track::{self, box_bounds, lane_x, LANE_COUNT};
use crate::world::LevelEntity;

/// Unscaled Boss Body
pub const BOSS_SIZE: Vec3 = Vec3::new(1.2, 2.4, 1.2);

const LETTER_KEYS: [KeyCode; 26] = [
    KeyCode::KeyA,
    KeyCode::KeyB,
    KeyCode::KeyC,
    KeyCode::KeyD,
    KeyCode::KeyE,
    KeyCode::KeyF,
    KeyCode::KeyG,
    KeyCode::KeyH,
    KeyCode::KeyI,
    KeyCode::KeyJ,
    KeyCode::KeyK,
    KeyCode::KeyL,
    KeyCode::KeyM,
    KeyCode::KeyN,
    KeyCode::KeyO,
    KeyCode::KeyP,
    KeyCode::KeyQ,
    KeyCode::KeyR,
    KeyCode::KeyS,
    KeyCode::KeyT,
    KeyCode::KeyU,
    KeyCode::KeyV,
    KeyCode::KeyW,
    KeyCode::KeyX,
    KeyCode::KeyY,
    KeyCode::KeyZ,
];

#[derive(Component, Debug, Clone, Copy)]
pub struct Boss {
    pub lane: usize,
    pub scale: f32,
}

impl Boss {
    pub fn size(&self) -> Vec3 {
        BOSS_SIZE * self.scale
    }

    pub fn bounds(&self, pos: Vec3) -> Aabb3d {
        box_bounds(pos, self.size())
    }
}

#[derive(Resource, Debug, Clone)]
pub struct BossSpawner {
    pub size_multiplier: f32,
    /// Cumulative Score That Last Triggered a Spawn
    pub last_trigger: u32,
}

impl BossSpawner {
    pub fn new(initial_size: f32) -> Self {
        Self {
            size_multiplier: initial_size,
            last_trigger: 0,
        }
    }

    /// Grows Before Every Spawn, Never Below Initial
    pub fn next_scale(&mut self, initial: f32, step: f32) -> f32 {
        self.size_multiplier = (self.size_multiplier + step).max(initial);
        self.size_multiplier
    }

    /// Every `every` Points of Cumulative Score, Once per Milestone
    pub fn should_spawn(&mut self, score: u32, every: u32) -> bool {
        if every == 0 || score == 0 || score % every != 0 || score == self.last_trigger {
            return false;
        }
        self.last_trigger = score;
        true
    }
}

pub fn boss_spawn_point(lane: usize, scale: f32, player_progress: f32, distance: f32) -> Vec3 {
    track::track_point(lane_x(lane), BOSS_SIZE.y * 0.5 * scale, player_progress + distance)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MashOutcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MashStep {
    Running,
    /// Caller Picks a New Key
    SwapKey,
    Finished(MashOutcome),
}

/// Boss Fight: Mash the Shown Letter Fast Enough
#[derive(Resource, Debug, Clone, Default)]
pub struct MashChallenge {
    active: bool,
    pub total_duration: f32,
    pub time_remaining: f32,
    pub key_swap_interval: f32,
    swap_timer: f32,
    pub required_rate: f32,
    pub mash_count: u32,
    key_index: usize,
}

impl MashChallenge {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self, config: &RunnerConfig, key_index: usize) {
        *self = Self {
            active: true,
            total_duration: config.mash_duration,
            time_remaining: config.mash_duration,
            key_swap_interval: config.mash_key_swap_interval,
            swap_timer: 0.0,
            required_rate: config.mash_required_rate,
            mash_count: 0,
            key_index: key_index % LETTER_KEYS.len(),
        };
    }

    pub fn key(&self) -> KeyCode {
        LETTER_KEYS[self.key_index]
    }

    pub fn key_letter(&self) -> char {
        char::from(b'A' + self.key_index as u8)
    }

    pub fn set_key(&mut self, key_index: usize) {
        self.key_index = key_index % LETTER_KEYS.len();
    }

    pub fn press(&mut self) {
        if self.active {
            self.mash_count += 1;
        }
    }

    pub fn outcome(&self) -> MashOutcome {
        if self.total_duration <= 0.0 {
            return MashOutcome::Lost;
        }
        let rate = self.mash_count as f32 / self.total_duration;
        if rate >= self.required_rate {
            MashOutcome::Won
        } else {
            MashOutcome::Lost
        }
    }

    pub fn tick(&mut self, dt: f32) -> MashStep {
        if !self.active {
            return MashStep::Running;
        }

        self.time_remaining -= dt;
        if self.time_remaining <= 0.0 {
            self.time_remaining = 0.0;
            self.active = false;
            return MashStep::Finished(self.outcome());
        }

        self.swap_timer += dt;
        if self.swap_timer >= self.key_swap_interval {
            self.swap_timer = 0.0;
            return MashStep::SwapKey;
        }
        MashStep::Running
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

fn random_key_index() -> usize {
    rand::rng().random_range(0..LETTER_KEYS.len())
}

pub fn spawn_boss_on_milestone(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<RunnerConfig>,
    state: Res<RunState>,
    mut spawner: ResMut<BossSpawner>,
    q_player: Query<&Transform, With<Player>>,
    q_boss: Query<Entity, With<Boss>>,
    mut spawned: MessageWriter<BossSpawned>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    if !spawner.should_spawn(state.score, config.boss_every) {
        return;
    }
    let Ok(player_tf) = q_player.single() else {
        return;
    };

    for e in q_boss.iter() {
        commands.entity(e).despawn();
    }

    let scale = spawner.next_scale(config.boss_initial_size, config.boss_size_step);
    let lane = rand::rng().random_range(0..LANE_COUNT);
    let pos = boss_spawn_point(
        lane,
        scale,
        track::progress(player_tf.translation),
        config.boss_spawn_distance,
    );

    commands.spawn((
        Name::new("boss"),
        LevelEntity,
        Boss { lane, scale },
        Mesh3d(meshes.add(Cuboid::from_size(BOSS_SIZE))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.12, 0.10))),
        Transform::from_translation(pos).with_scale(Vec3::splat(scale)),
    ));

    info!("Boss spawned in lane {lane} at x{scale}");
    spawned.write(BossSpawned);
    sfx.write(PlaySfx {
        kind: SfxKind::BossRoar,
        pos,
    });
}

pub fn detect_boss_collision(
    config: Res<RunnerConfig>,
    mut challenge: ResMut<MashChallenge>,
    q_player: Query<&Transform, With<Player>>,
    q_boss: Query<(&Transform, &Boss), Without<Player>>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    if challenge.is_active() {
        return;
    }
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let player_box = runner_bounds(player_tf.translation);

    for (tf, boss) in q_boss.iter() {
        if !player_box.intersects(&boss.bounds(tf.translation)) {
            continue;
        }

        challenge.start(&config, random_key_index());
        info!(
            "Boss fight! Mash {} ({} per second for {}s)",
            challenge.key_letter(),
            challenge.required_rate,
            challenge.total_duration
        );
        sfx.write(PlaySfx {
            kind: SfxKind::BossRoar,
            pos: tf.translation,
        });
        return;
    }
}

/// Minigame Loop; Runs Only While the Challenge is Active
pub fn run_mash_challenge(
    mut commands: Commands,
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<RunnerConfig>,
    mut challenge: ResMut<MashChallenge>,
    mut shake: ResMut<ScreenShake>,
    q_player: Query<&Transform, With<Player>>,
    q_boss: Query<Entity, With<Boss>>,
    mut beaten: MessageWriter<BossBeaten>,
    mut lost: MessageWriter<BossLost>,
    mut sfx: MessageWriter<PlaySfx>,
) {
    if keys.just_pressed(challenge.key()) {
        challenge.press();
        shake.trigger(config.shake_duration, config.shake_magnitude);
        let pos = q_player.single().map(|tf| tf.translation).unwrap_or_default();
        sfx.write(PlaySfx {
            kind: SfxKind::Mash,
            pos,
        });
    }

    match challenge.tick(time.delta_secs()) {
        MashStep::Running => {}
        MashStep::SwapKey => {
            challenge.set_key(random_key_index());
            debug!("Mash key is now {}", challenge.key_letter());
        }
        MashStep::Finished(MashOutcome::Won) => {
            info!("Boss defeated with {} mashes", challenge.mash_count);
            for e in q_boss.iter() {
                commands.entity(e).despawn();
            }
            beaten.write(BossBeaten);
            let pos = q_player.single().map(|tf| tf.translation).unwrap_or_default();
            sfx.write(PlaySfx {
                kind: SfxKind::BossWin,
                pos,
            });
        }
        MashStep::Finished(MashOutcome::Lost) => {
            info!("Boss fight lost with {} mashes", challenge.mash_count);
            lost.write(BossLost);
        }
    }
}

pub fn mash_challenge_running(challenge: Res<MashChallenge>, state: Res<RunState>) -> bool {
    challenge.is_active() && state.accepting_score()
}

pub fn cleanup_boss(
    mut commands: Commands,
    config: Res<RunnerConfig>,
    q_player: Query<&Transform, With<Player>>,
    q: Query<(Entity, &Transform), (With<Boss>, Without<Player>)>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let player = track::progress(player_tf.translation);

    for (e, tf) in q.iter() {
        if is_far_behind(track::progress(tf.translation), player, config.obstacle_cleanup_behind) {
            commands.entity(e).despawn();
        }
    }
}
