/*
Viking Run
*/
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::boss::{BossSpawner, MashChallenge};
use crate::camera::ScreenShake;
use crate::config::RunnerConfig;
use crate::game_state::{MainMenuRequested, RestartRequested, RunState, Screen};
use crate::level::{CurrentLevel, Level, LevelTransitionRequested};
use crate::world::{build_level, despawn_level, LevelEntity};

/// Tear Down + Rebuild of the Level World
#[derive(SystemParam)]
pub struct LevelRebuild<'w, 's> {
    commands: Commands<'w, 's>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    config: Res<'w, RunnerConfig>,
    challenge: ResMut<'w, MashChallenge>,
    shake: ResMut<'w, ScreenShake>,
    q_level: Query<'w, 's, Entity, With<LevelEntity>>,
}

impl LevelRebuild<'_, '_> {
    /// Power-Ups, Minigame and Shake Never Survive a Rebuild
    pub fn clear(&mut self) {
        despawn_level(&mut self.commands, &self.q_level);
        self.challenge.cancel();
        self.shake.stop();
    }

    pub fn rebuild(&mut self, level: Level) {
        self.clear();
        build_level(
            &mut self.commands,
            &mut self.meshes,
            &mut self.materials,
            &self.config,
            level,
        );
    }

    pub fn reset_boss_spawner(&mut self) {
        self.commands
            .insert_resource(BossSpawner::new(self.config.boss_initial_size));
    }
}

/// Fresh Run From the Main Menu Always Starts at the First Level
pub fn start_run(
    mut rebuild: LevelRebuild,
    mut current: ResMut<CurrentLevel>,
    mut state: ResMut<RunState>,
    mut time: ResMut<Time<Virtual>>,
) {
    state.reset();
    time.unpause();
    current.0 = Level::Start;
    rebuild.reset_boss_spawner();
    rebuild.rebuild(Level::Start);

    info!("Run started");
}

pub fn restart_run(
    mut requests: MessageReader<RestartRequested>,
    mut rebuild: LevelRebuild,
    current: Res<CurrentLevel>,
    mut state: ResMut<RunState>,
    mut time: ResMut<Time<Virtual>>,
) {
    if requests.read().count() == 0 {
        return;
    }

    state.reset();
    time.unpause();
    rebuild.reset_boss_spawner();
    rebuild.rebuild(current.0);

    info!("Restart: {} reloaded, run state reset", current.0.name());
}

pub fn advance_level(
    mut requests: MessageReader<LevelTransitionRequested>,
    mut rebuild: LevelRebuild,
    mut current: ResMut<CurrentLevel>,
    mut state: ResMut<RunState>,
) {
    // Several in One Frame: Last One Wins
    let Some(LevelTransitionRequested(level)) = requests.read().last().copied() else {
        return;
    };
    if state.game_over {
        return;
    }

    current.0 = level;
    state.enter_level();
    rebuild.rebuild(level);

    info!(
        "Advance Level: {} (score {}, levels beaten {})",
        level.name(),
        state.score,
        state.levels_beaten
    );
}

pub fn return_to_main_menu(
    mut requests: MessageReader<MainMenuRequested>,
    mut rebuild: LevelRebuild,
    mut state: ResMut<RunState>,
    mut time: ResMut<Time<Virtual>>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if requests.read().count() == 0 {
        return;
    }

    time.unpause();
    state.reset();
    rebuild.clear();
    next_screen.set(Screen::MainMenu);

    info!("Back to main menu");
}
