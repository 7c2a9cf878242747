/*
Viking Run
*/
use bevy::prelude::*;
use rand::RngExt;

use crate::boss::MashChallenge;
use crate::config::RunnerConfig;
use crate::leaderboard;
use crate::level::{transition_target, CurrentLevel, LevelTransitionRequested};
use crate::pickups::PickupKind;
use crate::profile::PlayerProfile;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    MainMenu,
    Run,
}

/// Score / Pause / Game Over for the Current Run
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    pub score: u32,
    pub levels_beaten: u32,
    /// Obstacles Passed Since Entering Current Level
    pub level_progress: u32,
    pub game_over: bool,
    pub paused: bool,
}

impl RunState {
    #[inline]
    pub fn accepting_score(&self) -> bool {
        !self.game_over && !self.paused
    }

    pub fn obstacle_passed(&mut self) -> bool {
        if !self.accepting_score() {
            return false;
        }
        self.score += 1;
        self.level_progress += 1;
        true
    }

    pub fn boss_beaten(&mut self) -> bool {
        if !self.accepting_score() {
            return false;
        }
        self.levels_beaten += 1;
        true
    }

    pub fn add_score(&mut self, points: u32) -> bool {
        if !self.accepting_score() {
            return false;
        }
        self.score += points;
        true
    }

    /// True Only the First Time (Latched)
    pub fn latch_game_over(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        true
    }

    /// None if Game Over, Otherwise the New Paused Flag
    pub fn toggle_pause(&mut self) -> Option<bool> {
        if self.game_over {
            return None;
        }
        self.paused = !self.paused;
        Some(self.paused)
    }

    /// Displayed Score Carries Across Levels; Only Threshold Progress Restarts
    pub fn enter_level(&mut self) {
        self.level_progress = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Message, Debug, Clone, Copy)]
pub struct ObstaclePassed;

#[derive(Message, Debug, Clone, Copy)]
pub struct PickupActivated {
    pub kind: PickupKind,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct BossSpawned;

#[derive(Message, Debug, Clone, Copy)]
pub struct BossBeaten;

#[derive(Message, Debug, Clone, Copy)]
pub struct BossLost;

#[derive(Message, Debug, Clone, Copy)]
pub struct ObstacleHit;

#[derive(Message, Debug, Clone, Copy)]
pub struct AddScore(pub u32);

/// Profile Best Was Raised; Saved + Submitted Off the Game-Over Path
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct NewHighScore {
    pub name: String,
    pub score: u32,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct RestartRequested;

#[derive(Message, Debug, Clone, Copy)]
pub struct MainMenuRequested;

#[derive(Message, Debug, Clone, Copy)]
pub struct ResumeRequested;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<Screen>()
            .init_resource::<RunState>()
            .add_message::<ObstaclePassed>()
            .add_message::<PickupActivated>()
            .add_message::<BossSpawned>()
            .add_message::<BossBeaten>()
            .add_message::<BossLost>()
            .add_message::<ObstacleHit>()
            .add_message::<AddScore>()
            .add_message::<NewHighScore>()
            .add_message::<RestartRequested>()
            .add_message::<MainMenuRequested>()
            .add_message::<ResumeRequested>()
            .add_message::<LevelTransitionRequested>()
            .add_systems(
                Update,
                (
                    toggle_pause_on_escape,
                    resume_on_request,
                    apply_score_messages,
                    log_run_messages,
                    handle_game_over,
                    persist_high_score,
                )
                    .chain()
                    .run_if(in_state(Screen::Run)),
            );
    }
}

/// Gameplay Systems Gate on This (Not Paused, Not Dead, No Minigame)
pub fn run_active(state: Res<RunState>, challenge: Res<MashChallenge>) -> bool {
    state.accepting_score() && !challenge.is_active()
}

pub fn apply_score_messages(
    mut state: ResMut<RunState>,
    config: Res<RunnerConfig>,
    current: Res<CurrentLevel>,
    mut passed: MessageReader<ObstaclePassed>,
    mut beaten: MessageReader<BossBeaten>,
    mut bonus: MessageReader<AddScore>,
    mut transition: MessageWriter<LevelTransitionRequested>,
    mut transition_sent: Local<bool>,
) {
    // Fresh Level Resets Progress, So a New Request is Allowed Again
    if state.level_progress == 0 {
        *transition_sent = false;
    }

    for _ in passed.read() {
        if !state.obstacle_passed() {
            continue;
        }

        if *transition_sent {
            continue;
        }

        let next = transition_target(
            &config.thresholds,
            current.0,
            state.level_progress,
            &config.random_playable_levels,
            |n| rand::rng().random_range(0..n),
        );

        if let Some(level) = next {
            info!("Transitioning to level: {}", level.name());
            transition.write(LevelTransitionRequested(level));
            *transition_sent = true;
        }
    }

    for _ in beaten.read() {
        if state.boss_beaten() {
            info!("Boss Beaten! Levels Beaten: {}", state.levels_beaten);
        }
    }

    for AddScore(points) in bonus.read() {
        state.add_score(*points);
    }
}

pub fn log_run_messages(
    mut pickups: MessageReader<PickupActivated>,
    mut spawned: MessageReader<BossSpawned>,
) {
    for p in pickups.read() {
        info!("Pickup activated: {:?}", p.kind);
    }
    for _ in spawned.read() {
        info!("Boss spawned");
    }
}

pub fn toggle_pause_on_escape(
    keys: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<RunState>,
    mut time: ResMut<Time<Virtual>>,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }

    match state.toggle_pause() {
        Some(true) => {
            time.pause();
            info!("Game Paused.");
        }
        Some(false) => {
            time.unpause();
            info!("Game Resumed.");
        }
        None => {}
    }
}

pub fn resume_on_request(
    mut requests: MessageReader<ResumeRequested>,
    mut state: ResMut<RunState>,
    mut time: ResMut<Time<Virtual>>,
) {
    if requests.read().count() == 0 || !state.paused {
        return;
    }
    state.paused = false;
    time.unpause();
    info!("Game Resumed.");
}

/// Obstacle Hit / Boss Loss -> Latch Game Over and Freeze Time
/// A Beaten Best Goes Out as `NewHighScore`
pub fn handle_game_over(
    mut hits: MessageReader<ObstacleHit>,
    mut lost: MessageReader<BossLost>,
    mut state: ResMut<RunState>,
    mut profile: ResMut<PlayerProfile>,
    mut time: ResMut<Time<Virtual>>,
    mut high_score: MessageWriter<NewHighScore>,
) {
    let hit = hits.read().count() > 0;
    let boss_loss = lost.read().count() > 0;
    if !hit && !boss_loss {
        return;
    }

    if !state.latch_game_over() {
        return;
    }

    if boss_loss {
        info!("Boss fight lost! Game Over");
    } else {
        info!("Obstacle hit! Game Over (score {})", state.score);
    }

    if profile.record_score(state.score) {
        info!("New High Score! Saving...");
        high_score.write(NewHighScore {
            name: profile.player_name.clone(),
            score: profile.highest_score,
        });
    }

    time.pause();
}

pub fn persist_high_score(mut scores: MessageReader<NewHighScore>, profile: Res<PlayerProfile>) {
    let Some(NewHighScore { name, score }) = scores.read().last() else {
        return;
    };

    match profile.save() {
        Ok(()) => info!(
            "Data saved successfully: PlayerName={}, HighestScore={}",
            profile.player_name, profile.highest_score
        ),
        Err(e) => error!("Failed to save data: {e}"),
    }
    leaderboard::submit_score_in_background(name.clone(), *score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::message::MessageCursor;

    #[test]
    fn obstacle_passed_counts_score_and_level_progress() {
        let mut s = RunState::default();
        assert!(s.obstacle_passed());
        assert!(s.obstacle_passed());
        assert_eq!((s.score, s.level_progress), (2, 2));
        s.enter_level();
        assert_eq!((s.score, s.level_progress), (2, 0));
    }

    #[test]
    fn nothing_scores_while_paused_or_dead() {
        let mut s = RunState { paused: true, ..default() };
        assert!(!s.obstacle_passed());
        assert!(!s.boss_beaten());
        assert!(!s.add_score(5));

        let mut s = RunState { game_over: true, ..default() };
        assert!(!s.obstacle_passed());
        assert_eq!(s.score, 0);
        assert_eq!(s.levels_beaten, 0);
    }

    #[test]
    fn add_score_adds_points() {
        let mut s = RunState::default();
        s.add_score(3);
        s.add_score(4);
        assert_eq!(s.score, 7);
        assert_eq!(s.level_progress, 0);
    }

    #[test]
    fn game_over_latches_once_and_blocks_pause() {
        let mut s = RunState::default();
        assert!(s.latch_game_over());
        assert!(!s.latch_game_over());
        assert_eq!(s.toggle_pause(), None);
        assert!(!s.paused);
    }

    #[test]
    fn pause_toggles_back_and_forth() {
        let mut s = RunState::default();
        assert_eq!(s.toggle_pause(), Some(true));
        assert_eq!(s.toggle_pause(), Some(false));
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = RunState {
            score: 9,
            levels_beaten: 2,
            level_progress: 4,
            game_over: true,
            paused: true,
        };
        s.reset();
        assert_eq!(s, RunState::default());
    }

    fn score_app() -> App {
        let mut app = App::new();
        app.insert_resource(RunnerConfig::default())
            .insert_resource(CurrentLevel::default())
            .init_resource::<RunState>()
            .add_message::<ObstaclePassed>()
            .add_message::<BossBeaten>()
            .add_message::<AddScore>()
            .add_message::<LevelTransitionRequested>()
            .add_systems(Update, apply_score_messages);
        app
    }

    #[test]
    fn fifth_obstacle_in_start_requests_wilderness() {
        let mut app = score_app();
        for _ in 0..5 {
            app.world_mut().write_message(ObstaclePassed);
        }
        app.world_mut().write_message(BossBeaten);
        app.update();

        let state = app.world().resource::<RunState>();
        assert_eq!(state.score, 5);
        assert_eq!(state.levels_beaten, 1);

        let requests = app.world().resource::<Messages<LevelTransitionRequested>>();
        let mut cursor = requests.get_cursor();
        let sent: Vec<_> = cursor.read(requests).map(|r| r.0).collect();
        assert_eq!(sent, vec![crate::level::Level::Wilderness]);
    }

    #[test]
    fn paused_run_ignores_messages() {
        let mut app = score_app();
        app.world_mut().resource_mut::<RunState>().paused = true;
        app.world_mut().write_message(ObstaclePassed);
        app.world_mut().write_message(AddScore(10));
        app.update();
        assert_eq!(app.world().resource::<RunState>().score, 0);
    }

    fn game_over_app(best: u32) -> App {
        let mut app = App::new();
        app.init_resource::<RunState>()
            .init_resource::<Time<Virtual>>()
            .insert_resource(PlayerProfile {
                player_name: "Ragnar".into(),
                highest_score: best,
            })
            .add_message::<ObstacleHit>()
            .add_message::<BossLost>()
            .add_message::<NewHighScore>()
            .add_systems(Update, handle_game_over);
        app
    }

    fn high_scores(app: &App, cursor: &mut MessageCursor<NewHighScore>) -> Vec<NewHighScore> {
        let messages = app.world().resource::<Messages<NewHighScore>>();
        cursor.read(messages).cloned().collect()
    }

    #[test]
    fn hit_latches_game_over_once_and_freezes_time() {
        let mut app = game_over_app(3);
        let mut cursor = MessageCursor::<NewHighScore>::default();
        app.world_mut().resource_mut::<RunState>().score = 7;
        app.world_mut().write_message(ObstacleHit);
        app.world_mut().write_message(ObstacleHit);
        app.update();

        assert!(app.world().resource::<RunState>().game_over);
        assert!(app.world().resource::<Time<Virtual>>().is_paused());
        assert_eq!(app.world().resource::<PlayerProfile>().highest_score, 7);
        assert_eq!(
            high_scores(&app, &mut cursor),
            vec![NewHighScore { name: "Ragnar".into(), score: 7 }]
        );

        // Latched: a Later Hit Changes Nothing
        app.world_mut().resource_mut::<RunState>().score = 9;
        app.world_mut().write_message(BossLost);
        app.update();
        assert_eq!(app.world().resource::<PlayerProfile>().highest_score, 7);
        assert!(high_scores(&app, &mut cursor).is_empty());
    }

    #[test]
    fn lower_score_keeps_profile_best() {
        let mut app = game_over_app(20);
        let mut cursor = MessageCursor::<NewHighScore>::default();
        app.world_mut().resource_mut::<RunState>().score = 4;
        app.world_mut().write_message(BossLost);
        app.update();

        assert!(app.world().resource::<RunState>().game_over);
        assert_eq!(app.world().resource::<PlayerProfile>().highest_score, 20);
        assert!(high_scores(&app, &mut cursor).is_empty());
    }

    #[test]
    fn no_message_no_game_over() {
        let mut app = game_over_app(0);
        app.update();
        assert!(!app.world().resource::<RunState>().game_over);
        assert!(!app.world().resource::<Time<Virtual>>().is_paused());
    }
}
