/*
Viking Run
*/
use bevy::prelude::*;
use bevy::transform::TransformSystems;

use vikinglib::audio::{play_sfx_events, setup_audio, start_music, stop_music, PlaySfx};
use vikinglib::boss::{
    cleanup_boss, detect_boss_collision, mash_challenge_running, run_mash_challenge,
    spawn_boss_on_milestone, MashChallenge,
};
use vikinglib::camera::{camera_follow, spawn_camera, ScreenShake};
use vikinglib::config::RunnerConfig;
use vikinglib::game_state::{run_active, GameStatePlugin, Screen};
use vikinglib::ground::extend_ground;
use vikinglib::level::CurrentLevel;
use vikinglib::obstacles::{
    detect_obstacle_collisions, score_and_cleanup_obstacles, spawn_obstacles, ObstacleAssets,
};
use vikinglib::pickups::{cleanup_pickups, collect_pickups, spawn_pickups, PickupAssets};
use vikinglib::player::{jump, run_forward, switch_lane, tick_slow_effect};
use vikinglib::profile::load_profile;
use vikinglib::restart::{advance_level, restart_run, return_to_main_menu, start_run};
use vikinglib::ui::UiPlugin;
use vikinglib::wolf::{activate_wolf_on_pickup, wolf_follow, wolf_pathfinding};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Viking Run".into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(Time::<Fixed>::from_seconds(1.0 / 60.0))
        // Loaded After LogPlugin so Problems Reach the Log
        .insert_resource(RunnerConfig::load())
        .add_plugins((GameStatePlugin, UiPlugin))
        .init_resource::<CurrentLevel>()
        .init_resource::<MashChallenge>()
        .init_resource::<ScreenShake>()
        .init_resource::<ObstacleAssets>()
        .init_resource::<PickupAssets>()
        .add_message::<PlaySfx>()
        .add_systems(PreStartup, load_profile)
        .add_systems(Startup, (spawn_camera, setup_audio))
        .add_systems(OnEnter(Screen::Run), (start_run, start_music))
        .add_systems(OnExit(Screen::Run), stop_music)
        // Requests From Menus / Score Flow
        .add_systems(
            Update,
            (restart_run, advance_level, return_to_main_menu)
                .chain()
                .run_if(in_state(Screen::Run)),
        )
        // Runner Input + World Streaming
        .add_systems(
            Update,
            (
                (switch_lane, jump, tick_slow_effect),
                (spawn_obstacles, score_and_cleanup_obstacles, detect_obstacle_collisions).chain(),
                // Sees This Frame's Obstacle for the Overlap Check
                (spawn_pickups, collect_pickups, cleanup_pickups)
                    .chain()
                    .after(spawn_obstacles),
                (activate_wolf_on_pickup, wolf_follow, wolf_pathfinding)
                    .chain()
                    .after(collect_pickups),
                (spawn_boss_on_milestone, detect_boss_collision, cleanup_boss)
                    .chain()
                    .after(run_mash_challenge),
                extend_ground,
            )
                .run_if(in_state(Screen::Run))
                .run_if(run_active),
        )
        .add_systems(
            Update,
            run_mash_challenge
                .run_if(in_state(Screen::Run))
                .run_if(mash_challenge_running),
        )
        .add_systems(Update, play_sfx_events)
        .add_systems(
            FixedUpdate,
            run_forward
                .run_if(in_state(Screen::Run))
                .run_if(run_active),
        )
        .add_systems(
            PostUpdate,
            camera_follow
                .before(TransformSystems::Propagate)
                .run_if(in_state(Screen::Run)),
        )
        .run();
}
