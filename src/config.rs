/*
Viking Run
*/
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::level::{Level, LevelThresholds};
use crate::storage;

pub const SETTINGS_FILE: &str = "settings.ron";

/// Tuning for the Whole Run
/// Every Field Optional in settings.ron, Missing Ones Fall Back to Default
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub player_name: String,

    // Runner
    pub player_speed: f32,
    pub slowed_speed: f32,
    pub slow_duration: f32,
    pub jump_velocity: f32,
    pub gravity: f32,

    // Spawning
    pub obstacle_interval: f32,
    pub obstacle_spawn_distance: f32,
    pub obstacle_cleanup_behind: f32,
    pub pickup_interval: f32,
    pub pickup_spawn_distance: f32,
    pub pickup_cleanup_behind: f32,
    pub pickup_clearance_radius: f32,

    // Ground
    pub segment_length: f32,
    pub segments_ahead: u32,
    pub segments_behind: u32,

    // Wolf
    pub wolf_duration: f32,
    pub wolf_lead_distance: f32,
    pub wolf_lane_switch_speed: f32,
    pub wolf_look_ahead: f32,
    pub wolf_check_interval: f32,

    // Boss
    pub boss_every: u32,
    pub boss_spawn_distance: f32,
    pub boss_initial_size: f32,
    pub boss_size_step: f32,
    pub mash_duration: f32,
    pub mash_key_swap_interval: f32,
    pub mash_required_rate: f32,
    pub shake_duration: f32,
    pub shake_magnitude: f32,

    // Levels
    pub thresholds: LevelThresholds,
    pub random_playable_levels: Vec<Level>,

    // Sound
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            player_name: "Player".into(),

            player_speed: 4.0,
            slowed_speed: 2.0,
            slow_duration: 15.0,
            jump_velocity: 7.0,
            gravity: -20.0,

            obstacle_interval: 5.0,
            obstacle_spawn_distance: 20.0,
            obstacle_cleanup_behind: 10.0,
            pickup_interval: 5.0,
            pickup_spawn_distance: 20.0,
            pickup_cleanup_behind: 7.0,
            pickup_clearance_radius: 1.0,

            segment_length: 27.8,
            segments_ahead: 3,
            segments_behind: 1,

            wolf_duration: 15.0,
            wolf_lead_distance: 5.0,
            wolf_lane_switch_speed: 12.0,
            wolf_look_ahead: 15.0,
            wolf_check_interval: 0.2,

            boss_every: 10,
            boss_spawn_distance: 50.0,
            boss_initial_size: 1.0,
            boss_size_step: 0.5,
            mash_duration: 15.0,
            mash_key_swap_interval: 5.0,
            mash_required_rate: 3.0,
            shake_duration: 0.1,
            shake_magnitude: 0.1,

            thresholds: LevelThresholds::default(),
            random_playable_levels: vec![Level::Wilderness, Level::Longhouse],

            music_volume: 0.45,
            sfx_volume: 1.0,
        }
    }
}

impl RunnerConfig {
    pub fn from_ron(contents: &str) -> Result<Self, storage::StoreError> {
        Ok(ron::from_str(contents)?)
    }

    /// Never Fails: Logs and Uses Defaults on Any Problem
    pub fn load() -> Self {
        match storage::read_optional(SETTINGS_FILE) {
            Ok(Some(contents)) => match Self::from_ron(&contents) {
                Ok(cfg) => {
                    info!("Loaded {SETTINGS_FILE}");
                    cfg
                }
                Err(e) => {
                    warn!("Ignoring {SETTINGS_FILE}: {e}");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Could not read {SETTINGS_FILE}: {e}");
                Self::default()
            }
        }
    }
}
