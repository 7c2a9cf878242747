/*
Viking Run
*/
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::storage::{self, StoreError};

pub const PROFILE_FILE: &str = "profile.json";

/// Saved Player Data ("Cloud Save")
/// Keys Match the Remote Save Layout: PlayerName / HighestScore
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(rename = "PlayerName")]
    pub player_name: String,
    #[serde(rename = "HighestScore")]
    pub highest_score: u32,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            player_name: "Player".into(),
            highest_score: 0,
        }
    }
}

impl PlayerProfile {
    pub fn from_json(contents: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Missing File -> None (First Launch)
    pub fn load() -> Result<Option<Self>, StoreError> {
        storage::read_optional(PROFILE_FILE)?
            .map(|s| Self::from_json(&s))
            .transpose()
    }

    pub fn save(&self) -> Result<(), StoreError> {
        storage::write(PROFILE_FILE, &self.to_json()?)
    }

    /// Raise the Stored Best if `score` Beats It
    /// Returns True When a New High Score was Recorded
    pub fn record_score(&mut self, score: u32) -> bool {
        if score <= self.highest_score {
            return false;
        }
        self.highest_score = score;
        true
    }
}

/// Startup: Pull Saved Profile, Fall Back to Config Name
pub fn load_profile(mut commands: Commands, config: Res<crate::config::RunnerConfig>) {
    let profile = match PlayerProfile::load() {
        Ok(Some(p)) => {
            info!(
                "Data loaded: PlayerName={}, HighestScore={}",
                p.player_name, p.highest_score
            );
            p
        }
        Ok(None) => PlayerProfile {
            player_name: config.player_name.clone(),
            highest_score: 0,
        },
        Err(e) => {
            error!("Failed to load data: {e}");
            PlayerProfile {
                player_name: config.player_name.clone(),
                highest_score: 0,
            }
        }
    };
    commands.insert_resource(profile);
}
