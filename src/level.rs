/*
Viking Run
*/
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Start,
    Wilderness,
    Longhouse,
}

impl Level {
    pub const fn name(self) -> &'static str {
        match self {
            Level::Start => "Start",
            Level::Wilderness => "Wilderness",
            Level::Longhouse => "Longhouse",
        }
    }

    pub fn sky_color(self) -> Color {
        match self {
            Level::Start => Color::srgb(0.55, 0.72, 0.86),
            Level::Wilderness => Color::srgb(0.42, 0.55, 0.62),
            Level::Longhouse => Color::srgb(0.18, 0.12, 0.10),
        }
    }

    pub fn ground_color(self) -> Color {
        match self {
            Level::Start => Color::srgb(0.36, 0.52, 0.28),
            Level::Wilderness => Color::srgb(0.30, 0.38, 0.24),
            Level::Longhouse => Color::srgb(0.40, 0.27, 0.16),
        }
    }
}

/// Obstacles Passed (Within Current Level) Needed to Leave Each Level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub start: u32,
    pub wilderness: u32,
    pub longhouse: u32,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            start: 5,
            wilderness: 20,
            longhouse: 30,
        }
    }
}

/// Where a Level Goes Once its Threshold is Met
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextLevel {
    Fixed(Level),
    RandomPlayable,
}

impl LevelThresholds {
    pub fn rule(&self, level: Level) -> (u32, NextLevel) {
        match level {
            Level::Start => (self.start, NextLevel::Fixed(Level::Wilderness)),
            Level::Wilderness => (self.wilderness, NextLevel::RandomPlayable),
            Level::Longhouse => (self.longhouse, NextLevel::RandomPlayable),
        }
    }
}

/// `pick` Chooses an Index Into `playable` (Caller Owns the RNG)
pub fn transition_target(
    thresholds: &LevelThresholds,
    level: Level,
    level_progress: u32,
    playable: &[Level],
    pick: impl FnOnce(usize) -> usize,
) -> Option<Level> {
    let (threshold, next) = thresholds.rule(level);
    if level_progress < threshold {
        return None;
    }

    match next {
        NextLevel::Fixed(l) => Some(l),
        NextLevel::RandomPlayable => {
            if playable.is_empty() {
                error!("No random playable levels configured, staying in {}", level.name());
                return None;
            }
            let i = pick(playable.len()).min(playable.len() - 1);
            Some(playable[i])
        }
    }
}

#[derive(Resource, Debug, Clone, Copy)]
pub struct CurrentLevel(pub Level);

impl Default for CurrentLevel {
    fn default() -> Self {
        Self(Level::Start)
    }
}

#[derive(Message, Debug, Clone, Copy)]
pub struct LevelTransitionRequested(pub Level);

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYABLE: [Level; 2] = [Level::Wilderness, Level::Longhouse];

    #[test]
    fn start_moves_to_wilderness_at_five() {
        let t = LevelThresholds::default();
        assert_eq!(transition_target(&t, Level::Start, 4, &PLAYABLE, |_| 0), None);
        assert_eq!(
            transition_target(&t, Level::Start, 5, &PLAYABLE, |_| 1),
            Some(Level::Wilderness)
        );
    }

    #[test]
    fn wilderness_and_longhouse_pick_from_playable() {
        let t = LevelThresholds::default();
        assert_eq!(transition_target(&t, Level::Wilderness, 19, &PLAYABLE, |_| 1), None);
        assert_eq!(
            transition_target(&t, Level::Wilderness, 20, &PLAYABLE, |_| 1),
            Some(Level::Longhouse)
        );
        assert_eq!(
            transition_target(&t, Level::Longhouse, 30, &PLAYABLE, |_| 0),
            Some(Level::Wilderness)
        );
    }

    #[test]
    fn empty_playable_list_stays_put() {
        let t = LevelThresholds::default();
        assert_eq!(transition_target(&t, Level::Wilderness, 99, &[], |_| 0), None);
    }

    #[test]
    fn out_of_range_pick_is_clamped() {
        let t = LevelThresholds::default();
        assert_eq!(
            transition_target(&t, Level::Longhouse, 30, &PLAYABLE, |n| n + 5),
            Some(Level::Longhouse)
        );
    }
}
