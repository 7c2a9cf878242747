/*
Viking Run
*/
use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use serde::{Deserialize, Serialize};

use crate::storage::{self, StoreError};

pub const LEADERBOARD_ID: &str = "Most_Drunken_Viking";
pub const PLAYERS_PER_PAGE: usize = 10;

/// Hard Cap on Stored Rows
pub const MAX_ENTRIES: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

/// Entry With 0-Based Rank (UI Adds 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: usize,
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaderboardPage {
    pub results: Vec<RankedEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    fn file_name(id: &str) -> String {
        format!("{id}.ron")
    }

    pub fn load(id: &str) -> Result<Self, StoreError> {
        match storage::read_optional(&Self::file_name(id))? {
            Some(contents) => Ok(ron::from_str(&contents)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, id: &str) -> Result<(), StoreError> {
        let contents = ron::ser::to_string_pretty(self, Default::default())?;
        storage::write(&Self::file_name(id), &contents)
    }

    /// Keep Each Player's Best Score
    /// Returns New 0-Based Rank, or None if Existing Best Was Not Beaten
    pub fn submit(&mut self, name: &str, score: u32) -> Option<usize> {
        let name: String = name.chars().filter(|c| !c.is_control()).collect();

        if let Some(i) = self.entries.iter().position(|e| e.name == name) {
            if self.entries[i].score >= score {
                return None;
            }
            self.entries.remove(i);
        }

        // Ties Keep Earlier Submission Ahead
        let rank = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());

        if rank >= MAX_ENTRIES {
            return None;
        }

        self.entries.insert(rank, LeaderboardEntry { name, score });
        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn page(&self, offset: usize, limit: usize) -> LeaderboardPage {
        let results = self
            .entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(limit)
            .map(|(rank, e)| RankedEntry {
                rank,
                name: e.name.clone(),
                score: e.score,
            })
            .collect();

        LeaderboardPage {
            results,
            total: self.entries.len(),
        }
    }
}

pub fn total_pages(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// Page is 1-Based (Matches Menu)
pub fn fetch_page(id: &str, page: usize, per_page: usize) -> Result<LeaderboardPage, StoreError> {
    let offset = page.saturating_sub(1) * per_page;
    Ok(Leaderboard::load(id)?.page(offset, per_page))
}

pub fn submit_score(id: &str, name: &str, score: u32) -> Result<Option<usize>, StoreError> {
    let mut board = Leaderboard::load(id)?;
    let rank = board.submit(name, score);
    if rank.is_some() {
        board.save(id)?;
    }
    Ok(rank)
}

/// Fire-and-Forget Submit (Does Not Block Frame)
pub fn submit_score_in_background(name: String, score: u32) {
    IoTaskPool::get()
        .spawn(async move {
            match submit_score(LEADERBOARD_ID, &name, score) {
                Ok(Some(rank)) => info!("Leaderboard: {name} placed #{} with {score}", rank + 1),
                Ok(None) => debug!("Leaderboard: {score} did not beat {name}'s best"),
                Err(e) => error!("Leaderboard submit failed: {e}"),
            }
        })
        .detach();
}
