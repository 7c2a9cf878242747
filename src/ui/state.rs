/*
Viking Run
*/
use bevy::prelude::*;
use bevy::tasks::Task;

use crate::leaderboard::{total_pages, LeaderboardPage, RankedEntry, PLAYERS_PER_PAGE};
use crate::storage::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LeaderboardStatus {
    #[default]
    Idle,
    Loading,
    Failed,
    Loaded(Vec<RankedEntry>),
}

/// Leaderboard Panel: Current Page and In-Flight Fetch
#[derive(Resource, Default)]
pub struct LeaderboardView {
    pub is_open: bool,
    /// 1-Based
    pub page: usize,
    pub total_pages: usize,
    pub status: LeaderboardStatus,
    pub task: Option<Task<Result<LeaderboardPage, StoreError>>>,
}

impl LeaderboardView {
    /// Opening Always Starts Over at Page 1
    pub fn open(&mut self) {
        self.is_open = true;
        self.page = 1;
        self.total_pages = 0;
        self.status = LeaderboardStatus::Loading;
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.status = LeaderboardStatus::Idle;
        self.task = None;
    }

    /// Applies a Finished Fetch
    pub fn finish(&mut self, result: Result<LeaderboardPage, StoreError>) {
        match result {
            Ok(page) => {
                self.total_pages = total_pages(page.total, PLAYERS_PER_PAGE);
                self.status = LeaderboardStatus::Loaded(page.results);
            }
            Err(e) => {
                error!("Leaderboard fetch failed: {e}");
                self.status = LeaderboardStatus::Failed;
            }
        }
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Returns the Page to Fetch, or None at the Edge
    pub fn step(&mut self, dir: i32) -> Option<usize> {
        let ok = if dir < 0 { self.can_prev() } else { self.can_next() };
        if !ok || self.task.is_some() {
            return None;
        }
        self.page = if dir < 0 { self.page - 1 } else { self.page + 1 };
        self.status = LeaderboardStatus::Loading;
        Some(self.page)
    }

    pub fn page_label(&self) -> String {
        format!("Page {} / {}", self.page, self.total_pages.max(1))
    }
}

pub fn row_text(entry: &RankedEntry) -> String {
    format!("{}. {} {}", entry.rank + 1, entry.name, entry.score)
}
