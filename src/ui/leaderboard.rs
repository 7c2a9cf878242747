/*
Viking Run
*/
use bevy::prelude::*;
use bevy::tasks::AsyncComputeTaskPool;
use futures_lite::future;

use crate::leaderboard::{fetch_page, LEADERBOARD_ID, PLAYERS_PER_PAGE};

use super::menu::{overlay_node, spawn_button, text, MenuAction};
use super::state::{row_text, LeaderboardStatus, LeaderboardView};

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardRequest {
    Open,
    Step(i32),
    Close,
}

#[derive(Component)]
pub(super) struct LeaderboardPanel;

#[derive(Component)]
pub(super) struct LeaderboardRows;

#[derive(Component)]
pub(super) struct LeaderboardPageText;

fn start_fetch(view: &mut LeaderboardView, page: usize) {
    let task = AsyncComputeTaskPool::get()
        .spawn(async move { fetch_page(LEADERBOARD_ID, page, PLAYERS_PER_PAGE) });
    view.task = Some(task);
}

pub(super) fn handle_leaderboard_requests(
    mut commands: Commands,
    mut requests: MessageReader<LeaderboardRequest>,
    mut view: ResMut<LeaderboardView>,
    q_panel: Query<Entity, With<LeaderboardPanel>>,
) {
    for req in requests.read() {
        match *req {
            LeaderboardRequest::Open => {
                if view.is_open {
                    continue;
                }
                view.open();
                start_fetch(&mut view, 1);
                spawn_panel(&mut commands);
            }
            LeaderboardRequest::Step(dir) => {
                if let Some(page) = view.step(dir) {
                    start_fetch(&mut view, page);
                }
            }
            LeaderboardRequest::Close => {
                view.close();
                for e in q_panel.iter() {
                    commands.entity(e).despawn();
                }
            }
        }
    }
}

fn spawn_panel(commands: &mut Commands) {
    commands
        .spawn((
            LeaderboardPanel,
            overlay_node(),
            BackgroundColor(Color::srgba(0.02, 0.03, 0.05, 0.94)),
            ZIndex(20),
        ))
        .with_children(|ui| {
            ui.spawn(text("Most Drunken Viking", 52.0));
            ui.spawn((
                LeaderboardRows,
                Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::FlexStart,
                    row_gap: Val::Px(4.0),
                    min_height: Val::Px(320.0),
                    ..default()
                },
            ));
            ui.spawn((LeaderboardPageText, text("", 24.0)));
            ui.spawn(Node {
                column_gap: Val::Px(12.0),
                ..default()
            })
            .with_children(|row| {
                spawn_button(row, MenuAction::LeaderboardPrev, "Prev");
                spawn_button(row, MenuAction::LeaderboardNext, "Next");
            });
            spawn_button(ui, MenuAction::LeaderboardClose, "Close");
        });
}

/// Polls the Background Fetch Without Blocking the Frame
pub(super) fn poll_leaderboard_fetch(mut view: ResMut<LeaderboardView>) {
    // Polling Alone Must Not Trigger a Redraw
    let polled = {
        let Some(task) = view.bypass_change_detection().task.as_mut() else {
            return;
        };
        future::block_on(future::poll_once(task))
    };
    let Some(result) = polled else {
        return;
    };
    view.task = None;
    view.finish(result);
}

pub(super) fn render_leaderboard(
    mut commands: Commands,
    view: Res<LeaderboardView>,
    q_rows: Query<(Entity, Option<&Children>), With<LeaderboardRows>>,
    mut q_page: Query<&mut Text, With<LeaderboardPageText>>,
) {
    if !view.is_changed() {
        return;
    }
    let Ok((rows, children)) = q_rows.single() else {
        return;
    };

    // Cleared Before Every Redraw
    if let Some(children) = children {
        for child in children.iter() {
            commands.entity(child).despawn();
        }
    }

    let lines: Vec<String> = match &view.status {
        LeaderboardStatus::Idle => Vec::new(),
        LeaderboardStatus::Loading => vec!["Loading...".into()],
        LeaderboardStatus::Failed => vec!["Error loading scores.".into()],
        LeaderboardStatus::Loaded(entries) if entries.is_empty() => vec!["No scores yet.".into()],
        LeaderboardStatus::Loaded(entries) => entries.iter().map(row_text).collect(),
    };

    commands.entity(rows).with_children(|p| {
        for line in lines {
            p.spawn(text(line, 26.0));
        }
    });

    for mut t in &mut q_page {
        *t = Text::new(view.page_label());
    }
}
