/*
Viking Run
*/
use bevy::prelude::*;

use crate::game_state::{MainMenuRequested, RestartRequested, ResumeRequested, RunState, Screen};
use crate::profile::PlayerProfile;

use super::leaderboard::{LeaderboardRequest, LeaderboardPanel};

const BUTTON_IDLE: Color = Color::srgb(0.28, 0.18, 0.10);
const BUTTON_HOVER: Color = Color::srgb(0.42, 0.28, 0.14);
const BUTTON_PRESS: Color = Color::srgb(0.58, 0.40, 0.18);
const BUTTON_BORDER: Color = Color::srgb(0.80, 0.62, 0.30);
const PANEL_BG: Color = Color::srgba(0.0, 0.0, 0.0, 0.72);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MenuAction {
    Play,
    OpenLeaderboard,
    Quit,
    Resume,
    Restart,
    MainMenu,
    LeaderboardPrev,
    LeaderboardNext,
    LeaderboardClose,
}

#[derive(Component)]
pub(super) struct MainMenuUi;

#[derive(Component)]
pub(super) struct PausePanel;

#[derive(Component)]
pub(super) struct DeathPanel;

pub(super) fn text(content: impl Into<String>, size: f32) -> (Text, TextFont, TextColor) {
    (
        Text::new(content),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(Color::WHITE),
    )
}

pub(super) fn spawn_button(parent: &mut ChildSpawnerCommands, action: MenuAction, caption: &str) {
    parent
        .spawn((
            Button,
            action,
            Node {
                width: Val::Px(240.0),
                height: Val::Px(56.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(3.0)),
                ..default()
            },
            BackgroundColor(BUTTON_IDLE),
            BorderColor::all(BUTTON_BORDER),
        ))
        .with_children(|b| {
            b.spawn(text(caption, 30.0));
        });
}

/// Full-Screen Column Centered on Screen
pub(super) fn overlay_node() -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        position_type: PositionType::Absolute,
        flex_direction: FlexDirection::Column,
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        row_gap: Val::Px(18.0),
        ..default()
    }
}

pub(super) fn spawn_main_menu(mut commands: Commands, profile: Option<Res<PlayerProfile>>) {
    let best = profile.map(|p| p.highest_score).unwrap_or(0);

    commands
        .spawn((MainMenuUi, overlay_node(), BackgroundColor(Color::srgb(0.08, 0.10, 0.14))))
        .with_children(|ui| {
            ui.spawn(text("VIKING RUN", 84.0));
            ui.spawn(text(format!("Best: {best}"), 28.0));
            spawn_button(ui, MenuAction::Play, "Play");
            spawn_button(ui, MenuAction::OpenLeaderboard, "Leaderboard");
            spawn_button(ui, MenuAction::Quit, "Quit");
        });
}

pub(super) fn cleanup_main_menu(
    mut commands: Commands,
    q: Query<Entity, Or<(With<MainMenuUi>, With<LeaderboardPanel>)>>,
) {
    for e in q.iter() {
        commands.entity(e).despawn();
    }
}

/// Pause and Death Panels Follow RunState
pub(super) fn sync_run_panels(
    mut commands: Commands,
    state: Res<RunState>,
    q_pause: Query<Entity, With<PausePanel>>,
    q_death: Query<Entity, With<DeathPanel>>,
) {
    if !state.is_changed() {
        return;
    }

    let want_pause = state.paused && !state.game_over;
    match (want_pause, q_pause.single()) {
        (true, Err(_)) => {
            commands
                .spawn((PausePanel, overlay_node(), BackgroundColor(PANEL_BG), ZIndex(10)))
                .with_children(|ui| {
                    ui.spawn(text("Paused", 64.0));
                    spawn_button(ui, MenuAction::Resume, "Resume");
                    spawn_button(ui, MenuAction::Restart, "Restart");
                    spawn_button(ui, MenuAction::MainMenu, "Main Menu");
                });
        }
        (false, Ok(e)) => commands.entity(e).despawn(),
        _ => {}
    }

    match (state.game_over, q_death.single()) {
        (true, Err(_)) => {
            let score = state.score;
            commands
                .spawn((DeathPanel, overlay_node(), BackgroundColor(PANEL_BG), ZIndex(10)))
                .with_children(|ui| {
                    ui.spawn(text("You Fell!", 64.0));
                    ui.spawn(text(format!("Score: {score}"), 36.0));
                    spawn_button(ui, MenuAction::Restart, "Restart");
                    spawn_button(ui, MenuAction::MainMenu, "Main Menu");
                });
        }
        (false, Ok(e)) => commands.entity(e).despawn(),
        _ => {}
    }
}

pub(super) fn despawn_run_panels(
    mut commands: Commands,
    q: Query<Entity, Or<(With<PausePanel>, With<DeathPanel>)>>,
) {
    for e in q.iter() {
        commands.entity(e).despawn();
    }
}

pub(super) fn button_colors(
    mut q: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
) {
    for (interaction, mut bg) in &mut q {
        bg.0 = match interaction {
            Interaction::Pressed => BUTTON_PRESS,
            Interaction::Hovered => BUTTON_HOVER,
            Interaction::None => BUTTON_IDLE,
        };
    }
}

pub(super) fn handle_menu_buttons(
    q: Query<(&Interaction, &MenuAction), Changed<Interaction>>,
    mut next_screen: ResMut<NextState<Screen>>,
    mut exit: MessageWriter<AppExit>,
    mut resume: MessageWriter<ResumeRequested>,
    mut restart: MessageWriter<RestartRequested>,
    mut main_menu: MessageWriter<MainMenuRequested>,
    mut board: MessageWriter<LeaderboardRequest>,
) {
    for (interaction, action) in q.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }

        match action {
            MenuAction::Play => {
                info!("Starting run");
                next_screen.set(Screen::Run);
            }
            MenuAction::Quit => {
                info!("Quitting");
                exit.write(AppExit::Success);
            }
            MenuAction::Resume => {
                resume.write(ResumeRequested);
            }
            MenuAction::Restart => {
                restart.write(RestartRequested);
            }
            MenuAction::MainMenu => {
                main_menu.write(MainMenuRequested);
            }
            MenuAction::OpenLeaderboard => {
                board.write(LeaderboardRequest::Open);
            }
            MenuAction::LeaderboardPrev => {
                board.write(LeaderboardRequest::Step(-1));
            }
            MenuAction::LeaderboardNext => {
                board.write(LeaderboardRequest::Step(1));
            }
            MenuAction::LeaderboardClose => {
                board.write(LeaderboardRequest::Close);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_app() -> App {
        let mut app = App::new();
        app.init_resource::<RunState>()
            .add_systems(Update, sync_run_panels);
        app
    }

    fn count<T: Component>(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query_filtered::<(), With<T>>().iter(world).count()
    }

    #[test]
    fn pause_panel_comes_and_goes_with_pause() {
        let mut app = panel_app();
        app.update();
        assert_eq!(count::<PausePanel>(&mut app), 0);

        app.world_mut().resource_mut::<RunState>().paused = true;
        app.update();
        assert_eq!(count::<PausePanel>(&mut app), 1);
        // No Duplicate on Later Changes
        app.world_mut().resource_mut::<RunState>().score = 3;
        app.update();
        assert_eq!(count::<PausePanel>(&mut app), 1);

        app.world_mut().resource_mut::<RunState>().paused = false;
        app.update();
        assert_eq!(count::<PausePanel>(&mut app), 0);
    }

    #[test]
    fn death_panel_shows_on_game_over() {
        let mut app = panel_app();
        app.world_mut().resource_mut::<RunState>().game_over = true;
        app.update();
        assert_eq!(count::<DeathPanel>(&mut app), 1);
        assert_eq!(count::<PausePanel>(&mut app), 0);
    }
}
