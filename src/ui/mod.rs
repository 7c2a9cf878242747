/*
Viking Run
*/
use bevy::prelude::*;

use crate::game_state::Screen;

mod hud;
mod leaderboard;
mod menu;
mod state;

pub use leaderboard::LeaderboardRequest;
pub use state::{LeaderboardStatus, LeaderboardView};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LeaderboardView>()
            .add_message::<LeaderboardRequest>()
            .add_systems(Startup, hud::setup_hud)
            .add_systems(OnEnter(Screen::MainMenu), menu::spawn_main_menu)
            .add_systems(OnExit(Screen::MainMenu), (menu::cleanup_main_menu, close_leaderboard))
            .add_systems(OnEnter(Screen::Run), show_hud)
            .add_systems(OnExit(Screen::Run), (hide_hud, menu::despawn_run_panels))
            .add_systems(
                Update,
                (menu::button_colors, menu::handle_menu_buttons),
            )
            .add_systems(
                Update,
                (
                    leaderboard::handle_leaderboard_requests,
                    leaderboard::poll_leaderboard_fetch,
                    leaderboard::render_leaderboard,
                )
                    .chain()
                    .after(menu::handle_menu_buttons)
                    .run_if(in_state(Screen::MainMenu)),
            )
            .add_systems(
                Update,
                (
                    hud::sync_hud_text,
                    hud::sync_power_ups,
                    hud::sync_mash_panel,
                    menu::sync_run_panels,
                )
                    .run_if(in_state(Screen::Run)),
            );
    }
}

fn set_hud_visibility(q: &mut Query<&mut Visibility, With<hud::HudRoot>>, vis: Visibility) {
    for mut v in q.iter_mut() {
        *v = vis;
    }
}

fn show_hud(mut q: Query<&mut Visibility, With<hud::HudRoot>>) {
    set_hud_visibility(&mut q, Visibility::Inherited);
}

fn hide_hud(mut q: Query<&mut Visibility, With<hud::HudRoot>>) {
    set_hud_visibility(&mut q, Visibility::Hidden);
}

fn close_leaderboard(mut view: ResMut<LeaderboardView>) {
    view.close();
}
