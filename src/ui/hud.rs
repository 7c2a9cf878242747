/*
Viking Run
*/
use bevy::prelude::*;

use crate::boss::MashChallenge;
use crate::game_state::RunState;
use crate::level::CurrentLevel;
use crate::player::{Player, Shield, SlowEffect};
use crate::wolf::Wolf;

const HUD_FONT: f32 = 28.0;
const MASH_FONT: f32 = 44.0;

#[derive(Component)]
pub(super) struct HudRoot;

#[derive(Component)]
pub(super) struct HudScoreText;

#[derive(Component)]
pub(super) struct HudLevelsText;

#[derive(Component)]
pub(super) struct HudLevelName;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PowerUpIndicator {
    Wolf,
    Shield,
    Slow,
}

#[derive(Component)]
pub(super) struct MashPanel;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MashText {
    Key,
    Time,
    Count,
}

pub(super) fn mash_text(which: MashText, challenge: &MashChallenge) -> String {
    match which {
        MashText::Key => format!("Mash: {}", challenge.key_letter()),
        MashText::Time => format!("Time: {:.2}", challenge.time_remaining),
        MashText::Count => format!("Mashes: {}", challenge.mash_count),
    }
}

fn label(text: impl Into<String>, size: f32, color: Color) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

pub(super) fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            Visibility::Hidden,
        ))
        .with_children(|ui| {
            // Top Bar
            ui.spawn(Node {
                width: Val::Percent(100.0),
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            })
            .with_children(|bar| {
                bar.spawn((HudScoreText, label("Score: 0", HUD_FONT, Color::WHITE)));
                bar.spawn((HudLevelName, label("Start", HUD_FONT, Color::srgb(0.9, 0.8, 0.5))));
                bar.spawn((HudLevelsText, label("Levels Beaten: 0", HUD_FONT, Color::WHITE)));
            });

            // Minigame
            ui.spawn((
                MashPanel,
                Node {
                    width: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(8.0),
                    ..default()
                },
                Visibility::Hidden,
            ))
            .with_children(|p| {
                p.spawn((MashText::Key, label("", MASH_FONT * 1.5, Color::srgb(1.0, 0.85, 0.2))));
                p.spawn((MashText::Time, label("", MASH_FONT, Color::WHITE)));
                p.spawn((MashText::Count, label("", MASH_FONT, Color::WHITE)));
            });

            // Power-Ups
            ui.spawn(Node {
                column_gap: Val::Px(16.0),
                ..default()
            })
            .with_children(|row| {
                for (kind, text, color) in [
                    (PowerUpIndicator::Wolf, "WOLF", Color::srgb(0.7, 0.8, 1.0)),
                    (PowerUpIndicator::Shield, "SHIELD", Color::srgb(0.95, 0.8, 0.3)),
                    (PowerUpIndicator::Slow, "SLOWED", Color::srgb(0.8, 0.3, 0.5)),
                ] {
                    row.spawn((kind, label(text, HUD_FONT, color), Visibility::Hidden));
                }
            });
        });
}

pub(super) fn sync_hud_text(
    state: Res<RunState>,
    current: Res<CurrentLevel>,
    mut q: Query<(
        &mut Text,
        Option<&HudScoreText>,
        Option<&HudLevelsText>,
        Option<&HudLevelName>,
    )>,
) {
    if !state.is_changed() && !current.is_changed() {
        return;
    }

    for (mut text, score, levels, name) in &mut q {
        if score.is_some() {
            *text = Text::new(format!("Score: {}", state.score));
        } else if levels.is_some() {
            *text = Text::new(format!("Levels Beaten: {}", state.levels_beaten));
        } else if name.is_some() {
            *text = Text::new(current.0.name());
        }
    }
}

pub(super) fn sync_power_ups(
    q_player: Query<(Option<&Shield>, Option<&SlowEffect>), With<Player>>,
    q_wolf: Query<&Wolf>,
    mut q_ind: Query<(&PowerUpIndicator, &mut Visibility)>,
) {
    let (shield, slow) = q_player
        .single()
        .map(|(s, w)| (s.is_some(), w.is_some()))
        .unwrap_or((false, false));
    let wolf = q_wolf.iter().any(|w| w.active);

    for (kind, mut vis) in &mut q_ind {
        let on = match kind {
            PowerUpIndicator::Wolf => wolf,
            PowerUpIndicator::Shield => shield,
            PowerUpIndicator::Slow => slow,
        };
        vis.set_if_neq(if on { Visibility::Inherited } else { Visibility::Hidden });
    }
}

pub(super) fn sync_mash_panel(
    challenge: Res<MashChallenge>,
    mut q_panel: Query<&mut Visibility, With<MashPanel>>,
    mut q_text: Query<(&MashText, &mut Text)>,
) {
    if !challenge.is_changed() {
        return;
    }

    let active = challenge.is_active();
    for mut vis in &mut q_panel {
        vis.set_if_neq(if active { Visibility::Inherited } else { Visibility::Hidden });
    }

    for (which, mut text) in &mut q_text {
        // Cleared Once the Fight Ends
        *text = if active {
            Text::new(mash_text(*which, &challenge))
        } else {
            Text::new("")
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;

    #[test]
    fn mash_texts_match_the_fight() {
        let mut c = MashChallenge::default();
        c.start(&RunnerConfig::default(), 0);
        c.press();
        c.press();
        c.tick(2.666);
        assert_eq!(mash_text(MashText::Key, &c), "Mash: A");
        assert_eq!(mash_text(MashText::Time, &c), "Time: 12.33");
        assert_eq!(mash_text(MashText::Count, &c), "Mashes: 2");
    }

    #[test]
    fn score_text_follows_run_state() {
        let mut app = App::new();
        app.init_resource::<RunState>()
            .init_resource::<CurrentLevel>()
            .add_systems(Update, sync_hud_text);
        let e = app
            .world_mut()
            .spawn((HudScoreText, Text::new("Score: 0")))
            .id();

        app.world_mut().resource_mut::<RunState>().score = 7;
        app.update();

        let text = app.world().get::<Text>(e).map(|t| t.0.clone());
        assert_eq!(text.as_deref(), Some("Score: 7"));
    }
}
