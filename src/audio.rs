/*
Viking Run
*/
use bevy::audio::{AudioPlayer, AudioSource, PlaybackSettings, SpatialScale, Volume};
use bevy::prelude::*;
use rand::RngExt;
use std::collections::HashMap;

use crate::config::RunnerConfig;
use crate::pickups::PickupKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SfxKind {
    // Runner
    LaneSwitch,
    Jump,
    Crash,
    ShieldBreak,

    // Pickups
    Pickup(PickupKind),

    // Boss
    BossRoar,
    Mash,
    BossWin,
}

impl SfxKind {
    pub fn is_pickup(self) -> bool {
        matches!(self, SfxKind::Pickup(_))
    }

    /// Per-Kind Gain, Multiplied by sfx_volume
    pub fn gain(self) -> f32 {
        match self {
            SfxKind::LaneSwitch | SfxKind::Jump => 0.8,
            SfxKind::Crash | SfxKind::ShieldBreak => 1.25,
            SfxKind::Pickup(_) => 1.15,
            SfxKind::BossRoar | SfxKind::BossWin => 1.3,
            SfxKind::Mash => 0.6,
        }
    }
}

#[derive(Clone, Copy, Debug, Message)]
pub struct PlaySfx {
    pub kind: SfxKind,
    pub pos: Vec3,
}

#[derive(Component)]
pub struct ActivePickupSfx;

#[derive(Resource, Default)]
pub struct SfxLibrary {
    pub map: HashMap<SfxKind, Vec<Handle<AudioSource>>>,
}

impl SfxLibrary {
    pub fn insert_one(&mut self, k: SfxKind, h: Handle<AudioSource>) {
        self.map.entry(k).or_default().push(h);
    }

    pub fn pick(&self, k: SfxKind) -> Option<Handle<AudioSource>> {
        let list = self.map.get(&k)?;
        if list.is_empty() {
            return None;
        }
        let i = rand::rng().random_range(0..list.len());
        Some(list[i].clone())
    }
}

#[derive(Resource)]
pub struct GameAudio {
    pub music_run: Handle<AudioSource>,
}

#[derive(Component)]
pub struct Music;

pub fn setup_audio(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(GameAudio {
        music_run: asset_server.load("sounds/music/run.ogg"),
    });

    // 1-or-Many Clips per Kind, Random Pick at Play Time
    let mut lib = SfxLibrary::default();

    lib.insert_one(SfxKind::LaneSwitch, asset_server.load("sounds/sfx/runner/whoosh_0.ogg"));
    lib.insert_one(SfxKind::LaneSwitch, asset_server.load("sounds/sfx/runner/whoosh_1.ogg"));
    lib.insert_one(SfxKind::Jump, asset_server.load("sounds/sfx/runner/jump.ogg"));
    lib.insert_one(SfxKind::Crash, asset_server.load("sounds/sfx/runner/crash.ogg"));
    lib.insert_one(SfxKind::ShieldBreak, asset_server.load("sounds/sfx/runner/shield_break.ogg"));

    lib.insert_one(
        SfxKind::Pickup(PickupKind::Berry),
        asset_server.load("sounds/sfx/pickups/berry.ogg"),
    );
    lib.insert_one(
        SfxKind::Pickup(PickupKind::Wolf),
        asset_server.load("sounds/sfx/pickups/wolf_howl.ogg"),
    );
    lib.insert_one(
        SfxKind::Pickup(PickupKind::Shield),
        asset_server.load("sounds/sfx/pickups/shield.ogg"),
    );

    lib.insert_one(SfxKind::BossRoar, asset_server.load("sounds/sfx/boss/roar_0.ogg"));
    lib.insert_one(SfxKind::BossRoar, asset_server.load("sounds/sfx/boss/roar_1.ogg"));
    lib.insert_one(SfxKind::Mash, asset_server.load("sounds/sfx/boss/mash.ogg"));
    lib.insert_one(SfxKind::BossWin, asset_server.load("sounds/sfx/boss/win.ogg"));

    commands.insert_resource(lib);
}

pub fn start_music(
    mut commands: Commands,
    audio: Res<GameAudio>,
    config: Res<RunnerConfig>,
    q_music: Query<(), With<Music>>,
) {
    // No Duplicates When a Run Restarts
    if q_music.iter().next().is_some() {
        return;
    }

    commands.spawn((
        Music,
        AudioPlayer::new(audio.music_run.clone()),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(config.music_volume)),
    ));
}

pub fn stop_music(mut commands: Commands, q_music: Query<Entity, With<Music>>) {
    for e in q_music.iter() {
        commands.entity(e).despawn();
    }
}

pub fn play_sfx_events(
    lib: Res<SfxLibrary>,
    config: Res<RunnerConfig>,
    mut commands: Commands,
    mut ev: MessageReader<PlaySfx>,
    q_active_pickup: Query<Entity, With<ActivePickupSfx>>,
) {
    // Everything Else Overlaps; Only Newest Pickup Plays
    let mut last_pickup: Option<PlaySfx> = None;

    for e in ev.read() {
        if e.kind.is_pickup() {
            last_pickup = Some(*e);
            continue;
        }

        let Some(clip) = lib.pick(e.kind) else {
            warn!("Missing SFX for {:?}", e.kind);
            continue;
        };

        commands.spawn((
            Transform::from_translation(e.pos),
            AudioPlayer::new(clip),
            PlaybackSettings::DESPAWN
                .with_spatial(true)
                .with_spatial_scale(SpatialScale::new(0.12))
                .with_volume(Volume::Linear(e.kind.gain() * config.sfx_volume)),
        ));
    }

    let Some(e) = last_pickup else {
        return;
    };
    let Some(clip) = lib.pick(e.kind) else {
        warn!("Missing SFX for {:?}", e.kind);
        return;
    };

    for ent in q_active_pickup.iter() {
        commands.entity(ent).despawn();
    }

    commands.spawn((
        ActivePickupSfx,
        Transform::from_translation(e.pos),
        AudioPlayer::new(clip),
        PlaybackSettings::DESPAWN
            .with_spatial(true)
            .with_spatial_scale(SpatialScale::new(0.12))
            .with_volume(Volume::Linear(e.kind.gain() * config.sfx_volume)),
    ));
}
