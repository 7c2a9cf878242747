/*
Viking Run
*/
use bevy::prelude::*;

use crate::config::RunnerConfig;
use crate::player::Player;
use crate::track::{self, LANE_COUNT, LANE_SPACING};
use crate::world::LevelEntity;

const GROUND_THICKNESS: f32 = 0.2;
const SIDE_MARGIN: f32 = 1.5;

// Float Slack so Accumulated Starts Don't Add a Spurious Segment
const EPSILON: f32 = 1e-3;

/// Endless Floor Made of Fixed-Length Segments
#[derive(Resource, Debug, Clone)]
pub struct GroundTrack {
    pub segment_length: f32,
    pub segments_ahead: u32,
    pub segments_behind: u32,
    /// Progress Where the Next Segment Starts
    pub next_start: f32,
}

impl GroundTrack {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            segment_length: config.segment_length,
            segments_ahead: config.segments_ahead,
            segments_behind: config.segments_behind,
            next_start: 0.0,
        }
    }

    /// Segment Starts Needed so Ground Reaches `ahead` Segments Past Player
    pub fn take_due(&mut self, player_progress: f32) -> Vec<f32> {
        let mut due = Vec::new();
        if self.segment_length <= 0.0 {
            return due;
        }
        let horizon = player_progress + self.segments_ahead as f32 * self.segment_length;
        while horizon - self.next_start > EPSILON {
            due.push(self.next_start);
            self.next_start += self.segment_length;
        }
        due
    }

    pub fn is_stale(&self, segment_start: f32, player_progress: f32) -> bool {
        segment_start < player_progress - self.segments_behind as f32 * self.segment_length
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct GroundSegment {
    pub start: f32,
}

#[derive(Resource, Clone, Default)]
pub struct GroundAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

pub fn ground_width() -> f32 {
    LANE_COUNT as f32 * LANE_SPACING + SIDE_MARGIN * 2.0
}

pub fn make_ground_assets(
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    color: Color,
    segment_length: f32,
) -> GroundAssets {
    GroundAssets {
        mesh: meshes.add(Cuboid::new(ground_width(), GROUND_THICKNESS, segment_length)),
        material: materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.95,
            ..default()
        }),
    }
}

pub fn spawn_segment(commands: &mut Commands, assets: &GroundAssets, start: f32, length: f32) {
    // Segment Covers [start, start + length) of Progress
    let center = track::track_point(0.0, -GROUND_THICKNESS * 0.5, start + length * 0.5);
    commands.spawn((
        Name::new("ground"),
        LevelEntity,
        GroundSegment { start },
        Mesh3d(assets.mesh.clone()),
        MeshMaterial3d(assets.material.clone()),
        Transform::from_translation(center),
    ));
}

pub fn extend_ground(
    mut commands: Commands,
    mut ground: ResMut<GroundTrack>,
    assets: Res<GroundAssets>,
    q_player: Query<&Transform, With<Player>>,
    q_segments: Query<(Entity, &GroundSegment)>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let player = track::progress(player_tf.translation);

    let length = ground.segment_length;
    for start in ground.take_due(player) {
        spawn_segment(&mut commands, &assets, start, length);
    }

    for (e, seg) in q_segments.iter() {
        if ground.is_stale(seg.start, player) {
            commands.entity(e).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> GroundTrack {
        GroundTrack::new(&RunnerConfig {
            segment_length: 10.0,
            ..default()
        })
    }

    #[test]
    fn initial_fill_lays_segments_ahead() {
        let mut g = track();
        assert_eq!(g.take_due(0.0), vec![0.0, 10.0, 20.0]);
        assert_eq!(g.next_start, 30.0);
        assert!(g.take_due(0.0).is_empty());
    }

    #[test]
    fn running_forward_adds_one_segment_at_a_time() {
        let mut g = track();
        g.take_due(0.0);
        assert_eq!(g.take_due(0.5), vec![30.0]);
        assert!(g.take_due(5.0).is_empty());
        assert_eq!(g.take_due(15.0), vec![40.0]);
    }

    #[test]
    fn segments_more_than_one_length_behind_are_stale() {
        let g = track();
        assert!(!g.is_stale(0.0, 10.0));
        assert!(g.is_stale(0.0, 10.5));
        assert!(!g.is_stale(10.0, 15.0));
    }
}
