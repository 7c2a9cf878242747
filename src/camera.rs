/*
Viking Run
*/
use bevy::audio::SpatialListener;
use bevy::prelude::*;
use rand::RngExt;

use crate::player::{Player, RUNNER_HALF_HEIGHT};
use crate::track;

// Behind and Above the Runner's Start Position
const CAMERA_START: Vec3 = Vec3::new(0.0, 4.0, 6.0);
const LOOK_AHEAD: f32 = 6.0;

/// Offset Captured Once From the First Player Seen
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CameraFollow {
    pub offset: Option<Vec3>,
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ScreenShake {
    pub remaining: f32,
    pub magnitude: f32,
}

impl ScreenShake {
    pub fn trigger(&mut self, duration: f32, magnitude: f32) {
        self.remaining = duration;
        self.magnitude = magnitude;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Advances by `dt`; Zero Once Finished
    pub fn jitter(&mut self, dt: f32, mut unit: impl FnMut() -> f32) -> Vec3 {
        if !self.is_active() {
            return Vec3::ZERO;
        }
        self.remaining -= dt;
        Vec3::new(unit() * self.magnitude, unit() * self.magnitude, 0.0)
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }
}

pub fn spawn_camera(mut commands: Commands) {
    let start = track::track_point(0.0, RUNNER_HALF_HEIGHT, 0.0);
    let look_at = start + track::FORWARD * LOOK_AHEAD;

    commands.spawn((
        Name::new("camera"),
        Camera3d::default(),
        CameraFollow::default(),
        SpatialListener::new(0.2),
        Transform::from_translation(CAMERA_START).looking_at(look_at, Vec3::Y),
    ));

    commands.spawn((
        Name::new("sun"),
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Runs After Movement, Before Transforms Propagate
pub fn camera_follow(
    time: Res<Time>,
    mut shake: ResMut<ScreenShake>,
    q_player: Query<&Transform, (With<Player>, Without<CameraFollow>)>,
    mut q_cam: Query<(&mut Transform, &mut CameraFollow)>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let Ok((mut cam_tf, mut follow)) = q_cam.single_mut() else {
        return;
    };

    let offset = *follow
        .offset
        .get_or_insert(cam_tf.translation - player_tf.translation);

    let mut rng = rand::rng();
    let jitter = shake.jitter(time.delta_secs(), || rng.random_range(-1.0..=1.0));

    cam_tf.translation = player_tf.translation + offset + jitter;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake_runs_for_duration_then_settles() {
        let mut s = ScreenShake::default();
        assert_eq!(s.jitter(0.016, || 1.0), Vec3::ZERO);

        s.trigger(0.1, 0.1);
        let j = s.jitter(0.05, || -1.0);
        assert_eq!(j, Vec3::new(-0.1, -0.1, 0.0));
        assert!(s.is_active());

        s.jitter(0.06, || 1.0);
        assert!(!s.is_active());
        assert_eq!(s.jitter(0.016, || 1.0), Vec3::ZERO);
    }

    #[test]
    fn retrigger_restarts_the_shake() {
        let mut s = ScreenShake::default();
        s.trigger(0.1, 0.1);
        s.jitter(0.09, || 0.0);
        s.trigger(0.1, 0.2);
        assert_eq!(s.remaining, 0.1);
        assert_eq!(s.magnitude, 0.2);
    }

    #[test]
    fn camera_keeps_initial_offset() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<ScreenShake>()
            .add_systems(Update, camera_follow);

        app.world_mut().spawn((
            Player,
            Transform::from_translation(Vec3::new(0.0, RUNNER_HALF_HEIGHT, 0.0)),
        ));
        let cam = app
            .world_mut()
            .spawn((CameraFollow::default(), Transform::from_translation(CAMERA_START)))
            .id();
        app.update();

        let mut q = app.world_mut().query_filtered::<&mut Transform, With<Player>>();
        for mut tf in q.iter_mut(app.world_mut()) {
            tf.translation.z = -10.0;
        }
        app.update();

        let cam_tf = app.world().get::<Transform>(cam).copied().unwrap_or_default();
        assert!(cam_tf.translation.abs_diff_eq(Vec3::new(0.0, 4.0, -4.0), 1e-5));
    }
}
