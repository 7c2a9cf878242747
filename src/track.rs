/*
Viking Run
*/
use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;

/// Three Lanes at X = -2 / 0 / 2
pub const LANE_COUNT: usize = 3;
pub const LANE_SPACING: f32 = 2.0;
pub const LEFT_MAX: f32 = -2.0;
pub const RIGHT_MAX: f32 = 2.0;

/// Run Direction is Bevy Forward (-Z)
pub const FORWARD: Vec3 = Vec3::NEG_Z;

#[inline]
pub fn lane_x(lane: usize) -> f32 {
    lane as f32 * LANE_SPACING - LANE_SPACING
}

/// Nearest Lane to World X (Clamped)
pub fn lane_for_x(x: f32) -> usize {
    let idx = ((x + LANE_SPACING) / LANE_SPACING).round();
    idx.clamp(0.0, (LANE_COUNT - 1) as f32) as usize
}

/// Lane Step Only if Result Stays Inside [LEFT_MAX, RIGHT_MAX]
pub fn step_lane(lane: usize, dir: i32) -> usize {
    let target_x = lane_x(lane) + dir as f32 * LANE_SPACING;
    if !(LEFT_MAX..=RIGHT_MAX).contains(&target_x) {
        return lane;
    }
    lane_for_x(target_x)
}

/// Distance Travelled Along Track
#[inline]
pub fn progress(pos: Vec3) -> f32 {
    -pos.z
}

#[inline]
pub fn track_point(x: f32, y: f32, progress: f32) -> Vec3 {
    Vec3::new(x, y, -progress)
}

/// Axis-Aligned Box Resting Centred at `center`
pub fn box_bounds(center: Vec3, size: Vec3) -> Aabb3d {
    Aabb3d::new(center, size * 0.5)
}
