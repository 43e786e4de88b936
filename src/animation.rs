use std::f32::consts::TAU;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Uniform scale applied to the whole group of slime cubes.
pub const SLIME_GROUP_SCALE: f32 = 0.5;

/// Accumulated animation time in seconds.
///
/// Advanced once per frame by the previous frame's duration; it grows without
/// bound for as long as the scene runs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationClock {
    elapsed: f64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the duration of the last frame. Negative durations are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed += f64::from(dt);
        }
    }

    pub fn seconds(&self) -> f32 {
        self.elapsed as f32
    }
}

/// Squash-and-stretch parameters of one slime cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlimeCube {
    pub amplitude: f32,
    pub frequency: f32,
    /// Vertical placement of the cube relative to the floor.
    pub y_placement: f32,
    /// Edge length of the cube before animation.
    pub scale: f32,
    /// Where the cube sits in the (unscaled) cube group.
    #[serde(default)]
    pub position: Vec3,
}

impl Default for SlimeCube {
    fn default() -> Self {
        Self {
            amplitude: 0.5,
            frequency: 0.5,
            y_placement: 0.5,
            scale: 1.0,
            position: Vec3::ZERO,
        }
    }
}

impl SlimeCube {
    /// Amplitudes at or above this let the vertical scale reach zero.
    pub const MAX_AMPLITUDE: f32 = 2.0;

    pub fn new(amplitude: f32, frequency: f32, y_placement: f32, scale: f32, position: Vec3) -> Self {
        Self {
            amplitude,
            frequency,
            y_placement,
            scale,
            position,
        }
    }

    /// Height factor of the cube at `elapsed`; exactly 2 at time zero.
    pub fn vertical_scale(&self, elapsed: f32) -> f32 {
        self.amplitude * (TAU * self.frequency * elapsed).sin() + 2.0
    }

    /// Non-uniform scale for the current frame: height by the vertical scale,
    /// both horizontal axes by its reciprocal times three.
    pub fn squash(&self, elapsed: f32) -> Vec3 {
        let vertical = self.vertical_scale(elapsed);
        let horizontal = 3.0 / vertical;
        Vec3::new(horizontal, vertical, horizontal)
    }

    /// Transform of the unit cube into the slime's local frame.
    ///
    /// Drops the box by half its height onto the placement, squashes it and
    /// lifts it back by half its scaled height so the base stays put.
    pub fn local_transform(&self, elapsed: f32) -> Mat4 {
        let half_height = self.scale / 2.0;
        Mat4::from_translation(Vec3::new(0.0, self.y_placement - half_height, 0.0))
            * Mat4::from_scale(self.squash(elapsed))
            * Mat4::from_translation(Vec3::new(0.0, half_height, 0.0))
            * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Full model matrix including the shared offset and the group scale.
    pub fn model_matrix(&self, elapsed: f32, offset_x: f32) -> Mat4 {
        Mat4::from_scale(Vec3::splat(SLIME_GROUP_SCALE))
            * Mat4::from_translation(Vec3::new(offset_x, 0.0, 0.0))
            * Mat4::from_translation(self.position)
            * self.local_transform(elapsed)
    }
}

/// The three cubes of the default scene.
pub fn default_slimes() -> Vec<SlimeCube> {
    vec![
        SlimeCube::new(0.5, 0.5, 0.5, 1.0, Vec3::new(3.0, 0.0, 2.0)),
        SlimeCube::new(0.5, 0.4, 0.125, 0.25, Vec3::new(1.5, 0.0, 3.5)),
        SlimeCube::new(0.6, 0.2, 0.75, 1.5, Vec3::new(-4.0, 0.0, 2.0)),
    ]
}

/// Horizontal offset shared by every cube, moved in small keyboard steps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlideOffset {
    value: f32,
}

impl SlideOffset {
    pub const STEP: f32 = 0.01;
    pub const LIMIT: f32 = 8.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Moves by `steps` keyboard steps, clamped to `[-LIMIT, LIMIT]`.
    pub fn nudge(&mut self, steps: f32) {
        self.value = (self.value + steps * Self::STEP).clamp(-Self::LIMIT, Self::LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn bottom_height(cube: &SlimeCube, elapsed: f32) -> f32 {
        let corner = cube.local_transform(elapsed) * Vec4::new(0.5, -0.5, 0.5, 1.0);
        corner.y
    }

    #[test]
    fn every_cube_rests_at_two_at_time_zero() {
        for cube in default_slimes() {
            assert_eq!(cube.vertical_scale(0.0), 2.0);
        }
        let fast = SlimeCube::new(1.5, 123.0, -3.0, 9.0, Vec3::ONE);
        assert_eq!(fast.vertical_scale(0.0), 2.0);
    }

    #[test]
    fn squash_stays_finite_below_max_amplitude() {
        let cube = SlimeCube::new(1.99, 0.25, 0.5, 1.0, Vec3::ZERO);
        for frame in 0..240 {
            let t = frame as f32 / 20.0;
            assert!(cube.vertical_scale(t) > 0.0);
            assert!(cube.squash(t).is_finite());
            assert!(cube.model_matrix(t, 0.0).is_finite());
        }
    }

    #[test]
    fn vertical_scale_peaks_at_quarter_period() {
        let cube = SlimeCube::default();
        let quarter = 1.0 / (4.0 * cube.frequency);
        assert!((cube.vertical_scale(quarter) - 2.5).abs() < 1e-5);
    }

    #[test]
    fn squash_uses_reciprocal_on_horizontal_axes() {
        let cube = SlimeCube::default();
        let squash = cube.squash(0.0);
        assert_eq!(squash, Vec3::new(1.5, 2.0, 1.5));
    }

    #[test]
    fn base_stays_put_while_squashing() {
        let cube = SlimeCube::new(0.6, 0.2, 0.75, 1.5, Vec3::ZERO);
        let rest = bottom_height(&cube, 0.0);
        for frame in 1..120 {
            let t = frame as f32 / 30.0;
            assert!((bottom_height(&cube, t) - rest).abs() < 1e-4);
        }
        assert!((rest - (cube.y_placement - cube.scale / 2.0)).abs() < 1e-6);
    }

    #[test]
    fn model_matrix_applies_offset_and_group_scale() {
        let cube = SlimeCube::new(0.5, 0.5, 0.5, 1.0, Vec3::new(3.0, 0.0, 2.0));
        let centre = cube.model_matrix(0.0, 1.0) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((centre.x - 2.0).abs() < 1e-6);
        assert!((centre.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn slide_offset_never_leaves_bounds() {
        let mut offset = SlideOffset::new();
        for _ in 0..2000 {
            offset.nudge(1.0);
        }
        assert_eq!(offset.value(), SlideOffset::LIMIT);
        for step in 0..5000 {
            offset.nudge(if step % 7 == 0 { 1.0 } else { -1.0 });
            assert!(offset.value().abs() <= SlideOffset::LIMIT);
        }
        for _ in 0..10 {
            offset.nudge(-1.0);
        }
        assert_eq!(offset.value(), -SlideOffset::LIMIT);
    }

    #[test]
    fn clock_accumulates_frame_durations() {
        let mut clock = AnimationClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        clock.advance(-1.0);
        assert_eq!(clock.seconds(), 0.75);
    }
}
