//! Orbit, pan and zoom from pointer and touch input
//!
//! Pointer and touch handlers only accumulate deltas. The frame driver calls
//! [`OrbitControls::update`] once per frame while the tour is idle, which
//! folds the accumulated deltas into the rig through a spherical model
//! (azimuth around world up, polar angle from up, radius) centred on the
//! orbit target.

use crate::rig::CameraRig;
use std::f32::consts::PI;
use tracing::trace;
use walkthrough_core::{OrbitConfig, Vec2, Vec3};

/// Keeps the polar angle off the poles
const POLAR_EPSILON: f32 = 1e-6;

/// Mouse buttons the orbit controls react to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Rotate
    Primary,
    /// Pan
    Secondary,
    /// Pan
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gesture {
    Rotate,
    Pan,
}

/// Camera position relative to the target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Angle from +Z around the Y axis
    pub azimuth: f32,
    /// Angle from +Y
    pub polar: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                azimuth: 0.0,
                polar: 0.0,
            };
        }
        Self {
            radius,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let ring = self.polar.sin() * self.radius;
        Vec3::new(
            ring * self.azimuth.sin(),
            self.polar.cos() * self.radius,
            ring * self.azimuth.cos(),
        )
    }
}

/// Orbit camera controls
#[derive(Clone, Debug)]
pub struct OrbitControls {
    /// Rotation sensitivity (full turns per viewport height)
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Touch rotation sensitivity (half turns per viewport height)
    pub touch_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    /// Vertical field of view (radians)
    pub fov: f32,

    viewport: Vec2,
    gesture: Option<(Gesture, Vec2)>,
    touch: Option<Vec2>,

    // Accumulated since the last update
    delta_azimuth: f32,
    delta_polar: f32,
    pan_pixels: Vec2,
    scale: f32,
}

impl OrbitControls {
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            touch_rotate_speed: config.touch_rotate_speed,
            min_distance: config.min_distance,
            max_distance: f32::INFINITY,
            min_polar: config.min_polar,
            max_polar: config.max_polar,
            fov: config.fov_degrees.to_radians(),

            viewport: Vec2::new(1280.0, 720.0),
            gesture: None,
            touch: None,

            delta_azimuth: 0.0,
            delta_polar: 0.0,
            pan_pixels: Vec2::ZERO,
            scale: 1.0,
        }
    }

    /// Viewport size in pixels, used to scale screen deltas
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn set_distance_limits(&mut self, min: f32, max: f32) {
        self.min_distance = min.max(0.0);
        self.max_distance = max.max(self.min_distance);
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some() || self.touch.is_some()
    }

    /// Whether any input is waiting for the next update
    pub fn has_pending(&self) -> bool {
        self.delta_azimuth != 0.0
            || self.delta_polar != 0.0
            || self.pan_pixels != Vec2::ZERO
            || self.scale != 1.0
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    /// Begin a mouse drag; returns `true` when a gesture started
    pub fn pointer_down(&mut self, button: PointerButton, at: Vec2) -> bool {
        let gesture = match button {
            PointerButton::Primary => Gesture::Rotate,
            PointerButton::Secondary | PointerButton::Middle => Gesture::Pan,
        };
        self.gesture = Some((gesture, at));
        true
    }

    pub fn pointer_move(&mut self, at: Vec2) {
        let Some((gesture, last)) = self.gesture else {
            return;
        };
        let delta = Vec2::new(at.x - last.x, at.y - last.y);
        match gesture {
            Gesture::Rotate => {
                let scale = 2.0 * PI * self.rotate_speed / self.viewport.y;
                self.rotate(delta.x * scale, delta.y * scale);
            }
            Gesture::Pan => {
                self.pan_pixels += Vec2::new(delta.x * self.pan_speed, delta.y * self.pan_speed);
            }
        }
        self.gesture = Some((gesture, at));
    }

    pub fn pointer_up(&mut self) {
        self.gesture = None;
    }

    /// Scroll wheel; positive `delta_y` zooms out
    pub fn wheel(&mut self, delta_y: f32) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let step = 0.95_f32.powf(self.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= step;
        } else {
            self.scale /= step;
        }
        true
    }

    // =========================================================================
    // Touch
    // =========================================================================

    /// Begin a touch gesture
    ///
    /// Only single-finger rotation is handled; any other touch count aborts
    /// the gesture and returns `false`.
    pub fn touch_start(&mut self, points: &[Vec2]) -> bool {
        match points {
            [point] => {
                self.touch = Some(*point);
                true
            }
            _ => {
                self.touch = None;
                false
            }
        }
    }

    pub fn touch_move(&mut self, points: &[Vec2]) {
        let (Some(last), [point]) = (self.touch, points) else {
            self.touch = None;
            return;
        };
        let scale = self.touch_rotate_speed * PI / self.viewport.y;
        self.rotate((point.x - last.x) * scale, (point.y - last.y) * scale);
        self.touch = Some(*point);
    }

    pub fn touch_end(&mut self) {
        self.touch = None;
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Drop accumulated deltas and any gesture in progress
    pub fn discard(&mut self) {
        self.gesture = None;
        self.touch = None;
        self.reset_deltas();
    }

    /// Apply accumulated input to the rig
    ///
    /// Returns `true` if the rig changed.
    pub fn update(&mut self, rig: &mut CameraRig) -> bool {
        if !self.has_pending() {
            return false;
        }

        let offset = rig.position - rig.target;

        // Screen-space pan, scaled so the point under the cursor tracks it
        if self.pan_pixels != Vec2::ZERO {
            let distance = offset.length() * (self.fov / 2.0).tan();
            let per_pixel = 2.0 * distance / self.viewport.y;
            let forward = (-offset).normalize();
            let right = forward.cross(rig.up).normalize();
            let screen_up = right.cross(forward).normalize();
            let pan = right * (-self.pan_pixels.x * per_pixel) + screen_up * (self.pan_pixels.y * per_pixel);
            rig.target += pan;
        }

        let mut spherical = Spherical::from_offset(offset);
        spherical.azimuth += self.delta_azimuth;
        spherical.polar = (spherical.polar + self.delta_polar)
            .clamp(self.min_polar, self.max_polar)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        rig.position = rig.target + spherical.to_offset();
        trace!(
            "Orbit update: azimuth {:.3}, polar {:.3}, radius {:.3}",
            spherical.azimuth,
            spherical.polar,
            spherical.radius
        );

        self.reset_deltas();
        true
    }

    fn rotate(&mut self, left: f32, up: f32) {
        self.delta_azimuth -= left;
        self.delta_polar -= up;
    }

    fn reset_deltas(&mut self) {
        self.delta_azimuth = 0.0;
        self.delta_polar = 0.0;
        self.pan_pixels = Vec2::ZERO;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> OrbitControls {
        let mut controls = OrbitControls::new(&OrbitConfig::default());
        controls.set_viewport(800.0, 600.0);
        controls.set_distance_limits(0.3, 10.0);
        controls
    }

    fn rig() -> CameraRig {
        CameraRig::new(Vec3::new(0.0, 1.0, 4.0), Vec3::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vec3::new(1.0, 2.0, -3.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!(back.abs_diff_eq(offset, 1e-5));
    }

    #[test]
    fn test_no_input_leaves_rig_untouched() {
        let mut controls = controls();
        let mut rig = rig();
        let before = rig;
        assert!(!controls.update(&mut rig));
        assert_eq!(rig, before);
    }

    #[test]
    fn test_horizontal_drag_orbits_at_constant_distance() {
        let mut controls = controls();
        let mut rig = rig();

        controls.pointer_down(PointerButton::Primary, Vec2::new(400.0, 300.0));
        controls.pointer_move(Vec2::new(460.0, 300.0));
        assert!(controls.update(&mut rig));

        assert!((rig.orbit_distance() - 4.0).abs() < 1e-4);
        assert!(rig.position.x.abs() > 0.1);
        assert!((rig.position.y - 1.0).abs() < 1e-4);
        assert_eq!(rig.target, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut controls = controls();
        let mut rig = rig();

        for _ in 0..200 {
            controls.wheel(1.0);
        }
        controls.update(&mut rig);
        assert!((rig.orbit_distance() - 10.0).abs() < 1e-3);

        for _ in 0..400 {
            controls.wheel(-1.0);
        }
        controls.update(&mut rig);
        assert!((rig.orbit_distance() - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_pan_moves_camera_and_target_together() {
        let mut controls = controls();
        let mut rig = rig();
        let offset_before = rig.position - rig.target;

        controls.pointer_down(PointerButton::Secondary, Vec2::new(400.0, 300.0));
        controls.pointer_move(Vec2::new(300.0, 300.0));
        controls.update(&mut rig);

        // Dragging left slides the view right
        assert!(rig.target.x > 0.0);
        assert!((rig.position - rig.target).abs_diff_eq(offset_before, 1e-4));
    }

    #[test]
    fn test_polar_angle_never_flips_over_the_pole() {
        let mut controls = controls();
        let mut rig = rig();

        controls.pointer_down(PointerButton::Primary, Vec2::new(400.0, 0.0));
        controls.pointer_move(Vec2::new(400.0, 5000.0));
        controls.update(&mut rig);

        // Pinned just short of straight above, still on the starting side
        assert!(rig.position.y > rig.target.y + 3.9);
        assert!(rig.position.z >= 0.0);
        assert!((rig.orbit_distance() - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_multi_touch_aborts_rotation() {
        let mut controls = controls();
        let mut rig = rig();

        assert!(!controls.touch_start(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)]));
        controls.touch_move(&[Vec2::new(50.0, 0.0)]);
        assert!(!controls.update(&mut rig));

        assert!(controls.touch_start(&[Vec2::new(0.0, 0.0)]));
        controls.touch_move(&[Vec2::new(5.0, 0.0), Vec2::new(9.0, 0.0)]);
        assert!(!controls.is_dragging());
        assert!(!controls.update(&mut rig));
    }

    #[test]
    fn test_single_touch_rotates() {
        let mut controls = controls();
        let mut rig = rig();

        controls.touch_start(&[Vec2::new(100.0, 100.0)]);
        controls.touch_move(&[Vec2::new(160.0, 100.0)]);
        assert!(controls.update(&mut rig));
        assert!(rig.position.x.abs() > 0.1);
    }

    #[test]
    fn test_discard_drops_pending_input() {
        let mut controls = controls();
        let mut rig = rig();

        controls.wheel(1.0);
        controls.pointer_down(PointerButton::Primary, Vec2::ZERO);
        controls.discard();
        assert!(!controls.is_dragging());
        assert!(!controls.update(&mut rig));
    }
}
