//! Camera rig: position, orbit target and world up

use serde::{Deserialize, Serialize};
use walkthrough_animation::Interpolate;
use walkthrough_core::{Vec3, Waypoint};

/// The shared camera/target pair every motion source writes to
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    /// Camera position in world space
    pub position: Vec3,
    /// Orbit target the camera looks at
    pub target: Vec3,
    /// Fixed world up
    pub up: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
    }
}

impl CameraRig {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::UP,
        }
    }

    /// Normalized view direction, or zero when camera and target coincide
    pub fn view_direction(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Distance between camera and target
    pub fn orbit_distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Move camera and target by the same vector
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.target += offset;
    }

    pub fn pose(&self) -> RigPose {
        RigPose {
            position: self.position,
            target: self.target,
        }
    }

    pub fn apply_pose(&mut self, pose: &RigPose) {
        self.position = pose.position;
        self.target = pose.target;
    }
}

/// The animatable part of a rig
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl RigPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }
}

impl From<&Waypoint> for RigPose {
    fn from(waypoint: &Waypoint) -> Self {
        Self::new(waypoint.camera, waypoint.target)
    }
}

impl Interpolate for RigPose {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && self.target.abs_diff_eq(other.target, epsilon)
    }
}
