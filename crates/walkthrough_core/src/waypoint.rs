//! Tour waypoints

use crate::math::Vec3;
use serde::{Deserialize, Serialize};

/// One stop on the tour: where the camera sits and what it looks at
///
/// Waypoints are created once from configuration and never mutated. Their
/// position in the tour list is their identity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Camera position
    pub camera: Vec3,
    /// Orbit target the camera looks at
    pub target: Vec3,
}

impl Waypoint {
    pub const fn new(camera: Vec3, target: Vec3) -> Self {
        Self { camera, target }
    }

    pub fn is_finite(&self) -> bool {
        self.camera.is_finite() && self.target.is_finite()
    }
}

const fn wp(camera: [f32; 3], target: [f32; 3]) -> Waypoint {
    Waypoint::new(
        Vec3::new(camera[0], camera[1], camera[2]),
        Vec3::new(target[0], target[1], target[2]),
    )
}

/// The stock gallery tour
pub const DEFAULT_WAYPOINTS: [Waypoint; 12] = [
    wp([0.1546, 1.7267, -0.0258], [-0.1229, 1.7523, -0.1369]),
    wp([-1.5995, 2.7991, -0.6406], [-1.8870, 2.8247, -0.7225]),
    wp([-2.6868, 3.2417, -0.5816], [-2.9775, 3.2904, -0.5262]),
    wp([0.5377, 1.4693, 1.0411], [0.8268, 1.5408, 1.0045]),
    wp([2.4732, 1.8933, 0.3814], [2.7623, 1.9648, 0.3448]),
    wp([2.0884, 2.7534, 0.5873], [2.5614, 2.8705, 0.5273]),
    wp([2.9341, 2.9760, 0.6030], [3.2709, 3.0866, 0.4563]),
    wp([2.1693, 1.5308, 1.3365], [2.0113, 1.5952, 0.6007]),
    wp([1.9051, 2.1284, -0.4975], [1.8370, 2.2074, -0.7788]),
    wp([1.3600, 2.8665, -1.4539], [1.4794, 2.8611, -1.7291]),
    wp([1.0857, 2.9407, -1.9464], [0.8841, 2.8513, -2.1498]),
    wp([0.7520, 2.0762, -1.9000], [0.6203, 2.0017, -2.1591]),
];
