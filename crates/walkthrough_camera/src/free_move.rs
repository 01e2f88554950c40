//! Keyboard free movement
//!
//! Held movement keys move the camera in the horizontal plane of the current
//! view. In [`MoveStyle::Dolly`] camera and target translate together and
//! every step is checked against the scene first. In
//! [`MoveStyle::TargetPan`] only the orbit target slides and nothing is
//! checked.

use crate::collision::{check_move, MoveCheck};
use crate::driver::{FrameContext, Tickable};
use crate::rig::CameraRig;
use tracing::trace;
use walkthrough_core::{CollisionConfig, MoveStyle, MovementConfig, Vec3};

/// Below this horizontal length the view counts as vertical
const VERTICAL_VIEW_EPSILON: f32 = 1e-3;

/// Horizontal `(forward, right)` unit vectors for the rig's view
///
/// When looking straight up or down the forward falls back to `-Z` or `+Z`,
/// chosen so "forward" still moves toward the top of the screen.
pub fn horizontal_basis(rig: &CameraRig) -> (Vec3, Vec3) {
    let view = rig.view_direction();
    let flat = Vec3::new(view.x, 0.0, view.z);
    let forward = if flat.length_squared() < VERTICAL_VIEW_EPSILON {
        let sign = (rig.up.y * view.y).signum();
        Vec3::new(0.0, 0.0, -sign)
    } else {
        flat.normalize()
    };
    let right = forward.cross(rig.up).normalize();
    (forward, right)
}

/// Applies held movement keys to the rig each idle frame
#[derive(Clone, Debug)]
pub struct FreeMover {
    movement: MovementConfig,
    collision: CollisionConfig,
    blocked_frames: u64,
}

impl FreeMover {
    pub fn new(movement: MovementConfig, collision: CollisionConfig) -> Self {
        Self {
            movement,
            collision,
            blocked_frames: 0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.movement.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.movement.enabled
    }

    /// Frames on which a dolly step was vetoed by the scene
    pub fn blocked_frames(&self) -> u64 {
        self.blocked_frames
    }

    /// Unit direction of travel for the held keys, or zero
    fn direction(&self, frame: &FrameContext<'_>) -> Vec3 {
        let (ahead, sideways) = frame.input.axes();
        if ahead == 0.0 && sideways == 0.0 {
            return Vec3::ZERO;
        }
        let (forward, right) = horizontal_basis(&*frame.rig);
        (forward * ahead + right * sideways).normalize()
    }
}

impl Tickable for FreeMover {
    fn name(&self) -> &str {
        "free-mover"
    }

    fn tick(&mut self, frame: &mut FrameContext<'_>) {
        if !frame.is_idle() || !self.movement.enabled {
            frame.input.clear();
            return;
        }

        let direction = self.direction(frame);
        if direction == Vec3::ZERO {
            return;
        }

        match self.movement.style {
            MoveStyle::Dolly => {
                let step = direction * (self.movement.speed * frame.dt_seconds());
                match check_move(frame.scene, frame.rig.position, step, &self.collision) {
                    MoveCheck::Clear => {
                        frame.rig.translate(step);
                        trace!("Dolly by ({:.3}, {:.3}, {:.3})", step.x, step.y, step.z);
                    }
                    MoveCheck::Blocked => self.blocked_frames += 1,
                    MoveCheck::Negligible => {}
                }
            }
            MoveStyle::TargetPan => {
                let step = direction * (self.movement.pan_speed * frame.dt_seconds());
                frame.rig.target += step;
            }
        }
    }
}
