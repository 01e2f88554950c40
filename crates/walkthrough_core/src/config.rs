//! Walkthrough configuration
//!
//! Loaded from a TOML file. Every section is optional and falls back to the
//! stock tuning, so an empty file yields the default gallery tour:
//!
//! ```toml
//! [tour]
//! transition_ms = 2800
//! auto_pause_ms = 1800
//!
//! [movement]
//! speed = 3.0
//! style = "dolly"
//!
//! [[waypoints]]
//! camera = { x = 0.15, y = 1.73, z = -0.03 }
//! target = { x = -0.12, y = 1.75, z = -0.14 }
//! ```

use crate::error::{Result, WalkthroughError};
use crate::math::Vec3;
use crate::waypoint::{Waypoint, DEFAULT_WAYPOINTS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

// =============================================================================
// Sections
// =============================================================================

/// What a user drag does to the committed waypoint when it interrupts a tour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InterruptPolicy {
    /// Keep the last waypoint the camera actually reached
    #[default]
    KeepLastCompleted,
    /// Forget the committed waypoint; the user is steering freely
    Uncommit,
}

/// How held movement keys move the camera
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MoveStyle {
    /// Translate camera and target together, vetoed by collisions
    #[default]
    Dolly,
    /// Slide only the orbit target, no collision checks
    TargetPan,
}

/// Scripted transition timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Duration of one waypoint leg (ms)
    pub transition_ms: u32,
    /// Duration of the initial fly-in (ms)
    pub fly_in_ms: u32,
    /// Pause between auto-tour legs (ms)
    pub auto_pause_ms: u32,
    /// Fly-in start distance as a multiple of the scene diagonal
    pub fly_in_distance_factor: f32,
    pub interrupt_policy: InterruptPolicy,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            transition_ms: 2800,
            fly_in_ms: 3500,
            auto_pause_ms: 1800,
            fly_in_distance_factor: 1.2,
            interrupt_policy: InterruptPolicy::default(),
        }
    }
}

/// Keyboard free movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub enabled: bool,
    /// Dolly speed (units per second)
    pub speed: f32,
    /// Target-pan speed (units per second)
    pub pan_speed: f32,
    pub style: MoveStyle,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 3.0,
            pan_speed: 2.5,
            style: MoveStyle::default(),
        }
    }
}

/// Collision probe tolerances
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Displacements shorter than this are ignored entirely
    pub min_displacement: f32,
    /// Extra ray length past the displacement
    pub far_margin: f32,
    /// Hits closer than `|d| + near_margin` block the move
    pub near_margin: f32,
    /// Hits whose normal has a larger vertical component count as floor
    pub floor_normal_y: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            min_displacement: 0.01,
            far_margin: 0.1,
            near_margin: 0.05,
            floor_normal_y: 0.7,
        }
    }
}

/// Orbit, pan and zoom sensitivities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub touch_rotate_speed: f32,
    /// Closest the camera may orbit to its target
    pub min_distance: f32,
    /// Farthest orbit distance, as a multiple of the scene diagonal
    pub max_distance_factor: f32,
    /// Polar angle limits (radians from straight up)
    pub min_polar: f32,
    pub max_polar: f32,
    /// Vertical field of view, used to scale screen-space panning
    pub fov_degrees: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 2.5,
            zoom_speed: 1.2,
            pan_speed: 1.0,
            touch_rotate_speed: 2.5,
            min_distance: 0.3,
            max_distance_factor: 1.5,
            min_polar: 0.0,
            max_polar: std::f32::consts::PI,
            fov_degrees: 60.0,
        }
    }
}

/// Orbit-target clamp derived from the scene bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub clamp_target: bool,
    /// Inset from the scene bounds on every side
    pub target_padding: f32,
    /// Lowest allowed target height
    pub target_min_y: f32,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            clamp_target: true,
            target_padding: 0.2,
            target_min_y: 0.2,
        }
    }
}

/// A decorative photo plane placed once the fly-in has finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub texture: String,
    #[serde(default = "default_overlay_extent")]
    pub width: f32,
    #[serde(default = "default_overlay_extent")]
    pub height: f32,
    pub position: Vec3,
    /// Direction the photo faces (away from the wall)
    pub facing: Vec3,
    /// Distance pushed along `facing` to avoid z-fighting
    #[serde(default = "default_overlay_offset")]
    pub offset: f32,
}

fn default_overlay_extent() -> f32 {
    1.0
}

fn default_overlay_offset() -> f32 {
    0.01
}

// =============================================================================
// WalkthroughConfig
// =============================================================================

/// Complete walkthrough configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkthroughConfig {
    pub tour: TourConfig,
    pub movement: MovementConfig,
    pub collision: CollisionConfig,
    pub orbit: OrbitConfig,
    pub bounds: BoundsConfig,
    pub waypoints: Vec<Waypoint>,
    pub overlays: Vec<OverlayConfig>,
}

impl Default for WalkthroughConfig {
    fn default() -> Self {
        Self {
            tour: TourConfig::default(),
            movement: MovementConfig::default(),
            collision: CollisionConfig::default(),
            orbit: OrbitConfig::default(),
            bounds: BoundsConfig::default(),
            waypoints: DEFAULT_WAYPOINTS.to_vec(),
            overlays: Vec::new(),
        }
    }
}

impl WalkthroughConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WalkthroughConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.waypoints.is_empty() {
            return Err(WalkthroughError::EmptyTour);
        }

        if let Some(index) = self.waypoints.iter().position(|w| !w.is_finite()) {
            return Err(WalkthroughError::InvalidConfig(format!(
                "waypoint {} has non-finite coordinates",
                index
            )));
        }

        check_non_negative("movement.speed", self.movement.speed)?;
        check_non_negative("movement.pan_speed", self.movement.pan_speed)?;
        check_non_negative("collision.min_displacement", self.collision.min_displacement)?;
        check_non_negative("collision.far_margin", self.collision.far_margin)?;
        check_non_negative("collision.near_margin", self.collision.near_margin)?;
        check_non_negative("orbit.min_distance", self.orbit.min_distance)?;
        check_non_negative("bounds.target_padding", self.bounds.target_padding)?;

        if self.collision.near_margin > self.collision.far_margin {
            return Err(WalkthroughError::InvalidConfig(
                "collision.near_margin must not exceed collision.far_margin".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.collision.floor_normal_y) {
            return Err(WalkthroughError::InvalidConfig(format!(
                "collision.floor_normal_y must be within [0, 1], got {}",
                self.collision.floor_normal_y
            )));
        }

        if self.orbit.min_polar > self.orbit.max_polar {
            return Err(WalkthroughError::InvalidConfig(
                "orbit.min_polar must not exceed orbit.max_polar".to_string(),
            ));
        }

        if self.tour.transition_ms == 0 {
            warn!("tour.transition_ms is 0; waypoint legs will snap instantly");
        }

        for overlay in &self.overlays {
            if !overlay.position.is_finite() || !overlay.facing.is_finite() {
                return Err(WalkthroughError::InvalidConfig(format!(
                    "overlay '{}' has non-finite placement",
                    overlay.texture
                )));
            }
        }

        Ok(())
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(WalkthroughError::InvalidConfig(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )))
    }
}
