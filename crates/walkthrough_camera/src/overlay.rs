//! Photo overlay placement
//!
//! Flat image planes hung on the scene's walls once the fly-in is over.
//! Only the placement is computed here; loading and drawing the texture is
//! the renderer's business.

use serde::Serialize;
use walkthrough_core::{OverlayConfig, Vec3};

/// World placement of one photo plane
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayPlacement {
    pub texture: String,
    pub width: f32,
    pub height: f32,
    /// Plane centre, pushed off the wall along `facing` (a negative offset
    /// pushes into it)
    pub position: Vec3,
    /// Rotation about world up (radians), turning the plane's +Z normal to
    /// face along the horizontal facing direction
    pub yaw: f32,
}

impl OverlayPlacement {
    pub fn from_config(config: &OverlayConfig) -> Self {
        let facing = horizontal_facing(config.facing);
        Self {
            texture: config.texture.clone(),
            width: config.width,
            height: config.height,
            position: config.position + config.facing * config.offset,
            yaw: facing.x.atan2(facing.z),
        }
    }

    /// Unit normal of the placed plane
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}

/// Horizontal projection of `facing`, or `±Z` for a vertical or zero facing
fn horizontal_facing(facing: Vec3) -> Vec3 {
    let flat = Vec3::new(facing.x, 0.0, facing.z);
    if flat.length_squared() > 1e-8 {
        return flat.normalize();
    }
    let z = if facing.z < 0.0 { -1.0 } else { 1.0 };
    Vec3::new(0.0, 0.0, z)
}

/// Place every configured overlay
pub fn place_overlays(overlays: &[OverlayConfig]) -> Vec<OverlayPlacement> {
    overlays.iter().map(OverlayPlacement::from_config).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn overlay(position: Vec3, facing: Vec3) -> OverlayConfig {
        OverlayConfig {
            texture: "images/photo.png".to_string(),
            width: 1.2,
            height: 0.8,
            position,
            facing,
            offset: 0.01,
        }
    }

    #[test]
    fn test_pushed_off_the_wall() {
        let placement = OverlayPlacement::from_config(&overlay(
            Vec3::new(0.0, 1.5, -3.0),
            Vec3::new(0.0, 0.0, 1.0),
        ));
        assert!(placement.position.abs_diff_eq(Vec3::new(0.0, 1.5, -2.99), 1e-6));
        assert!(placement.yaw.abs() < 1e-6);
    }

    #[test]
    fn test_yaw_follows_horizontal_facing() {
        let placement = OverlayPlacement::from_config(&overlay(
            Vec3::new(-2.0, 1.5, 0.0),
            Vec3::new(1.0, 0.4, 0.0),
        ));
        assert!((placement.yaw - FRAC_PI_2).abs() < 1e-6);
        assert!(placement.normal().abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_vertical_facing_falls_back() {
        assert_eq!(horizontal_facing(Vec3::UP), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(horizontal_facing(Vec3::ZERO), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_place_all() {
        let placements = place_overlays(&[
            overlay(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)),
            overlay(Vec3::ONE, Vec3::new(0.0, 0.0, -1.0)),
        ]);
        assert_eq!(placements.len(), 2);
        assert!((placements[1].yaw.abs() - std::f32::consts::PI).abs() < 1e-6);
    }
}
