//! Walkthrough Core
//!
//! Shared building blocks for the walkthrough camera crates.
//!
//! # Features
//!
//! - **Vector math**: `Vec2`, `Vec3` and axis-aligned `BoundingBox`
//! - **Waypoints**: immutable camera/target stops loaded at startup
//! - **Configuration**: TOML-backed `WalkthroughConfig` with validated defaults
//! - **Errors**: a single `WalkthroughError` for construction-time failures

pub mod config;
pub mod error;
pub mod math;
pub mod waypoint;

pub use config::{
    BoundsConfig, CollisionConfig, InterruptPolicy, MoveStyle, MovementConfig, OrbitConfig,
    OverlayConfig, TourConfig, WalkthroughConfig,
};
pub use error::{Result, WalkthroughError};
pub use math::{BoundingBox, Vec2, Vec3};
pub use waypoint::Waypoint;
