//! Walkthrough Camera
//!
//! Camera motion controller for interactive 3D walkthroughs: a camera that
//! either follows the user (orbit, pan, zoom, WASD) or a scripted sequence
//! of waypoints, with clean hand-over between the two.
//!
//! # Components
//!
//! - [`TourController`]: the mode state machine (idle, manual leg, auto tour)
//! - [`FreeMover`]: collision-checked keyboard movement
//! - [`OrbitControls`]: pointer and touch orbit/pan/zoom
//! - [`SpatialQuery`] / [`TriangleMesh`]: what the camera can bump into
//! - [`FrameDriver`]: the fixed per-frame pipeline
//! - [`Walkthrough`]: the session tying it together
//!
//! # Example
//!
//! ```ignore
//! use walkthrough_camera::prelude::*;
//!
//! let mut walkthrough = Walkthrough::new(WalkthroughConfig::default())?;
//! let mut driver = walkthrough.frame_driver();
//!
//! walkthrough.on_model_ready(Box::new(mesh), mesh_bounds);
//! loop {
//!     driver.frame(&mut walkthrough, dt_ms, &mut renderer);
//! }
//! ```

pub mod collision;
pub mod driver;
pub mod free_move;
pub mod input;
pub mod orbit;
pub mod overlay;
pub mod readiness;
pub mod readout;
pub mod rig;
pub mod session;
pub mod tour;

pub use collision::{check_move, MoveCheck, Ray, RaycastHit, RaycastHits, SpatialQuery, TriangleMesh};
pub use driver::{FrameContext, FrameDriver, FrameReport, FrameSink, NullSink, Tickable, TickableId};
pub use free_move::{horizontal_basis, FreeMover};
pub use input::{Focus, InputState, MoveKey};
pub use orbit::{OrbitControls, PointerButton, Spherical};
pub use overlay::{place_overlays, OverlayPlacement};
pub use readiness::{ReadySignal, ReadyWaiter};
pub use readout::{CameraReadout, ReadoutText};
pub use rig::{CameraRig, RigPose};
pub use session::{approach_rig, Walkthrough};
pub use tour::{
    LegKind, TourControls, TourController, TourEvent, TourMode, TourState, MAX_QUEUED_EVENTS,
};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CameraReadout, CameraRig, Focus, FrameDriver, FrameSink, PointerButton, SpatialQuery,
        Tickable, TourEvent, TourMode, TriangleMesh, Walkthrough,
    };
    pub use walkthrough_core::{BoundingBox, Vec2, Vec3, WalkthroughConfig};
}
