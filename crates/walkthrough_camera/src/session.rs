//! Walkthrough session
//!
//! [`Walkthrough`] is the explicit context every component works against: the
//! rig, the tour controller, held keys, orbit input, scene geometry and the
//! target clamp. Input handlers are plain methods called between frames; a
//! [`FrameDriver`] advances it once per frame.

use crate::collision::SpatialQuery;
use crate::driver::FrameDriver;
use crate::free_move::FreeMover;
use crate::input::{Focus, InputState};
use crate::orbit::{OrbitControls, PointerButton};
use crate::overlay::{place_overlays, OverlayPlacement};
use crate::readiness::{ReadySignal, ReadyWaiter};
use crate::rig::CameraRig;
use crate::tour::{TourController, TourEvent, TourMode};
use tracing::{debug, info};
use walkthrough_core::{BoundingBox, Result, Vec2, Vec3, WalkthroughConfig};

/// Mutable views of the session handed to the frame driver
pub(crate) struct SessionParts<'a> {
    pub tour: &'a mut TourController,
    pub rig: &'a mut CameraRig,
    pub input: &'a mut InputState,
    pub orbit: &'a mut OrbitControls,
    pub scene: Option<&'a dyn SpatialQuery>,
    pub target_bounds: Option<BoundingBox>,
}

/// Everything one interactive walkthrough needs between frames
pub struct Walkthrough {
    config: WalkthroughConfig,
    rig: CameraRig,
    tour: TourController,
    input: InputState,
    orbit: OrbitControls,
    scene: Option<Box<dyn SpatialQuery>>,
    target_bounds: Option<BoundingBox>,
    ready: ReadySignal,
    overlays: Vec<OverlayPlacement>,
}

impl Walkthrough {
    /// Validate `config` and build an idle session with no scene
    pub fn new(config: WalkthroughConfig) -> Result<Self> {
        config.validate()?;
        let tour = TourController::new(config.waypoints.clone(), config.tour.clone())?;
        let orbit = OrbitControls::new(&config.orbit);
        Ok(Self {
            rig: CameraRig::default(),
            tour,
            input: InputState::new(),
            orbit,
            scene: None,
            target_bounds: None,
            ready: ReadySignal::new(),
            overlays: Vec::new(),
            config,
        })
    }

    /// A frame driver with the stock free mover registered
    pub fn frame_driver(&self) -> FrameDriver {
        let mut driver = FrameDriver::new();
        driver.register(Box::new(FreeMover::new(
            self.config.movement.clone(),
            self.config.collision.clone(),
        )));
        driver
    }

    pub fn config(&self) -> &WalkthroughConfig {
        &self.config
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut CameraRig {
        &mut self.rig
    }

    pub fn tour(&self) -> &TourController {
        &self.tour
    }

    pub fn mode(&self) -> TourMode {
        self.tour.mode()
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }

    pub fn target_bounds(&self) -> Option<BoundingBox> {
        self.target_bounds
    }

    pub fn set_target_bounds(&mut self, bounds: Option<BoundingBox>) {
        self.target_bounds = bounds;
    }

    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Handle resolved by [`on_model_ready`](Self::on_model_ready)
    pub fn ready_waiter(&self) -> ReadyWaiter {
        self.ready.waiter()
    }

    /// Overlays placed after the fly-in
    pub fn overlays(&self) -> &[OverlayPlacement] {
        &self.overlays
    }

    pub(crate) fn parts_mut(&mut self) -> SessionParts<'_> {
        SessionParts {
            tour: &mut self.tour,
            rig: &mut self.rig,
            input: &mut self.input,
            orbit: &mut self.orbit,
            scene: self.scene.as_deref(),
            target_bounds: if self.config.bounds.clamp_target {
                self.target_bounds
            } else {
                None
            },
        }
    }

    // =========================================================================
    // Model
    // =========================================================================

    /// The scene finished loading
    ///
    /// Installs the geometry, derives the target clamp and orbit limits from
    /// `scene_bounds`, parks the camera outside the scene and starts the
    /// fly-in to the first waypoint. Resolves the readiness signal.
    pub fn on_model_ready(&mut self, scene: Box<dyn SpatialQuery>, scene_bounds: BoundingBox) {
        self.scene = Some(scene);

        if scene_bounds.is_empty() {
            debug!("Scene bounds are empty; no target clamp or orbit limit");
            self.target_bounds = None;
        } else {
            self.target_bounds = Some(self.target_bounds_for(&scene_bounds));
            let diagonal = scene_bounds.size().length();
            self.orbit.set_distance_limits(
                self.config.orbit.min_distance,
                diagonal * self.config.orbit.max_distance_factor,
            );
            self.rig = approach_rig(&scene_bounds, self.config.tour.fly_in_distance_factor);
        }

        self.input.clear();
        self.orbit.discard();
        self.overlays.clear();
        self.tour.begin_fly_in();
        info!("Model ready; flying in to the first waypoint");
        self.ready.resolve();
    }

    fn target_bounds_for(&self, scene: &BoundingBox) -> BoundingBox {
        let padding = self.config.bounds.target_padding;
        let mut min = scene.min + Vec3::splat(padding);
        let mut max = scene.max - Vec3::splat(padding);
        min.y = min.y.max(self.config.bounds.target_min_y);
        max.y = max.y.min(scene.max.y - padding * 0.5);
        // Thinner than the padding on some axis: collapse onto the inset min
        BoundingBox::new(min, max.max(min))
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub fn go_to_next(&mut self) -> bool {
        self.tour.go_to_next()
    }

    pub fn go_to_prev(&mut self) -> bool {
        self.tour.go_to_prev()
    }

    pub fn start_auto_tour(&mut self) -> bool {
        self.tour.start_auto_tour()
    }

    pub fn stop_auto_tour(&mut self) -> bool {
        self.tour.stop_auto_tour()
    }

    /// Drain tour events, placing overlays when the fly-in ends
    pub fn take_events(&mut self) -> Vec<TourEvent> {
        let events = self.tour.take_events();
        self.settle_overlays();
        events
    }

    /// Place the configured overlays once the fly-in is over
    pub(crate) fn settle_overlays(&mut self) {
        if !self.tour.fly_in_ended()
            || !self.overlays.is_empty()
            || self.config.overlays.is_empty()
        {
            return;
        }
        self.overlays = place_overlays(&self.config.overlays);
        info!("Placed {} photo overlays", self.overlays.len());
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Key press; returns `true` if the key was consumed
    ///
    /// Space and Enter step to the next waypoint while idle. Movement keys
    /// are recorded and picked up by the free mover.
    pub fn key_down(&mut self, code: &str, focus: Focus) -> bool {
        if focus == Focus::TextField {
            return false;
        }
        match code {
            "Space" | "Enter" => {
                if self.tour.mode() == TourMode::Idle {
                    self.tour.go_to_next()
                } else {
                    false
                }
            }
            _ => self.input.key_down(code, focus),
        }
    }

    pub fn key_up(&mut self, code: &str) {
        self.input.key_up(code);
    }

    /// Window lost focus
    pub fn blur(&mut self) {
        self.input.blur();
        self.orbit.pointer_up();
        self.orbit.touch_end();
    }

    pub fn pointer_down(&mut self, button: PointerButton, at: Vec2) {
        self.tour.on_interaction_start();
        self.orbit.pointer_down(button, at);
    }

    pub fn pointer_move(&mut self, at: Vec2) {
        self.orbit.pointer_move(at);
    }

    pub fn pointer_up(&mut self) {
        self.orbit.pointer_up();
    }

    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y != 0.0 {
            self.tour.on_interaction_start();
        }
        self.orbit.wheel(delta_y);
    }

    pub fn touch_start(&mut self, points: &[Vec2]) {
        if self.orbit.touch_start(points) {
            self.tour.on_interaction_start();
        }
    }

    pub fn touch_move(&mut self, points: &[Vec2]) {
        self.orbit.touch_move(points);
    }

    pub fn touch_end(&mut self) {
        self.orbit.touch_end();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.orbit.set_viewport(width, height);
    }
}

/// Camera parked above and in front of the scene, looking at its centre
pub fn approach_rig(scene: &BoundingBox, distance_factor: f32) -> CameraRig {
    let center = scene.center();
    let size = scene.size();
    CameraRig::new(
        Vec3::new(
            center.x,
            center.y + size.y,
            center.z + size.length() * distance_factor,
        ),
        center,
    )
}
