//! Per-frame dispatch
//!
//! Each frame runs in a fixed order:
//!
//! 1. tour controller (timers and the in-flight leg)
//! 2. registered [`Tickable`]s in registration order
//! 3. orbit/pan/zoom from accumulated pointer input, only while idle
//! 4. orbit-target clamp, only while idle and when bounds are known
//! 5. hand the rig to the [`FrameSink`]
//!
//! Steps 3 and 4 are skipped while scripted motion owns the camera, so no
//! frame ever has two writers.

use crate::collision::SpatialQuery;
use crate::input::InputState;
use crate::rig::CameraRig;
use crate::session::Walkthrough;
use crate::tour::TourMode;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

new_key_type! {
    /// Handle returned by [`FrameDriver::register`]
    pub struct TickableId;
}

/// What a tickable sees during one frame
pub struct FrameContext<'a> {
    /// Elapsed time since the previous frame (ms)
    pub dt_ms: f32,
    /// Tour mode after the controller ticked this frame
    pub mode: TourMode,
    pub rig: &'a mut CameraRig,
    pub input: &'a mut InputState,
    /// Scene geometry, once the model is ready
    pub scene: Option<&'a dyn SpatialQuery>,
}

impl FrameContext<'_> {
    pub fn dt_seconds(&self) -> f32 {
        self.dt_ms / 1000.0
    }

    /// Whether user-driven motion may write the rig this frame
    pub fn is_idle(&self) -> bool {
        self.mode == TourMode::Idle
    }
}

/// A per-frame hook
pub trait Tickable {
    /// Short name used in logs
    fn name(&self) -> &str {
        "tickable"
    }

    fn tick(&mut self, frame: &mut FrameContext<'_>);
}

/// Consumer of the final rig each frame (a renderer, or a recorder in tests)
pub trait FrameSink {
    fn render(&mut self, rig: &CameraRig);
}

/// Sink that discards frames
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn render(&mut self, _rig: &CameraRig) {}
}

/// Summary of one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// The tour controller wrote the rig
    pub scripted: bool,
    /// Orbit input wrote the rig
    pub orbited: bool,
    /// The orbit target was pulled back inside its bounds
    pub clamped: bool,
}

/// Ordered list of tickables plus the fixed frame pipeline
#[derive(Default)]
pub struct FrameDriver {
    tickables: SlotMap<TickableId, Box<dyn Tickable>>,
    order: Vec<TickableId>,
    frame_count: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tickable; it runs after every previously registered one
    pub fn register(&mut self, tickable: Box<dyn Tickable>) -> TickableId {
        debug!("Registering tickable '{}'", tickable.name());
        let id = self.tickables.insert(tickable);
        self.order.push(id);
        id
    }

    /// Remove a tickable; unknown or already removed ids are ignored
    pub fn unregister(&mut self, id: TickableId) -> Option<Box<dyn Tickable>> {
        let removed = self.tickables.remove(id)?;
        self.order.retain(|other| *other != id);
        debug!("Unregistered tickable '{}'", removed.name());
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Run one frame against `walkthrough`
    ///
    /// Overlays are placed here once the fly-in ends. Tour events still queue
    /// until [`Walkthrough::take_events`]; undrained, only the newest
    /// [`MAX_QUEUED_EVENTS`](crate::MAX_QUEUED_EVENTS) are kept.
    pub fn frame(
        &mut self,
        walkthrough: &mut Walkthrough,
        dt_ms: f32,
        sink: &mut dyn FrameSink,
    ) -> FrameReport {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.frame_count += 1;
        trace!("Frame {} ({:.2}ms)", self.frame_count, dt_ms);

        let mut report = FrameReport::default();
        let parts = walkthrough.parts_mut();

        // 1. scripted motion
        report.scripted = parts.tour.tick(dt_ms, parts.rig);
        let mode = parts.tour.mode();

        // 2. tickables
        {
            let mut ctx = FrameContext {
                dt_ms,
                mode,
                rig: &mut *parts.rig,
                input: &mut *parts.input,
                scene: parts.scene,
            };
            for id in &self.order {
                if let Some(tickable) = self.tickables.get_mut(*id) {
                    tickable.tick(&mut ctx);
                }
            }
        }

        if mode == TourMode::Idle {
            // 3. orbit input
            report.orbited = parts.orbit.update(parts.rig);

            // 4. target clamp
            if let Some(bounds) = parts.target_bounds {
                let clamped = bounds.clamp_point(parts.rig.target);
                if clamped != parts.rig.target {
                    trace!("Clamped orbit target into bounds");
                    parts.rig.target = clamped;
                    report.clamped = true;
                }
            }
        } else {
            parts.orbit.discard();
        }

        // 5. render
        sink.render(parts.rig);

        walkthrough.settle_overlays();
        report
    }
}
