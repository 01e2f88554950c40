//! Waypoint tour controller
//!
//! Owns the waypoint list and arbitrates between the three motion sources
//! that can drive the camera:
//!
//! - **Idle**: the user drives it (orbit, pan, zoom, free movement)
//! - **ManualTransition**: a single scripted leg to one waypoint (including
//!   the initial fly-in)
//! - **AutoTransition**: a looping tour of scripted legs separated by pauses
//!
//! Exactly one mode holds at any time. Entering one mode tears the previous
//! one down completely (pending pause timer cancelled, interpolation dropped)
//! before anything new starts.
//!
//! Commands take effect immediately on the mode; the interpolation for a
//! newly requested leg starts from wherever the rig is on the next
//! [`TourController::tick`], which runs before any other writer in a frame.
//!
//! ```ignore
//! let mut tour = TourController::new(config.waypoints.clone(), config.tour.clone())?;
//! tour.go_to_next();
//!
//! loop {
//!     tour.tick(16.0, &mut rig);
//!     for event in tour.take_events() {
//!         // update buttons, log, ...
//!     }
//! }
//! ```

use crate::rig::{CameraRig, RigPose};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};
use walkthrough_animation::{Easing, TimerId, TimerQueue, Tween, TweenStep};
use walkthrough_core::{InterruptPolicy, Result, TourConfig, WalkthroughError, Waypoint};

/// Which motion source currently owns the camera
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TourMode {
    /// User input drives the camera
    #[default]
    Idle,
    /// A one-shot scripted leg is in flight
    ManualTransition,
    /// The looping tour is running (mid-leg or pausing between legs)
    AutoTransition,
}

/// Kind of scripted leg
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LegKind {
    /// Requested with next/prev
    Manual,
    /// Part of the auto tour
    Auto,
    /// The approach from outside the scene to waypoint 0
    FlyIn,
}

/// Authoritative tour state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TourState {
    pub mode: TourMode,
    /// Last waypoint the camera committed to; `None` while roaming freely
    /// or before the fly-in completes
    pub active_waypoint: Option<usize>,
    /// Pause timer before the next auto leg
    pub pending_auto: Option<TimerId>,
}

/// Notifications produced while commands run and legs progress
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TourEvent {
    LegStarted { index: usize, kind: LegKind },
    LegFinished { index: usize, kind: LegKind },
    AutoTourStarted,
    AutoTourStopped,
    /// A user drag cut a scripted motion short
    Interrupted { active_waypoint: Option<usize> },
    /// The fly-in completed, or was cut short by another command
    FlyInFinished { skipped: bool },
}

/// Button state derived from the tour mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TourControls {
    pub start_visible: bool,
    pub stop_visible: bool,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub next_enabled: bool,
    pub prev_enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Leg {
    index: usize,
    kind: LegKind,
    started: bool,
}

/// Events kept for hosts that never drain them; the oldest go first
pub const MAX_QUEUED_EVENTS: usize = 256;

#[derive(Clone, Copy, Debug)]
enum TourTimer {
    NextLeg(usize),
}

/// Waypoint tour state machine
pub struct TourController {
    waypoints: Vec<Waypoint>,
    config: TourConfig,
    easing: Easing,

    state: TourState,
    leg: Option<Leg>,
    tween: Tween<RigPose>,
    timers: TimerQueue<TourTimer>,
    events: VecDeque<TourEvent>,
    fly_in_ended: bool,
}

impl TourController {
    /// Create a controller in `Idle` with no committed waypoint
    pub fn new(waypoints: Vec<Waypoint>, config: TourConfig) -> Result<Self> {
        if waypoints.is_empty() {
            return Err(WalkthroughError::EmptyTour);
        }
        Ok(Self {
            waypoints,
            config,
            easing: Easing::CubicInOut,
            state: TourState::default(),
            leg: None,
            tween: Tween::new(),
            timers: TimerQueue::new(),
            events: VecDeque::new(),
            fly_in_ended: false,
        })
    }

    /// Use a different easing curve for every leg
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn state(&self) -> &TourState {
        &self.state
    }

    pub fn mode(&self) -> TourMode {
        self.state.mode
    }

    pub fn active_waypoint(&self) -> Option<usize> {
        self.state.active_waypoint
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Whether user input may drive the camera
    pub fn accepts_input(&self) -> bool {
        self.state.mode == TourMode::Idle
    }

    /// The leg currently interpolating or about to, if any
    pub fn current_leg(&self) -> Option<(usize, LegKind)> {
        self.leg.map(|leg| (leg.index, leg.kind))
    }

    /// Button visibility and enablement for the current mode
    pub fn controls(&self) -> TourControls {
        let touring = self.state.mode == TourMode::AutoTransition;
        let busy = self.state.mode != TourMode::Idle;
        TourControls {
            start_visible: !touring,
            stop_visible: touring,
            start_enabled: !busy,
            stop_enabled: touring,
            next_enabled: !busy,
            prev_enabled: !busy,
        }
    }

    /// Drain queued events, oldest first
    ///
    /// At most [`MAX_QUEUED_EVENTS`] are held between drains.
    pub fn take_events(&mut self) -> Vec<TourEvent> {
        self.events.drain(..).collect()
    }

    /// Whether the latest fly-in has finished or been skipped
    pub fn fly_in_ended(&self) -> bool {
        self.fly_in_ended
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Start a manual leg to the waypoint after the committed one
    ///
    /// Stops a running auto tour first. No-op while a manual leg is in
    /// flight.
    pub fn go_to_next(&mut self) -> bool {
        self.step(1)
    }

    /// Start a manual leg to the waypoint before the committed one
    pub fn go_to_prev(&mut self) -> bool {
        self.step(-1)
    }

    /// Start a manual leg to a specific waypoint
    ///
    /// Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.waypoints.len() {
            debug!(
                "Ignoring leg to waypoint {} (tour has {})",
                index,
                self.waypoints.len()
            );
            return false;
        }
        if self.state.mode == TourMode::ManualTransition {
            debug!("Manual leg already in flight; ignoring request for {}", index);
            return false;
        }
        if self.state.mode == TourMode::AutoTransition {
            self.stop_auto_tour();
        }

        self.state.mode = TourMode::ManualTransition;
        self.arm_leg(index, LegKind::Manual);
        true
    }

    /// Start looping through the waypoints from the one after the committed
    /// one
    ///
    /// Cancels a manual leg (or the fly-in) in flight. No-op if already
    /// touring.
    pub fn start_auto_tour(&mut self) -> bool {
        if self.state.mode == TourMode::AutoTransition {
            debug!("Auto tour already running");
            return false;
        }
        if self.state.mode == TourMode::ManualTransition {
            self.abandon_leg();
        }

        info!("Starting auto tour");
        self.state.mode = TourMode::AutoTransition;
        self.emit(TourEvent::AutoTourStarted);
        let index = self.offset_index(1);
        self.arm_leg(index, LegKind::Auto);
        true
    }

    /// Stop the auto tour, keeping the last completed waypoint
    ///
    /// No-op unless touring.
    pub fn stop_auto_tour(&mut self) -> bool {
        if self.state.mode != TourMode::AutoTransition {
            debug!("Auto tour not running");
            return false;
        }

        info!("Stopping auto tour");
        self.teardown();
        self.emit(TourEvent::AutoTourStopped);
        true
    }

    /// The user grabbed the camera (drag, touch or wheel)
    ///
    /// Any scripted motion is torn down and the interrupt policy decides
    /// whether a waypoint stays committed. Returns `true` if scripted motion
    /// was interrupted.
    pub fn on_interaction_start(&mut self) -> bool {
        let interrupted = match self.state.mode {
            TourMode::Idle => false,
            TourMode::ManualTransition => {
                self.abandon_leg();
                true
            }
            TourMode::AutoTransition => {
                self.teardown();
                self.emit(TourEvent::AutoTourStopped);
                true
            }
        };

        if self.config.interrupt_policy == InterruptPolicy::Uncommit {
            self.state.active_waypoint = None;
        }

        if interrupted {
            info!(
                "User interaction interrupted scripted motion (committed: {:?})",
                self.state.active_waypoint
            );
            self.emit(TourEvent::Interrupted {
                active_waypoint: self.state.active_waypoint,
            });
        }
        interrupted
    }

    /// Fly from wherever the rig is to waypoint 0
    ///
    /// Clears the committed waypoint and replaces any scripted motion.
    pub fn begin_fly_in(&mut self) {
        match self.state.mode {
            TourMode::Idle => {}
            TourMode::ManualTransition => self.abandon_leg(),
            TourMode::AutoTransition => {
                self.teardown();
                self.emit(TourEvent::AutoTourStopped);
            }
        }

        self.state.active_waypoint = None;
        self.state.mode = TourMode::ManualTransition;
        self.fly_in_ended = false;
        self.arm_leg(0, LegKind::FlyIn);
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Advance timers and the in-flight leg, writing the interpolated pose
    /// into `rig`
    ///
    /// Returns `true` if this tick wrote to the rig.
    pub fn tick(&mut self, dt_ms: f32, rig: &mut CameraRig) -> bool {
        for (id, timer) in self.timers.advance(dt_ms) {
            let TourTimer::NextLeg(index) = timer;
            if self.state.pending_auto != Some(id) || self.state.mode != TourMode::AutoTransition {
                continue;
            }
            self.state.pending_auto = None;
            self.arm_leg(index, LegKind::Auto);
        }

        let Some(leg) = self.leg.as_mut() else {
            return false;
        };

        if !leg.started {
            leg.started = true;
            let destination = RigPose::from(&self.waypoints[leg.index]);
            let duration = match leg.kind {
                LegKind::FlyIn => self.config.fly_in_ms,
                LegKind::Manual | LegKind::Auto => self.config.transition_ms,
            };
            self.tween.begin(rig.pose(), destination, duration, self.easing);
        }

        match self.tween.advance(dt_ms) {
            Some(TweenStep::Running(pose)) => {
                rig.apply_pose(&pose);
                true
            }
            Some(TweenStep::Finished(pose)) => {
                rig.apply_pose(&pose);
                self.finish_leg();
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// `active ± delta` modulo the tour length, with no committed waypoint
    /// counting as -1
    fn offset_index(&self, delta: i64) -> usize {
        let len = self.waypoints.len() as i64;
        let current = self.state.active_waypoint.map_or(-1, |index| index as i64);
        (current + delta).rem_euclid(len) as usize
    }

    fn step(&mut self, delta: i64) -> bool {
        if self.state.mode == TourMode::ManualTransition {
            debug!("Manual leg already in flight; ignoring step");
            return false;
        }
        if self.state.mode == TourMode::AutoTransition {
            self.stop_auto_tour();
        }
        let index = self.offset_index(delta);
        self.go_to(index)
    }

    fn arm_leg(&mut self, index: usize, kind: LegKind) {
        self.tween.cancel();
        self.leg = Some(Leg {
            index,
            kind,
            started: false,
        });
        info!("Leg to waypoint {} started ({:?})", index, kind);
        self.emit(TourEvent::LegStarted { index, kind });
    }

    fn finish_leg(&mut self) {
        let Some(leg) = self.leg.take() else {
            return;
        };
        self.state.active_waypoint = Some(leg.index);
        info!("Leg to waypoint {} finished ({:?})", leg.index, leg.kind);
        self.emit(TourEvent::LegFinished {
            index: leg.index,
            kind: leg.kind,
        });

        match leg.kind {
            LegKind::Manual => self.state.mode = TourMode::Idle,
            LegKind::FlyIn => {
                self.state.mode = TourMode::Idle;
                self.fly_in_ended = true;
                self.emit(TourEvent::FlyInFinished { skipped: false });
            }
            LegKind::Auto => {
                if self.state.mode == TourMode::AutoTransition {
                    let next = (leg.index + 1) % self.waypoints.len();
                    let id = self
                        .timers
                        .schedule(self.config.auto_pause_ms, TourTimer::NextLeg(next));
                    self.state.pending_auto = Some(id);
                    debug!(
                        "Next auto leg to {} in {}ms",
                        next, self.config.auto_pause_ms
                    );
                }
            }
        }
    }

    /// Drop a manual leg without committing it
    fn abandon_leg(&mut self) {
        self.tween.cancel();
        if let Some(leg) = self.leg.take() {
            debug!("Abandoned leg to waypoint {}", leg.index);
            if leg.kind == LegKind::FlyIn {
                self.fly_in_ended = true;
                self.emit(TourEvent::FlyInFinished { skipped: true });
            }
        }
        self.state.mode = TourMode::Idle;
    }

    fn emit(&mut self, event: TourEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Tear down the auto tour: pause timer, in-flight leg, mode
    fn teardown(&mut self) {
        if let Some(id) = self.state.pending_auto.take() {
            self.timers.cancel(id);
        }
        self.timers.clear();
        self.abandon_leg();
    }
}
