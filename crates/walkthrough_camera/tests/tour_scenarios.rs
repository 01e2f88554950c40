//! Whole-session scenarios driven through the frame pipeline

use walkthrough_camera::prelude::*;
use walkthrough_camera::{LegKind, NullSink, TourController, TourState};
use walkthrough_core::{TourConfig, Waypoint};

const FRAME_MS: f32 = 16.0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("walkthrough_camera=debug")
        .try_init();
}

fn room() -> BoundingBox {
    BoundingBox::new(Vec3::new(-4.0, 0.0, -4.0), Vec3::new(4.0, 3.0, 4.0))
}

fn square_tour() -> Vec<Waypoint> {
    [(-2.0, -2.0), (2.0, -2.0), (2.0, 2.0), (-2.0, 2.0)]
        .iter()
        .map(|&(x, z)| Waypoint::new(Vec3::new(x, 1.6, z), Vec3::new(0.0, 1.4, 0.0)))
        .collect()
}

fn config() -> WalkthroughConfig {
    WalkthroughConfig {
        waypoints: square_tour(),
        ..WalkthroughConfig::default()
    }
}

/// Keeps every rendered rig
#[derive(Default)]
struct Recorder {
    frames: Vec<CameraRig>,
}

impl FrameSink for Recorder {
    fn render(&mut self, rig: &CameraRig) {
        self.frames.push(*rig);
    }
}

fn run(driver: &mut FrameDriver, walkthrough: &mut Walkthrough, ms: f32, sink: &mut dyn FrameSink) {
    let mut elapsed = 0.0;
    while elapsed < ms {
        driver.frame(walkthrough, FRAME_MS, sink);
        elapsed += FRAME_MS;
    }
}

#[test]
fn test_fly_in_then_auto_tour_advances_one_waypoint_per_leg() {
    init_tracing();
    let mut walkthrough = Walkthrough::new(config()).unwrap();
    let mut driver = walkthrough.frame_driver();
    let mut sink = Recorder::default();

    walkthrough.on_model_ready(Box::new(TriangleMesh::box_room(room()).unwrap()), room());
    let fly_in = walkthrough.config().tour.fly_in_ms as f32;
    run(&mut driver, &mut walkthrough, fly_in + FRAME_MS, &mut sink);
    assert_eq!(walkthrough.tour().active_waypoint(), Some(0));
    assert_eq!(walkthrough.mode(), TourMode::Idle);

    let tour = walkthrough.config().tour.clone();
    let leg = tour.transition_ms as f32;
    let pause = tour.auto_pause_ms as f32;

    assert!(walkthrough.start_auto_tour());
    run(&mut driver, &mut walkthrough, leg + FRAME_MS, &mut sink);
    assert_eq!(walkthrough.tour().active_waypoint(), Some(1));
    assert!(walkthrough.tour().state().pending_auto.is_some());

    run(&mut driver, &mut walkthrough, pause + FRAME_MS, &mut sink);
    assert_eq!(
        walkthrough.tour().current_leg(),
        Some((2, LegKind::Auto))
    );

    // Stop mid-leg: nothing moves afterwards
    run(&mut driver, &mut walkthrough, leg / 2.0, &mut sink);
    assert!(walkthrough.stop_auto_tour());
    assert_eq!(walkthrough.tour().state().pending_auto, None);
    assert_eq!(walkthrough.tour().active_waypoint(), Some(1));

    let frozen = *walkthrough.rig();
    sink.frames.clear();
    run(&mut driver, &mut walkthrough, leg + pause, &mut sink);
    assert!(sink.frames.iter().all(|rig| *rig == frozen));
    assert_eq!(walkthrough.tour().active_waypoint(), Some(1));

    let events = walkthrough.take_events();
    assert!(events.contains(&TourEvent::AutoTourStopped));
    let json = serde_json::to_string(&events).unwrap();
    assert!(json.contains("\"event\":\"auto_tour_stopped\""));
}

#[test]
fn test_walking_into_a_wall_stops_short_of_it() {
    init_tracing();
    let mut config = config();
    config.bounds.clamp_target = false;
    let mut walkthrough = Walkthrough::new(config).unwrap();
    let mut driver = walkthrough.frame_driver();

    walkthrough.on_model_ready(Box::new(TriangleMesh::box_room(room()).unwrap()), room());
    walkthrough.pointer_down(PointerButton::Primary, Vec2::ZERO);
    walkthrough.pointer_up();
    assert_eq!(walkthrough.mode(), TourMode::Idle);

    *walkthrough.rig_mut() = CameraRig::new(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1.6, -1.0));
    walkthrough.key_down("KeyW", Focus::Viewport);
    run(&mut driver, &mut walkthrough, 5000.0, &mut NullSink);

    let z = walkthrough.rig().position.z;
    assert!(z > -4.0, "camera went through the wall: z = {}", z);
    assert!(z < -3.9, "camera stopped too early: z = {}", z);
}

/// Tiny deterministic generator so failures reproduce
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

fn assert_consistent(tour: &TourController) {
    let TourState {
        mode,
        pending_auto,
        ..
    } = *tour.state();
    let leg = tour.current_leg();
    match mode {
        TourMode::Idle => {
            assert!(leg.is_none(), "idle with a leg in flight");
            assert!(pending_auto.is_none(), "idle with a pending auto leg");
        }
        TourMode::ManualTransition => {
            assert!(matches!(leg, Some((_, LegKind::Manual | LegKind::FlyIn))));
            assert!(pending_auto.is_none());
        }
        TourMode::AutoTransition => {
            // Either mid-leg or pausing, never both
            match leg {
                Some((_, kind)) => {
                    assert_eq!(kind, LegKind::Auto);
                    assert!(pending_auto.is_none(), "auto leg and pause timer at once");
                }
                None => assert!(pending_auto.is_some(), "touring with nothing scheduled"),
            }
        }
    }
}

#[test]
fn test_random_commands_never_superpose_motion_sources() {
    for seed in 1..=20u64 {
        let mut rng = XorShift(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let tour_config = TourConfig {
            transition_ms: 300,
            fly_in_ms: 400,
            auto_pause_ms: 120,
            ..TourConfig::default()
        };
        let mut walkthrough = Walkthrough::new(WalkthroughConfig {
            tour: tour_config,
            ..config()
        })
        .unwrap();
        let mut driver = walkthrough.frame_driver();
        walkthrough.on_model_ready(Box::new(TriangleMesh::box_room(room()).unwrap()), room());

        for _ in 0..400 {
            match rng.next() % 10 {
                0 => {
                    walkthrough.go_to_next();
                }
                1 => {
                    walkthrough.go_to_prev();
                }
                2 => {
                    walkthrough.start_auto_tour();
                }
                3 => {
                    walkthrough.stop_auto_tour();
                }
                4 => walkthrough.pointer_down(PointerButton::Primary, Vec2::ZERO),
                5 => {
                    walkthrough.key_down("KeyW", Focus::Viewport);
                }
                6 => walkthrough.wheel(1.0),
                _ => {}
            }
            assert_consistent(walkthrough.tour());

            let mode_before = walkthrough.mode();
            let before = *walkthrough.rig();
            let report = driver.frame(&mut walkthrough, FRAME_MS, &mut NullSink);
            assert_consistent(walkthrough.tour());

            // User-driven writers only run while idle
            if report.orbited || report.clamped {
                assert_eq!(walkthrough.mode(), TourMode::Idle);
            }
            if walkthrough.mode() != TourMode::Idle {
                assert!(!walkthrough.input().any_held());
            }
            if mode_before == TourMode::Idle && walkthrough.mode() == TourMode::Idle && !report.scripted {
                // Nothing scripted ran, so only user input could have moved the rig
                let moved = *walkthrough.rig() != before;
                assert!(!moved || report.orbited || report.clamped || walkthrough.input().any_held());
            }

            walkthrough.take_events();
        }
    }
}
