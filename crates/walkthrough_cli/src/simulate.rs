//! Headless tour simulation
//!
//! Wraps the configured waypoints in a box room, flies in, then runs the
//! auto tour for a fixed number of legs at a fixed frame rate.

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{debug, info};
use walkthrough_camera::prelude::*;
use walkthrough_camera::{LegKind, OverlayPlacement, ReadoutText};

/// Room walls sit this far beyond the outermost waypoint
const ROOM_MARGIN: f32 = 1.5;

/// Give up after this much simulated time
const MAX_SIMULATED_MS: f32 = 10.0 * 60.0 * 1000.0;

pub struct SimulateOptions {
    pub fps: u32,
    pub legs: usize,
    pub json: bool,
}

/// Counts rendered frames and remembers the last one
#[derive(Default)]
struct CountingSink {
    rendered: u64,
    last: Option<CameraRig>,
}

impl FrameSink for CountingSink {
    fn render(&mut self, rig: &CameraRig) {
        self.rendered += 1;
        self.last = Some(*rig);
    }
}

#[derive(Serialize)]
struct Snapshot {
    frames: u64,
    elapsed_ms: f32,
    mode: TourMode,
    active_waypoint: Option<usize>,
    rig: CameraRig,
    readout: ReadoutText,
    overlays: Vec<OverlayPlacement>,
    events: Vec<TourEvent>,
}

/// Box around every waypoint camera and target, floor at zero
fn room_around(config: &WalkthroughConfig) -> BoundingBox {
    let points = config
        .waypoints
        .iter()
        .flat_map(|waypoint| [waypoint.camera, waypoint.target]);
    let bounds = BoundingBox::from_points(points);
    let margin = Vec3::splat(ROOM_MARGIN);
    BoundingBox::new(
        Vec3::new(
            bounds.min.x - margin.x,
            bounds.min.y.min(0.0),
            bounds.min.z - margin.z,
        ),
        bounds.max + margin,
    )
}

pub fn run(config: WalkthroughConfig, options: SimulateOptions) -> Result<()> {
    if options.fps == 0 {
        bail!("--fps must be positive");
    }

    let room = room_around(&config);
    let scene = TriangleMesh::box_room(room)?;
    info!(
        "Room ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2}), {} triangles",
        room.min.x,
        room.min.y,
        room.min.z,
        room.max.x,
        room.max.y,
        room.max.z,
        scene.triangle_count()
    );

    let mut walkthrough = Walkthrough::new(config)?;
    let mut driver = walkthrough.frame_driver();
    let readout = CameraReadout::new();
    let mut readout_rx = readout.subscribe();
    driver.register(Box::new(readout));

    walkthrough.on_model_ready(Box::new(scene), room);

    let dt_ms = 1000.0 / options.fps as f32;
    let mut sink = CountingSink::default();
    let mut history = Vec::new();
    let mut elapsed_ms = 0.0;
    let mut legs_done = 0;

    while legs_done < options.legs {
        if elapsed_ms > MAX_SIMULATED_MS {
            bail!(
                "Tour did not finish {} legs within {:.0} s",
                options.legs,
                MAX_SIMULATED_MS / 1000.0
            );
        }

        driver.frame(&mut walkthrough, dt_ms, &mut sink);
        elapsed_ms += dt_ms;

        for event in walkthrough.take_events() {
            info!("{:>8.0} ms  {:?}", elapsed_ms, event);
            match event {
                TourEvent::FlyInFinished { .. } => {
                    for overlay in walkthrough.overlays() {
                        debug!(
                            "Overlay {} at ({:.2}, {:.2}, {:.2}) yaw {:.3}",
                            overlay.texture,
                            overlay.position.x,
                            overlay.position.y,
                            overlay.position.z,
                            overlay.yaw
                        );
                    }
                    walkthrough.start_auto_tour();
                }
                TourEvent::LegFinished {
                    kind: LegKind::Auto,
                    ..
                } => legs_done += 1,
                _ => {}
            }
            history.push(event);
        }

        // Once per simulated second
        if driver.frame_count() % options.fps as u64 == 0
            && readout_rx.has_changed().unwrap_or(false)
        {
            debug!("{}", *readout_rx.borrow_and_update());
        }
    }

    walkthrough.stop_auto_tour();
    history.extend(walkthrough.take_events());

    info!(
        "Finished {} legs in {} frames ({:.1} s simulated)",
        legs_done,
        sink.rendered,
        elapsed_ms / 1000.0
    );

    if options.json {
        let snapshot = Snapshot {
            frames: driver.frame_count(),
            elapsed_ms,
            mode: walkthrough.mode(),
            active_waypoint: walkthrough.tour().active_waypoint(),
            rig: sink.last.unwrap_or(*walkthrough.rig()),
            readout: ReadoutText::from_rig(walkthrough.rig()),
            overlays: walkthrough.overlays().to_vec(),
            events: history,
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_encloses_every_waypoint() {
        let config = WalkthroughConfig::default();
        let room = room_around(&config);
        for waypoint in &config.waypoints {
            assert!(room.contains_point(waypoint.camera));
            assert!(room.contains_point(waypoint.target));
        }
        assert!(room.min.y <= 0.0);
    }

    #[test]
    fn test_simulation_runs_requested_legs() {
        let options = SimulateOptions {
            fps: 30,
            legs: 2,
            json: false,
        };
        run(WalkthroughConfig::default(), options).unwrap();
    }

    #[test]
    fn test_zero_fps_rejected() {
        let options = SimulateOptions {
            fps: 0,
            legs: 1,
            json: false,
        };
        assert!(run(WalkthroughConfig::default(), options).is_err());
    }
}
