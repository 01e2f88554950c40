//! On-screen camera coordinates

use crate::driver::{FrameContext, Tickable};
use crate::rig::CameraRig;
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;
use walkthrough_core::Vec3;

/// Formatted camera position and target
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReadoutText {
    /// `Pos: (x, y, z)`
    pub position: String,
    /// `Tgt: (x, y, z)`
    pub target: String,
}

impl ReadoutText {
    pub fn from_rig(rig: &CameraRig) -> Self {
        Self {
            position: format!("Pos: {}", Coords(rig.position)),
            target: format!("Tgt: {}", Coords(rig.target)),
        }
    }
}

impl fmt::Display for ReadoutText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.position, self.target)
    }
}

struct Coords(Vec3);

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.0.x, self.0.y, self.0.z)
    }
}

/// Tickable publishing the rig as text every frame
///
/// Subscribers are only woken when the text actually changes.
#[derive(Debug)]
pub struct CameraReadout {
    tx: watch::Sender<ReadoutText>,
}

impl Default for CameraReadout {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraReadout {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReadoutText::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ReadoutText> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ReadoutText {
        self.tx.borrow().clone()
    }
}

impl Tickable for CameraReadout {
    fn name(&self) -> &str {
        "camera-readout"
    }

    fn tick(&mut self, frame: &mut FrameContext<'_>) {
        let text = ReadoutText::from_rig(frame.rig);
        self.tx.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
    }
}
