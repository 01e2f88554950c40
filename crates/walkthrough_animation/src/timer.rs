//! Cancelable delay timers
//!
//! Timers are advanced with the same frame delta as tweens, so a pause
//! between scripted legs is a timer entry rather than a blocking wait.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::trace;

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

#[derive(Clone, Debug)]
struct Timer<E> {
    remaining_ms: f32,
    payload: E,
}

/// A set of one-shot timers, each carrying a payload delivered when it fires
#[derive(Clone, Debug)]
pub struct TimerQueue<E> {
    timers: SlotMap<TimerId, Timer<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
        }
    }

    /// Schedule `payload` to fire after `delay_ms`
    pub fn schedule(&mut self, delay_ms: u32, payload: E) -> TimerId {
        let id = self.timers.insert(Timer {
            remaining_ms: delay_ms as f32,
            payload,
        });
        trace!("Scheduled timer {:?} in {}ms", id, delay_ms);
        id
    }

    /// Cancel a timer
    ///
    /// Returns `true` if the timer was pending. Cancelling twice, or after
    /// the timer fired, is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Cancel every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Advance all timers and remove the ones that expired
    ///
    /// Fired timers are returned earliest deadline first.
    pub fn advance(&mut self, dt_ms: f32) -> SmallVec<[(TimerId, E); 2]> {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        let mut expired: SmallVec<[(TimerId, f32); 2]> = SmallVec::new();
        for (id, timer) in self.timers.iter_mut() {
            timer.remaining_ms -= dt_ms;
            if timer.remaining_ms <= 0.0 {
                expired.push((id, timer.remaining_ms));
            }
        }
        expired.sort_by(|a, b| a.1.total_cmp(&b.1));

        expired
            .into_iter()
            .filter_map(|(id, _)| self.timers.remove(id).map(|timer| (id, timer.payload)))
            .collect()
    }
}
