//! Scheduled-work primitives for the cooperative host loop.
//!
//! The engine never blocks and never spawns threads for pacing. Anything that
//! would be a timer callback elsewhere is modeled as a [`Task`] (frame-paced
//! or interval-paced) or a [`Throttle`] (trailing-edge coalescing) that the
//! host loop polls with the current instant. Cancellation is synchronous and
//! final; [`Generation`] stamps let owners reject work that completes after a
//! teardown already happened.

use std::time::{Duration, Instant};

/// How often a [`Task`] wants to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// On every host-loop poll.
    Frame,
    /// At most once per interval.
    Every(Duration),
}

/// A cancellable scheduled continuation.
///
/// The host loop calls [`Task::poll`] once per frame; a `true` return means
/// the owner's work is due now. Interval tasks fire immediately on their first
/// poll and reschedule from the poll instant, so a stalled host catches up
/// with a single tick rather than a burst.
#[derive(Debug)]
pub struct Task {
    cadence: Cadence,
    next: Option<Instant>,
}

impl Task {
    pub fn new(cadence: Cadence, now: Instant) -> Self {
        Self {
            cadence,
            next: Some(now),
        }
    }

    /// Returns true when the task is due at `now`, advancing the schedule.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next else {
            return false;
        };
        match self.cadence {
            Cadence::Frame => true,
            Cadence::Every(interval) => {
                if now < due {
                    false
                } else {
                    self.next = Some(now + interval);
                    true
                }
            }
        }
    }

    /// Stops the task permanently. Polling a cancelled task returns false.
    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.next.is_none()
    }

    /// Next instant the task wants to run, for host sleep pacing. `None` when
    /// cancelled; frame tasks report their creation instant (always due).
    pub fn deadline(&self) -> Option<Instant> {
        self.next
    }
}

/// Trailing-edge coalescer: many notifications, one firing.
///
/// Each [`Throttle::notify`] pushes the deadline `delay` past that instant, so
/// the owner's work runs once things have been quiet for the delay. Used to
/// keep resize redraws to roughly one per 16 ms burst.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Records an event, (re)arming the deadline at `now + delay`.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns true once per armed deadline, the first poll at or after it.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Opaque generation stamp handed out by [`Generation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp(u64);

/// Monotonic generation counter guarding against resurrection.
///
/// Owners stamp work when they start it and bump the generation on teardown;
/// anything that completes carrying an old stamp is stale and must be
/// discarded, never adopted.
#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn stamp(&self) -> Stamp {
        Stamp(self.current)
    }

    /// Invalidates all previously issued stamps and returns the new one.
    pub fn bump(&mut self) -> Stamp {
        self.current += 1;
        Stamp(self.current)
    }

    pub fn is_current(&self, stamp: Stamp) -> bool {
        stamp.0 == self.current
    }
}
