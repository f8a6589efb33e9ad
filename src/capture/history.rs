//! Bounded sample history.
//!
//! Capture sessions publish one level per sampling tick; these buffers keep
//! the most recent window of them. [`HistoryBuffer`] backs the live scrolling
//! view, [`RecordingHistory`] additionally stamps each level with the elapsed
//! time since capture started so a finished recording can be scrubbed and
//! exported. Both evict from the front once full; the newest sample always
//! survives.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Ring buffer of the most recent capture levels, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Creates a buffer holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, clamped to `[0, 1]`, evicting the oldest when full.
    pub fn push(&mut self, value: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value.clamp(0.0, 1.0));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    /// Read-only copy of the contents in append order.
    pub fn snapshot(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }
}

/// One recorded level with its offset from the start of the recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    /// Seconds since capture activation.
    pub elapsed: f32,
    /// Normalized level in `[0, 1]`.
    pub value: f32,
}

/// Ring buffer of time-stamped recording levels, oldest first.
#[derive(Debug, Clone)]
pub struct RecordingHistory {
    samples: VecDeque<TimedSample>,
    capacity: usize,
}

impl RecordingHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a level stamped with `elapsed` since the recording started.
    pub fn push(&mut self, value: f32, elapsed: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(TimedSample {
            elapsed: elapsed.as_secs_f32(),
            value: value.clamp(0.0, 1.0),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Elapsed stamp of the newest sample, in seconds. Zero when empty.
    pub fn duration(&self) -> f32 {
        self.samples.back().map_or(0.0, |s| s.elapsed)
    }

    /// Levels only, in append order, for drawing.
    pub fn values(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Read-only copy of the contents in append order.
    pub fn snapshot(&self) -> Vec<TimedSample> {
        self.samples.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
