//! Continuous scroll animation over a cyclic sample buffer.
//!
//! The animator owns its sample buffer, a pixel offset, and a frame task. The
//! host loop polls it once per frame; when a frame is due the offset advances
//! by `speed * elapsed` and wraps modulo the cycle width (one full pass over
//! the buffer), so the scroll is seamless regardless of frame timing. A zero
//! speed renders a single frame and schedules nothing.

use std::time::{Duration, Instant};

use super::bars::{draw_bars_scrolled, BarStyle};
use super::color::Theme;
use super::pattern::PatternGenerator;
use super::surface::Framebuffer;
use crate::sched::{Cadence, Task};

/// Default probability, per animated frame, of refreshing one sample slot.
pub const DEFAULT_JITTER: f32 = 0.1;

/// Scrolling bar animation with optional placeholder liveliness.
pub struct ScrollAnimator {
    style: BarStyle,
    samples: Vec<f32>,
    /// Scroll speed in logical pixels per second. Negative scrolls right.
    speed: f32,
    jitter: f32,
    pattern: PatternGenerator,
    /// Jitter only ever touches generated placeholder data, never samples a
    /// caller handed in.
    synthetic: bool,
    offset: f32,
    task: Task,
    last_poll: Option<Instant>,
}

impl ScrollAnimator {
    /// Creates an animator with an empty buffer. Seed the buffer with
    /// [`with_placeholder`](Self::with_placeholder) or
    /// [`set_samples`](Self::set_samples) before drawing.
    pub fn new(style: BarStyle, speed: f32, now: Instant) -> Self {
        Self {
            style,
            samples: Vec::new(),
            speed,
            jitter: DEFAULT_JITTER,
            pattern: PatternGenerator::new(0),
            synthetic: false,
            offset: 0.0,
            task: Task::new(Cadence::Frame, now),
            last_poll: None,
        }
    }

    /// Fills the buffer with `bars` seeded placeholder amplitudes and enables
    /// jitter for them.
    pub fn with_placeholder(mut self, bars: usize, seed: u64) -> Self {
        self.pattern = PatternGenerator::new(seed);
        self.samples = vec![0.0; bars];
        self.pattern.fill(&mut self.samples);
        self.synthetic = true;
        self
    }

    /// Replaces the buffer with caller-owned data. Jitter is disabled: real
    /// samples are displayed exactly as given.
    pub fn set_samples(&mut self, samples: Vec<f32>) {
        self.samples = samples;
        self.synthetic = false;
    }

    /// Sets the per-frame slot-refresh probability, clamped to `[0, 1]`.
    pub fn set_jitter(&mut self, probability: f32) {
        self.jitter = probability.clamp(0.0, 1.0);
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Width in logical pixels of one full pass over the buffer.
    pub fn cycle_width(&self) -> f32 {
        self.style.cell() * self.samples.len() as f32
    }

    /// Advances the animation if a frame is due. Returns true when the caller
    /// should redraw.
    ///
    /// The first due frame establishes the clock baseline and draws at the
    /// current offset; with zero speed it is also the last, and the frame task
    /// is cancelled rather than left spinning.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.task.poll(now) {
            return false;
        }
        let elapsed = match self.last_poll {
            Some(last) => now.duration_since(last),
            None => Duration::ZERO,
        };
        self.last_poll = Some(now);
        self.advance(elapsed);
        if self.speed == 0.0 {
            self.task.cancel();
        }
        true
    }

    fn advance(&mut self, elapsed: Duration) {
        if self.synthetic && !self.samples.is_empty() && self.pattern.chance(self.jitter) {
            let slot = self.pattern.next_index(self.samples.len());
            self.samples[slot] = self.pattern.next_amplitude();
        }
        let cycle = self.cycle_width();
        if cycle > 0.0 {
            self.offset = (self.offset + self.speed * elapsed.as_secs_f32()).rem_euclid(cycle);
        }
    }

    /// Draws the current window into the buffer at the current offset.
    pub fn draw(&self, fb: &mut Framebuffer, theme: Option<&dyn Theme>) {
        draw_bars_scrolled(fb, &self.samples, &self.style, theme, self.offset);
    }

    /// Cancels the frame task. Subsequent polls return false.
    pub fn stop(&mut self) {
        self.task.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> BarStyle {
        // Cell width 6.
        BarStyle::new(4.0, 2.0).with_fade(false, 0.0)
    }

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn offset_advances_by_speed_times_elapsed() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::new(style(), 10.0, t0).with_placeholder(8, 42);
        animator.set_jitter(0.0);
        assert!(animator.poll(t0));
        approx(animator.offset(), 0.0);
        assert!(animator.poll(t0 + Duration::from_millis(500)));
        approx(animator.offset(), 5.0);
    }

    #[test]
    fn offset_wraps_modulo_cycle_width() {
        let t0 = Instant::now();
        // 3 samples at cell 6: cycle width 18.
        let mut animator = ScrollAnimator::new(style(), 10.0, t0).with_placeholder(3, 42);
        animator.set_jitter(0.0);
        animator.poll(t0);
        animator.poll(t0 + Duration::from_secs(2));
        approx(animator.offset(), 2.0);
        assert_eq!(animator.cycle_width(), 18.0);
    }

    #[test]
    fn late_frame_is_one_large_step_not_a_burst() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::new(style(), 4.0, t0).with_placeholder(100, 1);
        animator.set_jitter(0.0);
        animator.poll(t0);
        // A 3-second stall advances the offset once, by the full delta.
        animator.poll(t0 + Duration::from_secs(3));
        approx(animator.offset(), 12.0);
    }

    #[test]
    fn zero_speed_renders_once_and_stops() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::new(style(), 0.0, t0).with_placeholder(8, 42);
        assert!(animator.poll(t0));
        assert!(animator.is_stopped());
        assert!(!animator.poll(t0 + Duration::from_secs(1)));
        approx(animator.offset(), 0.0);
    }

    #[test]
    fn stop_cancels_future_frames() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::new(style(), 10.0, t0).with_placeholder(8, 42);
        assert!(animator.poll(t0));
        animator.stop();
        assert!(!animator.poll(t0 + Duration::from_millis(16)));
    }

    #[test]
    fn seeded_animators_replay_identically() {
        let t0 = Instant::now();
        let mut a = ScrollAnimator::new(style(), 25.0, t0).with_placeholder(40, 7);
        let mut b = ScrollAnimator::new(style(), 25.0, t0).with_placeholder(40, 7);
        for frame in 1..120u32 {
            let now = t0 + Duration::from_millis(16) * frame;
            a.poll(now);
            b.poll(now);
        }
        assert_eq!(a.samples(), b.samples());
        approx(a.offset(), b.offset());
    }

    #[test]
    fn caller_samples_are_never_jittered() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::new(style(), 10.0, t0);
        animator.set_samples(vec![0.1, 0.9, 0.4]);
        animator.set_jitter(1.0);
        for frame in 0..50u32 {
            animator.poll(t0 + Duration::from_millis(16) * frame);
        }
        assert_eq!(animator.samples(), &[0.1, 0.9, 0.4]);
    }

    #[test]
    fn jitter_refreshes_at_most_one_slot_per_frame() {
        let t0 = Instant::now();
        let mut animator = ScrollAnimator::new(style(), 10.0, t0).with_placeholder(16, 3);
        animator.set_jitter(1.0);
        animator.poll(t0);
        let before = animator.samples().to_vec();
        animator.poll(t0 + Duration::from_millis(16));
        let after = animator.samples();
        let changed = before
            .iter()
            .zip(after)
            .filter(|(old, new)| old != new)
            .count();
        assert!(changed <= 1);
        assert!(after.iter().all(|&v| (0.2..1.0).contains(&v)));
    }
}
