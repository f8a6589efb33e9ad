//! Capture session lifecycle and sampling.
//!
//! A [`CaptureSession`] owns exactly one audio input resource while active and
//! guarantees its release on every exit path: deactivation, acquisition
//! failure, mid-session input death, and acquisition completing after the
//! session was already torn down. Release is ownership-based (dropping the
//! boxed input releases the device), so there is no path that leaks a live
//! stream.
//!
//! Lifecycle: `Inactive → Acquiring → Active → Released`, with error exits
//! landing in `Released` alongside a [`CaptureEvent::Error`]. `Released`
//! re-activates the same way `Inactive` does.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::Result;

use super::analysis::{average_level, normalized_bins, FrequencyAnalyzer};
use super::history::{HistoryBuffer, RecordingHistory, TimedSample};
use crate::sched::{Cadence, Generation, Stamp, Task};

/// Live audio input resource. Dropping it releases the underlying device.
pub trait AudioInput {
    /// Moves the samples accumulated since the last call into `out`.
    ///
    /// # Errors
    /// Returns an error once the input has died (device unplugged, stream
    /// failure); the session treats that as a terminal teardown.
    fn drain(&mut self, out: &mut Vec<f32>) -> Result<()>;
}

/// Provider of audio input resources.
pub trait AudioInputHost {
    /// Begins acquiring an input resource.
    ///
    /// # Errors
    /// Returns an error when acquisition is denied outright; the session
    /// reports it as a [`CaptureEvent::Error`] and releases its state.
    fn acquire(&mut self) -> Result<AcquireOutcome>;
}

/// Result of [`AudioInputHost::acquire`].
pub enum AcquireOutcome {
    /// The resource is live now.
    Ready(Box<dyn AudioInput>),
    /// The host acquires asynchronously and will call
    /// [`CaptureSession::deliver_input`] with the stamp activation returned.
    Pending,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Inactive,
    Acquiring,
    Active,
    Released,
}

/// What the session does with each sampling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Publish the normalized per-bin spectrum every frame (live meter).
    Meter,
    /// Append the averaged level to a bounded history (scrolling view).
    Level,
    /// Append time-stamped levels and emit
    /// [`CaptureEvent::RecordingComplete`] when the session ends.
    Recording,
}

/// Events a session emits; drained by the host via
/// [`CaptureSession::take_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// A recording session left `Active` with at least one sample. Emitted at
    /// most once per activation.
    RecordingComplete(Vec<TimedSample>),
    /// Acquisition was denied or the input died mid-session.
    Error(String),
}

/// Sampling and analysis knobs.
#[derive(Debug, Clone, Copy)]
pub struct CaptureTunables {
    pub fft_size: usize,
    pub smoothing: f32,
    pub sensitivity: f32,
    /// Tick spacing for `Level` and `Recording` modes; `Meter` is
    /// frame-paced.
    pub update_interval: Duration,
    pub history_size: usize,
}

impl Default for CaptureTunables {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            sensitivity: 1.0,
            update_interval: Duration::from_millis(50),
            history_size: 150,
        }
    }
}

/// State machine owning the input resource and the analysis pipeline.
pub struct CaptureSession {
    mode: CaptureMode,
    tunables: CaptureTunables,
    phase: CapturePhase,
    generation: Generation,
    analyzer: FrequencyAnalyzer,
    input: Option<Box<dyn AudioInput>>,
    task: Option<Task>,
    started_at: Option<Instant>,
    /// Level history for the scrolling view; survives deactivation.
    history: HistoryBuffer,
    /// Time-stamped history for recordings; reset on each activation.
    recording: RecordingHistory,
    bins: Vec<f32>,
    level: f32,
    events: VecDeque<CaptureEvent>,
    scratch: Vec<f32>,
}

impl CaptureSession {
    pub fn new(mode: CaptureMode, tunables: CaptureTunables) -> Self {
        Self {
            mode,
            tunables,
            phase: CapturePhase::Inactive,
            generation: Generation::default(),
            analyzer: FrequencyAnalyzer::new(tunables.fft_size, tunables.smoothing),
            input: None,
            task: None,
            started_at: None,
            history: HistoryBuffer::new(tunables.history_size),
            recording: RecordingHistory::new(tunables.history_size),
            bins: Vec::new(),
            level: 0.0,
            events: VecDeque::new(),
            scratch: Vec::new(),
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == CapturePhase::Active
    }

    /// Latest normalized per-bin spectrum. Empty until the first tick and
    /// after teardown.
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// Latest averaged level in `[0, 1]`.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn recording(&self) -> &RecordingHistory {
        &self.recording
    }

    pub fn take_event(&mut self) -> Option<CaptureEvent> {
        self.events.pop_front()
    }

    /// Requests an input resource and starts the lifecycle.
    ///
    /// No-op while already acquiring or active. Returns the generation stamp
    /// an asynchronous host must pass back to
    /// [`deliver_input`](Self::deliver_input).
    pub fn activate(&mut self, host: &mut dyn AudioInputHost, now: Instant) -> Stamp {
        if matches!(self.phase, CapturePhase::Acquiring | CapturePhase::Active) {
            return self.generation.stamp();
        }
        let stamp = self.generation.bump();
        self.phase = CapturePhase::Acquiring;
        tracing::debug!("capture: acquiring audio input");
        match host.acquire() {
            Ok(AcquireOutcome::Ready(input)) => self.adopt(input, now),
            Ok(AcquireOutcome::Pending) => {}
            Err(e) => self.fail(format!("audio input acquisition failed: {e:#}")),
        }
        stamp
    }

    /// Completes an asynchronous acquisition.
    ///
    /// A stamp from a previous generation, or an arrival when the session is
    /// no longer acquiring, means teardown already happened: the resource is
    /// dropped on the spot instead of being adopted.
    pub fn deliver_input(
        &mut self,
        stamp: Stamp,
        result: Result<Box<dyn AudioInput>>,
        now: Instant,
    ) {
        if !self.generation.is_current(stamp) || self.phase != CapturePhase::Acquiring {
            tracing::debug!("capture: discarding stale acquisition result");
            return;
        }
        match result {
            Ok(input) => self.adopt(input, now),
            Err(e) => self.fail(format!("audio input acquisition failed: {e:#}")),
        }
    }

    /// Stops sampling and releases the input resource.
    pub fn deactivate(&mut self) {
        match self.phase {
            CapturePhase::Inactive | CapturePhase::Released => {}
            CapturePhase::Acquiring => {
                // Still waiting on the host; the stamp goes stale so a late
                // delivery is discarded.
                self.generation.bump();
                self.teardown();
                tracing::debug!("capture: deactivated while acquiring");
            }
            CapturePhase::Active => {
                self.generation.bump();
                self.finish_recording();
                self.teardown();
                tracing::info!("capture: audio input released");
            }
        }
    }

    /// Pulls one sampling tick if due. Returns true when new data was
    /// published (or the session just died) and the caller should redraw.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.phase != CapturePhase::Active {
            return false;
        }
        let Some(task) = self.task.as_mut() else {
            return false;
        };
        if !task.poll(now) {
            return false;
        }

        let drained = match self.input.as_mut() {
            Some(input) => {
                self.scratch.clear();
                input.drain(&mut self.scratch)
            }
            None => return false,
        };
        if let Err(e) = drained {
            self.fail(format!("audio input lost: {e:#}"));
            return true;
        }

        self.analyzer.process(&self.scratch);
        normalized_bins(
            self.analyzer.byte_bins(),
            self.tunables.sensitivity,
            &mut self.bins,
        );
        self.level = average_level(self.analyzer.byte_bins(), self.tunables.sensitivity);

        match self.mode {
            CaptureMode::Meter => {}
            CaptureMode::Level => self.history.push(self.level),
            CaptureMode::Recording => {
                let elapsed = self
                    .started_at
                    .map_or(Duration::ZERO, |t| now.duration_since(t));
                self.recording.push(self.level, elapsed);
            }
        }
        true
    }

    fn adopt(&mut self, input: Box<dyn AudioInput>, now: Instant) {
        self.analyzer.reset();
        self.bins.clear();
        self.level = 0.0;
        if self.mode == CaptureMode::Recording {
            self.recording.clear();
        }
        let cadence = match self.mode {
            CaptureMode::Meter => Cadence::Frame,
            CaptureMode::Level | CaptureMode::Recording => {
                Cadence::Every(self.tunables.update_interval)
            }
        };
        self.input = Some(input);
        self.task = Some(Task::new(cadence, now));
        self.started_at = Some(now);
        self.phase = CapturePhase::Active;
        tracing::info!("capture: audio input active");
    }

    fn fail(&mut self, message: String) {
        tracing::warn!("capture: {message}");
        if self.phase == CapturePhase::Active {
            self.generation.bump();
            self.finish_recording();
        }
        self.teardown();
        self.events.push_back(CaptureEvent::Error(message));
    }

    fn finish_recording(&mut self) {
        if self.mode == CaptureMode::Recording && !self.recording.is_empty() {
            self.events
                .push_back(CaptureEvent::RecordingComplete(self.recording.snapshot()));
        }
    }

    /// Single teardown path: cancel the task, drop the input (which releases
    /// the device), clear the published data.
    fn teardown(&mut self) {
        if let Some(task) = self.task.as_mut() {
            task.cancel();
        }
        self.task = None;
        self.input = None;
        self.started_at = None;
        self.bins.clear();
        self.level = 0.0;
        self.phase = CapturePhase::Released;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted input: replays `signal` on every drain, optionally dying
    /// after a number of drains, counting its own release via Drop.
    struct TestInput {
        signal: Vec<f32>,
        fail_after: Option<usize>,
        drains: usize,
        releases: Arc<AtomicUsize>,
    }

    impl TestInput {
        fn new(signal: Vec<f32>, releases: Arc<AtomicUsize>) -> Self {
            Self {
                signal,
                fail_after: None,
                drains: 0,
                releases,
            }
        }
    }

    impl AudioInput for TestInput {
        fn drain(&mut self, out: &mut Vec<f32>) -> Result<()> {
            self.drains += 1;
            if matches!(self.fail_after, Some(n) if self.drains > n) {
                return Err(anyhow::anyhow!("stream died"));
            }
            out.extend_from_slice(&self.signal);
            Ok(())
        }
    }

    impl Drop for TestInput {
        fn drop(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    enum Script {
        Ready,
        ReadyFailingAfter(usize),
        Pending,
        Deny,
    }

    struct TestHost {
        script: VecDeque<Script>,
        releases: Arc<AtomicUsize>,
        acquires: usize,
    }

    impl TestHost {
        fn new(script: Vec<Script>) -> Self {
            Self {
                script: script.into(),
                releases: Arc::new(AtomicUsize::new(0)),
                acquires: 0,
            }
        }

        fn releases(&self) -> usize {
            self.releases.load(Ordering::SeqCst)
        }

        fn input(&self) -> Box<dyn AudioInput> {
            Box::new(TestInput::new(tone(), self.releases.clone()))
        }
    }

    impl AudioInputHost for TestHost {
        fn acquire(&mut self) -> Result<AcquireOutcome> {
            self.acquires += 1;
            match self.script.pop_front().unwrap_or(Script::Ready) {
                Script::Ready => Ok(AcquireOutcome::Ready(self.input())),
                Script::ReadyFailingAfter(n) => {
                    let mut input = TestInput::new(tone(), self.releases.clone());
                    input.fail_after = Some(n);
                    Ok(AcquireOutcome::Ready(Box::new(input)))
                }
                Script::Pending => Ok(AcquireOutcome::Pending),
                Script::Deny => Err(anyhow::anyhow!("device busy")),
            }
        }
    }

    fn tone() -> Vec<f32> {
        (0..256)
            .map(|i| (2.0 * std::f32::consts::PI * 8.0 * i as f32 / 256.0).sin())
            .collect()
    }

    fn level_session() -> CaptureSession {
        CaptureSession::new(CaptureMode::Level, CaptureTunables::default())
    }

    #[test]
    fn activation_reaches_active_and_samples_flow() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![Script::Ready]);
        let mut session = level_session();

        session.activate(&mut host, t0);
        assert_eq!(session.phase(), CapturePhase::Active);

        assert!(session.poll(t0));
        assert_eq!(session.history().len(), 1);
        assert!(session.level() > 0.0);

        // Next tick only after the update interval.
        assert!(!session.poll(t0 + Duration::from_millis(20)));
        assert!(session.poll(t0 + Duration::from_millis(50)));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn exactly_one_release_per_acquire_across_cycles() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![]);
        let mut session = level_session();

        for cycle in 1..=3 {
            session.activate(&mut host, t0);
            session.poll(t0);
            session.deactivate();
            assert_eq!(session.phase(), CapturePhase::Released);
            assert_eq!(host.releases(), cycle, "after cycle {cycle}");
        }
        drop(session);
        assert_eq!(host.releases(), 3);
    }

    #[test]
    fn denied_acquisition_reports_one_error_and_retries_cleanly() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![Script::Deny, Script::Ready]);
        let mut session = level_session();

        session.activate(&mut host, t0);
        assert_eq!(session.phase(), CapturePhase::Released);
        assert!(matches!(session.take_event(), Some(CaptureEvent::Error(_))));
        assert!(session.take_event().is_none());

        session.activate(&mut host, t0);
        assert_eq!(session.phase(), CapturePhase::Active);
        assert!(session.take_event().is_none());
    }

    #[test]
    fn late_acquisition_after_teardown_is_dropped() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![Script::Pending]);
        let mut session = level_session();

        let stamp = session.activate(&mut host, t0);
        assert_eq!(session.phase(), CapturePhase::Acquiring);
        session.deactivate();
        assert_eq!(session.phase(), CapturePhase::Released);

        // The resource arrives after teardown and must be released on the
        // spot, not adopted.
        session.deliver_input(stamp, Ok(host.input()), t0);
        assert_eq!(host.releases(), 1);
        assert_eq!(session.phase(), CapturePhase::Released);
        assert!(session.take_event().is_none());
    }

    #[test]
    fn pending_delivery_with_current_stamp_activates() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![Script::Pending]);
        let mut session = level_session();

        let stamp = session.activate(&mut host, t0);
        session.deliver_input(stamp, Ok(host.input()), t0);
        assert_eq!(session.phase(), CapturePhase::Active);
        assert!(session.poll(t0));
    }

    #[test]
    fn no_samples_after_deactivate() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![]);
        let mut session = level_session();

        session.activate(&mut host, t0);
        session.poll(t0);
        session.deactivate();

        assert!(!session.poll(t0 + Duration::from_secs(1)));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.level(), 0.0);
    }

    #[test]
    fn history_survives_deactivation_for_reuse() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![]);
        let mut session = level_session();

        session.activate(&mut host, t0);
        session.poll(t0);
        let kept = session.history().snapshot();
        session.deactivate();
        assert_eq!(session.history().snapshot(), kept);
    }

    #[test]
    fn input_death_tears_down_with_an_error() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![Script::ReadyFailingAfter(1)]);
        let mut session = CaptureSession::new(CaptureMode::Meter, CaptureTunables::default());

        session.activate(&mut host, t0);
        assert!(session.poll(t0));
        assert!(!session.bins().is_empty());

        // Second drain fails; the session dies, releases, and goes inert.
        assert!(session.poll(t0 + Duration::from_millis(16)));
        assert_eq!(session.phase(), CapturePhase::Released);
        assert_eq!(host.releases(), 1);
        assert!(matches!(session.take_event(), Some(CaptureEvent::Error(_))));
        assert!(session.bins().is_empty());
        assert!(!session.poll(t0 + Duration::from_millis(32)));
    }

    #[test]
    fn meter_mode_publishes_normalized_bins_every_frame() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![]);
        let mut session = CaptureSession::new(CaptureMode::Meter, CaptureTunables::default());

        session.activate(&mut host, t0);
        assert!(session.poll(t0));
        assert_eq!(session.bins().len(), 128);
        assert!(session.bins().iter().any(|&v| v > 0.0));
        assert!(session.bins().iter().all(|&v| (0.0..=1.0).contains(&v)));
        // Frame cadence: the very next poll ticks again.
        assert!(session.poll(t0 + Duration::from_millis(1)));
    }

    #[test]
    fn recording_completes_once_with_stamped_snapshot() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![]);
        let mut session = CaptureSession::new(CaptureMode::Recording, CaptureTunables::default());

        session.activate(&mut host, t0);
        session.poll(t0);
        session.poll(t0 + Duration::from_millis(50));
        session.deactivate();

        match session.take_event() {
            Some(CaptureEvent::RecordingComplete(samples)) => {
                assert_eq!(samples.len(), 2);
                assert_eq!(samples[0].elapsed, 0.0);
                assert!((samples[1].elapsed - 0.05).abs() < 1e-6);
                assert!(samples.iter().all(|s| s.value > 0.0));
            }
            other => panic!("expected RecordingComplete, got {other:?}"),
        }
        assert!(session.take_event().is_none());
        session.deactivate();
        assert!(session.take_event().is_none());
    }

    #[test]
    fn empty_recording_emits_no_completion() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![]);
        let mut session = CaptureSession::new(CaptureMode::Recording, CaptureTunables::default());

        session.activate(&mut host, t0);
        session.deactivate();
        assert!(session.take_event().is_none());
    }

    #[test]
    fn activate_while_active_is_a_no_op() {
        let t0 = Instant::now();
        let mut host = TestHost::new(vec![]);
        let mut session = level_session();

        let first = session.activate(&mut host, t0);
        let second = session.activate(&mut host, t0);
        assert_eq!(first, second);
        assert_eq!(host.acquires, 1);
        assert_eq!(host.releases(), 0);
    }
}
