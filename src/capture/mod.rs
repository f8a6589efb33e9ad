//! Live audio capture pipeline.
//!
//! # Modules
//! - `session`: capture lifecycle state machine owning the input resource
//! - `analysis`: FFT spectrum analysis into byte-scaled frequency bins
//! - `history`: bounded sample history, plain and time-stamped
//! - `mic`: cpal-backed microphone implementation of the input traits

pub mod analysis;
pub mod history;
pub mod mic;
pub mod session;

pub use analysis::FrequencyAnalyzer;
pub use history::{HistoryBuffer, RecordingHistory, TimedSample};
pub use mic::MicInputHost;
pub use session::{
    AcquireOutcome, AudioInput, AudioInputHost, CaptureEvent, CaptureMode, CapturePhase,
    CaptureSession, CaptureTunables,
};
