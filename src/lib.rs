//! wavebar: real-time audio waveform bars for the terminal.
//!
//! The engine is host-agnostic: [`render`] draws clamped samples as bars on a
//! pixel surface, [`capture`] turns microphone input into spectrum bins and
//! level history, [`scrub`] maps pointer gestures to seeks, and [`sched`]
//! paces frames and throttles resizes. The `wavebar` binary is the first
//! host, wiring the engine to a terminal through [`app`], [`commands`], and
//! [`ui`].

pub mod app;
pub mod capture;
pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
pub mod sched;
pub mod scrub;
pub mod ui;
