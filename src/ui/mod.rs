//! Terminal presentation layer for wavebar.
//!
//! Hosts the shared alternate-screen presenter the commands draw through and
//! the standalone full-screen error display.

pub mod error;
pub mod term;

pub use error::ErrorScreen;
pub use term::{term_color, TermEvent, TermTheme, WaveTerminal};
