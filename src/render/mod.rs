//! Waveform rendering pipeline.
//!
//! Everything here draws into a host-owned [`Framebuffer`] and knows nothing
//! about terminals or audio devices.
//!
//! # Modules
//! - `surface`: RGBA pixel surface with device-pixel-ratio-aware sizing
//! - `color`: color type plus theme-aware bar color resolution
//! - `bars`: the bar renderer (cyclic sampling, edge fade, hit testing)
//! - `pattern`: deterministic seeded placeholder waveform generator
//! - `scroll`: continuous scroll animator over a cyclic buffer
//! - `resize`: throttled resize-to-redraw coordination

pub mod bars;
pub mod color;
pub mod pattern;
pub mod resize;
pub mod scroll;
pub mod surface;

pub use bars::{bar_hit, draw_bars, draw_bars_scrolled, BarHit, BarStyle};
pub use color::{resolve_bar_color, Rgba, Theme, NEUTRAL_GRAY};
pub use pattern::{placeholder_waveform, PatternGenerator};
pub use resize::ResizeCoordinator;
pub use scroll::ScrollAnimator;
pub use surface::{Framebuffer, SurfaceSize};
