//! Application command handlers for wavebar.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command.
//!
//! # Commands
//! - `live`: Live microphone level meter (default command)
//! - `scroll`: Scrolling placeholder waveform animation
//! - `record`: Level recording with scrub-to-seek review
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod live;
pub mod logs;
pub mod record;
pub mod scroll;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use live::handle_live;
pub use logs::handle_logs;
pub use record::handle_record;
pub use scroll::handle_scroll;
