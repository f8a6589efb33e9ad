//! Configuration management for wavebar.
//!
//! This module handles loading and saving application configuration from TOML
//! files. Configuration is stored in the user's config directory and created
//! with defaults on first run.

pub mod file;

pub use file::{
    get_config_path, AudioConfig, CaptureConfig, RenderConfig, ScrollConfig, WavebarConfig,
};
