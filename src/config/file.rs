//! Configuration file management for wavebar.
//!
//! This module handles loading and saving application configuration from TOML
//! files. Configuration is stored in the user's config directory; a missing
//! file is created with defaults on first run so `wavebar config` always has
//! something to open.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::capture::CaptureTunables;
use crate::render::{BarStyle, Rgba};

/// Audio input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `wavebar list-devices`
    /// - device name from `wavebar list-devices`
    #[serde(default = "default_device")]
    pub device: String,
}

fn default_device() -> String {
    "default".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
        }
    }
}

/// Bar rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Bar width in logical pixels (minimum 1)
    #[serde(default = "default_bar_width")]
    pub bar_width: f32,
    /// Gap between bars in logical pixels
    #[serde(default = "default_bar_gap")]
    pub bar_gap: f32,
    /// Bar color as "#rrggbb" or "#rrggbbaa"; empty uses the terminal theme
    #[serde(default)]
    pub bar_color: String,
    /// Fade bars out toward the horizontal edges
    #[serde(default = "default_true")]
    pub fade_edges: bool,
    /// Width of each fade band in logical pixels
    #[serde(default = "default_fade_width")]
    pub fade_width: f32,
}

fn default_bar_width() -> f32 {
    4.0
}

fn default_bar_gap() -> f32 {
    2.0
}

fn default_fade_width() -> f32 {
    24.0
}

fn default_true() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bar_width: default_bar_width(),
            bar_gap: default_bar_gap(),
            bar_color: String::new(),
            fade_edges: true,
            fade_width: default_fade_width(),
        }
    }
}

impl RenderConfig {
    /// Builds the bar style this configuration describes. Invalid colors are
    /// logged and ignored rather than failing the draw.
    pub fn bar_style(&self) -> BarStyle {
        let color = if self.bar_color.is_empty() {
            None
        } else {
            let parsed = Rgba::parse_hex(&self.bar_color);
            if parsed.is_none() {
                tracing::warn!("Ignoring invalid bar_color {:?}", self.bar_color);
            }
            parsed
        };
        BarStyle::new(self.bar_width, self.bar_gap)
            .with_color(color)
            .with_fade(self.fade_edges, self.fade_width)
    }
}

/// Capture and analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// FFT window size (rounded up to a power of two)
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    /// Spectrum smoothing time constant (0 disables, higher carries more
    /// history)
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    /// Gain applied to normalized values before clamping
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Milliseconds between level samples in scrolling and recording modes
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Level samples kept for the live scrolling view
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Level samples kept while recording (bounds review and export)
    #[serde(default = "default_record_history_size")]
    pub record_history_size: usize,
}

fn default_fft_size() -> usize {
    256
}

fn default_smoothing() -> f32 {
    0.8
}

fn default_sensitivity() -> f32 {
    1.0
}

fn default_update_interval_ms() -> u64 {
    50
}

fn default_history_size() -> usize {
    150
}

fn default_record_history_size() -> usize {
    2400
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            smoothing: default_smoothing(),
            sensitivity: default_sensitivity(),
            update_interval_ms: default_update_interval_ms(),
            history_size: default_history_size(),
            record_history_size: default_record_history_size(),
        }
    }
}

impl CaptureConfig {
    /// Tunables for the live meter and scrolling views.
    pub fn tunables(&self) -> CaptureTunables {
        CaptureTunables {
            fft_size: self.fft_size,
            smoothing: self.smoothing,
            sensitivity: self.sensitivity,
            update_interval: Duration::from_millis(self.update_interval_ms.max(1)),
            history_size: self.history_size,
        }
    }

    /// Tunables for recording sessions, with the larger history bound.
    pub fn recording_tunables(&self) -> CaptureTunables {
        CaptureTunables {
            history_size: self.record_history_size,
            ..self.tunables()
        }
    }
}

/// Scrolling animation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Scroll speed in logical pixels per second (0 renders one still frame)
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Placeholder bars in one cycle
    #[serde(default = "default_bar_count")]
    pub bar_count: usize,
    /// Per-frame probability of refreshing one placeholder slot
    #[serde(default = "default_jitter")]
    pub jitter: f32,
    /// Seed for the placeholder pattern; equal seeds replay identically
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_speed() -> f32 {
    50.0
}

fn default_bar_count() -> usize {
    60
}

fn default_jitter() -> f32 {
    0.1
}

fn default_seed() -> u64 {
    1234
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            bar_count: default_bar_count(),
            jitter: default_jitter(),
            seed: default_seed(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WavebarConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl WavebarConfig {
    /// Loads configuration, writing a default file on first run.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read or written
    /// - If the TOML is malformed
    pub fn load_or_init() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default config at {}", config_path.display());
            return Ok(config);
        }
        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: WavebarConfig = toml::from_str(&config_content)
            .with_context(|| format!("Invalid config at {}", config_path.display()))?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    let config_path = home.join(".config").join("wavebar").join("wavebar.toml");

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    Ok(config_path)
}
