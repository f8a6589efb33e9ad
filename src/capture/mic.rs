//! Microphone-backed audio input.
//!
//! Implements the capture session's host and input traits on top of cpal. The
//! stream callback runs on the audio thread and only appends mono samples into
//! a mutex-guarded sink; the session drains that sink on its own ticks.
//! Dropping the input drops the stream, which stops capture and releases the
//! device.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use super::session::{AcquireOutcome, AudioInput, AudioInputHost};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Acquires microphone input for a capture session.
pub struct MicInputHost {
    /// Device name, numeric index, or "default".
    device_spec: String,
}

impl MicInputHost {
    pub fn new(device_spec: String) -> Self {
        Self { device_spec }
    }
}

impl AudioInputHost for MicInputHost {
    fn acquire(&mut self) -> Result<AcquireOutcome> {
        let input = MicInput::open(&self.device_spec)?;
        Ok(AcquireOutcome::Ready(Box::new(input)))
    }
}

/// A live cpal input stream feeding a sample sink.
pub struct MicInput {
    /// Kept alive for the duration of the capture; dropping it releases the
    /// device.
    _stream: cpal::Stream,
    sink: Arc<Mutex<Vec<f32>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MicInput {
    /// Opens the requested input device and starts streaming.
    ///
    /// # Arguments
    /// * `device_spec` - Device name, numeric index, or "default" for the
    ///   system default device
    ///
    /// # Errors
    /// - If the device cannot be found or configured
    /// - If the stream cannot be built or started
    pub fn open(device_spec: &str) -> Result<Self> {
        // Query devices while suppressing ALSA library warnings
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            if device_spec == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, device_spec)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let config = device.default_input_config()?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            sample_rate,
            channels
        );

        let sink = Arc::new(Mutex::new(Vec::new()));
        let failure = Arc::new(Mutex::new(None));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config.into(), channels, &sink, &failure)
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config.into(), channels, &sink, &failure)
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config.into(), channels, &sink, &failure)
            }
            format => Err(anyhow!("Unsupported sample format: {format}")),
        }?;

        stream.play()?;
        tracing::debug!("Audio stream started");

        Ok(Self {
            _stream: stream,
            sink,
            failure,
        })
    }
}

impl AudioInput for MicInput {
    fn drain(&mut self, out: &mut Vec<f32>) -> Result<()> {
        if let Some(message) = self.failure.lock().unwrap().take() {
            return Err(anyhow!("audio stream failed: {message}"));
        }
        let mut sink = self.sink.lock().unwrap();
        out.append(&mut sink);
        Ok(())
    }
}

/// Builds an input stream converting the device's native format to mono f32.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    sink: &Arc<Mutex<Vec<f32>>>,
    failure: &Arc<Mutex<Option<String>>>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    let sink = Arc::clone(sink);
    let failure = Arc::clone(failure);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mut samples = sink.lock().unwrap();
            // Average multi-channel frames down to mono.
            for frame in data.chunks_exact(channels) {
                let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                samples.push(sum / channels as f32);
            }
        },
        move |err| {
            tracing::error!("Audio stream error: {}", err);
            *failure.lock().unwrap() = Some(err.to_string());
        },
        None,
    )?;

    Ok(stream)
}

/// Finds an audio input device by name or numeric index.
///
/// # Arguments
/// * `host` - The cpal audio host
/// * `device_spec` - A device name or a numeric index (0, 1, 2, ...)
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    // Try to parse as a numeric index first
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return devices
                .into_iter()
                .nth(index)
                .ok_or_else(|| anyhow!("Device index {index} disappeared during enumeration"));
        }
        return Err(anyhow!(
            "Device index {} is out of range (0-{})",
            index,
            devices.len().saturating_sub(1)
        ));
    }

    // Fall back to a name match
    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'wavebar list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    // Open /dev/null for writing
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    // Save the current stderr file descriptor
    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    // Redirect stderr to /dev/null
    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    // Execute the closure
    let result = f();

    // Restore the original stderr
    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
