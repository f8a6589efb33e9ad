//! Level recording with scrub-to-seek review.
//!
//! Records interval-paced average levels from the microphone into a
//! time-stamped history while drawing a live right-aligned timeline. Enter or
//! SIGUSR1 stops the recording and opens an interactive review: the captured
//! envelope rendered as bars with a played-region shade, draggable with the
//! mouse to seek and replayable with Space. `--output FILE` additionally
//! writes the envelope snapshot as JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use serde::Serialize;

use crate::capture::{
    CaptureEvent, CaptureMode, CaptureSession, MicInputHost, TimedSample,
};
use crate::config::WavebarConfig;
use crate::render::{draw_bars, BarStyle, Framebuffer, ResizeCoordinator, Theme};
use crate::scrub::{PlaybackState, PointerEvent, ScrubEvent, Scrubber};
use crate::ui::{ErrorScreen, TermEvent, WaveTerminal};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// JSON export shape for `--output`.
#[derive(Serialize)]
struct RecordingEnvelope<'a> {
    duration: f32,
    sample_count: usize,
    samples: &'a [TimedSample],
}

/// Records microphone levels and reviews them interactively.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the terminal cannot be initialized
/// - If the signal handler cannot be registered
/// - If recording fails before any samples were captured
/// - If the `--output` export cannot be written
pub async fn handle_record(output: Option<PathBuf>) -> Result<(), anyhow::Error> {
    tracing::info!("=== wavebar recorder started ===");

    let config = match WavebarConfig::load_or_init() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/wavebar/wavebar.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    let style = config.render.bar_style();
    let mut session = CaptureSession::new(
        CaptureMode::Recording,
        config.capture.recording_tunables(),
    );
    let mut mic = MicInputHost::new(config.audio.device.clone());

    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, stop.clone())
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let mut terminal = WaveTerminal::new()?;
    let palette = *terminal.theme();
    let theme: &dyn Theme = &palette;
    let mut fb = Framebuffer::new(terminal.surface_size()?);
    let mut resizer = ResizeCoordinator::new();

    session.activate(&mut mic, Instant::now());

    let mut error_line: Option<String> = None;
    let mut finished: Option<Vec<TimedSample>> = None;
    let mut cancelled = false;

    loop {
        match terminal.poll_event(FRAME_INTERVAL)? {
            Some(TermEvent::Key(key)) => match key.code {
                KeyCode::Enter => {
                    tracing::debug!("Enter pressed: finishing recording");
                    session.deactivate();
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    tracing::debug!("Escape or 'q' pressed: canceling recording");
                    cancelled = true;
                    session.deactivate();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    cancelled = true;
                    session.deactivate();
                }
                _ => {}
            },
            Some(TermEvent::Resize(size)) => resizer.notify(size, Instant::now()),
            Some(TermEvent::Pointer(_)) | None => {}
        }

        if stop.swap(false, Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: finishing recording via external trigger");
            session.deactivate();
        }

        let now = Instant::now();
        resizer.poll(&mut fb, now);
        session.poll(now);
        while let Some(event) = session.take_event() {
            match event {
                CaptureEvent::RecordingComplete(samples) => finished = Some(samples),
                CaptureEvent::Error(message) => {
                    tracing::warn!("Capture error: {message}");
                    error_line = Some(message);
                }
            }
        }

        if !session.is_active() {
            break;
        }

        let values = session.recording().values();
        draw_recording_view(&mut fb, &values, &style, theme);
        let footer = recording_footer(session.recording().duration(), session.level());
        terminal.draw(&fb, footer)?;
    }

    if cancelled {
        terminal.cleanup()?;
        tracing::info!("=== wavebar recorder cancelled ===");
        return Ok(());
    }

    let Some(samples) = finished else {
        terminal.cleanup()?;
        if let Some(message) = error_line {
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&format!(
                "Recording Error:\n\n{message}\n\nPlease check your audio configuration and try again."
            ))?;
            error_screen.cleanup()?;
            return Err(anyhow!("Recording failed: {message}"));
        }
        println!("Nothing recorded.");
        return Ok(());
    };

    if let Some(message) = error_line {
        // The input died mid-session but left data behind; review it anyway.
        tracing::warn!("Recording ended early: {message}");
    }

    if let Some(path) = output.as_deref() {
        if let Err(e) = export_envelope(path, &samples) {
            terminal.cleanup()?;
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&format!("Export Error:\n\n{e:#}"))?;
            error_screen.cleanup()?;
            return Err(e);
        }
    }

    review(&mut terminal, &mut fb, &mut resizer, theme, style, &samples)?;

    terminal.cleanup()?;
    tracing::info!("=== wavebar recorder exited ===");
    Ok(())
}

/// Interactive scrub/replay loop over a finished recording.
fn review(
    terminal: &mut WaveTerminal,
    fb: &mut Framebuffer,
    resizer: &mut ResizeCoordinator,
    theme: &dyn Theme,
    style: BarStyle,
    samples: &[TimedSample],
) -> Result<(), anyhow::Error> {
    let values: Vec<f32> = samples.iter().map(|s| s.value).collect();
    let duration = samples.last().map_or(0.0, |s| s.elapsed);
    let mut playback = PlaybackState::new(0.0, duration);
    let mut scrubber = Scrubber::new(style);

    tracing::debug!(
        "Entering review: {} samples spanning {duration:.1}s",
        values.len()
    );

    let mut playing = false;
    let mut quit = false;
    let mut last = Instant::now();

    loop {
        // Drain every queued event per frame so fast drags stay responsive.
        let mut timeout = FRAME_INTERVAL;
        while let Some(event) = terminal.poll_event(timeout)? {
            timeout = Duration::ZERO;
            match event {
                TermEvent::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => quit = true,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        quit = true
                    }
                    KeyCode::Char(' ') => {
                        if !playing && playback.progress() >= 1.0 {
                            playback.seek(0.0);
                        }
                        playing = !playing;
                    }
                    _ => {}
                },
                TermEvent::Pointer(pointer) => {
                    let forward = match pointer {
                        PointerEvent::Down { x, y } => {
                            x >= 0.0 && x < fb.width() && y >= 0.0 && y < fb.height()
                        }
                        PointerEvent::Move { .. } | PointerEvent::Up => scrubber.is_dragging(),
                    };
                    if forward {
                        if let Some(ScrubEvent::Seek(time)) =
                            scrubber.handle_pointer(pointer, fb.width(), &playback)
                        {
                            playback.seek(time);
                            playing = false;
                        }
                    }
                }
                TermEvent::Resize(size) => resizer.notify(size, Instant::now()),
            }
        }
        if quit {
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;
        resizer.poll(fb, now);

        if playing {
            playback.seek(playback.current_time() + dt);
            if playback.progress() >= 1.0 {
                playing = false;
            }
        }

        scrubber.draw(fb, &values, &playback, Some(theme));
        terminal.draw(fb, review_footer(&playback, playing))?;
    }

    Ok(())
}

/// Right-aligned timeline of the newest levels, padded with silence on the
/// left until the surface fills up.
fn draw_recording_view(fb: &mut Framebuffer, values: &[f32], style: &BarStyle, theme: &dyn Theme) {
    let fit = (fb.width() / style.cell()).ceil().max(1.0) as usize;
    let mut view = Vec::with_capacity(fit);
    if values.len() < fit {
        view.resize(fit - values.len(), 0.0);
        view.extend_from_slice(values);
    } else {
        view.extend_from_slice(&values[values.len() - fit..]);
    }
    draw_bars(fb, &view, style, Some(theme));
}

fn recording_footer(elapsed: f32, level: f32) -> Line<'static> {
    Line::from(vec![
        Span::styled("● ", Style::default().fg(Color::Red)),
        Span::raw(format!(
            "{} / {:>3}%",
            format_clock(elapsed),
            (level * 100.0).round() as u16
        )),
        Span::raw("  [enter] review  [q] cancel"),
    ])
}

fn review_footer(playback: &PlaybackState, playing: bool) -> Line<'static> {
    let indicator = if playing {
        Span::styled("▶ ", Style::default().fg(Color::Green))
    } else {
        Span::styled("⏸ ", Style::default().fg(Color::Yellow))
    };
    Line::from(vec![
        indicator,
        Span::raw(format!(
            "{:.1}s / {:.1}s",
            playback.current_time(),
            playback.duration()
        )),
        Span::raw("  [drag] seek  [space] play  [q] quit"),
    ])
}

fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Writes the envelope snapshot as pretty-printed JSON.
///
/// # Errors
/// - If serialization fails
/// - If the file cannot be written
fn export_envelope(path: &Path, samples: &[TimedSample]) -> Result<(), anyhow::Error> {
    let envelope = RecordingEnvelope {
        duration: samples.last().map_or(0.0, |s| s.elapsed),
        sample_count: samples.len(),
        samples,
    };
    let json = serde_json::to_string_pretty(&envelope)
        .map_err(|e| anyhow!("Failed to serialize envelope: {e}"))?;
    fs::write(path, json).map_err(|e| anyhow!("Failed to write {}: {e}", path.display()))?;

    tracing::info!("Envelope written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_duration_and_samples() {
        let samples = vec![
            TimedSample {
                elapsed: 0.05,
                value: 0.2,
            },
            TimedSample {
                elapsed: 0.1,
                value: 0.8,
            },
        ];
        let envelope = RecordingEnvelope {
            duration: samples.last().map_or(0.0, |s| s.elapsed),
            sample_count: samples.len(),
            samples: &samples,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"duration\":0.1"));
        assert!(json.contains("\"sample_count\":2"));
        assert!(json.contains("\"value\":0.8"));
    }

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.7), "0:09");
        assert_eq!(format_clock(75.2), "1:15");
        assert_eq!(format_clock(-3.0), "0:00");
    }
}
