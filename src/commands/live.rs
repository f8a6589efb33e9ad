//! Live microphone level meter, the default command.
//!
//! Opens the configured input device and draws its normalized frequency
//! spectrum as bars, one bin per bar, fitted to the terminal width. `m`
//! toggles the microphone; while the mic is off (or capture failed) a flat
//! placeholder row is shown instead of a frozen frame. SIGUSR1 releases the
//! microphone, mirroring the external-trigger support of `record`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::capture::{CaptureEvent, CaptureMode, CapturePhase, CaptureSession, MicInputHost};
use crate::config::WavebarConfig;
use crate::render::{bar_hit, draw_bars, BarHit, Framebuffer, ResizeCoordinator, Theme};
use crate::ui::{ErrorScreen, TermEvent, WaveTerminal};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Bars shown while the microphone is off.
const IDLE_BAR_COUNT: usize = 60;
const IDLE_LEVEL: f32 = 0.1;

/// Runs the live meter until `q`, Escape, or Ctrl+C.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the terminal cannot be initialized
/// - If the signal handler cannot be registered
pub async fn handle_live() -> Result<(), anyhow::Error> {
    tracing::info!("=== wavebar live meter started ===");

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
    let mut session = CaptureSession::new(CaptureMode::Meter, config.capture.tunables());
    let mut mic = MicInputHost::new(config.audio.device.clone());

    let released = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, released.clone())
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let mut terminal = WaveTerminal::new()?;
    let palette = *terminal.theme();
    let theme: &dyn Theme = &palette;
    let mut fb = Framebuffer::new(terminal.surface_size()?);
    let mut resizer = ResizeCoordinator::new();

    session.activate(&mut mic, Instant::now());

    let idle_row = vec![IDLE_LEVEL; IDLE_BAR_COUNT];
    let mut error_line: Option<String> = None;
    let mut inspected: Option<BarHit> = None;

    loop {
        match terminal.poll_event(FRAME_INTERVAL)? {
            Some(TermEvent::Key(key)) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('m') => {
                    if matches!(
                        session.phase(),
                        CapturePhase::Acquiring | CapturePhase::Active
                    ) {
                        session.deactivate();
                    } else {
                        error_line = None;
                        session.activate(&mut mic, Instant::now());
                    }
                }
                _ => {}
            },
            Some(TermEvent::Pointer(pointer)) => {
                if let crate::scrub::PointerEvent::Down { x, .. } = pointer {
                    let row: &[f32] = if session.is_active() && !session.bins().is_empty() {
                        session.bins()
                    } else {
                        &idle_row
                    };
                    inspected = bar_hit(row, &style, x);
                }
            }
            Some(TermEvent::Resize(size)) => resizer.notify(size, Instant::now()),
            None => {}
        }

        if released.swap(false, Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: releasing microphone");
            session.deactivate();
        }

        let now = Instant::now();
        resizer.poll(&mut fb, now);
        session.poll(now);
        while let Some(event) = session.take_event() {
            match event {
                CaptureEvent::Error(message) => {
                    tracing::warn!("Capture error: {message}");
                    error_line = Some(message);
                }
                CaptureEvent::RecordingComplete(_) => {}
            }
        }

        if session.is_active() && !session.bins().is_empty() {
            draw_bars(&mut fb, session.bins(), &style, Some(theme));
        } else {
            draw_bars(&mut fb, &idle_row, &style, Some(theme));
        }

        let footer = footer_line(&session, error_line.as_deref(), inspected);
        terminal.draw(&fb, footer)?;
    }

    session.deactivate();
    terminal.cleanup()?;

    tracing::info!("=== wavebar live meter exited ===");
    Ok(())
}

fn footer_line(
    session: &CaptureSession,
    error_line: Option<&str>,
    inspected: Option<BarHit>,
) -> Line<'static> {
    let mut spans = Vec::new();

    if session.is_active() {
        spans.push(Span::styled("● ", Style::default().fg(Color::Green)));
        spans.push(Span::raw(format!(
            "live {:>3}%",
            (session.level() * 100.0).round() as u16
        )));
    } else {
        spans.push(Span::styled(
            "○ ",
            Style::default().add_modifier(Modifier::DIM),
        ));
        spans.push(Span::raw("mic off"));
    }

    if let Some(hit) = inspected {
        spans.push(Span::raw(format!(" / bin {}: {:.2}", hit.index, hit.value)));
    }

    if let Some(message) = error_line {
        spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        ));
    }

    spans.push(Span::raw("  [m] mic  [q] quit"));
    Line::from(spans)
}
