//! Scrolling placeholder waveform animation.
//!
//! Draws the seeded placeholder pattern drifting leftward at the configured
//! speed, repeating its cycle forever. Purely decorative: no audio device is
//! opened. Useful for previewing bar styling and as a demo of the scroll
//! animator.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::text::{Line, Span};

use crate::config::WavebarConfig;
use crate::render::{Framebuffer, ResizeCoordinator, ScrollAnimator, Theme};
use crate::ui::{TermEvent, WaveTerminal};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Runs the scroll animation until `q`, Escape, or Ctrl+C.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the terminal cannot be initialized
pub async fn handle_scroll() -> Result<(), anyhow::Error> {
    tracing::info!("=== wavebar scroll animation started ===");

    let config = WavebarConfig::load_or_init()?;
    let style = config.render.bar_style();

    let mut terminal = WaveTerminal::new()?;
    let palette = *terminal.theme();
    let theme: &dyn Theme = &palette;
    let mut fb = Framebuffer::new(terminal.surface_size()?);
    let mut resizer = ResizeCoordinator::new();

    let mut animator = ScrollAnimator::new(style, config.scroll.speed, Instant::now())
        .with_placeholder(config.scroll.bar_count, config.scroll.seed);
    animator.set_jitter(config.scroll.jitter);

    loop {
        match terminal.poll_event(FRAME_INTERVAL)? {
            Some(TermEvent::Key(key)) => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                _ => {}
            },
            Some(TermEvent::Resize(size)) => resizer.notify(size, Instant::now()),
            Some(TermEvent::Pointer(_)) | None => {}
        }

        let now = Instant::now();
        resizer.poll(&mut fb, now);
        animator.poll(now);
        animator.draw(&mut fb, Some(theme));

        let footer = Line::from(vec![
            Span::raw("~ "),
            Span::raw(format!(
                "scrolling {} bars at {:.0} px/s",
                config.scroll.bar_count, config.scroll.speed
            )),
            Span::raw("  [q] quit"),
        ]);
        terminal.draw(&fb, footer)?;
    }

    terminal.cleanup()?;

    tracing::info!("=== wavebar scroll animation exited ===");
    Ok(())
}
