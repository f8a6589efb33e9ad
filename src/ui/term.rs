//! Terminal presenter for waveform surfaces.
//!
//! Owns the alternate-screen terminal and turns a [`Framebuffer`] into
//! half-block cells: each terminal cell shows two vertically stacked surface
//! pixels, upper half as the glyph foreground and lower half as the
//! background. Crossterm input is translated into engine events; pointer
//! coordinates are reported at cell centers in surface pixels so hit tests
//! land inside the cell the user clicked.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::render::{Framebuffer, Rgba, SurfaceSize, Theme};
use crate::scrub::PointerEvent;

/// Rows reserved for the status footer.
const FOOTER_HEIGHT: u16 = 1;

/// Palette the terminal presenter draws with.
///
/// The renderer consumes it through the [`Theme`] accessor; command loops read
/// the fields directly when styling footer text.
#[derive(Debug, Clone, Copy)]
pub struct TermTheme {
    /// Default bar color when the config does not set one.
    pub bar: Rgba,
    /// Screen and footer background.
    pub background: Rgba,
    /// Footer text color.
    pub accent: Rgba,
}

impl Default for TermTheme {
    fn default() -> Self {
        Self {
            bar: Rgba::rgb(206, 224, 220),
            background: Rgba::rgb(0, 0, 0),
            accent: Rgba::rgb(185, 207, 212),
        }
    }
}

impl Theme for TermTheme {
    fn bar_color(&self) -> Option<Rgba> {
        Some(self.bar)
    }

    fn background(&self) -> Rgba {
        self.background
    }
}

/// Input the presenter hands back to command loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TermEvent {
    /// A key press, unfiltered; commands match the codes they care about.
    Key(KeyEvent),
    /// Left-button pointer activity in surface pixels.
    Pointer(PointerEvent),
    /// The terminal was resized; carries the new surface size.
    Resize(SurfaceSize),
}

/// Converts an engine color into a ratatui color, dropping alpha.
pub fn term_color(color: Rgba) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Terminal UI shared by the live, scroll, and record commands.
pub struct WaveTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: TermTheme,
}

impl WaveTerminal {
    /// Creates the presenter and enters alternate screen mode with raw input
    /// and mouse capture enabled.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    /// - If the terminal cannot be initialized
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(WaveTerminal {
            terminal,
            theme: TermTheme::default(),
        })
    }

    pub fn theme(&self) -> &TermTheme {
        &self.theme
    }

    /// Surface size covering the content area: full terminal width, two
    /// pixels of height per row, minus the footer row.
    ///
    /// # Errors
    /// - If the terminal size cannot be queried
    pub fn surface_size(&self) -> Result<SurfaceSize> {
        let size = self.terminal.size()?;
        Ok(surface_for(size.width, size.height))
    }

    /// Waits up to `timeout` for input and translates it.
    ///
    /// Only left-button pointer activity is reported: press starts, drag
    /// moves, release ends. Motion without a held button is dropped because
    /// the engine has no hover behavior.
    ///
    /// # Errors
    /// - If event polling or reading fails
    pub fn poll_event(&mut self, timeout: Duration) -> Result<Option<TermEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let translated = match event::read()? {
            Event::Key(key) => Some(TermEvent::Key(key)),
            Event::Mouse(mouse) => {
                let (x, y) = cell_center(mouse.column, mouse.row);
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        Some(TermEvent::Pointer(PointerEvent::Down { x, y }))
                    }
                    MouseEventKind::Drag(MouseButton::Left) => {
                        Some(TermEvent::Pointer(PointerEvent::Move { x, y }))
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        Some(TermEvent::Pointer(PointerEvent::Up))
                    }
                    _ => None,
                }
            }
            Event::Resize(width, height) => Some(TermEvent::Resize(surface_for(width, height))),
            _ => None,
        };
        Ok(translated)
    }

    /// Draws one frame: the framebuffer as half-block cells over the theme
    /// background, then the footer line on the bottom row.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(&mut self, fb: &Framebuffer, footer: Line<'_>) -> Result<()> {
        let background = self.theme.background;
        let footer_style = Style::default()
            .fg(term_color(self.theme.accent))
            .bg(term_color(background));

        self.terminal.draw(|frame| {
            let area = frame.area();

            let content_height = area.height.saturating_sub(FOOTER_HEIGHT);
            for row in 0..content_height {
                for col in 0..area.width {
                    let top = composite(fb.pixel(col as u32, row as u32 * 2), background);
                    let bottom = composite(fb.pixel(col as u32, row as u32 * 2 + 1), background);
                    frame.buffer_mut().set_string(
                        area.x + col,
                        area.y + row,
                        "▀",
                        Style::default().fg(top).bg(bottom),
                    );
                }
            }

            let footer_area = Rect {
                x: area.x,
                y: area.y + content_height,
                width: area.width,
                height: area.height.min(FOOTER_HEIGHT),
            };
            let paragraph = Paragraph::new(footer).style(footer_style);
            frame.render_widget(paragraph, footer_area);
        })?;

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for WaveTerminal {
    fn drop(&mut self) {
        // Leaving mouse capture on would garble the shell after a panic.
        let _ = self.cleanup();
    }
}

fn surface_for(width: u16, height: u16) -> SurfaceSize {
    SurfaceSize::new(
        width as u32,
        height.saturating_sub(FOOTER_HEIGHT) as u32 * 2,
        1.0,
    )
}

/// Pointer position at the center of a terminal cell, in surface pixels.
fn cell_center(column: u16, row: u16) -> (f32, f32) {
    (column as f32 + 0.5, row as f32 * 2.0 + 1.0)
}

fn composite(pixel: Rgba, background: Rgba) -> Color {
    let alpha = pixel.a as f32 / 255.0;
    let channel =
        |src: u8, bg: u8| (bg as f32 + (src as f32 - bg as f32) * alpha).round() as u8;
    Color::Rgb(
        channel(pixel.r, background.r),
        channel(pixel.g, background.g),
        channel(pixel.b, background.b),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_reserves_the_footer_row() {
        let size = surface_for(80, 24);
        assert_eq!(size.width, 80);
        assert_eq!(size.height, 46);
        assert_eq!(size.dpr, 1.0);

        // A one-row terminal still yields a usable surface.
        let tiny = surface_for(10, 1);
        assert_eq!(tiny.height, 1);
    }

    #[test]
    fn pointer_maps_to_cell_centers() {
        assert_eq!(cell_center(0, 0), (0.5, 1.0));
        assert_eq!(cell_center(7, 3), (7.5, 7.0));
    }

    #[test]
    fn composite_blends_over_the_background() {
        let bg = Rgba::rgb(0, 0, 0);
        assert_eq!(composite(Rgba::rgb(200, 100, 50), bg), Color::Rgb(200, 100, 50));
        assert_eq!(composite(Rgba::TRANSPARENT, bg), Color::Rgb(0, 0, 0));
        assert_eq!(
            composite(Rgba::rgba(200, 200, 200, 127), bg),
            Color::Rgb(100, 100, 100)
        );
    }
}
