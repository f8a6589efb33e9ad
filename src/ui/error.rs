//! Full-screen error display.
//!
//! Shown when a command dies outside the normal TUI loop, for example when
//! microphone acquisition is denied at startup. The message sits centered on
//! a red screen and any key dismisses it.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};

const BACKGROUND: Color = Color::Rgb(255, 0, 0);
const FOREGROUND: Color = Color::Rgb(255, 255, 255);

/// Error screen for displaying human-readable error messages.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates the error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    /// - If the terminal cannot be initialized
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Displays the message and blocks until any key is pressed.
    ///
    /// Text wraps to 80% of the screen width and stays vertically centered.
    ///
    /// # Errors
    /// - If terminal rendering fails
    /// - If event polling fails
    pub fn show_error(&mut self, error_message: &str) -> Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();

                let backdrop = Block::default().style(Style::default().bg(BACKGROUND));
                frame.render_widget(backdrop, area);

                let padding_x = area.width / 10;
                let text_area = Rect {
                    x: area.x + padding_x,
                    y: area.y + area.height / 2,
                    width: area.width.saturating_sub(padding_x * 2),
                    height: area.height / 2,
                };

                let lines = vec![
                    Line::styled(
                        error_message.to_string(),
                        Style::default().fg(FOREGROUND).bg(BACKGROUND),
                    ),
                    Line::raw(""),
                    Line::styled(
                        "press any key to close",
                        Style::default()
                            .fg(FOREGROUND)
                            .bg(BACKGROUND)
                            .add_modifier(Modifier::DIM),
                    ),
                ];

                let paragraph = Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });

                frame.render_widget(paragraph, text_area);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
