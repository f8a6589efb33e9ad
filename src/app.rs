//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// Real-time audio waveform bars for the terminal
#[derive(Parser)]
#[command(name = "wavebar")]
#[command(version)]
#[command(about = "\n\n ▂▅▃▇▄▆▂ ")]
#[command(
    long_about = "\n\n ▂▅▃▇▄▆▂\n\nReal-time audio waveform bars for the terminal: live microphone metering,\na scrolling placeholder animation, and level recording with scrub-to-seek\nreview.\n\nDEFAULT COMMAND:\n    If no command is specified, 'live' is used by default.\n\nEXAMPLES:\n    # Meter the default microphone\n    $ wavebar\n    $ wavebar live\n\n    # Preview bar styling with the scrolling animation\n    $ wavebar scroll\n\n    # Record levels, review them, and export the envelope as JSON\n    $ wavebar record -o envelope.json\n\n    # Stop a running recording from another terminal\n    $ pkill -USR1 wavebar\n\n    # List audio input devices\n    $ wavebar list-devices\n\n    # Edit configuration file\n    $ wavebar config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavebar/wavebar.toml\n    Logs:               ~/.local/state/wavebar/wavebar.log.*\n\nKEYS:\n    live:    m toggles the microphone, q quits\n    record:  Enter finishes and opens the review, q cancels\n    review:  drag to seek, Space replays, q quits"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Live microphone level meter (default)
    ///
    /// Draws the normalized frequency spectrum of the configured input device
    /// as bars. Press 'm' to toggle the microphone, 'q' to quit. SIGUSR1
    /// releases the microphone externally.
    #[command(visible_alias = "l")]
    Live,

    /// Scrolling placeholder waveform animation
    ///
    /// Seeded placeholder bars drifting leftward forever. No audio device is
    /// opened; useful for previewing bar styling from wavebar.toml.
    #[command(visible_alias = "s")]
    Scroll,

    /// Record microphone levels, then review with scrub-to-seek
    ///
    /// Press Enter (or send SIGUSR1) to finish and open the interactive
    /// review: drag the mouse to seek, Space to replay, 'q' to quit.
    #[command(visible_alias = "r")]
    Record {
        /// Write the recorded envelope as JSON to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Edit bar styling, capture tunables, and scroll settings.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in wavebar.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   wavebar completions bash > wavebar.bash
    ///   wavebar completions zsh > _wavebar
    ///   wavebar completions fish > wavebar.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavebar", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Live) => {
            commands::handle_live().await?;
        }
        Some(Commands::Scroll) => {
            commands::handle_scroll().await?;
        }
        Some(Commands::Record { output }) => {
            commands::handle_record(output).await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
