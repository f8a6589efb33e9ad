//! Configuration file editor command.
//!
//! Opens the wavebar configuration file in an editor, seeding a default
//! file on first run and validating the result after the editor exits.

use std::process::Command;

use crate::config::{get_config_path, WavebarConfig};

/// Opens the wavebar configuration file in the user's preferred editor.
///
/// A missing file is seeded with the full default configuration first, so
/// the editor always opens a populated file. After the editor exits the
/// file is parsed again; a malformed edit is reported as an error rather
/// than surfacing at the next launch.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor can be found or executed
/// - If the edited file is not valid TOML
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    if !config_path.exists() {
        WavebarConfig::default().save()?;
    }

    let editor = pick_editor()?;
    tracing::info!("Editing {} with {editor}", config_path.display());

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor '{editor}': {e}"))?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with status {}",
            status.code().unwrap_or(-1)
        ));
    }

    WavebarConfig::load_or_init()?;
    println!("Configuration OK: {}", config_path.display());
    Ok(())
}

/// Picks an editor: $VISUAL, then $EDITOR, then nano, then vi.
fn pick_editor() -> anyhow::Result<String> {
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(editor) = std::env::var(var) {
            if !editor.is_empty() {
                return Ok(editor);
            }
        }
    }

    ["nano", "vi"]
        .into_iter()
        .find(|candidate| editor_exists(candidate))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No editor found. Set $EDITOR and try again."))
}

/// Probes the system PATH for an editor binary.
fn editor_exists(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
