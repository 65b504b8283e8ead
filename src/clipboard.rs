//! Clipboard write for the current summary.

use arboard::Clipboard;
use tracing::debug;

/// Write text to the system clipboard.
pub fn copy_text(text: &str) -> Result<(), String> {
    let mut clipboard = Clipboard::new().map_err(|e| format!("Failed to open clipboard: {e}"))?;
    clipboard
        .set_text(text)
        .map_err(|e| format!("Failed to set clipboard: {e}"))?;

    debug!("Copied {} characters to clipboard", text.chars().count());
    Ok(())
}
