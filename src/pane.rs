//! Result pane: the only retained copy of the current summary.
//!
//! Holds the displayed text and the copy button label. Output goes to
//! stdout; everything else in the service logs through tracing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";

pub struct ResultPane {
    text: String,
    copy_label: String,
}

impl ResultPane {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            copy_label: COPY_LABEL.to_string(),
        }
    }

    /// Loading indicator, written before any asynchronous step resolves.
    /// Clears the retained text so copy is a no-op while loading.
    pub fn show_loading(&mut self) {
        self.text.clear();
        println!("Summarizing...");
    }

    /// Display a plain-text message (errors and fixed notices).
    pub fn show_message(&mut self, message: &str) {
        self.text = message.to_string();
        println!("{message}");
    }

    /// Display a summary result.
    pub fn show_summary(&mut self, summary: &str) {
        self.text = summary.to_string();
        println!("\n{summary}\n");
    }

    /// Current text, trimmed; None when there is nothing to copy or read.
    pub fn trimmed_text(&self) -> Option<String> {
        let text = self.text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    pub fn copy_label(&self) -> &str {
        &self.copy_label
    }
}

impl Default for ResultPane {
    fn default() -> Self {
        Self::new()
    }
}

/// Swap the copy label to "Copied!" for two seconds, then restore it.
pub fn flash_copied_label(pane: &Arc<Mutex<ResultPane>>) {
    {
        let mut pane = pane.lock().unwrap();
        pane.copy_label = COPIED_LABEL.to_string();
        println!("[{}]", pane.copy_label());
    }

    let pane = Arc::clone(pane);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2000)).await;
        pane.lock().unwrap().copy_label = COPY_LABEL.to_string();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pane_has_no_text_to_copy() {
        let pane = ResultPane::new();
        assert!(pane.trimmed_text().is_none());
    }

    #[test]
    fn whitespace_only_text_is_none() {
        let mut pane = ResultPane::new();
        pane.show_message("   ");
        assert!(pane.trimmed_text().is_none());
    }

    #[test]
    fn summary_text_is_trimmed() {
        let mut pane = ResultPane::new();
        pane.show_summary("  A summary.  ");
        assert_eq!(pane.trimmed_text().as_deref(), Some("A summary."));
    }

    #[test]
    fn loading_clears_previous_text() {
        let mut pane = ResultPane::new();
        pane.show_summary("Old summary.");
        pane.show_loading();
        assert!(pane.trimmed_text().is_none());
    }

    #[test]
    fn copy_label_starts_at_default() {
        assert_eq!(ResultPane::new().copy_label(), COPY_LABEL);
    }
}
