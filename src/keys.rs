//! Global keyboard shortcut dispatch using evdev.
//!
//! Monitors all keyboard devices for the reader's shortcut keys and sends
//! typed actions over a tokio channel. Only key-down events are handled;
//! repeats and releases are ignored.

use evdev::{Device, EventType, InputEventKind, Key};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::summarizer::SummaryType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Space: start reading / pause / resume by current speech state.
    ToggleSpeech,
    /// Escape: stop active or paused speech.
    StopSpeech,
    /// Tab: copy the current summary.
    CopySummary,
    /// 1 / 2 / 3: select a summary type and re-summarize.
    SelectSummaryType(SummaryType),
}

/// Map a key-down event to a shortcut action.
fn action_for(key: Key) -> Option<KeyAction> {
    match key {
        Key::KEY_SPACE => Some(KeyAction::ToggleSpeech),
        Key::KEY_ESC => Some(KeyAction::StopSpeech),
        Key::KEY_TAB => Some(KeyAction::CopySummary),
        Key::KEY_1 => Some(KeyAction::SelectSummaryType(SummaryType::Brief)),
        Key::KEY_2 => Some(KeyAction::SelectSummaryType(SummaryType::Detailed)),
        Key::KEY_3 => Some(KeyAction::SelectSummaryType(SummaryType::Bullets)),
        _ => None,
    }
}

pub struct KeyDispatcher {
    tx: mpsc::Sender<KeyAction>,
}

impl KeyDispatcher {
    pub fn new(tx: mpsc::Sender<KeyAction>) -> Self {
        Self { tx }
    }

    /// Find all keyboard input devices.
    fn find_keyboards() -> Vec<Device> {
        let mut keyboards = Vec::new();

        for (_path, device) in evdev::enumerate() {
            if let Some(keys) = device.supported_keys() {
                if keys.contains(Key::KEY_A) && keys.contains(Key::KEY_ENTER) {
                    info!(
                        "Found keyboard: {} at {:?}",
                        device.name().unwrap_or("unknown"),
                        device.physical_path()
                    );
                    keyboards.push(device);
                }
            }
        }

        keyboards
    }

    /// Monitor a single device for shortcut keys.
    async fn monitor_device(device: Device, tx: mpsc::Sender<KeyAction>) {
        let name = device.name().unwrap_or("unknown").to_string();
        debug!("Monitoring {name}");

        let mut events = match device.into_event_stream() {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Cannot create event stream for {name}: {e}");
                return;
            }
        };

        loop {
            match events.next_event().await {
                Ok(event) => {
                    if event.event_type() != EventType::KEY {
                        continue;
                    }

                    let key = match event.kind() {
                        InputEventKind::Key(k) => k,
                        _ => continue,
                    };

                    // 0 = release, 1 = press, 2 = repeat
                    if event.value() != 1 {
                        continue;
                    }

                    if let Some(action) = action_for(key) {
                        debug!("Shortcut: {action:?}");
                        let _ = tx.try_send(action);
                    }
                }
                Err(e) => {
                    warn!("Device {name} disconnected: {e}");
                    break;
                }
            }
        }
    }

    /// Start monitoring all keyboards. Runs until all devices disconnect.
    pub async fn run(self) {
        let keyboards = Self::find_keyboards();
        if keyboards.is_empty() {
            warn!(
                "No keyboards found. Make sure you're in the 'input' group: \
                 sudo usermod -aG input $USER"
            );
            return;
        }

        info!("Monitoring {} keyboard(s)", keyboards.len());

        let mut handles = Vec::new();
        for device in keyboards {
            let tx = self.tx.clone();
            handles.push(tokio::spawn(Self::monitor_device(device, tx)));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_select_summary_types() {
        assert_eq!(
            action_for(Key::KEY_1),
            Some(KeyAction::SelectSummaryType(SummaryType::Brief))
        );
        assert_eq!(
            action_for(Key::KEY_2),
            Some(KeyAction::SelectSummaryType(SummaryType::Detailed))
        );
        assert_eq!(
            action_for(Key::KEY_3),
            Some(KeyAction::SelectSummaryType(SummaryType::Bullets))
        );
    }

    #[test]
    fn reader_control_keys_map_to_actions() {
        assert_eq!(action_for(Key::KEY_SPACE), Some(KeyAction::ToggleSpeech));
        assert_eq!(action_for(Key::KEY_ESC), Some(KeyAction::StopSpeech));
        assert_eq!(action_for(Key::KEY_TAB), Some(KeyAction::CopySummary));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(action_for(Key::KEY_4), None);
        assert_eq!(action_for(Key::KEY_A), None);
        assert_eq!(action_for(Key::KEY_ENTER), None);
    }
}
