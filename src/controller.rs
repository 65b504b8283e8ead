//! Summarization orchestrator and main event loop.
//!
//! Owns the result pane, speech reader, and summary-type selection, and
//! serializes all mutations through one select loop. Re-triggering while
//! a summarization is in flight aborts the old task: the latest request
//! wins.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bridge::ArticleBridge;
use crate::clipboard;
use crate::config::Config;
use crate::credentials;
use crate::errors::ReaderError;
use crate::keys::{KeyAction, KeyDispatcher};
use crate::pane::{self, ResultPane};
use crate::speech::{SpeechReader, SpeechState};
use crate::summarizer::{GeminiClient, SummaryType};

const SUMMARY_FALLBACK_ERROR: &str = "Failed to generate summary.";

const STARTUP_HINTS: [&str; 5] = [
    "Press 1 for brief summary.",
    "Press 2 for detailed summary.",
    "Press 3 for bullet points.",
    "Press tab to copy the summary.",
    "Press spacebar to start or stop reading.",
];

pub struct ReaderController {
    config: Config,
    pane: Arc<Mutex<ResultPane>>,
    speech: Arc<SpeechReader>,
    bridge: Arc<ArticleBridge>,
    client: Arc<GeminiClient>,
    summary_type: SummaryType,
    inflight: Option<JoinHandle<()>>,
}

impl ReaderController {
    pub fn new(config: Config, summary_type: SummaryType) -> Self {
        let speech = Arc::new(SpeechReader::new(config.speech.clone()));
        let bridge = Arc::new(ArticleBridge::new(&config.bridge));
        let client = Arc::new(GeminiClient::new(&config.gemini));

        Self {
            config,
            pane: Arc::new(Mutex::new(ResultPane::new())),
            speech,
            bridge,
            client,
            summary_type,
            inflight: None,
        }
    }

    pub async fn run(&mut self, summarize_on_start: bool) {
        for hint in STARTUP_HINTS {
            self.speech.say_feedback(hint).await;
        }

        let (key_tx, mut key_rx) = mpsc::channel::<KeyAction>(16);
        if self.config.keys.enabled {
            let dispatcher = KeyDispatcher::new(key_tx);
            tokio::spawn(async move {
                dispatcher.run().await;
            });
        } else {
            // Without the dispatcher the channel must close so one-shot
            // runs can drain and exit.
            drop(key_tx);
        }

        if summarize_on_start {
            self.summarize();
        }

        info!("Reader ready — press 1, 2 or 3 to summarize the current page");

        while let Some(action) = key_rx.recv().await {
            match action {
                KeyAction::ToggleSpeech => self.toggle_speech().await,
                KeyAction::StopSpeech => self.stop_speech().await,
                KeyAction::CopySummary => self.copy_summary().await,
                KeyAction::SelectSummaryType(t) => self.select_summary_type(t).await,
            }
        }

        // Channel closed: either keys are disabled (one-shot mode) or all
        // keyboards disconnected. Let any in-flight work and speech finish.
        if let Some(handle) = self.inflight.take() {
            let _ = handle.await;
        }
        while self.speech.state() != SpeechState::Idle {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    }

    /// One summarization pass: loading indicator, credential check, article
    /// fetch, API call, then display + speak.
    fn summarize(&mut self) {
        self.pane.lock().unwrap().show_loading();

        // Latest request wins.
        if let Some(handle) = self.inflight.take() {
            if !handle.is_finished() {
                info!("Aborting in-flight summarization");
                handle.abort();
            }
        }

        let Some(api_key) = credentials::load_api_key(self.config.credentials.file.as_deref())
        else {
            self.pane
                .lock()
                .unwrap()
                .show_message(&ReaderError::MissingApiKey.to_string());
            return;
        };

        let pane = Arc::clone(&self.pane);
        let speech = Arc::clone(&self.speech);
        let bridge = Arc::clone(&self.bridge);
        let client = Arc::clone(&self.client);
        let summary_type = self.summary_type;

        self.inflight = Some(tokio::spawn(async move {
            let Some(text) = bridge.article_text().await else {
                pane.lock()
                    .unwrap()
                    .show_message(&ReaderError::NoArticleText.to_string());
                return;
            };

            match client.summarize(&text, summary_type, &api_key).await {
                Ok(summary) => {
                    pane.lock().unwrap().show_summary(&summary);
                    speech.speak(&summary).await;
                }
                Err(e) => {
                    let mut msg = e.to_string();
                    if msg.is_empty() {
                        msg = SUMMARY_FALLBACK_ERROR.to_string();
                    }
                    pane.lock().unwrap().show_message(&format!("Error: {msg}"));
                }
            }
        }));
    }

    async fn toggle_speech(&mut self) {
        match self.speech.state() {
            SpeechState::Speaking => {
                self.speech.pause();
                self.speech.say_feedback("Paused.").await;
            }
            SpeechState::Paused => {
                self.speech.resume();
                self.speech.say_feedback("Resumed.").await;
            }
            SpeechState::Idle => {
                let text = self.pane.lock().unwrap().trimmed_text();
                if let Some(text) = text {
                    self.speech.speak(&text).await;
                    self.speech.say_feedback("Started reading.").await;
                }
            }
        }
    }

    async fn stop_speech(&mut self) {
        if self.speech.state() != SpeechState::Idle {
            self.speech.stop();
            self.speech.say_feedback("Stopped.").await;
        }
    }

    async fn copy_summary(&mut self) {
        let Some(text) = self.pane.lock().unwrap().trimmed_text() else {
            return;
        };

        match clipboard::copy_text(&text) {
            Ok(()) => {
                pane::flash_copied_label(&self.pane);
                self.speech.say_feedback("Copied.").await;
            }
            // Clipboard failures are logged, never surfaced in the pane.
            Err(e) => warn!("Clipboard write failed: {e}"),
        }
    }

    async fn select_summary_type(&mut self, summary_type: SummaryType) {
        self.summary_type = summary_type;
        let phrase = match summary_type {
            SummaryType::Brief => "Brief summary selected.",
            SummaryType::Detailed => "Detailed summary selected.",
            SummaryType::Bullets => "Bullet summary selected.",
            SummaryType::Default => "Default summary selected.",
        };
        self.speech.say_feedback(phrase).await;
        self.summarize();
    }
}
