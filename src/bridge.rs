//! Browser bridge client for article extraction.
//!
//! Page-content extraction itself happens in the companion browser bridge;
//! this side only sends a GET_ARTICLE_TEXT message and reads back the
//! extracted text, if any.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::BridgeConfig;

pub struct ArticleBridge {
    host: String,
    client: Client,
}

impl ArticleBridge {
    pub fn new(config: &BridgeConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            host: config.host.clone(),
            client,
        }
    }

    /// Request the active page's article text.
    ///
    /// Returns None when the bridge is unreachable, replies with an error
    /// status, or returns no usable text.
    pub async fn article_text(&self) -> Option<String> {
        let url = format!("{}/message", self.host);
        let body = json!({ "type": "GET_ARTICLE_TEXT" });

        match self.client.post(&url).json(&body).send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    warn!("Browser bridge returned status {}", resp.status());
                    return None;
                }
                match resp.json::<Value>().await {
                    Ok(data) => {
                        let text = extract_text(&data);
                        if let Some(text) = &text {
                            debug!("Bridge returned {} chars of article text", text.chars().count());
                        }
                        text
                    }
                    Err(e) => {
                        warn!("Failed to parse bridge response: {e}");
                        None
                    }
                }
            }
            Err(e) => {
                if e.is_connect() {
                    warn!("Cannot connect to browser bridge at {}", self.host);
                } else if e.is_timeout() {
                    warn!("Browser bridge request timed out");
                } else {
                    warn!("Browser bridge request failed: {e}");
                }
                None
            }
        }
    }
}

fn extract_text(data: &Value) -> Option<String> {
    let text = data["text"].as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_field() {
        let data = json!({ "text": "Article body." });
        assert_eq!(extract_text(&data).as_deref(), Some("Article body."));
    }

    #[test]
    fn missing_or_empty_text_is_none() {
        assert!(extract_text(&json!({})).is_none());
        assert!(extract_text(&json!({ "text": "" })).is_none());
        assert!(extract_text(&json!({ "text": "   " })).is_none());
        assert!(extract_text(&json!({ "text": 42 })).is_none());
    }
}
