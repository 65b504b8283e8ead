//! Gemini summarization client.
//!
//! Builds one of four fixed prompt templates and issues a single
//! generateContent call. No retries; failures carry the server-provided
//! message when one exists.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::GeminiConfig;
use crate::errors::ReaderError;

const MAX_INPUT_CHARS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryType {
    Brief,
    Detailed,
    Bullets,
    Default,
}

impl SummaryType {
    /// Anything other than the three named types falls back to Default.
    pub fn from_name(name: &str) -> Self {
        match name {
            "brief" => Self::Brief,
            "detailed" => Self::Detailed,
            "bullets" => Self::Bullets,
            _ => Self::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Detailed => "detailed",
            Self::Bullets => "bullets",
            Self::Default => "default",
        }
    }
}

/// Cap article text at MAX_INPUT_CHARS characters, marking the cut with
/// an ellipsis.
fn truncate_article(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => Cow::Owned(format!("{}...", &text[..idx])),
        None => Cow::Borrowed(text),
    }
}

/// Build the prompt for a summary type, embedding the (possibly
/// truncated) article text.
pub fn build_prompt(text: &str, summary_type: SummaryType) -> String {
    let truncated = truncate_article(text);
    match summary_type {
        SummaryType::Brief => format!(
            "Provide a brief summary of the following article in 2-3 sentences:\n\n{truncated}"
        ),
        SummaryType::Detailed => format!(
            "Provide a detailed summary of the following article, covering all main points and key details:\n\n{truncated}"
        ),
        SummaryType::Bullets => format!(
            "Summarise the following article in 5-7 key points. Each line should start with \"- \":\n\n{truncated}"
        ),
        SummaryType::Default => format!("Summarise the following article:\n\n{truncated}"),
    }
}

fn error_message(data: &Value) -> String {
    data["error"]["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| "API request failed".to_string())
}

fn extract_summary(data: &Value) -> String {
    data["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| "No summary available.".to_string())
}

pub struct GeminiClient {
    model: String,
    host: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            model: config.model.clone(),
            host: config.host.clone(),
            client,
        }
    }

    /// Request a summary of `text` from the Gemini API.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails to send, the server replies
    /// with a non-success status, or the success body cannot be parsed.
    pub async fn summarize(
        &self,
        text: &str,
        summary_type: SummaryType,
        api_key: &str,
    ) -> Result<String, ReaderError> {
        let prompt = build_prompt(text, summary_type);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.2 }
        });

        // The key rides in the query string; never log the URL.
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.host, self.model, api_key
        );

        info!(
            "Requesting {} summary ({} chars of article text)",
            summary_type.name(),
            text.chars().count()
        );

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Gemini returned status {status}");
            let data: Value = resp.json().await.unwrap_or(Value::Null);
            return Err(ReaderError::Api(error_message(&data)));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| ReaderError::Api(format!("Failed to parse Gemini response: {e}")))?;

        Ok(extract_summary(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_not_truncated() {
        let text = "a".repeat(MAX_INPUT_CHARS);
        let truncated = truncate_article(&text);
        assert_eq!(truncated.len(), MAX_INPUT_CHARS);
        assert!(!truncated.ends_with("..."));
    }

    #[test]
    fn long_text_truncates_to_limit_plus_ellipsis() {
        let text = "a".repeat(MAX_INPUT_CHARS + 500);
        let truncated = truncate_article(&text);
        assert_eq!(truncated.chars().count(), MAX_INPUT_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_INPUT_CHARS + 1);
        let truncated = truncate_article(&text);
        assert_eq!(truncated.chars().count(), MAX_INPUT_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn each_summary_type_selects_its_template() {
        let text = "Some article.";
        assert!(build_prompt(text, SummaryType::Brief).starts_with("Provide a brief summary"));
        assert!(build_prompt(text, SummaryType::Detailed).starts_with("Provide a detailed summary"));
        assert!(build_prompt(text, SummaryType::Bullets).starts_with("Summarise the following article in 5-7 key points"));
        assert!(build_prompt(text, SummaryType::Default).starts_with("Summarise the following article:"));
        assert!(build_prompt(text, SummaryType::Brief).ends_with(text));
    }

    #[test]
    fn from_name_maps_unknown_to_default() {
        assert_eq!(SummaryType::from_name("brief"), SummaryType::Brief);
        assert_eq!(SummaryType::from_name("detailed"), SummaryType::Detailed);
        assert_eq!(SummaryType::from_name("bullets"), SummaryType::Bullets);
        assert_eq!(SummaryType::from_name("haiku"), SummaryType::Default);
    }

    #[test]
    fn error_message_prefers_server_body() {
        let data = serde_json::json!({ "error": { "message": "quota exceeded" } });
        assert_eq!(error_message(&data), "quota exceeded");
    }

    #[test]
    fn error_message_falls_back_when_body_is_unusable() {
        assert_eq!(error_message(&Value::Null), "API request failed");
        let data = serde_json::json!({ "error": {} });
        assert_eq!(error_message(&data), "API request failed");
    }

    #[test]
    fn extract_summary_reads_first_candidate() {
        let data = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "A summary." }] } }]
        });
        assert_eq!(extract_summary(&data), "A summary.");
    }

    #[test]
    fn extract_summary_falls_back_when_path_absent() {
        let data = serde_json::json!({ "candidates": [] });
        assert_eq!(extract_summary(&data), "No summary available.");
    }
}
