//! Read-only access to the stored Gemini API key.
//!
//! The key lives in a YAML credentials file owned by the user (or in the
//! GEMINI_API_KEY environment variable, which takes precedence). This
//! component never writes it.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CredentialsFile {
    gemini_api_key: String,
}

/// Default credentials location: ~/.config/page-reader/credentials.yaml
fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config/page-reader/credentials.yaml"))
}

/// Extract a usable API key from credentials file contents.
fn parse_api_key(contents: &str) -> Option<String> {
    let parsed: CredentialsFile = match serde_yml::from_str(contents) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse credentials file: {e}");
            return None;
        }
    };

    let key = parsed.gemini_api_key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Load the stored API key, if any.
pub fn load_api_key(path: Option<&Path>) -> Option<String> {
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        let key = key.trim().to_string();
        if !key.is_empty() {
            debug!("Using API key from GEMINI_API_KEY");
            return Some(key);
        }
    }

    let path = path.map(PathBuf::from).or_else(default_path)?;
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_api_key(&contents),
        Err(e) => {
            debug!("Cannot read credentials file {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_from_yaml() {
        let key = parse_api_key("gemini_api_key: abc123\n");
        assert_eq!(key.as_deref(), Some("abc123"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let key = parse_api_key("gemini_api_key: \"  abc123  \"\n");
        assert_eq!(key.as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_key_is_none() {
        assert!(parse_api_key("{}").is_none());
        assert!(parse_api_key("gemini_api_key: \"\"\n").is_none());
    }

    #[test]
    fn malformed_yaml_is_none() {
        assert!(parse_api_key(": not yaml :").is_none());
    }
}
