//! Configuration management for page-reader-rs.
//!
//! Loads config from YAML files in standard locations. Every section
//! falls back to sensible defaults when absent.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    pub host: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".into(),
            host: "https://generativelanguage.googleapis.com".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub host: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8917".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub engine: String,
    pub voice: String,
    pub rate: u32,
    pub pitch: u32,
    pub volume: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        // espeak-ng defaults: 175 wpm, pitch 50, amplitude 100
        Self {
            enabled: true,
            engine: "espeak-ng".into(),
            voice: "en-us".into(),
            rate: 175,
            pitch: 50,
            volume: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub enabled: bool,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Path to the credentials file. Defaults to
    /// ~/.config/page-reader/credentials.yaml when unset.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub bridge: BridgeConfig,
    pub speech: SpeechConfig,
    pub keys: KeysConfig,
    pub credentials: CredentialsConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/page-reader/config.yaml
    /// 3. /etc/page-reader/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/page-reader/config.yaml")),
                Some(PathBuf::from("/etc/page-reader/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = serde_yml::from_str("{}").unwrap();
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.bridge.host, "http://localhost:8917");
        assert!(config.speech.enabled);
        assert!(config.keys.enabled);
        assert!(config.credentials.file.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let yaml = "gemini:\n  model: gemini-1.5-pro\n";
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.gemini.host, "https://generativelanguage.googleapis.com");
        assert_eq!(config.speech.rate, 175);
    }
}
