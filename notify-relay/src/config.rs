//! Configuration management for notify-relay.
//!
//! Loads config from a YAML file in standard locations. Every field has a
//! default, so a missing file (the common case for a hook) is not an error.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Desktop urgency level, mirrored from the freedesktop notification spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub enabled: bool,
    pub title: String,
    pub icon: String,
    pub urgency: Urgency,
    pub timeout_ms: i32,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Claude Code".into(),
            icon: "dialog-information".into(),
            urgency: Urgency::Normal,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// Synthesizer executable; a bare name is resolved on PATH.
    pub binary: String,
    pub model_path: PathBuf,
    /// Companion `.onnx.json` file. Empty means `<model_path>.json`.
    pub config_path: PathBuf,
    /// Speaking rate: values above 1.0 are slower.
    pub length_scale: f32,
    pub volume: f32,
    pub sample_rate: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let voices_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("piper");

        Self {
            enabled: true,
            binary: "piper".into(),
            model_path: voices_dir.join("en_US-lessac-medium.onnx"),
            config_path: PathBuf::new(),
            length_scale: 1.0,
            volume: 0.8,
            sample_rate: 22050,
        }
    }
}

impl SpeechConfig {
    pub fn resolved_config_path(&self) -> PathBuf {
        if self.config_path.as_os_str().is_empty() {
            let mut path = self.model_path.clone().into_os_string();
            path.push(".json");
            PathBuf::from(path)
        } else {
            self.config_path.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_file: PathBuf,
    pub message_field: String,
    pub desktop: DesktopConfig,
    pub speech: SpeechConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(".claude/logs/notifications.log"),
            message_field: "message".into(),
            desktop: DesktopConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./notify-relay.yaml
    /// 2. ~/.config/notify-relay/config.yaml
    /// 3. /etc/notify-relay/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("notify-relay.yaml")),
                dirs::home_dir().map(|h| h.join(".config/notify-relay/config.yaml")),
                Some(PathBuf::from("/etc/notify-relay/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            debug!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        // An empty document deserializes to unit, not to a defaulted struct.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(contents)
    }
}
