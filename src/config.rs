use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration for the FCPX Autocut toolkit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Silence detection thresholds
    pub silence: SilenceConfig,

    /// Segment merge settings
    pub merge: MergeConfig,

    /// Giphy search settings
    pub giphy: GiphyConfig,
}

/// Thresholds handed to the silence detection backend.
///
/// Modeled as an explicit structure passed into the detector rather than
/// ambient defaults, so every run states its thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SilenceConfig {
    /// Minimum silence length in milliseconds
    pub min_silence_len_ms: u64,

    /// Silence threshold in dB
    pub silence_thresh_db: i32,

    /// Detection step size in milliseconds. A hint for backends that scan in
    /// fixed windows; the ffmpeg backend ignores it.
    pub seek_step_ms: u64,

    /// Symmetric padding added around each detected speech range, in milliseconds
    pub padding_ms: u64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            min_silence_len_ms: 700,
            silence_thresh_db: -40,
            seek_step_ms: 50,
            padding_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Maximum gap between speech segments to merge, in seconds
    pub max_gap_seconds: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self { max_gap_seconds: 0.3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GiphyConfig {
    /// API key; falls back to the GIPHY_API_KEY environment variable
    pub api_key: Option<String>,

    /// Default number of results per search
    pub limit: usize,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GiphyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            limit: 5,
            timeout_seconds: 30,
        }
    }
}

impl GiphyConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GIPHY_API_KEY").ok())
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        // Try to load from various locations
        let config_paths = [
            "fcpx-autocut.toml",
            "config/fcpx-autocut.toml",
            "~/.config/fcpx-autocut/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }
}
