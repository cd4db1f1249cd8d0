use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for placestamp.
///
/// Controls how the Nominatim gazetteer is contacted and how stamped
/// output is written. Every field has a sensible default, so a partial
/// (or absent) config file works fine.
///
/// # Loading
///
/// ```rust,no_run
/// use placestamp::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.geocoding.accept_language = "fr".into();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nominatim endpoint and politeness settings.
    pub geocoding: GeocodingConfig,
    /// Output encoding and caption font settings.
    pub rendering: RenderingConfig,
}

/// Settings for the Nominatim gazetteer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Base URL of the Nominatim instance.
    pub base_url: String,
    /// User-Agent sent with every request; the public instance requires an
    /// identifying one.
    pub user_agent: String,
    /// Preferred language for place names.
    pub accept_language: String,
    /// Minimum spacing between requests, in milliseconds.
    pub call_interval_ms: u64,
    /// Delay before retrying an empty reverse lookup, in milliseconds.
    pub retry_delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("placestamp/{}", env!("CARGO_PKG_VERSION")),
            accept_language: "en".to_string(),
            call_interval_ms: 1500,
            retry_delay_ms: 2000,
            timeout_secs: 10,
        }
    }
}

/// Settings for the rendered output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// JPEG encoder quality (1–100).
    pub jpeg_quality: u8,
    /// Candidate caption fonts, tried in order when `--font` is not given.
    /// Only plain `.ttf` files work here (no `.ttc` collections).
    pub font_search_paths: Vec<String>,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            font_search_paths: vec![
                // macOS
                "/System/Library/Fonts/Supplemental/Arial.ttf".to_string(),
                "/Library/Fonts/Arial.ttf".to_string(),
                // Linux
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf".to_string(),
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
                "/usr/share/fonts/TTF/DejaVuSans.ttf".to_string(),
                // Windows
                "C:\\Windows\\Fonts\\arial.ttf".to_string(),
            ],
        }
    }
}

impl Config {
    /// Resolve the default config file path: `placestamp/config.json` under
    /// the platform config directory.
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Failed to resolve the user config directory")?;
        Ok(base.join("placestamp").join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}
