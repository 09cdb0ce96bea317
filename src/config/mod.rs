//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/cafe-scout/config.toml
//!
//! The AI credential is never written here; `ai.api_key_env` names the
//! environment variable it is read from.

pub mod defaults;

use crate::constants::{api, location, map};
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Geocoding pipeline settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Recommendation service settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Map view settings
    #[serde(default)]
    pub map: MapConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Nominatim base URL
    #[serde(default = "default_geocoder_endpoint")]
    pub endpoint: String,

    /// Comma separated ISO country codes
    #[serde(default = "default_country_codes")]
    pub country_codes: String,

    /// Bounding box hint (west,north,east,south)
    #[serde(default = "default_viewbox")]
    pub viewbox: String,

    /// Restrict results to the viewbox
    #[serde(default = "default_true")]
    pub bounded: bool,

    /// Region appended to queries that lack city context
    #[serde(default = "default_anchor_region")]
    pub anchor_region: String,

    /// Lower-case spellings that mean the address already names the region
    #[serde(default = "default_anchor_aliases")]
    pub anchor_aliases: Vec<String>,

    /// Quiet interval before a typed address is geocoded
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// User agent for geocoder requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Abbreviation to full institution name
    #[serde(default = "default_abbreviations")]
    pub abbreviations: HashMap<String, String>,
}

/// Recommendation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Generative Language API base URL
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Map view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    #[serde(default = "default_center_lng")]
    pub center_lng: f64,

    #[serde(default = "default_zoom")]
    pub default_zoom: u8,

    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: u8,

    #[serde(default = "default_fit_padding")]
    pub fit_padding: f64,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_true() -> bool {
    true
}
fn default_geocoder_endpoint() -> String {
    api::NOMINATIM_URL.to_string()
}
fn default_country_codes() -> String {
    DEFAULT_COUNTRY_CODES.to_string()
}
fn default_viewbox() -> String {
    location::VIETNAM_VIEWBOX.to_string()
}
fn default_anchor_region() -> String {
    DEFAULT_ANCHOR_REGION.to_string()
}
fn default_anchor_aliases() -> Vec<String> {
    DEFAULT_ANCHOR_ALIASES.iter().map(|s| s.to_string()).collect()
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_abbreviations() -> HashMap<String, String> {
    DEFAULT_ABBREVIATIONS
        .iter()
        .map(|(abbr, full)| (abbr.to_string(), full.to_string()))
        .collect()
}
fn default_ai_endpoint() -> String {
    api::GEMINI_URL.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}
fn default_center_lat() -> f64 {
    map::DEFAULT_CENTER.0
}
fn default_center_lng() -> f64 {
    map::DEFAULT_CENTER.1
}
fn default_zoom() -> u8 {
    map::DEFAULT_ZOOM
}
fn default_focus_zoom() -> u8 {
    map::FOCUS_ZOOM
}
fn default_fit_padding() -> f64 {
    map::FIT_PADDING
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocoder_endpoint(),
            country_codes: default_country_codes(),
            viewbox: default_viewbox(),
            bounded: default_true(),
            anchor_region: default_anchor_region(),
            anchor_aliases: default_anchor_aliases(),
            debounce_ms: default_debounce_ms(),
            user_agent: default_user_agent(),
            abbreviations: default_abbreviations(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lng: default_center_lng(),
            default_zoom: default_zoom(),
            focus_zoom: default_focus_zoom(),
            fit_padding: default_fit_padding(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key". Abbreviations are addressed as
    /// "geocoding.abbreviations.<abbr>".
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(abbr) = key.strip_prefix("geocoding.abbreviations.") {
            return self.geocoding.abbreviations.get(abbr).cloned();
        }

        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["geocoding", "endpoint"] => Some(self.geocoding.endpoint.clone()),
            ["geocoding", "country_codes"] => Some(self.geocoding.country_codes.clone()),
            ["geocoding", "viewbox"] => Some(self.geocoding.viewbox.clone()),
            ["geocoding", "bounded"] => Some(self.geocoding.bounded.to_string()),
            ["geocoding", "anchor_region"] => Some(self.geocoding.anchor_region.clone()),
            ["geocoding", "anchor_aliases"] => Some(self.geocoding.anchor_aliases.join(",")),
            ["geocoding", "debounce_ms"] => Some(self.geocoding.debounce_ms.to_string()),
            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),

            ["ai", "endpoint"] => Some(self.ai.endpoint.clone()),
            ["ai", "model"] => Some(self.ai.model.clone()),
            ["ai", "api_key_env"] => Some(self.ai.api_key_env.clone()),

            ["map", "center_lat"] => Some(self.map.center_lat.to_string()),
            ["map", "center_lng"] => Some(self.map.center_lng.to_string()),
            ["map", "default_zoom"] => Some(self.map.default_zoom.to_string()),
            ["map", "focus_zoom"] => Some(self.map.focus_zoom.to_string()),
            ["map", "fit_padding"] => Some(self.map.fit_padding.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(abbr) = key.strip_prefix("geocoding.abbreviations.") {
            if abbr.trim().is_empty() {
                return Err(Error::Config("Abbreviation must not be empty".to_string()));
            }
            self.geocoding
                .abbreviations
                .insert(abbr.to_lowercase(), value.to_string());
            return Ok(());
        }

        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(value, "port")?;
            }

            ["geocoding", "endpoint"] => {
                self.geocoding.endpoint = value.to_string();
            }
            ["geocoding", "country_codes"] => {
                self.geocoding.country_codes = value.to_string();
            }
            ["geocoding", "viewbox"] => {
                self.geocoding.viewbox = value.to_string();
            }
            ["geocoding", "bounded"] => {
                self.geocoding.bounded = parse_value(value, "boolean")?;
            }
            ["geocoding", "anchor_region"] => {
                self.geocoding.anchor_region = value.to_string();
            }
            ["geocoding", "anchor_aliases"] => {
                self.geocoding.anchor_aliases = value
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            ["geocoding", "debounce_ms"] => {
                self.geocoding.debounce_ms = parse_value(value, "debounce")?;
            }
            ["geocoding", "user_agent"] => {
                self.geocoding.user_agent = value.to_string();
            }

            ["ai", "endpoint"] => {
                self.ai.endpoint = value.to_string();
            }
            ["ai", "model"] => {
                self.ai.model = value.to_string();
            }
            ["ai", "api_key_env"] => {
                self.ai.api_key_env = value.to_string();
            }

            ["map", "center_lat"] => {
                self.map.center_lat = parse_value(value, "latitude")?;
            }
            ["map", "center_lng"] => {
                self.map.center_lng = parse_value(value, "longitude")?;
            }
            ["map", "default_zoom"] => {
                self.map.default_zoom = parse_value(value, "zoom")?;
            }
            ["map", "focus_zoom"] => {
                self.map.focus_zoom = parse_value(value, "zoom")?;
            }
            ["map", "fit_padding"] => {
                self.map.fit_padding = parse_value(value, "padding")?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "geocoding.endpoint",
            "geocoding.country_codes",
            "geocoding.viewbox",
            "geocoding.bounded",
            "geocoding.anchor_region",
            "geocoding.anchor_aliases",
            "geocoding.debounce_ms",
            "geocoding.user_agent",
            "geocoding.abbreviations.<abbr>",
            "ai.endpoint",
            "ai.model",
            "ai.api_key_env",
            "map.center_lat",
            "map.center_lng",
            "map.default_zoom",
            "map.focus_zoom",
            "map.fit_padding",
        ]
    }

    /// Read the AI credential from the configured environment variable
    ///
    /// Blank values count as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.ai.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {} value: {}", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.port, 7979);
        assert_eq!(config.geocoding.anchor_region, "Ho Chi Minh City, Vietnam");
        assert_eq!(config.geocoding.debounce_ms, 1000);
        assert_eq!(config.map.focus_zoom, 16);
        assert_eq!(
            config.geocoding.abbreviations.get("dh bk").map(String::as_str),
            Some("Đại học Bách Khoa")
        );
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("ai.model"), Some("gemini-2.5-flash".to_string()));

        config.set("ai.model", "gemini-2.5-pro").unwrap();
        assert_eq!(config.get("ai.model"), Some("gemini-2.5-pro".to_string()));

        config.set("geocoding.debounce_ms", "500").unwrap();
        assert_eq!(config.geocoding.debounce_ms, 500);
    }

    #[test]
    fn test_set_abbreviation() {
        let mut config = Config::default();
        config
            .set("geocoding.abbreviations.DH KT", "Đại học Kinh tế")
            .unwrap();

        assert_eq!(
            config.get("geocoding.abbreviations.dh kt"),
            Some("Đại học Kinh tế".to_string())
        );
    }

    #[test]
    fn test_set_anchor_aliases() {
        let mut config = Config::default();
        config
            .set("geocoding.anchor_aliases", "HCM, Sài Gòn ,")
            .unwrap();
        assert_eq!(config.geocoding.anchor_aliases, vec!["hcm", "sài gòn"]);
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("server.port", "not_a_number").is_err());
        assert!(config.set("geocoding.bounded", "maybe").is_err());
    }

    #[test]
    fn test_api_key_from_env() {
        let mut config = Config::default();
        config.ai.api_key_env = "CAFE_SCOUT_TEST_KEY_PRESENT".to_string();
        env::set_var("CAFE_SCOUT_TEST_KEY_PRESENT", " secret ");
        assert_eq!(config.api_key(), Some("secret".to_string()));

        config.ai.api_key_env = "CAFE_SCOUT_TEST_KEY_BLANK".to_string();
        env::set_var("CAFE_SCOUT_TEST_KEY_BLANK", "   ");
        assert_eq!(config.api_key(), None);

        config.ai.api_key_env = "CAFE_SCOUT_TEST_KEY_UNSET".to_string();
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.geocoding.anchor_region = "Hà Nội, Vietnam".to_string();
            config.server.port = 8080;
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.geocoding.anchor_region, "Hà Nội, Vietnam");
            assert_eq!(loaded.server.port, 8080);
        });
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let loaded: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert_eq!(loaded.geocoding.country_codes, "vn");
        assert!(!loaded.geocoding.abbreviations.is_empty());
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[server]"));
        assert!(toml.contains("[geocoding]"));
        assert!(toml.contains("[geocoding.abbreviations]"));
        assert!(toml.contains("[ai]"));
        assert!(toml.contains("[map]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7979");
    }
}
