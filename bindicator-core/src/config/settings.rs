//! Host settings
//!
//! ```toml
//! [link]
//! encoding = "hex"         # or "binary"
//! write_timeout_ms = 1000
//!
//! [layout]
//! directory = "config"
//! ```
//!
//! Every key is optional.

use std::string::String;

use embassy_time::Duration;
use serde::Deserialize;

use crate::updater::{UpdaterConfig, WireEncoding, DEFAULT_WRITE_TIMEOUT_MS};

/// Directory searched for strips tables when none is configured
pub const DEFAULT_LAYOUT_DIRECTORY: &str = "config";

/// Settings errors
#[derive(Debug)]
pub enum SettingsError {
    /// Document is not valid TOML or has unexpected keys
    Toml(toml::de::Error),
    /// Write timeout must be at least 1 ms
    InvalidTimeout,
}

impl From<toml::de::Error> for SettingsError {
    fn from(e: toml::de::Error) -> Self {
        SettingsError::Toml(e)
    }
}

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkSettings {
    /// On-wire form of the command stream
    pub encoding: WireEncoding,
    /// Upper bound on waiting for the link to accept a batch
    pub write_timeout_ms: u64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            encoding: WireEncoding::Hex,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
        }
    }
}

impl LinkSettings {
    /// Updater configuration for these settings
    pub fn updater_config(&self) -> UpdaterConfig {
        UpdaterConfig {
            encoding: self.encoding,
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }
}

/// Layout source settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSettings {
    /// Directory holding `strips-<id>.csv` files
    pub directory: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            directory: String::from(DEFAULT_LAYOUT_DIRECTORY),
        }
    }
}

/// Complete host settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Serial link
    pub link: LinkSettings,
    /// Layout source
    pub layout: LayoutSettings,
}

/// Parse a settings document
pub fn parse_settings(input: &str) -> Result<Settings, SettingsError> {
    let settings: Settings = toml::from_str(input)?;
    if settings.link.write_timeout_ms == 0 {
        return Err(SettingsError::InvalidTimeout);
    }
    Ok(settings)
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.layout.directory, "config");
        assert_eq!(settings.link.encoding, WireEncoding::Hex);
        assert_eq!(settings.link.updater_config(), UpdaterConfig::default());
    }

    #[test]
    fn test_full_document() {
        let settings = parse_settings(
            r#"
            [link]
            encoding = "binary"
            write_timeout_ms = 250

            [layout]
            directory = "/etc/bindicator"
            "#,
        )
        .unwrap();

        let config = settings.link.updater_config();
        assert_eq!(config.encoding, WireEncoding::Binary);
        assert_eq!(config.write_timeout, Duration::from_millis(250));
        assert_eq!(settings.layout.directory, "/etc/bindicator");
    }

    #[test]
    fn test_unknown_encoding() {
        let result = parse_settings("[link]\nencoding = \"base64\"\n");
        assert!(matches!(result, Err(SettingsError::Toml(_))));
    }

    #[test]
    fn test_unknown_key() {
        let result = parse_settings("[link]\nbaud = 9600\n");
        assert!(matches!(result, Err(SettingsError::Toml(_))));
    }

    #[test]
    fn test_zero_timeout() {
        let result = parse_settings("[link]\nwrite_timeout_ms = 0\n");
        assert!(matches!(result, Err(SettingsError::InvalidTimeout)));
    }
}
