//! Settings for the loader itself.
//!
//! Loaded from TOML and merged with environment variables prefixed with
//! `PREBID_LOADER__`, e.g. `PREBID_LOADER__LOADER__CONFIG_URL` overrides
//! `loader.config_url`.

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::LoaderError;

pub const ENVIRONMENT_PREFIX: &str = "PREBID_LOADER";

const DEFAULT_SETTINGS_TOML: &str = include_str!("../../../prebid-loader.toml");

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LoaderConfig {
    /// Config document location, relative to the page's base URL or absolute.
    #[validate(length(min = 1))]
    #[serde(default = "default_config_url")]
    pub config_url: String,

    /// Auction timeout used when the config sets no `bidderTimeout`.
    #[validate(range(min = 1))]
    #[serde(default = "default_fallback_timeout_ms")]
    pub fallback_timeout_ms: u64,

    /// Upper bound hosts may apply to a whole session.
    #[validate(range(min = 1))]
    #[serde(default = "default_failsafe_timeout_ms")]
    pub failsafe_timeout_ms: u64,

    #[serde(default = "default_console_prefix")]
    pub console_prefix: String,
}

fn default_config_url() -> String {
    "prebid-config.json".to_string()
}

fn default_fallback_timeout_ms() -> u64 {
    3000
}

fn default_failsafe_timeout_ms() -> u64 {
    5000
}

fn default_console_prefix() -> String {
    "[Prebid Loader]".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            config_url: default_config_url(),
            fallback_timeout_ms: default_fallback_timeout_ms(),
            failsafe_timeout_ms: default_failsafe_timeout_ms(),
            console_prefix: default_console_prefix(),
        }
    }
}

/// Ids of the fixed page controls.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct PageIds {
    #[validate(length(min = 1))]
    pub status: String,
    #[validate(length(min = 1))]
    pub debug_output: String,
    #[validate(length(min = 1))]
    pub refresh_button: String,
    #[validate(length(min = 1))]
    pub show_config_button: String,
    #[validate(length(min = 1))]
    pub config_display: String,
    #[validate(length(min = 1))]
    pub config_json: String,
}

impl Default for PageIds {
    fn default() -> Self {
        Self {
            status: "status".to_string(),
            debug_output: "debugOutput".to_string(),
            refresh_button: "refreshBids".to_string(),
            show_config_button: "showConfig".to_string(),
            config_display: "configDisplay".to_string(),
            config_json: "configJson".to_string(),
        }
    }
}

/// Creative frame size used when a bid carries no dimensions.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct RenderConfig {
    #[validate(range(min = 1))]
    pub default_width: u32,
    #[validate(range(min = 1))]
    pub default_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_width: 300,
            default_height: 250,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    #[serde(default)]
    pub loader: LoaderConfig,
    #[validate(nested)]
    #[serde(default)]
    pub page: PageIds,
    #[validate(nested)]
    #[serde(default)]
    pub render: RenderConfig,
}

impl Settings {
    /// Load the embedded default settings merged with the environment.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Configuration`] if the merged settings are invalid.
    pub fn new() -> Result<Self, Report<LoaderError>> {
        Self::from_toml(DEFAULT_SETTINGS_TOML)
    }

    /// Parse settings from TOML merged with the environment.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Configuration`] if the TOML is malformed, a value
    /// has the wrong type, or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<LoaderError>> {
        let environment = Environment::default()
            .prefix(ENVIRONMENT_PREFIX)
            .separator("__")
            .try_parsing(true);

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(LoaderError::Configuration {
                message: "Failed to build loader settings".to_string(),
            })?;

        let settings: Self = config
            .try_deserialize()
            .change_context(LoaderError::Configuration {
                message: "Failed to deserialize loader settings".to_string(),
            })?;

        settings.validate().map_err(|e| {
            Report::new(LoaderError::Configuration {
                message: format!("Settings validation failed: {e}"),
            })
        })?;

        Ok(settings)
    }
}
