//! The loader's JSON configuration document.
//!
//! The document is fetched once per session and is read-only afterwards. Fields
//! the engine interprets (bid params, schain, cache, ...) stay as raw JSON so they
//! are forwarded exactly as the publisher wrote them.

use error_stack::{Report, ResultExt};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as Json};

use crate::error::LoaderError;

/// Deserialise a field that is present, keeping an explicit `null` as
/// `Some(Json::Null)`. Combined with `#[serde(default)]` an absent key stays `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Json>, D::Error>
where
    D: Deserializer<'de>,
{
    Json::deserialize(deserializer).map(Some)
}

/// Root configuration document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Json>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Json>,

    /// Kept raw so that a non-sequence value is reported by the ad unit
    /// builder instead of failing the whole document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_units: Option<Json>,

    /// Preset table: media type name → preset name → preset body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Json>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_config: Option<GlobalConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_management: Option<ConsentManagementConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schain: Option<Json>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<Json>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_sync: Option<Json>,

    /// The document exactly as fetched.
    #[serde(skip)]
    document: Json,
}

/// `globalConfig` section. Values are forwarded to the engine untyped.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub debug: Option<Json>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub bidder_timeout: Option<Json>,

    /// Either a named granularity (`"medium"`) or a custom bucket object.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub price_granularity: Option<Json>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub enable_send_all_bids: Option<Json>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub use_bid_cache: Option<Json>,
}

/// `consentManagement` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConsentManagementConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr: Option<Json>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usp: Option<Json>,
}

/// One entry of `adUnits` as declared in the config.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdUnitSpec {
    /// Must match a page element id for the unit to take part in an auction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Json>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bids: Option<Json>,

    /// Dotted `<type>.<preset>` reference into [`Config::media_types`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_types_ref: Option<Json>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Json>,
}

impl Config {
    /// Parse a config document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::ConfigParse`] if the text is not valid JSON or a
    /// section that must be an object is not one.
    pub fn from_json(json: &str) -> Result<Self, Report<LoaderError>> {
        Self::from_document(serde_json::from_str(json).change_context(parse_error())?)
    }

    /// Parse a config document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::ConfigParse`] under the same conditions as [`Config::from_json`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Report<LoaderError>> {
        Self::from_document(serde_json::from_slice(bytes).change_context(parse_error())?)
    }

    /// Build a config from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::ConfigParse`] if the document is not an object or a
    /// section that must be an object is not one.
    pub fn from_document(document: Json) -> Result<Self, Report<LoaderError>> {
        let mut config = Self::deserialize(&document).change_context(parse_error())?;
        config.document = document;
        Ok(config)
    }

    /// The document as fetched, including keys the loader does not interpret.
    #[must_use]
    pub fn document(&self) -> &Json {
        &self.document
    }

    /// Look up a preset body by media type and preset name. Entries that are
    /// not objects are treated as missing.
    #[must_use]
    pub fn preset(&self, media_type: &str, preset: &str) -> Option<&Map<String, Json>> {
        self.media_types
            .as_ref()?
            .get(media_type)?
            .get(preset)?
            .as_object()
    }

    /// The `{version, modules}` summary logged after a successful load.
    #[must_use]
    pub fn summary(&self) -> Json {
        let mut summary = Map::new();
        if let Some(version) = &self.version {
            summary.insert("version".to_string(), version.clone());
        }
        if let Some(modules) = &self.modules {
            summary.insert("modules".to_string(), modules.clone());
        }
        Json::Object(summary)
    }

    /// The configured `bidderTimeout` in milliseconds, if it is a positive number.
    #[must_use]
    pub fn bidder_timeout_ms(&self) -> Option<u64> {
        let timeout = self.global_config.as_ref()?.bidder_timeout.as_ref()?;
        if let Some(ms) = timeout.as_u64() {
            return Some(ms).filter(|ms| *ms > 0);
        }
        match timeout.as_f64() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(ms) if ms.is_finite() && ms >= 1.0 => Some(ms.round() as u64),
            _ => {
                if is_truthy(timeout) {
                    log::warn!("Ignoring invalid bidderTimeout: {}", timeout);
                }
                None
            }
        }
    }
}

fn parse_error() -> LoaderError {
    LoaderError::ConfigParse {
        message: "Invalid JSON in configuration document".to_string(),
    }
}

/// JSON truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
#[must_use]
pub fn is_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Json::String(s) => !s.is_empty(),
        Json::Array(_) | Json::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_document() {
        let config = Config::from_json(
            r#"{
                "version": "1.2.0",
                "modules": ["appnexusBidAdapter", "consentManagement"],
                "mediaTypes": {
                    "banner": {"leaderboard": {"sizes": [[728, 90]], "name": "Leaderboard"}}
                },
                "adUnits": [{"code": "top", "mediaTypesRef": "banner.leaderboard"}],
                "globalConfig": {"debug": false, "bidderTimeout": 1500},
                "consentManagement": {"usp": {"cmpApi": "iab"}},
                "userSync": {"syncEnabled": true}
            }"#,
        )
        .expect("should parse config");

        assert_eq!(config.version, Some(json!("1.2.0")));
        assert_eq!(config.bidder_timeout_ms(), Some(1500));
        assert!(config.preset("banner", "leaderboard").is_some());
        assert!(config.preset("banner", "skyscraper").is_none());
        assert!(config.preset("video", "leaderboard").is_none());
        assert_eq!(config.document()["userSync"], json!({"syncEnabled": true}));
        assert_eq!(
            config.summary(),
            json!({"version": "1.2.0", "modules": ["appnexusBidAdapter", "consentManagement"]})
        );
    }

    #[test]
    fn test_ad_units_kept_raw() {
        let config = Config::from_json(r#"{"adUnits": "not-a-list"}"#)
            .expect("non-sequence adUnits should still parse");
        assert_eq!(config.ad_units, Some(json!("not-a-list")));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Config::from_json("{ not json").expect_err("should fail");
        assert!(matches!(
            err.current_context(),
            LoaderError::ConfigParse { .. }
        ));
    }

    #[test]
    fn test_loose_values_still_parse() {
        let config = Config::from_json(
            r#"{
                "mediaTypes": {"banner": {"leaderboard": {"sizes": [[728, 90]]}, "retired": null}},
                "globalConfig": {"debug": 1, "enableSendAllBids": "yes", "useBidCache": null},
                "consentManagement": {"gdpr": false},
                "adUnits": [{"code": 7, "bids": {"bidder": "appnexus"}}]
            }"#,
        )
        .expect("loosely typed values should parse");

        assert!(config.preset("banner", "leaderboard").is_some());
        assert!(config.preset("banner", "retired").is_none());
        let global = config.global_config.expect("globalConfig should be kept");
        assert_eq!(global.debug, Some(json!(1)));
        assert_eq!(global.use_bid_cache, Some(Json::Null));
        assert_eq!(global.bidder_timeout, None);
    }

    #[test]
    fn test_document_is_kept_verbatim() {
        let config = Config::from_json(
            r#"{"globalConfig": {"s2sConfig": {"enabled": true}}, "consentManagement": {"gpp": {"cmpApi": "iab"}}}"#,
        )
        .expect("should parse config");

        assert_eq!(
            config.document(),
            &json!({
                "globalConfig": {"s2sConfig": {"enabled": true}},
                "consentManagement": {"gpp": {"cmpApi": "iab"}}
            })
        );
    }

    #[test]
    fn test_non_object_document_is_parse_error() {
        let err = Config::from_json("[1, 2]").expect_err("should fail");
        assert!(matches!(
            err.current_context(),
            LoaderError::ConfigParse { .. }
        ));
    }

    #[test]
    fn test_bidder_timeout_forms() {
        let timeout = |value: Json| {
            Config::from_document(json!({"globalConfig": {"bidderTimeout": value}}))
                .expect("should parse config")
                .bidder_timeout_ms()
        };
        assert_eq!(timeout(json!(1500)), Some(1500));
        assert_eq!(timeout(json!(1500.0)), Some(1500));
        assert_eq!(timeout(json!(0)), None);
        assert_eq!(timeout(json!(-5)), None);
        assert_eq!(timeout(json!("fast")), None);
        assert_eq!(timeout(Json::Null), None);
    }

    #[test]
    fn test_zero_timeout_is_unset() {
        let config = Config::from_json(r#"{"globalConfig": {"bidderTimeout": 0}}"#)
            .expect("should parse config");
        assert_eq!(config.bidder_timeout_ms(), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("medium")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!(2.5)));
    }
}
