//! Offline resolution of a config document.

use std::fs;
use std::path::Path;

use prebid_loader_common::ad_units::build_ad_units;
use prebid_loader_common::global_settings::map_global_settings;
use prebid_loader_common::prebid_config::Config;
use serde_json::{json, Value as Json};

use crate::error::CliError;

/// Global settings and ad units the loader would hand the engine.
///
/// # Errors
///
/// Returns [`CliError::Config`] if the document does not parse.
pub fn resolve_document(document: &str) -> Result<Json, CliError> {
    let config = Config::from_json(document)?;
    let ad_units = build_ad_units(&config);

    Ok(json!({
        "globalSettings": map_global_settings(&config),
        "adUnits": ad_units,
    }))
}

/// Print the resolved form of a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn resolve_file(file: &Path, verbose: bool) -> Result<(), CliError> {
    let content = fs::read_to_string(file)?;

    if verbose {
        log::info!("Resolving config from: {}", file.display());
    }

    let resolved = resolve_document(&content)?;
    let output = serde_json::to_string_pretty(&resolved)
        .map_err(|e| CliError::Config(format!("Failed to serialize JSON: {}", e)))?;

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"{
        "mediaTypes": {"banner": {"leaderboard": {"sizes": [[728, 90]], "label": "lb"}}},
        "adUnits": [
            {"code": "top", "mediaTypesRef": "banner.leaderboard", "bids": [{"bidder": "appnexus"}]},
            {"code": "broken", "mediaTypesRef": "banner.skyscraper"}
        ],
        "globalConfig": {"bidderTimeout": 1200, "useBidCache": false},
        "consentManagement": {"gdpr": {"cmpApi": "iab"}, "usp": {"timeout": 50}}
    }"#;

    #[test]
    fn test_resolve_document() {
        let resolved = resolve_document(CONFIG).expect("should resolve");

        assert_eq!(
            resolved,
            json!({
                "globalSettings": {
                    "bidderTimeout": 1200,
                    "useBidCache": false,
                    "consentManagement": {"cmpApi": "iab", "usp": {"timeout": 50}}
                },
                "adUnits": [
                    {"code": "top", "bids": [{"bidder": "appnexus"}],
                     "mediaTypes": {"banner": {"sizes": [[728, 90]]}}},
                    {"code": "broken", "bids": []}
                ]
            })
        );
    }

    #[test]
    fn test_resolve_invalid_document() {
        let err = resolve_document("{").expect_err("should fail");
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_resolve_file() {
        let mut file = NamedTempFile::new().expect("should create temp file");
        file.write_all(CONFIG.as_bytes())
            .expect("should write config");

        assert!(resolve_file(file.path(), false).is_ok());
        assert!(resolve_file(Path::new("/nonexistent/config.json"), false).is_err());
    }
}
