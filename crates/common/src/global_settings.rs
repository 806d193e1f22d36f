//! Projection of config fields into the engine's global settings.

use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::prebid_config::{is_truthy, Config};

/// Engine global settings. Keys absent from the config are omitted, never
/// defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bidder_timeout: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_granularity: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_send_all_bids: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_bid_cache: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_management: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schain: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<Json>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_sync: Option<Json>,
}

fn truthy(value: Option<&Json>) -> Option<Json> {
    value.filter(|v| is_truthy(v)).cloned()
}

/// Map the recognised config fields onto [`GlobalSettings`].
///
/// `debug`, `enableSendAllBids` and `useBidCache` are copied whenever present,
/// including `false` and `null`. The remaining keys are copied only when truthy.
///
/// Consent: a truthy GDPR value becomes `consentManagement` as a whole and a
/// truthy USP value is added to it as the `usp` field. A USP-only config
/// therefore yields `{usp: ...}`.
#[must_use]
pub fn map_global_settings(config: &Config) -> GlobalSettings {
    let mut settings = GlobalSettings::default();

    if let Some(global) = &config.global_config {
        settings.debug.clone_from(&global.debug);
        settings.bidder_timeout = truthy(global.bidder_timeout.as_ref());
        settings.price_granularity = truthy(global.price_granularity.as_ref());
        settings
            .enable_send_all_bids
            .clone_from(&global.enable_send_all_bids);
        settings.use_bid_cache.clone_from(&global.use_bid_cache);
    }

    if let Some(consent) = &config.consent_management {
        settings.consent_management = truthy(consent.gdpr.as_ref());
        if let Some(usp) = truthy(consent.usp.as_ref()) {
            match settings
                .consent_management
                .get_or_insert_with(|| Json::Object(Map::new()))
            {
                Json::Object(consent_management) => {
                    consent_management.insert("usp".to_string(), usp);
                }
                other => log::warn!("Cannot attach usp to non-object gdpr config: {}", other),
            }
        }
    }

    settings.schain = truthy(config.schain.as_ref());
    settings.cache = truthy(config.cache.as_ref());
    settings.user_sync = truthy(config.user_sync.as_ref());

    settings
}
