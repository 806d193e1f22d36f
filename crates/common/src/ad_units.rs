//! Conversion of config ad unit declarations into engine ad units.

use serde::Serialize;
use serde_json::Value as Json;

use crate::error::{MediaTypeError, MissingAdUnits};
use crate::media_types::{resolve_media_types, MediaTypes};
use crate::prebid_config::{is_truthy, AdUnitSpec, Config};

/// Ad unit in the shape the bidding engine expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdUnit {
    pub code: String,
    /// Forwarded as declared; an empty sequence when the config gives none.
    pub bids: Json,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_types: Option<MediaTypes>,
}

/// Element id form of a declared code. Numbers and other scalars are
/// stringified; a missing code is empty.
fn code_from_json(code: Option<Json>) -> String {
    match code {
        Some(Json::String(code)) => code,
        Some(Json::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl AdUnit {
    fn from_spec(spec: AdUnitSpec, config: &Config) -> Self {
        let code = code_from_json(spec.code);

        let media_types = match spec.media_types_ref {
            Some(Json::String(reference)) if !reference.is_empty() => {
                match resolve_media_types(&reference, config) {
                    Ok(resolved) => Some(MediaTypes::Preset(resolved)),
                    Err(e) => {
                        log::warn!("{} (ad unit '{}')", e, code);
                        None
                    }
                }
            }
            Some(reference) if is_truthy(&reference) => {
                log::warn!(
                    "{} (ad unit '{}')",
                    MediaTypeError::MalformedReference {
                        reference: reference.to_string()
                    },
                    code
                );
                None
            }
            _ => spec.media_types.filter(is_truthy).map(MediaTypes::Inline),
        };

        Self {
            code,
            bids: spec
                .bids
                .filter(is_truthy)
                .unwrap_or_else(|| Json::Array(Vec::new())),
            media_types,
        }
    }
}

/// Read the raw `adUnits` sequence.
///
/// # Errors
///
/// Returns [`MissingAdUnits`] if the key is absent or not a sequence.
fn ad_unit_entries(config: &Config) -> Result<&[Json], MissingAdUnits> {
    config
        .ad_units
        .as_ref()
        .and_then(Json::as_array)
        .map(Vec::as_slice)
        .ok_or(MissingAdUnits)
}

/// Build engine ad units from the config, preserving declaration order.
///
/// A missing or malformed `adUnits` list is logged and yields no units.
/// Entries that are not objects are skipped.
#[must_use]
pub fn build_ad_units(config: &Config) -> Vec<AdUnit> {
    let entries = match ad_unit_entries(config) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("{}", e);
            return Vec::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .filter_map(
            |(index, entry)| match serde_json::from_value::<AdUnitSpec>(entry.clone()) {
                Ok(spec) => Some(AdUnit::from_spec(spec, config)),
                Err(e) => {
                    log::warn!("Skipping malformed ad unit at index {}: {}", index, e);
                    None
                }
            },
        )
        .collect()
}
