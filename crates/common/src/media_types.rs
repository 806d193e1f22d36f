//! Resolution of `mediaTypesRef` references against the config preset table.
//!
//! Banner presets forward only `sizes`; video presets forward every field.

use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::error::MediaTypeError;
use crate::prebid_config::Config;

/// Media types attached to a resolved ad unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MediaTypes {
    /// Produced from a named preset.
    Preset(PresetMediaType),
    /// Inline `mediaTypes` object passed through unchanged.
    Inline(Json),
}

/// Bid request fragment produced from a preset. Serialises as
/// `{"banner": {...}}` or `{"video": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetMediaType {
    Banner(BannerMediaType),
    Video(Map<String, Json>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BannerMediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Json>,
}

/// Split a reference into `(type, preset)`.
///
/// Exactly one dot is required.
fn split_reference(reference: &str) -> Option<(&str, &str)> {
    let mut parts = reference.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(media_type), Some(preset), None) => Some((media_type, preset)),
        _ => None,
    }
}

/// Resolve a dotted `<type>.<preset>` reference.
///
/// # Errors
///
/// - [`MediaTypeError::MalformedReference`] if the reference is empty or does
///   not have exactly two segments
/// - [`MediaTypeError::MissingPreset`] if the config has no such preset
/// - [`MediaTypeError::UnsupportedType`] if the type is neither `banner` nor `video`
pub fn resolve_media_types(
    reference: &str,
    config: &Config,
) -> Result<PresetMediaType, MediaTypeError> {
    let (media_type, preset_name) =
        split_reference(reference).ok_or_else(|| MediaTypeError::MalformedReference {
            reference: reference.to_string(),
        })?;

    let preset =
        config
            .preset(media_type, preset_name)
            .ok_or_else(|| MediaTypeError::MissingPreset {
                reference: reference.to_string(),
            })?;

    match media_type {
        "banner" => Ok(PresetMediaType::Banner(BannerMediaType {
            sizes: preset.get("sizes").cloned(),
        })),
        "video" => Ok(PresetMediaType::Video(preset.clone())),
        _ => Err(MediaTypeError::UnsupportedType {
            reference: reference.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn preset_config() -> Config {
        Config::from_json(
            r#"{
                "mediaTypes": {
                    "banner": {
                        "leaderboard": {"sizes": [[728, 90], [970, 90]], "pos": 1, "label": "top"},
                        "unsized": {"pos": 3}
                    },
                    "video": {
                        "outstream": {
                            "context": "outstream",
                            "playerSize": [[640, 480]],
                            "mimes": ["video/mp4"],
                            "protocols": [2, 3, 5, 6]
                        }
                    },
                    "native": {
                        "article": {"title": {"required": true}}
                    }
                }
            }"#,
        )
        .expect("should parse preset config")
    }

    #[test]
    fn test_banner_forwards_only_sizes() {
        let resolved = resolve_media_types("banner.leaderboard", &preset_config())
            .expect("should resolve banner preset");

        assert_eq!(
            serde_json::to_value(&resolved).expect("should serialize"),
            json!({"banner": {"sizes": [[728, 90], [970, 90]]}})
        );
    }

    #[test]
    fn test_banner_without_sizes_forwards_nothing_else() {
        let resolved = resolve_media_types("banner.unsized", &preset_config())
            .expect("should resolve banner preset");

        assert_eq!(
            serde_json::to_value(&resolved).expect("should serialize"),
            json!({"banner": {}})
        );
    }

    #[test]
    fn test_video_forwards_every_field() {
        let resolved = resolve_media_types("video.outstream", &preset_config())
            .expect("should resolve video preset");

        assert_eq!(
            serde_json::to_value(&resolved).expect("should serialize"),
            json!({"video": {
                "context": "outstream",
                "playerSize": [[640, 480]],
                "mimes": ["video/mp4"],
                "protocols": [2, 3, 5, 6]
            }})
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let config = preset_config();
        let first = resolve_media_types("video.outstream", &config);
        let second = resolve_media_types("video.outstream", &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_references() {
        let config = preset_config();
        for reference in ["banner", "", "banner.leaderboard.extra", "a.b.c.d"] {
            assert_eq!(
                resolve_media_types(reference, &config),
                Err(MediaTypeError::MalformedReference {
                    reference: reference.to_string()
                }),
                "reference {reference:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_missing_presets() {
        let config = preset_config();
        for reference in ["banner.skyscraper", "audio.jingle", "video.leaderboard"] {
            assert_eq!(
                resolve_media_types(reference, &config),
                Err(MediaTypeError::MissingPreset {
                    reference: reference.to_string()
                })
            );
        }
    }

    #[test]
    fn test_missing_preset_table() {
        let config = Config::default();
        assert!(matches!(
            resolve_media_types("banner.leaderboard", &config),
            Err(MediaTypeError::MissingPreset { .. })
        ));
    }

    #[test]
    fn test_unsupported_type() {
        assert_eq!(
            resolve_media_types("native.article", &preset_config()),
            Err(MediaTypeError::UnsupportedType {
                reference: "native.article".to_string()
            })
        );
    }
}
