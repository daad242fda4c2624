//! Body validation and feature extraction.

use geojson::Feature;

use crate::LoaderError;

const HTML_MARKERS: &[&str] = &["<!doctype", "<html"];

/// Whether a response body is an HTML document rather than JSON.
#[must_use]
pub fn looks_like_html(body: &str) -> bool {
    let trimmed = body.trim_start();
    HTML_MARKERS.iter().any(|marker| {
        trimmed
            .get(..marker.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(marker))
    })
}

/// Drops a stray `f` directly before the opening brace, seen at the start
/// of some exported national files.
#[must_use]
pub fn strip_stray_prefix(body: &str) -> &str {
    let trimmed = body.trim_start();
    match trimmed.strip_prefix('f') {
        Some(rest) if rest.starts_with('{') => rest,
        _ => trimmed,
    }
}

/// Parses a `GeoJSON` `FeatureCollection` body into its features.
///
/// Individual features that are not valid `GeoJSON` are dropped with a
/// warning.
///
/// # Errors
///
/// Returns [`LoaderError::Html`] for an HTML body, [`LoaderError::Json`]
/// for malformed JSON, [`LoaderError::InvalidDocument`] when there is no
/// `features` array, and [`LoaderError::NoFeatures`] when no feature
/// survives.
pub fn parse_features(path: &str, body: &str) -> Result<Vec<Feature>, LoaderError> {
    if looks_like_html(body) {
        return Err(LoaderError::Html {
            path: path.to_string(),
        });
    }

    let mut document: serde_json::Value = serde_json::from_str(strip_stray_prefix(body))?;

    let raw = match document.get_mut("features").map(serde_json::Value::take) {
        Some(serde_json::Value::Array(raw)) => raw,
        Some(_) => {
            return Err(LoaderError::InvalidDocument {
                path: path.to_string(),
                message: "features is not an array".to_string(),
            });
        }
        None => {
            return Err(LoaderError::InvalidDocument {
                path: path.to_string(),
                message: "no features array".to_string(),
            });
        }
    };

    let features: Vec<Feature> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match Feature::from_json_value(value) {
            Ok(feature) => Some(feature),
            Err(e) => {
                log::warn!("Dropping feature {i} of {path}: {e}");
                None
            }
        })
        .collect();

    if features.is_empty() {
        return Err(LoaderError::NoFeatures {
            path: path.to_string(),
        });
    }
    Ok(features)
}
