#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative boundary feature collection and load result types.
//!
//! A [`FeatureCollection`] is an ordered list of `GeoJSON` features tagged
//! with the [`AdminLevel`] it represents and, optionally, the identifier of
//! the parent area it was filtered to. Feature geometry is carried through
//! untouched; only the property bags are ever inspected.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use geojson::{Feature, JsonObject, JsonValue};

/// Foreign member holding the collection's [`AdminLevel`] when serialized
/// as a `GeoJSON` `FeatureCollection`.
pub const LEVEL_MEMBER: &str = "adminLevel";

/// Foreign member holding the collection's parent identifier.
pub const PARENT_MEMBER: &str = "parentId";

static EMPTY_PROPERTIES: LazyLock<JsonObject> = LazyLock::new(JsonObject::new);

/// Depth of the drill-down hierarchy, from the whole country down to a
/// single subdistrict (kecamatan).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdminLevel {
    /// Whole-country view (no area selected).
    Country,
    /// Province (provinsi).
    Province,
    /// District (kabupaten/kota).
    District,
    /// Subdistrict (kecamatan).
    Subdistrict,
}

impl AdminLevel {
    /// All levels, outermost first.
    pub const ALL: &[Self] = &[
        Self::Country,
        Self::Province,
        Self::District,
        Self::Subdistrict,
    ];

    /// The next level down, if any.
    #[must_use]
    pub const fn child(self) -> Option<Self> {
        match self {
            Self::Country => Some(Self::Province),
            Self::Province => Some(Self::District),
            Self::District => Some(Self::Subdistrict),
            Self::Subdistrict => None,
        }
    }

    /// The next level up, if any.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Country => None,
            Self::Province => Some(Self::Country),
            Self::District => Some(Self::Province),
            Self::Subdistrict => Some(Self::District),
        }
    }
}

/// A single boundary polygon.
///
/// Property keys are not standardized across source files. Once loaded a
/// record is only ever enriched with additional keys, never mutated.
pub type FeatureRecord = Feature;

/// Returns the property bag of a feature, or an empty bag when the feature
/// has none.
#[must_use]
pub fn properties_of(feature: &Feature) -> &JsonObject {
    feature.properties.as_ref().unwrap_or(&EMPTY_PROPERTIES)
}

/// An ordered sequence of features at one [`AdminLevel`].
///
/// Serializes as a standard `GeoJSON` `FeatureCollection` whose foreign
/// members carry the level and parent identifier, so rendering clients can
/// consume it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "geojson::FeatureCollection",
    try_from = "geojson::FeatureCollection"
)]
pub struct FeatureCollection {
    /// Level the features represent.
    pub level: AdminLevel,
    /// Identifier of the area the collection was filtered to
    /// (province code for districts, district code for subdistricts).
    pub parent_id: Option<String>,
    /// Features in load order.
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Creates a collection from already-loaded features.
    #[must_use]
    pub const fn new(level: AdminLevel, parent_id: Option<String>, features: Vec<Feature>) -> Self {
        Self {
            level,
            parent_id,
            features,
        }
    }

    /// Creates an explicitly empty collection.
    ///
    /// Used wherever a load failed, so renderers can tell "selected but
    /// failed" apart from "nothing selected".
    #[must_use]
    pub const fn empty(level: AdminLevel) -> Self {
        Self::new(level, None, Vec::new())
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates the features in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

impl From<FeatureCollection> for geojson::FeatureCollection {
    fn from(collection: FeatureCollection) -> Self {
        let mut members = JsonObject::new();
        members.insert(
            LEVEL_MEMBER.to_string(),
            JsonValue::String(collection.level.to_string()),
        );
        if let Some(parent) = collection.parent_id {
            members.insert(PARENT_MEMBER.to_string(), JsonValue::String(parent));
        }

        Self {
            bbox: None,
            features: collection.features,
            foreign_members: Some(members),
        }
    }
}

impl TryFrom<geojson::FeatureCollection> for FeatureCollection {
    type Error = InvalidCollectionError;

    fn try_from(collection: geojson::FeatureCollection) -> Result<Self, Self::Error> {
        let members = collection.foreign_members.unwrap_or_default();

        let level = members
            .get(LEVEL_MEMBER)
            .and_then(JsonValue::as_str)
            .ok_or(InvalidCollectionError::MissingLevel)?;
        let level = level
            .parse::<AdminLevel>()
            .map_err(|_| InvalidCollectionError::UnknownLevel(level.to_string()))?;

        let parent_id = members
            .get(PARENT_MEMBER)
            .and_then(JsonValue::as_str)
            .map(String::from);

        Ok(Self::new(level, parent_id, collection.features))
    }
}

/// Error returned when a `GeoJSON` document cannot be read back as a
/// tagged [`FeatureCollection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidCollectionError {
    /// The `adminLevel` foreign member is absent.
    MissingLevel,
    /// The `adminLevel` foreign member names no known level.
    UnknownLevel(String),
}

impl std::fmt::Display for InvalidCollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLevel => write!(f, "feature collection has no {LEVEL_MEMBER} member"),
            Self::UnknownLevel(level) => write!(f, "unknown admin level: {level}"),
        }
    }
}

impl std::error::Error for InvalidCollectionError {}

/// Outcome of assembling the subdistrict collection for one district.
///
/// `loaded_count == Some(0)` together with `success == true` signals that
/// the district-level fallback file was served instead of subdistricts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    /// Whether any usable data was produced.
    pub success: bool,
    /// The merged collection, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<FeatureCollection>,
    /// Human-readable failure description, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Files that yielded at least one feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_count: Option<usize>,
    /// Files attempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

impl LoadResult {
    /// A successful load.
    #[must_use]
    pub const fn loaded(data: FeatureCollection, loaded_count: usize, total_count: usize) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            loaded_count: Some(loaded_count),
            total_count: Some(total_count),
        }
    }

    /// A failure that happened before any file was attempted.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            loaded_count: None,
            total_count: None,
        }
    }

    /// A failure after every configured file was attempted.
    #[must_use]
    pub fn exhausted(error: impl Into<String>, total_count: usize) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            loaded_count: Some(0),
            total_count: Some(total_count),
        }
    }

    /// Whether the data came from the district-level fallback file.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.success && matches!(self.loaded_count, Some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(name: &str) -> Feature {
        let mut props = JsonObject::new();
        props.insert("name".to_string(), JsonValue::String(name.to_string()));
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: Some(props),
            foreign_members: None,
        }
    }

    #[test]
    fn level_navigation() {
        assert_eq!(AdminLevel::Country.child(), Some(AdminLevel::Province));
        assert_eq!(AdminLevel::Subdistrict.child(), None);
        assert_eq!(AdminLevel::District.parent(), Some(AdminLevel::Province));
        assert_eq!(AdminLevel::Country.parent(), None);
    }

    #[test]
    fn level_string_forms() {
        assert_eq!(AdminLevel::Subdistrict.to_string(), "subdistrict");
        assert_eq!("district".parse::<AdminLevel>(), Ok(AdminLevel::District));
        assert!("regency".parse::<AdminLevel>().is_err());
    }

    #[test]
    fn serializes_as_geojson_with_level_members() {
        let collection = FeatureCollection::new(
            AdminLevel::Subdistrict,
            Some("5103".to_string()),
            vec![feature("Kuta")],
        );
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["adminLevel"], "subdistrict");
        assert_eq!(json["parentId"], "5103");
        assert_eq!(json["features"][0]["properties"]["name"], "Kuta");
    }

    #[test]
    fn reads_back_tagged_collection() {
        let collection = FeatureCollection::new(
            AdminLevel::District,
            Some("51".to_string()),
            vec![feature("Badung"), feature("Gianyar")],
        );
        let text = serde_json::to_string(&collection).unwrap();
        let parsed: FeatureCollection = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, collection);
    }

    #[test]
    fn rejects_untagged_geojson() {
        let text = r#"{"type":"FeatureCollection","features":[]}"#;
        let err = serde_json::from_str::<FeatureCollection>(text).unwrap_err();
        assert!(err.to_string().contains("adminLevel"));
    }

    #[test]
    fn empty_collection_is_distinct_from_absent() {
        let empty = FeatureCollection::empty(AdminLevel::Subdistrict);
        assert!(empty.is_empty());
        assert_eq!(empty.parent_id, None);
    }

    #[test]
    fn properties_of_missing_bag_is_empty() {
        let mut f = feature("x");
        f.properties = None;
        assert!(properties_of(&f).is_empty());
    }

    #[test]
    fn load_result_serializes_camel_case() {
        let result = LoadResult::exhausted("nothing loaded", 6);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["loadedCount"], 0);
        assert_eq!(json["totalCount"], 6);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn degraded_only_when_fallback_served() {
        let data = FeatureCollection::empty(AdminLevel::District);
        assert!(LoadResult::loaded(data.clone(), 0, 4).is_degraded());
        assert!(!LoadResult::loaded(data, 3, 4).is_degraded());
        assert!(!LoadResult::failed("no configuration").is_degraded());
    }
}
