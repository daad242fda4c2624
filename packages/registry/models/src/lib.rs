#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative catalog definition types.
//!
//! Defines the TOML schema for one province's entry in the hierarchy
//! catalog: the province itself, its districts (kabupaten/kota), and for
//! each district the ordered list of subdistrict (kecamatan) files plus an
//! optional district-level fallback file.

use serde::{Deserialize, Serialize};

/// A province entry, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceConfig {
    /// Two-digit province code (e.g., `"51"`).
    pub id: String,
    /// Display name (e.g., "Bali").
    pub name: String,
    /// Base directory of the province's data (e.g., `"/data/id51_bali"`).
    pub path: String,
    /// File holding every district polygon of the province. When absent the
    /// national districts file is filtered instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub districts_file: Option<String>,
    /// Districts in catalog order.
    #[serde(default)]
    pub districts: Vec<DistrictConfig>,
}

impl ProvinceConfig {
    /// Returns the district with the given 4-digit code.
    #[must_use]
    pub fn district(&self, id: &str) -> Option<&DistrictConfig> {
        self.districts.iter().find(|d| d.id == id)
    }
}

/// A district entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictConfig {
    /// Four-digit district code; the first two digits are the province code.
    pub id: String,
    /// Display name (e.g., "Badung").
    pub name: String,
    /// UUID some source files use instead of the government code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Legacy or alternate identifiers seen in source files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_ids: Vec<String>,
    /// Base directory of this district's subdistrict files.
    pub path: String,
    /// Subdistrict files, in load order.
    #[serde(default)]
    pub subdistricts: Vec<SubdistrictFile>,
    /// District-level polygon file (relative to `path`) used when no
    /// subdistrict file loads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_file: Option<String>,
}

impl DistrictConfig {
    /// The owning province's code, taken from the first two digits of `id`.
    #[must_use]
    pub fn province_id(&self) -> &str {
        self.id.get(..2).unwrap_or(&self.id)
    }

    /// Whether `candidate` is one of this district's identifiers (code,
    /// UUID or alternate id), compared exactly.
    #[must_use]
    pub fn has_identifier(&self, candidate: &str) -> bool {
        self.id == candidate
            || self.uuid.as_deref() == Some(candidate)
            || self.alternative_ids.iter().any(|alt| alt == candidate)
    }

    /// Path of one subdistrict file.
    #[must_use]
    pub fn subdistrict_path(&self, file: &SubdistrictFile) -> String {
        format!("{}/{}.geojson", self.path, file.id)
    }

    /// Path of the fallback file, if configured.
    #[must_use]
    pub fn fallback_path(&self) -> Option<String> {
        self.fallback_file
            .as_ref()
            .map(|file| format!("{}/{file}", self.path))
    }
}

/// One subdistrict file reference.
///
/// In TOML either a bare file id (`"id5103010_kuta_selatan"`) or a table
/// with an explicit display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SubdistrictRepr", into = "SubdistrictRepr")]
pub struct SubdistrictFile {
    /// File stem, `id<code>_<slug>`.
    pub id: String,
    /// Display name overriding the one derived from `id`.
    pub name: Option<String>,
}

impl SubdistrictFile {
    /// A file reference without an explicit name.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SubdistrictRepr {
    Id(String),
    Named { id: String, name: Option<String> },
}

impl From<SubdistrictRepr> for SubdistrictFile {
    fn from(repr: SubdistrictRepr) -> Self {
        match repr {
            SubdistrictRepr::Id(id) => Self::new(id),
            SubdistrictRepr::Named { id, name } => Self { id, name },
        }
    }
}

impl From<SubdistrictFile> for SubdistrictRepr {
    fn from(file: SubdistrictFile) -> Self {
        match file.name {
            None => Self::Id(file.id),
            name @ Some(_) => Self::Named { id: file.id, name },
        }
    }
}
