#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the wilayah server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the registry types so the API contract can evolve independently.

use serde::{Deserialize, Serialize};
use wilayah_registry::locator::LocatedDistrict;
use wilayah_registry_models::{DistrictConfig, ProvinceConfig};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// A province as listed by `GET /api/provinces`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProvinceSummary {
    /// 2-digit province code.
    pub id: String,
    pub name: String,
    /// Number of registered districts.
    pub district_count: usize,
}

impl From<&ProvinceConfig> for ApiProvinceSummary {
    fn from(province: &ProvinceConfig) -> Self {
        Self {
            id: province.id.clone(),
            name: province.name.clone(),
            district_count: province.districts.len(),
        }
    }
}

/// A registered district with its resolved file paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDistrict {
    /// Canonical 4-digit code.
    pub id: String,
    pub name: String,
    /// Owning province code.
    pub province_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_ids: Vec<String>,
    /// Subdistrict file paths, in load order.
    pub subdistrict_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_file: Option<String>,
}

impl From<&DistrictConfig> for ApiDistrict {
    fn from(district: &DistrictConfig) -> Self {
        Self {
            id: district.id.clone(),
            name: district.name.clone(),
            province_id: district.province_id().to_string(),
            uuid: district.uuid.clone(),
            alternative_ids: district.alternative_ids.clone(),
            subdistrict_files: district
                .subdistricts
                .iter()
                .map(|f| district.subdistrict_path(f))
                .collect(),
            fallback_file: district.fallback_path(),
        }
    }
}

/// Response of `POST /api/resolve/district`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResolvedDistrict {
    pub name: String,
    /// Registry code when registered, otherwise the best-effort raw value.
    pub canonical_id: String,
    pub registered: bool,
}

impl From<LocatedDistrict> for ApiResolvedDistrict {
    fn from(located: LocatedDistrict) -> Self {
        Self {
            name: located.name,
            canonical_id: located.canonical_id,
            registered: located.registered,
        }
    }
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
