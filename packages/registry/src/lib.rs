#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only province → district → subdistrict catalog.
//!
//! The [`HierarchyRegistry`] is assembled once at startup from the embedded
//! province definitions (see [`catalog`]), optionally merged with TOML
//! files from a directory, and validated. Lookups accept government codes,
//! UUIDs, alternate ids or free-text names.

pub mod catalog;
pub mod locator;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;
use wilayah_registry_models::{DistrictConfig, ProvinceConfig};

/// Environment variable naming a directory of extra province TOML files.
pub const REGISTRY_DIR_ENV: &str = "WILAYAH_REGISTRY_DIR";

/// Errors that can occur while assembling a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// I/O error reading a definition directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A definition file is not valid TOML for the schema.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// The catalog violates a structural invariant.
    #[error("Invalid registry: {message}")]
    Invalid {
        /// Which invariant was violated, and where.
        message: String,
    },
}

/// Lower-cases, strips diacritics and drops everything but ASCII letters
/// and digits, so `"Karang Asem"`, `"karang_asem"` and `"KARANGASEM"` all
/// compare equal.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .nfkd()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

fn is_code(candidate: &str, len: usize) -> bool {
    candidate.len() == len && candidate.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone)]
struct DistrictEntry {
    province: String,
    index: usize,
    normalized_name: String,
}

/// The assembled catalog.
#[derive(Debug, Clone)]
pub struct HierarchyRegistry {
    provinces: BTreeMap<String, ProvinceConfig>,
    /// Every district in iteration order (province code, then catalog
    /// order within the province).
    entries: Vec<DistrictEntry>,
}

impl HierarchyRegistry {
    /// Builds and validates a registry from province definitions.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Invalid`] if a province or district code is
    /// malformed, a district code does not start with its province code,
    /// or a province or district code appears twice.
    pub fn new(provinces: Vec<ProvinceConfig>) -> Result<Self, RegistryError> {
        let mut by_id = BTreeMap::new();
        for province in provinces {
            if !is_code(&province.id, 2) {
                return Err(invalid(format!(
                    "province id '{}' is not a 2-digit code",
                    province.id
                )));
            }
            let id = province.id.clone();
            if by_id.insert(id.clone(), province).is_some() {
                return Err(invalid(format!("province {id} is defined twice")));
            }
        }

        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();
        for (province_id, province) in &by_id {
            for (index, district) in province.districts.iter().enumerate() {
                if !is_code(&district.id, 4) {
                    return Err(invalid(format!(
                        "district id '{}' in province {province_id} is not a 4-digit code",
                        district.id
                    )));
                }
                if district.province_id() != province_id {
                    return Err(invalid(format!(
                        "district {} is listed under province {province_id}",
                        district.id
                    )));
                }
                if !seen.insert(district.id.clone()) {
                    return Err(invalid(format!("district {} is defined twice", district.id)));
                }
                entries.push(DistrictEntry {
                    province: province_id.clone(),
                    index,
                    normalized_name: normalize_name(&district.name),
                });
            }
        }

        Ok(Self {
            provinces: by_id,
            entries,
        })
    }

    /// The registry built from the embedded catalog.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog fails to parse or validate, which is
    /// a development error caught by tests.
    #[must_use]
    pub fn embedded() -> Self {
        Self::new(catalog::embedded_provinces())
            .unwrap_or_else(|e| panic!("Embedded province catalog is invalid: {e}"))
    }

    /// The embedded catalog with every `*.toml` file in `dir` merged over
    /// it. A file whose province id is already present replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, a file fails to
    /// parse, or the merged catalog is invalid.
    pub fn with_overrides(dir: &Path) -> Result<Self, RegistryError> {
        let mut provinces: BTreeMap<String, ProvinceConfig> = catalog::embedded_provinces()
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        for province in read_province_dir(dir)? {
            if provinces.contains_key(&province.id) {
                log::info!("Province {} overridden from {}", province.id, dir.display());
            }
            provinces.insert(province.id.clone(), province);
        }

        Self::new(provinces.into_values().collect())
    }

    /// The embedded catalog, merged with [`REGISTRY_DIR_ENV`] when set.
    ///
    /// # Errors
    ///
    /// Returns an error if the override directory cannot be loaded.
    pub fn from_env() -> Result<Self, RegistryError> {
        match std::env::var(REGISTRY_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::with_overrides(Path::new(dir.trim())),
            _ => Ok(Self::embedded()),
        }
    }

    /// Provinces in code order.
    pub fn provinces(&self) -> impl Iterator<Item = &ProvinceConfig> {
        self.provinces.values()
    }

    /// Every district, in registry iteration order.
    pub fn districts(&self) -> impl Iterator<Item = &DistrictConfig> {
        self.entries.iter().map(|entry| self.district_of(entry))
    }

    /// The province with the exact 2-digit code.
    #[must_use]
    pub fn province(&self, id: &str) -> Option<&ProvinceConfig> {
        self.provinces.get(id)
    }

    fn district_of(&self, entry: &DistrictEntry) -> &DistrictConfig {
        &self.provinces[&entry.province].districts[entry.index]
    }

    /// Resolves a district by code, UUID, alternate id or name.
    ///
    /// Precedence, each pass over the whole registry before the next:
    ///
    /// 1. identifier: code, UUID or alternate id, compared exactly
    /// 2. exact name, after normalization
    /// 3. a name containing the query, or contained in it
    ///
    /// Within a pass the first district in iteration order wins, so
    /// "Bangka Barat" finds Bangka Barat even when Bangka comes first.
    #[must_use]
    pub fn lookup_district(&self, identifier: &str) -> Option<&DistrictConfig> {
        let query = identifier.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(district) = self.districts().find(|d| d.has_identifier(query)) {
            return Some(district);
        }

        let normalized = normalize_name(query);
        if normalized.is_empty() {
            return None;
        }

        let entry = self
            .entries
            .iter()
            .find(|e| e.normalized_name == normalized)
            .or_else(|| {
                self.entries.iter().find(|e| {
                    !e.normalized_name.is_empty()
                        && (normalized.contains(&e.normalized_name)
                            || e.normalized_name.contains(&normalized))
                })
            })?;

        let district = self.district_of(entry);
        log::debug!("Resolved '{query}' to district {} by name", district.id);
        Some(district)
    }

    /// Resolves the province owning a district.
    ///
    /// A 4-digit code maps straight to the province named by its first two
    /// digits; anything else goes through [`Self::lookup_district`].
    #[must_use]
    pub fn lookup_province_for_district(&self, identifier: &str) -> Option<&ProvinceConfig> {
        let query = identifier.trim();
        if is_code(query, 4) {
            return self.provinces.get(&query[..2]);
        }
        self.lookup_district(query)
            .and_then(|district| self.provinces.get(district.province_id()))
    }

    /// Resolves a province by 2-digit code or by name, with the same name
    /// normalization and matching order as [`Self::lookup_district`].
    #[must_use]
    pub fn lookup_province(&self, identifier: &str) -> Option<&ProvinceConfig> {
        let query = identifier.trim();
        if query.is_empty() {
            return None;
        }
        if let Some(province) = self.provinces.get(query) {
            return Some(province);
        }

        let normalized = normalize_name(query);
        if normalized.is_empty() {
            return None;
        }

        self.provinces
            .values()
            .find(|p| normalize_name(&p.name) == normalized)
            .or_else(|| {
                self.provinces.values().find(|p| {
                    let name = normalize_name(&p.name);
                    !name.is_empty() && (normalized.contains(&name) || name.contains(&normalized))
                })
            })
    }

    /// Number of districts across all provinces.
    #[must_use]
    pub fn district_count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for HierarchyRegistry {
    fn default() -> Self {
        Self::embedded()
    }
}

fn invalid(message: String) -> RegistryError {
    RegistryError::Invalid { message }
}

/// Reads every `*.toml` province definition in `dir`, in file name order.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a file fails to
/// parse.
pub fn read_province_dir(dir: &Path) -> Result<Vec<ProvinceConfig>, RegistryError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let text = std::fs::read_to_string(&path)?;
            toml::from_str(&text).map_err(|source| RegistryError::Parse { path, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wilayah_registry_models::SubdistrictFile;

    fn district(id: &str, name: &str) -> DistrictConfig {
        DistrictConfig {
            id: id.to_string(),
            name: name.to_string(),
            uuid: None,
            alternative_ids: Vec::new(),
            path: format!("/data/x/id{id}"),
            subdistricts: vec![SubdistrictFile::new(format!("id{id}010_a"))],
            fallback_file: None,
        }
    }

    fn province(id: &str, name: &str, districts: Vec<DistrictConfig>) -> ProvinceConfig {
        ProvinceConfig {
            id: id.to_string(),
            name: name.to_string(),
            path: "/data/x".to_string(),
            districts_file: None,
            districts,
        }
    }

    #[test]
    fn embedded_catalog_is_valid() {
        let registry = HierarchyRegistry::embedded();
        assert_eq!(registry.provinces().count(), 7);
        assert!(registry.district_count() > 40);
    }

    #[test]
    fn every_district_is_prefixed_by_its_province() {
        let registry = HierarchyRegistry::embedded();
        for province in registry.provinces() {
            for district in &province.districts {
                assert!(
                    district.id.starts_with(&province.id),
                    "District {} under province {}",
                    district.id,
                    province.id
                );
            }
        }
    }

    #[test]
    fn round_trip_lookup_by_id_and_name() {
        let registry = HierarchyRegistry::embedded();
        for district in registry.districts() {
            assert_eq!(registry.lookup_district(&district.id), Some(district));
            assert_eq!(
                registry.lookup_district(&district.name),
                Some(district),
                "name lookup of {}",
                district.name
            );
        }
    }

    #[test]
    fn lookup_by_uuid() {
        let registry = HierarchyRegistry::embedded();
        let badung = registry
            .lookup_district("46b426f4-ef81-486e-bfc6-d5e2fc09bc41")
            .unwrap();
        assert_eq!(badung.id, "5103");
        let banyuwangi = registry
            .lookup_district("5ae5b33d-9074-49ea-9d7a-7ceb6738cce5")
            .unwrap();
        assert_eq!(banyuwangi.id, "3510");
    }

    #[test]
    fn name_lookup_ignores_case_separators_and_diacritics() {
        let registry = HierarchyRegistry::embedded();
        for query in ["KARANGASEM", "karang_asem", "Karang-Asem", "Kárang Asém"] {
            assert_eq!(
                registry.lookup_district(query).map(|d| d.id.as_str()),
                Some("5107"),
                "{query}"
            );
        }
    }

    #[test]
    fn substring_matches_in_both_directions() {
        let registry = HierarchyRegistry::embedded();
        assert_eq!(
            registry.lookup_district("Kabupaten Badung").map(|d| d.id.as_str()),
            Some("5103")
        );
        assert_eq!(
            registry.lookup_district("Denpasar").map(|d| d.id.as_str()),
            Some("5171")
        );
    }

    #[test]
    fn exact_name_beats_earlier_substring() {
        let registry = HierarchyRegistry::new(vec![province(
            "19",
            "Test",
            vec![district("1901", "Bangka"), district("1903", "Bangka Barat")],
        )])
        .unwrap();
        assert_eq!(
            registry.lookup_district("Bangka Barat").map(|d| d.id.as_str()),
            Some("1903")
        );
    }

    #[test]
    fn unknown_and_empty_queries_miss() {
        let registry = HierarchyRegistry::embedded();
        assert_eq!(registry.lookup_district("9999"), None);
        assert_eq!(registry.lookup_district(""), None);
        assert_eq!(registry.lookup_district(" - _ "), None);
    }

    #[test]
    fn province_for_district() {
        let registry = HierarchyRegistry::embedded();
        assert_eq!(
            registry.lookup_province_for_district("5103").map(|p| p.name.as_str()),
            Some("Bali")
        );
        assert_eq!(
            registry
                .lookup_province_for_district("5ae5b33d-9074-49ea-9d7a-7ceb6738cce5")
                .map(|p| p.id.as_str()),
            Some("35")
        );
        assert_eq!(registry.lookup_province_for_district("9901"), None);
    }

    #[test]
    fn province_by_id_or_name() {
        let registry = HierarchyRegistry::embedded();
        assert_eq!(registry.lookup_province("51").map(|p| p.id.as_str()), Some("51"));
        assert_eq!(registry.lookup_province("BALI").map(|p| p.id.as_str()), Some("51"));
        assert_eq!(
            registry.lookup_province("Provinsi Bali").map(|p| p.id.as_str()),
            Some("51")
        );
        assert_eq!(registry.lookup_province("Atlantis"), None);
    }

    #[test]
    fn rejects_misplaced_district() {
        let result = HierarchyRegistry::new(vec![province("51", "Bali", vec![district("3510", "X")])]);
        assert!(matches!(result, Err(RegistryError::Invalid { .. })));
    }

    #[test]
    fn rejects_duplicate_district() {
        let result = HierarchyRegistry::new(vec![province(
            "51",
            "Bali",
            vec![district("5103", "A"), district("5103", "B")],
        )]);
        assert!(matches!(result, Err(RegistryError::Invalid { .. })));
    }

    #[test]
    fn rejects_malformed_codes() {
        let result = HierarchyRegistry::new(vec![province("5", "Bali", Vec::new())]);
        assert!(matches!(result, Err(RegistryError::Invalid { .. })));
        let result = HierarchyRegistry::new(vec![province("51", "Bali", vec![district("51a3", "A")])]);
        assert!(matches!(result, Err(RegistryError::Invalid { .. })));
    }

    #[test]
    fn overrides_replace_and_extend() {
        let dir = tempfile::TempDir::new().unwrap();
        let bali = province("51", "Bali", vec![district("5199", "Testing")]);
        std::fs::write(dir.path().join("id51_bali.toml"), toml::to_string(&bali).unwrap()).unwrap();
        let aceh = province("11", "Aceh", vec![district("1101", "Simeulue")]);
        std::fs::write(dir.path().join("id11_aceh.toml"), toml::to_string(&aceh).unwrap()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = HierarchyRegistry::with_overrides(dir.path()).unwrap();
        assert_eq!(registry.provinces().count(), 8);
        assert_eq!(registry.province("51").unwrap().districts.len(), 1);
        assert_eq!(registry.lookup_district("Simeulue").map(|d| d.id.as_str()), Some("1101"));
        assert_eq!(registry.lookup_district("5103"), None);
    }

    #[test]
    fn bad_override_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.toml"), "id = 51\nname = ").unwrap();
        let result = HierarchyRegistry::with_overrides(dir.path());
        assert!(matches!(result, Err(RegistryError::Parse { .. })));
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_name("Kota Denpasar"), "kotadenpasar");
        assert_eq!(normalize_name("Tanjung-Pinang_"), "tanjungpinang");
        assert_eq!(normalize_name("Bénoa"), "benoa");
    }
}
