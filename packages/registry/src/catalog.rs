//! Compile-time catalog of province definitions.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a province requires creating a TOML file in `provinces/` (the
//! `wilayah generate` command writes one from a data directory) and adding
//! a corresponding entry here.

use wilayah_registry_models::ProvinceConfig;

/// Number of embedded provinces. Updated when provinces are added.
/// Enforced by a test.
#[cfg(test)]
const EXPECTED_PROVINCE_COUNT: usize = 7;

/// Embedded TOML province definitions.
const PROVINCE_TOMLS: &[(&str, &str)] = &[
    (
        "id19_kepulauan_bangka_belitung",
        include_str!("../provinces/id19_kepulauan_bangka_belitung.toml"),
    ),
    (
        "id21_kepulauan_riau",
        include_str!("../provinces/id21_kepulauan_riau.toml"),
    ),
    (
        "id31_dki_jakarta",
        include_str!("../provinces/id31_dki_jakarta.toml"),
    ),
    (
        "id35_jawa_timur",
        include_str!("../provinces/id35_jawa_timur.toml"),
    ),
    ("id51_bali", include_str!("../provinces/id51_bali.toml")),
    (
        "id65_kalimantan_utara",
        include_str!("../provinces/id65_kalimantan_utara.toml"),
    ),
    (
        "id76_sulawesi_barat",
        include_str!("../provinces/id76_sulawesi_barat.toml"),
    ),
];

/// Returns all embedded province definitions.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn embedded_provinces() -> Vec<ProvinceConfig> {
    PROVINCE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse province definition '{name}': {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_provinces() {
        let provinces = embedded_provinces();
        assert_eq!(
            provinces.len(),
            EXPECTED_PROVINCE_COUNT,
            "Expected {EXPECTED_PROVINCE_COUNT} provinces, found {}. \
             Update EXPECTED_PROVINCE_COUNT after adding/removing provinces.",
            provinces.len()
        );
    }

    #[test]
    fn file_names_match_province_ids() {
        for ((name, _), province) in PROVINCE_TOMLS.iter().zip(embedded_provinces()) {
            assert!(
                name.starts_with(&format!("id{}_", province.id)),
                "File {name} holds province {}",
                province.id
            );
        }
    }

    #[test]
    fn district_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for province in embedded_provinces() {
            for district in province.districts {
                assert!(seen.insert(district.id.clone()), "Duplicate district ID: {}", district.id);
            }
        }
    }

    #[test]
    fn every_district_has_files() {
        for province in embedded_provinces() {
            assert!(!province.name.is_empty(), "Province {} has empty name", province.id);
            for district in &province.districts {
                assert!(
                    !district.subdistricts.is_empty() || district.fallback_file.is_some(),
                    "District {} has nothing to load",
                    district.id
                );
                assert!(
                    district.path.starts_with(&province.path),
                    "District {} path {} is outside {}",
                    district.id,
                    district.path,
                    province.path
                );
            }
        }
    }
}
