//! Builds a province catalog entry by scanning its data directory.

use std::path::Path;

use wilayah_registry_models::{DistrictConfig, ProvinceConfig, SubdistrictFile};

use crate::{
    DATA_DIR, GEOJSON_EXTENSION, LayoutError, dir_name, geojson_stems, parse_district_dir,
    province_code, sorted_dirs, title_from_slug,
};

/// Districts file used when none is given: the national collection.
pub const DEFAULT_DISTRICTS_FILE: &str = "/data/kab_37.geojson";

/// What to generate.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Province code; padded to two digits.
    pub province: String,
    /// Province directory slug (e.g., `bali`).
    pub slug: String,
    /// Display name; title-cased slug when absent.
    pub name: Option<String>,
    /// Districts collection file; [`DEFAULT_DISTRICTS_FILE`] when absent.
    pub districts_file: Option<String>,
}

/// Scans `<root>/data/id<PP>_<slug>` and builds its catalog entry.
///
/// District directories whose code does not start with the province code
/// are skipped.
///
/// # Errors
///
/// Returns [`LayoutError::MissingProvince`] if the province directory does
/// not exist, or an I/O error if a directory cannot be listed.
pub fn generate_province_config(
    root: &Path,
    options: &GenerateOptions,
) -> Result<ProvinceConfig, LayoutError> {
    let code = province_code(&options.province);
    let province_dir_name = format!("id{code}_{}", options.slug);
    let base = root.join(DATA_DIR).join(&province_dir_name);
    if !base.is_dir() {
        return Err(LayoutError::MissingProvince(base));
    }

    let mut districts = Vec::new();
    for district_dir in sorted_dirs(&base, |name| parse_district_dir(name).is_some())? {
        let name = dir_name(&district_dir);
        let Some((district_code, district_slug)) = parse_district_dir(name) else {
            continue;
        };
        if !district_code.starts_with(&code) {
            log::warn!("Skipping {name}: not a district of province {code}");
            continue;
        }

        let mut fallback_file = None;
        let mut subdistricts = Vec::new();
        for stem in geojson_stems(&district_dir)? {
            if stem == name {
                fallback_file = Some(format!("{stem}.{GEOJSON_EXTENSION}"));
            } else {
                subdistricts.push(SubdistrictFile::new(stem));
            }
        }

        log::debug!("{name}: {} subdistrict files", subdistricts.len());
        districts.push(DistrictConfig {
            id: district_code.to_string(),
            name: title_from_slug(district_slug),
            uuid: None,
            alternative_ids: Vec::new(),
            path: format!("/{DATA_DIR}/{province_dir_name}/{name}"),
            subdistricts,
            fallback_file,
        });
    }

    Ok(ProvinceConfig {
        id: code,
        name: options
            .name
            .clone()
            .unwrap_or_else(|| title_from_slug(&options.slug)),
        path: format!("/{DATA_DIR}/{province_dir_name}"),
        districts_file: Some(
            options
                .districts_file
                .clone()
                .unwrap_or_else(|| DEFAULT_DISTRICTS_FILE.to_string()),
        ),
        districts,
    })
}

/// Renders a catalog entry in the embedded TOML schema.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_province_toml(province: &ProvinceConfig) -> Result<String, LayoutError> {
    Ok(toml::to_string(province)?)
}
