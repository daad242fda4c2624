//! Non-destructive enrichment of loaded features with canonical values.
//!
//! Keys already present on a feature are never overwritten; enrichment only
//! fills gaps so that any downstream reader probing any alias finds the
//! canonical value.

use wilayah_boundary_models::{Feature, JsonObject, JsonValue};

use crate::{PROVINCE_CODE_LEN, aliases};

/// Key written with a district feature's canonical 4-digit code.
pub const REGENCY_CODE_KEY: &str = "regency_code";

/// Key written with a district feature's owning province code.
pub const PROVINCE_CODE_KEY: &str = "province_code";

/// Turns a subdistrict file id into a display name.
///
/// The leading code segment is dropped, the remaining `_`-separated words
/// are joined by spaces and each word is capitalized:
/// `id5103010_kuta_selatan` becomes `Kuta Selatan`.
#[must_use]
pub fn humanize_file_id(file_id: &str) -> String {
    file_id
        .split('_')
        .skip(1)
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Inserts `value` under `key` unless the key is already present.
///
/// Returns whether the value was inserted.
pub fn insert_missing(props: &mut JsonObject, key: &str, value: &str) -> bool {
    if props.contains_key(key) {
        return false;
    }
    props.insert(key.to_string(), JsonValue::String(value.to_string()));
    true
}

fn properties_mut(feature: &mut Feature) -> &mut JsonObject {
    feature.properties.get_or_insert_with(JsonObject::new)
}

/// Tags a feature loaded from a subdistrict file with the subdistrict's
/// name and its owning district's canonical code under every write alias.
pub fn enrich_subdistrict_feature(feature: &mut Feature, subdistrict_name: &str, district_code: &str) {
    let props = properties_mut(feature);
    for key in aliases::SUBDISTRICT_NAME_WRITE {
        insert_missing(props, key, subdistrict_name);
    }
    for key in aliases::DISTRICT_ID_WRITE {
        insert_missing(props, key, district_code);
    }
}

/// Tags a district feature with its canonical regency code and the
/// province code derived from it.
pub fn enrich_district_feature(feature: &mut Feature, regency_code: &str) {
    let props = properties_mut(feature);
    insert_missing(props, REGENCY_CODE_KEY, regency_code);
    if let Some(province) = regency_code.get(..PROVINCE_CODE_LEN) {
        insert_missing(props, PROVINCE_CODE_KEY, province);
    }
}
