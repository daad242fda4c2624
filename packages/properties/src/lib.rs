#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical field resolution over inconsistently keyed property bags.
//!
//! Boundary files from different agencies name the same concept under
//! different keys (`kab_name`, `KABUPATEN`, `regency`, `NAMA`, ...). Every
//! reader in the workspace goes through this crate instead of probing keys
//! inline, so the alias order lives in exactly one place ([`aliases`]) and
//! the same property bag always resolves to the same value.

pub mod aliases;
pub mod collection;
pub mod enrich;

use std::sync::LazyLock;

use regex::Regex;
use strum_macros::{AsRefStr, Display, EnumString};
use wilayah_boundary_models::{AdminLevel, JsonObject, JsonValue};

/// Width of a canonical district (regency) code.
pub const DISTRICT_CODE_LEN: usize = 4;

/// Width of a canonical province code.
pub const PROVINCE_CODE_LEN: usize = 2;

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// A semantic field that can be resolved from a property bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum SemanticField {
    /// Province display name.
    ProvinceName,
    /// Province identifier, as found.
    ProvinceId,
    /// District display name.
    DistrictName,
    /// District identifier, normalized to a 4-digit code.
    DistrictId,
    /// Subdistrict display name.
    SubdistrictName,
}

impl SemanticField {
    /// All resolvable fields.
    pub const ALL: &[Self] = &[
        Self::ProvinceName,
        Self::ProvinceId,
        Self::DistrictName,
        Self::DistrictId,
        Self::SubdistrictName,
    ];

    /// The ordered alias keys probed for this field.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::ProvinceName => aliases::PROVINCE_NAME,
            Self::ProvinceId => aliases::PROVINCE_ID,
            Self::DistrictName => aliases::DISTRICT_NAME,
            Self::DistrictId => aliases::DISTRICT_ID,
            Self::SubdistrictName => aliases::SUBDISTRICT_NAME,
        }
    }
}

/// Resolves `field` from a property bag.
///
/// Returns `None` when no alias carries a usable value.
#[must_use]
pub fn resolve(props: &JsonObject, field: SemanticField) -> Option<String> {
    match field {
        SemanticField::DistrictId => district_id(props),
        _ => first_present(props, field.aliases()),
    }
}

/// Returns the first non-empty scalar found under `keys`, probed in order.
#[must_use]
pub fn first_present(props: &JsonObject, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| props.get(*key))
        .find_map(scalar_text)
}

/// Province display name.
#[must_use]
pub fn province_name(props: &JsonObject) -> Option<String> {
    first_present(props, aliases::PROVINCE_NAME)
}

/// Province identifier, as found (not normalized).
#[must_use]
pub fn province_id(props: &JsonObject) -> Option<String> {
    first_present(props, aliases::PROVINCE_ID)
}

/// District display name.
#[must_use]
pub fn district_name(props: &JsonObject) -> Option<String> {
    first_present(props, aliases::DISTRICT_NAME)
}

/// Subdistrict display name.
#[must_use]
pub fn subdistrict_name(props: &JsonObject) -> Option<String> {
    first_present(props, aliases::SUBDISTRICT_NAME)
}

/// Resolves a canonical 4-digit district code.
///
/// Tiers, first hit wins:
///
/// 1. explicit regency-code keys,
/// 2. finer-grained kecamatan/village codes (their leading four digits),
/// 3. district-specific id keys,
/// 4. generic id keys, skipping hyphenated (UUID-shaped) strings.
///
/// Within each key only the first run of digits counts, and it must be at
/// least four digits long; longer runs are truncated to four.
#[must_use]
pub fn district_id(props: &JsonObject) -> Option<String> {
    let tiered = [
        aliases::REGENCY_CODE,
        aliases::GRANULAR_CODE,
        aliases::DISTRICT_CODE,
    ];

    for keys in tiered {
        let found = keys
            .iter()
            .filter_map(|key| props.get(*key))
            .filter_map(scalar_text)
            .find_map(|text| regency_prefix(&text));
        if found.is_some() {
            return found;
        }
    }

    aliases::GENERIC_ID
        .iter()
        .filter_map(|key| props.get(*key))
        .filter(|value| !is_uuid_shaped(value))
        .filter_map(scalar_text)
        .find_map(|text| regency_prefix(&text))
}

/// Resolves the owning province's code from province-id keys on a
/// district feature. Returns the first digit run as-is.
#[must_use]
pub fn province_code(props: &JsonObject) -> Option<String> {
    aliases::PROVINCE_CODE
        .iter()
        .filter_map(|key| props.get(*key))
        .filter_map(scalar_text)
        .find_map(|text| first_digit_run(&text).map(String::from))
}

/// Returns the first contiguous run of ASCII digits in `text`.
#[must_use]
pub fn first_digit_run(text: &str) -> Option<&str> {
    DIGIT_RUN_RE.find(text).map(|m| m.as_str())
}

/// Normalizes a raw identifier such as `id5103_badung` or `5103` to its
/// first digit run, or returns it trimmed when it has no digits.
#[must_use]
pub fn normalize_identifier(raw: &str) -> String {
    first_digit_run(raw).map_or_else(|| raw.trim().to_string(), String::from)
}

/// The label a tooltip should show for a feature in a collection at
/// `level`.
#[must_use]
pub fn label_for(level: AdminLevel, props: &JsonObject) -> Option<String> {
    match level {
        AdminLevel::Country => None,
        AdminLevel::Province => province_name(props),
        AdminLevel::District => district_name(props),
        AdminLevel::Subdistrict => subdistrict_name(props),
    }
}

/// Leading four digits of the first digit run, if that run is long enough.
fn regency_prefix(text: &str) -> Option<String> {
    let digits = first_digit_run(text)?;
    (digits.len() >= DISTRICT_CODE_LEN).then(|| digits[..DISTRICT_CODE_LEN].to_string())
}

fn is_uuid_shaped(value: &JsonValue) -> bool {
    value.as_str().is_some_and(|s| s.contains('-'))
}

/// Text form of a scalar property value. Empty strings, null, booleans,
/// arrays and objects yield `None`.
fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                #[allow(clippy::cast_possible_truncation)]
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        (f as i64).to_string()
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}
