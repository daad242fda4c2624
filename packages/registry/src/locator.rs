//! Maps a clicked district feature to a registry district.

use serde::Serialize;
use wilayah_boundary_models::{JsonObject, JsonValue};
use wilayah_properties::{aliases, district_id, district_name};

use crate::HierarchyRegistry;

/// Keys that may carry a raw registry identifier (typically a UUID) that
/// the code resolver refuses to digit-truncate.
const RAW_IDENTIFIER_KEYS: &[&str] = &["uuid", "UUID"];

/// Outcome of locating a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedDistrict {
    /// Display name: the registry name on a match, otherwise the resolved
    /// feature name.
    pub name: String,
    /// The registry's 4-digit code on a match, otherwise the best-effort
    /// raw identifier.
    pub canonical_id: String,
    /// Whether a registry entry was found.
    pub registered: bool,
}

impl HierarchyRegistry {
    /// Resolves a clicked district feature's properties.
    ///
    /// The registry is consulted by name first, then by the resolved
    /// 4-digit code, then by raw UUID-like identifiers. Returns `None` when
    /// the properties carry neither a name nor an identifier.
    #[must_use]
    pub fn locate_district(&self, props: &JsonObject) -> Option<LocatedDistrict> {
        let name = district_name(props);
        let code = district_id(props);

        let matched = name
            .as_deref()
            .and_then(|n| self.lookup_district(n))
            .or_else(|| code.as_deref().and_then(|c| self.lookup_district(c)))
            .or_else(|| {
                raw_identifiers(props).find_map(|raw| {
                    self.districts().find(|d| d.has_identifier(&raw))
                })
            });

        if let Some(district) = matched {
            return Some(LocatedDistrict {
                name: district.name.clone(),
                canonical_id: district.id.clone(),
                registered: true,
            });
        }

        let canonical_id = code.or_else(|| name.clone())?;
        log::info!("District '{canonical_id}' is not in the registry");
        Some(LocatedDistrict {
            name: name.unwrap_or_else(|| canonical_id.clone()),
            canonical_id,
            registered: false,
        })
    }
}

fn raw_identifiers(props: &JsonObject) -> impl Iterator<Item = String> + '_ {
    RAW_IDENTIFIER_KEYS
        .iter()
        .chain(aliases::GENERIC_ID)
        .filter_map(|key| props.get(*key))
        .filter_map(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
