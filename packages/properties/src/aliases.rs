//! Alias tables for every semantic field.
//!
//! Each table is probed in order and the first non-empty value wins. The
//! order encodes which source conventions are trusted most, so entries must
//! only ever be appended or reordered deliberately.

/// Keys that may hold a province's display name.
pub const PROVINCE_NAME: &[&str] = &["prov_name", "Propinsi", "PROVINSI", "provinsi", "NAMA"];

/// Keys that may hold a province's identifier.
pub const PROVINCE_ID: &[&str] = &["prov_id", "provinsi_id", "ID", "KODE"];

/// Keys that may hold the owning province's code on a district feature.
pub const PROVINCE_CODE: &[&str] = &[
    "prov_id",
    "provinsi_id",
    "ID_PROV",
    "PROVINSI",
    "province_code",
];

/// Keys that may hold a district's display name.
pub const DISTRICT_NAME: &[&str] = &[
    "kab_name",
    "kabupaten",
    "KABUPATEN",
    "regency",
    "REGION",
    "nama",
    "NAMA",
    "name",
    "NAME",
    "Nama",
];

/// Keys that explicitly hold a regency (district) code.
pub const REGENCY_CODE: &[&str] = &[
    "regency_code",
    "kabupaten_kode",
    "kode_kabupaten",
    "kab_kode",
];

/// Keys holding a finer-grained code whose leading four digits are the
/// regency code (kecamatan or village codes).
pub const GRANULAR_CODE: &[&str] = &["district_code", "village_code"];

/// District-specific identifier keys.
pub const DISTRICT_CODE: &[&str] = &[
    "id_kabupaten",
    "kab_id",
    "kabupaten_id",
    "KABUPATEN_ID",
    "ID_KABUPATEN",
    "KODE",
    "code",
];

/// Level-agnostic identifier keys, probed last. String values containing a
/// hyphen are UUID-shaped and never used.
pub const GENERIC_ID: &[&str] = &["ID", "id", "gid"];

/// Every key the district id resolver probes, in probe order.
pub const DISTRICT_ID: &[&str] = &[
    "regency_code",
    "kabupaten_kode",
    "kode_kabupaten",
    "kab_kode",
    "district_code",
    "village_code",
    "id_kabupaten",
    "kab_id",
    "kabupaten_id",
    "KABUPATEN_ID",
    "ID_KABUPATEN",
    "KODE",
    "code",
    "ID",
    "id",
    "gid",
];

/// Keys that may hold a subdistrict's display name.
pub const SUBDISTRICT_NAME: &[&str] = &[
    "kec_name",
    "kecamatan",
    "KECAMATAN",
    "NAMA",
    "nama",
    "district",
    "name",
    "NAME",
    "village",
];

/// Keys a loaded subdistrict feature is enriched with for its canonical
/// name. `district` and `village` are left out: in English-keyed sources
/// they name other levels.
pub const SUBDISTRICT_NAME_WRITE: &[&str] = &[
    "kecamatan",
    "kec_name",
    "KECAMATAN",
    "NAMA",
    "nama",
    "name",
    "NAME",
];

/// Keys a loaded feature is enriched with for its owning district's
/// canonical code. Level-agnostic keys (`ID`, `id`, `gid`, `KODE`, `code`)
/// are left out so they keep meaning whatever the source meant.
pub const DISTRICT_ID_WRITE: &[&str] = &[
    "regency_code",
    "district_code",
    "kab_id",
    "kabupaten_id",
    "KABUPATEN_ID",
    "ID_KABUPATEN",
];
