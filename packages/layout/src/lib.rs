#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tooling over a local boundary data tree.
//!
//! The tree is laid out as
//! `<root>/data/id<PP>_<slug>/id<PPRR>_<slug>/<file>.geojson`, where each
//! district directory holds one file per subdistrict plus a district-level
//! fallback file named after the directory itself.

pub mod generate;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

pub use generate::{GenerateOptions, generate_province_config, render_province_toml};
pub use validate::{DistrictIssue, LayoutFilter, LayoutReport, Problem, validate_layout};

/// Directory under the root that holds the province directories.
pub const DATA_DIR: &str = "data";

/// Extension of boundary files.
pub const GEOJSON_EXTENSION: &str = "geojson";

static PROVINCE_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^id([0-9]{2})_([a-z0-9_]+)$").expect("valid regex"));

static DISTRICT_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^id([0-9]{4})_([a-z0-9_]+)$").expect("valid regex"));

/// Errors that can occur while scanning a data tree.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// I/O error (directory listing, file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization failed.
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// No province directory matched.
    #[error("No matching province directories found under {}", .0.display())]
    NoProvinces(PathBuf),

    /// The requested province directory does not exist.
    #[error("Missing data directory: {}", .0.display())]
    MissingProvince(PathBuf),
}

/// `(code, slug)` of a province directory name, e.g. `id51_bali`.
#[must_use]
pub fn parse_province_dir(name: &str) -> Option<(&str, &str)> {
    let caps = PROVINCE_DIR_RE.captures(name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// `(code, slug)` of a district directory name, e.g. `id5103_badung`.
#[must_use]
pub fn parse_district_dir(name: &str) -> Option<(&str, &str)> {
    let caps = DISTRICT_DIR_RE.captures(name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Pads a province code to two digits (`"5"` becomes `"05"`).
#[must_use]
pub fn province_code(raw: &str) -> String {
    format!("{:0>2}", raw.trim())
}

/// Title-cases a directory slug: `kota_denpasar` becomes `Kota Denpasar`.
#[must_use]
pub fn title_from_slug(slug: &str) -> String {
    slug.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sorted sub-directories of `dir` whose names satisfy `accept`.
fn sorted_dirs(dir: &Path, accept: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, LayoutError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        if path.file_name().and_then(|n| n.to_str()).is_some_and(&accept) {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Sorted stems of the `.geojson` files directly inside `dir`.
fn geojson_stems(dir: &Path) -> Result<Vec<String>, LayoutError> {
    let mut stems = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == GEOJSON_EXTENSION)
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            stems.push(stem.to_string());
        }
    }
    stems.sort();
    Ok(stems)
}

fn dir_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}
