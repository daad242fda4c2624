//! Checks that every district directory can be loaded.

use std::fmt;
use std::path::Path;

use crate::{
    DATA_DIR, LayoutError, dir_name, geojson_stems, parse_district_dir, parse_province_dir,
    province_code, sorted_dirs,
};

/// Restricts validation to matching province directories.
#[derive(Debug, Clone, Default)]
pub struct LayoutFilter {
    /// Province code; padded to two digits before matching.
    pub province: Option<String>,
    /// Province directory slug (e.g., `jawa_timur`).
    pub slug: Option<String>,
}

impl LayoutFilter {
    fn accepts(&self, dir_name: &str) -> bool {
        let Some((code, slug)) = parse_province_dir(dir_name) else {
            return false;
        };
        self.province
            .as_deref()
            .is_none_or(|wanted| province_code(wanted) == code)
            && self.slug.as_deref().is_none_or(|wanted| wanted == slug)
    }
}

/// A problem with one district directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// Nothing but (at most) the fallback file.
    NoSubdistricts,
    /// The fallback file, named after the directory, is absent.
    MissingFallback(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSubdistricts => f.write_str("no subdistrict .geojson files"),
            Self::MissingFallback(file) => write!(f, "missing fallback file: {file}"),
        }
    }
}

/// A district directory with at least one problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictIssue {
    /// District directory name.
    pub district_dir: String,
    /// Everything wrong with it.
    pub problems: Vec<Problem>,
}

impl fmt::Display for DistrictIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.district_dir)?;
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{problem}")?;
        }
        Ok(())
    }
}

/// Validation outcome for one province directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceReport {
    /// Province directory name.
    pub dir: String,
    /// District directories inspected.
    pub districts_checked: usize,
    /// Districts with problems.
    pub issues: Vec<DistrictIssue>,
}

/// Validation outcome for a whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutReport {
    /// Per-province results, in directory name order.
    pub provinces: Vec<ProvinceReport>,
}

impl LayoutReport {
    /// District directories inspected across all provinces.
    #[must_use]
    pub fn total_districts(&self) -> usize {
        self.provinces.iter().map(|p| p.districts_checked).sum()
    }

    /// District directories with at least one problem.
    #[must_use]
    pub fn affected(&self) -> usize {
        self.provinces.iter().map(|p| p.issues.len()).sum()
    }

    /// Whether no problem was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.affected() == 0
    }
}

/// Inspects one district directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn check_district_dir(dir: &Path) -> Result<Vec<Problem>, LayoutError> {
    let name = dir_name(dir);
    let stems = geojson_stems(dir)?;

    let has_fallback = stems.iter().any(|stem| stem == name);
    let subdistricts = stems.iter().filter(|stem| *stem != name).count();

    let mut problems = Vec::new();
    if subdistricts == 0 {
        problems.push(Problem::NoSubdistricts);
    }
    if !has_fallback {
        problems.push(Problem::MissingFallback(format!("{name}.geojson")));
    }
    Ok(problems)
}

/// Validates every district directory of every matching province under
/// `<root>/data`.
///
/// # Errors
///
/// Returns [`LayoutError::NoProvinces`] when no province directory matches
/// the filter, or an I/O error if a directory cannot be listed.
pub fn validate_layout(root: &Path, filter: &LayoutFilter) -> Result<LayoutReport, LayoutError> {
    let data = root.join(DATA_DIR);
    let province_dirs = sorted_dirs(&data, |name| filter.accepts(name))?;
    if province_dirs.is_empty() {
        return Err(LayoutError::NoProvinces(data));
    }

    let mut report = LayoutReport::default();
    for province_dir in province_dirs {
        let mut province = ProvinceReport {
            dir: dir_name(&province_dir).to_string(),
            districts_checked: 0,
            issues: Vec::new(),
        };

        for district_dir in sorted_dirs(&province_dir, |name| parse_district_dir(name).is_some())? {
            province.districts_checked += 1;
            let problems = check_district_dir(&district_dir)?;
            if !problems.is_empty() {
                let issue = DistrictIssue {
                    district_dir: dir_name(&district_dir).to_string(),
                    problems,
                };
                log::warn!("{}/{issue}", province.dir);
                province.issues.push(issue);
            }
        }

        log::debug!(
            "Checked {} districts in {} ({} with issues)",
            province.districts_checked,
            province.dir,
            province.issues.len()
        );
        report.provinces.push(province);
    }

    Ok(report)
}
