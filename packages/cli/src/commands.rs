//! Data-tree and registry commands.

use std::path::{Path, PathBuf};

use dialoguer::Input;
use wilayah_layout::{
    GenerateOptions, LayoutFilter, LayoutReport, generate_province_config, render_province_toml,
    validate_layout,
};
use wilayah_registry::HierarchyRegistry;
use wilayah_registry_models::ProvinceConfig;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Validates the tree under `root`, printing every problem found.
///
/// # Errors
///
/// Fails when the tree cannot be read or any district directory has a
/// problem.
pub fn validate(root: &Path, filter: &LayoutFilter) -> CommandResult {
    let report = validate_layout(root, filter)?;
    print!("{}", render_report(&report));

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!(
            "{}/{} district directories have problems",
            report.affected(),
            report.total_districts()
        )
        .into())
    }
}

fn render_report(report: &LayoutReport) -> String {
    let mut out = String::new();
    for province in &report.provinces {
        for issue in &province.issues {
            out.push_str(&format!("{}/{issue}\n", province.dir));
        }
    }
    out.push_str(&format!(
        "{}/{} district directories affected\n",
        report.affected(),
        report.total_districts()
    ));
    out
}

/// Generates a province registry file from the tree under `root`.
///
/// # Errors
///
/// Fails when the province directory is missing or the output cannot be
/// written.
pub fn generate(root: &Path, options: &GenerateOptions, out: Option<&Path>) -> CommandResult {
    let province = generate_province_config(root, options)?;
    let toml = render_province_toml(&province)?;

    match out {
        Some(path) => {
            std::fs::write(path, toml)?;
            log::info!(
                "Wrote {} districts of {} to {}",
                province.districts.len(),
                province.name,
                path.display()
            );
        }
        None => print!("{toml}"),
    }
    Ok(())
}

/// Prints the registry, or one province of it.
///
/// # Errors
///
/// Fails when the registry override directory is unreadable or the
/// province is unknown.
pub fn list_registry(province: Option<&str>) -> CommandResult {
    let registry = HierarchyRegistry::from_env()?;

    match province {
        Some(identifier) => {
            let province = registry
                .lookup_province(identifier)
                .ok_or_else(|| format!("Unknown province: {identifier}"))?;
            print!("{}", render_province(province));
        }
        None => {
            println!("{:<6} {:<32} DISTRICTS", "ID", "NAME");
            println!("{}", "-".repeat(50));
            for province in registry.provinces() {
                println!(
                    "{:<6} {:<32} {}",
                    province.id,
                    province.name,
                    province.districts.len()
                );
            }
        }
    }
    Ok(())
}

fn render_province(province: &ProvinceConfig) -> String {
    let mut out = format!("{} {}\n", province.id, province.name);
    for district in &province.districts {
        out.push_str(&format!(
            "  {:<6} {:<28} {} files{}\n",
            district.id,
            district.name,
            district.subdistricts.len(),
            if district.fallback_file.is_some() {
                " + fallback"
            } else {
                ""
            }
        ));
    }
    out
}

fn prompt_root() -> Result<PathBuf, dialoguer::Error> {
    let root: String = Input::new()
        .with_prompt("Static root")
        .default("public".to_string())
        .interact_text()?;
    Ok(PathBuf::from(root))
}

fn prompt_optional(prompt: &str) -> Result<Option<String>, dialoguer::Error> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// [`validate`] with prompted arguments.
///
/// # Errors
///
/// See [`validate`].
pub fn interactive_validate() -> CommandResult {
    let root = prompt_root()?;
    let filter = LayoutFilter {
        province: prompt_optional("Province code (blank for all)")?,
        slug: prompt_optional("Province slug (blank for all)")?,
    };
    validate(&root, &filter)
}

/// [`generate`] with prompted arguments.
///
/// # Errors
///
/// See [`generate`].
pub fn interactive_generate() -> CommandResult {
    let root = prompt_root()?;
    let province: String = Input::new().with_prompt("Province code").interact_text()?;
    let slug: String = Input::new().with_prompt("Province slug").interact_text()?;
    let options = GenerateOptions {
        province,
        slug,
        name: prompt_optional("Display name (blank to derive)")?,
        districts_file: prompt_optional("Districts file (blank for default)")?,
    };
    let out = prompt_optional("Output file (blank for stdout)")?.map(PathBuf::from);
    generate(&root, &options, out.as_deref())
}
