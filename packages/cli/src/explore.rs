//! Interactive drill-down: province, then district, then subdistricts.
//!
//! Picking from a list stands in for clicking a polygon; the picked
//! feature's properties go through the same orchestrator and click
//! handler a map client uses.

use std::sync::Arc;

use dialoguer::Select;
use serde_json::json;
use wilayah_boundary_models::{AdminLevel, JsonObject, LoadResult, properties_of};
use wilayah_cli_utils::{IndicatifProgress, MultiProgress};
use wilayah_loader::{CollectionLoader, LoaderConfig};
use wilayah_properties::collection::CollectionExt;
use wilayah_properties::label_for;
use wilayah_registry::HierarchyRegistry;
use wilayah_registry_models::ProvinceConfig;
use wilayah_selection::{DistrictClickHandler, Orchestrator, SelectionState};

/// Runs the drill-down until the user quits.
///
/// # Errors
///
/// Fails when the registry or data source cannot be set up or a prompt
/// cannot be shown.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(HierarchyRegistry::from_env()?);
    let loader = CollectionLoader::from_config(registry.clone(), LoaderConfig::from_env())?
        .with_progress(IndicatifProgress::files(multi));
    let orchestrator = Arc::new(Orchestrator::new(loader));
    let handler = DistrictClickHandler::new(orchestrator.clone(), registry.clone());

    let provinces: Vec<&ProvinceConfig> = registry.provinces().collect();
    let mut labels: Vec<String> = provinces
        .iter()
        .map(|p| format!("{} {}", p.id, p.name))
        .collect();
    labels.push("Quit".to_string());

    loop {
        let idx = Select::new()
            .with_prompt("Province")
            .items(&labels)
            .default(0)
            .interact()?;
        let Some(province) = provinces.get(idx) else {
            return Ok(());
        };

        let props = object(&json!({"prov_name": province.name, "prov_id": province.id}));
        orchestrator.select_province(&props).await;
        let state = orchestrator.snapshot();
        print_districts(&state);

        let choices = district_choices(&state, province);
        let mut district_labels: Vec<String> = choices
            .iter()
            .map(|p| label_for(AdminLevel::District, p).unwrap_or_else(|| "(unnamed)".to_string()))
            .collect();
        district_labels.push("Back".to_string());

        loop {
            let idx = Select::new()
                .with_prompt(format!("District of {}", province.name))
                .items(&district_labels)
                .default(0)
                .interact()?;
            let Some(props) = choices.get(idx) else {
                orchestrator.reset();
                break;
            };

            if handler.on_click(props).await.is_none() {
                println!("That district carries no usable name or id.");
                continue;
            }
            let result = handler.on_zoom_end().await;
            print_subdistricts(&orchestrator.snapshot(), result.as_ref());
            orchestrator.back_to_province();
        }
    }
}

fn object(value: &serde_json::Value) -> JsonObject {
    value.as_object().cloned().unwrap_or_default()
}

/// The clickable districts: the loaded district features, or the registry
/// entries when the district file could not be loaded.
fn district_choices(state: &SelectionState, province: &ProvinceConfig) -> Vec<JsonObject> {
    match &state.districts {
        Some(districts) if !districts.is_empty() => districts
            .iter()
            .map(|f| properties_of(f).clone())
            .collect(),
        _ => province
            .districts
            .iter()
            .map(|d| object(&json!({"kab_name": d.name, "regency_code": d.id})))
            .collect(),
    }
}

fn print_districts(state: &SelectionState) {
    let province = state.selected_province.as_deref().unwrap_or("?");
    match (&state.districts, &state.last_error) {
        (Some(districts), None) => {
            println!("{province}: {} district features", districts.len());
        }
        (_, Some(error)) => {
            println!("{province}: district boundaries unavailable ({error})");
        }
        (None, None) => println!("{province}: no district boundaries"),
    }
}

fn print_subdistricts(state: &SelectionState, result: Option<&LoadResult>) {
    let district = state.selected_district.as_deref().unwrap_or("?");
    let id = state.selected_district_id.as_deref().unwrap_or("?");

    let Some(result) = result else {
        println!("{district} ({id}): already loaded");
        return;
    };

    if !result.success {
        println!(
            "{district} ({id}): {}",
            result.error.as_deref().unwrap_or("load failed")
        );
        return;
    }

    if result.is_degraded() {
        println!("{district} ({id}): subdistricts unavailable, showing district outline");
        return;
    }

    match &state.subdistricts {
        Some(subdistricts) => {
            println!(
                "{district} ({id}): {} subdistrict features from {}/{} files",
                subdistricts.len(),
                result.loaded_count.unwrap_or(0),
                result.total_count.unwrap_or(0)
            );
            for label in subdistricts.labels() {
                println!("  {label}");
            }
        }
        None => println!("{district} ({id}): nothing loaded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wilayah_boundary_models::FeatureCollection;

    #[test]
    fn falls_back_to_registry_districts() {
        let registry = HierarchyRegistry::embedded();
        let bali = registry.province("51").unwrap();
        let state = SelectionState {
            districts: Some(Arc::new(FeatureCollection::empty(AdminLevel::District))),
            ..SelectionState::default()
        };

        let choices = district_choices(&state, bali);
        assert_eq!(choices.len(), bali.districts.len());
        assert_eq!(
            label_for(AdminLevel::District, &choices[2]).as_deref(),
            Some("Badung")
        );
        assert_eq!(registry.locate_district(&choices[2]).unwrap().canonical_id, "5103");
    }
}
