//! The selection/load orchestrator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;
use wilayah_boundary_models::{AdminLevel, FeatureCollection, JsonObject, LoadResult};
use wilayah_loader::{CollectionLoader, LoaderError};
use wilayah_properties::collection::CollectionExt;
use wilayah_properties::{first_digit_run, province_id, province_name};
use wilayah_registry::locator::LocatedDistrict;

use crate::{Phase, SelectionBridge, SelectionState};

#[derive(Default)]
struct Inner {
    state: SelectionState,
    /// Latest request token. Advanced by every subdistrict load and every
    /// selection change; a completion carrying an older token is stale.
    token: u64,
    /// Advanced by every province selection.
    province_generation: u64,
    loading: bool,
    /// A load was requested while another was in flight.
    pending: bool,
    last_loaded_id: Option<String>,
    /// The province's full district list, before narrowing.
    all_districts: Option<Arc<FeatureCollection>>,
}

impl Inner {
    fn settle_phase(&mut self) {
        self.state.phase = if self.state.is_transitioning {
            Phase::Zooming
        } else {
            Phase::Idle
        };
    }

    /// Whether the selection moved on while the last load was in flight:
    /// a queued request, or a district id changed through the bridge that
    /// has not been loaded yet. Clears the queued flag.
    fn needs_rerun(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending);
        let unloaded = !self.state.is_transitioning
            && self.state.selected_district_id.is_some()
            && self.state.selected_district_id != self.last_loaded_id;
        pending || unloaded
    }

    fn narrow_districts(&mut self) {
        let Some(all) = &self.all_districts else {
            return;
        };
        self.state.districts = Some(match &self.state.selected_district_id {
            Some(id) => {
                let mut narrowed = (**all).clone();
                narrowed.retain_district(id);
                Arc::new(narrowed)
            }
            None => all.clone(),
        });
    }
}

/// Drives one session's drill-down.
///
/// Share it as `Arc<Orchestrator>`; every method takes `&self`. State
/// lives behind a mutex that is never held across an `.await`.
pub struct Orchestrator {
    loader: CollectionLoader,
    inner: Mutex<Inner>,
    tx: watch::Sender<SelectionState>,
}

/// Releases the loading flag however the load ends, including when the
/// load future is dropped.
struct LoadingGuard<'a> {
    orchestrator: &'a Orchestrator,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.update(|inner| {
            inner.loading = false;
            if inner.state.phase == Phase::SubdistrictLoading {
                inner.settle_phase();
            }
        });
    }
}

impl Orchestrator {
    /// An orchestrator with an empty selection.
    #[must_use]
    pub fn new(loader: CollectionLoader) -> Self {
        let (tx, _rx) = watch::channel(SelectionState::default());
        Self {
            loader,
            inner: Mutex::new(Inner::default()),
            tx,
        }
    }

    /// The loader used for every fetch.
    #[must_use]
    pub const fn loader(&self) -> &CollectionLoader {
        &self.loader
    }

    /// Receives every published selection change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.tx.subscribe()
    }

    /// The current selection.
    #[must_use]
    pub fn snapshot(&self) -> SelectionState {
        self.lock().state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutates the state and publishes the result.
    fn update<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.lock();
        let out = f(&mut inner);
        self.tx.send_replace(inner.state.clone());
        out
    }

    /// Loads the province boundaries into the selection.
    ///
    /// # Errors
    ///
    /// Returns the failure of the provinces file.
    pub async fn load_provinces(&self) -> Result<Arc<FeatureCollection>, LoaderError> {
        let provinces = Arc::new(self.loader.load_provinces().await?);
        self.update(|inner| inner.state.provinces = Some(provinces.clone()));
        Ok(provinces)
    }

    /// Handles a click on a province polygon.
    ///
    /// Clears any district selection and its subdistricts, resolves the
    /// province code (registry by name first, then the feature's own id)
    /// and loads the province's districts. Returns the province code, or
    /// `None` when the feature carries no usable name or code.
    pub async fn select_province(&self, props: &JsonObject) -> Option<String> {
        let Some(name) = province_name(props) else {
            log::info!("Clicked province has no recognizable name; no selection change");
            return None;
        };

        let generation = self.update(|inner| {
            inner.province_generation += 1;
            inner.token += 1;
            inner.pending = false;
            inner.last_loaded_id = None;
            inner.all_districts = None;
            inner.state = SelectionState {
                selected_province: Some(name.clone()),
                phase: Phase::ProvinceResolving,
                provinces: inner.state.provinces.take(),
                ..SelectionState::default()
            };
            inner.province_generation
        });

        let code = self
            .loader
            .registry()
            .lookup_province(&name)
            .map(|p| p.id.clone())
            .or_else(|| province_id(props).and_then(|raw| first_digit_run(&raw).map(String::from)));

        let Some(code) = code else {
            log::info!("Province '{name}' has no resolvable code; no districts loaded");
            self.update(|inner| {
                if inner.province_generation == generation {
                    inner.state.phase = Phase::Idle;
                }
            });
            return None;
        };

        log::info!("Selected province {name} ({code})");
        self.update(|inner| {
            if inner.province_generation == generation {
                inner.state.selected_province_id = Some(code.clone());
                inner.state.phase = Phase::DistrictListLoading;
            }
        });

        let result = self.loader.load_districts(&code).await;

        self.update(|inner| {
            if inner.province_generation != generation {
                log::debug!("Discarding district list of province {code}: selection changed");
                return;
            }
            let districts = match result {
                Ok(districts) => districts,
                Err(e) => {
                    log::error!("Failed to load districts of province {code}: {e}");
                    inner.state.last_error = Some(e.to_string());
                    FeatureCollection::empty(AdminLevel::District)
                }
            };
            inner.all_districts = Some(Arc::new(districts));
            inner.narrow_districts();
            if inner.state.phase == Phase::DistrictListLoading {
                inner.settle_phase();
            }
        });

        Some(code)
    }

    /// Handles a click on a district polygon.
    ///
    /// Resolves the district through the registry, starts the zoom and
    /// records the selection. Subdistricts load once [`Self::finish_zoom`]
    /// is called. Returns `None` when the feature carries no usable name
    /// or id.
    pub fn select_district(&self, props: &JsonObject) -> Option<LocatedDistrict> {
        let Some(located) = self.loader.registry().locate_district(props) else {
            log::info!("Clicked district has no recognizable name or id; no selection change");
            return None;
        };

        log::info!("Selected district {} ({})", located.name, located.canonical_id);
        self.start_zoom();
        self.set_selected_district(Some(located.name.clone()));
        self.set_selected_district_id(Some(located.canonical_id.clone()));
        Some(located)
    }

    /// Marks a zoom animation as running. Subdistrict loads wait for it.
    pub fn start_zoom(&self) {
        self.update(|inner| {
            inner.state.is_transitioning = true;
            inner.state.phase = Phase::Zooming;
        });
    }

    /// Marks the zoom animation as finished and loads the selected
    /// district's subdistricts if they are not loaded yet.
    pub async fn finish_zoom(&self) -> Option<LoadResult> {
        self.update(|inner| {
            inner.state.is_transitioning = false;
            if inner.state.phase == Phase::Zooming {
                inner.state.phase = if inner.loading {
                    Phase::SubdistrictLoading
                } else {
                    Phase::Idle
                };
            }
        });
        self.maybe_load_subdistricts().await
    }

    /// Clears the district selection, returning to the province's district
    /// list.
    pub fn back_to_province(&self) {
        self.update(|inner| {
            inner.token += 1;
            inner.pending = false;
            inner.last_loaded_id = None;
            inner.state.selected_district = None;
            inner.state.selected_district_id = None;
            inner.state.subdistricts = None;
            inner.state.is_transitioning = false;
            inner.state.last_error = None;
            inner.narrow_districts();
            inner.settle_phase();
        });
    }

    /// Clears the whole selection, returning to the country view.
    pub fn reset(&self) {
        self.update(|inner| {
            inner.province_generation += 1;
            inner.token += 1;
            inner.pending = false;
            inner.last_loaded_id = None;
            inner.all_districts = None;
            inner.state = SelectionState {
                provinces: inner.state.provinces.take(),
                ..SelectionState::default()
            };
        });
    }

    /// Loads the selected district's subdistricts unless a zoom is
    /// running, the district is the one last loaded, or a load is already
    /// in flight (in which case the request is remembered and served when
    /// that load ends).
    ///
    /// Returns the result that was applied to the selection, if any.
    pub async fn maybe_load_subdistricts(&self) -> Option<LoadResult> {
        let mut applied = None;
        loop {
            let request = self.update(|inner| {
                if inner.state.is_transitioning {
                    log::debug!("Subdistrict load held back: zoom in progress");
                    return None;
                }
                let id = inner.state.selected_district_id.clone()?;
                if inner.last_loaded_id.as_deref() == Some(id.as_str()) {
                    log::debug!("Subdistricts of {id} already loaded");
                    return None;
                }
                if inner.loading {
                    log::debug!("Subdistrict load of {id} queued behind the one in flight");
                    inner.pending = true;
                    return None;
                }
                inner.loading = true;
                inner.pending = false;
                inner.token += 1;
                inner.state.phase = Phase::SubdistrictLoading;
                Some((id, inner.token))
            });

            let Some((id, token)) = request else {
                return applied;
            };

            let guard = LoadingGuard { orchestrator: self };
            let result = self.loader.load_subdistricts(&id).await;
            applied = self.apply_subdistricts(&id, token, result);
            drop(guard);

            if !self.lock().needs_rerun() {
                return applied;
            }
        }
    }

    fn apply_subdistricts(&self, id: &str, token: u64, result: LoadResult) -> Option<LoadResult> {
        self.update(|inner| {
            let current = inner.state.selected_district_id.as_deref() == Some(id);
            if inner.token != token || !current {
                log::debug!("Discarding stale subdistrict result for {id}");
                return None;
            }

            inner.last_loaded_id = Some(id.to_string());
            if result.success {
                inner.state.subdistricts = result.data.clone().map(Arc::new);
                inner.state.last_error = None;
            } else {
                inner.state.subdistricts =
                    Some(Arc::new(FeatureCollection::empty(AdminLevel::Subdistrict)));
                inner.state.last_error.clone_from(&result.error);
            }
            Some(result)
        })
    }
}

#[async_trait]
impl SelectionBridge for Orchestrator {
    async fn set_zooming(&self, zooming: bool) -> Option<LoadResult> {
        if zooming {
            self.start_zoom();
            None
        } else {
            self.finish_zoom().await
        }
    }

    fn set_selected_district(&self, name: Option<String>) {
        self.update(|inner| inner.state.selected_district = name);
    }

    fn set_selected_district_id(&self, id: Option<String>) {
        self.update(|inner| {
            if inner.state.selected_district_id == id {
                return;
            }
            inner.token += 1;
            inner.state.selected_district_id = id;
            inner.state.subdistricts = None;
            inner.state.last_error = None;
            inner.narrow_districts();
        });
    }

    async fn load_subdistrict_data(&self, district_id: &str) -> Option<LoadResult> {
        let id = self
            .loader
            .registry()
            .lookup_district(district_id)
            .map_or_else(|| district_id.trim().to_string(), |d| d.id.clone());
        self.set_selected_district_id(Some(id));
        self.maybe_load_subdistricts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wilayah_boundary_models::properties_of;
    use wilayah_loader::{LoaderConfig, MemorySource};
    use wilayah_properties::district_id;
    use wilayah_registry::HierarchyRegistry;

    const BADUNG_UUID: &str = "46b426f4-ef81-486e-bfc6-d5e2fc09bc41";

    fn props(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn feature(props: &serde_json::Value) -> serde_json::Value {
        json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [115.2, -8.6]},
            "properties": props
        })
    }

    fn collection(features: &[serde_json::Value]) -> String {
        json!({"type": "FeatureCollection", "features": features}).to_string()
    }

    fn district_files(id: &str) -> Vec<String> {
        let registry = HierarchyRegistry::embedded();
        let district = registry.lookup_district(id).unwrap();
        district
            .subdistricts
            .iter()
            .map(|f| district.subdistrict_path(f))
            .collect()
    }

    fn serve_district(source: &MemorySource, id: &str) {
        for (i, path) in district_files(id).into_iter().enumerate() {
            source.insert(path, collection(&[feature(&json!({"OBJECTID": i}))]));
        }
    }

    fn serve_bali_districts(source: &MemorySource) {
        source.insert(
            "/data/kab_51.geojson",
            collection(&[
                feature(&json!({"kab_name": "Badung", "regency_code": "5103"})),
                feature(&json!({"kab_name": "Klungkung", "regency_code": "5105"})),
                feature(&json!({"kab_name": "Banyuwangi", "regency_code": "3510"})),
            ]),
        );
    }

    fn orchestrator(source: &Arc<MemorySource>) -> Arc<Orchestrator> {
        let loader = CollectionLoader::new(
            Arc::new(HierarchyRegistry::embedded()),
            source.clone(),
            LoaderConfig::default(),
        );
        Arc::new(Orchestrator::new(loader))
    }

    #[tokio::test]
    async fn province_click_loads_only_its_districts() {
        let source = Arc::new(MemorySource::new());
        serve_bali_districts(&source);
        let orchestrator = orchestrator(&source);

        let code = orchestrator
            .select_province(&props(json!({"prov_name": "Bali"})))
            .await;
        assert_eq!(code.as_deref(), Some("51"));

        let state = orchestrator.snapshot();
        assert_eq!(state.selected_province.as_deref(), Some("Bali"));
        assert_eq!(state.selected_province_id.as_deref(), Some("51"));
        assert_eq!(state.phase, Phase::Idle);

        let districts = state.districts.unwrap();
        assert_eq!(districts.len(), 2);
        for f in districts.iter() {
            assert!(district_id(properties_of(f)).unwrap().starts_with("51"));
        }
    }

    #[tokio::test]
    async fn nameless_province_click_changes_nothing() {
        let source = Arc::new(MemorySource::new());
        let orchestrator = orchestrator(&source);

        assert_eq!(orchestrator.select_province(&props(json!({"luas": 1}))).await, None);
        assert_eq!(orchestrator.snapshot(), SelectionState::default());
        assert_eq!(source.total_fetches(), 0);
    }

    #[tokio::test]
    async fn failed_district_list_is_empty_not_missing() {
        let source = Arc::new(MemorySource::new());
        let orchestrator = orchestrator(&source);

        orchestrator
            .select_province(&props(json!({"prov_name": "Bali"})))
            .await;
        let state = orchestrator.snapshot();
        assert!(state.districts.unwrap().is_empty());
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn badung_click_loads_six_files_after_zoom() {
        let source = Arc::new(MemorySource::new());
        serve_district(&source, "5103");
        let orchestrator = orchestrator(&source);

        let located = orchestrator
            .select_district(&props(json!({"NAMA": "Badung", "id": BADUNG_UUID})))
            .unwrap();
        assert_eq!(located.canonical_id, "5103");

        let state = orchestrator.snapshot();
        assert!(state.is_transitioning);
        assert_eq!(state.phase, Phase::Zooming);
        assert_eq!(source.total_fetches(), 0, "loading waits for the zoom");

        let result = orchestrator.finish_zoom().await.unwrap();
        assert_eq!(result.loaded_count, Some(6));
        for path in district_files("5103") {
            assert!(path.starts_with("/data/id51_bali/id5103_badung/"));
            assert_eq!(source.fetch_count(&path), 1);
        }

        let state = orchestrator.snapshot();
        assert_eq!(state.selected_district.as_deref(), Some("Badung"));
        assert_eq!(state.selected_district_id.as_deref(), Some("5103"));
        assert_eq!(state.subdistricts.unwrap().len(), 6);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn reselecting_the_same_district_does_not_refetch() {
        let source = Arc::new(MemorySource::new());
        serve_district(&source, "5103");
        let orchestrator = orchestrator(&source);
        let badung = props(json!({"kab_name": "Badung"}));

        orchestrator.select_district(&badung);
        orchestrator.finish_zoom().await;
        orchestrator.select_district(&badung);
        assert_eq!(orchestrator.finish_zoom().await, None);

        assert_eq!(source.total_fetches(), 6);
        assert_eq!(orchestrator.snapshot().subdistricts.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn failed_load_leaves_empty_collection() {
        let source = Arc::new(MemorySource::new());
        let orchestrator = orchestrator(&source);

        orchestrator.select_district(&props(json!({"kab_name": "Badung"})));
        let result = orchestrator.finish_zoom().await.unwrap();
        assert!(!result.success);

        let state = orchestrator.snapshot();
        assert!(state.subdistricts.unwrap().is_empty());
        assert!(state.last_error.unwrap().contains("Badung (5103)"));
        assert_eq!(state.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn unregistered_district_fails_cleanly() {
        let source = Arc::new(MemorySource::new());
        let orchestrator = orchestrator(&source);

        orchestrator.select_district(&props(json!({"regency_code": "9471"})));
        let result = orchestrator.finish_zoom().await.unwrap();
        assert_eq!(
            result.error.as_deref(),
            Some("No configuration found for district ID: 9471")
        );
        assert!(orchestrator.snapshot().subdistricts.unwrap().is_empty());
    }

    #[tokio::test]
    async fn province_change_clears_district_and_subdistricts() {
        let source = Arc::new(MemorySource::new());
        serve_district(&source, "5103");
        serve_bali_districts(&source);
        let orchestrator = orchestrator(&source);

        orchestrator.select_district(&props(json!({"kab_name": "Badung"})));
        orchestrator.finish_zoom().await;
        assert!(orchestrator.snapshot().subdistricts.is_some());

        orchestrator
            .select_province(&props(json!({"Propinsi": "Jawa Timur"})))
            .await;
        let state = orchestrator.snapshot();
        assert_eq!(state.selected_province.as_deref(), Some("Jawa Timur"));
        assert_eq!(state.selected_district, None);
        assert_eq!(state.selected_district_id, None);
        assert_eq!(state.subdistricts, None);
    }

    #[tokio::test]
    async fn district_selection_narrows_district_list() {
        let source = Arc::new(MemorySource::new());
        serve_bali_districts(&source);
        serve_district(&source, "5103");
        serve_district(&source, "5105");
        let orchestrator = orchestrator(&source);

        orchestrator
            .select_province(&props(json!({"prov_name": "Bali"})))
            .await;
        orchestrator.select_district(&props(json!({"kab_name": "Badung"})));
        assert_eq!(orchestrator.snapshot().districts.unwrap().len(), 1);

        orchestrator.select_district(&props(json!({"kab_name": "Klungkung"})));
        let districts = orchestrator.snapshot().districts.unwrap();
        assert_eq!(districts.len(), 1);
        assert_eq!(
            district_id(properties_of(&districts.features[0])).as_deref(),
            Some("5105")
        );

        orchestrator.back_to_province();
        let state = orchestrator.snapshot();
        assert_eq!(state.districts.unwrap().len(), 2);
        assert_eq!(state.selected_district_id, None);
    }

    #[tokio::test]
    async fn stale_result_is_discarded() {
        let source = Arc::new(MemorySource::new());
        serve_district(&source, "5103");
        serve_district(&source, "5105");
        let badung_files = district_files("5103");
        let gate = source.gate(badung_files[0].clone());
        let orchestrator = orchestrator(&source);

        orchestrator.select_district(&props(json!({"kab_name": "Badung"})));
        let first = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.finish_zoom().await }
        });

        tokio::time::timeout(Duration::from_secs(5), async {
            while source.fetch_count(&badung_files[0]) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(orchestrator.snapshot().phase, Phase::SubdistrictLoading);

        orchestrator.select_district(&props(json!({"kab_name": "Klungkung"})));
        assert_eq!(orchestrator.finish_zoom().await, None, "queued behind 5103");

        gate.notify_one();
        let applied = first.await.unwrap().unwrap();
        assert_eq!(
            applied.data.as_ref().unwrap().parent_id.as_deref(),
            Some("5105")
        );

        let state = orchestrator.snapshot();
        assert_eq!(state.selected_district_id.as_deref(), Some("5105"));
        assert_eq!(
            state.subdistricts.unwrap().parent_id.as_deref(),
            Some("5105")
        );
        assert_eq!(source.fetch_count(badung_files.last().unwrap()), 1);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn bridge_selection_during_load_is_loaded_next() {
        let source = Arc::new(MemorySource::new());
        serve_district(&source, "5103");
        serve_district(&source, "5105");
        let badung_files = district_files("5103");
        let gate = source.gate(badung_files[0].clone());
        let orchestrator = orchestrator(&source);
        let bridge: Arc<dyn SelectionBridge> = orchestrator.clone();

        let first = tokio::spawn({
            let bridge = bridge.clone();
            async move { bridge.load_subdistrict_data("5103").await }
        });

        tokio::time::timeout(Duration::from_secs(5), async {
            while source.fetch_count(&badung_files[0]) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        bridge.set_selected_district_id(Some("5105".to_string()));
        gate.notify_one();

        let applied = first.await.unwrap().unwrap();
        assert_eq!(
            applied.data.as_ref().unwrap().parent_id.as_deref(),
            Some("5105")
        );
        for path in district_files("5105") {
            assert_eq!(source.fetch_count(&path), 1);
        }

        let state = orchestrator.snapshot();
        assert_eq!(state.selected_district_id.as_deref(), Some("5105"));
        assert_eq!(
            state.subdistricts.unwrap().parent_id.as_deref(),
            Some("5105")
        );
        assert_eq!(state.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn bridge_load_resolves_identifiers() {
        let source = Arc::new(MemorySource::new());
        serve_district(&source, "5103");
        let orchestrator = orchestrator(&source);
        let bridge: Arc<dyn SelectionBridge> = orchestrator.clone();

        let result = bridge.load_subdistrict_data(BADUNG_UUID).await.unwrap();
        assert!(result.success);
        assert_eq!(
            orchestrator.snapshot().selected_district_id.as_deref(),
            Some("5103")
        );
    }

    #[tokio::test]
    async fn bridge_zoom_holds_loading() {
        let source = Arc::new(MemorySource::new());
        serve_district(&source, "5103");
        let orchestrator = orchestrator(&source);
        let bridge: Arc<dyn SelectionBridge> = orchestrator.clone();

        assert_eq!(bridge.set_zooming(true).await, None);
        assert_eq!(bridge.load_subdistrict_data("5103").await, None);
        assert_eq!(source.total_fetches(), 0);

        let result = bridge.set_zooming(false).await.unwrap();
        assert_eq!(result.loaded_count, Some(6));
    }

    #[tokio::test]
    async fn changes_are_published() {
        let source = Arc::new(MemorySource::new());
        let orchestrator = orchestrator(&source);
        let mut rx = orchestrator.subscribe();

        orchestrator.select_district(&props(json!({"kab_name": "Badung"})));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().selected_district_id.as_deref(), Some("5103"));

        orchestrator.reset();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), SelectionState::default());
    }
}
