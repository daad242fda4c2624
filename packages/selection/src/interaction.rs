//! Per-polygon interaction handlers.
//!
//! The renderer attaches one handler to every district polygon it draws.
//! Handlers only hold an `Arc<dyn SelectionBridge>`, so the renderer never
//! needs to know what owns the selection.

use std::sync::Arc;

use wilayah_boundary_models::{AdminLevel, Feature, JsonObject, LoadResult};
use wilayah_properties::collection::tooltip_label;
use wilayah_registry::HierarchyRegistry;
use wilayah_registry::locator::LocatedDistrict;

use crate::SelectionBridge;

/// Click and zoom callbacks for district polygons.
#[derive(Clone)]
pub struct DistrictClickHandler {
    bridge: Arc<dyn SelectionBridge>,
    registry: Arc<HierarchyRegistry>,
}

impl DistrictClickHandler {
    /// A handler that reports clicks through `bridge`.
    #[must_use]
    pub fn new(bridge: Arc<dyn SelectionBridge>, registry: Arc<HierarchyRegistry>) -> Self {
        Self { bridge, registry }
    }

    /// A district polygon was clicked.
    ///
    /// Starts the zoom before touching the selection so no subdistrict load
    /// can begin until [`Self::on_zoom_end`]. Returns `None` (and changes
    /// nothing) when the feature carries no usable name or id.
    pub async fn on_click(&self, props: &JsonObject) -> Option<LocatedDistrict> {
        let Some(located) = self.registry.locate_district(props) else {
            log::info!("Clicked district has no recognizable name or id; no selection change");
            return None;
        };

        if !located.registered {
            log::warn!(
                "District '{}' ({}) is not in the registry",
                located.name,
                located.canonical_id
            );
        }

        self.bridge.set_zooming(true).await;
        self.bridge.set_selected_district(Some(located.name.clone()));
        self.bridge
            .set_selected_district_id(Some(located.canonical_id.clone()));
        Some(located)
    }

    /// The zoom animation settled; lets the pending load run.
    pub async fn on_zoom_end(&self) -> Option<LoadResult> {
        self.bridge.set_zooming(false).await
    }

    /// Tooltip text for a hovered district polygon.
    #[must_use]
    pub fn hover_label(&self, feature: &Feature) -> Option<String> {
        tooltip_label(AdminLevel::District, feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBridge {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingBridge {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SelectionBridge for RecordingBridge {
        async fn set_zooming(&self, zooming: bool) -> Option<LoadResult> {
            self.record(format!("zooming={zooming}"));
            None
        }

        fn set_selected_district(&self, name: Option<String>) {
            self.record(format!("district={}", name.unwrap_or_default()));
        }

        fn set_selected_district_id(&self, id: Option<String>) {
            self.record(format!("district_id={}", id.unwrap_or_default()));
        }

        async fn load_subdistrict_data(&self, district_id: &str) -> Option<LoadResult> {
            self.record(format!("load={district_id}"));
            None
        }
    }

    fn handler(bridge: &Arc<RecordingBridge>) -> DistrictClickHandler {
        DistrictClickHandler::new(bridge.clone(), Arc::new(HierarchyRegistry::embedded()))
    }

    fn props(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn click_zooms_then_selects_canonical_district() {
        let bridge = Arc::new(RecordingBridge::default());
        let handler = handler(&bridge);

        let located = handler
            .on_click(&props(json!({
                "NAME": "Badung",
                "id": "46b426f4-ef81-486e-bfc6-d5e2fc09bc41"
            })))
            .await
            .unwrap();

        assert_eq!(located.canonical_id, "5103");
        assert_eq!(
            bridge.calls(),
            vec!["zooming=true", "district=Badung", "district_id=5103"]
        );

        handler.on_zoom_end().await;
        assert_eq!(bridge.calls().last().map(String::as_str), Some("zooming=false"));
    }

    #[tokio::test]
    async fn click_without_identity_does_nothing() {
        let bridge = Arc::new(RecordingBridge::default());
        let handler = handler(&bridge);

        assert_eq!(handler.on_click(&props(json!({"luas": 12.5}))).await, None);
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn unregistered_click_keeps_raw_code() {
        let bridge = Arc::new(RecordingBridge::default());
        let handler = handler(&bridge);

        let located = handler
            .on_click(&props(json!({"kab_name": "Jayapura", "regency_code": 9403})))
            .await
            .unwrap();
        assert!(!located.registered);
        assert_eq!(located.canonical_id, "9403");
    }

    #[test]
    fn hover_label_uses_district_name() {
        let bridge = Arc::new(RecordingBridge::default());
        let handler = handler(&bridge);
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": {"KABUPATEN": "Klungkung"}
        }))
        .unwrap();

        assert_eq!(handler.hover_label(&feature).as_deref(), Some("Klungkung"));
    }
}
