//! The handle interaction callbacks use to drive the orchestrator.
//!
//! Callbacks attached to rendered polygons receive an
//! `Arc<dyn SelectionBridge>` when they are created instead of reaching
//! for shared global state.

use async_trait::async_trait;
use wilayah_boundary_models::LoadResult;

/// Selection commands available to interaction handlers.
#[async_trait]
pub trait SelectionBridge: Send + Sync {
    /// Marks a zoom animation as running or finished. Finishing a zoom lets
    /// a pending subdistrict load start.
    async fn set_zooming(&self, zooming: bool) -> Option<LoadResult>;

    /// Sets the selected district's display name.
    fn set_selected_district(&self, name: Option<String>);

    /// Sets the selected district's canonical id. A different id
    /// supersedes any load in flight.
    fn set_selected_district_id(&self, id: Option<String>);

    /// Selects `district_id` and loads its subdistricts unless a zoom is
    /// running, the district is already loaded, or a load is in flight.
    /// Returns the result applied to the selection, if any.
    async fn load_subdistrict_data(&self, district_id: &str) -> Option<LoadResult>;
}
