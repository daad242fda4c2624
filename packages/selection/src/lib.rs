#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection state and load orchestration for the drill-down map.
//!
//! The [`Orchestrator`] owns one session's [`SelectionState`]. It sequences
//! province → district → subdistrict loads, holds subdistrict loading back
//! while a zoom animation runs, never fetches the same district twice in a
//! row, and discards completions that a newer selection has overtaken.
//! Every change is published on a `watch` channel.

pub mod bridge;
pub mod interaction;
pub mod orchestrator;

use std::sync::Arc;

use strum_macros::{AsRefStr, Display};
use wilayah_boundary_models::FeatureCollection;

pub use bridge::SelectionBridge;
pub use interaction::DistrictClickHandler;
pub use orchestrator::Orchestrator;

/// Where the orchestrator is in a drill-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A province was picked; its code is being resolved.
    ProvinceResolving,
    /// The province's district collection is loading.
    DistrictListLoading,
    /// A district was picked and the map is animating towards it.
    Zooming,
    /// The district's subdistrict files are loading.
    SubdistrictLoading,
}

/// One session's selection. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Selected province name.
    pub selected_province: Option<String>,
    /// Resolved 2-digit code of the selected province.
    pub selected_province_id: Option<String>,
    /// Selected district name.
    pub selected_district: Option<String>,
    /// Canonical id of the selected district.
    pub selected_district_id: Option<String>,
    /// A zoom animation is running; subdistrict loading waits for it.
    pub is_transitioning: bool,
    /// Current phase.
    pub phase: Phase,
    /// Province boundaries, once loaded.
    pub provinces: Option<Arc<FeatureCollection>>,
    /// Districts of the selected province (narrowed to the selected
    /// district once one is picked).
    pub districts: Option<Arc<FeatureCollection>>,
    /// Subdistricts of the selected district. An empty collection means
    /// the load failed; `None` means nothing is selected.
    pub subdistricts: Option<Arc<FeatureCollection>>,
    /// Error of the most recent failed load.
    pub last_error: Option<String>,
}
