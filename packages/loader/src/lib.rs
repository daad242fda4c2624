#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Boundary collection loading.
//!
//! The [`CollectionLoader`] fetches province, district and subdistrict
//! `GeoJSON` files through a [`DataSource`], validates them, enriches the
//! features with canonical identifiers, and merges per-subdistrict files
//! into one collection. A missing or broken file is a soft failure: it is
//! logged and skipped, and when every subdistrict file of a district fails
//! the district-level fallback file is served instead.

pub mod collection;
pub mod config;
pub mod parse;
pub mod progress;
pub mod retry;
pub mod source;

#[cfg(test)]
mod test_server;

use std::time::Duration;

pub use collection::CollectionLoader;
pub use config::{DataLocation, LoaderConfig};
pub use progress::{NullProgress, ProgressCallback, null_progress};
pub use source::{DataSource, file::FileSource, http::HttpSource, memory::MemorySource};

/// Errors that can occur while fetching or parsing one file.
///
/// The subdistrict loader never surfaces these individually; they are
/// logged as soft failures.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {path}")]
    Status {
        /// Requested path.
        path: String,
        /// Response status code.
        status: u16,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (local file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The body is an HTML page, typically a single-page-app fallback or an
    /// error page served for a missing file.
    #[error("Received HTML instead of JSON for {path}")]
    Html {
        /// Requested path.
        path: String,
    },

    /// The document is JSON but not a feature collection.
    #[error("Invalid GeoJSON in {path}: {message}")]
    InvalidDocument {
        /// Requested path.
        path: String,
        /// What is wrong with it.
        message: String,
    },

    /// The collection holds no usable features.
    #[error("No features found in {path}")]
    NoFeatures {
        /// Requested path.
        path: String,
    },

    /// The path does not exist in the data source.
    #[error("Not found: {path}")]
    NotFound {
        /// Requested path.
        path: String,
    },

    /// The path escapes the data root.
    #[error("Refusing path outside the data root: {path}")]
    InvalidPath {
        /// Requested path.
        path: String,
    },

    /// The fetch did not finish in time.
    #[error("Timed out after {after:?} fetching {path}")]
    Timeout {
        /// Requested path.
        path: String,
        /// Deadline that elapsed.
        after: Duration,
    },

    /// The province is unknown and no districts file is configured.
    #[error("No configuration found for province ID: {0}")]
    UnknownProvince(String),
}
