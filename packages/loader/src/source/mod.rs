//! Where boundary files come from.
//!
//! Paths are the catalog's absolute paths (`/data/id51_bali/...`); each
//! source decides how to resolve them.

pub mod file;
pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::LoaderError;

/// A source of raw boundary file bodies.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the body stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be read.
    async fn fetch_text(&self, path: &str) -> Result<String, LoaderError>;

    /// Human-readable location of `path`, for logs.
    fn describe(&self, path: &str) -> String {
        path.to_string()
    }
}
