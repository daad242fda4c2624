//! Local directory data source.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::DataSource;
use crate::LoaderError;

/// Reads files under a static root: `/data/x.geojson` resolves to
/// `<root>/data/x.geojson`.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// A source rooted at `root`.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The static root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `path` under the root, refusing anything that would climb
    /// out of it.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::InvalidPath`] for paths with `..` or prefix
    /// components.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, LoaderError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(LoaderError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch_text(&self, path: &str) -> Result<String, LoaderError> {
        let full = self.resolve(path)?;
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LoaderError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self, path: &str) -> String {
        self.resolve(path)
            .map_or_else(|_| path.to_string(), |p| p.display().to_string())
    }
}
