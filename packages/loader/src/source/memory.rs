//! In-memory data source.
//!
//! Serves canned bodies keyed by path. Used for offline demos and as the
//! test double for everything built on the loader: responses can be held
//! back behind a gate to simulate slow networks.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::DataSource;
use crate::LoaderError;

#[derive(Debug, Clone)]
enum Canned {
    Body(String),
    Status(u16),
}

#[derive(Default)]
struct Inner {
    responses: BTreeMap<String, Canned>,
    gates: BTreeMap<String, Arc<Notify>>,
    fetches: BTreeMap<String, usize>,
}

/// A [`DataSource`] backed by a map of path to canned response. Unknown
/// paths answer HTTP 404.
#[derive(Default)]
pub struct MemorySource {
    inner: Mutex<Inner>,
}

impl MemorySource {
    /// An empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    /// Serves `body` at `path`.
    pub fn insert(&self, path: impl Into<String>, body: impl Into<String>) {
        self.with_inner(|inner| {
            inner.responses.insert(path.into(), Canned::Body(body.into()));
        });
    }

    /// Answers `path` with an HTTP error status.
    pub fn insert_status(&self, path: impl Into<String>, status: u16) {
        self.with_inner(|inner| {
            inner.responses.insert(path.into(), Canned::Status(status));
        });
    }

    /// Holds every fetch of `path` until the returned handle is notified
    /// (`notify_one` releases one fetch, even one that has not started).
    pub fn gate(&self, path: impl Into<String>) -> Arc<Notify> {
        self.with_inner(|inner| {
            inner
                .gates
                .entry(path.into())
                .or_insert_with(|| Arc::new(Notify::new()))
                .clone()
        })
    }

    /// How many times `path` has been fetched.
    #[must_use]
    pub fn fetch_count(&self, path: &str) -> usize {
        self.with_inner(|inner| inner.fetches.get(path).copied().unwrap_or(0))
    }

    /// Total fetches across all paths.
    #[must_use]
    pub fn total_fetches(&self) -> usize {
        self.with_inner(|inner| inner.fetches.values().sum())
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch_text(&self, path: &str) -> Result<String, LoaderError> {
        let gate = self.with_inner(|inner| {
            *inner.fetches.entry(path.to_string()).or_default() += 1;
            inner.gates.get(path).cloned()
        });

        if let Some(gate) = gate {
            gate.notified().await;
        }

        let canned = self.with_inner(|inner| inner.responses.get(path).cloned());
        match canned {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(status)) => Err(LoaderError::Status {
                path: path.to_string(),
                status,
            }),
            None => Err(LoaderError::Status {
                path: path.to_string(),
                status: 404,
            }),
        }
    }

    fn describe(&self, path: &str) -> String {
        format!("memory:{path}")
    }
}
