#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the wilayah toolchain.
//!
//! Provides `indicatif`-backed progress bars behind the loader's
//! [`ProgressCallback`] trait, plus [`init_logger`] which sets up
//! `indicatif-log-bridge` so that `log::info!` and friends are suspended
//! while progress bars redraw.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use wilayah_loader::ProgressCallback;

pub use indicatif::MultiProgress;

/// An `indicatif` progress reporter that implements [`ProgressCallback`].
///
/// Every load (each `set_total()` call) gets a fresh bar on the shared
/// [`MultiProgress`], so one reporter can serve a whole session.
pub struct IndicatifProgress {
    multi: MultiProgress,
    style: ProgressStyle,
    current: Mutex<Option<ProgressBar>>,
}

impl IndicatifProgress {
    /// Creates a reporter for file fetches.
    #[must_use]
    pub fn files(multi: &MultiProgress) -> Arc<dyn ProgressCallback> {
        let style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {pos}/{len} files [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self {
            multi: multi.clone(),
            style,
            current: Mutex::new(None),
        })
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = current.as_ref() {
            f(bar);
        }
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(self.style.clone());
        bar.enable_steady_tick(Duration::from_millis(100));
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(bar);
    }

    fn inc(&self, delta: u64) {
        self.with_bar(|bar| bar.inc(delta));
    }

    fn set_message(&self, msg: String) {
        self.with_bar(|bar| bar.set_message(msg));
    }

    fn finish(&self, msg: String) {
        self.with_bar(|bar| bar.finish_with_message(msg));
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // already set in tests

    log::set_max_level(level);

    multi
}
