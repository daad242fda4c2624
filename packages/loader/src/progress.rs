//! Progress reporting for multi-file loads.
//!
//! Decouples progress reporting from any rendering backend (`indicatif`
//! bars in the CLI, silence in the server and tests).

use std::sync::Arc;

/// Receives per-file progress from the loader.
///
/// Implementations must be `Send + Sync` so one instance can be shared by
/// a loader used from several tasks.
pub trait ProgressCallback: Send + Sync {
    /// Set the number of files about to be fetched.
    fn set_total(&self, total: u64);

    /// Advance by `delta` files.
    fn inc(&self, delta: u64);

    /// Show which file is being fetched.
    fn set_message(&self, msg: String);

    /// Mark the load complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
