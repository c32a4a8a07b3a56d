//! Progress reporting for downloads.
//!
//! [`DownloadProgress`] keeps the downloader independent of any rendering
//! backend. The CLI supplies an `indicatif` implementation; tests and
//! headless callers use [`NullProgress`].

use std::sync::Arc;

/// Receives byte-level download progress.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// tokio tasks.
pub trait DownloadProgress: Send + Sync {
    /// A transfer started. `total_bytes` is the content length, if known.
    fn start(&self, label: &str, total_bytes: Option<u64>);

    /// `bytes` more bytes were written.
    fn advance(&self, bytes: u64);

    /// The transfer finished.
    fn finish(&self, message: String);
}

/// Ignores every update.
pub struct NullProgress;

impl DownloadProgress for NullProgress {
    fn start(&self, _label: &str, _total_bytes: Option<u64>) {}
    fn advance(&self, _bytes: u64) {}
    fn finish(&self, _message: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn DownloadProgress> {
    Arc::new(NullProgress)
}
