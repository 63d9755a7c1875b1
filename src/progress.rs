//! Progress-callback trait for per-file booklet events.
//!
//! Inject an [`Arc<dyn BuildProgressCallback>`] via
//! [`crate::config::BookletConfigBuilder::progress_callback`] to be told when
//! each source file starts and finishes converting. The CLI renders these
//! events as a progress bar; library callers can log them, forward them to a
//! channel, or ignore them.
//!
//! # Example
//!
//! ```rust
//! use score_booklet::{BookletConfig, BuildProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl BuildProgressCallback for PageCounter {
//!     fn on_file_complete(&self, _index: usize, _total: usize, key: &str, pages: usize) {
//!         self.pages.fetch_add(pages, Ordering::SeqCst);
//!         eprintln!("{key}: {pages} pages");
//!     }
//! }
//!
//! let config = BookletConfig::builder()
//!     .progress_callback(Arc::new(PageCounter { pages: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the booklet pipeline as it converts each resolved input.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive strictly in input order.
pub trait BuildProgressCallback: Send + Sync {
    /// Called once, after inputs are resolved and before any conversion.
    ///
    /// # Arguments
    /// * `total_files`: number of resolved inputs (cover included)
    fn on_build_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before a source file is read and rasterised.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the resolved input list
    /// * `total`: number of resolved inputs
    /// * `key`  : store key of the source file
    fn on_file_start(&self, index: usize, total: usize, key: &str) {
        let _ = (index, total, key);
    }

    /// Called when a source file has been converted and appended.
    ///
    /// # Arguments
    /// * `pages`: number of pages the file contributed
    fn on_file_complete(&self, index: usize, total: usize, key: &str, pages: usize) {
        let _ = (index, total, key, pages);
    }

    /// Called once after the final document has been written.
    fn on_build_complete(&self, total_files: usize, total_pages: usize) {
        let _ = (total_files, total_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BuildProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BookletConfig`].
pub type ProgressCallback = Arc<dyn BuildProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        file_starts: Mutex<Vec<String>>,
        pages: AtomicUsize,
        completed_pages: AtomicUsize,
    }

    impl BuildProgressCallback for TrackingCallback {
        fn on_build_start(&self, total_files: usize) {
            self.started_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, key: &str) {
            self.file_starts.lock().unwrap().push(key.to_string());
        }

        fn on_file_complete(&self, _index: usize, _total: usize, _key: &str, pages: usize) {
            self.pages.fetch_add(pages, Ordering::SeqCst);
        }

        fn on_build_complete(&self, _total_files: usize, total_pages: usize) {
            self.completed_pages.store(total_pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_build_start(2);
        cb.on_file_start(1, 2, "page_garde.pdf");
        cb.on_file_complete(1, 2, "page_garde.pdf", 1);
        cb.on_build_complete(2, 3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_build_start(2);
        tracker.on_file_start(1, 2, "scores/intro.pdf");
        tracker.on_file_complete(1, 2, "scores/intro.pdf", 1);
        tracker.on_file_start(2, 2, "scores/waltz-1.pdf");
        tracker.on_file_complete(2, 2, "scores/waltz-1.pdf", 2);
        tracker.on_build_complete(2, 3);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(
            *tracker.file_starts.lock().unwrap(),
            vec!["scores/intro.pdf", "scores/waltz-1.pdf"]
        );
        assert_eq!(tracker.pages.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completed_pages.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_build_start(10);
        cb.on_file_start(1, 10, "a.pdf");
    }
}
