//! Error types for the score-booklet library.
//!
//! Every failure in a booklet run is fatal: there is no retry and no partial
//! output. The one tolerated condition, a score file that is absent from the
//! store, is not an error at all; it is reported as
//! [`crate::store::Presence::Missing`] and skipped by the resolver.

use thiserror::Error;

/// All errors returned by the score-booklet library.
#[derive(Debug, Error)]
pub enum BookletError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The catalog or the backing store could not be reached, read or parsed.
    #[error("Resource '{resource}' is unavailable: {detail}")]
    ResourceUnavailable { resource: String, detail: String },

    /// A catalog row carries a version count that is not an integer in
    /// `1..=MAX_VERSION_COUNT`.
    #[error("Invalid version count '{value}' for '{file_name}' (expected an integer from 1 to 65535)")]
    InvalidVersionCount { file_name: String, value: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// A source PDF exists but could not be parsed or rasterised.
    #[error("Failed to convert '{source_key}': {detail}")]
    ConversionFailed { source_key: String, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The final document could not be serialised or stored.
    #[error("Failed to write output '{key}': {detail}")]
    OutputWriteFailed { key: String, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib), place the\n\
platform library in the working directory, or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookletError {
    pub(crate) fn unavailable(resource: impl Into<String>, detail: impl ToString) -> Self {
        BookletError::ResourceUnavailable {
            resource: resource.into(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn conversion(source_key: impl Into<String>, detail: impl ToString) -> Self {
        BookletError::ConversionFailed {
            source_key: source_key.into(),
            detail: detail.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BookletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_version_count_display() {
        let e = BookletError::InvalidVersionCount {
            file_name: "waltz".into(),
            value: "0".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("waltz"), "got: {msg}");
        assert!(msg.contains("'0'"), "got: {msg}");
    }

    #[test]
    fn conversion_failed_display() {
        let e = BookletError::conversion("partitions_individuelles/intro.pdf", "bad xref");
        let msg = e.to_string();
        assert!(msg.contains("intro.pdf"));
        assert!(msg.contains("bad xref"));
    }

    #[test]
    fn resource_unavailable_display() {
        let e = BookletError::unavailable("liste.csv", "connection refused");
        assert!(e.to_string().contains("liste.csv"));
        assert!(e.to_string().contains("connection refused"));
    }
}
