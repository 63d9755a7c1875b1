//! # score-booklet
//!
//! Merge individual sheet-music PDFs into a single printable A5-landscape
//! booklet.
//!
//! A CSV catalog lists the pieces in playing order and how many versions of
//! each exist. Every matching PDF found in the store is rasterised, JPEG
//! compressed and centred on an A5-landscape page; the results are
//! concatenated behind an optional cover page. A second variant turns every
//! other page 180° for short-edge duplex printing.
//!
//! ## Pipeline Overview
//!
//! ```text
//! liste.csv
//!  │
//!  ├─ 1. Catalog  keep rows flagged in use, in file order
//!  ├─ 2. Expand   intro → intro.pdf, waltz ×2 → waltz-1.pdf, waltz-2.pdf
//!  ├─ 3. Resolve  probe the store, skip what is missing, cover first
//!  ├─ 4. Convert  pdfium 300 DPI → JPEG q90 → centred on A5 landscape
//!  ├─ 5. Merge    concatenate page-sets in order
//!  ├─ 6. Rotate   (rotated variant) pages 1, 3, 5… turned 180°
//!  └─ 7. Write    atomic replace of the output key
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use score_booklet::{build, BookletConfig, LocalStore, OutputMode, PdfiumRasterizer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = LocalStore::new("./collection");
//!     let rasterizer = PdfiumRasterizer::bind(None)?;
//!     let config = BookletConfig::default();
//!
//!     let report = build(&store, &rasterizer, &config, OutputMode::Plain)?;
//!     eprintln!("{} pages → {}", report.total_pages, report.output_location);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scorebook` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `s3`    | off     | [`S3Store`] on top of `object_store` for S3-compatible buckets |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! score-booklet = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod booklet;
pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod resolve;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use booklet::{build, build_all, plan, write_document};
pub use catalog::{expand_catalog, expand_filenames, load_catalog, parse_catalog, CatalogRow};
pub use config::{BookletConfig, BookletConfigBuilder, OutputMode};
pub use error::{BookletError, Result};
pub use output::{BuildPlan, BuildReport, BuildStats, FileReport};
pub use pipeline::merge::merge_page_sets;
pub use pipeline::render::{PdfiumRasterizer, Rasterizer};
pub use pipeline::rotate::rotate_alternate_pages;
pub use progress::{BuildProgressCallback, NoopProgressCallback, ProgressCallback};
pub use resolve::{resolve_inputs, InputKind, ResolvedInput, ResolvedInputs};
pub use store::{LocalStore, MemoryStore, Presence, Store};

#[cfg(feature = "s3")]
pub use store::{S3Settings, S3Store};
