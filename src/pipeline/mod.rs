//! Pipeline stages for building the A5 booklet.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! render ──▶ encode ──▶ compose ──▶ merge ──▶ rotate
//! (pdfium)   (JPEG)     (A5 page)   (concat)  (optional)
//! ```
//!
//! 1. [`render`]: rasterise every page of a source PDF at the configured DPI
//! 2. [`encode`]: flatten to RGB and JPEG-compress each raster
//! 3. [`compose`]: place each JPEG, shrunk and centred, on an A5-landscape
//!    page; [`layout`] holds the geometry
//! 4. [`merge`]: concatenate the per-file page-sets in catalog order
//! 5. [`rotate`]: turn every second page 180° for short-edge duplex

pub mod compose;
pub mod encode;
pub mod layout;
pub mod merge;
pub mod render;
pub mod rotate;
