//! Configuration types for booklet builds.
//!
//! All run behaviour is controlled through [`BookletConfig`], built via its
//! [`BookletConfigBuilder`]. Defaults reproduce the usual layout of a score
//! collection:
//!
//! ```text
//! liste.csv                          catalog
//! page_garde.pdf                     optional cover
//! partitions_individuelles/*.pdf     one file per piece or version
//! fichier_fusionne_A5.pdf            output (plain)
//! fichier_fusionne_A5_rotated.pdf    output (rotated)
//! ```
//!
//! The target page is always A5 landscape; see [`crate::pipeline::layout`].

use crate::error::BookletError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CATALOG_KEY: &str = "liste.csv";
pub const DEFAULT_SCORES_PREFIX: &str = "partitions_individuelles";
pub const DEFAULT_COVER_KEY: &str = "page_garde.pdf";
pub const DEFAULT_OUTPUT_KEY: &str = "fichier_fusionne_A5.pdf";
pub const DEFAULT_DPI: u32 = 300;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Configuration for a booklet build.
///
/// # Example
/// ```rust
/// use score_booklet::BookletConfig;
///
/// let config = BookletConfig::builder()
///     .scores_prefix("scores")
///     .no_cover()
///     .output_key("booklet.pdf")
///     .build()
///     .unwrap();
/// assert_eq!(config.rotated_output_key(), "booklet_rotated.pdf");
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct BookletConfig {
    /// Store key of the catalog CSV. Default: `liste.csv`.
    pub catalog_key: String,

    /// Field delimiter of the catalog CSV. Default: `,`.
    pub catalog_delimiter: u8,

    /// Key prefix under which score files live. Default: `partitions_individuelles`.
    pub scores_prefix: String,

    /// Optional cover page, placed first when present in the store.
    /// Default: `page_garde.pdf`.
    pub cover_key: Option<String>,

    /// Output key for the plain variant. Default: `fichier_fusionne_A5.pdf`.
    pub output_key: String,

    /// Output key for the rotated variant. When `None`, derived from
    /// `output_key` by inserting `_rotated` before the extension.
    pub rotated_output_key: Option<String>,

    /// Rasterisation resolution. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// JPEG quality factor. Range: 1–100. Default: 90.
    pub jpeg_quality: u8,

    /// Per-file progress events.
    #[serde(skip)]
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BookletConfig {
    fn default() -> Self {
        Self {
            catalog_key: DEFAULT_CATALOG_KEY.to_string(),
            catalog_delimiter: b',',
            scores_prefix: DEFAULT_SCORES_PREFIX.to_string(),
            cover_key: Some(DEFAULT_COVER_KEY.to_string()),
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
            rotated_output_key: None,
            dpi: DEFAULT_DPI,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BookletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookletConfig")
            .field("catalog_key", &self.catalog_key)
            .field("catalog_delimiter", &(self.catalog_delimiter as char))
            .field("scores_prefix", &self.scores_prefix)
            .field("cover_key", &self.cover_key)
            .field("output_key", &self.output_key)
            .field("rotated_output_key", &self.rotated_output_key)
            .field("dpi", &self.dpi)
            .field("jpeg_quality", &self.jpeg_quality)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BuildProgressCallback>"),
            )
            .finish()
    }
}

impl BookletConfig {
    /// Create a new builder for `BookletConfig`.
    pub fn builder() -> BookletConfigBuilder {
        BookletConfigBuilder {
            config: Self::default(),
        }
    }

    /// Key the rotated variant is written to.
    pub fn rotated_output_key(&self) -> String {
        if let Some(ref key) = self.rotated_output_key {
            return key.clone();
        }
        match self.output_key.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => {
                format!("{stem}_rotated.{ext}")
            }
            _ => format!("{}_rotated", self.output_key),
        }
    }

    /// Key the given variant is written to.
    pub fn output_key_for(&self, mode: OutputMode) -> String {
        match mode {
            OutputMode::Plain => self.output_key.clone(),
            OutputMode::Rotated => self.rotated_output_key(),
        }
    }

    /// Check the constraints the builder enforces.
    ///
    /// [`crate::build`] and [`crate::plan`] call this on entry, so configs
    /// assembled by hand or deserialised are held to the same rules.
    pub fn validate(&self) -> Result<(), BookletError> {
        if self.dpi < 72 || self.dpi > 600 {
            return Err(BookletError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                self.dpi
            )));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(BookletError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                self.jpeg_quality
            )));
        }
        if self.catalog_key.trim().is_empty() {
            return Err(BookletError::InvalidConfig("Catalog key is empty".into()));
        }
        if self.output_key.trim().is_empty() {
            return Err(BookletError::InvalidConfig("Output key is empty".into()));
        }
        if self.output_key == self.rotated_output_key() {
            return Err(BookletError::InvalidConfig(
                "Plain and rotated outputs must use different keys".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`BookletConfig`].
#[derive(Debug)]
pub struct BookletConfigBuilder {
    config: BookletConfig,
}

impl BookletConfigBuilder {
    pub fn catalog_key(mut self, key: impl Into<String>) -> Self {
        self.config.catalog_key = key.into();
        self
    }

    pub fn catalog_delimiter(mut self, delimiter: u8) -> Self {
        self.config.catalog_delimiter = delimiter;
        self
    }

    pub fn scores_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.scores_prefix = prefix.into();
        self
    }

    pub fn cover_key(mut self, key: impl Into<String>) -> Self {
        self.config.cover_key = Some(key.into());
        self
    }

    pub fn no_cover(mut self) -> Self {
        self.config.cover_key = None;
        self
    }

    pub fn output_key(mut self, key: impl Into<String>) -> Self {
        self.config.output_key = key.into();
        self
    }

    pub fn rotated_output_key(mut self, key: impl Into<String>) -> Self {
        self.config.rotated_output_key = Some(key.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BookletConfig, BookletError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which variant of the booklet a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Pages as converted. (default)
    #[default]
    Plain,
    /// Every second page turned 180° for short-edge duplex printing.
    Rotated,
}

impl OutputMode {
    pub fn is_rotated(self) -> bool {
        matches!(self, OutputMode::Rotated)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Plain => f.write_str("plain"),
            OutputMode::Rotated => f.write_str("rotated"),
        }
    }
}
