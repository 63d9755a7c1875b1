//! Result types returned by the booklet entry points.

use crate::config::OutputMode;
use crate::resolve::{InputKind, ResolvedInputs};
use serde::{Deserialize, Serialize};

/// What a run would do, computed without converting anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPlan {
    /// In-use catalog rows.
    pub catalog_rows: usize,
    /// Expected score file names, in catalog order.
    pub expected: Vec<String>,
    /// Inputs that exist, cover first.
    pub inputs: ResolvedInputs,
}

/// One converted input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub key: String,
    pub kind: InputKind,
    /// Pages contributed to the booklet.
    pub pages: usize,
    /// 0-based index of this file's first page in the booklet.
    pub first_page: usize,
}

/// Timing for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStats {
    pub total_duration_ms: u64,
    /// Reading, rasterising and composing all inputs.
    pub convert_duration_ms: u64,
    pub write_duration_ms: u64,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub mode: OutputMode,
    pub output_key: String,
    /// Where the output landed, as described by the store.
    pub output_location: String,
    pub files: Vec<FileReport>,
    /// Expected score keys that were absent and skipped.
    pub skipped: Vec<String>,
    pub cover_missing: bool,
    pub total_pages: usize,
    /// 0-based booklet pages turned 180°; empty in plain mode.
    pub rotated_pages: Vec<usize>,
    pub output_bytes: usize,
    pub stats: BuildStats,
}

impl BuildReport {
    pub fn has_cover(&self) -> bool {
        self.files
            .first()
            .is_some_and(|f| f.kind == InputKind::Cover)
    }
}
