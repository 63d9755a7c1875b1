//! Booklet entry points: plan, build and write.
//!
//! A build is one linear pass:
//!
//! ```text
//! catalog ─▶ expand ─▶ resolve ─▶ (read ─▶ convert ─▶ append)* ─▶ rotate? ─▶ write
//! ```
//!
//! Sources are converted one at a time; only the accumulated page-sets and
//! the source currently being rasterised are held in memory. Nothing is
//! written until every input has converted, so a failed run leaves any
//! previous output untouched.

use crate::catalog::{expand_catalog, load_catalog};
use crate::config::{BookletConfig, OutputMode};
use crate::error::{BookletError, Result};
use crate::output::{BuildPlan, BuildReport, BuildStats, FileReport};
use crate::pipeline::compose::{convert_source, RenderSettings};
use crate::pipeline::merge::Merger;
use crate::pipeline::render::Rasterizer;
use crate::pipeline::rotate::rotate_alternate_pages;
use crate::resolve::{resolve_inputs, ResolvedInputs};
use crate::store::Store;
use lopdf::Document;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Load the catalog, expand file names and probe the store, converting
/// nothing.
pub fn plan(store: &dyn Store, config: &BookletConfig) -> Result<BuildPlan> {
    config.validate()?;
    let rows = load_catalog(store, &config.catalog_key, config.catalog_delimiter)?;

    let expected = expand_catalog(&rows)?;
    debug!("Expecting {} score files", expected.len());

    let inputs = resolve_inputs(store, config, &expected)?;
    Ok(BuildPlan {
        catalog_rows: rows.len(),
        expected,
        inputs,
    })
}

/// Build one variant of the booklet and write it to the store.
///
/// # Errors
/// An invalid config, or any catalog, conversion or write failure, aborts
/// the run; missing score files are skipped and listed in
/// [`BuildReport::skipped`].
pub fn build(
    store: &dyn Store,
    rasterizer: &dyn Rasterizer,
    config: &BookletConfig,
    mode: OutputMode,
) -> Result<BuildReport> {
    config.validate()?;
    let total_start = Instant::now();
    let output_key = config.output_key_for(mode);
    info!("Building {} booklet: {}", mode, store.describe(&output_key));

    // ── Step 1: Catalog and inputs ───────────────────────────────────────
    let plan = plan(store, config)?;
    if plan.inputs.is_empty() {
        warn!("No input files found; the booklet will have no pages");
    }

    // ── Step 2: Convert and merge ────────────────────────────────────────
    let convert_start = Instant::now();
    let (mut document, files) = assemble(store, rasterizer, config, &plan.inputs)?;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;
    let total_pages: usize = files.iter().map(|f| f.pages).sum();
    info!(
        "Converted {} files into {} pages in {}ms",
        files.len(),
        total_pages,
        convert_duration_ms
    );

    // ── Step 3: Rotate ───────────────────────────────────────────────────
    let rotated_pages = if mode.is_rotated() {
        rotate_alternate_pages(&mut document)?
    } else {
        Vec::new()
    };

    // ── Step 4: Write ────────────────────────────────────────────────────
    let write_start = Instant::now();
    let output_bytes = write_document(store, &output_key, &mut document)?;
    let write_duration_ms = write_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_build_complete(files.len(), total_pages);
    }

    let stats = BuildStats {
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        convert_duration_ms,
        write_duration_ms,
    };
    info!(
        "Wrote {} ({} pages, {} bytes) in {}ms",
        output_key, total_pages, output_bytes, stats.total_duration_ms
    );

    Ok(BuildReport {
        mode,
        output_location: store.describe(&output_key),
        output_key,
        files,
        skipped: plan.inputs.missing,
        cover_missing: plan.inputs.cover_missing,
        total_pages,
        rotated_pages,
        output_bytes,
        stats,
    })
}

/// Build the plain and then the rotated variant, each as a full run.
pub fn build_all(
    store: &dyn Store,
    rasterizer: &dyn Rasterizer,
    config: &BookletConfig,
) -> Result<Vec<BuildReport>> {
    [OutputMode::Plain, OutputMode::Rotated]
        .into_iter()
        .map(|mode| build(store, rasterizer, config, mode))
        .collect()
}

/// Convert every resolved input in order and merge the page-sets.
pub fn assemble(
    store: &dyn Store,
    rasterizer: &dyn Rasterizer,
    config: &BookletConfig,
    inputs: &ResolvedInputs,
) -> Result<(Document, Vec<FileReport>)> {
    config.validate()?;
    let settings = RenderSettings::a5(config.dpi, config.jpeg_quality);
    let total = inputs.len();
    let cb = config.progress_callback.as_ref();

    if let Some(cb) = cb {
        cb.on_build_start(total);
    }

    let mut merger = Merger::new();
    let mut files = Vec::with_capacity(total);

    for (i, input) in inputs.entries.iter().enumerate() {
        let index = i + 1;
        if let Some(cb) = cb {
            cb.on_file_start(index, total, &input.key);
        }

        let bytes = store.read(&input.key)?;
        let page_set = convert_source(rasterizer, &input.key, &bytes, &settings)?;

        let first_page = merger.page_count();
        let pages = merger.append(page_set)?;
        if pages == 0 {
            warn!("{} has no pages", input.key);
        }
        info!("[{}/{}] {}: {} pages", index, total, input.key, pages);

        if let Some(cb) = cb {
            cb.on_file_complete(index, total, &input.key, pages);
        }
        files.push(FileReport {
            key: input.key.clone(),
            kind: input.kind,
            pages,
            first_page,
        });
    }

    Ok((merger.finish(), files))
}

/// Serialise `document` and store it at `key`, replacing any previous
/// object. Returns the number of bytes written.
pub fn write_document(store: &dyn Store, key: &str, document: &mut Document) -> Result<usize> {
    let write_err = |detail: String| BookletError::OutputWriteFailed {
        key: key.to_string(),
        detail,
    };

    document.compress();
    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|e| write_err(e.to_string()))?;

    store.write(key, &bytes).map_err(|e| match e {
        BookletError::OutputWriteFailed { .. } => e,
        other => write_err(other.to_string()),
    })?;

    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::render::PageSink;
    use crate::progress::BuildProgressCallback;
    use crate::store::MemoryStore;
    use image::{DynamicImage, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Treats a source of the form `pages=N` as an N-page PDF.
    #[derive(Default)]
    struct ScriptedRasterizer {
        calls: AtomicUsize,
    }

    impl Rasterizer for ScriptedRasterizer {
        fn rasterize(
            &self,
            source_key: &str,
            pdf: &[u8],
            _dpi: u32,
            sink: &mut PageSink<'_>,
        ) -> Result<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let pages: usize = std::str::from_utf8(pdf)
                .ok()
                .and_then(|s| s.strip_prefix("pages="))
                .and_then(|n| n.trim().parse().ok())
                .ok_or_else(|| BookletError::conversion(source_key, "not a PDF"))?;
            for index in 0..pages {
                sink(index, DynamicImage::ImageRgb8(RgbImage::new(60, 40)))?;
            }
            Ok(pages)
        }
    }

    fn pdf(pages: usize) -> Vec<u8> {
        format!("pages={pages}").into_bytes()
    }

    fn scenario_store() -> MemoryStore {
        MemoryStore::new()
            .with(
                "liste.csv",
                "JOUE,NOM_FICHIER,NBR_VERSIONS\n1,intro,1\n1,waltz,2\n0,unused,1\n",
            )
            .with("partitions_individuelles/intro.pdf", pdf(1))
            .with("partitions_individuelles/waltz-1.pdf", pdf(2))
    }

    fn page_count(store: &MemoryStore, key: &str) -> usize {
        let bytes = store.get(key).expect("output written");
        Document::load_mem(&bytes).unwrap().get_pages().len()
    }

    #[test]
    fn plan_lists_expected_and_present() {
        let store = scenario_store();
        let config = BookletConfig::default();
        let plan = plan(&store, &config).unwrap();
        assert_eq!(plan.catalog_rows, 2);
        assert_eq!(plan.expected, ["intro.pdf", "waltz-1.pdf", "waltz-2.pdf"]);
        assert_eq!(
            plan.inputs.keys().collect::<Vec<_>>(),
            [
                "partitions_individuelles/intro.pdf",
                "partitions_individuelles/waltz-1.pdf"
            ]
        );
        assert!(plan.inputs.cover_missing);
    }

    #[test]
    fn plain_build_skips_missing_version() {
        let store = scenario_store();
        let rasterizer = ScriptedRasterizer::default();
        let config = BookletConfig::default();

        let report = build(&store, &rasterizer, &config, OutputMode::Plain).unwrap();
        assert_eq!(report.total_pages, 3);
        assert_eq!(report.skipped, ["partitions_individuelles/waltz-2.pdf"]);
        assert!(report.rotated_pages.is_empty());
        assert_eq!(report.files[1].first_page, 1);
        assert_eq!(page_count(&store, "fichier_fusionne_A5.pdf"), 3);
        assert_eq!(report.output_bytes, store.get("fichier_fusionne_A5.pdf").unwrap().len());
    }

    #[test]
    fn rotated_build_with_cover() {
        let store = scenario_store();
        store.insert("page_garde.pdf", pdf(1));
        let rasterizer = ScriptedRasterizer::default();
        let config = BookletConfig::default();

        let report = build(&store, &rasterizer, &config, OutputMode::Rotated).unwrap();
        assert!(report.has_cover());
        assert_eq!(report.total_pages, 4);
        assert_eq!(report.rotated_pages, vec![1, 3]);
        assert_eq!(page_count(&store, "fichier_fusionne_A5_rotated.pdf"), 4);
        assert!(store.get("fichier_fusionne_A5.pdf").is_none());
    }

    #[test]
    fn build_all_writes_both_variants() {
        let store = scenario_store();
        let rasterizer = ScriptedRasterizer::default();
        let reports = build_all(&store, &rasterizer, &BookletConfig::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].mode, OutputMode::Plain);
        assert_eq!(reports[1].mode, OutputMode::Rotated);
        assert_eq!(page_count(&store, "fichier_fusionne_A5.pdf"), 3);
        assert_eq!(page_count(&store, "fichier_fusionne_A5_rotated.pdf"), 3);
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn invalid_version_count_aborts_before_conversion() {
        let store = MemoryStore::new()
            .with("liste.csv", "JOUE,NOM_FICHIER,NBR_VERSIONS\n1,intro,1\n1,waltz,0\n")
            .with("partitions_individuelles/intro.pdf", pdf(1));
        let rasterizer = ScriptedRasterizer::default();

        let err = build(&store, &rasterizer, &BookletConfig::default(), OutputMode::Plain)
            .unwrap_err();
        assert!(matches!(err, BookletError::InvalidVersionCount { .. }));
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
        assert!(store.get("fichier_fusionne_A5.pdf").is_none());
    }

    #[test]
    fn zero_dpi_config_is_rejected_before_any_work() {
        let store = scenario_store();
        let rasterizer = ScriptedRasterizer::default();
        let config = BookletConfig {
            dpi: 0,
            ..Default::default()
        };

        let err = build(&store, &rasterizer, &config, OutputMode::Plain).unwrap_err();
        assert!(matches!(err, BookletError::InvalidConfig(_)));
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
        assert!(store.get("fichier_fusionne_A5.pdf").is_none());

        assert!(matches!(
            plan(&store, &config),
            Err(BookletError::InvalidConfig(_))
        ));
    }

    #[test]
    fn corrupt_source_aborts_without_output() {
        let store = scenario_store();
        store.insert("partitions_individuelles/waltz-1.pdf", b"garbage".to_vec());
        let rasterizer = ScriptedRasterizer::default();

        let err = build(&store, &rasterizer, &BookletConfig::default(), OutputMode::Plain)
            .unwrap_err();
        match err {
            BookletError::ConversionFailed { source_key, .. } => {
                assert_eq!(source_key, "partitions_individuelles/waltz-1.pdf")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.get("fichier_fusionne_A5.pdf").is_none());
    }

    #[test]
    fn missing_catalog_is_unavailable() {
        let store = MemoryStore::new();
        let err = build(
            &store,
            &ScriptedRasterizer::default(),
            &BookletConfig::default(),
            OutputMode::Plain,
        )
        .unwrap_err();
        assert!(matches!(err, BookletError::ResourceUnavailable { .. }));
    }

    #[test]
    fn no_inputs_still_writes_empty_booklet() {
        let store = MemoryStore::new().with("liste.csv", "JOUE,NOM_FICHIER,NBR_VERSIONS\n1,gone,1\n");
        let report = build(
            &store,
            &ScriptedRasterizer::default(),
            &BookletConfig::default(),
            OutputMode::Plain,
        )
        .unwrap();
        assert_eq!(report.total_pages, 0);
        assert_eq!(page_count(&store, "fichier_fusionne_A5.pdf"), 0);
    }

    #[test]
    fn rebuild_overwrites_previous_output() {
        let store = scenario_store();
        store.insert("fichier_fusionne_A5.pdf", b"stale".to_vec());
        build(
            &store,
            &ScriptedRasterizer::default(),
            &BookletConfig::default(),
            OutputMode::Plain,
        )
        .unwrap();
        assert_eq!(page_count(&store, "fichier_fusionne_A5.pdf"), 3);
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl BuildProgressCallback for Events {
        fn on_build_start(&self, total_files: usize) {
            self.0.lock().unwrap().push(format!("start {total_files}"));
        }
        fn on_file_start(&self, index: usize, total: usize, key: &str) {
            self.0.lock().unwrap().push(format!("file {index}/{total} {key}"));
        }
        fn on_file_complete(&self, index: usize, _total: usize, _key: &str, pages: usize) {
            self.0.lock().unwrap().push(format!("done {index} {pages}"));
        }
        fn on_build_complete(&self, total_files: usize, total_pages: usize) {
            self.0.lock().unwrap().push(format!("end {total_files} {total_pages}"));
        }
    }

    #[test]
    fn progress_events_follow_input_order() {
        let store = scenario_store();
        let events = Arc::new(Events::default());
        let config = BookletConfig::builder()
            .progress_callback(events.clone())
            .build()
            .unwrap();

        build(&store, &ScriptedRasterizer::default(), &config, OutputMode::Plain).unwrap();
        assert_eq!(
            *events.0.lock().unwrap(),
            [
                "start 2",
                "file 1/2 partitions_individuelles/intro.pdf",
                "done 1 1",
                "file 2/2 partitions_individuelles/waltz-1.pdf",
                "done 2 2",
                "end 2 3",
            ]
        );
    }
}
