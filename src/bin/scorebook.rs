//! CLI binary for score-booklet.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BookletConfig`, picks a store and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use score_booklet::{
    build, plan, BookletConfig, BuildProgressCallback, BuildReport, LocalStore, OutputMode,
    PdfiumRasterizer, ProgressCallback, Store,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per build, one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(label: &str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix(label.to_string());
        bar.set_message("Reading catalog…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl BuildProgressCallback for CliProgressCallback {
    fn on_build_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} files…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, key: &str) {
        self.bar.set_message(key.to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, key: &str, pages: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            key,
            dim(&format!("{pages} pages")),
        ));
        self.bar.inc(1);
    }

    fn on_build_complete(&self, _total_files: usize, _total_pages: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Plain booklet from the current directory
  scorebook

  # Rotated variant for short-edge duplex printing
  scorebook --rotated

  # Both variants, no cover page
  scorebook --both --no-cover

  # A different collection layout
  scorebook --root ~/choir --catalog pieces.csv --delimiter ';' --scores-dir pdf

  # Show which files would be used, as JSON
  scorebook --plan-only --json

CATALOG (CSV, header row required):
  JOUE          1 = include the piece (also accepts true / yes)
  NOM_FICHIER   base file name, with or without .pdf
  NBR_VERSIONS  1 → name.pdf;  n > 1 → name-1.pdf … name-n.pdf
  Missing score files are skipped; a missing catalog is an error.

ENVIRONMENT VARIABLES:
  SCOREBOOK_*             Fallback for every flag (e.g. SCOREBOOK_ROOT)
  PDFIUM_LIB_PATH         Path to libpdfium
  AWS_ACCESS_KEY_ID       S3 credentials (with --s3-bucket)
  AWS_SECRET_ACCESS_KEY
  AWS_SESSION_TOKEN       Optional
  AWS_REGION              Default us-east-1
  RUST_LOG                Overrides the log filter
"#;

/// Merge individual sheet-music PDFs into an A5-landscape booklet.
#[derive(Parser, Debug)]
#[command(
    name = "scorebook",
    version,
    about = "Merge individual sheet-music PDFs into an A5-landscape booklet",
    long_about = "Read a CSV catalog of pieces, rasterise every listed PDF that exists, \
centre each page on A5 landscape and merge everything behind an optional cover page. \
The rotated variant turns every second page 180° for short-edge duplex printing.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory holding the catalog, cover, scores and outputs.
    #[arg(long, env = "SCOREBOOK_ROOT", default_value = ".")]
    root: PathBuf,

    /// Read and write an S3-compatible bucket instead of --root.
    #[cfg(feature = "s3")]
    #[arg(long, env = "SCOREBOOK_S3_BUCKET", requires = "s3_endpoint")]
    s3_bucket: Option<String>,

    /// Key prefix inside the bucket.
    #[cfg(feature = "s3")]
    #[arg(long, env = "SCOREBOOK_S3_PREFIX", default_value = "")]
    s3_prefix: String,

    /// S3 endpoint URL (e.g. https://minio.example.org).
    #[cfg(feature = "s3")]
    #[arg(long, env = "SCOREBOOK_S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Catalog CSV key.
    #[arg(long, env = "SCOREBOOK_CATALOG", default_value = score_booklet::config::DEFAULT_CATALOG_KEY)]
    catalog: String,

    /// Catalog field delimiter (single ASCII character).
    #[arg(long, env = "SCOREBOOK_DELIMITER", default_value_t = ',')]
    delimiter: char,

    /// Directory (key prefix) of the individual score files.
    #[arg(long, env = "SCOREBOOK_SCORES_DIR", default_value = score_booklet::config::DEFAULT_SCORES_PREFIX)]
    scores_dir: String,

    /// Cover page placed first when it exists.
    #[arg(long, env = "SCOREBOOK_COVER", default_value = score_booklet::config::DEFAULT_COVER_KEY)]
    cover: String,

    /// Never add a cover page. Overrides `--cover`.
    #[arg(long, env = "SCOREBOOK_NO_COVER")]
    no_cover: bool,

    /// Output key of the plain booklet.
    #[arg(short, long, env = "SCOREBOOK_OUTPUT", default_value = score_booklet::config::DEFAULT_OUTPUT_KEY)]
    output: String,

    /// Output key of the rotated booklet [default: <output>_rotated.pdf].
    #[arg(long, env = "SCOREBOOK_ROTATED_OUTPUT")]
    rotated_output: Option<String>,

    /// Build the rotated variant instead of the plain one.
    #[arg(long, env = "SCOREBOOK_ROTATED")]
    rotated: bool,

    /// Build the plain and the rotated variant. Overrides `--rotated`.
    #[arg(long, env = "SCOREBOOK_BOTH")]
    both: bool,

    /// Rasterisation DPI (72–600).
    #[arg(long, env = "SCOREBOOK_DPI", default_value_t = score_booklet::config::DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// JPEG quality (1–100).
    #[arg(long, env = "SCOREBOOK_QUALITY", default_value_t = score_booklet::config::DEFAULT_JPEG_QUALITY,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Path to libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the resolved input list and exit without converting.
    #[arg(long)]
    plan_only: bool,

    /// Print the build report (or plan) as JSON on stdout.
    #[arg(long, env = "SCOREBOOK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SCOREBOOK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCOREBOOK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SCOREBOOK_QUIET")]
    quiet: bool,
}

impl Cli {
    fn modes(&self) -> Vec<OutputMode> {
        if self.both {
            vec![OutputMode::Plain, OutputMode::Rotated]
        } else if self.rotated {
            vec![OutputMode::Rotated]
        } else {
            vec![OutputMode::Plain]
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.plan_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let store = open_store(&cli)?;

    // ── Plan-only mode ───────────────────────────────────────────────────
    if cli.plan_only {
        let config = build_config(&cli, None)?;
        let plan = plan(store.as_ref(), &config).context("Failed to resolve inputs")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialise plan")?
            );
        } else {
            println!("Catalog:      {} pieces in use", plan.catalog_rows);
            println!("Expected:     {} files", plan.expected.len());
            for key in plan.inputs.keys() {
                println!("  + {key}");
            }
            for key in &plan.inputs.missing {
                println!("  - {key} {}", dim("(missing)"));
            }
            if plan.inputs.cover_missing {
                println!("  {}", dim("(no cover page)"));
            }
        }
        return Ok(());
    }

    let rasterizer =
        PdfiumRasterizer::bind(cli.pdfium_lib.as_deref()).context("Failed to load PDFium")?;

    // ── Run builds ───────────────────────────────────────────────────────
    let mut reports = Vec::new();
    for mode in cli.modes() {
        let progress: Option<ProgressCallback> = if show_progress {
            let label = match mode {
                OutputMode::Plain => "Plain",
                OutputMode::Rotated => "Rotated",
            };
            Some(CliProgressCallback::new(label) as Arc<dyn BuildProgressCallback>)
        } else {
            None
        };
        let config = build_config(&cli, progress)?;

        let report = build(store.as_ref(), &rasterizer, &config, mode)
            .with_context(|| format!("Failed to build the {mode} booklet"))?;

        if !cli.quiet && !cli.json {
            print_summary(&report);
        }
        reports.push(report);
    }

    if cli.json {
        let json = if reports.len() == 1 {
            serde_json::to_string_pretty(&reports[0])
        } else {
            serde_json::to_string_pretty(&reports)
        }
        .context("Failed to serialise report")?;
        println!("{json}");
    }

    Ok(())
}

fn print_summary(report: &BuildReport) {
    eprintln!(
        "{}  PDF written to {}  ({} pages, {}ms)",
        green("✔"),
        bold(&report.output_location),
        report.total_pages,
        report.stats.total_duration_ms,
    );
    if !report.skipped.is_empty() {
        eprintln!(
            "   {}",
            dim(&format!("{} missing files skipped", report.skipped.len()))
        );
    }
}

/// Map CLI args to `BookletConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BookletConfig> {
    let delimiter = u8::try_from(cli.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter must be a single ASCII character, got {:?}", cli.delimiter))?;

    let mut builder = BookletConfig::builder()
        .catalog_key(&cli.catalog)
        .catalog_delimiter(delimiter)
        .scores_prefix(&cli.scores_dir)
        .output_key(&cli.output)
        .dpi(cli.dpi)
        .jpeg_quality(cli.quality);

    builder = if cli.no_cover {
        builder.no_cover()
    } else {
        builder.cover_key(&cli.cover)
    };
    if let Some(ref key) = cli.rotated_output {
        builder = builder.rotated_output_key(key);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(feature = "s3")]
fn open_store(cli: &Cli) -> Result<Box<dyn Store>> {
    use score_booklet::{S3Settings, S3Store};

    if let Some(ref bucket) = cli.s3_bucket {
        let endpoint = cli.s3_endpoint.clone().unwrap_or_default();
        let settings = S3Settings::from_env(bucket, &cli.s3_prefix, endpoint)
            .context("Missing S3 credentials")?;
        let store = S3Store::connect(settings).context("Failed to connect to S3")?;
        return Ok(Box::new(store));
    }
    Ok(Box::new(LocalStore::new(&cli.root)))
}

#[cfg(not(feature = "s3"))]
fn open_store(cli: &Cli) -> Result<Box<dyn Store>> {
    Ok(Box::new(LocalStore::new(&cli.root)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cover_overrides_cover() {
        let cli = Cli::try_parse_from(["scorebook", "--cover", "garde.pdf", "--no-cover"]).unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.cover_key, None);

        let cli = Cli::try_parse_from(["scorebook", "--cover", "garde.pdf"]).unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.cover_key.as_deref(), Some("garde.pdf"));
    }

    #[test]
    fn both_overrides_rotated() {
        let cli = Cli::try_parse_from(["scorebook", "--rotated", "--both"]).unwrap();
        assert_eq!(cli.modes(), vec![OutputMode::Plain, OutputMode::Rotated]);
    }
}
