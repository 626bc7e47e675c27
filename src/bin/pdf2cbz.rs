//! CLI binary for pdf2cbz.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionOptions`, runs the batch, and prints one line per job as
//! results stream in.
//!
//! Exit codes: 0 on success — including batches where individual jobs
//! failed, which are reported per job rather than via the process exit
//! code — and 1 when enumeration itself fails before any job runs.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2cbz::{enumerate_jobs, run_batch, ConversionOptions, ImageFormat, JobResult};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

const AFTER_HELP: &str = r#"EXAMPLES:
  # Single file: book.pdf → book.cbz next to it
  pdf2cbz -i book.pdf

  # Lossless pages at print resolution
  pdf2cbz -i book.pdf -f png -d 300

  # The reverse direction: archive → PDF
  pdf2cbz -i book.cbz -o book.pdf

  # Whole library, flattened into one output directory, 8 workers
  pdf2cbz -i ~/comics -o ~/converted -w 8

  # Grayscale WebP at quality 60 for small archives
  pdf2cbz -i manga/ -g -q 60

  # Machine-readable batch report
  pdf2cbz -i comics/ --json > report.json

BATCH BEHAVIOUR:
  Directory inputs are walked recursively for .pdf, .cbz and .zip files;
  everything else is ignored. Jobs run independently — a corrupt file is
  reported on its own line and the rest of the batch completes. With -o,
  outputs are flattened into the output directory (subdirectories are not
  mirrored); without it each output is written next to its source.

ENVIRONMENT VARIABLES:
  PDF2CBZ_FORMAT     Default for --format
  PDF2CBZ_QUALITY    Default for --quality
  PDF2CBZ_DPI        Default for --dpi
  PDF2CBZ_WORKERS    Default for --workers
  PDFIUM_LIB_PATH    Path to an existing libpdfium shared library
"#;

/// Convert PDF documents to CBZ comic archives, and back.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2cbz",
    version,
    about = "Convert PDF documents to CBZ comic archives, and back",
    long_about = "Convert PDF documents to CBZ comic-book archives by rasterising each page to \
PNG or WebP, or convert CBZ/ZIP archives back to PDF. Accepts a single file or a directory \
tree; directory batches run on a bounded worker pool with per-file failure isolation.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file (.pdf, .cbz, .zip) or directory to walk recursively.
    #[arg(short, long)]
    input: PathBuf,

    /// Output file, or output directory for batch input (flattened).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page image format when producing a CBZ.
    #[arg(short, long, env = "PDF2CBZ_FORMAT", value_enum, default_value = "webp")]
    format: FormatArg,

    /// WebP compression quality (1-100); ignored for PNG.
    #[arg(short, long, env = "PDF2CBZ_QUALITY", default_value_t = 80,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Rasterisation DPI override (36-600, default 150).
    #[arg(short, long, env = "PDF2CBZ_DPI",
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: Option<u32>,

    /// Convert pages to grayscale before encoding.
    #[arg(short, long)]
    grayscale: bool,

    /// Worker-pool size for batch input.
    #[arg(short, long, env = "PDF2CBZ_WORKERS", default_value_t = num_cpus::get())]
    workers: usize,

    /// Output the batch report as JSON instead of per-job lines.
    #[arg(long, env = "PDF2CBZ_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2CBZ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2CBZ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(long, env = "PDF2CBZ_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Webp => ImageFormat::Webp,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the per-job lines provide all the feedback that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Build options ────────────────────────────────────────────────────
    let mut builder = ConversionOptions::builder()
        .image_format(cli.format.into())
        .quality(cli.quality)
        .grayscale(cli.grayscale)
        .workers(cli.workers);
    if let Some(dpi) = cli.dpi {
        builder = builder.dpi(dpi);
    }
    let options = builder.build().context("Invalid options")?;

    // ── Enumerate jobs (fatal errors exit 1 before any job runs) ─────────
    let jobs = enumerate_jobs(&cli.input, cli.output.as_deref(), &options)
        .context("Failed to enumerate conversion jobs")?;

    if jobs.is_empty() {
        // Zero work is a valid outcome for a directory batch, not an error.
        if !cli.quiet {
            eprintln!(
                "no convertible files (.pdf, .cbz, .zip) found under {}",
                cli.input.display()
            );
        }
        return Ok(());
    }

    let total = jobs.len();

    // ── Run the batch, streaming one line per job ────────────────────────
    let bar = if show_progress && total > 1 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let quiet = cli.quiet;
    let results = run_batch(jobs, options.workers, |result| {
        report_result(result, bar.as_ref(), quiet);
    })
    .context("Batch dispatch failed")?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    // ── Summary ──────────────────────────────────────────────────────────
    let failed = results.iter().filter(|r| !r.outcome.is_success()).count();
    let succeeded = results.len() - failed;

    if cli.json {
        let json = serde_json::to_string_pretty(&results)
            .context("Failed to serialise batch report")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(json.as_bytes())?;
        handle.write_all(b"\n")?;
    }

    if !quiet && total > 1 {
        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }

    // Per-job failures are reported above, not via the exit code: a batch
    // that ran to completion is a success from the shell's point of view.
    Ok(())
}

/// Print one line for a completed job.
fn report_result(result: &JobResult, bar: Option<&ProgressBar>, quiet: bool) {
    if quiet {
        if let Some(bar) = bar {
            bar.inc(1);
        }
        return;
    }

    let line = match &result.outcome {
        pdf2cbz::JobOutcome::Success { message } => {
            format!("  {} {}", green("✓"), dim(message))
        }
        pdf2cbz::JobOutcome::Failure { message } => {
            format!(
                "  {} {}  {}",
                red("✗"),
                result.input_path.display(),
                red(message)
            )
        }
    };

    match bar {
        Some(bar) => {
            bar.println(line);
            bar.inc(1);
        }
        None => eprintln!("{line}"),
    }
}
