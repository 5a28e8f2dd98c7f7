use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_compare_rs::core::size::check_tolerance;
use pdf_compare_rs::prelude::*;
use pdf_compare_rs::scanner::compare_structurally;

#[derive(Parser)]
#[command(name = "pdf_compare_rs")]
#[command(about = "Compare generated PDF files against reference PDF files", long_about = None)]
struct Cli {
    /// Generated PDF file, or directory of generated PDF files
    actual: PathBuf,

    /// Reference PDF file, or directory of reference PDF files
    expected: PathBuf,

    /// Scan directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Number of parallel worker threads (default: number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Output report filename
    #[arg(short, long, default_value = "comparison_report.txt")]
    output: PathBuf,

    /// Write the report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Run in batch mode (no progress bar)
    #[arg(long)]
    batch: bool,

    /// Skip the rendered page comparison for pairs that differ structurally
    #[arg(long)]
    structural_only: bool,

    /// Report pairs whose sizes differ by more than this fraction (0 to 1) without comparing contents
    #[arg(long)]
    size_tolerance: Option<f32>,

    /// Resolution used to render pages
    #[cfg_attr(not(feature = "rendering"), allow(dead_code))]
    #[arg(long, default_value_t = 96.0)]
    dpi: f32,

    /// Fail a pair when a rendered page cannot be encoded instead of skipping the page
    #[cfg_attr(not(feature = "rendering"), allow(dead_code))]
    #[arg(long)]
    strict_encoding: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "pdf_compare_rs=debug" } else { "pdf_compare_rs=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(tolerance) = cli.size_tolerance {
        check_tolerance(tolerance)?;
    }

    // Set up graceful shutdown handler
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown_requested.clone();

    ctrlc::set_handler(move || {
        eprintln!("\n⚠️  Shutdown requested. Finishing current pairs...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    if let Some(workers) = cli.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    let pairs = collect_pairs(&cli)?;
    if pairs.is_empty() {
        println!("No PDF files found in {}", cli.actual.display());
        return Ok(ExitCode::SUCCESS);
    }

    println!("PDF Comparator (Rust Edition)");
    println!("Comparing {} pair(s) using {} worker thread(s)", pairs.len(), rayon::current_num_threads());
    println!();

    let progress = if cli.batch {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(pairs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    // Structural stage runs in parallel; it never touches the renderer.
    let policy = IgnorePolicy::default_policy();
    let size_tolerance = cli.size_tolerance;
    let shutdown_check = shutdown_requested.clone();

    let mut checked: Vec<(DocumentPair, ComparisonOutcome)> = pairs
        .into_par_iter()
        .progress_with(progress.clone())
        .filter_map(|pair| {
            if shutdown_check.load(Ordering::SeqCst) {
                return None;
            }
            let outcome = compare_structurally(&pair, policy, size_tolerance);
            Some((pair, outcome))
        })
        .collect();

    progress.finish_and_clear();

    if !cli.structural_only {
        run_visual_fallback(&mut checked, &cli, &shutdown_requested)?;
    }

    let results: Vec<ComparisonResult> = checked
        .into_iter()
        .map(|(pair, outcome)| ComparisonResult {
            path: pair.relative_path,
            outcome,
        })
        .collect();

    let was_interrupted = shutdown_requested.load(Ordering::SeqCst);
    let equal_count = results.iter().filter(|r| r.outcome.is_equal()).count();

    println!("==================================================");
    println!("COMPARISON {}", if was_interrupted { "INTERRUPTED" } else { "COMPLETE" });
    println!("==================================================");
    println!("Equal pairs: {}", equal_count);
    println!("Differing pairs: {}", results.len() - equal_count);
    println!();

    if cli.verbose {
        for result in results.iter().filter(|r| !r.outcome.is_equal()) {
            println!("  [{}] {}", result.outcome.label(), result.path.display());
        }
    }

    let output_file = if was_interrupted {
        PathBuf::from(format!("{}.partial", cli.output.display()))
    } else {
        cli.output.clone()
    };

    if cli.json {
        write_json_report(&output_file, &results)?;
    } else {
        write_report(&output_file, &results)?;
    }
    println!("Detailed report saved to: {:?}", output_file);

    if was_interrupted || equal_count != results.len() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Either a single pair of files or every pair under two directory roots
fn collect_pairs(cli: &Cli) -> Result<Vec<DocumentPair>> {
    if cli.actual.is_file() {
        let relative_path = cli
            .actual
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.actual.clone());
        return Ok(vec![DocumentPair {
            relative_path,
            actual: cli.actual.clone(),
            expected: cli.expected.is_file().then(|| cli.expected.clone()),
        }]);
    }

    if !cli.actual.is_dir() {
        bail!("{} is neither a file nor a directory", cli.actual.display());
    }
    if !cli.expected.is_dir() {
        bail!("{} is not a directory", cli.expected.display());
    }

    collect_document_pairs(&cli.actual, &cli.expected, cli.recursive)
}

/// Compare rendered pages of the pairs that differ structurally
///
/// pdfium serializes access to its library, so pairs are rendered one at a time.
#[cfg(feature = "rendering")]
fn run_visual_fallback(
    checked: &mut [(DocumentPair, ComparisonOutcome)],
    cli: &Cli,
    shutdown_requested: &AtomicBool,
) -> Result<()> {
    let pending = checked
        .iter()
        .filter(|(_, outcome)| *outcome == ComparisonOutcome::Different)
        .count();
    if pending == 0 {
        return Ok(());
    }

    info!(pairs = pending, "Comparing rendered pages of structurally different pairs");
    let backend = PdfiumBackend::bind(cli.dpi)
        .context("Failed to bind pdfium; use --structural-only to skip rendered page comparison")?;
    let encode_failure = if cli.strict_encoding { EncodeFailure::Fail } else { EncodeFailure::SkipPage };
    let comparator = Comparator::new(backend).with_encode_failure(encode_failure);

    for (pair, outcome) in checked
        .iter_mut()
        .filter(|(_, outcome)| *outcome == ComparisonOutcome::Different)
    {
        if shutdown_requested.load(Ordering::SeqCst) {
            break;
        }
        *outcome = pdf_compare_rs::scanner::compare_visually(pair, &comparator);
    }

    Ok(())
}

#[cfg(not(feature = "rendering"))]
fn run_visual_fallback(
    checked: &mut [(DocumentPair, ComparisonOutcome)],
    _cli: &Cli,
    _shutdown_requested: &AtomicBool,
) -> Result<()> {
    let pending = checked
        .iter()
        .filter(|(_, outcome)| *outcome == ComparisonOutcome::Different)
        .count();
    if pending > 0 {
        tracing::warn!(
            pairs = pending,
            "Built without the `rendering` feature; structurally different pairs are not compared visually"
        );
    } else {
        info!("All pairs matched structurally");
    }
    Ok(())
}
