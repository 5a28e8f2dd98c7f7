//! Report writing functionality

use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::scanner::pair_scanner::{ComparisonOutcome, ComparisonResult};

#[derive(Serialize)]
struct JsonReport<'a> {
    total: usize,
    equal: usize,
    different: usize,
    results: &'a [ComparisonResult],
}

/// Write comparison results to a file
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `results` - Comparison results to write
///
/// # Returns
/// Result indicating success or failure
pub fn write_report(output_path: &Path, results: &[ComparisonResult]) -> Result<()> {
    let mut file = BufWriter::new(File::create(output_path)?);

    let now = std::time::SystemTime::now();
    writeln!(file, "PDF Comparison Report")?;
    writeln!(file, "=====================")?;
    writeln!(file, "Generated: {:?}", now)?;
    writeln!(file)?;

    let equal_count = results.iter().filter(|r| r.outcome.is_equal()).count();
    let structural_count = results
        .iter()
        .filter(|r| r.outcome == ComparisonOutcome::StructurallyEqual)
        .count();
    let different_count = results.len() - equal_count;

    writeln!(file, "Summary Statistics:")?;
    writeln!(file, "-------------------")?;
    writeln!(file, "  Total pairs compared: {}", results.len())?;
    writeln!(file, "  Equal pairs: {}", equal_count)?;
    writeln!(file, "    by structure: {}", structural_count)?;
    writeln!(file, "    by rendered pages: {}", equal_count - structural_count)?;
    writeln!(file, "  Differing pairs: {}", different_count)?;

    if !results.is_empty() {
        let equal_pct = (equal_count as f64 / results.len() as f64) * 100.0;
        writeln!(file, "  Match rate: {:.2}%", equal_pct)?;
    }

    writeln!(file)?;

    if different_count > 0 {
        writeln!(file, "Differing Pairs:")?;
        writeln!(file, "----------------")?;
        for result in results.iter().filter(|r| !r.outcome.is_equal()) {
            match &result.outcome {
                ComparisonOutcome::Failed { error } => {
                    writeln!(file, "  [{}] {}: {}", result.outcome.label(), result.path.display(), error)?
                }
                outcome => writeln!(file, "  [{}] {}", outcome.label(), result.path.display())?,
            }
        }
        writeln!(file)?;
    }

    writeln!(file, "Equal Pairs:")?;
    writeln!(file, "------------")?;
    writeln!(file, "  Total: {}", equal_count)?;
    writeln!(file)?;
    for result in results.iter().filter(|r| r.outcome.is_equal()) {
        writeln!(file, "  [{}] {}", result.outcome.label(), result.path.display())?;
    }

    file.flush()?;
    Ok(())
}

/// Write comparison results as JSON
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `results` - Comparison results to write
pub fn write_json_report(output_path: &Path, results: &[ComparisonResult]) -> Result<()> {
    let equal = results.iter().filter(|r| r.outcome.is_equal()).count();
    let report = JsonReport {
        total: results.len(),
        equal,
        different: results.len() - equal,
        results,
    };

    let file = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(file, &report)?;
    Ok(())
}
