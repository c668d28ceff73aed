//! Diagnose every household JSON file in a directory
//!
//! Writes one summary row per household to a CSV file
//!
//! Usage: cargo run --release --bin run_batch -- households/ --as-of 2025-01-01

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::warn;
use rayon::prelude::*;
use retirement_diagnosis::household::load_household;
use retirement_diagnosis::diagnosis::DiagnosisSummary;
use retirement_diagnosis::{DiagnosisEngine, PositionAggregator};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "run_batch", about = "Batch retirement diagnosis")]
struct Args {
    /// Directory of household JSON files
    dir: PathBuf,

    /// Valuation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Output CSV path
    #[arg(long, default_value = "diagnosis_summary.csv")]
    output: PathBuf,
}

fn household_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(err) => {
                warn!("skipping unreadable entry in {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn diagnose_file(path: &Path, as_of: NaiveDate, engine: &DiagnosisEngine) -> Result<DiagnosisSummary> {
    let household = load_household(path)?;
    let aggregator = PositionAggregator::new(engine.assumptions().heuristics.clone());
    let position = aggregator.aggregate(&household, as_of)?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(engine.diagnose(&position)?.summary().for_household(name))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let start = Instant::now();
    let files = household_files(&args.dir)?;
    println!("Found {} household files in {}", files.len(), args.dir.display());

    let engine = DiagnosisEngine::default();

    // Diagnose in parallel; failures are reported and skipped
    let results: Vec<(PathBuf, Result<DiagnosisSummary>)> = files
        .par_iter()
        .map(|path| (path.clone(), diagnose_file(path, as_of, &engine)))
        .collect();

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut written = 0;
    for (path, result) in results {
        match result {
            Ok(row) => {
                writer.serialize(&row)?;
                written += 1;
            }
            Err(err) => warn!("skipping {}: {:#}", path.display(), err),
        }
    }
    writer.flush()?;

    println!(
        "Wrote {} of {} rows to {} in {:?}",
        written,
        files.len(),
        args.output.display(),
        start.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_household_files_keeps_sorted_json_only() {
        let dir = std::env::temp_dir().join(format!("run_batch_files_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            std::fs::write(dir.join(name), "{}").unwrap();
        }

        let files = household_files(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
