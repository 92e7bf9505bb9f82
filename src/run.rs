//! Subcommand drivers.
//!
//! Each driver wires the core types together for one command: `learn`
//! builds a labeled profile from genome files, `classify` compares a
//! genome against reference profiles, `join` merges same-identifier
//! profiles, and `distance` reports rank distances between stored
//! profiles. Reports go to stdout; diagnostics go through `tracing`.

use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{Command, Extremum, ReportFormat};
use crate::counter::{KmerCounter, DEFAULT_VALID_NUCLEOTIDES};
use crate::error::KmerProfError;
use crate::profile::{PersistMode, Profile};

/// One distance measurement, as printed and as serialized to JSON.
#[derive(Debug, Clone, Serialize)]
struct DistanceRow {
    profile: String,
    id: String,
    distance: f64,
}

#[derive(Serialize)]
struct ClassifyReport {
    distances: Vec<DistanceRow>,
    decision: DistanceRow,
}

#[derive(Serialize)]
struct DistanceExtremeReport {
    distances: Vec<DistanceRow>,
    extreme: DistanceRow,
}

/// Dispatches a parsed command to its driver.
///
/// # Errors
///
/// Propagates any core failure: unreadable input, malformed profile
/// file, mismatched counters, or an output stream error.
pub fn run(command: Command) -> Result<(), KmerProfError> {
    match command {
        Command::Learn {
            kmer_length,
            nucleotides,
            profile_id,
            output,
            mode,
            inputs,
        } => learn(kmer_length, &nucleotides, &profile_id, &output, mode, &inputs),
        Command::Classify {
            kmer_length,
            nucleotides,
            format,
            input,
            profiles,
        } => classify(kmer_length, &nucleotides, format, &input, &profiles),
        Command::Join {
            output,
            mode,
            inputs,
        } => join(&output, mode, &inputs),
        Command::Distance {
            target,
            format,
            source,
            targets,
        } => distance(target, format, &source, &targets),
    }
}

/// Counts every input file with its own counter, accumulates the counters,
/// and exports the zipped, sorted profile. Entries still holding the
/// sentinel character after normalization are dropped.
fn learn_profile(
    k: usize,
    nucleotides: &str,
    inputs: &[PathBuf],
) -> Result<Profile, KmerProfError> {
    let mut total = KmerCounter::new(k, nucleotides)?;
    for path in inputs {
        let mut counter = KmerCounter::new(k, nucleotides)?;
        counter.calculate_frequencies(path)?;
        total.merge(&counter)?;
    }

    let mut profile = total.to_profile();
    profile.zip(true, 0);
    profile.sort();
    Ok(profile)
}

fn learn(
    k: usize,
    nucleotides: &str,
    profile_id: &str,
    output: &Path,
    mode: PersistMode,
    inputs: &[PathBuf],
) -> Result<(), KmerProfError> {
    let mut profile = learn_profile(k, nucleotides, inputs)?;
    profile.set_id(profile_id);
    profile.save(output, mode)?;
    info!(
        entries = profile.len(),
        output = %output.display(),
        "profile saved"
    );
    Ok(())
}

fn classify(
    k: usize,
    nucleotides: &str,
    format: ReportFormat,
    input: &Path,
    profile_paths: &[PathBuf],
) -> Result<(), KmerProfError> {
    let query = learn_profile(k, nucleotides, &[input.to_path_buf()])?;
    let distances = measure(&query, profile_paths)?;

    let mut buf = BufWriter::new(stdout());
    match format {
        ReportFormat::Text => {
            for row in &distances {
                writeln!(
                    buf,
                    "Distance to {} ({}): {}",
                    row.profile, row.id, row.distance
                )?;
            }
            if let Some(best) = extreme_of(&distances, Extremum::Min) {
                writeln!(
                    buf,
                    "\nFinal decision: {} with a distance of {}",
                    best.id, best.distance
                )?;
            }
        }
        ReportFormat::Json => {
            if let Some(best) = extreme_of(&distances, Extremum::Min).cloned() {
                let report = ClassifyReport {
                    distances,
                    decision: best,
                };
                serde_json::to_writer_pretty(&mut buf, &report)?;
                writeln!(buf)?;
            }
        }
    }
    buf.flush()?;
    Ok(())
}

fn join(output: &Path, mode: PersistMode, inputs: &[PathBuf]) -> Result<(), KmerProfError> {
    let mut iter = inputs.iter();
    let Some(first) = iter.next() else {
        return Ok(());
    };

    let mut joined = Profile::load(first)?;
    joined.normalize(DEFAULT_VALID_NUCLEOTIDES);

    for path in iter {
        let mut next = Profile::load(path)?;
        if next.id() != joined.id() {
            warn!(
                path = %path.display(),
                id = next.id(),
                expected = joined.id(),
                "skipping profile with a different identifier"
            );
            continue;
        }
        next.normalize(DEFAULT_VALID_NUCLEOTIDES);
        joined.join(&next);
    }

    joined.zip(false, 0);
    joined.sort();
    joined.save(output, mode)?;
    info!(
        entries = joined.len(),
        output = %output.display(),
        "joined profile saved"
    );
    Ok(())
}

fn distance(
    target: Extremum,
    format: ReportFormat,
    source: &Path,
    targets: &[PathBuf],
) -> Result<(), KmerProfError> {
    let source_profile = Profile::load(source)?;
    let distances = measure(&source_profile, targets)?;

    let mut buf = BufWriter::new(stdout());
    match format {
        ReportFormat::Text => {
            for row in &distances {
                writeln!(buf, "Distance to {}: {}", row.profile, row.distance)?;
            }
            if let Some(extreme) = extreme_of(&distances, target) {
                let (cap, low) = match target {
                    Extremum::Min => ("Nearest", "nearest"),
                    Extremum::Max => ("Farthest", "farthest"),
                };
                writeln!(buf, "{cap} profile file: {}", extreme.profile)?;
                writeln!(buf, "Identifier of the {low} profile: {}", extreme.id)?;
            }
        }
        ReportFormat::Json => {
            if let Some(extreme) = extreme_of(&distances, target).cloned() {
                let report = DistanceExtremeReport {
                    distances,
                    extreme,
                };
                serde_json::to_writer_pretty(&mut buf, &report)?;
                writeln!(buf)?;
            }
        }
    }
    buf.flush()?;
    Ok(())
}

/// Loads each profile file and records its distance from `source`.
fn measure(source: &Profile, paths: &[PathBuf]) -> Result<Vec<DistanceRow>, KmerProfError> {
    let mut rows = Vec::with_capacity(paths.len());
    for path in paths {
        let reference = Profile::load(path)?;
        let distance = source.distance(&reference)?;
        rows.push(DistanceRow {
            profile: path.display().to_string(),
            id: reference.id().to_string(),
            distance,
        });
    }
    Ok(rows)
}

/// Picks the extreme row; the first row wins ties, matching a strict
/// left-to-right scan.
fn extreme_of(rows: &[DistanceRow], target: Extremum) -> Option<&DistanceRow> {
    rows.iter().reduce(|best, next| {
        let replace = match target {
            Extremum::Min => next.distance < best.distance,
            Extremum::Max => next.distance > best.distance,
        };
        if replace {
            next
        } else {
            best
        }
    })
}
