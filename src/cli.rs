//! Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::counter::DEFAULT_VALID_NUCLEOTIDES;
use crate::profile::PersistMode;

/// Learn k-mer frequency profiles from DNA sequences and classify unknown
/// genomes by profile distance.
#[derive(Parser, Debug)]
#[command(name = "kmerprof")]
#[command(version, author, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Learn a profile from one or more genome files
    Learn {
        /// K-mer length (1-32)
        #[arg(short, long, value_parser = parse_k, default_value = "5")]
        kmer_length: usize,

        /// Valid nucleotide set
        #[arg(short = 'n', long, default_value = DEFAULT_VALID_NUCLEOTIDES)]
        nucleotides: String,

        /// Identifier stored in the learned profile
        #[arg(short = 'p', long, default_value = "unknown")]
        profile_id: String,

        /// Output profile file
        #[arg(short, long, default_value = "output.prf")]
        output: PathBuf,

        /// On-disk format of the output profile
        #[arg(short = 'm', long, value_enum, default_value = "text")]
        mode: PersistMode,

        /// Genome files to learn from
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Classify a genome against a set of reference profiles
    Classify {
        /// K-mer length (1-32)
        #[arg(short, long, value_parser = parse_k, default_value = "5")]
        kmer_length: usize,

        /// Valid nucleotide set
        #[arg(short = 'n', long, default_value = DEFAULT_VALID_NUCLEOTIDES)]
        nucleotides: String,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Genome file to classify
        input: PathBuf,

        /// Reference profile files
        #[arg(required = true)]
        profiles: Vec<PathBuf>,
    },

    /// Join profiles that share an identifier into one
    Join {
        /// Output profile file
        #[arg(short, long, default_value = "output.prf")]
        output: PathBuf,

        /// On-disk format of the output profile
        #[arg(short = 'm', long, value_enum, default_value = "text")]
        mode: PersistMode,

        /// Profile files to join
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Report distances from a source profile to a set of targets
    Distance {
        /// Which extreme to report
        #[arg(short = 't', long, value_enum, default_value = "min")]
        target: Extremum,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Source profile file
        source: PathBuf,

        /// Target profile files
        #[arg(required = true)]
        targets: Vec<PathBuf>,
    },
}

// `PersistMode` itself stays free of CLI concerns; the flag mapping is
// implemented here instead of derived on the library type.
impl ValueEnum for PersistMode {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Text, Self::Binary]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Text => clap::builder::PossibleValue::new("text")
                .help("Human-readable, whitespace-delimited entries"),
            Self::Binary => clap::builder::PossibleValue::new("binary")
                .help("Fixed-layout binary records"),
        })
    }
}

/// Output format for classification and distance reports.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ReportFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON array format
    Json,
}

/// Which end of the distance range a report highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Extremum {
    /// Nearest profile (smallest distance)
    #[default]
    Min,
    /// Farthest profile (largest distance)
    Max,
}

fn parse_k(s: &str) -> Result<usize, String> {
    let k: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if k == 0 {
        return Err("k-mer length must be at least 1".to_string());
    }
    if k > 32 {
        return Err("k-mer length must be at most 32".to_string());
    }
    Ok(k)
}
