//! K-mer frequency profiles for DNA classification.
//!
//! This crate learns labeled frequency profiles from raw DNA sequences and
//! compares them with a positional rank distance. A genome is scanned as
//! overlapping k-length windows; each window is normalized against a
//! configurable nucleotide alphabet and tallied in a dense
//! [`KmerCounter`] table. The nonzero counts export into a [`Profile`], a
//! named collection of unique [`KmerFreq`] entries that can be pruned,
//! sorted into canonical order (frequency descending, k-mer ascending on
//! ties), persisted in a text or binary format, and measured against other
//! profiles with [`Profile::distance`].
//!
//! The binary exposes four subcommands over this library: `learn`,
//! `classify`, `join`, and `distance`.

pub mod cli;
pub mod counter;
pub mod error;
pub mod freq;
pub mod kmer;
pub mod profile;
pub mod run;
pub mod sequence;

pub use counter::{KmerCounter, DEFAULT_VALID_NUCLEOTIDES};
pub use error::{ErrorKind, KmerProfError};
pub use freq::KmerFreq;
pub use kmer::{Kmer, MISSING_NUCLEOTIDE};
pub use profile::{PersistMode, Profile, MAGIC_STRING_B, MAGIC_STRING_T};
pub use sequence::read_sequence;
