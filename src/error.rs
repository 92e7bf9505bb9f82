//! Error types for kmerprof.
//!
//! This module provides exhaustive, strongly-typed errors for all operations
//! in the library, enabling precise error handling and informative messages.
//! Every variant also maps onto a coarse [`ErrorKind`] so callers that only
//! care about the failure class (bad argument, bad index, I/O) can match on
//! that instead of the full enum.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in kmerprof operations.
#[derive(Debug, Error)]
pub enum KmerProfError {
    /// K-mer length must be at least 1.
    #[error("invalid k-mer length {k}: must be at least 1")]
    InvalidKmerLength { k: usize },

    /// A k-mer cannot be built from an empty string.
    #[error("cannot build a k-mer from an empty string")]
    EmptyKmer,

    /// Index into a k-mer or profile is out of bounds.
    #[error("position {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The nucleotide and complementary-nucleotide alphabets differ in length.
    #[error("alphabet length mismatch: {nucleotides} nucleotides vs {complementary} complements")]
    AlphabetLengthMismatch {
        nucleotides: usize,
        complementary: usize,
    },

    /// The configured nucleotide alphabet is unusable.
    #[error("invalid nucleotide alphabet '{alphabet}': {details}")]
    InvalidAlphabet { alphabet: String, details: String },

    /// A k-mer contains a character outside the counter's alphabet.
    #[error("k-mer '{kmer}' contains a nucleotide outside the alphabet '{alphabet}'")]
    InvalidNucleotide { kmer: String, alphabet: String },

    /// Counters being merged have different k-mer lengths.
    #[error("cannot merge counters with different k ({left} vs {right})")]
    MergeKMismatch { left: usize, right: usize },

    /// Counters being merged have different alphabets.
    #[error("cannot merge counters with different alphabets ('{left}' vs '{right}')")]
    MergeAlphabetMismatch { left: String, right: String },

    /// The dense count table for (k, alphabet) does not fit in memory.
    #[error("count table too large: {num_nucleotides} nucleotides with k = {k}")]
    TableTooLarge { k: usize, num_nucleotides: usize },

    /// Distance is undefined when either profile has no entries.
    #[error("cannot compute the distance to or from an empty profile")]
    EmptyProfile,

    /// A frequency decoded from a file was negative.
    #[error("negative frequency {frequency}")]
    NegativeFrequency { frequency: i64 },

    /// A frequency does not fit the fixed-width record format.
    #[error("frequency {frequency} does not fit the profile record format")]
    FrequencyOverflow { frequency: i64 },

    /// A profile file declared a negative entry count.
    #[error("negative entry count {count} in profile file '{path}'")]
    NegativeEntryCount { count: i64, path: PathBuf },

    /// A profile file is malformed (bad magic string, header, or body).
    #[error("invalid profile file '{path}': {details}")]
    InvalidProfile { details: String, path: PathBuf },

    /// Failed to read a sequence file.
    #[error("failed to read sequence file '{path}': {source}")]
    SequenceRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to read a profile file.
    #[error("failed to read profile file '{path}': {source}")]
    ProfileRead {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to write a profile file.
    #[error("failed to write profile file '{path}': {source}")]
    ProfileWrite {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to write a report to the output stream.
    #[error("failed to write output: {source}")]
    WriteError {
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a JSON report.
    #[error("failed to serialize JSON: {source}")]
    JsonError {
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse failure classes, for callers that match on the kind of error
/// rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller-supplied value is unusable: bad k, mismatched alphabets or
    /// counters, unrecognized magic string or persistence mode.
    InvalidArgument,
    /// An index, size, or frequency violates a container invariant.
    OutOfRange,
    /// The filesystem or a stream failed, or a file ended mid-record.
    Io,
}

impl KmerProfError {
    /// Returns the coarse class this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKmerLength { .. }
            | Self::EmptyKmer
            | Self::AlphabetLengthMismatch { .. }
            | Self::InvalidAlphabet { .. }
            | Self::InvalidNucleotide { .. }
            | Self::MergeKMismatch { .. }
            | Self::MergeAlphabetMismatch { .. }
            | Self::TableTooLarge { .. }
            | Self::EmptyProfile
            | Self::InvalidProfile { .. } => ErrorKind::InvalidArgument,
            Self::IndexOutOfBounds { .. }
            | Self::NegativeFrequency { .. }
            | Self::FrequencyOverflow { .. }
            | Self::NegativeEntryCount { .. } => ErrorKind::OutOfRange,
            Self::SequenceRead { .. }
            | Self::ProfileRead { .. }
            | Self::ProfileWrite { .. }
            | Self::WriteError { .. }
            | Self::JsonError { .. } => ErrorKind::Io,
        }
    }
}

impl From<std::io::Error> for KmerProfError {
    fn from(source: std::io::Error) -> Self {
        KmerProfError::WriteError { source }
    }
}

impl From<serde_json::Error> for KmerProfError {
    fn from(source: serde_json::Error) -> Self {
        KmerProfError::JsonError { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kmer_length_error_display() {
        let err = KmerProfError::InvalidKmerLength { k: 0 };
        assert_eq!(err.to_string(), "invalid k-mer length 0: must be at least 1");
    }

    #[test]
    fn negative_frequency_display() {
        let err = KmerProfError::NegativeFrequency { frequency: -7 };
        assert_eq!(err.to_string(), "negative frequency -7");
    }

    #[test]
    fn invalid_profile_display_includes_path() {
        let err = KmerProfError::InvalidProfile {
            details: "an invalid magic string was found".into(),
            path: PathBuf::from("/tmp/x.prf"),
        };
        assert!(err.to_string().contains("/tmp/x.prf"));
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn kinds_group_as_documented() {
        assert_eq!(
            KmerProfError::InvalidKmerLength { k: 0 }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            KmerProfError::IndexOutOfBounds { index: 9, len: 3 }.kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            KmerProfError::NegativeFrequency { frequency: -1 }.kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            KmerProfError::WriteError {
                source: std::io::Error::other("boom"),
            }
            .kind(),
            ErrorKind::Io
        );
    }
}
