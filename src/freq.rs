//! The `KmerFreq` type: a k-mer together with its frequency.
//!
//! This is the entry unit of a [`Profile`](crate::profile::Profile) and the
//! record unit of the binary profile format. Its `Ord` implementation *is*
//! the domain total order used throughout the crate: frequency descending,
//! ties broken by lexicographic k-mer order ascending, so a stable sort of
//! `KmerFreq` values yields the canonical profile ordering directly.

use std::cmp::Ordering;
use std::io::{self, BufRead, Write};

use crate::kmer::Kmer;

/// A `(k-mer, frequency)` pair.
///
/// The frequency is a count and therefore unsigned; the file formats encode
/// it as a fixed-width signed integer and the decoders reject negatives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KmerFreq {
    kmer: Kmer,
    frequency: u32,
}

impl KmerFreq {
    /// Pairs a k-mer with its frequency.
    #[must_use]
    pub fn new(kmer: Kmer, frequency: u32) -> Self {
        Self { kmer, frequency }
    }

    /// Returns the k-mer.
    #[must_use]
    pub fn kmer(&self) -> &Kmer {
        &self.kmer
    }

    /// Returns the frequency.
    #[must_use]
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Replaces the k-mer.
    pub fn set_kmer(&mut self, kmer: Kmer) {
        self.kmer = kmer;
    }

    /// Replaces the frequency.
    pub fn set_frequency(&mut self, frequency: u32) {
        self.frequency = frequency;
    }

    /// Adds `extra` occurrences, saturating at `u32::MAX`.
    pub fn add_frequency(&mut self, extra: u32) {
        self.frequency = self.frequency.saturating_add(extra);
    }

    /// Writes one binary record: the k-mer's NUL-terminated text followed by
    /// the frequency as a 4-byte little-endian integer.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidData` if the frequency does not fit the signed
    /// record format; the decoder reads through the same signed width, so
    /// anything written here reloads to the identical value.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let frequency = i32::try_from(self.frequency).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "frequency {} does not fit the profile record format",
                    self.frequency
                ),
            )
        })?;
        self.kmer.write_to(writer)?;
        writer.write_all(&frequency.to_le_bytes())
    }

    /// Reads one binary record written by [`write_to`](Self::write_to).
    ///
    /// # Errors
    ///
    /// Fails with `UnexpectedEof` when the stream ends mid-record and with
    /// `InvalidData` when the decoded frequency is negative.
    pub fn read_from<R: BufRead>(reader: &mut R) -> io::Result<Self> {
        let kmer = Kmer::read_from(reader)?;
        let mut raw = [0u8; 4];
        reader.read_exact(&mut raw)?;
        let frequency = i32::from_le_bytes(raw);
        if frequency < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("negative frequency {frequency}"),
            ));
        }
        #[allow(clippy::cast_sign_loss)]
        let frequency = frequency as u32;
        Ok(Self { kmer, frequency })
    }
}

impl Ord for KmerFreq {
    /// Canonical profile order: higher frequency first, ties by k-mer text
    /// ascending. "Less" therefore means "ranks earlier".
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .frequency
            .cmp(&self.frequency)
            .then_with(|| self.kmer.cmp(&other.kmer))
    }
}

impl PartialOrd for KmerFreq {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for KmerFreq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kmer, self.frequency)
    }
}
