//! The `KmerCounter`: a dense 2D frequency table over all possible k-mers.
//!
//! Every k-mer of length `k` over the alphabet `A` = sentinel + valid
//! nucleotides is split into a row prefix of length `ceil(k/2)` and a column
//! suffix of length `floor(k/2)`. Each half is read as a base-`|A|` numeral
//! (most significant symbol leftmost, symbol value = its index in `A`),
//! which gives a bijection between (row, column) pairs and k-mers. Tallying
//! an occurrence is therefore an O(k) encode plus an O(1) table update, with
//! no hashing, at the cost of `|A|^k` dense cells — fine because k stays
//! small in practice.
//!
//! The table itself is one contiguous buffer indexed by
//! `row * num_cols + col`; cell updates saturate rather than wrap.

use std::path::Path;

use tracing::debug;

use crate::error::KmerProfError;
use crate::freq::KmerFreq;
use crate::kmer::{Kmer, MISSING_NUCLEOTIDE};
use crate::profile::Profile;
use crate::sequence;

/// The nucleotide set used when none is configured.
pub const DEFAULT_VALID_NUCLEOTIDES: &str = "ACGT";

/// A dense frequency table counting k-mer occurrences in raw sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerCounter {
    k: usize,
    valid_nucleotides: String,
    /// Sentinel + valid nucleotides; symbol order defines the bijection.
    all_nucleotides: Vec<char>,
    rows: usize,
    cols: usize,
    counts: Vec<u32>,
}

impl KmerCounter {
    /// Creates a counter for k-mers of length `k` over `valid_nucleotides`.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::InvalidKmerLength`] if `k` is zero,
    /// [`KmerProfError::InvalidAlphabet`] if the nucleotide set is empty,
    /// contains duplicates, or contains the sentinel character, and
    /// [`KmerProfError::TableTooLarge`] if `|A|^k` overflows addressable
    /// memory.
    pub fn new(k: usize, valid_nucleotides: &str) -> Result<Self, KmerProfError> {
        if k < 1 {
            return Err(KmerProfError::InvalidKmerLength { k });
        }

        let invalid = |details: &str| KmerProfError::InvalidAlphabet {
            alphabet: valid_nucleotides.to_string(),
            details: details.to_string(),
        };
        if valid_nucleotides.is_empty() {
            return Err(invalid("the nucleotide set is empty"));
        }
        if valid_nucleotides.contains(MISSING_NUCLEOTIDE) {
            return Err(invalid("the nucleotide set contains the sentinel character"));
        }
        let mut all_nucleotides = vec![MISSING_NUCLEOTIDE];
        for c in valid_nucleotides.chars() {
            if all_nucleotides.contains(&c) {
                return Err(invalid("the nucleotide set contains duplicate characters"));
            }
            all_nucleotides.push(c);
        }

        let n = all_nucleotides.len();
        let too_large = KmerProfError::TableTooLarge {
            k,
            num_nucleotides: n,
        };
        let rows = checked_pow(n, k.div_ceil(2)).ok_or_else(|| too_large_err(k, n))?;
        let cols = checked_pow(n, k / 2).ok_or_else(|| too_large_err(k, n))?;
        let cells = rows.checked_mul(cols).ok_or(too_large)?;

        Ok(Self {
            k,
            valid_nucleotides: valid_nucleotides.to_string(),
            all_nucleotides,
            rows,
            cols,
            counts: vec![0; cells],
        })
    }

    /// Returns the k-mer length this counter tallies.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the configured valid-nucleotide set.
    #[must_use]
    pub fn valid_nucleotides(&self) -> &str {
        &self.valid_nucleotides
    }

    /// Returns the full alphabet (sentinel + valid nucleotides) as a string.
    #[must_use]
    pub fn all_nucleotides(&self) -> String {
        self.all_nucleotides.iter().collect()
    }

    /// Returns the size of the full alphabet.
    #[must_use]
    pub fn num_nucleotides(&self) -> usize {
        self.all_nucleotides.len()
    }

    /// Returns the number of table rows, `|A|^ceil(k/2)`.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of table columns, `|A|^floor(k/2)`.
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// Returns the number of representable k-mers, `|A|^k`.
    #[must_use]
    pub fn num_kmers(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns how many k-mers have a strictly positive count.
    #[must_use]
    pub fn active_kmers(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Returns the count at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::IndexOutOfBounds`] if either coordinate is
    /// outside the table.
    pub fn get(&self, row: usize, col: usize) -> Result<u32, KmerProfError> {
        self.check_bounds(row, col)?;
        Ok(self.counts[row * self.cols + col])
    }

    /// Resets every cell to zero.
    pub fn reset(&mut self) {
        self.counts.fill(0);
    }

    /// Converts a half-string into its base-`|A|` index, or `None` if any
    /// character is outside the alphabet.
    #[must_use]
    pub fn index_of(&self, half: &str) -> Option<usize> {
        let n = self.all_nucleotides.len();
        half.chars().try_fold(0usize, |acc, c| {
            let pos = self.all_nucleotides.iter().position(|&a| a == c)?;
            Some(acc * n + pos)
        })
    }

    /// Inverse of [`index_of`](Self::index_of): expands `index` into a
    /// string of `n_chars` symbols, reading residues right to left. Leading
    /// zero symbols decode to the sentinel, which occupies position zero of
    /// the alphabet.
    #[must_use]
    pub fn inverted_index(&self, mut index: usize, n_chars: usize) -> String {
        let n = self.all_nucleotides.len();
        let mut symbols = vec![MISSING_NUCLEOTIDE; n_chars];
        for slot in symbols.iter_mut().rev() {
            *slot = self.all_nucleotides[index % n];
            index /= n;
        }
        symbols.into_iter().collect()
    }

    /// Maps a k-mer onto its `(row, col)` cell, or `None` if the k-mer
    /// contains a character outside the alphabet or has the wrong length.
    #[must_use]
    pub fn row_column(&self, kmer: &Kmer) -> Option<(usize, usize)> {
        let chars: Vec<char> = kmer.as_str().chars().collect();
        if chars.len() != self.k {
            return None;
        }
        let split = self.k.div_ceil(2);
        let prefix: String = chars[..split].iter().collect();
        let suffix: String = chars[split..].iter().collect();
        Some((self.index_of(&prefix)?, self.index_of(&suffix)?))
    }

    /// Decodes the unique k-mer stored at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::IndexOutOfBounds`] if either coordinate is
    /// outside the table.
    pub fn kmer_at(&self, row: usize, col: usize) -> Result<Kmer, KmerProfError> {
        self.check_bounds(row, col)?;
        let mut text = self.inverted_index(row, self.k.div_ceil(2));
        text.push_str(&self.inverted_index(col, self.k / 2));
        Ok(Kmer::from_text(text))
    }

    /// Adds `by` occurrences of `kmer` to its cell, saturating at the
    /// maximum count.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::InvalidNucleotide`] if the k-mer contains a
    /// character outside the full alphabet, and
    /// [`KmerProfError::IndexOutOfBounds`] if its length differs from `k`.
    pub fn increase_frequency(&mut self, kmer: &Kmer, by: u32) -> Result<(), KmerProfError> {
        if kmer
            .as_str()
            .chars()
            .any(|c| !self.all_nucleotides.contains(&c))
        {
            return Err(KmerProfError::InvalidNucleotide {
                kmer: kmer.as_str().to_string(),
                alphabet: self.all_nucleotides(),
            });
        }
        let (row, col) = self
            .row_column(kmer)
            .ok_or(KmerProfError::IndexOutOfBounds {
                index: kmer.len(),
                len: self.k,
            })?;
        let cell = &mut self.counts[row * self.cols + col];
        *cell = cell.saturating_add(by);
        Ok(())
    }

    /// Re-initializes the table and tallies every k-mer window of the
    /// sequence stored in the given genome file.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::SequenceRead`] if the file cannot be read.
    pub fn calculate_frequencies<P: AsRef<Path>>(&mut self, path: P) -> Result<(), KmerProfError> {
        self.reset();
        let seq = sequence::read_sequence(&path)?;
        debug!(
            path = %path.as_ref().display(),
            bases = seq.len(),
            "counting k-mer windows"
        );
        self.count_sequence(&seq)
    }

    /// Tallies every k-mer window of an in-memory sequence. Each window is
    /// normalized against the valid-nucleotide set before counting, so dirty
    /// input lands in sentinel cells rather than being dropped.
    pub fn count_sequence(&mut self, seq: &str) -> Result<(), KmerProfError> {
        let chars: Vec<char> = seq.chars().collect();
        if chars.len() < self.k {
            return Ok(());
        }
        for window in chars.windows(self.k) {
            let mut kmer = Kmer::from_text(window.iter().collect());
            kmer.normalize(&self.valid_nucleotides);
            self.increase_frequency(&kmer, 1)?;
        }
        Ok(())
    }

    /// Accumulates another counter's cells into this one.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::MergeKMismatch`] or
    /// [`KmerProfError::MergeAlphabetMismatch`] unless both counters share
    /// the same k and alphabet.
    pub fn merge(&mut self, other: &KmerCounter) -> Result<(), KmerProfError> {
        if other.k != self.k {
            return Err(KmerProfError::MergeKMismatch {
                left: self.k,
                right: other.k,
            });
        }
        if other.all_nucleotides != self.all_nucleotides {
            return Err(KmerProfError::MergeAlphabetMismatch {
                left: self.all_nucleotides(),
                right: other.all_nucleotides(),
            });
        }
        for (cell, &extra) in self.counts.iter_mut().zip(&other.counts) {
            *cell = cell.saturating_add(extra);
        }
        Ok(())
    }

    /// Exports one entry per strictly positive cell, scanning rows first and
    /// columns within each row. The resulting profile owns independent
    /// copies of the data; by construction no two cells decode to the same
    /// k-mer, so the scan order only fixes the pre-sort entry order.
    #[must_use]
    pub fn to_profile(&self) -> Profile {
        let mut profile = Profile::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let count = self.counts[row * self.cols + col];
                if count > 0 {
                    let mut text = self.inverted_index(row, self.k.div_ceil(2));
                    text.push_str(&self.inverted_index(col, self.k / 2));
                    profile.append(KmerFreq::new(Kmer::from_text(text), count));
                }
            }
        }
        profile
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), KmerProfError> {
        if row >= self.rows {
            return Err(KmerProfError::IndexOutOfBounds {
                index: row,
                len: self.rows,
            });
        }
        if col >= self.cols {
            return Err(KmerProfError::IndexOutOfBounds {
                index: col,
                len: self.cols,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for KmerCounter {
    /// Dumps the alphabet, k, and the raw count matrix, one row per line.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}", self.all_nucleotides(), self.k)?;
        for row in 0..self.rows {
            for col in 0..self.cols {
                write!(f, "{} ", self.counts[row * self.cols + col])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn checked_pow(base: usize, exp: usize) -> Option<usize> {
    base.checked_pow(u32::try_from(exp).ok()?)
}

fn too_large_err(k: usize, num_nucleotides: usize) -> KmerProfError {
    KmerProfError::TableTooLarge { k, num_nucleotides }
}
