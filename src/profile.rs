//! The `Profile`: a named, deduplicated collection of k-mer frequencies.
//!
//! A profile owns a free-text identifier and a dense ordered sequence of
//! [`KmerFreq`] entries with unique k-mers. Uniqueness is enforced by
//! [`Profile::append`], which merges frequencies instead of inserting a
//! duplicate; every bulk operation (join, counter export, file load) is
//! defined in terms of repeated `append`. Capacity grows in fixed-size
//! blocks and is never reclaimed by deletion.
//!
//! # File formats
//!
//! Text (magic line `MP-KMER-T-1.0`):
//!
//! ```text
//! MP-KMER-T-1.0
//! <profile identifier>
//! <N>
//! <kmer_1> <frequency_1>
//! ...
//! <kmer_N> <frequency_N>
//! ```
//!
//! Binary (magic line `MP-KMER-B-1.0`): the same three header lines, then
//! `N` records back to back, each the k-mer's NUL-terminated text bytes
//! followed by the frequency as a 4-byte little-endian integer.
//!
//! Entries are written in the profile's current in-memory order; callers
//! sort first for canonical output. Loading feeds every decoded pair
//! through `append`, so duplicate k-mers across a file merge rather than
//! duplicate.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::KmerProfError;
use crate::freq::KmerFreq;
use crate::kmer::Kmer;

/// Magic line selecting the text decoder.
pub const MAGIC_STRING_T: &str = "MP-KMER-T-1.0";

/// Magic line selecting the binary decoder.
pub const MAGIC_STRING_B: &str = "MP-KMER-B-1.0";

/// Identifier given to profiles that have not been labeled yet.
pub const DEFAULT_PROFILE_ID: &str = "unknown";

const INITIAL_CAPACITY: usize = 10;
const BLOCK_SIZE: usize = 20;

/// On-disk representation of a profile. The command-line mapping onto
/// `text`/`binary` flag values lives in the CLI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Human-readable, whitespace-delimited entries.
    #[default]
    Text,
    /// Fixed-layout binary records.
    Binary,
}

/// A growable, deduplicated, sortable, persistable collection of
/// (k-mer, frequency) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    profile_id: String,
    entries: Vec<KmerFreq>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

impl Profile {
    /// Creates an empty profile with the default identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates an empty profile preallocated for `capacity` entries, for
    /// callers that know the size in advance.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            profile_id: DEFAULT_PROFILE_ID.to_string(),
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Returns the profile identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.profile_id
    }

    /// Replaces the profile identifier.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.profile_id = id.into();
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the profile has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the current physical capacity (always >= `len`).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Returns the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::IndexOutOfBounds`] if `index >= self.len()`.
    pub fn get(&self, index: usize) -> Result<&KmerFreq, KmerProfError> {
        self.entries
            .get(index)
            .ok_or(KmerProfError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            })
    }

    /// Returns the entries in their current order.
    #[must_use]
    pub fn entries(&self) -> &[KmerFreq] {
        &self.entries
    }

    /// Adds one (k-mer, frequency) pair, preserving the unique-kmer
    /// invariant: if the k-mer already exists its frequency is increased,
    /// otherwise the entry is inserted at the end, growing capacity in
    /// fixed-size blocks when exhausted.
    pub fn append(&mut self, kmer_freq: KmerFreq) {
        match self.find_kmer(kmer_freq.kmer()) {
            Some(pos) => self.entries[pos].add_frequency(kmer_freq.frequency()),
            None => {
                if self.entries.len() == self.entries.capacity() {
                    self.entries.reserve_exact(BLOCK_SIZE);
                }
                self.entries.push(kmer_freq);
            }
        }
    }

    /// Appends every entry of `other`, in index order.
    pub fn join(&mut self, other: &Profile) {
        for entry in &other.entries {
            self.append(entry.clone());
        }
    }

    /// Normalizes every entry's k-mer against the valid-nucleotide set,
    /// then merges any entry whose normalized k-mer duplicates an earlier
    /// one (summing frequencies into the earlier entry and deleting the
    /// later). Quadratic in entry count; profiles are expected small after
    /// zipping.
    pub fn normalize(&mut self, valid_nucleotides: &str) {
        for entry in &mut self.entries {
            let mut kmer = entry.kmer().clone();
            kmer.normalize(valid_nucleotides);
            entry.set_kmer(kmer);
        }

        let mut i = 1;
        while i < self.entries.len() {
            let kmer = self.entries[i].kmer().clone();
            match self.find_kmer_in(&kmer, 0, i - 1) {
                Some(pos) => {
                    let extra = self.entries[i].frequency();
                    self.entries[pos].add_frequency(extra);
                    self.entries.remove(i);
                }
                None => i += 1,
            }
        }
    }

    /// Prunes the profile: removes every entry with frequency <=
    /// `lower_bound` and, when `delete_missing` is set, every entry whose
    /// k-mer still contains the sentinel character. Later entries shift
    /// left; capacity is never reclaimed.
    pub fn zip(&mut self, delete_missing: bool, lower_bound: u32) {
        self.entries.retain(|entry| {
            !(entry.frequency() <= lower_bound || (delete_missing && entry.kmer().has_missing()))
        });
    }

    /// Removes and returns the entry at `pos`, shifting later entries left.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::IndexOutOfBounds`] if `pos >= self.len()`.
    pub fn remove(&mut self, pos: usize) -> Result<KmerFreq, KmerProfError> {
        if pos >= self.entries.len() {
            return Err(KmerProfError::IndexOutOfBounds {
                index: pos,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(pos))
    }

    /// Sorts entries into the canonical order: frequency descending, ties
    /// broken by lexicographic k-mer order ascending. Stable, so equal
    /// entries keep their relative order.
    pub fn sort(&mut self) {
        self.entries.sort();
    }

    /// Positional rank distance to another profile.
    ///
    /// For each entry `i` of `self` (in its current, expected pre-sorted
    /// order), accumulates `|i - rank|` where `rank` is the k-mer's
    /// position in `other`, or `other.len()` when absent; the sum is
    /// normalized by `self.len() * other.len()`. The absent-kmer penalty
    /// deliberately uses the *other* profile's size, which makes the metric
    /// asymmetric; downstream classification depends on exactly this
    /// behavior. The caller is responsible for normalizing, zipping, and
    /// sorting both profiles first.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::EmptyProfile`] if either profile is empty.
    pub fn distance(&self, other: &Profile) -> Result<f64, KmerProfError> {
        if self.is_empty() || other.is_empty() {
            return Err(KmerProfError::EmptyProfile);
        }

        #[allow(clippy::cast_precision_loss)]
        let rank_gap = |i: usize, rank: usize| (i as f64 - rank as f64).abs();

        let mut sum = 0.0;
        for (i, entry) in self.entries.iter().enumerate() {
            let rank = other.find_kmer(entry.kmer()).unwrap_or(other.len());
            sum += rank_gap(i, rank);
        }

        #[allow(clippy::cast_precision_loss)]
        let denominator = self.len() as f64 * other.len() as f64;
        Ok(sum / denominator)
    }

    /// Linear scan for the first entry holding `kmer`.
    #[must_use]
    pub fn find_kmer(&self, kmer: &Kmer) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.kmer() == kmer)
    }

    /// Linear scan restricted to positions `initial..=last`. The upper
    /// bound is clamped to the current size, so ranges past the end are
    /// legal and simply truncated.
    #[must_use]
    pub fn find_kmer_in(&self, kmer: &Kmer, initial: usize, last: usize) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let last = last.min(self.entries.len() - 1);
        self.entries
            .get(initial..=last)?
            .iter()
            .position(|entry| entry.kmer() == kmer)
            .map(|offset| initial + offset)
    }

    /// Saves the profile to `path` in the given mode. Entries are written
    /// in their current in-memory order.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::ProfileWrite`] if the file cannot be
    /// created or written.
    pub fn save<P: AsRef<Path>>(&self, path: P, mode: PersistMode) -> Result<(), KmerProfError> {
        let path = path.as_ref();
        let write_err = |source| KmerProfError::ProfileWrite {
            source,
            path: path.to_path_buf(),
        };

        let file = File::create(path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        self.write_into(&mut writer, mode).map_err(write_err)?;
        writer.flush().map_err(write_err)
    }

    fn write_into<W: Write>(&self, writer: &mut W, mode: PersistMode) -> io::Result<()> {
        match mode {
            PersistMode::Text => write!(writer, "{MAGIC_STRING_T}\n{self}"),
            PersistMode::Binary => {
                write!(
                    writer,
                    "{MAGIC_STRING_B}\n{}\n{}\n",
                    self.profile_id,
                    self.entries.len()
                )?;
                for entry in &self.entries {
                    entry.write_to(writer)?;
                }
                Ok(())
            }
        }
    }

    /// Loads a profile from `path`, selecting the decoder from the magic
    /// line.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::ProfileRead`] if the file cannot be opened
    /// or ends before the declared number of entries,
    /// [`KmerProfError::InvalidProfile`] on an unrecognized magic string or
    /// malformed header/body, [`KmerProfError::NegativeEntryCount`] on a
    /// negative declared count, and [`KmerProfError::NegativeFrequency`] on
    /// a negative frequency value.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KmerProfError> {
        let path = path.as_ref();
        let read_err = |source| KmerProfError::ProfileRead {
            source,
            path: path.to_path_buf(),
        };

        let file = File::open(path).map_err(read_err)?;
        let mut reader = BufReader::new(file);

        let mut magic = String::new();
        reader.read_line(&mut magic).map_err(read_err)?;
        match magic.trim_end() {
            MAGIC_STRING_T => Self::load_text(reader, path),
            MAGIC_STRING_B => Self::load_binary(reader, path),
            other => Err(KmerProfError::InvalidProfile {
                details: format!("an invalid magic string '{other}' was found"),
                path: path.to_path_buf(),
            }),
        }
    }

    fn load_text<R: BufRead>(mut reader: R, path: &Path) -> Result<Self, KmerProfError> {
        let read_err = |source| KmerProfError::ProfileRead {
            source,
            path: path.to_path_buf(),
        };
        let invalid = |details: String| KmerProfError::InvalidProfile {
            details,
            path: path.to_path_buf(),
        };

        let mut id = String::new();
        reader.read_line(&mut id).map_err(read_err)?;
        let id = id.trim_end_matches(['\r', '\n']);

        let mut body = String::new();
        reader.read_to_string(&mut body).map_err(read_err)?;
        let mut tokens = body.split_whitespace();

        let count_token = tokens
            .next()
            .ok_or_else(|| invalid("missing entry count".to_string()))?;
        let count = parse_entry_count(count_token, path)?;

        let mut profile = Self::with_capacity(count);
        profile.set_id(id);
        for _ in 0..count {
            let truncated = || {
                read_err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "file ends before the declared number of entries",
                ))
            };
            let kmer_token = tokens.next().ok_or_else(truncated)?;
            let freq_token = tokens.next().ok_or_else(truncated)?;

            let frequency: i64 = freq_token
                .parse()
                .map_err(|_| invalid(format!("invalid frequency token '{freq_token}'")))?;
            if frequency < 0 {
                return Err(KmerProfError::NegativeFrequency { frequency });
            }
            let frequency = u32::try_from(frequency)
                .map_err(|_| KmerProfError::FrequencyOverflow { frequency })?;

            profile.append(KmerFreq::new(Kmer::new(kmer_token)?, frequency));
        }
        Ok(profile)
    }

    fn load_binary<R: BufRead>(mut reader: R, path: &Path) -> Result<Self, KmerProfError> {
        let read_err = |source| KmerProfError::ProfileRead {
            source,
            path: path.to_path_buf(),
        };

        let mut id = String::new();
        reader.read_line(&mut id).map_err(read_err)?;
        let id = id.trim_end_matches(['\r', '\n']).to_string();

        let mut count_line = String::new();
        reader.read_line(&mut count_line).map_err(read_err)?;
        let count = parse_entry_count(count_line.trim(), path)?;

        let mut profile = Self::with_capacity(count);
        profile.set_id(id);
        for _ in 0..count {
            let record = KmerFreq::read_from(&mut reader).map_err(|e| {
                if e.kind() == io::ErrorKind::InvalidData {
                    KmerProfError::InvalidProfile {
                        details: e.to_string(),
                        path: path.to_path_buf(),
                    }
                } else {
                    read_err(e)
                }
            })?;
            profile.append(record);
        }
        Ok(profile)
    }
}

fn parse_entry_count(token: &str, path: &Path) -> Result<usize, KmerProfError> {
    let count: i64 = token
        .parse()
        .map_err(|_| KmerProfError::InvalidProfile {
            details: format!("invalid entry count '{token}'"),
            path: path.to_path_buf(),
        })?;
    if count < 0 {
        return Err(KmerProfError::NegativeEntryCount {
            count,
            path: path.to_path_buf(),
        });
    }
    usize::try_from(count).map_err(|_| KmerProfError::InvalidProfile {
        details: format!("entry count {count} is not addressable"),
        path: path.to_path_buf(),
    })
}

impl std::fmt::Display for Profile {
    /// The text-format body: identifier line, count line, one entry per
    /// line, no trailing newline.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.profile_id, self.entries.len())?;
        for entry in &self.entries {
            write!(f, "\n{entry}")?;
        }
        Ok(())
    }
}
