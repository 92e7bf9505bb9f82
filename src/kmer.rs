//! The `Kmer` type: a fixed-length nucleotide string.
//!
//! A k-mer owns a sequence of `k >= 1` characters drawn from a nucleotide
//! alphabet plus one reserved sentinel, [`MISSING_NUCLEOTIDE`], which marks a
//! position that failed alphabet validation. The length is fixed at
//! construction; [`Kmer::normalize`] is the single point where dirty input
//! text becomes canonical (uppercased, invalid characters replaced by the
//! sentinel).
//!
//! K-mers are stored as plain text rather than bit-packed integers because
//! the alphabet is configurable and includes the sentinel, so no fixed
//! bits-per-symbol encoding applies.

use std::io::{self, BufRead, Write};

use crate::error::KmerProfError;

/// Reserved character marking an unknown or invalid nucleotide.
pub const MISSING_NUCLEOTIDE: char = '_';

/// A fixed-length nucleotide string.
///
/// Equality and ordering are defined over the underlying text, so sorting
/// k-mers yields plain lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Kmer {
    text: String,
}

impl Kmer {
    /// Builds a k-mer from the given text.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::EmptyKmer`] if `text` is empty.
    pub fn new(text: impl Into<String>) -> Result<Self, KmerProfError> {
        let text = text.into();
        if text.is_empty() {
            return Err(KmerProfError::EmptyKmer);
        }
        Ok(Self { text })
    }

    /// Builds a k-mer from text the caller guarantees to be non-empty, such
    /// as the output of the counter's index bijection.
    pub(crate) fn from_text(text: String) -> Self {
        debug_assert!(!text.is_empty());
        Self { text }
    }

    /// Builds a k-mer of length `k` filled with the sentinel character.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::InvalidKmerLength`] if `k` is zero.
    pub fn filled(k: usize) -> Result<Self, KmerProfError> {
        if k < 1 {
            return Err(KmerProfError::InvalidKmerLength { k });
        }
        Ok(Self {
            text: MISSING_NUCLEOTIDE.to_string().repeat(k),
        })
    }

    /// Returns the number of nucleotides (k).
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// A k-mer is never empty; this exists to satisfy the usual pairing
    /// with [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the text of this k-mer.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the character at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::IndexOutOfBounds`] if `index >= self.len()`.
    pub fn at(&self, index: usize) -> Result<char, KmerProfError> {
        self.text
            .chars()
            .nth(index)
            .ok_or(KmerProfError::IndexOutOfBounds {
                index,
                len: self.len(),
            })
    }

    /// Lowercases every character in place. Folding is per character and
    /// ASCII-only, so the length never changes; characters outside ASCII
    /// pass through and are left for [`normalize`](Self::normalize) to
    /// substitute.
    pub fn to_lower(&mut self) {
        self.text = self.text.chars().map(|c| c.to_ascii_lowercase()).collect();
    }

    /// Uppercases every character in place, per character and ASCII-only.
    pub fn to_upper(&mut self) {
        self.text = self.text.chars().map(|c| c.to_ascii_uppercase()).collect();
    }

    /// Canonicalizes this k-mer against a valid-nucleotide set: uppercases
    /// the text, then replaces every character absent from
    /// `valid_nucleotides` with [`MISSING_NUCLEOTIDE`].
    pub fn normalize(&mut self, valid_nucleotides: &str) {
        self.to_upper();
        self.text = self
            .text
            .chars()
            .map(|c| {
                if valid_nucleotides.contains(c) {
                    c
                } else {
                    MISSING_NUCLEOTIDE
                }
            })
            .collect();
    }

    /// Builds the base-paired sequence by table lookup: each character found
    /// in `nucleotides` is replaced by the character at the same position in
    /// `complementary_nucleotides`; unmapped characters pass through
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`KmerProfError::AlphabetLengthMismatch`] if the two alphabet
    /// strings differ in length.
    pub fn complementary(
        &self,
        nucleotides: &str,
        complementary_nucleotides: &str,
    ) -> Result<Self, KmerProfError> {
        let pairs: Vec<char> = complementary_nucleotides.chars().collect();
        let bases: Vec<char> = nucleotides.chars().collect();
        if bases.len() != pairs.len() {
            return Err(KmerProfError::AlphabetLengthMismatch {
                nucleotides: bases.len(),
                complementary: pairs.len(),
            });
        }

        let text = self
            .text
            .chars()
            .map(|c| match bases.iter().position(|&b| b == c) {
                Some(i) => pairs[i],
                None => c,
            })
            .collect::<String>();

        Ok(Self { text })
    }

    /// Returns `true` if any position holds the sentinel character.
    #[must_use]
    pub fn has_missing(&self) -> bool {
        self.text.contains(MISSING_NUCLEOTIDE)
    }

    /// Writes the raw text bytes followed by a NUL terminator, the fixed
    /// layout used by the binary profile format.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.text.as_bytes())?;
        writer.write_all(&[0])
    }

    /// Reads a NUL-terminated k-mer written by [`write_to`](Self::write_to).
    ///
    /// # Errors
    ///
    /// Fails with `UnexpectedEof` if the stream ends before the terminator,
    /// and with `InvalidData` if the decoded text is empty or not UTF-8.
    pub fn read_from<R: BufRead>(reader: &mut R) -> io::Result<Self> {
        let mut raw = Vec::new();
        reader.read_until(0, &mut raw)?;
        if raw.pop() != Some(0) {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended before the k-mer terminator",
            ));
        }
        let text = String::from_utf8(raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if text.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "empty k-mer in record",
            ));
        }
        Ok(Self { text })
    }
}

impl std::fmt::Display for Kmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
