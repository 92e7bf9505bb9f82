//! Raw genome file reading.
//!
//! A genome file holds one contiguous DNA sequence as plain text. Reading
//! takes the first whitespace-delimited token of the file; anything after it
//! is ignored, and an empty file yields an empty sequence (which simply
//! produces no k-mers downstream). Validation of the characters themselves
//! happens later, when each window is normalized against the configured
//! alphabet.

use std::fs;
use std::path::Path;

use crate::error::KmerProfError;

/// Reads the sequence from a genome file.
///
/// # Errors
///
/// Returns [`KmerProfError::SequenceRead`] if the file cannot be opened or
/// read.
pub fn read_sequence<P: AsRef<Path>>(path: P) -> Result<String, KmerProfError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| KmerProfError::SequenceRead {
        source,
        path: path.to_path_buf(),
    })?;
    Ok(content
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_sequence(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("failed to write temp file");
        file.flush().expect("failed to flush temp file");
        file
    }

    #[test]
    fn reads_single_token() {
        let file = temp_sequence("AGCTAGCTT\n");
        assert_eq!(read_sequence(file.path()).unwrap(), "AGCTAGCTT");
    }

    #[test]
    fn ignores_trailing_content() {
        let file = temp_sequence("ACGT more stuff\nand lines\n");
        assert_eq!(read_sequence(file.path()).unwrap(), "ACGT");
    }

    #[test]
    fn empty_file_yields_empty_sequence() {
        let file = temp_sequence("");
        assert_eq!(read_sequence(file.path()).unwrap(), "");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_sequence("/nonexistent/genome.dna").unwrap_err();
        assert!(matches!(err, KmerProfError::SequenceRead { .. }));
    }
}
