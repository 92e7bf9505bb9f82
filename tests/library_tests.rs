//! End-to-end library tests exercising the public API: counting, profile
//! construction, persistence, and classification by rank distance.

use std::io::Write;

use kmerprof::{
    ErrorKind, Kmer, KmerCounter, KmerFreq, KmerProfError, PersistMode, Profile,
    DEFAULT_VALID_NUCLEOTIDES,
};
use tempfile::{tempdir, NamedTempFile};

fn kf(text: &str, frequency: u32) -> KmerFreq {
    KmerFreq::new(Kmer::new(text).unwrap(), frequency)
}

fn genome_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".dna").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn learn(k: usize, sequence: &str) -> Profile {
    let file = genome_file(sequence);
    let mut counter = KmerCounter::new(k, DEFAULT_VALID_NUCLEOTIDES).unwrap();
    counter.calculate_frequencies(file.path()).unwrap();
    let mut profile = counter.to_profile();
    profile.zip(true, 0);
    profile.sort();
    profile
}

#[test]
fn learning_pipeline_produces_canonical_profile() {
    let profile = learn(2, "AGCTAGCTT");
    let entries: Vec<_> = profile
        .entries()
        .iter()
        .map(|e| (e.kmer().as_str(), e.frequency()))
        .collect();
    assert_eq!(
        entries,
        [("AG", 2), ("CT", 2), ("GC", 2), ("TA", 1), ("TT", 1)]
    );
}

#[test]
fn dirty_input_lands_in_sentinel_cells_and_zips_away() {
    let file = genome_file("AGNNCT");
    let mut counter = KmerCounter::new(2, DEFAULT_VALID_NUCLEOTIDES).unwrap();
    counter.calculate_frequencies(file.path()).unwrap();

    let mut profile = counter.to_profile();
    // Windows: AG, G_, __, _C, CT -> three entries carry the sentinel.
    assert_eq!(profile.len(), 5);

    profile.zip(true, 0);
    let kept: Vec<_> = profile.entries().iter().map(|e| e.kmer().as_str()).collect();
    assert_eq!(kept, ["AG", "CT"]);
}

#[test]
fn counters_merge_before_export() {
    let first = genome_file("ACAC");
    let second = genome_file("ACGT");

    let mut total = KmerCounter::new(2, DEFAULT_VALID_NUCLEOTIDES).unwrap();
    total.calculate_frequencies(first.path()).unwrap();
    let mut other = KmerCounter::new(2, DEFAULT_VALID_NUCLEOTIDES).unwrap();
    other.calculate_frequencies(second.path()).unwrap();
    total.merge(&other).unwrap();

    let mut profile = total.to_profile();
    profile.sort();
    assert_eq!(profile.get(0).unwrap().kmer().as_str(), "AC");
    assert_eq!(profile.get(0).unwrap().frequency(), 3);
}

#[test]
fn saved_profile_reloads_identically_in_both_modes() {
    let mut profile = learn(3, "AGCTAGCTTAGCT");
    profile.set_id("test organism");

    let dir = tempdir().unwrap();
    for (name, mode) in [("t.prf", PersistMode::Text), ("b.prf", PersistMode::Binary)] {
        let path = dir.path().join(name);
        profile.save(&path, mode).unwrap();
        let loaded = Profile::load(&path).unwrap();
        assert_eq!(loaded, profile);
        assert_eq!(loaded.id(), "test organism");
    }
}

#[test]
fn text_and_binary_files_start_with_their_magic() {
    let profile = learn(2, "ACGT");
    let dir = tempdir().unwrap();

    let text_path = dir.path().join("p.prf");
    profile.save(&text_path, PersistMode::Text).unwrap();
    let text = std::fs::read_to_string(&text_path).unwrap();
    assert!(text.starts_with("MP-KMER-T-1.0\n"));
    assert!(!text.ends_with('\n'));

    let bin_path = dir.path().join("p2.prf");
    profile.save(&bin_path, PersistMode::Binary).unwrap();
    let bytes = std::fs::read(&bin_path).unwrap();
    assert!(bytes.starts_with(b"MP-KMER-B-1.0\n"));
}

#[test]
fn classification_prefers_the_matching_genome() {
    // The query is a prefix of the first reference genome, so its k-mer
    // ranking should sit closer to that profile than to an unrelated one.
    let human_like = "ACGTACGTACGTTTACGGACGT";
    let other = "GGGCCCGGGCCCGGGTTTGGG";

    let reference_a = learn(3, human_like);
    let reference_b = learn(3, other);
    let query = learn(3, &human_like[..16]);

    let to_a = query.distance(&reference_a).unwrap();
    let to_b = query.distance(&reference_b).unwrap();
    assert!(to_a < to_b);
}

#[test]
fn distance_is_zero_against_itself_and_positive_otherwise() {
    let profile = learn(2, "AGCTAGCTT");
    assert!(profile.distance(&profile).unwrap().abs() < f64::EPSILON);

    let other = learn(2, "GGGGGGG");
    assert!(profile.distance(&other).unwrap() > 0.0);
}

#[test]
fn join_then_zip_then_sort_matches_reference_flow() {
    let mut red = Profile::new();
    red.set_id("red bug");
    for (text, freq) in [("gc", 2), ("AG", 4), ("cc", 4)] {
        red.append(kf(text, freq));
    }
    let mut more = Profile::new();
    more.set_id("red bug");
    for (text, freq) in [("C_", 6), ("CG", 4), ("G_", 2), ("_G", 2)] {
        more.append(kf(text, freq));
    }

    red.normalize(DEFAULT_VALID_NUCLEOTIDES);
    more.normalize(DEFAULT_VALID_NUCLEOTIDES);
    red.join(&more);
    red.zip(false, 0);
    red.sort();

    let entries: Vec<_> = red
        .entries()
        .iter()
        .map(|e| (e.kmer().as_str(), e.frequency()))
        .collect();
    assert_eq!(
        entries,
        [
            ("C_", 6),
            ("AG", 4),
            ("CC", 4),
            ("CG", 4),
            ("GC", 2),
            ("G_", 2),
            ("_G", 2),
        ]
    );
}

#[test]
fn error_kinds_classify_failures() {
    let err = KmerCounter::new(0, "ACGT").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let profile = Profile::new();
    assert_eq!(profile.get(0).unwrap_err().kind(), ErrorKind::OutOfRange);

    let err = Profile::load("/nonexistent/p.prf").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(matches!(err, KmerProfError::ProfileRead { .. }));
}

#[test]
fn sequence_shorter_than_k_learns_an_empty_profile() {
    let file = genome_file("AC");
    let mut counter = KmerCounter::new(5, DEFAULT_VALID_NUCLEOTIDES).unwrap();
    counter.calculate_frequencies(file.path()).unwrap();
    let profile = counter.to_profile();
    assert!(profile.is_empty());
}
