use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn kmerprof_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_kmerprof"))
}

fn write_genome(dir: &TempDir, name: &str, sequence: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, sequence).expect("Failed to write genome fixture");
    path
}

fn learn(k: &str, id: &str, genome: &Path, output: &Path) -> Output {
    kmerprof_cmd()
        .args(["learn", "-k", k, "-p", id, "-o"])
        .arg(output)
        .arg(genome)
        .output()
        .expect("Failed to execute")
}

#[test]
fn cli_help_flag() {
    let output = kmerprof_cmd()
        .arg("--help")
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kmerprof"));
    assert!(stdout.contains("learn"));
    assert!(stdout.contains("classify"));
}

#[test]
fn cli_version_flag() {
    let output = kmerprof_cmd()
        .arg("--version")
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_missing_subcommand() {
    let output = kmerprof_cmd().output().expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage") || stderr.contains("required"));
}

#[test]
fn cli_learn_writes_a_text_profile() {
    let dir = TempDir::new().unwrap();
    let genome = write_genome(&dir, "bug.dna", "AGCTAGCTT");
    let profile = dir.path().join("bug.prf");

    let output = learn("2", "red bug", &genome, &profile);
    assert!(output.status.success());

    let content = fs::read_to_string(&profile).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("MP-KMER-T-1.0"));
    assert_eq!(lines.next(), Some("red bug"));
    assert_eq!(lines.next(), Some("5"));
    assert_eq!(lines.next(), Some("AG 2"));
}

#[test]
fn cli_learn_binary_mode() {
    let dir = TempDir::new().unwrap();
    let genome = write_genome(&dir, "bug.dna", "AGCTAGCTT");
    let profile = dir.path().join("bug.prf");

    let output = kmerprof_cmd()
        .args(["learn", "-k", "2", "-m", "binary", "-o"])
        .arg(&profile)
        .arg(&genome)
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let bytes = fs::read(&profile).unwrap();
    assert!(bytes.starts_with(b"MP-KMER-B-1.0\n"));
    assert!(bytes.contains(&0u8));
}

#[test]
fn cli_learn_invalid_k() {
    let dir = TempDir::new().unwrap();
    let genome = write_genome(&dir, "bug.dna", "ACGT");

    for bad_k in ["0", "33", "abc"] {
        let output = kmerprof_cmd()
            .args(["learn", "-k", bad_k])
            .arg(&genome)
            .output()
            .expect("Failed to execute");
        assert!(!output.status.success());
    }
}

#[test]
fn cli_learn_missing_genome_fails() {
    let output = kmerprof_cmd()
        .args(["learn", "/nonexistent/genome.dna"])
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sequence file"));
}

#[test]
fn cli_classify_reports_a_final_decision() {
    let dir = TempDir::new().unwrap();
    let bug = write_genome(&dir, "bug.dna", "AGCTAGCTTAGCTAGCTT");
    let worm = write_genome(&dir, "worm.dna", "GGCCGGCCGGTTGGCCGG");
    let query = write_genome(&dir, "query.dna", "AGCTAGCTT");

    let bug_prf = dir.path().join("bug.prf");
    let worm_prf = dir.path().join("worm.prf");
    assert!(learn("2", "red bug", &bug, &bug_prf).status.success());
    assert!(learn("2", "worm", &worm, &worm_prf).status.success());

    let output = kmerprof_cmd()
        .args(["classify", "-k", "2"])
        .arg(&query)
        .arg(&bug_prf)
        .arg(&worm_prf)
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Distance to"));
    assert!(stdout.contains("(red bug)"));
    assert!(stdout.contains("(worm)"));
    assert!(stdout.contains("Final decision: red bug with a distance of"));
}

#[test]
fn cli_classify_json_format() {
    let dir = TempDir::new().unwrap();
    let bug = write_genome(&dir, "bug.dna", "AGCTAGCTT");
    let bug_prf = dir.path().join("bug.prf");
    assert!(learn("2", "red bug", &bug, &bug_prf).status.success());

    let output = kmerprof_cmd()
        .args(["classify", "-k", "2", "--format", "json"])
        .arg(&bug)
        .arg(&bug_prf)
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("invalid JSON report");
    assert_eq!(report["decision"]["id"], "red bug");
    assert!(report["distances"].as_array().is_some_and(|a| a.len() == 1));
}

#[test]
fn cli_join_merges_profiles_with_the_same_id() {
    let dir = TempDir::new().unwrap();
    let a = write_genome(&dir, "a.dna", "AGCTAGCTT");
    let b = write_genome(&dir, "b.dna", "AGCTAG");

    let a_prf = dir.path().join("a.prf");
    let b_prf = dir.path().join("b.prf");
    assert!(learn("2", "red bug", &a, &a_prf).status.success());
    assert!(learn("2", "red bug", &b, &b_prf).status.success());

    let joined = dir.path().join("joined.prf");
    let output = kmerprof_cmd()
        .args(["join", "-o"])
        .arg(&joined)
        .arg(&a_prf)
        .arg(&b_prf)
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let content = fs::read_to_string(&joined).unwrap();
    // a: AG 2, CT 2, GC 2, TA 1, TT 1; b: AG 2, CT 1, GC 1.
    assert!(content.contains("AG 4"));
    assert!(content.contains("CT 3"));
    assert!(content.contains("GC 3"));
}

#[test]
fn cli_join_skips_profiles_with_a_different_id() {
    let dir = TempDir::new().unwrap();
    let a = write_genome(&dir, "a.dna", "AGCTAGCTT");
    let b = write_genome(&dir, "b.dna", "AGCTAG");

    let a_prf = dir.path().join("a.prf");
    let b_prf = dir.path().join("b.prf");
    assert!(learn("2", "red bug", &a, &a_prf).status.success());
    assert!(learn("2", "green bug", &b, &b_prf).status.success());

    let joined = dir.path().join("joined.prf");
    let output = kmerprof_cmd()
        .args(["join", "-o"])
        .arg(&joined)
        .arg(&a_prf)
        .arg(&b_prf)
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let content = fs::read_to_string(&joined).unwrap();
    assert!(content.contains("red bug"));
    // Frequencies from b.prf must not have been merged in.
    assert!(content.contains("AG 2"));
}

#[test]
fn cli_distance_reports_nearest_and_farthest() {
    let dir = TempDir::new().unwrap();
    let human = write_genome(&dir, "human.dna", "ACGTACGTACGTTTACGGACGT");
    let mouse = write_genome(&dir, "mouse.dna", "ACGTACGTACGTTTAC");
    let worm = write_genome(&dir, "worm.dna", "GGGCCCGGGCCCGGGTTTGGG");

    let human_prf = dir.path().join("human.prf");
    let mouse_prf = dir.path().join("mouse.prf");
    let worm_prf = dir.path().join("worm.prf");
    assert!(learn("3", "homo sapiens", &human, &human_prf).status.success());
    assert!(learn("3", "mus musculus", &mouse, &mouse_prf).status.success());
    assert!(learn("3", "worm", &worm, &worm_prf).status.success());

    let output = kmerprof_cmd()
        .arg("distance")
        .arg(&human_prf)
        .arg(&worm_prf)
        .arg(&mouse_prf)
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nearest profile file:"));
    assert!(stdout.contains("Identifier of the nearest profile: mus musculus"));

    let output = kmerprof_cmd()
        .args(["distance", "-t", "max"])
        .arg(&human_prf)
        .arg(&worm_prf)
        .arg(&mouse_prf)
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Farthest profile file:"));
    assert!(stdout.contains("Identifier of the farthest profile: worm"));
}

#[test]
fn cli_distance_rejects_a_corrupt_profile() {
    let dir = TempDir::new().unwrap();
    let good = write_genome(&dir, "a.dna", "AGCTAGCTT");
    let good_prf = dir.path().join("a.prf");
    assert!(learn("2", "red bug", &good, &good_prf).status.success());

    let bad_prf = dir.path().join("bad.prf");
    fs::write(&bad_prf, "NOT-A-PROFILE\nid\n0").unwrap();

    let output = kmerprof_cmd()
        .arg("distance")
        .arg(&good_prf)
        .arg(&bad_prf)
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("magic"));
}
