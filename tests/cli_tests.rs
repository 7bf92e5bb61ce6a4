//! Command-line tests for the te-counter binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn pslx_file(lines: &[(&str, &str, u32)]) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".pslx").unwrap();
    for (q, t, score) in lines {
        writeln!(
            file,
            "{score}\t0\t0\t0\t0\t0\t0\t0\t+\t{q}\t43\t0\t43\t{t}\t500\t0\t43\t1\t43,\t0,\t0,\tacgt,\tacgt,"
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

fn fasta_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".fa").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn te_counter() -> Command {
    Command::cargo_bin("te-counter").unwrap()
}

#[test]
fn test_help() {
    te_counter()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("count"))
        .stdout(predicate::str::contains("tally"))
        .stdout(predicate::str::contains("uniqueness"));
}

#[test]
fn test_tally_csv() {
    let a = pslx_file(&[("r1", "T1", 43)]);
    let b = pslx_file(&[("r2", "T1", 43), ("r3", "T1", 40), ("r3", "T2", 40)]);

    te_counter()
        .arg("tally")
        .arg(a.path())
        .arg(b.path())
        .args(["--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "TE,non-unique_reads,unique_reads,randomly_mapped_reads,split_reads,fraction_unique,exp_distinct_reads,exp_unique_reads,RPU\n",
        ))
        .stdout(predicate::str::contains("\nT1,1,2,"))
        .stdout(predicate::str::contains("\nT2,1,0,"));
}

#[test]
fn test_tally_with_reference_fills_expectations() {
    let hits = pslx_file(&[("r1", "T1", 43), ("r2", "T1", 43)]);
    let reference = fasta_file(">T1\nAAAACCCC\n>T3\nAAAAGG\n");

    let output = te_counter()
        .arg("tally")
        .arg(hits.path())
        .arg("--reference")
        .arg(reference.path())
        .args(["--read-length", "4", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["TE"], "T1");
    assert_eq!(rows[0]["unique_reads"], 2);
    assert_eq!(rows[0]["randomly_mapped_reads"], 2);
    assert_eq!(rows[0]["exp_distinct_reads"], 5);
    assert_eq!(rows[0]["exp_unique_reads"], 4);
    assert_eq!(rows[0]["RPU"], 0.5);
}

#[test]
fn test_tally_malformed_input() {
    let mut bad = NamedTempFile::new().unwrap();
    writeln!(bad, "this is not pslx").unwrap();
    bad.flush().unwrap();

    te_counter()
        .arg("tally")
        .arg(bad.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Worker 0 failed"));
}

#[test]
fn test_tally_writes_output_file() {
    let hits = pslx_file(&[("r1", "T1", 43)]);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("counts.tsv");

    te_counter()
        .arg("tally")
        .arg(hits.path())
        .arg("-o")
        .arg(&out)
        .args(["--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("TE\tnon-unique_reads\t"));
    assert!(text.contains("\nT1\t0\t1\t1\t1.0\t1.0\t0\t0\t0.0\n"));
}

#[test]
fn test_uniqueness() {
    let reference = fasta_file(">T1\nAAAACCCC\n>T3\nAAAAGG\n");

    te_counter()
        .arg("uniqueness")
        .arg(reference.path())
        .args(["--read-length", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id,windows,unique_windows,fraction_unique"))
        .stdout(predicate::str::contains("\nT1,5,4,0.8\n"))
        .stdout(predicate::str::contains("\nT3,3,2,0.6666666666666666\n"));
}

#[test]
fn test_uniqueness_quotes_delimiter_in_id() {
    let reference = fasta_file(">R,1\nAAAACCCC\n");

    te_counter()
        .arg("uniqueness")
        .arg(reference.path())
        .args(["--read-length", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n\"R,1\",5,5,1.0\n"));
}

#[test]
fn test_tally_quotes_delimiter_in_target() {
    let hits = pslx_file(&[("r1", "TE,7", 43)]);

    let output = te_counter().arg("tally").arg(hits.path()).output().unwrap();
    assert!(output.status.success());

    let mut reader = csv::Reader::from_reader(output.stdout.as_slice());
    let header = reader.headers().unwrap().clone();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), header.len());
    assert_eq!(&rows[0][0], "TE,7");
    assert_eq!(&rows[0][2], "1");
}

#[test]
fn test_uniqueness_rejects_zero_read_length() {
    let reference = fasta_file(">T1\nAAAACCCC\n");

    te_counter()
        .arg("uniqueness")
        .arg(reference.path())
        .args(["--read-length", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Read length must be positive"));
}

#[test]
fn test_count_missing_reads() {
    let reference = fasta_file(">T1\nAAAACCCC\n");
    let dir = tempfile::tempdir().unwrap();

    te_counter()
        .arg("count")
        .arg(reference.path())
        .arg(dir.path().join("missing.fa"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("The read file does not exist"));
}

#[test]
fn test_count_rejects_bad_identity() {
    let reference = fasta_file(">T1\nAAAACCCC\n");
    let reads = fasta_file(">r1\nAAAACCCC\n");

    te_counter()
        .arg("count")
        .arg(reference.path())
        .arg(reads.path())
        .args(["--min-identity", "95"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Minimum identity"));
}

#[cfg(unix)]
#[test]
fn test_count_missing_aligner_cleans_up() {
    let reference = fasta_file(">T1\nAAAACCCC\n");
    let reads = fasta_file(">r1\nAAAACCCC\n");
    let pipes = tempfile::tempdir().unwrap();

    te_counter()
        .arg("count")
        .arg(reference.path())
        .arg(reads.path())
        .arg("--pipe-dir")
        .arg(pipes.path())
        .args(["-t", "2", "--pblat", "/nonexistent/pblat"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Aligner failed"));

    assert!(std::fs::read_dir(pipes.path()).unwrap().next().is_none());
}
