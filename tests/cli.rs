//! Command-line tests for the `analyze` subcommand

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "##fileformat=VCFv4.1\n\
                      #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample\n";

/// Write `<dir>/<sample>/calls.vcf` and return its path
fn write_vcf(dir: &Path, sample: &str, lines: &[&str]) -> PathBuf {
    let sample_dir = dir.join(sample);
    fs::create_dir_all(&sample_dir).unwrap();
    let path = sample_dir.join("calls.vcf");
    let mut content = HEADER.to_string();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(&path, content).unwrap();
    path
}

struct Fixture {
    dir: TempDir,
    reference: PathBuf,
    vcfs: Vec<PathBuf>,
}

impl Fixture {
    /// Reference `ACGTACGTAC`, a sample with `T` at 2 and a het at 5, and an
    /// outgroup with its own variant at 7
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let reference = dir.path().join("ref.fa");
        fs::write(&reference, ">chr test reference\nACGTACGTAC\n").unwrap();

        let s1 = write_vcf(
            dir.path(),
            "s1",
            &[
                "chr\t1\t.\tA\t.\t40\t.\t.\tGT:AD\t0/0:10",
                "chr\t2\t.\tC\tT\t60\t.\t.\tGT:AD\t1/1:0,12",
                "chr\t3\t.\tG\t.\t40\t.\t.\tGT:AD\t0/0:10",
                "chr\t4\t.\tT\t.\t40\t.\t.\tGT:AD\t0/0:10",
                "chr\t5\t.\tA\tG\t60\t.\t.\tGT:AD\t0/1:6,5",
            ],
        );
        let outgroup = write_vcf(
            dir.path(),
            "outgroup_a",
            &[
                "chr\t1\t.\tA\t.\t40\t.\t.\tGT:AD\t0/0:10",
                "chr\t2\t.\tC\t.\t40\t.\t.\tGT:AD\t0/0:10",
                "chr\t5\t.\tA\t.\t40\t.\t.\tGT:AD\t0/0:10",
                "chr\t7\t.\tG\tC\t60\t.\t.\tGT:AD\t1/1:0,20",
            ],
        );

        Self {
            dir,
            reference,
            vcfs: vec![s1, outgroup],
        }
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("results")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("genotype-matrix").unwrap();
        cmd.arg("analyze")
            .arg("--reference")
            .arg(&self.reference)
            .arg("--output-dir")
            .arg(self.out());
        cmd
    }
}

#[test]
fn test_help() {
    Command::cargo_bin("genotype-matrix")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"));
}

#[test]
fn test_analyze_writes_exports() {
    let fixture = Fixture::new();

    fixture
        .command()
        .args(&fixture.vcfs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Variant positions: 2"))
        .stderr(predicate::str::contains("Now processing 1/2: s1"));

    let out = fixture.out();
    for name in [
        "snpAlignment.fasta",
        "snpAlignmentIncludingRefGenome.fasta",
        "fullAlignment.fasta",
        "snpTable.tsv",
        "snpTableWithUncertaintyCalls.tsv",
        "snpTableForSnpEff.tsv",
        "structureGenotypes.tsv",
        "structureGenotypes_noMissingData-Columns.tsv",
        "snpStatistics.tsv",
        "metrics.json",
        "info.txt",
    ] {
        assert!(out.join(name).exists(), "{name} was not written");
    }
    assert!(!out.join("snpTableWithSnpEffInfos.tsv").exists());

    let table = fs::read_to_string(out.join("snpTable.tsv")).unwrap();
    assert_eq!(
        table,
        "Position\tRef\ts1\toutgroup_a\n2\tC\tT\t.\n5\tA\tR\t.\n"
    );

    let alignment = fs::read_to_string(out.join("snpAlignmentIncludingRefGenome.fasta")).unwrap();
    assert_eq!(alignment, ">Reference_chr\nCA\n>s1\nTR\n>outgroup_a\nCA\n");

    let info = fs::read_to_string(out.join("info.txt")).unwrap();
    assert!(info.contains("outgroup_a was labeled as an outgroup."));
    assert!(info.contains("Output directory did not exist and was created."));
}

#[test]
fn test_json_summary() {
    let fixture = Fixture::new();

    let output = fixture
        .command()
        .args(&fixture.vcfs)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["variant_positions"], 2);
    assert_eq!(summary["outgroups"][0], "outgroup_a");
    assert_eq!(summary["samples"][0]["sample"], "s1");
    assert_eq!(summary["samples"][0]["SNP Calls (het)"], 1);
}

#[test]
fn test_frequencies_in_snp_table() {
    let fixture = Fixture::new();

    fixture
        .command()
        .arg("--write-frequencies")
        .args(&fixture.vcfs)
        .assert()
        .success();

    let table = fs::read_to_string(fixture.out().join("snpTable.tsv")).unwrap();
    // het at 5: 5 / (5 + 6 - 1)
    assert!(table.contains("5\tA\tR (50.0)\t."));
    assert!(table.contains("2\tC\tT (100.0)\t."));
}

#[test]
fn test_exclusions_and_missing_optional_files() {
    let fixture = Fixture::new();
    let exclude = fixture.dir.path().join("repeats.gff");
    fs::write(&exclude, "chr\tsrc\trepeat_region\t4\t6\t.\t+\t.\tID=r1\n").unwrap();

    fixture
        .command()
        .arg("--exclude")
        .arg(&exclude)
        .arg("--snpeff")
        .arg(fixture.dir.path().join("missing.txt"))
        .args(&fixture.vcfs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Variant positions: 1"))
        .stderr(predicate::str::contains("does not exist"));

    let table = fs::read_to_string(fixture.out().join("snpTable.tsv")).unwrap();
    assert!(!table.contains("\n5\t"));
}

#[test]
fn test_unsorted_vcf_fails_without_outputs() {
    let fixture = Fixture::new();
    let unsorted = write_vcf(
        fixture.dir.path(),
        "s3",
        &[
            "chr\t5\t.\tA\t.\t40\t.\t.\tGT:AD\t0/0:10",
            "chr\t3\t.\tG\t.\t40\t.\t.\tGT:AD\t0/0:10",
        ],
    );

    fixture
        .command()
        .arg(&unsorted)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not sorted"));

    assert!(!fixture.out().join("snpTable.tsv").exists());
}

#[test]
fn test_invalid_threshold_rejected() {
    let fixture = Fixture::new();

    fixture
        .command()
        .arg("--min-het-freq")
        .arg("2")
        .args(&fixture.vcfs)
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside [0, 1]"));
}
