//! Exporters for a completed [`GenotypeMatrix`].
//!
//! Every file is written into one output directory under a fixed name:
//!
//! | File | Content |
//! |------|---------|
//! | `snpAlignment.fasta` | confident symbols at variant positions |
//! | `snpAlignmentIncludingRefGenome.fasta` | same, with the reference first |
//! | `fullAlignment.fasta` | reference and every full confident column |
//! | `snpTable.tsv` | confident calls at variant positions |
//! | `snpTableWithUncertaintyCalls.tsv` | uncertain calls at variant positions |
//! | `snpTableForSnpEff.tsv` | `chrom pos ref alt` input for SnpEff |
//! | `structureGenotypes.tsv` | numeric genotypes for STRUCTURE |
//! | `structureGenotypes_noMissingData-Columns.tsv` | same, complete columns only |
//! | `snpTableWithSnpEffInfos.tsv` | confident calls with predicted effects |
//! | `snpTableWithUncertaintyCallsWithSnpEffInfos.tsv` | uncertain calls with effects |
//! | `snpStatistics.tsv` | per-sample statistics |
//! | `metrics.json` | the same statistics plus run metadata |
//! | `info.txt` | run description |
//!
//! The two effect tables are only written when SnpEff predictions are supplied.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::core::config::AnalysisConfig;
use crate::core::types::MatrixKind;
use crate::genotyping::matrix::GenotypeMatrix;
use crate::parsing::gff::GeneAnnotation;
use crate::parsing::snpeff::SnpEffTable;

pub mod alignment;
pub mod report;
pub mod structure;
pub mod table;

pub const SNP_ALIGNMENT: &str = "snpAlignment.fasta";
pub const SNP_ALIGNMENT_WITH_REFERENCE: &str = "snpAlignmentIncludingRefGenome.fasta";
pub const FULL_ALIGNMENT: &str = "fullAlignment.fasta";
pub const SNP_TABLE: &str = "snpTable.tsv";
pub const SNP_TABLE_UNCERTAIN: &str = "snpTableWithUncertaintyCalls.tsv";
pub const SNP_TABLE_FOR_SNPEFF: &str = "snpTableForSnpEff.tsv";
pub const STRUCTURE_GENOTYPES: &str = "structureGenotypes.tsv";
pub const STRUCTURE_GENOTYPES_COMPLETE: &str = "structureGenotypes_noMissingData-Columns.tsv";
pub const SNP_TABLE_WITH_EFFECTS: &str = "snpTableWithSnpEffInfos.tsv";
pub const SNP_TABLE_UNCERTAIN_WITH_EFFECTS: &str = "snpTableWithUncertaintyCallsWithSnpEffInfos.tsv";
pub const STATISTICS: &str = "snpStatistics.tsv";
pub const METRICS: &str = "metrics.json";
pub const INFO: &str = "info.txt";

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize metrics: {0}")]
    Json(#[from] serde_json::Error),
}

/// Effect predictions and gene annotations used by the effect tables
#[derive(Debug, Clone, Copy)]
pub struct Annotations<'a> {
    pub effects: &'a SnpEffTable,
    pub genes: &'a HashMap<String, GeneAnnotation>,
}

/// Resolves export file names inside the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    dir: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

/// Human-readable description of an export file, as listed in `info.txt`
pub fn describe(path: &Path) -> &'static str {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(SNP_ALIGNMENT) => "SNP alignment (fasta)",
        Some(SNP_ALIGNMENT_WITH_REFERENCE) => {
            "SNP alignment including entry for reference genome (fasta)"
        }
        Some(FULL_ALIGNMENT) => "Full alignment including reference genome (fasta)",
        Some(SNP_TABLE) => "SNP table",
        Some(SNP_TABLE_UNCERTAIN) => "SNP table with uncertainty calls",
        Some(SNP_TABLE_FOR_SNPEFF) => "SNP table to be used as input for SnpEff",
        Some(STRUCTURE_GENOTYPES) => "SNP table to be used as input for STRUCTURE",
        Some(STRUCTURE_GENOTYPES_COMPLETE) => {
            "SNP table to be used as input for STRUCTURE (no columns with missing data)"
        }
        Some(SNP_TABLE_WITH_EFFECTS) => "SNP table with SnpEff infos",
        Some(SNP_TABLE_UNCERTAIN_WITH_EFFECTS) => {
            "SNP table with uncertainty calls with SnpEff infos"
        }
        Some(STATISTICS) => "SNP calling statistics",
        Some(METRICS) => "SNP calling metrics (json)",
        Some(INFO) => "Run information",
        _ => "Output file",
    }
}

/// Format a number the way the statistics files expect: integral values keep one
/// decimal (`100.0`), others print their shortest exact form (`66.67`).
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Allele frequency as a percentage with one decimal, for the SNP tables.
///
/// Undefined frequencies print as `0.0`.
pub fn frequency_percent(frequency: f64) -> f64 {
    if frequency.is_nan() {
        return 0.0;
    }
    // adding 0.0 turns -0.0 into 0.0
    (frequency * 1000.0).round() / 10.0 + 0.0
}

/// Open one export file for buffered writing, run `write` on it and flush
fn write_file<F>(paths: &OutputPaths, file_name: &str, write: F) -> Result<PathBuf, OutputError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let path = paths.path(file_name);
    let result = File::create(&path).and_then(|file| {
        let mut out = BufWriter::new(file);
        write(&mut out)?;
        out.flush()
    });

    match result {
        Ok(()) => Ok(path),
        Err(source) => Err(OutputError::Io { path, source }),
    }
}

/// Write every matrix-derived export, returning the written paths in order.
///
/// `info.txt` is not included; it describes the whole run and is written by the caller.
///
/// # Errors
///
/// Returns `OutputError::Io` naming the first file that could not be written.
pub fn write_all(
    matrix: &GenotypeMatrix,
    config: &AnalysisConfig,
    annotations: Option<Annotations<'_>>,
    paths: &OutputPaths,
) -> Result<Vec<PathBuf>, OutputError> {
    let mut written = Vec::new();
    let mut log = |path: PathBuf| {
        info!("Wrote {}", path.display());
        written.push(path);
    };

    log(write_file(paths, SNP_TABLE, |out| {
        table::write_snp_table(out, matrix, MatrixKind::Confident)
    })?);
    log(write_file(paths, SNP_TABLE_UNCERTAIN, |out| {
        table::write_snp_table(out, matrix, MatrixKind::Uncertain)
    })?);

    log(write_file(paths, SNP_ALIGNMENT, |out| {
        alignment::write_snp_alignment(out, matrix, false)
    })?);
    log(write_file(paths, SNP_ALIGNMENT_WITH_REFERENCE, |out| {
        alignment::write_snp_alignment(out, matrix, true)
    })?);
    log(write_file(paths, FULL_ALIGNMENT, |out| {
        alignment::write_full_alignment(out, matrix)
    })?);

    log(write_file(paths, STRUCTURE_GENOTYPES, |out| {
        structure::write_structure_genotypes(out, matrix, false)
    })?);
    log(write_file(paths, STRUCTURE_GENOTYPES_COMPLETE, |out| {
        structure::write_structure_genotypes(out, matrix, true)
    })?);

    log(write_file(paths, SNP_TABLE_FOR_SNPEFF, |out| {
        table::write_snpeff_input(out, matrix)
    })?);

    if let Some(annotations) = annotations {
        log(write_file(paths, SNP_TABLE_WITH_EFFECTS, |out| {
            table::write_effect_table(out, matrix, MatrixKind::Confident, annotations)
        })?);
        log(write_file(paths, SNP_TABLE_UNCERTAIN_WITH_EFFECTS, |out| {
            table::write_effect_table(out, matrix, MatrixKind::Uncertain, annotations)
        })?);
    }

    log(write_file(paths, STATISTICS, |out| {
        report::write_statistics(out, matrix, config)
    })?);

    let metrics = report::MetricsReport::new(matrix, config);
    let json = serde_json::to_string_pretty(&metrics)?;
    log(write_file(paths, METRICS, |out| writeln!(out, "{json}"))?);

    Ok(written)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::config::AnalysisConfig;
    use crate::core::record::VariantRecord;
    use crate::core::reference::ReferenceGenome;
    use crate::core::sample::Sample;
    use crate::core::types::Genotype;
    use crate::genotyping::assembler::MatrixAssembler;
    use crate::genotyping::exclusion::{CodonFilter, ExclusionSet};
    use crate::genotyping::matrix::GenotypeMatrix;

    fn call(position: u64, genotype: Genotype, depths: (u64, u64), alt: u8) -> VariantRecord {
        VariantRecord::new(position, genotype)
            .with_quality(60.0)
            .with_depths(depths.0, depths.1)
            .with_alt(alt)
    }

    /// Two samples over `ACGTACGTAC`:
    ///
    /// - `s1`: `T` at 2, het `A/G` at 5 (frequency 0.5), no-call at 8
    /// - `outgroup1`: `T` at 2, gap over 3..=8, low-depth `G` at 9, nothing at 10
    ///
    /// Variant positions are 2 and 5.
    pub(crate) fn small_matrix(write_frequencies: bool) -> GenotypeMatrix {
        let reference = ReferenceGenome::new("chr", "ACGTACGTAC");
        let config = AnalysisConfig::default().with_frequencies(write_frequencies);
        let mut assembler = MatrixAssembler::new(reference, 2, config, ExclusionSet::new());

        let s1 = vec![
            Ok(call(1, Genotype::HomRef, (10, 0), b'.')),
            Ok(call(2, Genotype::HomAlt, (0, 10), b'T')),
            Ok(call(3, Genotype::HomRef, (10, 0), b'.')),
            Ok(call(4, Genotype::HomRef, (10, 0), b'.')),
            Ok(call(5, Genotype::Het, (6, 5), b'G')),
            Ok(call(6, Genotype::HomRef, (10, 0), b'.')),
            Ok(call(7, Genotype::HomRef, (10, 0), b'.')),
            Ok(VariantRecord::new(8, Genotype::NoCall)),
            Ok(call(9, Genotype::HomRef, (10, 0), b'.')),
            Ok(call(10, Genotype::HomRef, (10, 0), b'.')),
        ];
        let outgroup = vec![
            Ok(call(1, Genotype::HomRef, (10, 0), b'.')),
            Ok(call(2, Genotype::HomAlt, (0, 10), b'T')),
            Ok(call(9, Genotype::HomAlt, (0, 2), b'G')),
        ];

        assembler.process_sample(Sample::new("s1", 0), s1).unwrap();
        assembler
            .process_sample(Sample::new("outgroup1", 1), outgroup)
            .unwrap();
        assembler.finish(&CodonFilter::default()).unwrap()
    }
}
