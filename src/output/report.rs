//! Run statistics and the run description.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::config::{AnalysisConfig, Thresholds};
use crate::core::stats::SampleSummary;
use crate::genotyping::matrix::GenotypeMatrix;
use crate::output::format_decimal;

pub const TOOL_NAME: &str = env!("CARGO_PKG_NAME");
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

const STATISTICS_COLUMNS: &str = "sample\tSNP Calls (all)\tSNP Calls (het)\tcoverage(fold)\t\
                                  coverage(percent)\trefCall\tallPos\tnoCall\tdiscardedRefCall\t\
                                  discardedVarCall\tfilteredVarCall\tunhandledGenotype";

/// Write the statistics table: a threshold preamble, then one row per sample
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_statistics<W: Write>(
    out: &mut W,
    matrix: &GenotypeMatrix,
    config: &AnalysisConfig,
) -> io::Result<()> {
    let thresholds = &config.thresholds;
    writeln!(out, "SNP statistics for {} samples.", matrix.samples().len())?;
    writeln!(out, "Quality Threshold: {}", format_decimal(thresholds.min_quality))?;
    writeln!(out, "Coverage Threshold: {}", thresholds.min_coverage)?;
    writeln!(
        out,
        "Minimum SNP allele frequency: {}",
        format_decimal(thresholds.min_hom_freq)
    )?;
    writeln!(out, "{STATISTICS_COLUMNS}")?;

    for s in matrix.summaries() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.sample,
            s.var_call,
            s.het_var_call,
            format_decimal(s.coverage_fold),
            format_decimal(s.coverage_percent),
            s.ref_call,
            s.all_positions,
            s.no_call,
            s.discarded_ref_call,
            s.discarded_var_call,
            s.filtered_var_call,
            s.unknown_genotype
        )?;
    }

    Ok(())
}

/// Run metadata stored alongside the per-sample metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsMetadata {
    #[serde(rename = "numVCFs")]
    pub num_samples: usize,

    #[serde(flatten)]
    pub thresholds: Thresholds,

    pub tool_name: &'static str,
    pub version: &'static str,
}

/// Contents of `metrics.json`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport<'a> {
    pub metadata: MetricsMetadata,

    /// Summaries keyed by sample name
    pub metrics: BTreeMap<&'a str, &'a SampleSummary>,
}

impl<'a> MetricsReport<'a> {
    pub fn new(matrix: &'a GenotypeMatrix, config: &AnalysisConfig) -> Self {
        Self {
            metadata: MetricsMetadata {
                num_samples: matrix.samples().len(),
                thresholds: config.thresholds,
                tool_name: TOOL_NAME,
                version: TOOL_VERSION,
            },
            metrics: matrix
                .summaries()
                .iter()
                .map(|summary| (summary.sample.as_str(), summary))
                .collect(),
        }
    }
}

/// Everything `info.txt` describes about a run
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub reference: PathBuf,
    pub reference_name: String,
    pub annotation: Option<PathBuf>,
    pub exclusions: Vec<PathBuf>,
    pub snpeff: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub created_output_dir: bool,
    /// Files written, as `(description, path)`
    pub outputs: Vec<(String, PathBuf)>,
    pub config: AnalysisConfig,
    pub outgroups: Vec<String>,
    pub vcfs: Vec<PathBuf>,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

fn optional(path: Option<&PathBuf>) -> String {
    path.map_or_else(|| "NA".to_string(), |p| p.display().to_string())
}

/// Write the human-readable run description
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_info<W: Write>(out: &mut W, info: &RunInfo) -> io::Result<()> {
    const TIME_FORMAT: &str = "%d %b %Y %H:%M:%S GMT";

    writeln!(out, "{TOOL_NAME} - {TOOL_VERSION}")?;
    writeln!(out)?;

    writeln!(out, "Input files:")?;
    writeln!(out, "Reference genome fasta file: {}", info.reference.display())?;
    writeln!(
        out,
        "Reference genome gene annotation (gff): {}",
        optional(info.annotation.as_ref())
    )?;
    let exclusions = if info.exclusions.is_empty() {
        "NA".to_string()
    } else {
        info.exclusions
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    writeln!(out, "List of positions to exclude (gff): {exclusions}")?;
    writeln!(
        out,
        "SNP effect analysis result file (from SnpEff): {}",
        optional(info.snpeff.as_ref())
    )?;

    writeln!(out)?;
    writeln!(out, "Output files:")?;
    writeln!(out, "Output directory: {}", info.output_dir.display())?;
    for (description, path) in &info.outputs {
        writeln!(out, "{description}: {}", path.display())?;
    }

    let thresholds = &info.config.thresholds;
    writeln!(out)?;
    writeln!(out, "Parameters:")?;
    writeln!(
        out,
        "Minimal genotyping quality (GATK): {}",
        format_decimal(thresholds.min_quality)
    )?;
    writeln!(out, "Minimal coverage for base call: {}", thresholds.min_coverage)?;
    writeln!(
        out,
        "Minimal allele frequency for homozygous call: {}",
        format_decimal(thresholds.min_hom_freq)
    )?;
    writeln!(
        out,
        "Minimal allele frequency for heterozygous call: {}",
        format_decimal(thresholds.min_het_freq)
    )?;
    writeln!(out, "Write allele frequencies: {}", info.config.write_frequencies)?;

    writeln!(out)?;
    writeln!(out, "Additional notes:")?;
    writeln!(out, "Reference genome name: {}", info.reference_name)?;
    writeln!(out, "Number of genomes (vcf files): {}", info.vcfs.len())?;
    writeln!(out, "Run started: {}", info.started.format(TIME_FORMAT))?;
    if info.created_output_dir {
        writeln!(out, "Output directory did not exist and was created.")?;
    }
    for outgroup in &info.outgroups {
        writeln!(out, "{outgroup} was labeled as an outgroup.")?;
    }
    writeln!(out, "Run finished: {}", info.finished.format(TIME_FORMAT))?;

    writeln!(out)?;
    writeln!(out, "List of VCF files:")?;
    for vcf in &info.vcfs {
        writeln!(out, "{}", vcf.display())?;
    }

    Ok(())
}
