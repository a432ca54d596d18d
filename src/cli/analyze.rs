use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use tracing::{info, warn};

use crate::cli::OutputFormat;
use crate::core::config::{
    AnalysisConfig, Thresholds, DEFAULT_MIN_COVERAGE, DEFAULT_MIN_HET_FREQ, DEFAULT_MIN_HOM_FREQ,
    DEFAULT_MIN_QUALITY,
};
use crate::core::reference::ReferenceGenome;
use crate::core::sample::Sample;
use crate::genotyping::assembler::MatrixAssembler;
use crate::genotyping::exclusion::{CodonFilter, ExclusionSet};
use crate::genotyping::matrix::GenotypeMatrix;
use crate::output::report::{self, RunInfo};
use crate::output::{self, Annotations, OutputPaths};
use crate::parsing::{fasta, gff, snpeff, vcf};
use crate::utils::validation::ValidationError;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Single-sample VCF files (plain or gzipped); the enclosing directory names the sample
    #[arg(required = true)]
    pub vcfs: Vec<PathBuf>,

    /// Reference genome FASTA (first sequence is used)
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Directory for all output files (created when missing)
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Minimal genotyping quality
    #[arg(long, default_value_t = DEFAULT_MIN_QUALITY)]
    pub min_quality: f64,

    /// Minimal read depth for a base call
    #[arg(long, default_value_t = DEFAULT_MIN_COVERAGE)]
    pub min_coverage: u64,

    /// Minimal allele frequency for a homozygous call
    #[arg(long, default_value_t = DEFAULT_MIN_HOM_FREQ)]
    pub min_hom_freq: f64,

    /// Minimal allele frequency for a heterozygous call
    #[arg(long, default_value_t = DEFAULT_MIN_HET_FREQ)]
    pub min_het_freq: f64,

    /// Print allele frequencies next to calls in the SNP tables
    #[arg(long)]
    pub write_frequencies: bool,

    /// GFF of regions whose variant positions are not reported (repeatable)
    #[arg(long)]
    pub exclude: Vec<PathBuf>,

    /// GFF of coding sequences; only their third codon positions are reported (repeatable)
    #[arg(long)]
    pub exclude_codons: Vec<PathBuf>,

    /// SnpEff effect predictions (text format) for the annotated SNP tables
    #[arg(long)]
    pub snpeff: Option<PathBuf>,

    /// Reference gene annotation (GFF) for the annotated SNP tables
    #[arg(long)]
    pub annotation: Option<PathBuf>,
}

impl AnalyzeArgs {
    fn config(&self) -> Result<AnalysisConfig, ValidationError> {
        if self.vcfs.is_empty() {
            return Err(ValidationError::NoSamples);
        }

        let thresholds = Thresholds::new(
            self.min_quality,
            self.min_coverage,
            self.min_hom_freq,
            self.min_het_freq,
        );
        thresholds.validate()?;

        Ok(AnalysisConfig::new(thresholds).with_frequencies(self.write_frequencies))
    }
}

/// Keep an optional input only if it exists; a missing one is a warning, not an error
fn existing(path: &Path, what: &str) -> bool {
    if path.exists() {
        true
    } else {
        warn!("{} file {} does not exist; continuing without it", what, path.display());
        false
    }
}

/// Execute analyze subcommand
///
/// # Errors
///
/// Returns an error if the thresholds are invalid, an input cannot be read or
/// parsed, a sample's records are out of order, or an output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AnalyzeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let started = Utc::now();
    let config = args.config()?;

    let created_output_dir = !args.output_dir.exists();
    if created_output_dir {
        std::fs::create_dir_all(&args.output_dir).with_context(|| {
            format!("Failed to create output directory {}", args.output_dir.display())
        })?;
        info!("Created output directory {}", args.output_dir.display());
    }

    let reference = fasta::load_reference(&args.reference)
        .with_context(|| format!("Failed to load reference {}", args.reference.display()))?;
    let reference_name = reference.name.clone();
    info!("Reference {} ({} bp)", reference.name, reference.len());

    let exclusions = load_exclusions(&args.exclude)?;
    let codon_filter = load_codon_filter(&args.exclude_codons)?;

    let matrix = build_matrix(&args.vcfs, reference, config.clone(), exclusions, &codon_filter)?;

    let effects = match &args.snpeff {
        Some(path) if existing(path, "SnpEff") => Some(
            snpeff::parse_snpeff_file(path)
                .with_context(|| format!("Failed to parse SnpEff file {}", path.display()))?,
        ),
        _ => None,
    };
    let genes = match &args.annotation {
        Some(path) if existing(path, "Gene annotation") => gff::parse_gene_annotations(path)
            .with_context(|| format!("Failed to parse gene annotation {}", path.display()))?,
        _ => HashMap::new(),
    };
    let annotations = effects.as_ref().map(|effects| Annotations {
        effects,
        genes: &genes,
    });

    let paths = OutputPaths::new(&args.output_dir);
    let written = output::write_all(&matrix, &config, annotations, &paths)?;

    let info_path = paths.path(output::INFO);
    let run_info = RunInfo {
        reference: args.reference.clone(),
        reference_name,
        annotation: args.annotation.clone(),
        exclusions: args
            .exclude
            .iter()
            .chain(&args.exclude_codons)
            .cloned()
            .collect(),
        snpeff: args.snpeff.clone(),
        output_dir: args.output_dir.clone(),
        created_output_dir,
        outputs: written
            .iter()
            .map(|path| (output::describe(path).to_string(), path.clone()))
            .collect(),
        config: config.clone(),
        outgroups: matrix.outgroups().map(|s| s.name.clone()).collect(),
        vcfs: args.vcfs.clone(),
        started,
        finished: Utc::now(),
    };
    let mut info_file = std::io::BufWriter::new(
        std::fs::File::create(&info_path)
            .with_context(|| format!("Failed to create {}", info_path.display()))?,
    );
    report::write_info(&mut info_file, &run_info)
        .and_then(|()| std::io::Write::flush(&mut info_file))
        .with_context(|| format!("Failed to write {}", info_path.display()))?;

    let elapsed = Utc::now() - started;
    info!("All done! ({} minutes)", elapsed.num_minutes());

    match format {
        OutputFormat::Text => print_text_summary(&matrix, &written, verbose),
        OutputFormat::Json => print_json_summary(&matrix, &config, &args.output_dir)?,
        OutputFormat::Tsv => print_tsv_summary(&matrix),
    }

    Ok(())
}

fn load_exclusions(paths: &[PathBuf]) -> anyhow::Result<ExclusionSet> {
    let mut exclusions = ExclusionSet::new();

    for path in paths.iter().filter(|p| existing(p, "Exclusion")) {
        let regions = gff::parse_exclusion_regions(path)
            .with_context(|| format!("Failed to parse exclusion regions {}", path.display()))?;
        for region in &regions {
            exclusions.add_region(region);
        }
        info!("{} exclusion regions read from {}", regions.len(), path.display());
    }

    Ok(exclusions)
}

fn load_codon_filter(paths: &[PathBuf]) -> anyhow::Result<CodonFilter> {
    let mut coding_sequences = Vec::new();

    for path in paths.iter().filter(|p| existing(p, "Coding sequence")) {
        let cds = gff::parse_coding_sequences(path)
            .with_context(|| format!("Failed to parse coding sequences {}", path.display()))?;
        info!("{} coding sequences read from {}", cds.len(), path.display());
        coding_sequences.extend(cds);
    }

    Ok(CodonFilter::new(coding_sequences))
}

/// Stream every VCF through the assembler, reporting an estimate of the time left
fn build_matrix(
    vcfs: &[PathBuf],
    reference: ReferenceGenome,
    config: AnalysisConfig,
    exclusions: ExclusionSet,
    codon_filter: &CodonFilter,
) -> anyhow::Result<GenotypeMatrix> {
    let total = vcfs.len();
    let mut assembler = MatrixAssembler::new(reference, total, config, exclusions);
    let start = Instant::now();

    for (index, path) in vcfs.iter().enumerate() {
        let sample = Sample::from_path(path, index);
        let records = vcf::open_vcf(path)
            .with_context(|| format!("Failed to open VCF {}", path.display()))?;

        assembler
            .process_sample(sample, records)
            .with_context(|| format!("Failed to process {}", path.display()))?;

        let done = index + 1;
        #[allow(clippy::cast_precision_loss)] // sample counts
        let remaining = start.elapsed().as_secs_f64() / done as f64 * (total - done) as f64;
        info!("({:.0} minutes remaining)", remaining / 60.0);
    }

    Ok(assembler.finish(codon_filter)?)
}

fn print_text_summary(matrix: &GenotypeMatrix, written: &[PathBuf], verbose: bool) {
    println!(
        "Reference: {} ({} bp)",
        matrix.reference().name,
        matrix.reference().len()
    );
    println!("Samples: {}", matrix.samples().len());
    println!("Variant positions: {}", matrix.variant_positions().len());
    println!("Excluded variant positions: {}", matrix.excluded_variants());

    let outgroups: Vec<&str> = matrix.outgroups().map(|s| s.name.as_str()).collect();
    if !outgroups.is_empty() {
        println!("Outgroups: {}", outgroups.join(", "));
    }

    println!();
    println!(
        "{:<24} {:>10} {:>10} {:>10} {:>10}",
        "Sample", "SNPs", "Het SNPs", "Coverage", "Covered %"
    );
    for summary in matrix.summaries() {
        println!(
            "{:<24} {:>10} {:>10} {:>10.2} {:>10.2}",
            summary.sample,
            summary.var_call,
            summary.het_var_call,
            summary.coverage_fold,
            summary.coverage_percent
        );
    }

    if verbose {
        println!();
        println!("Files written:");
        for path in written {
            println!("  {}", path.display());
        }
    }
}

fn print_json_summary(
    matrix: &GenotypeMatrix,
    config: &AnalysisConfig,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "reference": {
            "name": matrix.reference().name,
            "length": matrix.reference().len(),
        },
        "config": config,
        "output_dir": output_dir.display().to_string(),
        "variant_positions": matrix.variant_positions().len(),
        "excluded_variant_positions": matrix.excluded_variants(),
        "outgroups": matrix.outgroups().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        "samples": matrix.summaries(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(matrix: &GenotypeMatrix) {
    println!(
        "sample\tsnp_calls\thet_snp_calls\tcoverage_fold\tcoverage_percent\t\
         all_positions\tmissing_positions\toutgroup"
    );
    for (sample, summary) in matrix.samples().iter().zip(matrix.summaries()) {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            summary.sample,
            summary.var_call,
            summary.het_var_call,
            summary.coverage_fold,
            summary.coverage_percent,
            summary.all_positions,
            summary.missing_positions(),
            sample.is_outgroup
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    fn parse(args: &[&str]) -> AnalyzeArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Analyze(args) => args,
        }
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["genotype-matrix", "analyze", "-r", "ref.fa", "-o", "out", "a/x.vcf"]);
        let config = args.config().unwrap();

        assert_eq!(config.thresholds, Thresholds::default());
        assert!(!config.write_frequencies);
        assert!(args.exclude.is_empty());
        assert_eq!(args.vcfs, vec![PathBuf::from("a/x.vcf")]);
    }

    #[test]
    fn test_repeatable_exclusions_and_thresholds() {
        let args = parse(&[
            "genotype-matrix",
            "analyze",
            "--reference",
            "ref.fa",
            "--output-dir",
            "out",
            "--min-coverage",
            "8",
            "--min-het-freq",
            "0.25",
            "--write-frequencies",
            "--exclude",
            "r1.gff",
            "--exclude",
            "r2.gff",
            "a.vcf",
            "b.vcf",
        ]);
        let config = args.config().unwrap();

        assert_eq!(config.thresholds.min_coverage, 8);
        assert!((config.thresholds.min_het_freq - 0.25).abs() < f64::EPSILON);
        assert!(config.write_frequencies);
        assert_eq!(args.exclude.len(), 2);
        assert_eq!(args.vcfs.len(), 2);
    }

    #[test]
    fn test_invalid_frequency_rejected() {
        let args = parse(&[
            "genotype-matrix",
            "analyze",
            "-r",
            "ref.fa",
            "-o",
            "out",
            "--min-hom-freq",
            "1.5",
            "a.vcf",
        ]);
        assert!(matches!(
            args.config(),
            Err(ValidationError::FrequencyOutOfRange { .. })
        ));
    }

    #[test]
    fn test_vcf_required() {
        let result = Cli::try_parse_from(["genotype-matrix", "analyze", "-r", "ref.fa", "-o", "out"]);
        assert!(result.is_err());
    }
}
