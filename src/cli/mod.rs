//! Command-line interface for genotype-matrix.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **analyze**: Build the genotype matrices from single-sample VCFs and write all exports
//!
//! ## Usage
//!
//! ```text
//! # Default thresholds
//! genotype-matrix analyze --reference ref.fa --output-dir out */calls.vcf.gz
//!
//! # Stricter calls, frequencies in the SNP tables, repeat regions excluded
//! genotype-matrix analyze --reference ref.fa --output-dir out \
//!     --min-quality 50 --min-coverage 10 --write-frequencies \
//!     --exclude repeats.gff */calls.vcf
//!
//! # Effect tables from a SnpEff run and a gene annotation
//! genotype-matrix analyze --reference ref.fa --output-dir out \
//!     --snpeff snpeff.txt --annotation genes.gff */calls.vcf
//!
//! # JSON run summary for scripting
//! genotype-matrix --format json analyze --reference ref.fa --output-dir out */calls.vcf
//! ```
//!
//! Sample names come from the directory holding each VCF; names starting with
//! `outgroup` mark outgroup samples.

use clap::{Parser, Subcommand};

pub mod analyze;

#[derive(Parser)]
#[command(name = "genotype-matrix")]
#[command(version)]
#[command(about = "Build multi-sample genotype matrices from single-sample VCFs")]
#[command(
    long_about = "genotype-matrix reconciles per-sample variant calls against one reference sequence.\n\nEvery reference position of every sample is classified under quality, coverage and allele-frequency thresholds, and the result is exported as:\n- SNP and full alignments (FASTA)\n- SNP tables with confident and uncertain calls\n- STRUCTURE genotype tables\n- Per-sample calling statistics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format of the run summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the genotype matrices and write all exports
    Analyze(analyze::AnalyzeArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
