//! # genotype-matrix
//!
//! A library for reconciling per-sample variant calls against one reference
//! sequence into a position-synchronized multi-sample genotype matrix.
//!
//! Every reference position of every sample is classified under quality,
//! coverage and allele-frequency thresholds. Two matrices are produced: a
//! confident one, where anything below the thresholds is missing data, and an
//! uncertainty-preserving one that keeps hints about what was discarded.
//!
//! ## Features
//!
//! - **Streaming assembly**: samples are read one record at a time
//! - **Gap filling**: positions a sample's VCF skips become missing data
//! - **Heterozygous calls**: resolved into IUPAC ambiguity codes
//! - **Outgroups**: counted in statistics, never contributing variant positions
//! - **Exclusions**: region lists and non-third codon positions removed from reporting
//! - **Exports**: FASTA alignments, SNP tables, STRUCTURE input, statistics
//!
//! ## Example
//!
//! ```rust
//! use genotype_matrix::core::record::VariantRecord;
//! use genotype_matrix::core::types::Genotype;
//! use genotype_matrix::{assemble, AnalysisConfig, CodonFilter, ExclusionSet, ReferenceGenome, Sample};
//!
//! let reference = ReferenceGenome::new("chr", "ACGTACGTAC");
//! let calls = vec![
//!     Ok(VariantRecord::new(1, Genotype::HomRef).with_quality(40.0).with_depths(12, 0)),
//!     Ok(VariantRecord::new(2, Genotype::HomAlt)
//!         .with_quality(40.0)
//!         .with_depths(0, 12)
//!         .with_alt(b'T')),
//! ];
//!
//! let matrix = assemble(
//!     reference,
//!     AnalysisConfig::default(),
//!     ExclusionSet::new(),
//!     &CodonFilter::default(),
//!     vec![(Sample::new("s1", 0), calls)],
//! )
//! .unwrap();
//!
//! assert_eq!(matrix.variant_positions(), &[2]);
//! assert_eq!(matrix.confident().get(2, 0), b'T');
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Core data types for references, samples, records and statistics
//! - [`genotyping`]: Classification and matrix assembly
//! - [`parsing`]: Parsers for FASTA, VCF, GFF and SnpEff files
//! - [`output`]: Alignment, table and report exporters
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod genotyping;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::config::{AnalysisConfig, Thresholds};
pub use core::reference::ReferenceGenome;
pub use core::sample::Sample;
pub use core::stats::SampleSummary;
pub use core::types::*;
pub use genotyping::assembler::{assemble, MatrixAssembler};
pub use genotyping::exclusion::{CodonFilter, ExclusionSet};
pub use genotyping::matrix::GenotypeMatrix;
pub use genotyping::AssemblyError;
