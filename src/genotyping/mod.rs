//! Genotype classification and matrix assembly.
//!
//! This module turns per-sample variant streams into the multi-sample matrices:
//!
//! - [`ambiguity`]: IUPAC codes for heterozygous calls
//! - [`classifier`]: threshold-based classification of one record
//! - [`synchronizer`]: strict ordering and gap detection per sample
//! - [`exclusion`]: region and codon-position vetoes over variant reporting
//! - [`matrix`]: packed call and frequency matrices and the final result
//! - [`assembler`]: the per-sample orchestration and statistics
//!
//! ## Example
//!
//! ```rust
//! use genotype_matrix::core::record::VariantRecord;
//! use genotype_matrix::core::types::Genotype;
//! use genotype_matrix::genotyping::assembler::MatrixAssembler;
//! use genotype_matrix::genotyping::exclusion::{CodonFilter, ExclusionSet};
//! use genotype_matrix::{AnalysisConfig, ReferenceGenome, Sample};
//!
//! let reference = ReferenceGenome::new("ref", "ACGTA");
//! let mut assembler = MatrixAssembler::new(
//!     reference,
//!     1,
//!     AnalysisConfig::default(),
//!     ExclusionSet::new(),
//! );
//!
//! let call = VariantRecord::new(2, Genotype::HomAlt)
//!     .with_quality(50.0)
//!     .with_depths(0, 12)
//!     .with_alt(b'T');
//! assembler
//!     .process_sample(Sample::new("s1", 0), vec![Ok(call)])
//!     .unwrap();
//!
//! let matrix = assembler.finish(&CodonFilter::default()).unwrap();
//! assert_eq!(matrix.variant_positions(), &[2]);
//! ```

use thiserror::Error;

use crate::parsing::ParseError;

pub mod ambiguity;
pub mod assembler;
pub mod classifier;
pub mod exclusion;
pub mod matrix;
pub mod synchronizer;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error(
        "Base calls for sample '{sample}' are not sorted: position {current} follows {previous} \
         (multiple chromosomes are not supported)"
    )]
    OrderingViolation {
        sample: String,
        previous: u64,
        current: u64,
    },

    #[error("Position {position} in sample '{sample}' is outside the reference (1..={length})")]
    PositionOutOfRange {
        sample: String,
        position: u64,
        length: u64,
    },

    #[error("Sample '{sample}' has index {index}, expected {expected}")]
    UnexpectedSample {
        sample: String,
        index: usize,
        expected: usize,
    },

    #[error("Only {processed} of {expected} samples were processed")]
    MissingSamples { expected: usize, processed: usize },

    #[error("Assembly aborted after a failed sample; no matrix is available")]
    Aborted,

    #[error(transparent)]
    Parse(#[from] ParseError),
}
