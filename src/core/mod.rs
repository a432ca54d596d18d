//! Core data types for genotype matrix assembly.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`ReferenceGenome`](reference::ReferenceGenome): the single reference sequence
//! - [`Sample`](sample::Sample): one input sample and its outgroup flag
//! - [`VariantRecord`](record::VariantRecord): the fields of one VCF data line
//! - [`Genotype`](types::Genotype), [`CallCategory`](types::CallCategory): call classification
//! - [`Thresholds`](config::Thresholds), [`AnalysisConfig`](config::AnalysisConfig): run settings
//! - [`SampleStats`](stats::SampleStats), [`SampleSummary`](stats::SampleSummary): per-sample counters
//!
//! ## Matrix symbols
//!
//! | Symbol | Meaning |
//! |--------|---------|
//! | `A C G T` | confident base |
//! | `R Y K M S W` | heterozygous call (IUPAC) |
//! | `a c g t` | homozygous variant below thresholds (uncertain matrix only) |
//! | `R` | reference call below thresholds (uncertain matrix only) |
//! | `N` | missing data |
//!
//! The low-confidence reference marker shares its letter with the IUPAC code for
//! A/G; the two can only be told apart through the confident matrix.

pub mod config;
pub mod record;
pub mod reference;
pub mod sample;
pub mod stats;
pub mod types;
