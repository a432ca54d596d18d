//! Parsers for the run's input files.
//!
//! This module provides parsers for:
//!
//! - **FASTA**: the single reference sequence
//! - **VCF**: per-sample variant streams, read line by line
//! - **GFF**: exclusion regions, coding sequences and gene annotations
//! - **SnpEff**: per-position effect predictions (text output format)
//!
//! Plain and gzip/bgzip compressed files are accepted everywhere.
//!
//! ## VCF fields used
//!
//! | Column | Use | Required |
//! |--------|-----|----------|
//! | POS    | 1-based position | Always |
//! | ALT    | first base is the called alternate | Variant genotypes |
//! | QUAL   | genotyping quality | Called genotypes |
//! | FORMAT | locates `GT` and `AD` | Always |
//! | sample | `GT` token and `AD` depths | Always |

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

pub mod fasta;
pub mod gff;
pub mod snpeff;
pub mod vcf;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Line {line}: missing {field}")]
    MissingField { line: usize, field: &'static str },

    #[error("noodles error: {0}")]
    Noodles(String),
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a text input, transparently decompressing gzip/bgzip
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse a required unsigned integer field
pub(crate) fn parse_u64(value: &str, line: usize, field: &'static str) -> Result<u64, ParseError> {
    value.trim().parse().map_err(|_| ParseError::InvalidField {
        line,
        field,
        value: value.to_string(),
    })
}
