//! Reference loading using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files. Only the first
//! record is used; multiple contigs per run are not supported.

use std::io::BufRead;
use std::path::Path;

use noodles::fasta;
use tracing::warn;

use crate::core::reference::ReferenceGenome;
use crate::parsing::{open_text, ParseError};

/// Load the reference sequence from a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, or `ParseError::InvalidFormat` if the file holds no sequence.
pub fn load_reference(path: &Path) -> Result<ReferenceGenome, ParseError> {
    let mut reader = fasta::io::Reader::new(open_text(path)?);
    read_reference(&mut reader)
}

/// Read the first record from a noodles FASTA reader
fn read_reference<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<ReferenceGenome, ParseError> {
    let mut records = reader.records();

    let record = records
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("No sequences found in FASTA file".to_string()))?
        .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

    let name = String::from_utf8_lossy(record.name()).to_string();
    let sequence: Vec<u8> = record.sequence().as_ref().to_vec();

    if sequence.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "Reference sequence '{name}' is empty"
        )));
    }

    if records.next().is_some() {
        warn!(
            "Reference has more than one sequence; only '{}' is used",
            name
        );
    }

    Ok(ReferenceGenome::new(name, sequence))
}
