//! Numeric genotype tables for STRUCTURE.
//!
//! The first row holds `-1` followed by the distance of each kept position to
//! the previous one (the linked-loci map); every further row is one sample with
//! its bases encoded as A=1, C=2, G=3, T=4 and `-9` for missing data.

use std::collections::BTreeSet;
use std::io::{self, Write};

use tracing::warn;

use crate::core::types::MISSING;
use crate::genotyping::matrix::GenotypeMatrix;

/// Code for anything that is not a plain base
pub const MISSING_CODE: i8 = -9;

/// Encode one confident symbol
pub fn genotype_code(symbol: u8) -> i8 {
    match symbol {
        b'A' => 1,
        b'C' => 2,
        b'G' => 3,
        b'T' => 4,
        _ => MISSING_CODE,
    }
}

/// Write the STRUCTURE table over the variant positions.
///
/// With `complete_only`, positions where any sample has missing data are left out.
/// Symbols other than bases and `N` are warned about once each.
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_structure_genotypes<W: Write>(
    out: &mut W,
    matrix: &GenotypeMatrix,
    complete_only: bool,
) -> io::Result<()> {
    let positions: Vec<u64> = matrix
        .variant_positions()
        .iter()
        .copied()
        .filter(|&position| !complete_only || !matrix.is_missing(position))
        .collect();

    out.write_all(b"-1")?;
    for pair in positions.windows(2) {
        write!(out, "\t{}", pair[1] - pair[0])?;
    }
    writeln!(out)?;

    let mut warned = BTreeSet::new();
    for sample in matrix.samples() {
        out.write_all(sample.name.as_bytes())?;
        for symbol in matrix.confident().column_at(sample.index, &positions) {
            let code = genotype_code(symbol);
            if code == MISSING_CODE && symbol != MISSING && warned.insert(symbol) {
                warn!(
                    "No genotype encoding for '{}'; writing {} for missing data",
                    char::from(symbol),
                    MISSING_CODE
                );
            }
            write!(out, "\t{code}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}
