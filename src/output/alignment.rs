//! Multi-FASTA alignments built from the confident matrix.

use std::io::{self, Write};

use noodles::fasta;
use noodles::fasta::record::{Definition, Sequence};

use crate::genotyping::matrix::GenotypeMatrix;

/// Prefix of the reference entry in alignments that include it
pub const REFERENCE_PREFIX: &str = "Reference_";

fn record(name: &str, sequence: Vec<u8>) -> fasta::Record {
    fasta::Record::new(Definition::new(name, None), Sequence::from(sequence))
}

fn reference_record(matrix: &GenotypeMatrix, sequence: Vec<u8>) -> fasta::Record {
    let name = format!("{REFERENCE_PREFIX}{}", matrix.reference().name);
    record(&name, sequence)
}

/// Write one entry per sample holding its confident symbols at the variant positions,
/// optionally preceded by the reference bases at the same positions.
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_snp_alignment<W: Write>(
    out: &mut W,
    matrix: &GenotypeMatrix,
    include_reference: bool,
) -> io::Result<()> {
    let positions = matrix.variant_positions();
    let mut writer = fasta::io::Writer::new(out);

    if include_reference {
        let reference = matrix.reference();
        let bases = positions
            .iter()
            .filter_map(|&position| reference.base(position))
            .collect();
        writer.write_record(&reference_record(matrix, bases))?;
    }

    for sample in matrix.samples() {
        let symbols = matrix
            .confident()
            .column_at(sample.index, positions)
            .collect();
        writer.write_record(&record(&sample.name, symbols))?;
    }

    Ok(())
}

/// Write the full reference followed by every sample's complete confident column
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_full_alignment<W: Write>(out: &mut W, matrix: &GenotypeMatrix) -> io::Result<()> {
    let mut writer = fasta::io::Writer::new(out);

    writer.write_record(&reference_record(
        matrix,
        matrix.reference().sequence().to_vec(),
    ))?;

    for sample in matrix.samples() {
        let column = matrix.confident().column(sample.index).to_vec();
        writer.write_record(&record(&sample.name, column))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::small_matrix;

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_snp_alignment() {
        let matrix = small_matrix(false);

        let text = render(|out| write_snp_alignment(out, &matrix, false));
        assert_eq!(text, ">s1\nTR\n>outgroup1\nTN\n");
    }

    #[test]
    fn test_snp_alignment_with_reference() {
        let matrix = small_matrix(false);

        let text = render(|out| write_snp_alignment(out, &matrix, true));
        assert_eq!(text, ">Reference_chr\nCA\n>s1\nTR\n>outgroup1\nTN\n");
    }

    #[test]
    fn test_full_alignment() {
        let matrix = small_matrix(false);

        let text = render(|out| write_full_alignment(out, &matrix));
        assert_eq!(
            text,
            ">Reference_chr\nACGTACGTAC\n>s1\nATGTRCGNAC\n>outgroup1\nATNNNNNNNC\n"
        );
    }
}
