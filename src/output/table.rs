//! Tab-separated SNP tables.

use std::collections::BTreeSet;
use std::io::{self, Write};

use crate::core::types::{MatrixKind, MISSING};
use crate::genotyping::matrix::GenotypeMatrix;
use crate::output::{format_decimal, frequency_percent, Annotations};

/// Columns appended by the effect tables
const EFFECT_COLUMNS: &str = "SNP Effect\tGene ID\tGene name\tGene function\told_AA/new_AA\t\
                              Old_codon/New_codon\tCodon_Num(CDS)\tCDS_size";

fn write_sample_header<W: Write>(out: &mut W, matrix: &GenotypeMatrix) -> io::Result<()> {
    for sample in matrix.samples() {
        write!(out, "\t{}", sample.name)?;
    }
    Ok(())
}

/// Write the per-sample cells of one row.
///
/// A symbol equal to the reference prints as `.`; with frequencies enabled any
/// other non-`N` symbol is followed by its allele frequency in percent.
fn write_cells<W: Write>(
    out: &mut W,
    matrix: &GenotypeMatrix,
    kind: MatrixKind,
    position: u64,
    reference_base: u8,
) -> io::Result<()> {
    for (sample, symbol) in matrix.calls(kind).row(position).enumerate() {
        if symbol == reference_base {
            out.write_all(b"\t.")?;
            continue;
        }

        write!(out, "\t{}", char::from(symbol))?;
        if let Some(frequencies) = matrix.frequencies() {
            if symbol != MISSING {
                let percent = frequency_percent(frequencies.get(position, sample));
                write!(out, " ({})", format_decimal(percent))?;
            }
        }
    }
    Ok(())
}

/// Write `Position  Ref  <samples...>` rows for every variant position
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_snp_table<W: Write>(
    out: &mut W,
    matrix: &GenotypeMatrix,
    kind: MatrixKind,
) -> io::Result<()> {
    out.write_all(b"Position\tRef")?;
    write_sample_header(out, matrix)?;
    writeln!(out)?;

    for &position in matrix.variant_positions() {
        let reference_base = matrix.reference().base(position).unwrap_or(MISSING);
        write!(out, "{position}\t{}", char::from(reference_base))?;
        write_cells(out, matrix, kind, position, reference_base)?;
        writeln!(out)?;
    }

    Ok(())
}

/// Distinct confident A/C/G/T symbols at a position that differ from the reference
fn alternate_bases(matrix: &GenotypeMatrix, position: u64, reference_base: u8) -> BTreeSet<u8> {
    matrix
        .confident()
        .row(position)
        .filter(|&symbol| matches!(symbol, b'A' | b'C' | b'G' | b'T') && symbol != reference_base)
        .collect()
}

/// Write `chrom  pos  ref  alt` lines for SnpEff, one per distinct alternate base
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_snpeff_input<W: Write>(out: &mut W, matrix: &GenotypeMatrix) -> io::Result<()> {
    let reference = matrix.reference();

    for &position in matrix.variant_positions() {
        let reference_base = reference.base(position).unwrap_or(MISSING);
        for alt in alternate_bases(matrix, position, reference_base) {
            writeln!(
                out,
                "{}\t{position}\t{}\t{}",
                reference.name,
                char::from(reference_base),
                char::from(alt)
            )?;
        }
    }

    Ok(())
}

/// Write one row per predicted effect at each variant position, with the
/// matching gene's function and CDS length appended.
///
/// Positions without a prediction are skipped. Genes are looked up by id, then
/// by name.
///
/// # Errors
///
/// Returns any I/O error from the underlying writer.
pub fn write_effect_table<W: Write>(
    out: &mut W,
    matrix: &GenotypeMatrix,
    kind: MatrixKind,
    annotations: Annotations<'_>,
) -> io::Result<()> {
    out.write_all(b"Position\tRef\tSNP")?;
    write_sample_header(out, matrix)?;
    writeln!(out, "\t{EFFECT_COLUMNS}")?;

    for &position in matrix.variant_positions() {
        let Some(effects) = annotations.effects.get(&position) else {
            continue;
        };
        let reference_base = matrix.reference().base(position).unwrap_or(MISSING);

        for effect in effects {
            let gene = annotations
                .genes
                .get(&effect.gene_id)
                .or_else(|| annotations.genes.get(&effect.gene_name));
            let (function, length) = gene.map_or((String::new(), String::new()), |g| {
                (g.product.clone(), g.length.to_string())
            });

            write!(
                out,
                "{position}\t{}\t{}",
                char::from(reference_base),
                effect.change
            )?;
            write_cells(out, matrix, kind, position, reference_base)?;
            writeln!(
                out,
                "\t{}\t{}\t{}\t{function}\t{}\t{}\t{}\t{length}",
                effect.effect,
                effect.gene_id,
                effect.gene_name,
                effect.aa_change,
                effect.codon_change,
                effect.codon_num
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::output::test_support::small_matrix;
    use crate::parsing::gff::GeneAnnotation;
    use crate::parsing::snpeff::{SnpEffEntry, SnpEffTable};

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_snp_table() {
        let matrix = small_matrix(false);

        let text = render(|out| write_snp_table(out, &matrix, MatrixKind::Confident));
        assert_eq!(
            text,
            "Position\tRef\ts1\toutgroup1\n\
             2\tC\tT\tT\n\
             5\tA\tR\tN\n"
        );
    }

    #[test]
    fn test_snp_table_with_frequencies() {
        let matrix = small_matrix(true);

        let text = render(|out| write_snp_table(out, &matrix, MatrixKind::Uncertain));
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[1], "2\tC\tT (100.0)\tT (100.0)");
        // het 5 alt / (5 + 6 - 1) reads
        assert_eq!(rows[2], "5\tA\tR (50.0)\tN");
    }

    #[test]
    fn test_snpeff_input() {
        let matrix = small_matrix(false);

        let text = render(|out| write_snpeff_input(out, &matrix));
        // the het code at 5 and the N are not bases
        assert_eq!(text, "chr\t2\tC\tT\n");
    }

    #[test]
    fn test_effect_table() {
        let matrix = small_matrix(false);

        let mut effects = SnpEffTable::new();
        effects.insert(
            2,
            vec![SnpEffEntry {
                position: 2,
                change: "T".to_string(),
                effect: "NON_SYNONYMOUS_CODING".to_string(),
                gene_id: "g1".to_string(),
                gene_name: "abcD".to_string(),
                aa_change: "P/L".to_string(),
                codon_change: "cCc/cTc".to_string(),
                codon_num: "1".to_string(),
            }],
        );
        let mut genes = HashMap::new();
        genes.insert(
            "g1".to_string(),
            GeneAnnotation {
                id: "g1".to_string(),
                product: "transporter".to_string(),
                length: 9,
            },
        );
        let annotations = Annotations {
            effects: &effects,
            genes: &genes,
        };

        let text =
            render(|out| write_effect_table(out, &matrix, MatrixKind::Confident, annotations));
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("Position\tRef\tSNP\ts1\toutgroup1\tSNP Effect"));
        assert_eq!(
            rows[1],
            "2\tC\tT\tT\tT\tNON_SYNONYMOUS_CODING\tg1\tabcD\ttransporter\tP/L\tcCc/cTc\t1\t9"
        );
    }
}
