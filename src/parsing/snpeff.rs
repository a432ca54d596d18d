//! SnpEff effect predictions (text output format).
//!
//! The text format carries a `# Chromo  Position  Reference  Change ...` header;
//! columns are looked up by that header so reordered output still parses, with
//! SnpEff's default layout as the fallback when no header is present.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use crate::parsing::{open_text, parse_u64, ParseError};

/// Header name and default index of each column read
const POSITION: (&str, usize) = ("Position", 1);
const CHANGE: (&str, usize) = ("Change", 3);
const GENE_ID: (&str, usize) = ("Gene_ID", 9);
const GENE_NAME: (&str, usize) = ("Gene_name", 10);
const EFFECT: (&str, usize) = ("Effect", 15);
const AA_CHANGE: (&str, usize) = ("old_AA/new_AA", 16);
const CODON_CHANGE: (&str, usize) = ("Old_codon/New_codon", 17);
const CODON_NUM: (&str, usize) = ("Codon_Num(CDS)", 18);

/// One predicted effect of one alternate allele
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnpEffEntry {
    pub position: u64,
    /// Alternate allele the effect was predicted for
    pub change: String,
    pub effect: String,
    pub gene_id: String,
    pub gene_name: String,
    pub aa_change: String,
    pub codon_change: String,
    pub codon_num: String,
}

/// Effects grouped by position, in file order within a position
pub type SnpEffTable = BTreeMap<u64, Vec<SnpEffEntry>>;

#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    position: usize,
    change: usize,
    gene_id: usize,
    gene_name: usize,
    effect: usize,
    aa_change: usize,
    codon_change: usize,
    codon_num: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            position: POSITION.1,
            change: CHANGE.1,
            gene_id: GENE_ID.1,
            gene_name: GENE_NAME.1,
            effect: EFFECT.1,
            aa_change: AA_CHANGE.1,
            codon_change: CODON_CHANGE.1,
            codon_num: CODON_NUM.1,
        }
    }
}

impl ColumnLayout {
    /// Build a layout from a `# `-prefixed header line
    fn from_header(header: &str) -> Self {
        let names: Vec<&str> = header
            .trim_start_matches('#')
            .split('\t')
            .map(str::trim)
            .collect();
        let find = |(name, default): (&str, usize)| {
            names.iter().position(|n| *n == name).unwrap_or(default)
        };

        Self {
            position: find(POSITION),
            change: find(CHANGE),
            gene_id: find(GENE_ID),
            gene_name: find(GENE_NAME),
            effect: find(EFFECT),
            aa_change: find(AA_CHANGE),
            codon_change: find(CODON_CHANGE),
            codon_num: find(CODON_NUM),
        }
    }

    fn is_header(line: &str) -> bool {
        line.starts_with('#') && line.contains(POSITION.0)
    }
}

/// Parse a SnpEff text output file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_snpeff_file(path: &Path) -> Result<SnpEffTable, ParseError> {
    parse_snpeff_reader(open_text(path)?)
}

/// Parse SnpEff text output from any buffered reader
///
/// # Errors
///
/// Returns `ParseError::Io` on read failure and `ParseError::InvalidField` for a
/// non-numeric position.
pub fn parse_snpeff_reader<R: BufRead>(reader: R) -> Result<SnpEffTable, ParseError> {
    let mut layout = ColumnLayout::default();
    let mut table = SnpEffTable::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if ColumnLayout::is_header(line) {
            layout = ColumnLayout::from_header(line);
            continue;
        }
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let entry = parse_entry(line, i + 1, &layout)?;
        table.entry(entry.position).or_default().push(entry);
    }

    Ok(table)
}

fn parse_entry(
    line: &str,
    line_number: usize,
    layout: &ColumnLayout,
) -> Result<SnpEffEntry, ParseError> {
    let cells: Vec<&str> = line.split('\t').collect();
    let cell = |index: usize| {
        cells
            .get(index)
            .map_or_else(String::new, |c| c.trim().to_string())
    };

    let position = cells.get(layout.position).ok_or(ParseError::MissingField {
        line: line_number,
        field: POSITION.0,
    })?;

    Ok(SnpEffEntry {
        position: parse_u64(position, line_number, POSITION.0)?,
        change: cell(layout.change),
        effect: cell(layout.effect),
        gene_id: cell(layout.gene_id),
        gene_name: cell(layout.gene_name),
        aa_change: cell(layout.aa_change),
        codon_change: cell(layout.codon_change),
        codon_num: cell(layout.codon_num),
    })
}
