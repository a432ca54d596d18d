//! GFF-style feature lists.
//!
//! Three inputs share the layout (tab-separated, 1-based inclusive coordinates in
//! columns 4 and 5):
//!
//! - exclusion regions: every line is a region, whatever its feature type
//! - coding sequences: `CDS` lines with a strand in column 7
//! - gene annotations: `gene`/`CDS` lines whose attributes name the gene

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::genotyping::exclusion::{CodingSequence, Region, Strand};
use crate::parsing::{open_text, parse_u64, ParseError};

const TYPE_COLUMN: usize = 2;
const START_COLUMN: usize = 3;
const END_COLUMN: usize = 4;
const STRAND_COLUMN: usize = 6;
const ATTRIBUTES_COLUMN: usize = 8;

/// Attribute keys that identify a gene, in lookup order
const GENE_ID_KEYS: [&str; 4] = ["locus_tag", "ID", "Name", "gene"];

/// Attribute keys holding a functional description, in preference order
const PRODUCT_KEYS: [&str; 2] = ["product", "Note"];

/// Annotation for one gene, used to enrich effect tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneAnnotation {
    pub id: String,
    pub product: String,
    pub length: u64,
}

fn read_to_string(path: &Path) -> Result<String, ParseError> {
    let mut content = String::new();
    open_text(path)?.read_to_string(&mut content)?;
    Ok(content)
}

/// Iterate `(line number, tab-separated cells)` of feature lines.
///
/// Blank lines and comments are skipped; an embedded `##FASTA` section ends the list.
fn feature_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .take_while(|(_, line)| !line.starts_with("##FASTA"))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| (n, line.split('\t').collect()))
}

fn coordinates(cells: &[&str], line: usize) -> Result<Region, ParseError> {
    if cells.len() <= END_COLUMN {
        return Err(ParseError::MissingField {
            line,
            field: "start/end columns",
        });
    }

    Ok(Region::new(
        parse_u64(cells[START_COLUMN], line, "start")?,
        parse_u64(cells[END_COLUMN], line, "end")?,
    ))
}

/// Parse an exclusion region file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_exclusion_regions(path: &Path) -> Result<Vec<Region>, ParseError> {
    parse_exclusion_text(&read_to_string(path)?)
}

/// Parse exclusion regions: every feature line contributes its `[start, end]`
///
/// # Errors
///
/// Returns `ParseError::MissingField` for lines without coordinates and
/// `ParseError::InvalidField` for non-numeric coordinates.
pub fn parse_exclusion_text(text: &str) -> Result<Vec<Region>, ParseError> {
    feature_lines(text)
        .map(|(line, cells)| coordinates(&cells, line))
        .collect()
}

/// Parse a coding sequence file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_coding_sequences(path: &Path) -> Result<Vec<CodingSequence>, ParseError> {
    parse_cds_text(&read_to_string(path)?)
}

/// Parse stranded `CDS` features; unstranded ones and other feature types are skipped
///
/// # Errors
///
/// Returns `ParseError::InvalidField` for non-numeric coordinates of a `CDS` line.
pub fn parse_cds_text(text: &str) -> Result<Vec<CodingSequence>, ParseError> {
    let mut coding_sequences = Vec::new();

    for (line, cells) in feature_lines(text) {
        if cells.get(TYPE_COLUMN) != Some(&"CDS") {
            continue;
        }
        let Some(strand) = cells.get(STRAND_COLUMN).and_then(|s| Strand::parse(s)) else {
            continue;
        };

        let region = coordinates(&cells, line)?;
        coding_sequences.push(CodingSequence { region, strand });
    }

    Ok(coding_sequences)
}

/// Parse a gene annotation file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_gene_annotations(
    path: &Path,
) -> Result<HashMap<String, GeneAnnotation>, ParseError> {
    parse_annotation_text(&read_to_string(path)?)
}

/// Collect gene annotations keyed by every identifier a feature carries.
///
/// A `CDS` usually holds the `product` while its parent `gene` holds the locus
/// tag, so an entry without a product picks one up from a later feature.
///
/// # Errors
///
/// Returns `ParseError::InvalidField` for non-numeric coordinates of a gene line.
pub fn parse_annotation_text(
    text: &str,
) -> Result<HashMap<String, GeneAnnotation>, ParseError> {
    let mut genes: HashMap<String, GeneAnnotation> = HashMap::new();

    for (line, cells) in feature_lines(text) {
        if !matches!(cells.get(TYPE_COLUMN), Some(&"gene" | &"CDS")) {
            continue;
        }

        let region = coordinates(&cells, line)?;
        let attributes = parse_attributes(cells.get(ATTRIBUTES_COLUMN).copied().unwrap_or(""));
        let product = PRODUCT_KEYS
            .iter()
            .find_map(|key| attributes.get(key))
            .map(|value| (*value).to_string())
            .unwrap_or_default();
        let length = region.end.saturating_sub(region.start) + 1;

        for key in GENE_ID_KEYS {
            let Some(&id) = attributes.get(key) else {
                continue;
            };
            genes
                .entry(id.to_string())
                .and_modify(|gene| {
                    if gene.product.is_empty() {
                        gene.product.clone_from(&product);
                    }
                })
                .or_insert_with(|| GeneAnnotation {
                    id: id.to_string(),
                    product: product.clone(),
                    length,
                });
        }
    }

    Ok(genes)
}

/// Split a GFF3 attribute column (`key=value;key=value`)
fn parse_attributes(column: &str) -> HashMap<&str, &str> {
    column
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect()
}
