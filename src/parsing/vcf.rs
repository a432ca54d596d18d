//! Streaming reader for single-sample VCF data lines.
//!
//! Only the fields genotype classification needs are extracted; header lines are
//! skipped. Records are yielded one at a time, so a sample file is never held in
//! memory.
//!
//! Data lines look like:
//! `chr  1042  .  A  G  812.77  .  AC=2  GT:AD:DP:GQ:PL  1/1:0,21:21:63:846,63,0`

use std::io::BufRead;
use std::path::Path;

use crate::core::record::VariantRecord;
use crate::core::types::Genotype;
use crate::parsing::{open_text, parse_u64, ParseError};

const POS_COLUMN: usize = 1;
const ALT_COLUMN: usize = 4;
const QUAL_COLUMN: usize = 5;
const FORMAT_COLUMN: usize = 8;
const SAMPLE_COLUMN: usize = 9;

/// Open a VCF file (plain or gzip/bgzip) as a record stream
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_vcf(path: &Path) -> Result<VcfReader<Box<dyn BufRead>>, ParseError> {
    Ok(VcfReader::new(open_text(path)?))
}

/// Iterator over the data lines of a VCF
pub struct VcfReader<R> {
    inner: R,
    line: String,
    line_number: usize,
}

impl<R: BufRead> VcfReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
            line_number: 0,
        }
    }

    /// Number of lines read so far (headers included)
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<VariantRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.inner.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_number += 1;

            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(parse_record_line(line, self.line_number));
        }
    }
}

/// Parse one tab-separated VCF data line.
///
/// `QUAL` and `AD` are only read for `0/0`, `0/1` and `1/1`; a single `AD` value
/// is taken as the reference depth with no alternate reads.
///
/// # Errors
///
/// Returns `ParseError::MissingField` if a required column or `FORMAT` key is
/// absent and `ParseError::InvalidField` if a required number is malformed.
pub fn parse_record_line(line: &str, line_number: usize) -> Result<VariantRecord, ParseError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() <= SAMPLE_COLUMN {
        return Err(ParseError::MissingField {
            line: line_number,
            field: "sample column",
        });
    }

    let position = parse_u64(fields[POS_COLUMN], line_number, "POS")?;

    let keys: Vec<&str> = fields[FORMAT_COLUMN].split(':').collect();
    let values: Vec<&str> = fields[SAMPLE_COLUMN].split(':').collect();
    let genotype = Genotype::parse(format_value(&keys, &values, "GT", line_number)?);
    let mut record = VariantRecord::new(position, genotype);

    if let Some(&alt) = fields[ALT_COLUMN].as_bytes().first() {
        record.alt_base = alt;
    }

    if record.genotype.needs_evidence() {
        let qual = fields[QUAL_COLUMN];
        record.quality = qual.trim().parse().map_err(|_| ParseError::InvalidField {
            line: line_number,
            field: "QUAL",
            value: qual.to_string(),
        })?;

        let ad = format_value(&keys, &values, "AD", line_number)?;
        let mut depths = ad.split(',');
        record.ref_depth = parse_u64(depths.next().unwrap_or_default(), line_number, "AD")?;
        record.alt_depth = match depths.next() {
            Some(alt) => parse_u64(alt, line_number, "AD")?,
            None => 0,
        };
        if record.ref_depth.checked_add(record.alt_depth).is_none() {
            return Err(ParseError::InvalidField {
                line: line_number,
                field: "AD",
                value: ad.to_string(),
            });
        }
    }

    Ok(record)
}

/// Look up the sample value for a `FORMAT` key
fn format_value<'a>(
    keys: &[&str],
    values: &[&'a str],
    key: &'static str,
    line: usize,
) -> Result<&'a str, ParseError> {
    keys.iter()
        .position(|k| *k == key)
        .and_then(|i| values.get(i).copied())
        .ok_or(ParseError::MissingField { line, field: key })
}
