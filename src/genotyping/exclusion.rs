//! Positions vetoed from final variant reporting.
//!
//! Two independent filters exist:
//!
//! - [`ExclusionSet`]: every position of a list of inclusive intervals (repeat
//!   regions, problematic genes). Consulted during classification, where a
//!   confident variant inside it is counted as filtered, and subtracted from the
//!   variant set afterwards.
//! - [`CodonFilter`]: removes the 1st and 2nd base of every codon of a set of
//!   coding sequences from the variant set, leaving only third codon positions.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Inclusive 1-based interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Iterate the covered positions; empty when `start > end`
    pub fn positions(&self) -> std::ops::RangeInclusive<u64> {
        self.start..=self.end
    }
}

/// Coding strand of a CDS feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Parse a GFF strand column; `.` and `?` have no strand
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }
}

/// One coding sequence interval with its strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingSequence {
    pub region: Region,
    pub strand: Strand,
}

impl CodingSequence {
    pub fn new(start: u64, end: u64, strand: Strand) -> Self {
        Self {
            region: Region::new(start, end),
            strand,
        }
    }

    /// Genome positions that are the 1st or 2nd base of a codon.
    ///
    /// Codon-relative numbering starts at `start` on the forward strand and at
    /// `end` on the reverse strand.
    pub fn non_third_positions(&self) -> impl Iterator<Item = u64> + '_ {
        let Region { start, end } = self.region;
        let forward = matches!(self.strand, Strand::Forward);
        let length = if end >= start { end - start + 1 } else { 0 };

        (1..=length)
            .filter(|codon_index| codon_index % 3 != 0)
            .map(move |codon_index| {
                if forward {
                    start + codon_index - 1
                } else {
                    end + 1 - codon_index
                }
            })
    }
}

/// Positions excluded from variant reporting by region lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    positions: HashSet<u64>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every position of every region
    pub fn from_regions<'a>(regions: impl IntoIterator<Item = &'a Region>) -> Self {
        let mut set = Self::new();
        for region in regions {
            set.add_region(region);
        }
        set
    }

    pub fn add_region(&mut self, region: &Region) {
        self.positions.extend(region.positions());
    }

    pub fn contains(&self, position: u64) -> bool {
        self.positions.contains(&position)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Remove excluded positions from a variant set, returning how many were removed
    pub fn apply(&self, variants: &mut BTreeSet<u64>) -> usize {
        let before = variants.len();
        variants.retain(|position| !self.positions.contains(position));
        before - variants.len()
    }
}

/// Restricts variant positions inside coding sequences to third codon positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodonFilter {
    coding_sequences: Vec<CodingSequence>,
}

impl CodonFilter {
    pub fn new(coding_sequences: Vec<CodingSequence>) -> Self {
        Self { coding_sequences }
    }

    pub fn is_empty(&self) -> bool {
        self.coding_sequences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.coding_sequences.len()
    }

    /// Remove 1st/2nd codon positions from a variant set, returning how many were removed
    pub fn apply(&self, variants: &mut BTreeSet<u64>) -> usize {
        let mut removed = 0;
        for cds in &self.coding_sequences {
            for position in cds.non_third_positions() {
                if variants.remove(&position) {
                    removed += 1;
                }
            }
        }
        removed
    }
}
