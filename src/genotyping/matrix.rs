use std::collections::BTreeSet;

use crate::core::reference::ReferenceGenome;
use crate::core::sample::Sample;
use crate::core::stats::SampleSummary;
use crate::core::types::MatrixKind;

/// Helper function to turn a 1-based position into a 0-based index
#[inline]
fn offset(position: u64) -> usize {
    usize::try_from(position - 1).unwrap_or(usize::MAX)
}

/// `L x samples` grid of one-byte symbols.
///
/// Stored column-major: each sample owns one contiguous column of `L` cells, so
/// one sample pass only ever touches its own slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallMatrix {
    length: usize,
    samples: usize,
    cells: Vec<u8>,
}

impl CallMatrix {
    /// Create a matrix whose every column is a copy of the reference
    pub fn from_reference(reference: &ReferenceGenome, samples: usize) -> Self {
        let column = reference.sequence();
        let mut cells = Vec::with_capacity(column.len() * samples);
        for _ in 0..samples {
            cells.extend_from_slice(column);
        }

        Self {
            length: column.len(),
            samples,
            cells,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Symbol at a 1-based position for one sample
    pub fn get(&self, position: u64, sample: usize) -> u8 {
        self.cells[sample * self.length + offset(position)]
    }

    pub fn set(&mut self, position: u64, sample: usize, symbol: u8) {
        self.cells[sample * self.length + offset(position)] = symbol;
    }

    /// One sample's full column, indexed by `position - 1`
    pub fn column(&self, sample: usize) -> &[u8] {
        &self.cells[sample * self.length..(sample + 1) * self.length]
    }

    /// One sample's symbols at the given positions
    pub fn column_at<'a>(
        &'a self,
        sample: usize,
        positions: impl IntoIterator<Item = &'a u64> + 'a,
    ) -> impl Iterator<Item = u8> + 'a {
        let column = self.column(sample);
        positions.into_iter().map(move |&p| column[offset(p)])
    }

    /// All samples' symbols at one position, in sample order
    pub fn row(&self, position: u64) -> impl Iterator<Item = u8> + '_ {
        (0..self.samples).map(move |sample| self.get(position, sample))
    }
}

/// `L x samples` alternate allele frequencies; 0.0 where no variant genotype was seen
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyMatrix {
    length: usize,
    values: Vec<f64>,
}

impl FrequencyMatrix {
    pub fn new(length: usize, samples: usize) -> Self {
        Self {
            length,
            values: vec![0.0; length * samples],
        }
    }

    pub fn get(&self, position: u64, sample: usize) -> f64 {
        self.values[sample * self.length + offset(position)]
    }

    pub fn set(&mut self, position: u64, sample: usize, frequency: f64) {
        self.values[sample * self.length + offset(position)] = frequency;
    }
}

/// The completed, read-only result of an assembly run.
///
/// Only obtainable from [`crate::genotyping::assembler::MatrixAssembler::finish`],
/// after every sample and the exclusion pass have completed.
#[derive(Debug, Clone)]
pub struct GenotypeMatrix {
    pub(crate) reference: ReferenceGenome,
    pub(crate) samples: Vec<Sample>,
    pub(crate) confident: CallMatrix,
    pub(crate) uncertain: CallMatrix,
    pub(crate) frequencies: Option<FrequencyMatrix>,
    pub(crate) missing: Vec<bool>,
    pub(crate) variant_positions: Vec<u64>,
    pub(crate) summaries: Vec<SampleSummary>,
    pub(crate) excluded_variants: usize,
}

impl GenotypeMatrix {
    pub fn reference(&self) -> &ReferenceGenome {
        &self.reference
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Select one of the two call matrices
    pub fn calls(&self, kind: MatrixKind) -> &CallMatrix {
        match kind {
            MatrixKind::Confident => &self.confident,
            MatrixKind::Uncertain => &self.uncertain,
        }
    }

    pub fn confident(&self) -> &CallMatrix {
        &self.confident
    }

    pub fn uncertain(&self) -> &CallMatrix {
        &self.uncertain
    }

    pub fn frequencies(&self) -> Option<&FrequencyMatrix> {
        self.frequencies.as_ref()
    }

    /// Whether any sample had missing data at a 1-based position
    pub fn is_missing(&self, position: u64) -> bool {
        self.missing[offset(position)]
    }

    pub fn missing_mask(&self) -> &[bool] {
        &self.missing
    }

    /// Final variant positions, ascending
    pub fn variant_positions(&self) -> &[u64] {
        &self.variant_positions
    }

    /// Per-sample statistics, in sample order
    pub fn summaries(&self) -> &[SampleSummary] {
        &self.summaries
    }

    /// Summary for a named sample
    pub fn summary(&self, sample: &str) -> Option<&SampleSummary> {
        self.summaries.iter().find(|s| s.sample == sample)
    }

    /// Variant positions removed by the exclusion and codon filters
    pub fn excluded_variants(&self) -> usize {
        self.excluded_variants
    }

    pub fn outgroups(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(|s| s.is_outgroup)
    }
}

/// Collect a variant set into the sorted list exposed to exporters
pub(crate) fn sorted_positions(set: BTreeSet<u64>) -> Vec<u64> {
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_initialized_from_reference() {
        let reference = ReferenceGenome::new("r", "ACGT");
        let mut matrix = CallMatrix::from_reference(&reference, 3);

        assert_eq!(matrix.length(), 4);
        assert_eq!(matrix.samples(), 3);
        for sample in 0..3 {
            assert_eq!(matrix.column(sample), b"ACGT");
        }

        matrix.set(2, 1, b'N');
        assert_eq!(matrix.get(2, 1), b'N');
        assert_eq!(matrix.get(2, 0), b'C');
        assert_eq!(matrix.row(2).collect::<Vec<_>>(), vec![b'C', b'N', b'C']);
        assert_eq!(
            matrix.column_at(1, &[1, 2, 4]).collect::<Vec<_>>(),
            vec![b'A', b'N', b'T']
        );
    }

    #[test]
    fn test_frequency_matrix() {
        let mut freqs = FrequencyMatrix::new(4, 2);
        freqs.set(4, 1, 0.75);
        assert!((freqs.get(4, 1) - 0.75).abs() < f64::EPSILON);
        assert!(freqs.get(4, 0).abs() < f64::EPSILON);
    }
}
