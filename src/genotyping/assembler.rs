use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::core::config::AnalysisConfig;
use crate::core::record::VariantRecord;
use crate::core::reference::ReferenceGenome;
use crate::core::sample::Sample;
use crate::core::stats::{SampleStats, SampleSummary};
use crate::core::types::{CallCategory, Genotype, MISSING};
use crate::genotyping::classifier::{Classification, GenotypeClassifier};
use crate::genotyping::exclusion::{CodonFilter, ExclusionSet};
use crate::genotyping::matrix::{sorted_positions, CallMatrix, FrequencyMatrix, GenotypeMatrix};
use crate::genotyping::synchronizer::PositionSynchronizer;
use crate::genotyping::AssemblyError;
use crate::parsing::ParseError;

/// Records between two progress messages
const PROGRESS_INTERVAL: u64 = 500_000;

/// Builds the multi-sample matrices one sample at a time.
///
/// Samples must be fed in index order. A failed sample poisons the assembler so
/// that [`MatrixAssembler::finish`] never hands out a partially written matrix.
#[derive(Debug)]
pub struct MatrixAssembler {
    reference: ReferenceGenome,
    config: AnalysisConfig,
    classifier: GenotypeClassifier,
    exclusions: ExclusionSet,
    expected_samples: usize,

    samples: Vec<Sample>,
    confident: CallMatrix,
    uncertain: CallMatrix,
    frequencies: Option<FrequencyMatrix>,
    missing: Vec<bool>,
    variants: BTreeSet<u64>,
    summaries: Vec<SampleSummary>,
    seen_names: HashSet<String>,
    unknown_genotypes: HashSet<String>,
    aborted: bool,
}

impl MatrixAssembler {
    /// Allocate all matrices for `sample_count` samples, preset to the reference
    pub fn new(
        reference: ReferenceGenome,
        sample_count: usize,
        config: AnalysisConfig,
        exclusions: ExclusionSet,
    ) -> Self {
        let length = reference.sequence().len();
        let confident = CallMatrix::from_reference(&reference, sample_count);
        let uncertain = confident.clone();
        let frequencies = config
            .write_frequencies
            .then(|| FrequencyMatrix::new(length, sample_count));

        Self {
            classifier: GenotypeClassifier::new(config.thresholds),
            reference,
            config,
            exclusions,
            expected_samples: sample_count,
            samples: Vec::with_capacity(sample_count),
            confident,
            uncertain,
            frequencies,
            missing: vec![false; length],
            variants: BTreeSet::new(),
            summaries: Vec::with_capacity(sample_count),
            seen_names: HashSet::new(),
            unknown_genotypes: HashSet::new(),
            aborted: false,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Number of samples fully processed so far
    pub fn processed(&self) -> usize {
        self.samples.len()
    }

    /// Stream one sample's records into its matrix column.
    ///
    /// # Errors
    ///
    /// Returns `AssemblyError::UnexpectedSample` if the sample is out of order,
    /// `AssemblyError::OrderingViolation` or `AssemblyError::PositionOutOfRange`
    /// for bad positions, and `AssemblyError::Parse` for malformed records. Any
    /// error after the first record poisons the assembler.
    pub fn process_sample<I>(
        &mut self,
        mut sample: Sample,
        records: I,
    ) -> Result<&SampleSummary, AssemblyError>
    where
        I: IntoIterator<Item = Result<VariantRecord, ParseError>>,
    {
        if self.aborted {
            return Err(AssemblyError::Aborted);
        }

        let expected = self.samples.len();
        if sample.index != expected || expected >= self.expected_samples {
            return Err(AssemblyError::UnexpectedSample {
                sample: sample.name,
                index: sample.index,
                expected,
            });
        }

        sample.is_outgroup = sample.name.starts_with(&self.config.outgroup_prefix);

        info!(
            "Now processing {}/{}: {}",
            sample.index + 1,
            self.expected_samples,
            sample.name
        );
        if sample.is_outgroup {
            info!("{} is an outgroup; its specific SNPs will not be considered", sample.name);
        }
        if !self.seen_names.insert(sample.name.clone()) {
            warn!("Sample name '{}' appears more than once", sample.name);
        }

        let stats = match self.stream_records(&sample, records) {
            Ok(stats) => stats,
            Err(e) => {
                self.aborted = true;
                return Err(e);
            }
        };

        let summary = stats.finalize(sample.name.clone());
        debug!(
            "{}: {} positions, {} SNP calls, {} reference calls",
            sample.name, summary.all_positions, summary.var_call, summary.ref_call
        );

        self.samples.push(sample);
        self.summaries.push(summary);
        Ok(&self.summaries[self.summaries.len() - 1])
    }

    fn stream_records<I>(&mut self, sample: &Sample, records: I) -> Result<SampleStats, AssemblyError>
    where
        I: IntoIterator<Item = Result<VariantRecord, ParseError>>,
    {
        let column = sample.index;
        let mut sync = PositionSynchronizer::new(&sample.name, self.reference.len());
        let mut stats = SampleStats::new();
        let mut records_seen: u64 = 0;

        for record in records {
            let record = record?;

            for position in sync.advance(record.position)? {
                stats.record(CallCategory::Gap);
                self.confident.set(position, column, MISSING);
                self.uncertain.set(position, column, MISSING);
                self.missing[mask_index(position)] = true;
            }

            let reference_base = self.confident.get(record.position, column);
            let excluded = self.exclusions.contains(record.position);
            let outcome = self.classifier.classify(&record, reference_base, excluded);
            if let Genotype::Other(token) = &record.genotype {
                self.note_unknown_genotype(token, &sample.name, record.position);
            }

            stats.record(outcome.category);
            stats.add_coverage(outcome.coverage);
            self.apply(&record, column, sample.is_outgroup, &outcome);

            records_seen += 1;
            if records_seen % PROGRESS_INTERVAL == 0 {
                info!("{} positions processed.", records_seen);
            }
        }

        Ok(stats)
    }

    /// Warn once per distinct genotype token the classifier cannot handle.
    /// Returns whether the token was new.
    fn note_unknown_genotype(&mut self, token: &str, sample: &str, position: u64) -> bool {
        if self.unknown_genotypes.contains(token) {
            return false;
        }
        warn!(
            "Genotype '{}' cannot be handled (first seen in {} at position {}); such calls are written as 'N'",
            token, sample, position
        );
        self.unknown_genotypes.insert(token.to_string())
    }

    fn apply(
        &mut self,
        record: &VariantRecord,
        column: usize,
        outgroup: bool,
        outcome: &Classification,
    ) {
        let position = record.position;

        self.confident.set(position, column, outcome.confident);
        self.uncertain.set(position, column, outcome.uncertain);

        if outcome.is_missing() {
            self.missing[mask_index(position)] = true;
        }

        if let (Some(frequencies), Some(frequency)) = (self.frequencies.as_mut(), outcome.frequency)
        {
            frequencies.set(position, column, frequency);
        }

        if outcome.contributes_variant() && !outgroup {
            self.variants.insert(position);
        }
    }

    /// Apply the exclusion and codon filters and freeze the result.
    ///
    /// # Errors
    ///
    /// Returns `AssemblyError::Aborted` if any sample failed and
    /// `AssemblyError::MissingSamples` if fewer samples than announced were processed.
    pub fn finish(mut self, codon_filter: &CodonFilter) -> Result<GenotypeMatrix, AssemblyError> {
        if self.aborted {
            return Err(AssemblyError::Aborted);
        }
        if self.samples.len() != self.expected_samples {
            return Err(AssemblyError::MissingSamples {
                expected: self.expected_samples,
                processed: self.samples.len(),
            });
        }

        info!("Excluding positions...");
        let excluded =
            self.exclusions.apply(&mut self.variants) + codon_filter.apply(&mut self.variants);
        info!("{} SNP positions excluded.", excluded);

        match self.samples.iter().filter(|s| s.is_outgroup).count() {
            0 => info!("No outgroup has been defined. All samples were treated equally."),
            1 => info!(
                "One sample was labeled as outgroup. SNPs only called in this sample were not \
                 considered in the SNP alignment or SNP tables, but were counted in the statistics."
            ),
            n => warn!(
                "{} samples were labeled as outgroup. SNPs only called in these samples were not \
                 considered in the SNP alignment or SNP tables, but were counted in the statistics.",
                n
            ),
        }

        Ok(GenotypeMatrix {
            reference: self.reference,
            samples: self.samples,
            confident: self.confident,
            uncertain: self.uncertain,
            frequencies: self.frequencies,
            missing: self.missing,
            variant_positions: sorted_positions(self.variants),
            summaries: self.summaries,
            excluded_variants: excluded,
        })
    }
}

#[inline]
fn mask_index(position: u64) -> usize {
    usize::try_from(position - 1).unwrap_or(usize::MAX)
}

/// Run a complete assembly over samples given in input order.
///
/// # Errors
///
/// Propagates the first `AssemblyError` of any sample; no matrix is returned then.
pub fn assemble<S, I>(
    reference: ReferenceGenome,
    config: AnalysisConfig,
    exclusions: ExclusionSet,
    codon_filter: &CodonFilter,
    samples: S,
) -> Result<GenotypeMatrix, AssemblyError>
where
    S: IntoIterator<Item = (Sample, I)>,
    S::IntoIter: ExactSizeIterator,
    I: IntoIterator<Item = Result<VariantRecord, ParseError>>,
{
    let samples = samples.into_iter();
    let mut assembler = MatrixAssembler::new(reference, samples.len(), config, exclusions);

    for (sample, records) in samples {
        assembler.process_sample(sample, records)?;
    }

    assembler.finish(codon_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Thresholds;
    use crate::core::types::{Genotype, LOW_CONFIDENCE_REF};
    use crate::genotyping::exclusion::Region;

    fn config() -> AnalysisConfig {
        AnalysisConfig::new(Thresholds::new(20.0, 5, 0.9, 0.2))
    }

    fn hom_ref(position: u64) -> Result<VariantRecord, ParseError> {
        Ok(VariantRecord::new(position, Genotype::HomRef)
            .with_quality(30.0)
            .with_depths(10, 0))
    }

    fn hom_alt(position: u64, alt: u8) -> Result<VariantRecord, ParseError> {
        Ok(VariantRecord::new(position, Genotype::HomAlt)
            .with_quality(50.0)
            .with_depths(0, 12)
            .with_alt(alt))
    }

    #[test]
    fn test_gap_filling() {
        let reference = ReferenceGenome::new("r", "ACGTACGTAC");
        let mut assembler = MatrixAssembler::new(reference, 1, config(), ExclusionSet::new());

        let summary = assembler
            .process_sample(Sample::new("s", 0), vec![hom_ref(3), hom_ref(4), hom_ref(7)])
            .unwrap()
            .clone();
        // 1, 2 before the first record and 5, 6 between 4 and 7
        assert_eq!(summary.non_standard_gap_positions, 4);
        assert_eq!(summary.all_positions, 7);

        let matrix = assembler.finish(&CodonFilter::default()).unwrap();
        let column = matrix.confident().column(0);
        assert_eq!(&column[..7], b"NNGTNNG");
        assert_eq!(&column[7..], b"TAC");
        assert!(matrix.is_missing(5));
        assert!(matrix.is_missing(6));
        assert!(!matrix.is_missing(4));
        assert_eq!(matrix.uncertain().get(5, 0), MISSING);
    }

    #[test]
    fn test_ordering_violation_poisons_assembler() {
        let reference = ReferenceGenome::new("r", "ACGTACGTAC");
        let mut assembler = MatrixAssembler::new(reference, 2, config(), ExclusionSet::new());

        let err = assembler
            .process_sample(Sample::new("s", 0), vec![hom_ref(5), hom_ref(3)])
            .unwrap_err();
        assert!(matches!(err, AssemblyError::OrderingViolation { .. }));

        assert!(matches!(
            assembler.process_sample(Sample::new("t", 1), vec![hom_ref(1)]),
            Err(AssemblyError::Aborted)
        ));
        assert!(matches!(
            assembler.finish(&CodonFilter::default()),
            Err(AssemblyError::Aborted)
        ));
    }

    #[test]
    fn test_samples_must_arrive_in_order() {
        let reference = ReferenceGenome::new("r", "ACGT");
        let mut assembler = MatrixAssembler::new(reference, 2, config(), ExclusionSet::new());

        assert!(matches!(
            assembler.process_sample(Sample::new("s", 1), vec![hom_ref(1)]),
            Err(AssemblyError::UnexpectedSample { expected: 0, .. })
        ));

        assembler
            .process_sample(Sample::new("s", 0), vec![hom_ref(1)])
            .unwrap();
        assert_eq!(assembler.processed(), 1);
        assert!(matches!(
            assembler.finish(&CodonFilter::default()),
            Err(AssemblyError::MissingSamples { expected: 2, processed: 1 })
        ));
    }

    #[test]
    fn test_outgroup_does_not_contribute_variants() {
        let reference = ReferenceGenome::new("r", "ACGTACGTAC");
        let mut assembler = MatrixAssembler::new(reference, 2, config(), ExclusionSet::new());

        assembler
            .process_sample(Sample::new("s1", 0), vec![hom_alt(2, b'T')])
            .unwrap();
        let outgroup = assembler
            .process_sample(Sample::new("outgroup_x", 1), vec![hom_alt(4, b'A')])
            .unwrap();
        assert_eq!(outgroup.var_call, 1);

        let matrix = assembler.finish(&CodonFilter::default()).unwrap();
        assert_eq!(matrix.variant_positions(), &[2]);
        assert_eq!(matrix.confident().get(4, 1), b'A');
        assert_eq!(matrix.outgroups().count(), 1);
    }

    #[test]
    fn test_excluded_positions_are_filtered() {
        let reference = ReferenceGenome::new("r", "ACGTACGTAC");
        let exclusions = ExclusionSet::from_regions(&[Region::new(3, 4)]);
        let mut assembler = MatrixAssembler::new(reference, 1, config(), exclusions);

        let summary = assembler
            .process_sample(
                Sample::new("s", 0),
                vec![hom_alt(2, b'T'), hom_alt(3, b'A'), hom_alt(5, b'G')],
            )
            .unwrap()
            .clone();
        assert_eq!(summary.var_call, 2);
        assert_eq!(summary.filtered_var_call, 1);

        let matrix = assembler.finish(&CodonFilter::default()).unwrap();
        assert_eq!(matrix.variant_positions(), &[2, 5]);
        // the filtered call is still written to the matrix
        assert_eq!(matrix.confident().get(3, 0), b'A');
    }

    #[test]
    fn test_uncertain_matrix_keeps_hints() {
        let reference = ReferenceGenome::new("r", "ACGT");
        let mut assembler = MatrixAssembler::new(reference, 1, config(), ExclusionSet::new());

        let weak_ref = VariantRecord::new(1, Genotype::HomRef)
            .with_quality(5.0)
            .with_depths(10, 0);
        assembler
            .process_sample(Sample::new("s", 0), vec![Ok(weak_ref)])
            .unwrap();

        let matrix = assembler.finish(&CodonFilter::default()).unwrap();
        assert_eq!(matrix.confident().get(1, 0), MISSING);
        assert_eq!(matrix.uncertain().get(1, 0), LOW_CONFIDENCE_REF);
        assert!(matrix.is_missing(1));
        // trailing positions without records keep the reference
        assert_eq!(&matrix.confident().column(0)[1..], b"CGT");
    }

    #[test]
    fn test_frequencies_recorded_when_enabled() {
        let reference = ReferenceGenome::new("r", "ACGT");
        let config = config().with_frequencies(true);
        let het = VariantRecord::new(2, Genotype::Het)
            .with_quality(50.0)
            .with_depths(5, 6)
            .with_alt(b'T');

        let matrix = assemble(
            reference,
            config,
            ExclusionSet::new(),
            &CodonFilter::default(),
            vec![(Sample::new("s", 0), vec![Ok(het)])],
        )
        .unwrap();

        let frequencies = matrix.frequencies().unwrap();
        assert!((frequencies.get(2, 0) - 0.6).abs() < 1e-12);
        assert_eq!(matrix.confident().get(2, 0), b'Y');
    }

    #[test]
    fn test_missing_mask_survives_later_confident_calls() {
        let reference = ReferenceGenome::new("r", "ACGT");
        let mut assembler = MatrixAssembler::new(reference, 2, config(), ExclusionSet::new());

        let no_call = VariantRecord::new(2, Genotype::NoCall);
        assembler
            .process_sample(Sample::new("s1", 0), vec![hom_ref(1), Ok(no_call), hom_ref(3)])
            .unwrap();
        assembler
            .process_sample(Sample::new("s2", 1), vec![hom_ref(1), hom_ref(2), hom_ref(3)])
            .unwrap();

        let matrix = assembler.finish(&CodonFilter::default()).unwrap();
        assert!(matrix.is_missing(2));
        assert_eq!(matrix.confident().get(2, 0), MISSING);
        assert_eq!(matrix.confident().get(2, 1), b'C');
        assert!(!matrix.is_missing(1));
        assert!(!matrix.is_missing(3));
    }

    #[test]
    fn test_unknown_genotypes_warned_once_per_token() {
        let reference = ReferenceGenome::new("r", "ACGT");
        let mut assembler = MatrixAssembler::new(reference, 1, config(), ExclusionSet::new());

        let multi = |position| Ok(VariantRecord::new(position, Genotype::Other("1/2".to_string())));
        let summary = assembler
            .process_sample(Sample::new("s", 0), vec![multi(1), multi(2)])
            .unwrap()
            .clone();
        assert_eq!(summary.unknown_genotype, 2);
        assert_eq!(assembler.unknown_genotypes.len(), 1);
        assert!(!assembler.note_unknown_genotype("1/2", "s", 3));
        assert!(assembler.note_unknown_genotype("2/2", "s", 4));
    }

    #[test]
    fn test_extreme_depths_do_not_overflow_coverage() {
        let reference = ReferenceGenome::new("r", "ACGT");
        let mut assembler = MatrixAssembler::new(reference, 1, config(), ExclusionSet::new());

        let deep = |position| {
            Ok(VariantRecord::new(position, Genotype::HomAlt)
                .with_quality(50.0)
                .with_depths(u64::MAX, 5)
                .with_alt(b'T'))
        };
        let summary = assembler
            .process_sample(Sample::new("s", 0), vec![deep(1), deep(2)])
            .unwrap()
            .clone();
        // the reference side carries the call through the fallback
        assert_eq!(summary.all_positions, 2);
        assert_eq!(summary.ref_call, 2);
    }
}
