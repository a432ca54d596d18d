//! Threshold-based classification of a single call.
//!
//! Decision order for one record:
//!
//! 1. `./.`: no call
//! 2. `0/0`: reference call if quality and reference depth pass, else discarded
//! 3. `0/1`, `1/1`: homozygous variant, then heterozygous variant, then a fallback
//!    that re-derives the frequency from the reference side
//! 4. anything else: unknown genotype
//!
//! Allele frequencies subtract one read from the denominator because the caller
//! counts one read towards both depths.

use tracing::debug;

use crate::core::config::Thresholds;
use crate::core::record::VariantRecord;
use crate::core::types::{CallCategory, Genotype, LOW_CONFIDENCE_REF, MISSING};
use crate::genotyping::ambiguity;

/// Helper function to convert a depth to f64 with explicit precision loss allowance
#[inline]
fn depth_to_f64(depth: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        depth as f64
    }
}

/// Fraction of `supporting` reads among all reads, with the shared read removed.
///
/// Degenerate depths follow IEEE semantics: `1/0` is infinite and `0/0` is NaN,
/// which fails every threshold comparison.
pub fn allele_frequency(supporting: u64, opposing: u64) -> f64 {
    depth_to_f64(supporting) / (depth_to_f64(supporting) + depth_to_f64(opposing) - 1.0)
}

/// Cap a frequency at 1.0 while letting NaN through
#[inline]
fn cap_at_one(frequency: f64) -> f64 {
    if frequency > 1.0 {
        1.0
    } else {
        frequency
    }
}

/// Outcome of classifying one record for one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Symbol for the confident matrix
    pub confident: u8,

    /// Symbol for the uncertainty-preserving matrix
    pub uncertain: u8,

    pub category: CallCategory,

    /// Alternate allele frequency, for variant genotypes only
    pub frequency: Option<f64>,

    /// Read depth added to the sample's coverage total
    pub coverage: u64,
}

impl Classification {
    fn missing(category: CallCategory) -> Self {
        Self {
            confident: MISSING,
            uncertain: MISSING,
            category,
            frequency: None,
            coverage: 0,
        }
    }

    fn same(symbol: u8, category: CallCategory) -> Self {
        Self {
            confident: symbol,
            uncertain: symbol,
            category,
            frequency: None,
            coverage: 0,
        }
    }

    /// Whether this call puts its position into the variant set (outgroups aside)
    pub fn contributes_variant(&self) -> bool {
        matches!(
            self.category,
            CallCategory::VarCall | CallCategory::HetVarCall
        )
    }

    /// Whether this call sets the missing-data mask
    pub fn is_missing(&self) -> bool {
        self.category.is_missing()
    }
}

/// Classifies records under a fixed set of thresholds
#[derive(Debug, Clone, Copy)]
pub struct GenotypeClassifier {
    thresholds: Thresholds,
}

impl GenotypeClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify one record.
    ///
    /// `reference_base` is the value the matrices hold before this record is
    /// applied; `excluded` says whether the position lies in the exclusion set.
    pub fn classify(
        &self,
        record: &VariantRecord,
        reference_base: u8,
        excluded: bool,
    ) -> Classification {
        match &record.genotype {
            Genotype::NoCall => Classification::missing(CallCategory::NoCall),
            Genotype::HomRef => self.classify_reference(record, reference_base),
            Genotype::Het | Genotype::HomAlt => {
                self.classify_variant(record, reference_base, excluded)
            }
            Genotype::Other(token) => {
                debug!(
                    "Genotype '{}' at position {} cannot be handled, writing 'N'",
                    token, record.position
                );
                Classification::missing(CallCategory::UnknownGenotype)
            }
        }
    }

    fn classify_reference(&self, record: &VariantRecord, reference_base: u8) -> Classification {
        let depth = record.ref_depth;

        let mut outcome = if self.thresholds.passes(record.quality, depth) {
            Classification::same(reference_base, CallCategory::RefCall)
        } else {
            Classification {
                confident: MISSING,
                uncertain: LOW_CONFIDENCE_REF,
                category: CallCategory::DiscardedRefCall,
                frequency: None,
                coverage: 0,
            }
        };
        outcome.coverage = depth;
        outcome
    }

    fn classify_variant(
        &self,
        record: &VariantRecord,
        reference_base: u8,
        excluded: bool,
    ) -> Classification {
        let thresholds = &self.thresholds;
        let alt_depth = record.alt_depth;
        let ref_depth = record.ref_depth;
        let frequency = cap_at_one(allele_frequency(alt_depth, ref_depth));
        let evidence_passes = thresholds.passes(record.quality, alt_depth);

        let variant_category = |het: bool| {
            if excluded {
                CallCategory::FilteredVarCall
            } else if het {
                CallCategory::HetVarCall
            } else {
                CallCategory::VarCall
            }
        };

        let mut outcome = if evidence_passes && frequency >= thresholds.min_hom_freq {
            Classification::same(record.alt_base, variant_category(false))
        } else if evidence_passes && frequency >= thresholds.min_het_freq {
            let code = ambiguity::resolve(reference_base, record.alt_base);
            Classification::same(code, variant_category(true))
        } else {
            // Re-derive from the reference side: a sample whose alternate fraction
            // is too low may still be a confident reference call.
            let ref_frequency = allele_frequency(ref_depth, alt_depth);

            if evidence_passes {
                if ref_frequency >= thresholds.min_hom_freq {
                    Classification::same(reference_base, CallCategory::RefCall)
                } else {
                    Classification::missing(CallCategory::DiscardedVarCall)
                }
            } else {
                let uncertain = if record.genotype == Genotype::HomAlt {
                    record.alt_base.to_ascii_lowercase()
                } else {
                    MISSING
                };
                Classification {
                    confident: MISSING,
                    uncertain,
                    category: CallCategory::DiscardedVarCall,
                    frequency: None,
                    coverage: 0,
                }
            }
        };

        outcome.frequency = Some(frequency);
        outcome.coverage = alt_depth.saturating_add(ref_depth);
        outcome
    }
}
