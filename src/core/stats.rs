use serde::{Deserialize, Serialize};

use crate::core::types::CallCategory;

/// Helper function to convert a count to f64 with explicit precision loss allowance
#[inline]
fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Round to two decimals, half away from zero
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Counters accumulated while one sample's stream is processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleStats {
    pub all_positions: u64,
    pub ref_call: u64,
    pub discarded_ref_call: u64,
    pub var_call: u64,
    pub het_var_call: u64,
    pub discarded_var_call: u64,
    pub filtered_var_call: u64,
    pub no_call: u64,
    pub unknown_genotype: u64,
    pub non_standard_gap_positions: u64,
    pub total_coverage: u64,
}

impl SampleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one processed or synthesized position
    pub fn record(&mut self, category: CallCategory) {
        self.all_positions += 1;

        match category {
            CallCategory::RefCall => self.ref_call += 1,
            CallCategory::DiscardedRefCall => self.discarded_ref_call += 1,
            CallCategory::VarCall => self.var_call += 1,
            CallCategory::HetVarCall => {
                self.var_call += 1;
                self.het_var_call += 1;
            }
            CallCategory::FilteredVarCall => self.filtered_var_call += 1,
            CallCategory::DiscardedVarCall => self.discarded_var_call += 1,
            CallCategory::NoCall => self.no_call += 1,
            CallCategory::UnknownGenotype => self.unknown_genotype += 1,
            CallCategory::Gap => self.non_standard_gap_positions += 1,
        }
    }

    pub fn add_coverage(&mut self, depth: u64) {
        self.total_coverage = self.total_coverage.saturating_add(depth);
    }

    /// Positions that ended up as missing data in the confident matrix
    pub fn missing_positions(&self) -> u64 {
        self.discarded_ref_call
            + self.discarded_var_call
            + self.no_call
            + self.unknown_genotype
            + self.non_standard_gap_positions
    }

    /// Sum of the mutually exclusive buckets; always equals `all_positions`
    pub fn categorized_positions(&self) -> u64 {
        self.ref_call
            + self.var_call
            + self.filtered_var_call
            + self.missing_positions()
    }

    /// Freeze the counters and derive the coverage figures
    pub fn finalize(self, sample: impl Into<String>) -> SampleSummary {
        let (coverage_fold, coverage_percent) = if self.all_positions == 0 {
            (0.0, 0.0)
        } else {
            let positions = count_to_f64(self.all_positions);
            let missing_percent =
                round2(count_to_f64(self.missing_positions()) * 100.0 / positions);
            (
                round2(count_to_f64(self.total_coverage) / positions),
                100.0 - missing_percent,
            )
        };

        SampleSummary {
            sample: sample.into(),
            var_call: self.var_call,
            het_var_call: self.het_var_call,
            coverage_fold,
            coverage_percent,
            ref_call: self.ref_call,
            all_positions: self.all_positions,
            no_call: self.no_call,
            discarded_ref_call: self.discarded_ref_call,
            discarded_var_call: self.discarded_var_call,
            filtered_var_call: self.filtered_var_call,
            unknown_genotype: self.unknown_genotype,
            non_standard_gap_positions: self.non_standard_gap_positions,
            total_coverage: self.total_coverage,
        }
    }
}

/// Final, immutable statistics for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub sample: String,

    #[serde(rename = "SNP Calls (all)")]
    pub var_call: u64,

    #[serde(rename = "SNP Calls (het)")]
    pub het_var_call: u64,

    #[serde(rename = "coverage (fold)")]
    pub coverage_fold: f64,

    #[serde(rename = "coverage (percent)")]
    pub coverage_percent: f64,

    #[serde(rename = "refCall")]
    pub ref_call: u64,

    #[serde(rename = "allPos")]
    pub all_positions: u64,

    #[serde(rename = "noCall")]
    pub no_call: u64,

    #[serde(rename = "discardedRefCall")]
    pub discarded_ref_call: u64,

    #[serde(rename = "discardedVarCall")]
    pub discarded_var_call: u64,

    #[serde(rename = "filteredVarCall")]
    pub filtered_var_call: u64,

    #[serde(rename = "unhandledGenotype")]
    pub unknown_genotype: u64,

    #[serde(rename = "nonStandardGapPositions")]
    pub non_standard_gap_positions: u64,

    #[serde(rename = "totalCoverage")]
    pub total_coverage: u64,
}

impl SampleSummary {
    /// Positions that ended up as missing data in the confident matrix
    pub fn missing_positions(&self) -> u64 {
        self.discarded_ref_call
            + self.discarded_var_call
            + self.no_call
            + self.unknown_genotype
            + self.non_standard_gap_positions
    }
}
