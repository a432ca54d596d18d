use serde::{Deserialize, Serialize};

use crate::core::sample::OUTGROUP_PREFIX;
use crate::utils::validation::{validate_frequency, ValidationError};

/// Default minimal genotyping quality
pub const DEFAULT_MIN_QUALITY: f64 = 30.0;

/// Default minimal read depth for a base call
pub const DEFAULT_MIN_COVERAGE: u64 = 5;

/// Default minimal allele frequency for a homozygous call
pub const DEFAULT_MIN_HOM_FREQ: f64 = 0.9;

/// Default minimal allele frequency for a heterozygous call
pub const DEFAULT_MIN_HET_FREQ: f64 = 0.1;

/// Numeric thresholds every call is judged against. All comparisons are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "quality_threshold")]
    pub min_quality: f64,

    #[serde(rename = "coverage_threshold")]
    pub min_coverage: u64,

    #[serde(rename = "min_snp_allele_freq")]
    pub min_hom_freq: f64,

    #[serde(rename = "min_het_snp_allele_freq")]
    pub min_het_freq: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_quality: DEFAULT_MIN_QUALITY,
            min_coverage: DEFAULT_MIN_COVERAGE,
            min_hom_freq: DEFAULT_MIN_HOM_FREQ,
            min_het_freq: DEFAULT_MIN_HET_FREQ,
        }
    }
}

impl Thresholds {
    pub fn new(min_quality: f64, min_coverage: u64, min_hom_freq: f64, min_het_freq: f64) -> Self {
        Self {
            min_quality,
            min_coverage,
            min_hom_freq,
            min_het_freq,
        }
    }

    /// Check that both frequencies lie in `[0, 1]` and the quality is a number
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::FrequencyOutOfRange` or `ValidationError::InvalidQuality`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.min_quality.is_finite() {
            return Err(ValidationError::InvalidQuality(self.min_quality));
        }
        validate_frequency("minimal homozygous frequency", self.min_hom_freq)?;
        validate_frequency("minimal heterozygous frequency", self.min_het_freq)?;
        Ok(())
    }

    /// Whether quality and depth both pass
    #[inline]
    pub fn passes(&self, quality: f64, depth: u64) -> bool {
        quality >= self.min_quality && depth >= self.min_coverage
    }
}

/// Run-wide configuration for one assembly pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(flatten)]
    pub thresholds: Thresholds,

    /// Keep a frequency matrix and print frequencies in the SNP tables
    pub write_frequencies: bool,

    /// Samples whose names start with this prefix are outgroups
    pub outgroup_prefix: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            write_frequencies: false,
            outgroup_prefix: OUTGROUP_PREFIX.to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_frequencies(mut self, write_frequencies: bool) -> Self {
        self.write_frequencies = write_frequencies;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_validation() {
        assert!(Thresholds::default().validate().is_ok());
        assert!(Thresholds::new(20.0, 5, 1.5, 0.1).validate().is_err());
        assert!(Thresholds::new(20.0, 5, 0.9, -0.1).validate().is_err());
        assert!(Thresholds::new(f64::NAN, 5, 0.9, 0.1).validate().is_err());
        assert!(Thresholds::new(0.0, 0, 0.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_passes_is_inclusive() {
        let thresholds = Thresholds::new(20.0, 5, 0.9, 0.1);
        assert!(thresholds.passes(20.0, 5));
        assert!(!thresholds.passes(19.99, 5));
        assert!(!thresholds.passes(20.0, 4));
    }
}
