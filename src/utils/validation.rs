//! Centralized validation and helper functions.

/// Validation error types for run configuration
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid {name}: {value} is outside [0, 1]")]
    FrequencyOutOfRange { name: &'static str, value: f64 },
    #[error("Invalid minimal quality: {0}")]
    InvalidQuality(f64),
    #[error("No VCF files provided")]
    NoSamples,
}

/// Check that an allele frequency threshold lies in `[0, 1]`.
///
/// # Examples
///
/// ```
/// use genotype_matrix::utils::validation::validate_frequency;
///
/// assert!(validate_frequency("het", 0.25).is_ok());
/// assert!(validate_frequency("het", 1.01).is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError::FrequencyOutOfRange` for values outside the range (NaN included).
pub fn validate_frequency(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::FrequencyOutOfRange { name, value })
    }
}
