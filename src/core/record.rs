use crate::core::types::Genotype;

/// The fields of one VCF data line that genotype classification reads.
///
/// Quality and depths are only parsed for genotypes that need them; they are
/// zero for no-calls and unrecognized genotypes.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    /// 1-based reference position
    pub position: u64,

    pub quality: f64,

    pub genotype: Genotype,

    /// Reads supporting the reference allele
    pub ref_depth: u64,

    /// Reads supporting the alternate allele
    pub alt_depth: u64,

    /// First byte of the ALT column
    pub alt_base: u8,
}

impl VariantRecord {
    pub fn new(position: u64, genotype: Genotype) -> Self {
        Self {
            position,
            quality: 0.0,
            genotype,
            ref_depth: 0,
            alt_depth: 0,
            alt_base: b'.',
        }
    }

    #[must_use]
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub fn with_depths(mut self, ref_depth: u64, alt_depth: u64) -> Self {
        self.ref_depth = ref_depth;
        self.alt_depth = alt_depth;
        self
    }

    #[must_use]
    pub fn with_alt(mut self, alt_base: u8) -> Self {
        self.alt_base = alt_base;
        self
    }
}
