use serde::{Deserialize, Serialize};

/// Symbol written for missing, filtered or uncallable data
pub const MISSING: u8 = b'N';

/// Symbol written into the uncertainty-preserving matrix for a reference call
/// that failed the quality or coverage threshold
pub const LOW_CONFIDENCE_REF: u8 = b'R';

/// Zygosity call attached to one position of one sample (the `GT` value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Genotype {
    /// `./.`
    NoCall,
    /// `0/0`
    HomRef,
    /// `0/1`
    Het,
    /// `1/1`
    HomAlt,
    /// Anything else (multi-allelic, phased, haploid, ...)
    Other(String),
}

impl Genotype {
    /// Parse a genotype token. Only the four unphased diploid forms are recognized.
    pub fn parse(token: &str) -> Self {
        match token {
            "./." => Genotype::NoCall,
            "0/0" => Genotype::HomRef,
            "0/1" => Genotype::Het,
            "1/1" => Genotype::HomAlt,
            other => Genotype::Other(other.to_string()),
        }
    }

    /// Whether this token carries an alternate allele
    pub fn is_variant(&self) -> bool {
        matches!(self, Genotype::Het | Genotype::HomAlt)
    }

    /// Whether quality and allele depths must be read for this token
    pub fn needs_evidence(&self) -> bool {
        matches!(self, Genotype::HomRef | Genotype::Het | Genotype::HomAlt)
    }
}

impl std::fmt::Display for Genotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCall => write!(f, "./."),
            Self::HomRef => write!(f, "0/0"),
            Self::Het => write!(f, "0/1"),
            Self::HomAlt => write!(f, "1/1"),
            Self::Other(token) => write!(f, "{token}"),
        }
    }
}

/// Statistic bucket a single position falls into.
///
/// Buckets are mutually exclusive; `HetVarCall` is a variant call that is
/// additionally counted as heterozygous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallCategory {
    RefCall,
    DiscardedRefCall,
    VarCall,
    HetVarCall,
    FilteredVarCall,
    DiscardedVarCall,
    NoCall,
    UnknownGenotype,
    /// Position skipped by the upstream caller
    Gap,
}

impl CallCategory {
    /// Whether this outcome marks the position as missing data
    pub fn is_missing(self) -> bool {
        matches!(
            self,
            Self::DiscardedRefCall
                | Self::DiscardedVarCall
                | Self::NoCall
                | Self::UnknownGenotype
                | Self::Gap
        )
    }
}

/// Selects one of the two call matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixKind {
    /// Only calls that passed every threshold
    Confident,
    /// Keeps hints about failed calls (`R`, lower-case alternate bases)
    Uncertain,
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confident => write!(f, "confident"),
            Self::Uncertain => write!(f, "uncertain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_genotype() {
        assert_eq!(Genotype::parse("./."), Genotype::NoCall);
        assert_eq!(Genotype::parse("0/0"), Genotype::HomRef);
        assert_eq!(Genotype::parse("0/1"), Genotype::Het);
        assert_eq!(Genotype::parse("1/1"), Genotype::HomAlt);
        assert_eq!(Genotype::parse("0|1"), Genotype::Other("0|1".to_string()));
        assert_eq!(Genotype::parse("1/2"), Genotype::Other("1/2".to_string()));
    }

    #[test]
    fn test_missing_categories() {
        assert!(!CallCategory::RefCall.is_missing());
        assert!(!CallCategory::VarCall.is_missing());
        assert!(!CallCategory::HetVarCall.is_missing());
        assert!(!CallCategory::FilteredVarCall.is_missing());
        assert!(CallCategory::Gap.is_missing());
        assert!(CallCategory::NoCall.is_missing());
        assert!(CallCategory::DiscardedRefCall.is_missing());
    }
}
