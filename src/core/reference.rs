/// The single reference sequence every sample is reconciled against.
///
/// Coordinates are 1-based; bases are stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGenome {
    /// Sequence name from the FASTA definition line
    pub name: String,

    sequence: Vec<u8>,
}

impl ReferenceGenome {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        let mut sequence = sequence.into();
        sequence.make_ascii_uppercase();

        Self {
            name: name.into(),
            sequence,
        }
    }

    /// Reference length `L`
    pub fn len(&self) -> u64 {
        self.sequence.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Base at a 1-based position, `None` outside `1..=L`
    pub fn base(&self, position: u64) -> Option<u8> {
        let index = usize::try_from(position.checked_sub(1)?).ok()?;
        self.sequence.get(index).copied()
    }

    /// Whether a 1-based position lies on the reference
    pub fn contains(&self, position: u64) -> bool {
        position >= 1 && position <= self.len()
    }

    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }
}
