use std::ops::Range;

use crate::genotyping::AssemblyError;

/// Keeps one sample's stream aligned with the reference coordinate space.
///
/// Callers such as GATK's UnifiedGenotyper silently skip positions they consider
/// uninteresting. Every skipped coordinate is reported back as a gap so it can be
/// recorded as missing data, which is distinct from an explicit `./.` record.
#[derive(Debug, Clone)]
pub struct PositionSynchronizer {
    sample: String,
    reference_length: u64,
    previous: u64,
}

impl PositionSynchronizer {
    pub fn new(sample: impl Into<String>, reference_length: u64) -> Self {
        Self {
            sample: sample.into(),
            reference_length,
            previous: 0,
        }
    }

    /// Last position accepted, 0 before the first record
    pub fn previous(&self) -> u64 {
        self.previous
    }

    /// Accept the next position and return the skipped positions before it.
    ///
    /// # Errors
    ///
    /// Returns `AssemblyError::PositionOutOfRange` for positions outside
    /// `1..=L` and `AssemblyError::OrderingViolation` when the position does not
    /// strictly increase.
    pub fn advance(&mut self, current: u64) -> Result<Range<u64>, AssemblyError> {
        if current == 0 || current > self.reference_length {
            return Err(AssemblyError::PositionOutOfRange {
                sample: self.sample.clone(),
                position: current,
                length: self.reference_length,
            });
        }

        if current <= self.previous {
            return Err(AssemblyError::OrderingViolation {
                sample: self.sample.clone(),
                previous: self.previous,
                current,
            });
        }

        let gap = self.previous + 1..current;
        self.previous = current;
        Ok(gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_stream_has_no_gaps() {
        let mut sync = PositionSynchronizer::new("s", 10);
        for position in 1..=10 {
            assert!(sync.advance(position).unwrap().is_empty());
        }
        assert_eq!(sync.previous(), 10);
    }

    #[test]
    fn test_gap_detection() {
        let mut sync = PositionSynchronizer::new("s", 10);
        assert_eq!(sync.advance(3).unwrap(), 1..3);
        assert!(sync.advance(4).unwrap().is_empty());
        assert_eq!(sync.advance(7).unwrap().collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn test_repeated_position_is_ordering_violation() {
        let mut sync = PositionSynchronizer::new("s", 10);
        sync.advance(5).unwrap();
        let err = sync.advance(5).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::OrderingViolation { previous: 5, current: 5, .. }
        ));
    }

    #[test]
    fn test_decreasing_position_is_ordering_violation() {
        let mut sync = PositionSynchronizer::new("s", 10);
        sync.advance(5).unwrap();
        assert!(matches!(
            sync.advance(3),
            Err(AssemblyError::OrderingViolation { previous: 5, current: 3, .. })
        ));
    }

    #[test]
    fn test_out_of_range_positions() {
        let mut sync = PositionSynchronizer::new("s", 10);
        assert!(matches!(
            sync.advance(0),
            Err(AssemblyError::PositionOutOfRange { position: 0, .. })
        ));
        assert!(matches!(
            sync.advance(11),
            Err(AssemblyError::PositionOutOfRange { position: 11, length: 10, .. })
        ));
    }
}
