use tracing::warn;

use crate::core::types::MISSING;

/// Resolve two called bases into one IUPAC ambiguity symbol.
///
/// The result does not depend on argument order. Identical bases resolve to
/// themselves. Pairs outside the six two-base codes fall back to `N` with a warning.
pub fn resolve(a: u8, b: u8) -> u8 {
    if a == b {
        return a;
    }

    let (low, high) = if a < b { (a, b) } else { (b, a) };
    match (low, high) {
        (b'A', b'G') => b'R',
        (b'C', b'T') => b'Y',
        (b'G', b'T') => b'K',
        (b'A', b'C') => b'M',
        (b'C', b'G') => b'S',
        (b'A', b'T') => b'W',
        _ => {
            warn!(
                "No ambiguity code for bases '{}' and '{}', writing '{}'",
                char::from(a),
                char::from(b),
                char::from(MISSING)
            );
            MISSING
        }
    }
}
