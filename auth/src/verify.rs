use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compare a submitted credential against the stored one without leaking
/// timing information.
///
/// Both inputs are hashed to a fixed length first, so neither the length of
/// the inputs nor the position of the first differing byte shows up in the
/// comparison time.
pub fn secure_compare(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given.as_slice().ct_eq(expected.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("swordfish", "swordfish", true)]
    #[case("", "", true)]
    #[case("swordfish", "Swordfish", false)]
    #[case("swordfish", "swordfisk", false)]
    #[case("swordfish", "swordfish ", false)]
    #[case("swordfish", "", false)]
    #[case("", "swordfish", false)]
    fn test_compare_cases(#[case] given: &str, #[case] expected: &str, #[case] outcome: bool) {
        assert_eq!(secure_compare(given, expected), outcome);
    }

    #[test]
    fn test_long_inputs() {
        let long = "x".repeat(10_000);
        assert!(secure_compare(&long, &long));
        assert!(!secure_compare(&long, &long[..9_999]));
    }
}
