//! Random fixed-alphabet codes (event access codes, guest tokens)

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};

const UPPER_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MIXED_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Shape of a generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSpec {
    pub alphabet: &'static [u8],
    pub length: usize,
}

/// Six uppercase letters or digits, typed in by guests
pub const ACCESS_CODE: CodeSpec = CodeSpec {
    alphabet: UPPER_ALNUM,
    length: 6,
};

/// 32 mixed-case letters or digits, carried in share links
pub const GUEST_TOKEN: CodeSpec = CodeSpec {
    alphabet: MIXED_ALNUM,
    length: 32,
};

impl CodeSpec {
    /// Sample a code from the operating system CSPRNG
    pub fn generate(&self) -> String {
        self.generate_with(&mut OsRng)
    }

    /// Sample a code from a caller-supplied cryptographic RNG
    pub fn generate_with<R: Rng + CryptoRng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| char::from(self.alphabet[rng.gen_range(0..self.alphabet.len())]))
            .collect()
    }

    /// Whether `candidate` could have been produced by this `CodeSpec`
    pub fn matches(&self, candidate: &str) -> bool {
        candidate.len() == self.length && candidate.bytes().all(|b| self.alphabet.contains(&b))
    }

    /// Number of distinct codes, saturating at `u128::MAX`
    pub fn space_size(&self) -> u128 {
        let base = self.alphabet.len() as u128;
        (0..self.length).try_fold(1u128, |acc, _| acc.checked_mul(base)).unwrap_or(u128::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_access_code_shape() {
        for _ in 0..200 {
            let code = ACCESS_CODE.generate();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert!(ACCESS_CODE.matches(&code));
        }
    }

    #[test]
    fn test_guest_token_shape() {
        let token = GUEST_TOKEN.generate();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(GUEST_TOKEN.matches(&token));
    }

    #[test]
    fn test_matches_rejects_foreign_characters() {
        assert!(!ACCESS_CODE.matches("abc123"));
        assert!(!ACCESS_CODE.matches("ABC12"));
        assert!(!ACCESS_CODE.matches("ABC-12"));
        assert!(ACCESS_CODE.matches("ABC123"));
    }

    #[test]
    fn test_every_symbol_is_reachable() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.extend(ACCESS_CODE.generate_with(&mut rng).into_bytes());
        }
        assert_eq!(seen.len(), UPPER_ALNUM.len());
    }

    #[test]
    fn test_space_size() {
        assert_eq!(ACCESS_CODE.space_size(), 2_176_782_336);
        assert_eq!(GUEST_TOKEN.space_size(), u128::MAX);
    }
}
