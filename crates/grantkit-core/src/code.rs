//! Human-typeable access code generation.
//!
//! Codes are drawn from an unambiguous uppercase alphabet. The generator
//! makes no uniqueness promise of its own; uniqueness is enforced by the
//! store's code constraint, with the service retrying a bounded number of
//! times on collision.

use rand::Rng;

/// Code alphabet: uppercase letters and digits with the visually
/// confusable `0`/`O`, `1`/`I`/`L` removed.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Default code length. Short enough to type, long enough that the
/// bounded insert-retry loop practically never exhausts.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Generates access codes from [`CODE_ALPHABET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
    /// Create a generator.
    pub fn new() -> Self {
        Self
    }

    /// Produce a random code of the given length.
    pub fn generate(&self, length: usize) -> String {
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CODE_ALPHABET.len());
                CODE_ALPHABET[idx] as char
            })
            .collect()
    }
}

/// Normalize user-typed input before code lookup.
///
/// The redeem form accepts lowercase and surrounding whitespace; stored
/// codes are always uppercase.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn alphabet_has_no_confusable_characters() {
        for banned in [b'0', b'O', b'1', b'I', b'L'] {
            assert!(
                !CODE_ALPHABET.contains(&banned),
                "alphabet contains {}",
                banned as char
            );
        }
    }

    #[test]
    fn generated_code_has_requested_length() {
        let gen = CodeGenerator::new();
        for len in [6, 7, 8, 12] {
            assert_eq!(gen.generate(len).len(), len);
        }
    }

    #[test]
    fn generated_code_stays_in_alphabet() {
        let gen = CodeGenerator::new();
        let code = gen.generate(DEFAULT_CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize_code("  ab2c  "), "AB2C");
        assert_eq!(normalize_code("XYZW2345"), "XYZW2345");
    }

    proptest! {
        #[test]
        fn codes_always_normalized_form(len in 4usize..16) {
            let gen = CodeGenerator::new();
            let code = gen.generate(len);
            prop_assert_eq!(normalize_code(&code), code);
        }
    }
}
