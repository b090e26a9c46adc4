//! Proptest generators for property-based testing.

use proptest::prelude::*;

use grantkit_core::{GrantId, GrantSpec, PrincipalId, RedemptionId, CODE_ALPHABET};

/// Generate a random GrantId.
pub fn grant_id() -> impl Strategy<Value = GrantId> {
    any::<[u8; 16]>().prop_map(GrantId::from_bytes)
}

/// Generate a random RedemptionId.
pub fn redemption_id() -> impl Strategy<Value = RedemptionId> {
    any::<[u8; 16]>().prop_map(RedemptionId::from_bytes)
}

/// Generate an opaque principal id.
pub fn principal() -> impl Strategy<Value = PrincipalId> {
    "[a-z][a-z0-9-]{0,31}".prop_map(PrincipalId::new)
}

/// Generate a well-formed access code of the given length.
pub fn code(length: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(0..CODE_ALPHABET.len(), length)
        .prop_map(|indices| indices.into_iter().map(|i| CODE_ALPHABET[i] as char).collect())
}

/// Generate a permission set.
pub fn permissions() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z_]{3,24}".prop_map(String::from), 1..6)
}

/// Generate a seat cap.
pub fn seat_cap() -> impl Strategy<Value = Option<u32>> {
    prop_oneof![Just(None), (1u32..100).prop_map(Some)]
}

/// Generate a valid personal grant spec.
pub fn personal_spec() -> impl Strategy<Value = GrantSpec> {
    (principal(), principal(), permissions())
        .prop_map(|(owner, subject, perms)| GrantSpec::personal(owner, subject, perms))
}

/// Generate a valid organizational grant spec.
pub fn organizational_spec() -> impl Strategy<Value = GrantSpec> {
    (principal(), "[A-Za-z ]{3,32}", seat_cap()).prop_map(|(owner, name, cap)| {
        let spec = GrantSpec::organizational(owner, name);
        match cap {
            Some(cap) => spec.with_max_redemptions(cap),
            None => spec,
        }
    })
}

/// Generate a valid grant spec of either kind.
pub fn grant_spec() -> impl Strategy<Value = GrantSpec> {
    prop_oneof![personal_spec(), organizational_spec()]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_specs_always_validate(spec in grant_spec()) {
            prop_assert!(spec.validate().is_ok());
        }

        #[test]
        fn generated_codes_use_the_alphabet(code in code(8)) {
            prop_assert_eq!(code.len(), 8);
            prop_assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }
}
