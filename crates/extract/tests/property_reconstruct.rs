// Property-based tests for numeric reconstruction.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use simrecon_core::TokenClass;
use simrecon_extract::reconstruct;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// (leading digit, six mantissa digits, exponent sign, two exponent digits)
fn arb_parts() -> impl Strategy<Value = (u8, String, bool, u8)> {
    (1u8..10, "[0-9]{6}", any::<bool>(), 0u8..40)
}

proptest! {
    #![proptest_config(config_256())]

    /// "d" + ".ddddddE" + "ee" reads the same as the unsplit literal.
    #[test]
    fn split_mantissa_matches_literal((lead, digits, negative, exp) in arb_parts()) {
        let sign = if negative { "-" } else { "+" };
        let literal: f64 = format!("{lead}.{digits}E{sign}{exp:02}").parse().unwrap();

        let mantissa = format!(".{digits}E{}", if negative { "-" } else { "" });
        let suffix = format!("{exp:02}");
        let lead = lead.to_string();
        let r = reconstruct(&[lead.as_str(), mantissa.as_str(), suffix.as_str()], 0, None).unwrap();
        prop_assert_eq!(r.consumed, 3);
        prop_assert_eq!(r.token.value, Some(literal));
    }

    /// A sign standing alone between marker and digits is kept, never dropped.
    #[test]
    fn detached_exponent_sign_matches_literal((lead, digits, negative, exp) in arb_parts()) {
        let sign = if negative { "-" } else { "+" };
        let literal: f64 = format!("{lead}.{digits}E{sign}{exp:02}").parse().unwrap();

        let mantissa = format!("{lead}.{digits}");
        let suffix = format!("{exp:02}");
        let r = reconstruct(&[mantissa.as_str(), "E", sign, suffix.as_str()], 0, None).unwrap();
        prop_assert_eq!(r.consumed, 4);
        prop_assert_eq!(r.token.value, Some(literal));
    }

    /// Whole numbers are never merged with a following unrelated complete number.
    #[test]
    fn complete_number_consumes_one((lead, digits, _neg, exp) in arb_parts(), next in 0u32..1000) {
        let first = format!("{lead}.{digits}E+{exp:02}");
        let next = format!("{next}.5");
        let r = reconstruct(&[first.as_str(), next.as_str()], 0, None).unwrap();
        prop_assert_eq!(r.consumed, 1);
        prop_assert_eq!(r.token.class, TokenClass::CompleteNumber);
    }

    /// Reconstruction never panics on arbitrary fragment soup.
    #[test]
    fn arbitrary_fragments_do_not_panic(frags in proptest::collection::vec("[0-9eE.+\\-Ol• ]{0,6}", 1..6)) {
        let refs: Vec<&str> = frags.iter().map(String::as_str).collect();
        let _ = reconstruct(&refs, 0, None);
    }
}
