//! Property-based tests: serde round-trip for the signature/priority
//! surface (§8 round-trip law: "`archive ↦ json ↦ archive'`" applies
//! equally to the bare building blocks an archive is made of).

use forge_types::{Field, Priority, Signature};
use proptest::prelude::*;

proptest! {
    /// Any disjoint, unique pair of field names survives a JSON round-trip
    /// through `Signature` unchanged.
    #[test]
    fn signature_json_round_trips(
        input_name in "[a-z][a-z0-9_]{0,8}",
        output_name in "[A-Z][A-Za-z0-9_]{0,8}",
    ) {
        let sig = Signature::new(
            "roundtrip",
            vec![Field::new(&input_name)],
            vec![Field::new(&output_name)],
        )
        .unwrap();
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(sig, back);
    }

    /// Parsing a priority string and re-rendering it with `as_str` is
    /// idempotent under a second parse, for any arbitrary text.
    #[test]
    fn priority_parse_as_str_round_trips(text in ".{0,40}") {
        let first = Priority::parse(&text);
        let second = Priority::parse(first.as_str());
        prop_assert_eq!(first, second);
    }
}
