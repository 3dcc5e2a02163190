//! Property tests for the parser/serializer round trip, plural-rule
//! totality, and formatter idempotence.

use proptest::prelude::*;

use pocat_core::po::{self, PoEntry};
use pocat_core::{PluralRule, format_named, format_positional, placeholders};

/// Message text: printable chars plus the escapes the format supports.
fn text_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            proptest::char::range('a', 'z').prop_map(|c| c.to_string()),
            proptest::char::range('à', 'ü').prop_map(|c| c.to_string()),
            Just(" ".to_string()),
            Just("\"".to_string()),
            Just("\\".to_string()),
            Just("\n".to_string()),
            Just("\t".to_string()),
            Just("%s".to_string()),
            Just("%(name)s".to_string()),
            Just("%%".to_string()),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

fn entry_strategy() -> impl Strategy<Value = PoEntry> {
    (
        "[a-z][a-z0-9 ]{0,20}",
        text_strategy(),
        proptest::option::of("[a-z]{1,8}"),
        proptest::bool::ANY,
    )
        .prop_map(|(msgid, msgstr, msgctxt, plural)| {
            if plural {
                PoEntry {
                    msgid,
                    msgctxt,
                    msgid_plural: Some("plural form".to_string()),
                    plural_msgstr: vec![msgstr.clone(), msgstr],
                    ..Default::default()
                }
            } else {
                PoEntry {
                    msgid,
                    msgctxt,
                    msgstr,
                    ..Default::default()
                }
            }
        })
}

/// Entries with unique keys, as a valid catalog requires.
fn entries_strategy() -> impl Strategy<Value = Vec<PoEntry>> {
    proptest::collection::vec(entry_strategy(), 0..8).prop_map(|mut entries| {
        let mut seen = std::collections::HashSet::new();
        entries.retain(|e| seen.insert(e.key()));
        entries
    })
}

proptest! {
    #[test]
    fn serialize_parse_round_trip(entries in entries_strategy()) {
        let text = po::serialize(&entries);
        let reparsed = po::parse(&text).expect("serialized catalog parses");
        prop_assert_eq!(entries, reparsed);
    }

    #[test]
    fn escape_never_breaks_a_literal(s in text_strategy()) {
        // An escaped value embedded in a single-line field must survive.
        let entry = PoEntry { msgid: "sample".to_string(), msgstr: s.clone(), ..Default::default() };
        let text = po::serialize(&[entry]);
        let reparsed = po::parse(&text).expect("parses");
        prop_assert_eq!(&reparsed[0].msgstr, &s);
    }

    #[test]
    fn french_rule_is_total_and_bounded(n in proptest::num::u64::ANY) {
        let rule = PluralRule::parse("nplurals=2; plural=(n > 1);").unwrap();
        prop_assert!(rule.index(n) < rule.nplurals());
    }

    #[test]
    fn russian_rule_is_total_and_bounded(n in proptest::num::u64::ANY) {
        let rule = PluralRule::parse(
            "nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : \
             n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);",
        )
        .unwrap();
        prop_assert!(rule.index(n) < rule.nplurals());
    }

    #[test]
    fn formatting_without_args_is_identity_modulo_percent(template in text_strategy()) {
        // With no arguments every placeholder is left as-is; only '%%'
        // collapses. Formatting the result again changes nothing.
        let once = format_positional(&template, &[]);
        let twice = format_positional(&once, &[]);
        // '%%' collapsed on the first pass may expose nothing new only if
        // the template had no adjacent escapes; compare via a fixpoint on
        // templates without '%%'.
        if !template.contains("%%") {
            prop_assert_eq!(&once, &template);
            prop_assert_eq!(&twice, &once);
        }
    }

    #[test]
    fn named_formatting_leaves_unknown_names(template in text_strategy()) {
        // '%%' collapses to '%' and can form new-looking placeholders when
        // rescanned, so restrict the property to escape-free templates.
        prop_assume!(!template.contains("%%"));
        let formatted = format_named(&template, &[("unrelated", "x")]);
        // Every placeholder of the input survives (none is named 'unrelated').
        let before = placeholders(&template);
        let after = placeholders(&formatted);
        prop_assert_eq!(after, before);
    }
}
