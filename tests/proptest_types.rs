//! Property-based tests for core types.
//!
//! Ensures paths, statistics and the deduplication ledger keep their
//! invariants across random inputs.

use oas_changes::changes::{ChangeStatistics, DedupLedger};
use oas_changes::diff::{ChangeKind, Coordinates, Diff};
use oas_changes::graph::JsonPath;
use oas_changes::parsers::{parse_document_str, Position};
use oas_changes::reports::escape::{escape_html, escape_markdown_table};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Step {
    Field(String),
    Key(String),
    Index(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[a-zA-Z$][a-zA-Z0-9]{0,12}".prop_map(Step::Field),
        "\\PC{0,24}".prop_map(Step::Key),
        (0usize..1000).prop_map(Step::Index),
    ]
}

fn kind() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::PropertyAdded),
        Just(ChangeKind::PropertyRemoved),
        Just(ChangeKind::ObjectAdded),
        Just(ChangeKind::ObjectRemoved),
        Just(ChangeKind::Modified),
    ]
}

fn diff() -> impl Strategy<Value = Diff> {
    (
        "[a-z]{1,8}",
        kind(),
        any::<bool>(),
        prop_oneof![Just("info"), Just("schema"), Just("operation"), Just("servers")],
        prop::option::of((1usize..50, 1usize..20)),
    )
        .prop_map(|(property, kind, breaking, object_type, at)| {
            let position = at.map(|(line, column)| Position { line, column });
            Diff::new(property, kind)
                .at(Coordinates::new(None, position))
                .breaking(breaking)
                .attributed("$", object_type)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn path_display_parses_back(steps in prop::collection::vec(step(), 0..8)) {
        let path = steps.iter().fold(JsonPath::root(), |p, s| match s {
            Step::Field(name) => p.field(name),
            Step::Key(key) => p.key(key),
            Step::Index(i) => p.index(*i),
        });
        let text = path.to_string();
        prop_assert!(text.starts_with('$'));
        prop_assert_eq!(JsonPath::parse(&text), Some(path.clone()));
        prop_assert_eq!(path.depth(), steps.len());
    }

    #[test]
    fn component_reference_maps_to_keyed_id(name in "[A-Za-z0-9 ._'-]{1,20}") {
        let path = JsonPath::from_reference(&format!("#/components/schemas/{name}")).unwrap();
        let expected = JsonPath::root().field("components").field("schemas").key(&name);
        prop_assert_eq!(path, expected);
    }

    #[test]
    fn statistics_partition_total(diffs in prop::collection::vec(diff(), 0..40)) {
        let stats = ChangeStatistics::from_diffs(&diffs);
        prop_assert_eq!(stats.total, diffs.len());
        prop_assert_eq!(stats.additions + stats.modifications + stats.removals, stats.total);
        prop_assert_eq!(stats.breaking, diffs.iter().filter(|d| d.breaking).count());
        let by_type: usize = stats.by_type.values().map(|c| c.total()).sum();
        prop_assert_eq!(by_type, stats.total);
        prop_assert_eq!(stats.has_changes(), !diffs.is_empty());
    }

    #[test]
    fn ledger_admits_each_location_once(diffs in prop::collection::vec(diff(), 0..40)) {
        let mut ledger = DedupLedger::new();
        let mut locations = HashSet::new();
        for diff in &diffs {
            let admitted = ledger.observe(diff);
            if diff.coordinates.is_unknown() {
                prop_assert!(admitted);
            } else {
                prop_assert_eq!(admitted, locations.insert(diff.location_hash()));
            }
        }
        prop_assert_eq!(ledger.len(), locations.len());
        let located = diffs.iter().filter(|d| !d.coordinates.is_unknown()).count();
        prop_assert_eq!(ledger.dropped(), located - locations.len());
    }

    #[test]
    fn escaped_html_has_no_markup(s in "\\PC{0,200}") {
        let escaped = escape_html(&s);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
    }

    #[test]
    fn escaped_table_cell_stays_in_cell(s in "\\PC{0,200}") {
        let escaped = escape_markdown_table(&s);
        prop_assert!(!escaped.contains('\n'));
        prop_assert_eq!(escaped.matches('|').count(), escaped.matches("\\|").count());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn parser_doesnt_panic(s in "\\PC{0,400}") {
        let _ = parse_document_str(&s);
    }

    #[test]
    fn parsed_title_is_kept(title in "[a-zA-Z][a-zA-Z0-9 ]{0,30}") {
        let doc = format!("openapi: 3.1.0\ninfo:\n  title: '{title}'\n  version: '1'\n");
        let parsed = parse_document_str(&doc).unwrap();
        let info = parsed.document.info.unwrap();
        prop_assert_eq!(info.title.as_deref(), Some(title.as_str()));
    }
}
