//! Integration tests for oas-changes
//!
//! These tests verify end-to-end functionality of document parsing, the
//! diff engine, change distribution and report generation.

use oas_changes::{
    changes::{DistributionConfig, DistributionResult, Session},
    config::{AppConfig, DiffPaths},
    diff::{ChangeKind, Changes, DiffEngine},
    graph::SemanticGraph,
    parsers::{parse_document, parse_document_str},
    pipeline,
    reports::{render_html, render_markdown, RenderConfig},
};
use std::path::Path;

// ============================================================================
// Test Fixtures
// ============================================================================

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
}

fn distribute(left: &str, right: &str) -> DistributionResult {
    let left = parse_document_str(left).expect("Failed to parse left document");
    let right = parse_document_str(right).expect("Failed to parse right document");
    let changes = DiffEngine::new().compare(&left, &right);
    let mut graph = SemanticGraph::build(&right.document);
    Session::new(DistributionConfig::default())
        .distribute(&mut graph, &changes)
        .expect("Distribution failed")
}

/// The first pirates fixture with a single substitution applied.
fn pirates_with(from: &str, to: &str) -> (String, String) {
    let left = fixture("pirates-v1.yaml");
    assert!(left.contains(from), "fixture does not contain {from:?}");
    let right = left.replace(from, to);
    (left, right)
}

// ============================================================================
// Parser Tests
// ============================================================================

mod parser_tests {
    use super::*;

    #[test]
    fn test_parse_fixture() {
        let parsed = parse_document(&fixture_path("pirates-v1.yaml")).expect("Failed to parse");
        assert_eq!(parsed.document.openapi, "3.1.0");
        assert!(parsed.document.info.as_ref().is_some_and(|i| i.title.as_deref() == Some("chip")));
        assert_eq!(parsed.document.servers.len(), 2);
    }

    #[test]
    fn test_reject_swagger_document() {
        assert!(parse_document(&fixture_path("not-openapi.json")).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(parse_document(&fixture_path("does-not-exist.yaml")).is_err());
    }
}

// ============================================================================
// End-to-end Scenarios
// ============================================================================

mod scenario_tests {
    use super::*;

    #[test]
    fn test_title_change() {
        let (left, right) = pirates_with("title: chip", "title: chop");
        let result = distribute(&left, &right);

        let diffs = result.changes.all_changes();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].property, "title");
        assert_eq!(diffs[0].kind, ChangeKind::Modified);

        let tree = result.tree.as_ref().expect("tree");
        let info = tree.find("$.info").expect("info node");
        assert_eq!(info.diffs().count(), 1);
        assert_eq!(info.changes[0].id, "$.info");

        let md = render_markdown(&result, &right, &RenderConfig::default()).unwrap();
        assert!(md.contains("### Document Info"));
        assert!(md.contains("chop"));
    }

    #[test]
    fn test_contact_extension() {
        let (left, right) = pirates_with(
            "    name: hello\n",
            "    name: there\n    url: http://fresh.com\n",
        );
        let result = distribute(&left, &right);
        assert_eq!(result.statistics.total, 2);

        let tree = result.tree.as_ref().expect("tree");
        let contact = tree.find("$.info.contact").expect("contact node");
        let mut found: Vec<(&str, ChangeKind)> =
            contact.diffs().map(|d| (d.property.as_str(), d.kind)).collect();
        found.sort_by(|a, b| a.0.cmp(b.0));
        assert_eq!(
            found,
            vec![("name", ChangeKind::Modified), ("url", ChangeKind::PropertyAdded)]
        );
        assert!(contact.diffs().all(|d| d.path == "$.info.contact"));
    }

    #[test]
    fn test_server_list_extended() {
        let (left, right) = pirates_with(
            "  - url: https://quobix.com\n",
            "  - url: https://quobix.com\n  - url: https://pb33f.io/libopenapi\n",
        );
        let result = distribute(&left, &right);
        assert_eq!(result.statistics.total, 1);
        assert_eq!(result.statistics.additions, 1);
        assert_eq!(result.statistics.modifications, 0);

        let tree = result.tree.as_ref().expect("tree");
        let change = tree
            .walk()
            .into_iter()
            .flat_map(|n| n.changes.iter())
            .find(|c| c.reported_path() == "$.servers")
            .expect("change reported under $.servers");
        assert_eq!(change.diffs.len(), 1);
        assert_eq!(change.diffs[0].kind, ChangeKind::ObjectAdded);
        assert_eq!(change.diffs[0].path, "$.servers");

        let md = render_markdown(&result, &right, &RenderConfig::default()).unwrap();
        assert!(md.contains("https://pb33f.io/libopenapi"));
        assert!(!md.contains("https://quobix.com"));
    }

    #[test]
    fn test_schema_property_type_change_is_breaking() {
        let (left, right) = pirates_with("type: boolean", "type: string");
        let result = distribute(&left, &right);

        let id = "$.paths['/v3/{jollyRoger}'].get.responses['200'].content['application/json'].schema.properties['misty']";
        let tree = result.tree.as_ref().expect("tree");
        let misty = tree.find(id).expect("misty node");
        let diff = misty.diffs().next().expect("misty diff");
        assert_eq!(diff.property, "type");
        assert_eq!(diff.kind, ChangeKind::Modified);
        assert_eq!(diff.path, id);
        assert!(diff.breaking);
        assert!(result.statistics.has_breaking());

        let config = RenderConfig::default();
        let md = render_markdown(&result, &right, &config).unwrap();
        assert!(md.lines().any(|l| l.trim() == config.breaking_badge));
    }

    #[test]
    fn test_referenced_definition_change_reaches_use_sites() {
        let result = distribute(&fixture("refs-v1.yaml"), &fixture("refs-v2.yaml"));
        assert_eq!(result.statistics.total, 1);
        assert!(result.build_errors.is_empty());

        let use_site = "$.paths['/test'].get.responses['200'].content['application/json'].schema.properties['PropC']";
        let other_site = "$.paths['/other'].get.responses['200'].content['application/json'].schema";
        let definition = "$.components.schemas['PropC']";

        assert_eq!(result.changed_nodes[0].id, use_site);
        assert_eq!(result.changed_edges.len() + 1, result.changed_nodes.len());

        let tree = result.tree.as_ref().expect("tree");
        for id in [use_site, other_site, definition] {
            let node = tree.find(id).unwrap_or_else(|| panic!("missing {id}"));
            assert_eq!(node.changes.len(), 1, "{id}");
            assert_eq!(node.diffs().count(), 1, "{id}");
            assert_eq!(node.changes[0].diffs[0].property, "description");
        }
    }

    #[test]
    fn test_nested_definition_change_has_use_site_nodes() {
        let left = fixture("refs-v1.yaml");
        let right = left.replace("          type: string", "          type: integer");
        assert_ne!(left, right);
        let result = distribute(&left, &right);
        assert_eq!(result.statistics.total, 1);
        assert!(result.build_errors.is_empty());

        let sites = [
            "$.paths['/test'].get.responses['200'].content['application/json'].schema.properties['PropC'].properties['value']",
            "$.paths['/other'].get.responses['200'].content['application/json'].schema.properties['value']",
            "$.components.schemas['PropC'].properties['value']",
        ];
        assert_eq!(result.changed_nodes[0].id, sites[0]);
        let tree = result.tree.as_ref().expect("tree");
        for id in sites {
            let node = tree.find(id).unwrap_or_else(|| panic!("missing {id}"));
            let diff = node.diffs().next().expect("diff");
            assert_eq!(diff.property, "type");
            assert_eq!(diff.path, id);
            assert!(diff.breaking);
        }
    }

    #[test]
    fn test_removed_response_reported_at_its_code() {
        let (left, right) = pirates_with("        '200':\n", "        '299':\n");
        let result = distribute(&left, &right);
        let tree = result.tree.as_ref().expect("tree");
        let removed = tree
            .walk()
            .into_iter()
            .flat_map(|n| n.changes.iter())
            .find(|c| c.diffs.iter().any(|d| d.kind == ChangeKind::ObjectRemoved))
            .expect("removal recorded");
        assert!(removed.id.ends_with(".responses"));
        assert_eq!(removed.reported_path(), format!("{}['200']", removed.id));
        assert_eq!(removed.object_type, "response");
        assert_eq!(removed.diffs[0].property, "200");
    }

    #[test]
    fn test_unchanged_extension_does_not_appear() {
        let (left, right) = pirates_with("x-modified: before", "x-modified: after");
        let result = distribute(&left, &right);

        let tree = result.tree.as_ref().expect("tree");
        assert_eq!(tree.id, "$");
        let root: Vec<&str> = tree.diffs().map(|d| d.property.as_str()).collect();
        assert_eq!(root, vec!["x-modified"]);
        assert!(result
            .changes
            .all_changes()
            .iter()
            .all(|d| d.property != "x-unchanged"));

        let md = render_markdown(&result, &right, &RenderConfig::default()).unwrap();
        assert!(!md.contains("x-unchanged"));
    }
}

// ============================================================================
// Pipeline Tests
// ============================================================================

mod pipeline_tests {
    use super::*;
    use oas_changes::pipeline::exit_codes;

    fn pirates() -> DiffPaths {
        DiffPaths::new(fixture_path("pirates-v1.yaml"), fixture_path("pirates-v2.yaml"))
    }

    #[test]
    fn test_compare_files() {
        let comparison = pipeline::compare_files(&pirates(), &AppConfig::default()).unwrap();
        let stats = &comparison.result.statistics;
        assert_eq!(stats.total, 6);
        assert_eq!(stats.additions, 2);
        assert_eq!(stats.modifications, 4);
        assert_eq!(stats.removals, 0);
        assert!(comparison.has_breaking());
        assert!(comparison.paths.is_some());
    }

    #[test]
    fn test_compare_identical_files() {
        let paths = DiffPaths::new(fixture_path("refs-v1.yaml"), fixture_path("refs-v1.yaml"));
        let comparison = pipeline::compare_files(&paths, &AppConfig::default()).unwrap();
        assert!(!comparison.has_changes());
        assert!(comparison.result.tree.is_none());

        let report = pipeline::render_report(&comparison, &AppConfig::default()).unwrap();
        assert_eq!(report, oas_changes::reports::EMPTY_REPORT);
    }

    #[test]
    fn test_definition_in_referenced_file() {
        let paths = DiffPaths::new(
            fixture_path("multi/v1/openapi.yaml"),
            fixture_path("multi/v2/openapi.yaml"),
        );
        let comparison = pipeline::compare_files(&paths, &AppConfig::default()).unwrap();
        assert!(comparison.right.catalogue.file("defs.yaml").is_some());

        let result = &comparison.result;
        assert_eq!(result.statistics.total, 1);
        assert_eq!(result.changed_nodes.len(), 9);
        assert_eq!(result.changed_edges.len(), 8);
        assert_eq!(
            result.changed_nodes[0].id,
            "$.paths['/test'].get.responses['200'].content['application/json'].schema.properties['PropC']"
        );

        let diffs = result.changes.all_changes();
        assert_eq!(diffs[0].property, "description");
        assert_eq!(diffs[0].source.as_deref(), Some("defs.yaml"));
        assert_eq!(diffs[0].coordinates.new_line, Some(3));

        let report = pipeline::render_report(&comparison, &AppConfig::default()).unwrap();
        assert!(report.contains("kept in a file"));
    }

    #[test]
    fn test_compare_files_missing_input() {
        let paths = DiffPaths::new(fixture_path("pirates-v1.yaml"), fixture_path("missing.yaml"));
        let err = pipeline::compare_files(&paths, &AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }

    #[test]
    fn test_fail_on_breaking_exit_code() {
        let config = AppConfig::builder().fail_on_breaking(true).build();
        let comparison = pipeline::compare_files(&pirates(), &config).unwrap();
        assert_eq!(
            pipeline::exit_code(&comparison, &config.behavior),
            exit_codes::BREAKING_CHANGES
        );
    }

    #[test]
    fn test_reports_are_deterministic() {
        let config = AppConfig::default();
        let first = pipeline::compare_files(&pirates(), &config).unwrap();
        let second = pipeline::compare_files(&pirates(), &config).unwrap();
        let source = &first.right.raw;
        assert_eq!(
            render_markdown(&first.result, source, &config.report).unwrap(),
            render_markdown(&second.result, source, &config.report).unwrap()
        );
        assert_eq!(
            render_html(&first.result, source, &config.report).unwrap(),
            render_html(&second.result, source, &config.report).unwrap()
        );
    }

    #[test]
    fn test_write_report_to_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("changes.md");
        let config = AppConfig::builder()
            .output_file(Some(out.clone()))
            .quiet(true)
            .build();
        let comparison = pipeline::compare_files(&pirates(), &config).unwrap();
        pipeline::output_report(&comparison, &config).unwrap();
        let written = std::fs::read_to_string(out).unwrap();
        assert!(written.starts_with("# What Changed Report"));
        assert!(written.contains("misty"));
    }
}
