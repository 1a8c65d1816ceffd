//! Snapshot tests for report output.
//!
//! Full-text snapshots are kept to small documents; larger reports are
//! checked for the lines that matter.

use oas_changes::config::AppConfig;
use oas_changes::parsers::parse_document_str;
use oas_changes::pipeline::compare_documents;
use oas_changes::reports::{render_html, render_markdown, RenderConfig};
use oas_changes::DistributionResult;

const PETS: &str = "openapi: 3.1.0
info:
  title: chip
  version: '1'
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  name:
                    type: string
                  tags:
                    type: array
                    items:
                      type: string
";

fn compare(left: &str, right: &str) -> DistributionResult {
    let left = parse_document_str(left).unwrap();
    let right = parse_document_str(right).unwrap();
    compare_documents(&left, &right, &AppConfig::default()).unwrap()
}

#[test]
fn snapshot_title_change_markdown() {
    let right = PETS.replace("title: chip", "title: chop");
    let result = compare(PETS, &right);
    let md = render_markdown(&result, &right, &RenderConfig::default()).unwrap();
    insta::assert_snapshot!(md, @r###"
    # What Changed Report

    **1** changes: 0 added, 1 modified, 0 removed, **0** breaking.

    ## Summary

    | Object | Added | Modified | Removed | Breaking |
    | --- | ---: | ---: | ---: | ---: |
    | info | 0 | 1 | 0 | 0 |

    ## Changes

    ### Document Info

    `$.info`

    - **title** changed from _'chip'_ to _'chop'_
    "###);
}

#[test]
fn snapshot_title_change_statistics() {
    let right = PETS.replace("title: chip", "title: chop");
    let result = compare(PETS, &right);
    insta::assert_json_snapshot!(result.statistics, @r###"
    {
      "total": 1,
      "additions": 0,
      "modifications": 1,
      "removals": 0,
      "breaking": 0,
      "by_type": {
        "info": {
          "additions": 0,
          "modifications": 1,
          "removals": 0,
          "breaking": 0
        }
      }
    }
    "###);
}

#[test]
fn breaking_change_shows_context_and_badge() {
    let right = PETS.replace("                    type: string\n                  tags", "                    type: integer\n                  tags");
    assert_ne!(right, PETS);
    let result = compare(PETS, &right);
    let config = RenderConfig::default();
    let md = render_markdown(&result, &right, &config).unwrap();

    assert!(md.contains("**1** breaking."));
    assert!(md.contains("- **type** changed from _'string'_ to _'integer'_"));
    assert!(md.contains("`$.paths['/pets'].get.responses['200'].content['application/json'].schema.properties['name']`"));
    assert!(md.contains("```yaml"));
    let lines: Vec<&str> = md.lines().collect();
    let badge = lines
        .iter()
        .position(|l| l.trim() == config.breaking_badge)
        .expect("badge line");
    assert!(lines[badge - 1].trim().is_empty());
}

#[test]
fn added_property_is_rendered_as_block() {
    let right = PETS.replace(
        "                  tags:\n",
        "                  age:\n                    type: integer\n                    minimum: 0\n                  tags:\n",
    );
    let result = compare(PETS, &right);
    let md = render_markdown(&result, &right, &RenderConfig::default()).unwrap();
    assert!(md.contains("- **age** added"));
    assert!(md.contains("minimum: 0"));
}

#[test]
fn html_report_wraps_markdown() {
    let right = PETS.replace("title: chip", "title: <chop>");
    let result = compare(PETS, &right);
    let html = render_html(&result, &right, &RenderConfig::default()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Document Info"));
    assert!(html.contains("&lt;chop&gt;"));
    assert!(!html.contains("<chop>"));
    assert!(!html.contains("pb33f-example-start"));
}

#[test]
fn markdown_is_byte_identical_across_runs() {
    let right = PETS
        .replace("title: chip", "title: chop")
        .replace("description: ok", "description: fine");
    let config = RenderConfig::default();
    let first = render_markdown(&compare(PETS, &right), &right, &config).unwrap();
    let second = render_markdown(&compare(PETS, &right), &right, &config).unwrap();
    assert_eq!(first, second);
}
