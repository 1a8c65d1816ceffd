//! Markdown report generator.
//!
//! Walks the pruned change tree in document order. Each diff is rendered
//! once, at the deepest node it was distributed to.

use super::context::ContextExtractor;
use super::escape::{escape_code_span, escape_markdown_inline, escape_markdown_table};
use super::{RenderConfig, ReportError, ReportFormat, ReportGenerator, ReportInput};
use crate::changes::{ChangeNode, ChangeStatistics, NodeTreeDeduplicator};
use crate::diff::{ChangeKind, Diff};
use crate::graph::RuleSeverity;
use crate::model::ObjectKind;
use crate::parsers::SourceFormat;
use serde_json::Value;
use std::fmt::Write;

/// Heading of a report with changes.
pub const REPORT_TITLE: &str = "# What Changed Report";

/// The whole report when nothing changed.
pub const EMPTY_REPORT: &str = "# What Changed?\n\nNo changes detected…\n";

const EXAMPLE_START: &str = "<!-- pb33f-example-start:";
const EXAMPLE_END: &str = "<!-- pb33f-example-end:";

/// Markdown report generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReporter;

impl MarkdownReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReportGenerator for MarkdownReporter {
    fn generate(&self, input: &ReportInput<'_>, config: &RenderConfig) -> Result<String, ReportError> {
        render(input, config)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }
}

/// Render the Markdown report.
pub(crate) fn render(input: &ReportInput<'_>, config: &RenderConfig) -> Result<String, ReportError> {
    let stats = ChangeStatistics::from_changes(input.changes);
    let tree = match input.tree {
        Some(tree) if stats.has_changes() => tree,
        _ => return Ok(EMPTY_REPORT.to_string()),
    };

    let mut md = String::new();
    writeln!(md, "{REPORT_TITLE}")?;
    writeln!(md)?;
    if let Some(meta) = input.metadata {
        if let (Some(left), Some(right)) = (&meta.left_path, &meta.right_path) {
            writeln!(md, "Comparing `{}` with `{}`.", escape_code_span(left), escape_code_span(right))?;
            writeln!(md)?;
        }
        if let Some(at) = &meta.generated_at {
            writeln!(md, "_Generated by oas-changes {} at {at}._", meta.tool_version)?;
            writeln!(md)?;
        }
    }

    write_summary(&mut md, &stats)?;

    writeln!(md, "## Changes")?;
    let dedup = NodeTreeDeduplicator::from_tree(tree);
    let writer = DiffWriter {
        config,
        format: SourceFormat::sniff(input.source),
        context: ContextExtractor::new(input.source),
    };
    for node in tree.walk() {
        let diffs = dedup.unique_for(&node.id);
        for (path, object_type, section) in sections(&diffs) {
            writeln!(md)?;
            writeln!(md, "### {}", heading(node, path, object_type))?;
            writeln!(md)?;
            writeln!(md, "`{}`", escape_code_span(path))?;
            writeln!(md)?;
            for diff in section {
                writer.write(&mut md, diff)?;
            }
        }
        if !diffs.is_empty() {
            write_rule_results(&mut md, node)?;
        }
    }
    Ok(md)
}

fn write_summary(md: &mut String, stats: &ChangeStatistics) -> std::fmt::Result {
    writeln!(
        md,
        "**{}** changes: {} added, {} modified, {} removed, **{}** breaking.",
        stats.total, stats.additions, stats.modifications, stats.removals, stats.breaking
    )?;
    writeln!(md)?;
    writeln!(md, "## Summary")?;
    writeln!(md)?;
    writeln!(md, "| Object | Added | Modified | Removed | Breaking |")?;
    writeln!(md, "| --- | ---: | ---: | ---: | ---: |")?;
    for (object_type, counts) in &stats.by_type {
        writeln!(
            md,
            "| {} | {} | {} | {} | {} |",
            escape_markdown_table(object_type),
            counts.additions,
            counts.modifications,
            counts.removals,
            counts.breaking
        )?;
    }
    writeln!(md)
}

/// Diffs of one node grouped by reported path, in order of first appearance.
fn sections<'a>(diffs: &[&'a Diff]) -> Vec<(&'a str, &'a str, Vec<&'a Diff>)> {
    let mut out: Vec<(&str, &str, Vec<&Diff>)> = Vec::new();
    for &diff in diffs {
        match out
            .iter_mut()
            .find(|(p, t, _)| *p == diff.path && *t == diff.object_type)
        {
            Some((_, _, list)) => list.push(diff),
            None => out.push((diff.path.as_str(), diff.object_type.as_str(), vec![diff])),
        }
    }
    out
}

fn heading(node: &ChangeNode, path: &str, object_type: &str) -> String {
    if path == node.id {
        let title = node.kind.title();
        // keyed and indexed nodes are named by their label
        return if node.id.ends_with(']') {
            format!("{title} `{}`", escape_code_span(&node.label))
        } else {
            title.to_string()
        };
    }
    match ObjectKind::from_label(object_type) {
        Some(kind) => kind.title().to_string(),
        None => capitalize(object_type),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_rule_results(md: &mut String, node: &ChangeNode) -> std::fmt::Result {
    if node.rule_results.is_empty() {
        return Ok(());
    }
    writeln!(md)?;
    for result in &node.rule_results {
        let severity = match result.severity {
            RuleSeverity::Error => "error",
            RuleSeverity::Warn => "warning",
            RuleSeverity::Info => "info",
            RuleSeverity::Hint => "hint",
        };
        writeln!(
            md,
            "> **{severity}** `{}`: {}",
            escape_code_span(&result.rule_id),
            escape_markdown_inline(&result.message)
        )?;
    }
    Ok(())
}

/// A value as it appears in a change line.
enum Rendered {
    Inline(String),
    Fenced { lang: &'static str, body: String },
    Example(String),
}

struct DiffWriter<'a> {
    config: &'a RenderConfig,
    format: SourceFormat,
    context: ContextExtractor<'a>,
}

impl DiffWriter<'_> {
    fn write(&self, md: &mut String, diff: &Diff) -> Result<(), ReportError> {
        let name = escape_markdown_inline(&diff.property);
        let original = diff.original.as_ref().map(|v| self.value(&diff.property, v, diff)).transpose()?;
        let new = diff.new.as_ref().map(|v| self.value(&diff.property, v, diff)).transpose()?;

        let mut blocks: Vec<(Option<&str>, Rendered)> = Vec::new();
        match diff.kind {
            ChangeKind::Modified => match (original, new) {
                (Some(Rendered::Inline(a)), Some(Rendered::Inline(b))) => {
                    writeln!(md, "- **{name}** changed from {a} to {b}")?;
                }
                (a, b) => {
                    writeln!(md, "- **{name}** changed")?;
                    blocks.extend(a.map(|r| (Some("was"), r)));
                    blocks.extend(b.map(|r| (Some("now"), r)));
                }
            },
            kind if kind.is_addition() => match new {
                Some(Rendered::Inline(v)) => writeln!(md, "- **{name}** added: {v}")?,
                other => {
                    writeln!(md, "- **{name}** added")?;
                    blocks.extend(other.map(|r| (None, r)));
                }
            },
            _ => match original {
                Some(Rendered::Inline(v)) => writeln!(md, "- **{name}** removed (was {v})")?,
                other => {
                    writeln!(md, "- **{name}** removed")?;
                    blocks.extend(other.map(|r| (Some("was"), r)));
                }
            },
        }

        for (label, block) in blocks {
            if let Some(label) = label {
                writeln!(md)?;
                writeln!(md, "  _{label}:_")?;
            }
            match block {
                Rendered::Fenced { lang, body } => {
                    writeln!(md)?;
                    write_fence(md, lang, body.lines())?;
                }
                Rendered::Example(body) => {
                    let key = escape_code_span(&diff.property);
                    writeln!(md)?;
                    writeln!(md, "  {EXAMPLE_START}{key} -->")?;
                    md.push_str(&body);
                    writeln!(md, "  {EXAMPLE_END}{key} -->")?;
                }
                Rendered::Inline(v) => writeln!(md, "  {v}")?,
            }
        }

        if diff.breaking {
            // lines of a referenced file are not in the quoted source
            let line = diff.coordinates.new_line.filter(|_| diff.source.is_none());
            if let Some(snippet) = line.and_then(|l| self.context.around(l)) {
                writeln!(md)?;
                write_fence(md, self.context.format().fence(), snippet.lines.iter().map(String::as_str))?;
            }
            writeln!(md)?;
            writeln!(md, "  {}", self.config.breaking_badge)?;
            writeln!(md)?;
        }
        Ok(())
    }

    fn value(&self, property: &str, value: &Value, diff: &Diff) -> Result<Rendered, ReportError> {
        Ok(match value {
            Value::String(s) if looks_like_xml(s) => Rendered::Fenced {
                lang: "xml",
                body: s.trim().to_string(),
            },
            Value::String(s) => Rendered::Inline(format!("_'{}'_", escape_markdown_inline(s))),
            Value::Object(_) | Value::Array(_) if is_example(property, diff) => {
                let mut body = String::new();
                write_example(&mut body, value, 1)?;
                Rendered::Example(body)
            }
            Value::Object(_) | Value::Array(_) => Rendered::Fenced {
                lang: self.format.fence(),
                body: self.serialize(value)?,
            },
            scalar => Rendered::Inline(format!("_'{scalar}'_")),
        })
    }

    fn serialize(&self, value: &Value) -> Result<String, ReportError> {
        match self.format {
            SourceFormat::Yaml => serde_yaml::to_string(value)
                .map(|s| s.trim_end().to_string())
                .map_err(|e| ReportError::SerializationError(e.to_string())),
            SourceFormat::Json => serde_json::to_string_pretty(value)
                .map_err(|e| ReportError::SerializationError(e.to_string())),
        }
    }
}

fn looks_like_xml(s: &str) -> bool {
    let t = s.trim();
    t.starts_with('<') && t.ends_with('>') && t.len() > 2
}

fn is_example(property: &str, diff: &Diff) -> bool {
    matches!(property, "example" | "examples") || (diff.object_type == "example" && property == "value")
}

fn write_fence<'l>(
    md: &mut String,
    lang: &str,
    lines: impl Iterator<Item = &'l str>,
) -> std::fmt::Result {
    writeln!(md, "  ```{lang}")?;
    for line in lines {
        if line.is_empty() {
            writeln!(md)?;
        } else {
            writeln!(md, "  {line}")?;
        }
    }
    writeln!(md, "  ```")
}

/// Nested example values as a Markdown list, two spaces per level.
fn write_example(md: &mut String, value: &Value, level: usize) -> std::fmt::Result {
    let indent = "  ".repeat(level);
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                let key = escape_markdown_inline(key);
                match v {
                    Value::Object(_) | Value::Array(_) => {
                        writeln!(md, "{indent}- **{key}**:")?;
                        write_example(md, v, level + 1)?;
                    }
                    scalar => writeln!(md, "{indent}- **{key}**: {}", inline_scalar(scalar))?,
                }
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                match v {
                    Value::Object(_) | Value::Array(_) => {
                        writeln!(md, "{indent}- **[{i}]**:")?;
                        write_example(md, v, level + 1)?;
                    }
                    scalar => writeln!(md, "{indent}- {}", inline_scalar(scalar))?,
                }
            }
        }
        scalar => writeln!(md, "{indent}- {}", inline_scalar(scalar))?,
    }
    Ok(())
}

fn inline_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => format!("_'{}'_", escape_markdown_inline(s)),
        other => format!("_'{other}'_"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{Coordinates, DocumentChanges, InfoChanges};
    use crate::parsers::Position;
    use serde_json::json;

    fn node(id: &str, kind: ObjectKind, label: &str, diffs: Vec<Diff>) -> ChangeNode {
        ChangeNode {
            id: id.to_string(),
            id_hash: 0,
            parent_id: None,
            kind,
            label: label.to_string(),
            index: None,
            changes: vec![crate::changes::NodeChange {
                id: id.to_string(),
                id_hash: 0,
                object_type: kind.label().to_string(),
                path: None,
                index: None,
                diffs,
            }],
            render_changes: true,
            rule_results: Vec::new(),
            children: Vec::new(),
        }
    }

    fn report(diffs: Vec<Diff>, source: &str) -> String {
        let changes = DocumentChanges {
            info: Some(InfoChanges {
                changes: diffs.clone(),
                ..InfoChanges::default()
            }),
            ..DocumentChanges::default()
        };
        let tree = node("$.info", ObjectKind::Info, "info", diffs);
        let input = ReportInput {
            changes: &changes,
            tree: Some(&tree),
            source,
            metadata: None,
        };
        render(&input, &RenderConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_report() {
        let changes = DocumentChanges::default();
        let input = ReportInput {
            changes: &changes,
            tree: None,
            source: "",
            metadata: None,
        };
        assert_eq!(render(&input, &RenderConfig::default()).unwrap(), EMPTY_REPORT);
    }

    #[test]
    fn test_scalar_change_inline() {
        let diff = Diff::new("title", ChangeKind::Modified)
            .values(Some(json!("chip")), Some(json!("chop")))
            .attributed("$.info", "info");
        let md = report(vec![diff], "openapi: 3.1.0\n");
        assert!(md.starts_with(REPORT_TITLE));
        assert!(md.contains("### Document Info"));
        assert!(md.contains("- **title** changed from _'chip'_ to _'chop'_"));
    }

    #[test]
    fn test_badge_on_own_line_after_fence() {
        let source = "openapi: 3.1.0\ninfo:\n  title: a\n  x-meta:\n    a: 1\n";
        let diff = Diff::new("x-meta", ChangeKind::PropertyAdded)
            .values(None, Some(json!({"a": 1})))
            .at(Coordinates::new(None, Some(Position { line: 4, column: 3 })))
            .breaking(true)
            .attributed("$.info", "info");
        let md = report(vec![diff], source);
        let lines: Vec<&str> = md.lines().collect();
        let badge = lines.iter().rposition(|l| l.trim() == "💔 breaking").unwrap();
        let last_fence = lines.iter().rposition(|l| l.trim() == "```").unwrap();
        assert!(badge > last_fence);
        assert!(md.contains("  ```yaml\n  a: 1\n  ```"));
    }

    #[test]
    fn test_no_context_for_referenced_file_lines() {
        let source = "openapi: 3.1.0\ninfo:\n  title: a\n  version: '1'\n";
        let diff = Diff::new("type", ChangeKind::Modified)
            .values(Some(json!("string")), Some(json!("integer")))
            .at(Coordinates::new(None, Some(Position { line: 3, column: 3 })))
            .breaking(true)
            .attributed("$.info", "info")
            .sourced(Some("defs.yaml".to_string()));
        let md = report(vec![diff], source);
        assert!(md.contains("💔 breaking"));
        assert!(!md.contains("```"));
        assert!(!md.contains("title: a"));
    }

    #[test]
    fn test_xml_and_json_fences() {
        let diff = Diff::new("x-doc", ChangeKind::PropertyAdded)
            .values(None, Some(json!("<pet><name/></pet>")))
            .attributed("$.info", "info");
        assert!(report(vec![diff], "").contains("```xml"));

        let diff = Diff::new("x-list", ChangeKind::PropertyAdded)
            .values(None, Some(json!([1, 2])))
            .attributed("$.info", "info");
        assert!(report(vec![diff], "{\"openapi\": \"3.1.0\"}").contains("```json"));
    }

    #[test]
    fn test_nested_example_markers_and_indent() {
        let diff = Diff::new("example", ChangeKind::Modified)
            .values(Some(json!({"name": "rex"})), Some(json!({"name": "rex", "owner": {"id": 1}})))
            .attributed("$.info", "info");
        let md = report(vec![diff], "");
        assert!(md.contains("<!-- pb33f-example-start:example -->"));
        assert!(md.contains("<!-- pb33f-example-end:example -->"));
        assert!(md.contains("  - **owner**:\n    - **id**: _'1'_\n"));
    }

    #[test]
    fn test_override_heading() {
        let diff = Diff::new("servers", ChangeKind::ObjectAdded)
            .values(None, Some(json!({"url": "https://c"})))
            .attributed("$.servers", "servers");
        let mut tree = node("$", ObjectKind::Document, "document", vec![diff.clone()]);
        tree.changes[0].path = Some("$.servers".to_string());
        let changes = DocumentChanges {
            changes: vec![diff],
            ..DocumentChanges::default()
        };
        let input = ReportInput {
            changes: &changes,
            tree: Some(&tree),
            source: "openapi: 3.1.0\n",
            metadata: None,
        };
        let md = render(&input, &RenderConfig::default()).unwrap();
        assert!(md.contains("### Servers\n\n`$.servers`"));
        assert!(md.contains("url: https://c"));
    }
}
