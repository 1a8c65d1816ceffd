//! Source context around a changed line of the right document.

use crate::parsers::SourceFormat;
use std::sync::OnceLock;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width a context line is trimmed to.
pub const DEFAULT_MAX_WIDTH: usize = 100;

/// Lines quoted from the source around one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// 1-based line number of `lines[0]`
    pub start_line: usize,
    /// 1-based line number the snippet was taken around
    pub focus_line: usize,
    pub lines: Vec<String>,
}

/// Quotes lines of a document. JSON sources are pretty-printed first so
/// line numbers agree with the positions recorded while parsing.
#[derive(Debug)]
pub struct ContextExtractor<'a> {
    source: &'a str,
    format: SourceFormat,
    max_width: usize,
    lines: OnceLock<Vec<String>>,
}

impl<'a> ContextExtractor<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            format: SourceFormat::sniff(source),
            max_width: DEFAULT_MAX_WIDTH,
            lines: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width.max(1);
        self
    }

    #[must_use]
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Lines either side of the focus line.
    #[must_use]
    pub fn radius(&self) -> usize {
        match self.format {
            SourceFormat::Yaml => 2,
            SourceFormat::Json => 4,
        }
    }

    fn lines(&self) -> &[String] {
        self.lines.get_or_init(|| match self.format {
            SourceFormat::Yaml => split(self.source),
            SourceFormat::Json => {
                match serde_json::from_str::<serde_json::Value>(self.source)
                    .and_then(|v| serde_json::to_string_pretty(&v))
                {
                    Ok(pretty) => split(&pretty),
                    Err(e) => {
                        tracing::debug!(error = %e, "context source is not valid JSON, quoting raw lines");
                        split(self.source)
                    }
                }
            }
        })
    }

    /// The snippet around 1-based `line`, or `None` past the end.
    #[must_use]
    pub fn around(&self, line: usize) -> Option<Snippet> {
        let lines = self.lines();
        if line == 0 || line > lines.len() {
            return None;
        }
        let radius = self.radius();
        let start = line.saturating_sub(radius).max(1);
        let end = (line + radius).min(lines.len());
        let window = &lines[start - 1..end];

        let indent = window
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.len() - l.trim_start_matches(' ').len())
            .min()
            .unwrap_or(0);
        let lines = window
            .iter()
            .map(|l| {
                let body = l.get(indent..).unwrap_or_else(|| l.trim_start());
                truncate(body, self.max_width)
            })
            .collect();

        Some(Snippet {
            start_line: start,
            focus_line: line,
            lines,
        })
    }
}

fn split(text: &str) -> Vec<String> {
    text.lines().map(|l| l.trim_end().to_string()).collect()
}

/// Cut `line` to `width` display columns, marking the cut with `…`.
fn truncate(line: &str, width: usize) -> String {
    if line.width() <= width {
        return line.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in line.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "openapi: 3.1.0
info:
  title: chip
  contact:
    name: hello
    url: http://fresh.com
  version: '1'
paths: {}
";

    #[test]
    fn test_yaml_snippet_removes_common_indent() {
        let extractor = ContextExtractor::new(YAML);
        let snippet = extractor.around(5).unwrap();
        assert_eq!(snippet.start_line, 3);
        assert_eq!(snippet.focus_line, 5);
        assert_eq!(
            snippet.lines,
            vec![
                "title: chip",
                "contact:",
                "  name: hello",
                "  url: http://fresh.com",
                "version: '1'",
            ]
        );
    }

    #[test]
    fn test_snippet_clamped_at_edges() {
        let extractor = ContextExtractor::new(YAML);
        let first = extractor.around(1).unwrap();
        assert_eq!(first.start_line, 1);
        assert_eq!(first.lines.len(), 3);
        assert!(extractor.around(99).is_none());
        assert!(extractor.around(0).is_none());
    }

    #[test]
    fn test_json_is_pretty_printed() {
        let extractor = ContextExtractor::new(r#"{"openapi":"3.1.0","info":{"title":"chip"}}"#);
        assert_eq!(extractor.format(), SourceFormat::Json);
        assert_eq!(extractor.radius(), 4);
        let snippet = extractor.around(4).unwrap();
        assert!(snippet.lines.iter().any(|l| l.contains("\"title\": \"chip\"")));
    }

    #[test]
    fn test_invalid_json_falls_back_to_raw_lines() {
        let extractor = ContextExtractor::new("{ not json\n  at all\n");
        let snippet = extractor.around(2).unwrap();
        assert_eq!(snippet.lines, vec!["{ not json", "  at all"]);
    }

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("日本語テキスト", 5), "日本…");
        assert_eq!(truncate("short", 10), "short");
    }
}
