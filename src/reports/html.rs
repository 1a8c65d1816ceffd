//! HTML report generator.
//!
//! Renders the Markdown report and converts it line by line into a
//! standalone page. The converter understands the subset of Markdown the
//! Markdown renderer emits: headings, tables, nested lists, fenced blocks,
//! code spans, strong and emphasis.

use super::escape::{escape_html, escape_html_attr};
use super::markdown;
use super::types::NestedListStrategy;
use super::{RenderConfig, ReportError, ReportFormat, ReportGenerator, ReportInput};
use crate::model::ObjectKind;
use regex::Regex;
use std::fmt::Write;

/// HTML report generator
#[derive(Debug, Clone)]
pub struct HtmlReporter {
    /// Include inline CSS
    include_styles: bool,
    title: String,
}

impl HtmlReporter {
    /// Create a new HTML reporter
    #[must_use]
    pub fn new() -> Self {
        Self {
            include_styles: true,
            title: "What Changed Report".to_string(),
        }
    }

    #[must_use]
    pub fn without_styles(mut self) -> Self {
        self.include_styles = false;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn get_styles(&self) -> &'static str {
        r#"
        <style>
            :root {
                --bg-color: #1e1e2e;
                --text-color: #cdd6f4;
                --accent-color: #89b4fa;
                --success-color: #a6e3a1;
                --warning-color: #f9e2af;
                --error-color: #f38ba8;
                --border-color: #45475a;
                --card-bg: #313244;
            }

            body {
                font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
                background-color: var(--bg-color);
                color: var(--text-color);
                margin: 0;
                padding: 20px;
                line-height: 1.6;
            }

            .container {
                max-width: 1200px;
                margin: 0 auto;
            }

            h1, h2, h3 {
                color: var(--accent-color);
            }

            table {
                border-collapse: collapse;
                margin-bottom: 30px;
                background-color: var(--card-bg);
            }

            th, td {
                padding: 8px 15px;
                text-align: left;
                border-bottom: 1px solid var(--border-color);
            }

            th {
                background-color: #45475a;
                font-weight: 600;
            }

            pre {
                background-color: var(--card-bg);
                border: 1px solid var(--border-color);
                border-radius: 6px;
                padding: 10px 14px;
                overflow-x: auto;
            }

            code {
                font-family: 'JetBrains Mono', Menlo, monospace;
                font-size: 0.9em;
            }

            .breaking {
                display: inline-block;
                padding: 2px 8px;
                border-radius: 4px;
                font-size: 0.85em;
                font-weight: 500;
                background-color: rgba(243, 139, 168, 0.2);
                color: var(--error-color);
            }

            .icon {
                margin-right: 6px;
            }
        </style>
        "#
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for HtmlReporter {
    fn generate(&self, input: &ReportInput<'_>, config: &RenderConfig) -> Result<String, ReportError> {
        let md = markdown::render(input, config)?;
        let body = HtmlConverter::new(config)?.convert(&md)?;

        let mut html = String::new();
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html lang=\"en\">")?;
        writeln!(html, "<head>")?;
        writeln!(html, "<meta charset=\"UTF-8\">")?;
        writeln!(html, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
        writeln!(html, "<title>{}</title>", escape_html(&self.title))?;
        if self.include_styles {
            writeln!(html, "{}", self.get_styles())?;
        }
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<div class=\"container\">")?;
        html.push_str(&body);
        writeln!(html, "</div>")?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;
        Ok(html)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }
}

/// Markdown to HTML conversion for report output.
pub struct HtmlConverter<'a> {
    config: &'a RenderConfig,
    markers: Regex,
    code: Regex,
    strong: Regex,
    emphasis: Regex,
    escaped: Regex,
}

#[derive(Default)]
struct State {
    /// Indent of every open `<ul>`
    lists: Vec<usize>,
    table_rows: usize,
    paragraph: Vec<String>,
    fence: Option<usize>,
}

impl<'a> HtmlConverter<'a> {
    pub fn new(config: &'a RenderConfig) -> Result<Self, ReportError> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|e| ReportError::TemplateError(e.to_string()));
        Ok(Self {
            config,
            markers: compile(r"(?m)^[ \t]*<!-- pb33f-example-(?:start|end):[^>]*-->[ \t]*\r?\n?")?,
            code: compile(r"`([^`]+)`")?,
            strong: compile(r"\*\*([^*]+)\*\*")?,
            emphasis: compile(r"(^|[\s(])_([^_]+)_")?,
            escaped: compile(r"\\(&lt;|&gt;|[*_`\[\]#|])")?,
        })
    }

    /// Remove the example start and end markers.
    #[must_use]
    pub fn strip_markers(&self, md: &str) -> String {
        self.markers.replace_all(md, "").into_owned()
    }

    pub fn convert(&self, md: &str) -> Result<String, ReportError> {
        let md = self.strip_markers(md);
        let mut out = String::new();
        let mut state = State::default();

        for line in md.lines() {
            let trimmed = line.trim_start();
            let indent = line.len() - trimmed.len();

            if let Some(fence_indent) = state.fence {
                if trimmed.trim_end() == "```" {
                    writeln!(out, "</code></pre>")?;
                    state.fence = None;
                } else {
                    let body = line.get(fence_indent..).unwrap_or(trimmed);
                    writeln!(out, "{}", escape_html(body))?;
                }
                continue;
            }

            if let Some(lang) = trimmed.strip_prefix("```") {
                self.flush_paragraph(&mut out, &mut state)?;
                self.close_table(&mut out, &mut state)?;
                let keep_in_list = self.config.html.nested_list_fix
                    && self.config.html.nested_list_strategy == NestedListStrategy::Inline;
                if !keep_in_list {
                    self.close_lists(&mut out, &mut state, 0)?;
                }
                let class = if lang.is_empty() {
                    String::new()
                } else {
                    format!(" class=\"language-{}\"", escape_html_attr(lang.trim()))
                };
                write!(out, "<pre><code{class}>")?;
                writeln!(out)?;
                state.fence = Some(indent);
                continue;
            }

            if trimmed.is_empty() {
                self.flush_paragraph(&mut out, &mut state)?;
                self.close_table(&mut out, &mut state)?;
                continue;
            }

            if let Some((level, text)) = heading(trimmed) {
                self.flush_paragraph(&mut out, &mut state)?;
                self.close_table(&mut out, &mut state)?;
                self.close_lists(&mut out, &mut state, 0)?;
                let icon = if level == 3 && self.config.html.object_icons {
                    icon_for(text)
                        .map(|i| format!("<span class=\"icon\">{i}</span>"))
                        .unwrap_or_default()
                } else {
                    String::new()
                };
                writeln!(
                    out,
                    "<h{level} class=\"{}\">{icon}{}</h{level}>",
                    escape_html_attr(&self.config.html.heading_class),
                    self.inline(text)
                )?;
                continue;
            }

            if trimmed.starts_with('|') {
                self.flush_paragraph(&mut out, &mut state)?;
                self.close_lists(&mut out, &mut state, 0)?;
                self.table_row(&mut out, &mut state, trimmed)?;
                continue;
            }

            if trimmed.trim_end() == self.config.breaking_badge {
                self.flush_paragraph(&mut out, &mut state)?;
                writeln!(
                    out,
                    "<span class=\"{}\">{}</span>",
                    escape_html_attr(&self.config.breaking_class),
                    escape_html(&self.config.breaking_badge)
                )?;
                continue;
            }

            if let Some(item) = trimmed.strip_prefix("- ") {
                self.flush_paragraph(&mut out, &mut state)?;
                self.list_item(&mut out, &mut state, indent, item)?;
                continue;
            }

            if self.config.html.allow_raw_html && trimmed.starts_with('<') {
                self.flush_paragraph(&mut out, &mut state)?;
                writeln!(out, "{trimmed}")?;
                continue;
            }

            if !state.lists.is_empty() && indent == 0 {
                self.close_lists(&mut out, &mut state, 0)?;
            }
            state.paragraph.push(self.inline(trimmed.trim_end()));
        }

        self.flush_paragraph(&mut out, &mut state)?;
        self.close_table(&mut out, &mut state)?;
        self.close_lists(&mut out, &mut state, 0)?;
        if state.fence.is_some() {
            writeln!(out, "</code></pre>")?;
        }
        Ok(out)
    }

    /// Inline Markdown of one line.
    fn inline(&self, text: &str) -> String {
        let escaped = if self.config.html.allow_raw_html {
            text.to_string()
        } else {
            escape_html(text)
        };
        let with_entities = self.escaped.replace_all(&escaped, |caps: &regex::Captures<'_>| {
            match &caps[1] {
                "&lt;" => "&lt;".to_string(),
                "&gt;" => "&gt;".to_string(),
                other => format!("&#{};", u32::from(other.chars().next().unwrap_or(' '))),
            }
        });
        let coded = self.code.replace_all(&with_entities, "<code>$1</code>");
        let strong = self.strong.replace_all(&coded, "<strong>$1</strong>");
        self.emphasis
            .replace_all(&strong, "$1<em>$2</em>")
            .into_owned()
    }

    fn flush_paragraph(&self, out: &mut String, state: &mut State) -> Result<(), ReportError> {
        if state.paragraph.is_empty() {
            return Ok(());
        }
        writeln!(out, "<p>{}</p>", state.paragraph.join(" "))?;
        state.paragraph.clear();
        Ok(())
    }

    fn close_table(&self, out: &mut String, state: &mut State) -> Result<(), ReportError> {
        if state.table_rows > 0 {
            writeln!(out, "</table>")?;
            state.table_rows = 0;
        }
        Ok(())
    }

    fn table_row(&self, out: &mut String, state: &mut State, row: &str) -> Result<(), ReportError> {
        let cells = split_row(row);
        if cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':')))
        {
            return Ok(());
        }
        let tag = if state.table_rows == 0 {
            writeln!(out, "<table>")?;
            "th"
        } else {
            "td"
        };
        state.table_rows += 1;
        write!(out, "<tr>")?;
        for cell in cells {
            write!(out, "<{tag}>{}</{tag}>", self.inline(&cell))?;
        }
        writeln!(out, "</tr>")?;
        Ok(())
    }

    fn list_item(
        &self,
        out: &mut String,
        state: &mut State,
        indent: usize,
        text: &str,
    ) -> Result<(), ReportError> {
        self.close_lists(out, state, indent + 1)?;
        match state.lists.last() {
            Some(&open) if open == indent => writeln!(out, "</li>")?,
            _ => {
                writeln!(out, "<ul>")?;
                state.lists.push(indent);
            }
        }
        write!(out, "<li>{}", self.inline(text.trim_end()))?;
        writeln!(out)?;
        Ok(())
    }

    /// Close every open list indented at `min_indent` or deeper.
    fn close_lists(&self, out: &mut String, state: &mut State, min_indent: usize) -> Result<(), ReportError> {
        while state.lists.last().is_some_and(|&i| i >= min_indent) {
            state.lists.pop();
            writeln!(out, "</li>")?;
            writeln!(out, "</ul>")?;
        }
        Ok(())
    }
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    line[level..].strip_prefix(' ').map(|text| (level, text.trim_end()))
}

/// Cells of a table row, with escaped pipes kept inside their cell.
fn split_row(row: &str) -> Vec<String> {
    let inner = row.trim().trim_start_matches('|');
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push_str("\\|");
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

fn icon_for(heading: &str) -> Option<&'static str> {
    let title = heading.split(" `").next().unwrap_or(heading);
    let kind = ObjectKind::ALL.into_iter().find(|k| k.title() == title)?;
    Some(match kind {
        ObjectKind::Document | ObjectKind::Info | ObjectKind::Contact | ObjectKind::License => "📄",
        ObjectKind::Paths | ObjectKind::PathItem | ObjectKind::Callback => "🛣️",
        ObjectKind::Operation => "⚙️",
        ObjectKind::Parameter | ObjectKind::Header => "🔧",
        ObjectKind::RequestBody | ObjectKind::MediaType | ObjectKind::Encoding => "📦",
        ObjectKind::Responses | ObjectKind::Response | ObjectKind::Link => "📬",
        ObjectKind::Example => "🧪",
        ObjectKind::Schema | ObjectKind::Discriminator | ObjectKind::Xml => "🧩",
        ObjectKind::ExternalDoc | ObjectKind::Tag => "🏷️",
        ObjectKind::Components => "🗂️",
        ObjectKind::SecurityScheme
        | ObjectKind::OAuthFlows
        | ObjectKind::OAuthFlow
        | ObjectKind::SecurityRequirement => "🔐",
        ObjectKind::Server | ObjectKind::ServerVariable => "🖥️",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(md: &str, config: &RenderConfig) -> String {
        HtmlConverter::new(config).unwrap().convert(md).unwrap()
    }

    #[test]
    fn test_markers_removed() {
        let md = "- **example** changed\n\n  <!-- pb33f-example-start:example -->\n  - **name**: _'rex'_\n  <!-- pb33f-example-end:example -->\n";
        let html = convert(md, &RenderConfig::default());
        assert!(!html.contains("pb33f-example"));
        assert!(html.contains("<strong>name</strong>"));
        assert!(html.contains("<em>&#x27;rex&#x27;</em>"));
    }

    #[test]
    fn test_badge_span_and_heading_class() {
        let md = "### Schema `Pet`\n\n- **type** changed from _'a'_ to _'b'_\n\n  💔 breaking\n";
        let html = convert(md, &RenderConfig::default());
        assert!(html.contains("<h3 class=\"oas-heading\"><span class=\"icon\">🧩</span>Schema <code>Pet</code></h3>"));
        assert!(html.contains("<span class=\"breaking\">💔 breaking</span>"));
    }

    #[test]
    fn test_fence_kept_in_list_item_inline() {
        let md = "- **x-a** added\n\n  ```yaml\n  a: 1\n  ```\n";
        let html = convert(md, &RenderConfig::default());
        let pre = html.find("<pre>").unwrap();
        let close = html.find("</ul>").unwrap();
        assert!(pre < close);
        assert!(html.contains("<code class=\"language-yaml\">\na: 1\n</code></pre>"));
    }

    #[test]
    fn test_fence_extracted_from_list() {
        let mut config = RenderConfig::default();
        config.html.nested_list_strategy = NestedListStrategy::Extract;
        let md = "- **x-a** added\n\n  ```yaml\n  a: 1\n  ```\n";
        let html = convert(md, &config);
        assert!(html.find("</ul>").unwrap() < html.find("<pre>").unwrap());
    }

    #[test]
    fn test_table_and_escaping() {
        let md = "| Object | Added |\n| --- | ---: |\n| info | 1 |\n\nfoo \\*bar\\* <b>\n";
        let html = convert(md, &RenderConfig::default());
        assert!(html.contains("<tr><th>Object</th><th>Added</th></tr>"));
        assert!(html.contains("<tr><td>info</td><td>1</td></tr>"));
        assert!(html.contains("<p>foo &#42;bar&#42; &lt;b&gt;</p>"));
    }

    #[test]
    fn test_nested_lists_close() {
        let md = "- a\n  - b\n    - c\n- d\n";
        let html = convert(md, &RenderConfig::default());
        assert_eq!(html.matches("<ul>").count(), 3);
        assert_eq!(html.matches("</ul>").count(), 3);
    }
}
