//! Escaping for report output.
//!
//! Property names, map keys and values come straight from the compared
//! documents. They are escaped before they are embedded in Markdown tables,
//! inline Markdown or HTML.

/// Escape a string for safe inclusion in HTML content.
///
/// ```
/// use oas_changes::reports::escape::escape_html;
///
/// assert_eq!(escape_html("<script>alert('xss')</script>"),
///     "&lt;script&gt;alert(&#x27;xss&#x27;)&lt;/script&gt;");
/// assert_eq!(escape_html("/pets/{id}"), "/pets/{id}");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for an HTML attribute value. Whitespace that would end
/// the attribute is encoded too.
pub fn escape_html_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            '\t' => result.push_str("&#9;"),
            _ => result.push_str(&escape_html(c.encode_utf8(&mut [0; 4]))),
        }
    }
    result
}

/// Escape a string for a Markdown table cell.
///
/// ```
/// use oas_changes::reports::escape::escape_markdown_table;
///
/// assert_eq!(escape_markdown_table("a | b"), "a \\| b");
/// assert_eq!(escape_markdown_table("line1\nline2"), "line1 line2");
/// ```
pub fn escape_markdown_table(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '|' => result.push_str("\\|"),
            '\n' => result.push(' '),
            '\r' => {}
            '`' => result.push_str("\\`"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a string for inline Markdown.
///
/// ```
/// use oas_changes::reports::escape::escape_markdown_inline;
///
/// assert_eq!(escape_markdown_inline("**bold**"), "\\*\\*bold\\*\\*");
/// assert_eq!(escape_markdown_inline("x_y"), "x\\_y");
/// ```
pub fn escape_markdown_inline(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '*' => result.push_str("\\*"),
            '_' => result.push_str("\\_"),
            '`' => result.push_str("\\`"),
            '[' => result.push_str("\\["),
            ']' => result.push_str("\\]"),
            '#' => result.push_str("\\#"),
            '|' => result.push_str("\\|"),
            '<' => result.push_str("\\<"),
            '>' => result.push_str("\\>"),
            '\n' => result.push(' '),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

/// Text inside a Markdown code span. Backticks cannot be escaped in a span,
/// so they are replaced.
pub fn escape_code_span(s: &str) -> String {
    s.replace('`', "'").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_basic() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("a < b > c"), "a &lt; b &gt; c");
        assert_eq!(escape_html("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_escape_html_attr() {
        assert_eq!(escape_html_attr("line1\nline2"), "line1&#10;line2");
        assert_eq!(escape_html_attr("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_escape_markdown_inline_keeps_path_braces() {
        assert_eq!(escape_markdown_inline("/v3/{jollyRoger}"), "/v3/{jollyRoger}");
        assert_eq!(escape_markdown_inline("<b>"), "\\<b\\>");
    }

    #[test]
    fn test_escape_code_span() {
        assert_eq!(escape_code_span("$.paths['/a']"), "$.paths['/a']");
        assert_eq!(escape_code_span("a`b"), "a'b");
    }
}
