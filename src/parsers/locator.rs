//! Source coordinates for document locations.
//!
//! A [`SourceMap`] maps RFC 6901 pointers to the 1-based line and column
//! where the key (or sequence dash) introducing that location starts. YAML
//! sources are scanned line by line over their block structure; JSON
//! sources are laid out the way `serde_json::to_string_pretty` prints them,
//! which is also the form the report context extractor shows.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    positions: HashMap<String, Position>,
}

impl SourceMap {
    #[must_use]
    pub fn get(&self, pointer: &str) -> Option<Position> {
        self.positions.get(pointer).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn insert(&mut self, pointer: String, line: usize, column: usize) {
        self.positions
            .entry(pointer)
            .or_insert(Position { line, column });
    }

    /// Lay out a parsed JSON value as pretty-printed with two-space indents.
    #[must_use]
    pub fn from_json_value(value: &Value) -> Self {
        let mut map = Self::default();
        map.insert(String::new(), 1, 1);
        let mut line = 1;
        record_json(value, "", 0, &mut line, &mut map);
        map
    }

    /// Scan YAML block structure. Flow collections (`{..}`, `[..]`) are
    /// recorded as a whole; their members get no entry of their own.
    #[must_use]
    pub fn from_yaml(content: &str) -> Self {
        let mut scanner = YamlScanner::default();
        scanner.map.insert(String::new(), 1, 1);
        for (number, raw) in content.lines().enumerate() {
            scanner.line(number + 1, raw);
        }
        scanner.map
    }
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn record_json(value: &Value, pointer: &str, indent: usize, line: &mut usize, map: &mut SourceMap) {
    match value {
        Value::Object(members) if !members.is_empty() => {
            for (key, child) in members {
                *line += 1;
                let child_pointer = format!("{pointer}/{}", escape_token(key));
                map.insert(child_pointer.clone(), *line, indent + 3);
                record_json(child, &child_pointer, indent + 2, line, map);
            }
            *line += 1;
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                *line += 1;
                let child_pointer = format!("{pointer}/{index}");
                map.insert(child_pointer.clone(), *line, indent + 3);
                record_json(child, &child_pointer, indent + 2, line, map);
            }
            *line += 1;
        }
        _ => {}
    }
}

/// An open node on the YAML block stack.
#[derive(Debug)]
struct Frame {
    /// Column of the key or dash that opened the node.
    indent: usize,
    pointer: String,
    is_item: bool,
    items: usize,
}

#[derive(Debug, Default)]
struct YamlScanner {
    map: SourceMap,
    stack: Vec<Frame>,
    /// Lines indented deeper than this belong to a scalar value.
    scalar_owner: Option<usize>,
}

impl YamlScanner {
    fn line(&mut self, number: usize, raw: &str) {
        let trimmed = raw.trim_start_matches(' ');
        let indent = raw.len() - trimmed.len();
        let content = trimmed.trim_end();

        if content.is_empty() {
            return;
        }
        if let Some(owner) = self.scalar_owner {
            if indent > owner {
                return;
            }
            self.scalar_owner = None;
        }
        if content.starts_with('#') || content == "---" || content == "..." || content.starts_with("%") {
            return;
        }
        self.entry(number, indent, content);
    }

    fn entry(&mut self, number: usize, column: usize, content: &str) {
        if content == "-" || content.starts_with("- ") {
            self.stack
                .retain(|f| f.indent < column || (f.indent == column && !f.is_item));
            let pointer = match self.stack.last_mut() {
                Some(parent) => {
                    let index = parent.items;
                    parent.items += 1;
                    format!("{}/{index}", parent.pointer)
                }
                None => return,
            };
            self.map.insert(pointer.clone(), number, column + 1);
            self.stack.push(Frame {
                indent: column,
                pointer,
                is_item: true,
                items: 0,
            });
            let rest = content[1..].trim_start_matches(' ');
            if rest.is_empty() {
                return;
            }
            let offset = content.len() - rest.len();
            if split_key(rest).is_some() || rest == "-" || rest.starts_with("- ") {
                self.entry(number, column + offset, rest);
            } else if !is_empty_value(rest) {
                self.scalar_owner = Some(column);
            }
            return;
        }

        let Some((key, value)) = split_key(content) else {
            return;
        };
        self.stack.retain(|f| f.indent < column);
        let parent = self
            .stack
            .last()
            .map_or_else(String::new, |f| f.pointer.clone());
        let pointer = format!("{parent}/{}", escape_token(&key));
        self.map.insert(pointer.clone(), number, column + 1);
        self.stack.push(Frame {
            indent: column,
            pointer,
            is_item: false,
            items: 0,
        });
        if !is_empty_value(value) {
            self.scalar_owner = Some(column);
        }
    }
}

/// Whether an inline value leaves room for a nested block.
fn is_empty_value(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.starts_with('#') {
        return true;
    }
    // anchors and tags alone introduce the nested block
    value
        .split_whitespace()
        .all(|token| token.starts_with('&') || token.starts_with('!'))
}

/// Split `key: value` into the unquoted key and the raw value text.
fn split_key(content: &str) -> Option<(String, &str)> {
    let first = content.chars().next()?;
    if matches!(first, '[' | '{' | '#' | '|' | '>' | '&' | '*' | '!' | '?') {
        return None;
    }
    if first == '"' || first == '\'' {
        let (key, consumed) = read_quoted_key(content, first)?;
        let rest = content[consumed..].trim_start();
        let value = rest.strip_prefix(':')?;
        if !value.is_empty() && !value.starts_with([' ', '\t']) {
            return None;
        }
        return Some((key, value.trim_start()));
    }
    let bytes = content.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b':' {
            let next = bytes.get(i + 1);
            if next.is_none() || matches!(next, Some(b' ' | b'\t')) {
                let key = content[..i].trim_end();
                if key.is_empty() {
                    return None;
                }
                return Some((key.to_string(), content[i + 1..].trim_start()));
            }
        }
        if b == b' ' && bytes.get(i + 1) == Some(&b'#') {
            return None;
        }
    }
    None
}

fn read_quoted_key(content: &str, quote: char) -> Option<(String, usize)> {
    let mut key = String::new();
    let mut chars = content.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            let (_, escaped) = chars.next()?;
            key.push(escaped);
        } else if c == quote {
            if quote == '\'' && chars.peek().is_some_and(|(_, n)| *n == '\'') {
                chars.next();
                key.push('\'');
            } else {
                return Some((key, i + c.len_utf8()));
            }
        } else {
            key.push(c);
        }
    }
    None
}
