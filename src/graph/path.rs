//! JSON-path node identifiers.
//!
//! Ids are rooted at `$`, use `.name` for fixed fields, `['key']` for map
//! keys and `[i]` for array positions:
//! `$.paths['/pets'].get.responses['200'].content['application/json'].schema`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fields whose value is a string-keyed map; the segment after one of them is a key.
const MAP_FIELDS: &[&str] = &[
    "paths",
    "webhooks",
    "schemas",
    "responses",
    "parameters",
    "examples",
    "requestBodies",
    "headers",
    "securitySchemes",
    "links",
    "callbacks",
    "pathItems",
    "properties",
    "patternProperties",
    "dependentSchemas",
    "content",
    "encoding",
    "variables",
    "mapping",
    "scopes",
    "definitions",
    "$defs",
];

/// Fields whose value is an array; a numeric segment after one of them is an index.
const ARRAY_FIELDS: &[&str] = &[
    "servers",
    "tags",
    "security",
    "parameters",
    "allOf",
    "oneOf",
    "anyOf",
    "prefixItems",
    "enum",
    "required",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Field(String),
    Key(String),
    Index(usize),
}

impl Segment {
    fn pointer_token(&self) -> String {
        match self {
            Self::Field(name) | Self::Key(name) => name.replace('~', "~0").replace('/', "~1"),
            Self::Index(i) => i.to_string(),
        }
    }
}

/// A node id as a sequence of segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// `$`
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Self {
        self.with(Segment::Field(name.to_string()))
    }

    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        self.with(Segment::Key(key.to_string()))
    }

    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.with(Segment::Index(index))
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `self` equals `other` or lies beneath it.
    #[must_use]
    pub fn starts_with(&self, other: &Self) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// RFC 6901 pointer, `""` for the root.
    #[must_use]
    pub fn pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(&segment.pointer_token());
        }
        out
    }

    /// Pointer of a property of the object at this path.
    #[must_use]
    pub fn pointer_to(&self, property: &str) -> String {
        let mut out = self.pointer();
        out.push('/');
        out.push_str(&Segment::Field(property.to_string()).pointer_token());
        out
    }

    /// Convert a local reference (`#/components/schemas/Pet`) to a node id.
    ///
    /// Map keys are recognised by the field that precedes them.
    #[must_use]
    pub fn from_reference(reference: &str) -> Option<Self> {
        let pointer = reference.strip_prefix('#')?;
        if pointer.is_empty() {
            return Some(Self::root());
        }
        let pointer = pointer.strip_prefix('/')?;
        let mut path = Self::root();
        for raw in pointer.split('/') {
            let token = crate::model::unescape_pointer(raw);
            let previous = match path.last() {
                Some(Segment::Field(name)) => Some(name.as_str()),
                _ => None,
            };
            let is_array = previous.is_some_and(|p| ARRAY_FIELDS.contains(&p))
                && !path.in_components_section();
            let segment = match (previous, token.parse::<usize>()) {
                (Some(_), Ok(i)) if is_array => Segment::Index(i),
                (Some(p), _) if MAP_FIELDS.contains(&p) => Segment::Key(token),
                _ => Segment::Field(token),
            };
            path.segments.push(segment);
        }
        Some(path)
    }

    /// `$.components.<section>` where the last field names a component map.
    fn in_components_section(&self) -> bool {
        matches!(
            self.segments.as_slice(),
            [Segment::Field(first), Segment::Field(_)] if first == "components"
        )
    }

    /// Parse the display form back into segments.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut rest = text.strip_prefix('$')?;
        let mut path = Self::root();
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("['") {
                let (key, consumed) = read_quoted(after)?;
                path.segments.push(Segment::Key(key));
                rest = &after[consumed..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let end = after.find(']')?;
                let index = after[..end].parse().ok()?;
                path.segments.push(Segment::Index(index));
                rest = &after[end + 1..];
            } else if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                if end == 0 {
                    return None;
                }
                path.segments.push(Segment::Field(after[..end].to_string()));
                rest = &after[end..];
            } else {
                return None;
            }
        }
        Some(path)
    }
}

/// Read a key up to the closing `']`, honouring `\'` escapes. Returns the
/// key and the number of bytes consumed including the terminator.
fn read_quoted(input: &str) -> Option<(String, usize)> {
    let mut key = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, escaped) = chars.next()?;
                key.push(escaped);
            }
            '\'' => {
                if input[i + 1..].starts_with(']') {
                    return Some((key, i + 2));
                }
                return None;
            }
            _ => key.push(c),
        }
    }
    None
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Key(key) => {
                    write!(f, "['{}']", key.replace('\\', "\\\\").replace('\'', "\\'"))?;
                }
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid JSON path: {text}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = JsonPath::root()
            .field("paths")
            .key("/pets")
            .field("get")
            .field("parameters")
            .index(0);
        assert_eq!(path.to_string(), "$.paths['/pets'].get.parameters[0]");
        assert_eq!(JsonPath::root().to_string(), "$");
    }

    #[test]
    fn test_pointer() {
        let path = JsonPath::root().field("paths").key("/pets").field("get");
        assert_eq!(path.pointer(), "/paths/~1pets/get");
        assert_eq!(path.pointer_to("summary"), "/paths/~1pets/get/summary");
        assert_eq!(JsonPath::root().pointer(), "");
    }

    #[test]
    fn test_from_reference() {
        let path = JsonPath::from_reference("#/components/schemas/PropC").unwrap();
        assert_eq!(path.to_string(), "$.components.schemas['PropC']");

        let param = JsonPath::from_reference("#/components/parameters/0").unwrap();
        assert_eq!(param.to_string(), "$.components.parameters['0']");

        let nested =
            JsonPath::from_reference("#/paths/~1pets/get/parameters/1/schema").unwrap();
        assert_eq!(nested.to_string(), "$.paths['/pets'].get.parameters[1].schema");

        let props =
            JsonPath::from_reference("#/components/schemas/A/properties/properties/type")
                .unwrap();
        assert_eq!(
            props.to_string(),
            "$.components.schemas['A'].properties['properties'].type"
        );

        assert!(JsonPath::from_reference("other.yaml#/components/schemas/A").is_none());
    }

    #[test]
    fn test_parse_round_trip() {
        let text = "$.paths['/v3/{jollyRoger}'].get.responses['200'].content['application/json'].schema.properties['misty']";
        let path = JsonPath::parse(text).unwrap();
        assert_eq!(path.to_string(), text);
        assert_eq!(path.depth(), 10);
        assert_eq!(
            path.parent().map(|p| p.to_string()).as_deref(),
            Some("$.paths['/v3/{jollyRoger}'].get.responses['200'].content['application/json'].schema.properties")
        );
    }

    #[test]
    fn test_keys_with_quotes() {
        let path = JsonPath::root().field("examples").key("it's");
        let text = path.to_string();
        assert_eq!(text, "$.examples['it\\'s']");
        assert_eq!(JsonPath::parse(&text), Some(path));
    }

    #[test]
    fn test_starts_with() {
        let parent = JsonPath::root().field("info");
        let child = parent.field("contact");
        assert!(child.starts_with(&parent));
        assert!(!parent.starts_with(&child));
    }
}
