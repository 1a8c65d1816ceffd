//! Breaking-change rule table.
//!
//! A diff is breaking when it alters a contract a client relies on. The
//! table is keyed by object kind and property name; anything not listed
//! falls back to the per-kind defaults below.

use super::types::ChangeKind;
use crate::model::ObjectKind;

/// Properties that only document an object.
const DOCUMENTATION: &[&str] = &[
    "description",
    "summary",
    "title",
    "example",
    "examples",
    "externalDocs",
    "termsOfService",
    "contact",
    "license",
    "deprecated",
    "name",
    "email",
    "url",
    "identifier",
    "xml",
];

/// Schema constraints: adding, removing or changing one narrows or widens
/// what a payload may look like.
const CONSTRAINTS: &[&str] = &[
    "type",
    "format",
    "pattern",
    "maximum",
    "minimum",
    "exclusiveMaximum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "maxItems",
    "minItems",
    "maxProperties",
    "minProperties",
    "maxContains",
    "minContains",
    "uniqueItems",
    "multipleOf",
    "enum",
    "const",
    "nullable",
    "readOnly",
    "writeOnly",
    "additionalProperties",
];

/// Structural fields of non-schema objects.
const STRUCTURAL: &[&str] = &[
    "$ref",
    "in",
    "style",
    "explode",
    "allowReserved",
    "allowEmptyValue",
    "required",
    "operationId",
    "scheme",
    "bearerFormat",
    "openIdConnectUrl",
    "authorizationUrl",
    "tokenUrl",
    "refreshUrl",
    "contentType",
    "propertyName",
    "operationRef",
    "openapi",
    "jsonSchemaDialect",
];

/// Map sections whose entries are informative only.
const INFORMATIVE_ENTRIES: &[ObjectKind] = &[ObjectKind::Example, ObjectKind::Link];

fn is_extension(property: &str) -> bool {
    property.starts_with("x-")
}

/// Whether a property-level diff on an object of `kind` is breaking.
#[must_use]
pub fn is_breaking(kind: ObjectKind, property: &str, change: ChangeKind) -> bool {
    if is_extension(property) {
        return false;
    }

    // names and urls identify parameters, headers, servers and security schemes
    let identifying = match kind {
        ObjectKind::Parameter | ObjectKind::Header => property == "name",
        ObjectKind::Server => property == "url",
        ObjectKind::SecurityScheme => matches!(property, "name" | "type"),
        ObjectKind::OAuthFlow => property == "scopes",
        _ => false,
    };
    if identifying {
        return !change.is_addition();
    }

    if DOCUMENTATION.contains(&property) {
        return false;
    }

    if kind == ObjectKind::Schema && CONSTRAINTS.contains(&property) {
        return true;
    }

    match change {
        ChangeKind::PropertyRemoved | ChangeKind::ObjectRemoved => true,
        ChangeKind::Modified => STRUCTURAL.contains(&property) || CONSTRAINTS.contains(&property),
        ChangeKind::PropertyAdded | ChangeKind::ObjectAdded => match property {
            "required" => true,
            "security" => true,
            _ => false,
        },
    }
}

/// Whether a required-name added to (or removed from) a schema is breaking.
///
/// Adding a required property breaks clients that omit it; removing one
/// does not.
#[must_use]
pub fn required_name_breaking(added: bool) -> bool {
    added
}

/// Whether adding or removing a map entry (path, response code, media type,
/// component...) of `entry_kind` is breaking.
#[must_use]
pub fn is_entry_breaking(entry_kind: ObjectKind, change: ChangeKind) -> bool {
    if change.is_addition() {
        return false;
    }
    !INFORMATIVE_ENTRIES.contains(&entry_kind)
}

/// Whether adding or removing a list member is breaking.
///
/// Removing servers, tags or composed schemas breaks; adding one only does
/// for security requirements and required parameters.
#[must_use]
pub fn is_member_breaking(member_kind: ObjectKind, change: ChangeKind, required: bool) -> bool {
    match (member_kind, change.is_addition()) {
        (ObjectKind::Tag, _) => false,
        (_, false) => true,
        (ObjectKind::SecurityRequirement, true) => true,
        (ObjectKind::Parameter, true) => required,
        (ObjectKind::Schema, true) => true,
        _ => false,
    }
}
