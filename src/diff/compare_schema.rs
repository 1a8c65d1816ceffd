//! Schema comparison.

use super::engine::{non_empty, props, Comparer, Scope};
use super::groups::{DiscriminatorChanges, SchemaChanges, XmlChanges};
use super::types::{ChangeKind, Diff};
use crate::model::{Discriminator, ObjectKind, Schema, SchemaOrBool, Xml};
use crate::utils::object_hash;

impl<'d> Comparer<'d> {
    pub(super) fn schema_pair(&mut self, scope: &Scope, l: &'d Schema, r: &'d Schema) -> SchemaChanges {
        self.pair(scope, l, r, Self::schema)
    }

    fn schema(&mut self, scope: &Scope, l: &'d Schema, r: &'d Schema) -> SchemaChanges {
        let mut group = SchemaChanges::default();
        let out = &mut group.changes;
        props!(self, out, scope, l, r, {
            "$schema" => dialect,
            "type" => schema_type,
            "format" => format,
            "title" => title,
            "description" => description,
            "default" => default,
            "const" => const_value,
            "multipleOf" => multiple_of,
            "maximum" => maximum,
            "exclusiveMaximum" => exclusive_maximum,
            "minimum" => minimum,
            "exclusiveMinimum" => exclusive_minimum,
            "maxLength" => max_length,
            "minLength" => min_length,
            "pattern" => pattern,
            "contentEncoding" => content_encoding,
            "contentMediaType" => content_media_type,
            "maxItems" => max_items,
            "minItems" => min_items,
            "uniqueItems" => unique_items,
            "maxContains" => max_contains,
            "minContains" => min_contains,
            "maxProperties" => max_properties,
            "minProperties" => min_properties,
            "nullable" => nullable,
            "readOnly" => read_only,
            "writeOnly" => write_only,
            "deprecated" => deprecated,
            "example" => example,
            "examples" => examples,
        });
        match (&l.enum_values, &r.enum_values) {
            (Some(a), Some(b)) => self.value_list(out, scope, "enum", a, b, (false, true)),
            _ => self.prop(out, scope, "enum", l.enum_values.as_ref(), r.enum_values.as_ref()),
        }
        self.value_list(out, scope, "required", &l.required, &r.required, (true, false));
        self.extensions(out, scope, &l.extensions, &r.extensions);

        group.all_of = self.composed(&mut group.changes, scope, "allOf", &l.all_of, &r.all_of);
        group.one_of = self.composed(&mut group.changes, scope, "oneOf", &l.one_of, &r.one_of);
        group.any_of = self.composed(&mut group.changes, scope, "anyOf", &l.any_of, &r.any_of);
        group.prefix_items = self.composed(
            &mut group.changes,
            scope,
            "prefixItems",
            &l.prefix_items,
            &r.prefix_items,
        );

        let out = &mut group.changes;
        group.not = self.subschema(out, scope, "not", l.not.as_deref(), r.not.as_deref());
        group.contains =
            self.subschema(out, scope, "contains", l.contains.as_deref(), r.contains.as_deref());
        group.if_schema =
            self.subschema(out, scope, "if", l.if_schema.as_deref(), r.if_schema.as_deref());
        group.then_schema =
            self.subschema(out, scope, "then", l.then_schema.as_deref(), r.then_schema.as_deref());
        group.else_schema =
            self.subschema(out, scope, "else", l.else_schema.as_deref(), r.else_schema.as_deref());
        group.property_names = self.subschema(
            out,
            scope,
            "propertyNames",
            l.property_names.as_deref(),
            r.property_names.as_deref(),
        );
        group.items = self.schema_or_bool(out, scope, "items", l.items.as_deref(), r.items.as_deref());
        group.unevaluated_items = self.schema_or_bool(
            out,
            scope,
            "unevaluatedItems",
            l.unevaluated_items.as_deref(),
            r.unevaluated_items.as_deref(),
        );
        group.unevaluated_properties = self.schema_or_bool(
            out,
            scope,
            "unevaluatedProperties",
            l.unevaluated_properties.as_deref(),
            r.unevaluated_properties.as_deref(),
        );
        group.additional_properties = self.schema_or_bool(
            out,
            scope,
            "additionalProperties",
            l.additional_properties.as_deref(),
            r.additional_properties.as_deref(),
        );

        group.properties = self.map(
            &mut group.changes,
            scope,
            Some("properties"),
            ObjectKind::Schema,
            &l.properties,
            &r.properties,
            Self::schema_pair,
        );
        group.pattern_properties = self.map(
            &mut group.changes,
            scope,
            Some("patternProperties"),
            ObjectKind::Schema,
            &l.pattern_properties,
            &r.pattern_properties,
            Self::schema_pair,
        );
        group.dependent_schemas = self.map(
            &mut group.changes,
            scope,
            Some("dependentSchemas"),
            ObjectKind::Schema,
            &l.dependent_schemas,
            &r.dependent_schemas,
            Self::schema_pair,
        );

        let out = &mut group.changes;
        if let Some((a, b)) =
            self.object(out, scope, "discriminator", l.discriminator.as_ref(), r.discriminator.as_ref())
        {
            let child = scope.field(ObjectKind::Discriminator, "discriminator");
            group.discriminator = non_empty(self.discriminator(&child, a, b));
        }
        if let Some((a, b)) = self.object(out, scope, "xml", l.xml.as_ref(), r.xml.as_ref()) {
            group.xml = non_empty(self.xml(&scope.field(ObjectKind::Xml, "xml"), a, b));
        }
        if let Some((a, b)) = self.object(
            out,
            scope,
            "externalDocs",
            l.external_docs.as_ref(),
            r.external_docs.as_ref(),
        ) {
            group.external_docs = non_empty(self.external_doc(
                &scope.field(ObjectKind::ExternalDoc, "externalDocs"),
                a,
                b,
            ));
        }
        group
    }

    /// Compare a composition list (`allOf`, `oneOf`, `anyOf`, `prefixItems`).
    ///
    /// Identical members are matched by content hash first; the rest are
    /// paired by position and compared.
    fn composed(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        field: &str,
        left: &'d [Schema],
        right: &'d [Schema],
    ) -> Vec<SchemaChanges> {
        let right_hashes: Vec<u64> = right.iter().map(object_hash).collect();
        let mut used = vec![false; right.len()];
        let mut unmatched_left = Vec::new();
        for (i, schema) in left.iter().enumerate() {
            let hash = object_hash(schema);
            match (0..right.len()).find(|&j| !used[j] && right_hashes[j] == hash) {
                Some(j) => used[j] = true,
                None => unmatched_left.push(i),
            }
        }
        let unmatched_right: Vec<usize> = (0..right.len()).filter(|&j| !used[j]).collect();

        let pairs: Vec<(usize, usize)> = unmatched_left
            .iter()
            .copied()
            .zip(unmatched_right.iter().copied())
            .collect();
        for &i in unmatched_left.iter().skip(pairs.len()) {
            out.push(self.member_diff(
                scope,
                field,
                ChangeKind::ObjectRemoved,
                ObjectKind::Schema,
                &left[i],
                i,
                false,
            ));
        }
        for &j in unmatched_right.iter().skip(pairs.len()) {
            out.push(self.member_diff(
                scope,
                field,
                ChangeKind::ObjectAdded,
                ObjectKind::Schema,
                &right[j],
                j,
                false,
            ));
        }
        self.member_groups(
            scope,
            field,
            ObjectKind::Schema,
            left,
            right,
            &pairs,
            &mut Self::schema_pair,
        )
    }

    fn subschema(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        name: &str,
        left: Option<&'d Schema>,
        right: Option<&'d Schema>,
    ) -> Option<Box<SchemaChanges>> {
        let (a, b) = self.object(out, scope, name, left, right)?;
        non_empty(self.schema_pair(&scope.field(ObjectKind::Schema, name), a, b)).map(Box::new)
    }

    /// `Schema ⊕ bool` slots. Two schemas are compared in depth; a boolean
    /// on either side makes the whole slot one property diff.
    fn schema_or_bool(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        name: &str,
        left: Option<&'d SchemaOrBool>,
        right: Option<&'d SchemaOrBool>,
    ) -> Option<Box<SchemaChanges>> {
        match (left, right) {
            (Some(SchemaOrBool::Schema(a)), Some(SchemaOrBool::Schema(b))) => {
                let child = scope.field(ObjectKind::Schema, name);
                non_empty(self.schema_pair(&child, a, b)).map(Box::new)
            }
            (Some(_), Some(_)) => {
                self.prop(out, scope, name, left, right);
                None
            }
            _ => {
                self.object(out, scope, name, left, right);
                None
            }
        }
    }

    fn discriminator(
        &mut self,
        scope: &Scope,
        l: &'d Discriminator,
        r: &'d Discriminator,
    ) -> DiscriminatorChanges {
        let mut group = DiscriminatorChanges::default();
        self.prop(
            &mut group.changes,
            scope,
            "propertyName",
            Some(&l.property_name),
            Some(&r.property_name),
        );
        self.value_map(&mut group.changes, scope, "mapping", &l.mapping, &r.mapping);
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group
    }

    fn xml(&mut self, scope: &Scope, l: &'d Xml, r: &'d Xml) -> XmlChanges {
        let mut group = XmlChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "name" => name,
            "namespace" => namespace,
            "prefix" => prefix,
            "attribute" => attribute,
            "wrapped" => wrapped,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group
    }
}

#[cfg(test)]
mod tests {
    use crate::diff::{ChangeKind, Changes, DiffEngine, DocumentChanges};
    use crate::parsers::parse_document_str;

    fn compare(left: &str, right: &str) -> DocumentChanges {
        let left = parse_document_str(left).unwrap();
        let right = parse_document_str(right).unwrap();
        DiffEngine::new().compare(&left, &right)
    }

    const BASE: &str = "openapi: 3.1.0
components:
  schemas:
    Pet:
      type: object
      required:
        - id
      properties:
        id:
          type: integer
        misty:
          type: boolean
    Alias:
      $ref: '#/components/schemas/Pet'
";

    #[test]
    fn test_property_type_change() {
        let right = BASE.replace("type: boolean", "type: string");
        let changes = compare(BASE, &right);
        let pet = &changes.components.as_ref().unwrap().schemas["Pet"];
        let misty = &pet.properties["misty"];
        assert_eq!(misty.changes.len(), 1);
        assert_eq!(misty.changes[0].kind, ChangeKind::Modified);
        assert!(misty.changes[0].breaking);
        assert_eq!(misty.changes[0].coordinates.location_hash(), "12:11:12:11");
    }

    #[test]
    fn test_alias_follows_reference_to_definition() {
        let right = BASE.replace("type: boolean", "type: string");
        let changes = compare(BASE, &right);
        let schemas = &changes.components.as_ref().unwrap().schemas;
        let through_alias = &schemas["Alias"].properties["misty"].changes[0];
        let direct = &schemas["Pet"].properties["misty"].changes[0];
        assert_eq!(through_alias.location_hash(), direct.location_hash());
        assert_eq!(through_alias.semantic_hash(), direct.semantic_hash());
    }

    #[test]
    fn test_required_name_added() {
        let right = BASE.replace("        - id\n", "        - id\n        - misty\n");
        let changes = compare(BASE, &right);
        let pet = &changes.components.as_ref().unwrap().schemas["Pet"];
        assert_eq!(pet.changes.len(), 1);
        assert_eq!(pet.changes[0].property, "required");
        assert_eq!(pet.changes[0].kind, ChangeKind::PropertyAdded);
        assert!(pet.changes[0].breaking);
    }

    #[test]
    fn test_differing_reference_is_one_diff() {
        let right = BASE.replace(
            "      $ref: '#/components/schemas/Pet'",
            "      $ref: '#/components/schemas/Other'",
        );
        let changes = compare(BASE, &right);
        let alias = &changes.components.as_ref().unwrap().schemas["Alias"];
        assert_eq!(alias.total(), 1);
        assert_eq!(alias.changes[0].property, "$ref");
    }

    #[test]
    fn test_recursive_schema_terminates() {
        let doc = "openapi: 3.1.0
components:
  schemas:
    Node:
      type: object
      properties:
        next:
          $ref: '#/components/schemas/Node'
";
        let right = doc.replace("type: object", "type: [object, 'null']");
        let changes = compare(doc, &right);
        assert!(changes.total() >= 1);
    }

    #[test]
    fn test_composition_paired_by_position() {
        let left = "openapi: 3.1.0
components:
  schemas:
    Mixed:
      oneOf:
        - type: string
        - type: integer
";
        let right = left.replace("type: integer", "type: number");
        let changes = compare(left, &right);
        let mixed = &changes.components.as_ref().unwrap().schemas["Mixed"];
        assert!(mixed.changes.is_empty());
        assert_eq!(mixed.one_of.len(), 1);
        assert_eq!(mixed.one_of[0].identity.new.unwrap().index, Some(1));
    }
}
