//! Property-level comparison of two OpenAPI documents.
//!
//! The [`DiffEngine`] walks the original (left) and modified (right)
//! documents side by side and produces a [`DocumentChanges`] tree. The
//! comparison helpers in this file are shared by the per-area comparers in
//! `compare_paths`, `compare_schema` and `compare_components`.

use super::breaking;
use super::groups::{
    Changes, ContactChanges, DocumentChanges, ExternalDocChanges, InfoChanges, LicenseChanges,
    MemberIdentity, ParameterChanges, SchemaChanges, SecurityRequirementChanges, ServerChanges,
    ServerVariableChanges, TagChanges,
};
use super::types::{ChangeKind, Coordinates, Diff, MapEntry, ObjectHandle};
use crate::graph::JsonPath;
use crate::model::{
    canonical_reference, Catalogue, ComponentItem, Contact, Document, ExternalDoc, Extensions,
    Info, License, ObjectKind, Resolver, SecurityRequirement, Server, ServerVariable, Tag,
};
use crate::parsers::{ParsedDocument, SourceMap};
use crate::utils::object_hash;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;

/// Compares two parsed documents.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    follow_references: bool,
    compare_extensions: bool,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    /// Create a new diff engine with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            follow_references: true,
            compare_extensions: true,
        }
    }

    /// Compare the definitions behind equal `$ref`s (default on).
    ///
    /// When off, a reference is compared by its string only.
    #[must_use]
    pub fn follow_references(mut self, follow: bool) -> Self {
        self.follow_references = follow;
        self
    }

    /// Report changes to `x-` extensions (default on).
    #[must_use]
    pub fn compare_extensions(mut self, compare: bool) -> Self {
        self.compare_extensions = compare;
        self
    }

    /// Compare two documents and return the change tree.
    ///
    /// Objects the documents reference in other files are compared through
    /// their catalogues.
    #[must_use]
    pub fn compare(&self, left: &ParsedDocument, right: &ParsedDocument) -> DocumentChanges {
        self.run(
            Side::new(&left.document, &left.source_map).with_catalogue(&left.catalogue),
            Side::new(&right.document, &right.source_map).with_catalogue(&right.catalogue),
        )
    }

    /// Compare two document models with their source maps.
    #[must_use]
    pub fn compare_models(
        &self,
        left: &Document,
        left_map: &SourceMap,
        right: &Document,
        right_map: &SourceMap,
    ) -> DocumentChanges {
        self.run(Side::new(left, left_map), Side::new(right, right_map))
    }

    fn run<'d>(&self, left: Side<'d>, right: Side<'d>) -> DocumentChanges {
        let mut comparer = Comparer {
            left,
            right,
            follow_references: self.follow_references,
            compare_extensions: self.compare_extensions,
            ref_stack: Vec::new(),
        };
        let changes = comparer.document();
        tracing::debug!(
            total = changes.total(),
            breaking = changes.breaking(),
            "compared documents"
        );
        changes
    }
}

/// One document being compared.
#[derive(Clone, Copy)]
pub(super) struct Side<'d> {
    pub(super) doc: &'d Document,
    map: &'d SourceMap,
    catalogue: Option<&'d Catalogue>,
    resolver: Resolver<'d>,
}

/// Where a followed definition lives: its path inside its file, and the
/// file when it is not the root document.
type Located<'d, T> = (&'d T, JsonPath, Option<Rc<str>>);

impl<'d> Side<'d> {
    fn new(doc: &'d Document, map: &'d SourceMap) -> Self {
        Self {
            doc,
            map,
            catalogue: None,
            resolver: Resolver::new(doc),
        }
    }

    fn with_catalogue(mut self, catalogue: &'d Catalogue) -> Self {
        self.catalogue = Some(catalogue);
        self.resolver = self.resolver.with_catalogue(catalogue);
        self
    }

    /// Follow `$ref` hops from `item`, which sits at `at` in `file`.
    fn follow<T: ComponentItem>(
        &self,
        item: &'d T,
        at: &JsonPath,
        file: Option<&Rc<str>>,
    ) -> Option<Located<'d, T>> {
        let (definition, last) = self.resolver.concrete(item)?;
        let Some(reference) = last else {
            return Some((definition, at.clone(), file.cloned()));
        };
        if reference.starts_with('#') {
            return Some((definition, JsonPath::from_reference(reference)?, None));
        }
        let canonical = canonical_reference("", reference)?;
        let (name, fragment) = canonical.split_once('#')?;
        let path = JsonPath::from_reference(&format!("#{fragment}"))?;
        Some((definition, path, Some(Rc::from(name))))
    }

    /// Source map of the root document, or of a loaded file.
    fn map_for(&self, file: Option<&str>) -> Option<&'d SourceMap> {
        match file {
            None => Some(self.map),
            Some(name) => self.catalogue?.file(name).map(|f| &f.source_map),
        }
    }
}

/// Kind and location of the pair of objects being compared.
#[derive(Debug, Clone)]
pub(super) struct Scope {
    pub(super) kind: ObjectKind,
    pub(super) left: JsonPath,
    pub(super) right: JsonPath,
    /// Files the objects were read from, when not the root documents
    left_file: Option<Rc<str>>,
    right_file: Option<Rc<str>>,
}

impl Scope {
    pub(super) fn root(kind: ObjectKind) -> Self {
        Self {
            kind,
            left: JsonPath::root(),
            right: JsonPath::root(),
            left_file: None,
            right_file: None,
        }
    }

    /// A pair of objects in the same files as `self`.
    pub(super) fn nested(&self, kind: ObjectKind, left: JsonPath, right: JsonPath) -> Self {
        Self {
            kind,
            left,
            right,
            left_file: self.left_file.clone(),
            right_file: self.right_file.clone(),
        }
    }

    /// The object held by field `name` on both sides.
    pub(super) fn field(&self, kind: ObjectKind, name: &str) -> Self {
        self.nested(kind, self.left.field(name), self.right.field(name))
    }

    /// The file diffs in this scope are located in, when not the root.
    fn source(&self) -> Option<String> {
        self.right_file
            .as_deref()
            .or(self.left_file.as_deref())
            .map(str::to_string)
    }
}

/// Groups for list members carry the handles of both sides.
pub(super) trait Member: Changes + Default {
    fn set_identity(&mut self, identity: MemberIdentity);
}

macro_rules! member {
    ($($ty:ty),*) => {
        $(
            impl Member for $ty {
                fn set_identity(&mut self, identity: MemberIdentity) {
                    self.identity = identity;
                }
            }
        )*
    };
}

member!(
    ServerChanges,
    TagChanges,
    ParameterChanges,
    SecurityRequirementChanges,
    SchemaChanges
);

/// Compare `Option` fields of two objects property by property.
macro_rules! props {
    ($cmp:expr, $out:expr, $scope:expr, $l:expr, $r:expr, { $($name:literal => $field:ident),* $(,)? }) => {
        $( $cmp.prop($out, $scope, $name, $l.$field.as_ref(), $r.$field.as_ref()); )*
    };
}
pub(super) use props;

pub(super) fn non_empty<G: Changes>(group: G) -> Option<G> {
    (!group.is_empty()).then_some(group)
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

fn handle<T: Serialize>(value: &T, index: Option<usize>) -> ObjectHandle {
    ObjectHandle {
        hash: object_hash(value),
        index,
    }
}

pub(super) struct Comparer<'d> {
    pub(super) left: Side<'d>,
    pub(super) right: Side<'d>,
    follow_references: bool,
    compare_extensions: bool,
    /// Reference pairs being compared, innermost last.
    ref_stack: Vec<(String, String)>,
}

impl<'d> Comparer<'d> {
    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    fn coords(&self, scope: &Scope, left: Option<&str>, right: Option<&str>) -> Coordinates {
        let left_map = self.left.map_for(scope.left_file.as_deref());
        let right_map = self.right.map_for(scope.right_file.as_deref());
        Coordinates::new(
            left.zip(left_map).and_then(|(p, map)| map.get(p)),
            right.zip(right_map).and_then(|(p, map)| map.get(p)),
        )
    }

    fn coords_at(&self, scope: &Scope, name: &str) -> Coordinates {
        self.coords(
            scope,
            Some(&scope.left.pointer_to(name)),
            Some(&scope.right.pointer_to(name)),
        )
    }

    /// Compare one property. Equal or absent-on-both values produce nothing.
    pub(super) fn prop<T: Serialize + PartialEq + ?Sized>(
        &self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        name: &str,
        left: Option<&T>,
        right: Option<&T>,
    ) {
        let kind = match (left, right) {
            (None, None) => return,
            (Some(a), Some(b)) if a == b => return,
            (Some(_), Some(_)) => ChangeKind::Modified,
            (Some(_), None) => ChangeKind::PropertyRemoved,
            (None, Some(_)) => ChangeKind::PropertyAdded,
        };
        let diff = Diff::new(name, kind)
            .values(left.and_then(to_value), right.and_then(to_value))
            .at(self.coords_at(scope, name))
            .breaking(breaking::is_breaking(scope.kind, name, kind))
            .attributed(scope.right.to_string(), scope.kind.label())
            .sourced(scope.source());
        out.push(diff);
    }

    /// Compare `x-` extensions key by key.
    pub(super) fn extensions(
        &self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        left: &Extensions,
        right: &Extensions,
    ) {
        if !self.compare_extensions {
            return;
        }
        for (key, value) in left.iter() {
            self.prop(out, scope, key, Some(value), right.get(key));
        }
        for (key, value) in right.iter() {
            if left.get(key).is_none() {
                self.prop(out, scope, key, None, Some(value));
            }
        }
    }

    /// Record a nested object appearing or disappearing; returns both
    /// sides when the object exists in each document.
    pub(super) fn object<'a, T: Serialize>(
        &self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        name: &str,
        left: Option<&'a T>,
        right: Option<&'a T>,
    ) -> Option<(&'a T, &'a T)> {
        let kind = match (left, right) {
            (Some(a), Some(b)) => return Some((a, b)),
            (None, None) => return None,
            (Some(_), None) => ChangeKind::ObjectRemoved,
            (None, Some(_)) => ChangeKind::ObjectAdded,
        };
        let mut diff = Diff::new(name, kind)
            .values(left.and_then(to_value), right.and_then(to_value))
            .at(self.coords_at(scope, name))
            .breaking(breaking::is_breaking(scope.kind, name, kind))
            .attributed(scope.right.to_string(), scope.kind.label())
            .sourced(scope.source());
        diff.original_object = left.map(|v| handle(v, None));
        diff.new_object = right.map(|v| handle(v, None));
        out.push(diff);
        None
    }

    /// Compare a list of plain values as a set: one diff per value added
    /// or removed.
    pub(super) fn value_list<T: Serialize + PartialEq>(
        &self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        name: &str,
        left: &[T],
        right: &[T],
        breaking_on: (bool, bool),
    ) {
        let (on_add, on_remove) = breaking_on;
        for (i, value) in left.iter().enumerate() {
            if !right.contains(value) {
                let pointer = format!("{}/{i}", scope.left.pointer_to(name));
                out.push(
                    Diff::new(name, ChangeKind::PropertyRemoved)
                        .values(to_value(value), None)
                        .at(self.coords(scope, Some(&pointer), None))
                        .breaking(on_remove)
                        .attributed(scope.right.to_string(), scope.kind.label())
                        .sourced(scope.source()),
                );
            }
        }
        for (i, value) in right.iter().enumerate() {
            if !left.contains(value) {
                let pointer = format!("{}/{i}", scope.right.pointer_to(name));
                out.push(
                    Diff::new(name, ChangeKind::PropertyAdded)
                        .values(None, to_value(value))
                        .at(self.coords(scope, None, Some(&pointer)))
                        .breaking(on_add)
                        .attributed(scope.right.to_string(), scope.kind.label())
                        .sourced(scope.source()),
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn entry_diff<T: Serialize>(
        &self,
        scope: &Scope,
        field: Option<&str>,
        key: &str,
        kind: ChangeKind,
        entry_kind: ObjectKind,
        value: &T,
        at: &JsonPath,
    ) -> Diff {
        let (coords, original, new) = if kind.is_removal() {
            (self.coords(scope, Some(&at.pointer()), None), to_value(value), None)
        } else {
            (self.coords(scope, None, Some(&at.pointer())), None, to_value(value))
        };
        let mut diff = Diff::new(key, kind)
            .values(original, new)
            .at(coords)
            .breaking(breaking::is_entry_breaking(entry_kind, kind))
            .attributed(scope.right.to_string(), scope.kind.label())
            .sourced(scope.source());
        diff.entry = Some(MapEntry {
            field: field.map(str::to_string),
            kind: entry_kind,
        });
        let h = Some(handle(value, None));
        if kind.is_removal() {
            diff.original_object = h;
        } else {
            diff.new_object = h;
        }
        diff
    }

    /// Compare a string-keyed map. Entries present on one side only become
    /// `ObjectAdded` / `ObjectRemoved` diffs on the parent (property = key);
    /// entries on both sides are compared with `compare` and kept when they
    /// differ.
    ///
    /// `field` is the map's field name on the parent, or `None` when the
    /// parent itself is the map (paths, responses, callbacks).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn map<T, G>(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        field: Option<&str>,
        entry_kind: ObjectKind,
        left: &'d IndexMap<String, T>,
        right: &'d IndexMap<String, T>,
        mut compare: impl FnMut(&mut Self, &Scope, &'d T, &'d T) -> G,
    ) -> IndexMap<String, G>
    where
        T: Serialize,
        G: Changes,
    {
        let (left_base, right_base) = match field {
            Some(name) => (scope.left.field(name), scope.right.field(name)),
            None => (scope.left.clone(), scope.right.clone()),
        };
        let mut groups = IndexMap::new();
        for (key, value) in left {
            let left_path = left_base.key(key);
            match right.get(key) {
                None => out.push(self.entry_diff(
                    scope,
                    field,
                    key,
                    ChangeKind::ObjectRemoved,
                    entry_kind,
                    value,
                    &left_path,
                )),
                Some(other) => {
                    let child = scope.nested(entry_kind, left_path, right_base.key(key));
                    let group = compare(self, &child, value, other);
                    if !group.is_empty() {
                        groups.insert(key.clone(), group);
                    }
                }
            }
        }
        for (key, value) in right {
            if !left.contains_key(key) {
                out.push(self.entry_diff(
                    scope,
                    field,
                    key,
                    ChangeKind::ObjectAdded,
                    entry_kind,
                    value,
                    &right_base.key(key),
                ));
            }
        }
        groups
    }

    /// Compare a map of plain values key by key (link parameters, scopes,
    /// discriminator mappings).
    pub(super) fn value_map<T: Serialize + PartialEq>(
        &self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        field: &str,
        left: &IndexMap<String, T>,
        right: &IndexMap<String, T>,
    ) {
        let inner = scope.field(scope.kind, field);
        for (key, value) in left {
            let mut diffs = Vec::new();
            self.prop(&mut diffs, &inner, key, Some(value), right.get(key));
            out.extend(diffs.into_iter().map(|d| self.rehome(d, scope, field)));
        }
        for (key, value) in right {
            if !left.contains_key(key) {
                let mut diffs = Vec::new();
                self.prop(&mut diffs, &inner, key, None, Some(value));
                out.extend(diffs.into_iter().map(|d| self.rehome(d, scope, field)));
            }
        }
    }

    /// Prefix a map-member diff with the map's field name and attribute it
    /// to the owning object.
    fn rehome(&self, mut diff: Diff, owner: &Scope, field: &str) -> Diff {
        diff.property = format!("{field}.{}", diff.property);
        diff.breaking = breaking::is_breaking(owner.kind, field, diff.kind);
        diff.attributed(owner.right.to_string(), owner.kind.label())
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn member_diff<T: Serialize>(
        &self,
        scope: &Scope,
        field: &str,
        kind: ChangeKind,
        member_kind: ObjectKind,
        value: &T,
        index: usize,
        required: bool,
    ) -> Diff {
        let removed = kind.is_removal();
        let base = if removed { &scope.left } else { &scope.right };
        let pointer = base.field(field).index(index).pointer();
        let coords = if removed {
            self.coords(scope, Some(&pointer), None)
        } else {
            self.coords(scope, None, Some(&pointer))
        };
        let mut diff = Diff::new(field, kind)
            .at(coords)
            .breaking(breaking::is_member_breaking(member_kind, kind, required))
            .attributed(scope.right.to_string(), scope.kind.label())
            .sourced(scope.source());
        let h = Some(handle(value, Some(index)));
        if removed {
            diff.original = to_value(value);
            diff.original_object = h;
        } else {
            diff.new = to_value(value);
            diff.new_object = h;
        }
        diff
    }

    /// Compare a positional list whose members are matched by `key`.
    ///
    /// Unmatched members become `ObjectAdded` / `ObjectRemoved` diffs on the
    /// parent with property = `field`; matched members that differ get a
    /// group carrying both handles.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn list<T, G, K>(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        field: &str,
        member_kind: ObjectKind,
        left: &'d [T],
        right: &'d [T],
        key: impl Fn(&T) -> K,
        required: impl Fn(&T) -> bool,
        mut compare: impl FnMut(&mut Self, &Scope, &'d T, &'d T) -> G,
    ) -> Vec<G>
    where
        T: Serialize,
        G: Member,
        K: PartialEq,
    {
        let mut used = vec![false; right.len()];
        let mut pairs = Vec::new();
        for (i, item) in left.iter().enumerate() {
            let wanted = key(item);
            let found = right
                .iter()
                .enumerate()
                .position(|(j, other)| !used[j] && key(other) == wanted);
            match found {
                Some(j) => {
                    used[j] = true;
                    pairs.push((i, j));
                }
                None => out.push(self.member_diff(
                    scope,
                    field,
                    ChangeKind::ObjectRemoved,
                    member_kind,
                    item,
                    i,
                    required(item),
                )),
            }
        }
        for (j, item) in right.iter().enumerate() {
            if !used[j] {
                out.push(self.member_diff(
                    scope,
                    field,
                    ChangeKind::ObjectAdded,
                    member_kind,
                    item,
                    j,
                    required(item),
                ));
            }
        }
        self.member_groups(scope, field, member_kind, left, right, &pairs, &mut compare)
    }

    /// Compare matched members and attach identities.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn member_groups<T, G>(
        &mut self,
        scope: &Scope,
        field: &str,
        member_kind: ObjectKind,
        left: &'d [T],
        right: &'d [T],
        pairs: &[(usize, usize)],
        compare: &mut impl FnMut(&mut Self, &Scope, &'d T, &'d T) -> G,
    ) -> Vec<G>
    where
        T: Serialize,
        G: Member,
    {
        let mut groups = Vec::new();
        for &(i, j) in pairs {
            let child = scope.nested(
                member_kind,
                scope.left.field(field).index(i),
                scope.right.field(field).index(j),
            );
            let mut group = compare(self, &child, &left[i], &right[j]);
            if !group.is_empty() {
                group.set_identity(MemberIdentity {
                    original: Some(handle(&left[i], Some(i))),
                    new: Some(handle(&right[j], Some(j))),
                });
                groups.push(group);
            }
        }
        groups
    }

    /// Compare two objects that may be `$ref`s.
    ///
    /// Equal references are compared through their definitions, located at
    /// the definition's own path. Differing references only produce a
    /// `$ref` diff. A reference against an inline object compares the
    /// definition with the inline object.
    pub(super) fn pair<T, G>(
        &mut self,
        scope: &Scope,
        left: &'d T,
        right: &'d T,
        compare: impl FnOnce(&mut Self, &Scope, &'d T, &'d T) -> G,
    ) -> G
    where
        T: ComponentItem,
        G: Changes + Default,
    {
        let (left_ref, right_ref) = (left.reference(), right.reference());
        if left_ref.is_none() && right_ref.is_none() {
            return compare(self, scope, left, right);
        }

        let mut ref_diffs = Vec::new();
        self.prop(&mut ref_diffs, scope, "$ref", left_ref, right_ref);
        let with_ref_diffs = |mut group: G, mut diffs: Vec<Diff>| {
            let own = group.property_changes_mut();
            diffs.append(own);
            *own = diffs;
            group
        };

        let differing = left_ref.is_some() && right_ref.is_some() && left_ref != right_ref;
        if differing || !self.follow_references {
            return with_ref_diffs(G::default(), ref_diffs);
        }

        let key = (
            left_ref.unwrap_or_default().to_string(),
            right_ref.unwrap_or_default().to_string(),
        );
        if self.ref_stack.contains(&key) {
            return with_ref_diffs(G::default(), ref_diffs);
        }

        let resolved = (
            self.left.follow(left, &scope.left, scope.left_file.as_ref()),
            self.right.follow(right, &scope.right, scope.right_file.as_ref()),
        );
        let (Some((left_def, left_path, left_file)), Some((right_def, right_path, right_file))) =
            resolved
        else {
            tracing::debug!(
                left = ?left_ref,
                right = ?right_ref,
                "reference not resolvable, comparing reference strings only"
            );
            return with_ref_diffs(G::default(), ref_diffs);
        };

        self.ref_stack.push(key);
        let definitions = Scope {
            kind: scope.kind,
            left: left_path,
            right: right_path,
            left_file,
            right_file,
        };
        let group = compare(self, &definitions, left_def, right_def);
        self.ref_stack.pop();
        with_ref_diffs(group, ref_diffs)
    }

    // ------------------------------------------------------------------
    // Document-level objects
    // ------------------------------------------------------------------

    fn document(&mut self) -> DocumentChanges {
        let (l, r) = (self.left.doc, self.right.doc);
        let scope = Scope::root(ObjectKind::Document);
        let mut group = DocumentChanges::default();

        self.prop(&mut group.changes, &scope, "openapi", Some(&l.openapi), Some(&r.openapi));
        props!(self, &mut group.changes, &scope, l, r, {
            "jsonSchemaDialect" => json_schema_dialect,
        });
        self.extensions(&mut group.changes, &scope, &l.extensions, &r.extensions);

        if let Some((a, b)) =
            self.object(&mut group.changes, &scope, "info", l.info.as_ref(), r.info.as_ref())
        {
            group.info = non_empty(self.info(&scope.field(ObjectKind::Info, "info"), a, b));
        }
        group.servers = self.servers(&mut group.changes, &scope, &l.servers, &r.servers);
        if let Some((a, b)) =
            self.object(&mut group.changes, &scope, "paths", l.paths.as_ref(), r.paths.as_ref())
        {
            group.paths = non_empty(self.paths(&scope.field(ObjectKind::Paths, "paths"), a, b));
        }
        group.webhooks = self.map(
            &mut group.changes,
            &scope,
            Some("webhooks"),
            ObjectKind::PathItem,
            &l.webhooks,
            &r.webhooks,
            Self::path_item_pair,
        );
        if let Some((a, b)) = self.object(
            &mut group.changes,
            &scope,
            "components",
            l.components.as_ref(),
            r.components.as_ref(),
        ) {
            group.components = non_empty(self.components(
                &scope.field(ObjectKind::Components, "components"),
                a,
                b,
            ));
        }
        group.security = self.security(&mut group.changes, &scope, &l.security, &r.security);
        group.tags = self.list(
            &mut group.changes,
            &scope,
            "tags",
            ObjectKind::Tag,
            &l.tags,
            &r.tags,
            |tag: &Tag| tag.name.clone(),
            |_| false,
            Self::tag,
        );
        if let Some((a, b)) = self.object(
            &mut group.changes,
            &scope,
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

    fn info(&mut self, scope: &Scope, l: &'d Info, r: &'d Info) -> InfoChanges {
        let mut group = InfoChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "title" => title,
            "summary" => summary,
            "description" => description,
            "termsOfService" => terms_of_service,
            "version" => version,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        if let Some((a, b)) =
            self.object(&mut group.changes, scope, "contact", l.contact.as_ref(), r.contact.as_ref())
        {
            group.contact = non_empty(self.contact(&scope.field(ObjectKind::Contact, "contact"), a, b));
        }
        if let Some((a, b)) =
            self.object(&mut group.changes, scope, "license", l.license.as_ref(), r.license.as_ref())
        {
            group.license = non_empty(self.license(&scope.field(ObjectKind::License, "license"), a, b));
        }
        group
    }

    fn contact(&mut self, scope: &Scope, l: &'d Contact, r: &'d Contact) -> ContactChanges {
        let mut group = ContactChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "name" => name,
            "url" => url,
            "email" => email,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group
    }

    fn license(&mut self, scope: &Scope, l: &'d License, r: &'d License) -> LicenseChanges {
        let mut group = LicenseChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "name" => name,
            "identifier" => identifier,
            "url" => url,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group
    }

    pub(super) fn external_doc(
        &mut self,
        scope: &Scope,
        l: &'d ExternalDoc,
        r: &'d ExternalDoc,
    ) -> ExternalDocChanges {
        let mut group = ExternalDocChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "description" => description,
        });
        self.prop(&mut group.changes, scope, "url", Some(&l.url), Some(&r.url));
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group
    }

    fn tag(&mut self, scope: &Scope, l: &'d Tag, r: &'d Tag) -> TagChanges {
        let mut group = TagChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "description" => description,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        if let Some((a, b)) = self.object(
            &mut group.changes,
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

    /// Servers matched by url.
    pub(super) fn servers(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        left: &'d [Server],
        right: &'d [Server],
    ) -> Vec<ServerChanges> {
        self.list(
            out,
            scope,
            "servers",
            ObjectKind::Server,
            left,
            right,
            |server: &Server| server.url.clone(),
            |_| false,
            Self::server,
        )
    }

    pub(super) fn server(&mut self, scope: &Scope, l: &'d Server, r: &'d Server) -> ServerChanges {
        let mut group = ServerChanges::default();
        self.prop(&mut group.changes, scope, "url", Some(&l.url), Some(&r.url));
        props!(self, &mut group.changes, scope, l, r, {
            "description" => description,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group.variables = self.map(
            &mut group.changes,
            scope,
            Some("variables"),
            ObjectKind::ServerVariable,
            &l.variables,
            &r.variables,
            Self::server_variable,
        );
        group
    }

    fn server_variable(
        &mut self,
        scope: &Scope,
        l: &'d ServerVariable,
        r: &'d ServerVariable,
    ) -> ServerVariableChanges {
        let mut group = ServerVariableChanges::default();
        self.value_list(
            &mut group.changes,
            scope,
            "enum",
            &l.enum_values,
            &r.enum_values,
            (false, true),
        );
        props!(self, &mut group.changes, scope, l, r, {
            "default" => default,
            "description" => description,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group
    }

    /// Security requirements matched by their set of scheme names.
    pub(super) fn security(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        left: &'d [SecurityRequirement],
        right: &'d [SecurityRequirement],
    ) -> Vec<SecurityRequirementChanges> {
        self.list(
            out,
            scope,
            "security",
            ObjectKind::SecurityRequirement,
            left,
            right,
            SecurityRequirement::scheme_key,
            |_| false,
            Self::security_requirement,
        )
    }

    fn security_requirement(
        &mut self,
        scope: &Scope,
        l: &'d SecurityRequirement,
        r: &'d SecurityRequirement,
    ) -> SecurityRequirementChanges {
        let mut group = SecurityRequirementChanges::default();
        for (scheme, scopes) in &l.0 {
            match r.0.get(scheme) {
                // a bare scheme and a scoped one differ as a whole
                Some(other) if scopes.is_empty() != other.is_empty() => {
                    group.changes.push(
                        Diff::new(scheme, ChangeKind::Modified)
                            .values(to_value(scopes), to_value(other))
                            .at(self.coords_at(scope, scheme))
                            .breaking(!other.is_empty())
                            .attributed(scope.right.to_string(), scope.kind.label())
                            .sourced(scope.source()),
                    );
                }
                other => {
                    let other = other.map_or(&[][..], Vec::as_slice);
                    self.value_list(&mut group.changes, scope, scheme, scopes, other, (true, false));
                }
            }
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_document_str;

    fn compare(left: &str, right: &str) -> DocumentChanges {
        let left = parse_document_str(left).unwrap();
        let right = parse_document_str(right).unwrap();
        DiffEngine::new().compare(&left, &right)
    }

    #[test]
    fn test_title_change() {
        let changes = compare(
            "openapi: 3.1.0\ninfo:\n  title: chip\n",
            "openapi: 3.1.0\ninfo:\n  title: chop\n",
        );
        assert_eq!(changes.total(), 1);
        let info = changes.info.as_ref().unwrap();
        let diff = &info.changes[0];
        assert_eq!(diff.property, "title");
        assert_eq!(diff.kind, ChangeKind::Modified);
        assert_eq!(diff.new, Some(Value::String("chop".to_string())));
        assert_eq!(diff.coordinates.location_hash(), "3:3:3:3");
        assert!(!diff.breaking);
    }

    #[test]
    fn test_identical_documents() {
        let doc = "openapi: 3.1.0\ninfo:\n  title: same\nx-keep: 1\n";
        assert!(compare(doc, doc).is_empty());
    }

    #[test]
    fn test_extension_changes_only_report_modified_keys() {
        let changes = compare(
            "openapi: 3.1.0\nx-unchanged: same\nx-modified: before\n",
            "openapi: 3.1.0\nx-unchanged: same\nx-modified: after\n",
        );
        assert_eq!(changes.changes.len(), 1);
        assert_eq!(changes.changes[0].property, "x-modified");
    }

    #[test]
    fn test_server_added_at_document_level() {
        let changes = compare(
            "openapi: 3.1.0\nservers:\n  - url: https://a\n  - url: https://b\n",
            "openapi: 3.1.0\nservers:\n  - url: https://a\n  - url: https://b\n  - url: https://c\n",
        );
        assert_eq!(changes.total(), 1);
        let diff = &changes.changes[0];
        assert_eq!(diff.property, "servers");
        assert_eq!(diff.kind, ChangeKind::ObjectAdded);
        assert_eq!(diff.new_object.unwrap().index, Some(2));
        assert_eq!(diff.coordinates.new_line, Some(5));
        assert!(changes.servers.is_empty());
    }

    #[test]
    fn test_matched_server_gets_identity() {
        let changes = compare(
            "openapi: 3.1.0\nservers:\n  - url: https://a\n    description: one\n",
            "openapi: 3.1.0\nservers:\n  - url: https://a\n    description: two\n",
        );
        assert_eq!(changes.servers.len(), 1);
        let server = &changes.servers[0];
        assert_eq!(server.changes[0].property, "description");
        assert_eq!(server.identity.new.unwrap().index, Some(0));
    }

    #[test]
    fn test_tags_matched_by_name() {
        let changes = compare(
            "openapi: 3.1.0\ntags:\n  - name: a\n  - name: b\n",
            "openapi: 3.1.0\ntags:\n  - name: b\n  - name: a\n",
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_security_scopes() {
        let changes = compare(
            "openapi: 3.1.0\nsecurity:\n  - oauth: [read]\n",
            "openapi: 3.1.0\nsecurity:\n  - oauth: [read, write]\n",
        );
        let requirement = &changes.security[0];
        assert_eq!(requirement.changes.len(), 1);
        assert_eq!(requirement.changes[0].property, "oauth");
        assert_eq!(requirement.changes[0].kind, ChangeKind::PropertyAdded);
        assert!(requirement.changes[0].breaking);
    }

    #[test]
    fn test_bare_scheme_gaining_scopes_is_modified() {
        let changes = compare(
            "openapi: 3.1.0\nsecurity:\n  - api: []\n",
            "openapi: 3.1.0\nsecurity:\n  - api: [read]\n",
        );
        assert_eq!(changes.total(), 1);
        let diff = &changes.security[0].changes[0];
        assert_eq!(diff.property, "api");
        assert_eq!(diff.kind, ChangeKind::Modified);
        assert_eq!(diff.original, Some(serde_json::json!([])));
        assert_eq!(diff.new, Some(serde_json::json!(["read"])));
        assert!(diff.breaking);

        let relaxed = compare(
            "openapi: 3.1.0\nsecurity:\n  - api: [read]\n",
            "openapi: 3.1.0\nsecurity:\n  - api: []\n",
        );
        let diff = &relaxed.security[0].changes[0];
        assert_eq!(diff.kind, ChangeKind::Modified);
        assert!(!diff.breaking);
    }

    #[test]
    fn test_removed_entry_records_its_map() {
        let left = "openapi: 3.1.0\npaths:\n  /p:\n    get:\n      responses:\n        '200':\n          description: ok\n        '201':\n          description: made\n";
        let right = "openapi: 3.1.0\npaths:\n  /p:\n    get:\n      responses:\n        '201':\n          description: made\n";
        let changes = compare(left, right);
        let diffs = changes.all_changes();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].property, "200");
        assert_eq!(diffs[0].kind, ChangeKind::ObjectRemoved);
        assert_eq!(
            diffs[0].entry,
            Some(MapEntry {
                field: None,
                kind: ObjectKind::Response,
            })
        );
        assert!(diffs[0].source.is_none());
    }
}
