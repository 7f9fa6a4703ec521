//! The variable context: every reachable path of a payload, addressable by string.
//!
//! Building walks the root value depth-first and records each object key
//! (`parent.key`) and array index (`parent[i]`), containers included. The
//! root's top-level keys are exposed unprefixed and again under the source
//! kind's alias (`blueprint.*` / `stack.*`). Where both spellings collide the
//! unprefixed entry wins.

use std::collections::BTreeMap;

use crate::domain::{
    path::{Lookup, Segment, VarPath, navigate},
    source::SourceKind,
    suggest::suggest,
    value::Value,
};

/// Immutable mapping from canonical paths to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableContext {
    entries: BTreeMap<VarPath, Value>,
    root: Value,
    kind: Option<SourceKind>,
}

impl VariableContext {
    /// Flatten a fetched payload, exposing it under the kind's alias as well.
    pub fn build(root: &Value, kind: SourceKind) -> Self {
        let mut entries = BTreeMap::new();
        let alias = kind.alias();

        if let Value::Object(map) = root {
            for (key, child) in map {
                flatten_into(VarPath::root(key.clone()), child, &mut entries);
            }
        }

        let mut aliased = BTreeMap::new();
        flatten_into(VarPath::root(alias), root, &mut aliased);
        for (path, value) in aliased {
            entries.entry(path).or_insert(value);
        }

        Self {
            entries,
            root: root.clone(),
            kind: Some(kind),
        }
    }

    /// Flatten without an alias; the shape used for custom variables.
    pub fn flatten(root: &Value) -> Self {
        let mut entries = BTreeMap::new();
        if let Value::Object(map) = root {
            for (key, child) in map {
                flatten_into(VarPath::root(key.clone()), child, &mut entries);
            }
        }
        Self {
            entries,
            root: root.clone(),
            kind: None,
        }
    }

    pub(crate) fn entries(&self) -> &BTreeMap<VarPath, Value> {
        &self.entries
    }

    /// Exact lookup of a path string; unparseable paths are simply absent.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let path = VarPath::parse(path).ok()?;
        self.entries.get(&path)
    }

    /// Resolve a path, classifying why it failed when it does.
    ///
    /// Exact entries win. Otherwise the longest recorded prefix is walked
    /// structurally so an index past the end of a known array is reported as
    /// out of range rather than plain missing.
    pub fn resolve(&self, path: &VarPath) -> Lookup<'_> {
        if let Some(value) = self.entries.get(path) {
            return Lookup::Found(value);
        }
        for n in (1..path.len()).rev() {
            let Some(prefix) = path.prefix(n) else {
                continue;
            };
            if let Some(value) = self.entries.get(&prefix) {
                return navigate(value, &path.segments()[n..]);
            }
        }
        Lookup::Missing
    }

    /// All entries in path order.
    pub fn list(&self) -> Vec<(&VarPath, &Value)> {
        self.entries.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &VarPath) -> bool {
        self.entries.contains_key(path)
    }

    /// The value this context was flattened from.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The source kind, if this context was built from a payload.
    pub fn kind(&self) -> Option<SourceKind> {
        self.kind
    }

    /// The alias namespace, if this context was built from a payload.
    pub fn alias(&self) -> Option<&'static str> {
        self.kind.map(|kind| kind.alias())
    }

    /// Whether `path` only exists as the aliased duplicate of another entry.
    pub fn is_alias_entry(&self, path: &VarPath) -> bool {
        let Some(alias) = self.alias() else {
            return false;
        };
        if path.head_key() != Some(alias) {
            return false;
        }
        match VarPath::from_segments(path.segments()[1..].to_vec()) {
            Some(unprefixed) => self.entries.contains_key(&unprefixed),
            None => true,
        }
    }

    /// Known paths resembling `wanted`.
    pub fn suggest(&self, wanted: &str) -> Vec<String> {
        let paths: Vec<String> = self.entries.keys().map(ToString::to_string).collect();
        suggest(wanted, paths.iter().map(String::as_str))
    }
}

/// Record `path -> value`, then recurse into children.
fn flatten_into(path: VarPath, value: &Value, out: &mut BTreeMap<VarPath, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(path.child(Segment::Key(key.clone())), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(path.child(Segment::Index(index)), child, out);
            }
        }
        _ => {}
    }
    out.insert(path, value.clone());
}
