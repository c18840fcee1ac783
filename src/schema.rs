//! Schema resolution: key path → field access path
//!
//! Walks a record's declared fields, keeping only those that carry the
//! configured annotation. Nested records (seen through at most one optional
//! wrapper) are descended into with the field's key path as the new
//! prefix; everything else is a leaf. Timestamps are leaves by kind.

use rustc_hash::FxHashMap;

use crate::error::{BindError, Result};
use crate::field::{FieldInfo, Kind};

/// Mapping from fully-qualified key path to the field indices leading to it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entries: FxHashMap<String, Vec<usize>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the schema of a record's fields
    ///
    /// `key_prefix` is prepended to every key path, `index` is the access
    /// path of the record itself (empty at the top level).
    pub fn resolve(
        fields: &[FieldInfo],
        tag: &str,
        key_prefix: &str,
        index: &[usize],
    ) -> Result<Self> {
        let mut schema = Self::new();

        for (i, field) in fields.iter().enumerate() {
            let Some(value) = field.tag(tag) else {
                continue;
            };
            if !field.exported {
                return Err(BindError::FieldNotExported { field: field.name });
            }

            let name = format!("{}/{}", key_prefix, value);
            let mut path = index.to_vec();
            path.push(i);

            let ty = field.type_info().deref();
            if ty.kind == Kind::Record {
                let nested = Self::resolve(&ty.fields(), tag, &name, &path)?;
                schema.entries.extend(nested.entries);
                continue;
            }

            // Colliding annotations overwrite; last declaration wins
            schema.entries.insert(name, path);
        }

        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove a key, marking it satisfied
    pub fn take(&mut self, name: &str) -> Option<Vec<usize>> {
        self.entries.remove(name)
    }

    /// All key paths, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Key paths with their access paths, sorted by key path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_slice()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}
