//! Index specifications declared by models.

use bson::{Bson, Document};

/// A single index on a model's collection.
///
/// `keys` maps field names to a direction (`1` or `-1`) or an index type such as `"text"`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    /// The indexed keys, in order.
    pub keys: Document,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// An explicit index name. Backends derive one from the keys when unset.
    pub name: Option<String>,
}

impl IndexSpec {
    /// Creates a non-unique index over the given keys.
    pub fn new(keys: Document) -> Self {
        Self { keys, unique: false, name: None }
    }

    /// Marks the index as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Gives the index an explicit name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The index name, using MongoDB's `field_direction` convention when none was set.
    pub fn resolved_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        self.keys
            .iter()
            .map(|(field, direction)| match direction {
                Bson::String(kind) => format!("{field}_{kind}"),
                Bson::Int32(n) => format!("{field}_{n}"),
                Bson::Int64(n) => format!("{field}_{n}"),
                Bson::Double(n) => format!("{field}_{n}"),
                other => format!("{field}_{other}"),
            })
            .collect::<Vec<_>>()
            .join("_")
    }
}
