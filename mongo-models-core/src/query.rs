//! Options accepted by model operations.
//!
//! Filters, updates and replacements are native MongoDB documents; this module only describes
//! the knobs around them. Builders run the [field and sort adapters](crate::adapter), so string
//! shorthands work everywhere:
//!
//! ```ignore
//! use mongo_models::query::FindOptions;
//!
//! let options = FindOptions::builder()
//!     .fields("name email -_id")
//!     .sort("-created name")
//!     .limit(10)
//!     .skip(20)
//!     .build();
//! ```

use bson::Document;

use crate::adapter::{Fields, SortSpec};

/// Which version of the document a find-and-modify operation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnDocument {
    /// The document as it was before the modification.
    Before,
    /// The document as it is after the modification.
    After,
}

/// Options for a multi-document find.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Fields to include or exclude.
    pub projection: Option<Document>,
    /// Sort order.
    pub sort: Option<Document>,
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
    /// Number of documents to skip.
    pub skip: Option<u64>,
}

impl FindOptions {
    /// Creates a builder for fluent construction.
    pub fn builder() -> FindOptionsBuilder {
        FindOptionsBuilder::default()
    }
}

/// Builder for [`FindOptions`].
#[derive(Debug, Clone, Default)]
pub struct FindOptionsBuilder {
    options: FindOptions,
}

impl FindOptionsBuilder {
    /// Sets the projection, as a document or a field list such as `"name -secret"`.
    pub fn fields(mut self, fields: impl Into<Fields>) -> Self {
        self.options.projection = Some(fields.into().into_document());
        self
    }

    /// Sets the sort order, as a document or a field list such as `"name -age"`.
    pub fn sort(mut self, sort: impl Into<SortSpec>) -> Self {
        self.options.sort = Some(sort.into().into_document());
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: u64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.options.skip = Some(skip);
        self
    }

    /// Builds the options.
    pub fn build(self) -> FindOptions {
        self.options
    }
}

/// Options for a single-document find.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOneOptions {
    /// Fields to include or exclude.
    pub projection: Option<Document>,
    /// Sort order used to pick the document when several match.
    pub sort: Option<Document>,
}

impl FindOneOptions {
    /// Options with the given projection.
    pub fn fields(fields: impl Into<Fields>) -> Self {
        Self { projection: Some(fields.into().into_document()), sort: None }
    }

    /// Sets the sort order.
    pub fn with_sort(mut self, sort: impl Into<SortSpec>) -> Self {
        self.sort = Some(sort.into().into_document());
        self
    }
}

/// Options for update and replace operations that report counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    /// Insert a document when nothing matches.
    pub upsert: Option<bool>,
}

impl UpdateOptions {
    /// Options with upsert enabled.
    pub fn upsert() -> Self {
        Self { upsert: Some(true) }
    }
}

/// Options for find-and-update and find-and-replace operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOneAndModifyOptions {
    /// Fields to include or exclude in the returned document.
    pub projection: Option<Document>,
    /// Sort order used to pick the document when several match.
    pub sort: Option<Document>,
    /// Insert a document when nothing matches.
    pub upsert: Option<bool>,
    /// Which version of the document to return. Model operations default this to
    /// [`ReturnDocument::After`].
    pub return_document: Option<ReturnDocument>,
}

impl FindOneAndModifyOptions {
    /// Creates a builder for fluent construction.
    pub fn builder() -> FindOneAndModifyOptionsBuilder {
        FindOneAndModifyOptionsBuilder::default()
    }
}

/// Builder for [`FindOneAndModifyOptions`].
#[derive(Debug, Clone, Default)]
pub struct FindOneAndModifyOptionsBuilder {
    options: FindOneAndModifyOptions,
}

impl FindOneAndModifyOptionsBuilder {
    pub fn fields(mut self, fields: impl Into<Fields>) -> Self {
        self.options.projection = Some(fields.into().into_document());
        self
    }

    pub fn sort(mut self, sort: impl Into<SortSpec>) -> Self {
        self.options.sort = Some(sort.into().into_document());
        self
    }

    pub fn upsert(mut self, upsert: bool) -> Self {
        self.options.upsert = Some(upsert);
        self
    }

    pub fn return_document(mut self, return_document: ReturnDocument) -> Self {
        self.options.return_document = Some(return_document);
        self
    }

    pub fn build(self) -> FindOneAndModifyOptions {
        self.options
    }
}

/// Options for find-and-delete operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOneAndDeleteOptions {
    /// Fields to include or exclude in the returned document.
    pub projection: Option<Document>,
    /// Sort order used to pick the document when several match.
    pub sort: Option<Document>,
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn builders_run_the_adapters() {
        let options = FindOptions::builder()
            .fields("name -_id")
            .sort("-created")
            .limit(5)
            .skip(10)
            .build();

        assert_eq!(options.projection, Some(doc! { "name": true, "_id": false }));
        assert_eq!(options.sort, Some(doc! { "created": -1 }));
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.skip, Some(10));
    }

    #[test]
    fn find_and_modify_builder_leaves_unset_fields_empty() {
        let options = FindOneAndModifyOptions::builder().upsert(true).build();

        assert_eq!(options.upsert, Some(true));
        assert_eq!(options.return_document, None);
        assert_eq!(options.projection, None);
    }
}
