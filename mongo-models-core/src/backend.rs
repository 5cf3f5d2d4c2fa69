//! Storage backend abstraction for models.
//!
//! The [`StoreBackend`] trait exposes the collection primitives of a document database client,
//! one method per primitive, each with an explicit signature. Document-returning primitives tag
//! their response with a [`RawResult`] variant; mutation primitives report counts.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The collection primitives
//! - [`StoreBackendBuilder`]: Connects and produces a backend instance
//!
//! # Examples
//!
//! ```ignore
//! use mongo_models::backend::StoreBackend;
//! use bson::doc;
//!
//! let raw = backend.insert_one("customers", doc! { "name": "Ren" }).await?;
//! let count = backend.count("customers", doc! {}).await?;
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};
use std::{fmt::Debug, sync::Arc};

use crate::{
    error::ModelResult,
    index::IndexSpec,
    query::{FindOneAndDeleteOptions, FindOneAndModifyOptions, FindOneOptions, FindOptions, UpdateOptions},
    raw::{DeleteOutcome, RawResult, UpdateOutcome},
};

/// Collection primitives of a document store.
///
/// Implementations must be thread-safe; a single backend instance is shared by every model and
/// every in-flight operation. Consistency guarantees are whatever the underlying store provides.
///
/// Errors reported by the store are returned as
/// [`ModelError::Backend`](crate::error::ModelError::Backend).
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Finds every document matching `filter`.
    ///
    /// Returns [`RawResult::Documents`].
    async fn find(&self, collection: &str, filter: Document, options: FindOptions) -> ModelResult<RawResult>;

    /// Finds the first document matching `filter`.
    ///
    /// Returns [`RawResult::Document`], or [`RawResult::Null`] when nothing matches.
    async fn find_one(&self, collection: &str, filter: Document, options: FindOneOptions) -> ModelResult<RawResult>;

    /// Inserts one document, assigning an `_id` when it has none.
    ///
    /// Returns [`RawResult::Write`] carrying the inserted document.
    async fn insert_one(&self, collection: &str, document: Document) -> ModelResult<RawResult>;

    /// Inserts several documents in order, assigning an `_id` to those without one.
    ///
    /// Returns [`RawResult::Write`] carrying the inserted documents.
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> ModelResult<RawResult>;

    /// Applies an update document to the first document matching `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome>;

    /// Applies an update document to every document matching `filter`.
    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome>;

    /// Replaces the first document matching `filter`, keeping its `_id`.
    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome>;

    /// Deletes the first document matching `filter`.
    async fn delete_one(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome>;

    /// Deletes every document matching `filter`.
    async fn delete_many(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome>;

    /// Updates the first document matching `filter` and returns it.
    ///
    /// Returns [`RawResult::FindAndModify`]. Without an explicit
    /// [`ReturnDocument`](crate::query::ReturnDocument) the original document is returned.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult>;

    /// Replaces the first document matching `filter` and returns it.
    ///
    /// Returns [`RawResult::FindAndModify`].
    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult>;

    /// Deletes the first document matching `filter` and returns it.
    ///
    /// Returns [`RawResult::FindAndModify`].
    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: FindOneAndDeleteOptions,
    ) -> ModelResult<RawResult>;

    /// Counts the documents matching `filter`.
    async fn count(&self, collection: &str, filter: Document) -> ModelResult<u64>;

    /// Returns the distinct values of `field` across documents matching `filter`.
    async fn distinct(&self, collection: &str, field: &str, filter: Document) -> ModelResult<Vec<Bson>>;

    /// Creates indexes on a collection, returning their names.
    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexSpec>) -> ModelResult<Vec<String>>;

    /// Closes connections and releases resources.
    ///
    /// The default implementation is a no-op; backends holding connections override it.
    async fn shutdown(&self) -> ModelResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for Arc<B>
where
    B: StoreBackend + ?Sized,
{
    async fn find(&self, collection: &str, filter: Document, options: FindOptions) -> ModelResult<RawResult> {
        (**self).find(collection, filter, options).await
    }

    async fn find_one(&self, collection: &str, filter: Document, options: FindOneOptions) -> ModelResult<RawResult> {
        (**self).find_one(collection, filter, options).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> ModelResult<RawResult> {
        (**self).insert_one(collection, document).await
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> ModelResult<RawResult> {
        (**self).insert_many(collection, documents).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        (**self)
            .update_one(collection, filter, update, options)
            .await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        (**self)
            .update_many(collection, filter, update, options)
            .await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        (**self)
            .replace_one(collection, filter, replacement, options)
            .await
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome> {
        (**self).delete_one(collection, filter).await
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome> {
        (**self).delete_many(collection, filter).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        (**self)
            .find_one_and_update(collection, filter, update, options)
            .await
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        (**self)
            .find_one_and_replace(collection, filter, replacement, options)
            .await
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: FindOneAndDeleteOptions,
    ) -> ModelResult<RawResult> {
        (**self)
            .find_one_and_delete(collection, filter, options)
            .await
    }

    async fn count(&self, collection: &str, filter: Document) -> ModelResult<u64> {
        (**self).count(collection, filter).await
    }

    async fn distinct(&self, collection: &str, field: &str, filter: Document) -> ModelResult<Vec<Bson>> {
        (**self).distinct(collection, field, filter).await
    }

    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexSpec>) -> ModelResult<Vec<String>> {
        (**self).create_indexes(collection, indexes).await
    }

    async fn shutdown(&self) -> ModelResult<()> {
        (**self).shutdown().await
    }
}

/// Connects to a store and produces a backend.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    /// Establishes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Initialization`](crate::error::ModelError::Initialization) when the
    /// store cannot be reached or configured.
    async fn build(self) -> ModelResult<Self::Backend>;
}
