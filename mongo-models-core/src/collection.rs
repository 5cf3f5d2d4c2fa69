//! The CRUD surface of a model.
//!
//! A [`ModelCollection`] binds a model type to its collection on a shared backend. Every
//! operation has a typed signature; document-returning operations route the backend's
//! [`RawResult`] through the [normalizer](crate::normalize), while mutations report counts.
//!
//! # Example
//!
//! ```ignore
//! use mongo_models::prelude::*;
//! use bson::doc;
//!
//! let customers = store.model::<Customer>();
//!
//! let inserted = customers.insert_one(&Customer::new("Ren")).await?;
//! let found = customers.find(doc! { "name": "Ren" }, FindOptions::default()).await?;
//! let page = customers.paged_find(doc! {}, "name", "-name", 10, 1).await?;
//! ```

use bson::{Bson, Document, doc};
use std::marker::PhantomData;
use tracing::trace;

use crate::{
    adapter::{Fields, SortSpec},
    backend::StoreBackend,
    error::{ModelError, ModelResult},
    index::IndexSpec,
    model::{Model, ModelExt},
    normalize::{Normalized, normalize},
    page::{PageResult, PaginationParams},
    query::{
        FindOneAndDeleteOptions, FindOneAndModifyOptions, FindOneOptions, FindOptions, ReturnDocument,
        UpdateOptions,
    },
    raw::{ID_FIELD, RawResult},
};

/// A model type bound to its collection on a backend.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the backend reference
/// * `B` - The storage backend type
/// * `D` - The model type
#[derive(Debug)]
pub struct ModelCollection<'a, B: StoreBackend, D: Model> {
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<B: StoreBackend, D: Model> Clone for ModelCollection<'_, B, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: StoreBackend, D: Model> Copy for ModelCollection<'_, B, D> {}

impl<'a, B: StoreBackend, D: Model> ModelCollection<'a, B, D> {
    pub(crate) fn new(backend: &'a B) -> Self {
        Self { backend, _marker: PhantomData }
    }

    /// Returns the name of the collection this model is bound to.
    pub fn name(&self) -> &'static str {
        D::collection_name()
    }

    /// Finds every document matching `filter`.
    ///
    /// # Arguments
    ///
    /// * `filter` - A MongoDB filter document
    /// * `options` - Projection, sort, limit and skip
    ///
    /// Projected documents are still converted into `D`, so a projection may only drop fields
    /// that are `Option` or `#[serde(default)]` on the model.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails or a document does not convert into `D`,
    /// including when the projection removed a field `D` requires.
    pub async fn find(&self, filter: Document, options: FindOptions) -> ModelResult<Vec<D>> {
        normalize::<D, _>(
            self.backend
                .find(self.name(), filter, options)
                .await,
        )?
        .into_instances()
    }

    /// Finds the first document matching `filter`.
    ///
    /// A record without an `_id` (for example when the projection excludes it) is returned as
    /// [`Normalized::Plain`].
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails or the document does not convert into `D`.
    pub async fn find_one(&self, filter: Document, options: FindOneOptions) -> ModelResult<Normalized<D>> {
        normalize(
            self.backend
                .find_one(self.name(), filter, options)
                .await,
        )
    }

    /// Finds the document with the given identifier.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier, coerced with [`Model::coerce_id`]
    /// * `options` - Projection and sort
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidId`] without contacting the backend when the identifier
    /// cannot be coerced.
    pub async fn find_by_id(&self, id: impl Into<Bson>, options: FindOneOptions) -> ModelResult<Normalized<D>> {
        let filter = id_filter::<D>(id)?;
        self.find_one(filter, options).await
    }

    /// Inserts one instance, returning it as stored (with its `_id` assigned).
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if serialization or the insert fails.
    pub async fn insert_one(&self, instance: &D) -> ModelResult<Vec<D>> {
        let document = instance.to_document()?;

        normalize::<D, _>(
            self.backend
                .insert_one(self.name(), document)
                .await,
        )?
        .into_instances()
    }

    /// Inserts several instances in order, returning them as stored.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if serialization or the insert fails.
    pub async fn insert_many(&self, instances: &[D]) -> ModelResult<Vec<D>> {
        let documents = instances
            .iter()
            .map(ModelExt::to_document)
            .collect::<ModelResult<Vec<_>>>()?;

        normalize::<D, _>(
            self.backend
                .insert_many(self.name(), documents)
                .await,
        )?
        .into_instances()
    }

    /// Updates the first document matching `filter`, returning the modified count.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails.
    pub async fn update_one(&self, filter: Document, update: Document, options: UpdateOptions) -> ModelResult<u64> {
        Ok(self
            .backend
            .update_one(self.name(), filter, update, options)
            .await?
            .modified_count)
    }

    /// Updates every document matching `filter`, returning the modified count.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails.
    pub async fn update_many(&self, filter: Document, update: Document, options: UpdateOptions) -> ModelResult<u64> {
        Ok(self
            .backend
            .update_many(self.name(), filter, update, options)
            .await?
            .modified_count)
    }

    /// Replaces the first document matching `filter`, returning the modified count.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails.
    pub async fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
        options: UpdateOptions,
    ) -> ModelResult<u64> {
        Ok(self
            .backend
            .replace_one(self.name(), filter, replacement, options)
            .await?
            .modified_count)
    }

    /// Replaces every document matching `filter`, returning the summed modified count.
    ///
    /// Matches are resolved first and each is replaced by `_id`, so documents inserted
    /// concurrently are not affected. With `upsert` set and no match, a single replacement is
    /// upserted against `filter`.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails; replacements already applied stay applied.
    pub async fn replace_many(
        &self,
        filter: Document,
        replacement: Document,
        options: UpdateOptions,
    ) -> ModelResult<u64> {
        let matches = FindOptions {
            projection: Some(doc! { ID_FIELD: 1 }),
            ..FindOptions::default()
        };

        let ids = match self
            .backend
            .find(self.name(), filter.clone(), matches)
            .await?
        {
            RawResult::Documents(documents) => documents
                .into_iter()
                .filter_map(|mut document| document.remove(ID_FIELD))
                .collect::<Vec<_>>(),
            RawResult::Null => Vec::new(),
            other => {
                return Err(ModelError::UnexpectedResult(format!(
                    "expected a document sequence from find, got {other:?}"
                )));
            }
        };

        if ids.is_empty() && options.upsert == Some(true) {
            return self
                .replace_one(filter, replacement, options)
                .await;
        }

        let mut modified = 0;
        for id in ids {
            modified += self
                .backend
                .replace_one(self.name(), doc! { ID_FIELD: id }, replacement.clone(), options.clone())
                .await?
                .modified_count;
        }

        Ok(modified)
    }

    /// Deletes the first document matching `filter`, returning the deleted count.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails.
    pub async fn delete_one(&self, filter: Document) -> ModelResult<u64> {
        Ok(self
            .backend
            .delete_one(self.name(), filter)
            .await?
            .deleted_count)
    }

    /// Deletes every document matching `filter`, returning the deleted count.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails.
    pub async fn delete_many(&self, filter: Document) -> ModelResult<u64> {
        Ok(self
            .backend
            .delete_many(self.name(), filter)
            .await?
            .deleted_count)
    }

    /// Updates the first document matching `filter` and returns it.
    ///
    /// Unless `options` says otherwise, the updated document is returned.
    ///
    /// # Returns
    ///
    /// `None` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails or the document does not convert into `D`.
    pub async fn find_one_and_update(
        &self,
        filter: Document,
        update: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<Option<D>> {
        normalize::<D, _>(
            self.backend
                .find_one_and_update(self.name(), filter, update, return_after(options))
                .await,
        )?
        .into_option()
    }

    /// Replaces the first document matching `filter` and returns it.
    ///
    /// Unless `options` says otherwise, the replacement is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails or the document does not convert into `D`.
    pub async fn find_one_and_replace(
        &self,
        filter: Document,
        replacement: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<Option<D>> {
        normalize::<D, _>(
            self.backend
                .find_one_and_replace(self.name(), filter, replacement, return_after(options))
                .await,
        )?
        .into_option()
    }

    /// Deletes the first document matching `filter` and returns it.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the backend fails or the document does not convert into `D`.
    pub async fn find_one_and_delete(
        &self,
        filter: Document,
        options: FindOneAndDeleteOptions,
    ) -> ModelResult<Option<D>> {
        normalize::<D, _>(
            self.backend
                .find_one_and_delete(self.name(), filter, options)
                .await,
        )?
        .into_option()
    }

    /// Updates the document with the given identifier and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidId`] without contacting the backend when the identifier
    /// cannot be coerced.
    pub async fn find_by_id_and_update(
        &self,
        id: impl Into<Bson>,
        update: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<Option<D>> {
        let filter = id_filter::<D>(id)?;
        self.find_one_and_update(filter, update, options)
            .await
    }

    /// Deletes the document with the given identifier and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidId`] without contacting the backend when the identifier
    /// cannot be coerced.
    pub async fn find_by_id_and_delete(
        &self,
        id: impl Into<Bson>,
        options: FindOneAndDeleteOptions,
    ) -> ModelResult<Option<D>> {
        let filter = id_filter::<D>(id)?;
        self.find_one_and_delete(filter, options)
            .await
    }

    /// Counts the documents matching `filter`.
    pub async fn count(&self, filter: Document) -> ModelResult<u64> {
        self.backend.count(self.name(), filter).await
    }

    /// Returns the distinct values of `field` across documents matching `filter`.
    pub async fn distinct(&self, field: &str, filter: Document) -> ModelResult<Vec<Bson>> {
        self.backend
            .distinct(self.name(), field, filter)
            .await
    }

    /// Fetches one page of documents matching `filter` together with page metadata.
    ///
    /// The count and the bounded find run concurrently; if either fails the whole call fails
    /// with that error.
    ///
    /// # Arguments
    ///
    /// * `filter` - A MongoDB filter document
    /// * `fields` - Projection, as a document or a field list such as `"name -secret"`
    /// * `sort` - Sort order, as a document or a field list such as `"-created"`
    /// * `limit` - Items per page
    /// * `page` - The 1-indexed page number
    ///
    /// As with [`find`](Self::find), `fields` may only drop fields that are `Option` or
    /// `#[serde(default)]` on the model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] when `limit` is zero, or the error of the failing
    /// sub-operation. A projection that removes a required field fails with
    /// [`ModelError::Serialization`].
    pub async fn paged_find(
        &self,
        filter: Document,
        fields: impl Into<Fields>,
        sort: impl Into<SortSpec>,
        limit: u64,
        page: u64,
    ) -> ModelResult<PageResult<D>> {
        if limit == 0 {
            return Err(ModelError::InvalidArgument("page limit must be greater than zero".into()));
        }

        let params = PaginationParams::new(page, limit);
        let options = FindOptions::builder()
            .fields(fields)
            .sort(sort)
            .limit(limit)
            .skip(params.offset())
            .build();

        trace!(collection = self.name(), page, limit, skip = params.offset(), "paged find");

        let (total, data) = futures::try_join!(self.count(filter.clone()), self.find(filter, options))?;

        Ok(PageResult::new(data, total, params))
    }

    /// Creates indexes on this model's collection, returning their names.
    pub async fn create_indexes(&self, indexes: Vec<IndexSpec>) -> ModelResult<Vec<String>> {
        self.backend
            .create_indexes(self.name(), indexes)
            .await
    }
}

fn id_filter<D: Model>(id: impl Into<Bson>) -> ModelResult<Document> {
    Ok(doc! { ID_FIELD: D::coerce_id(id.into())? })
}

fn return_after(mut options: FindOneAndModifyOptions) -> FindOneAndModifyOptions {
    options
        .return_document
        .get_or_insert(ReturnDocument::After);
    options
}
