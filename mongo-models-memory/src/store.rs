//! In-memory storage implementation for model stores.
//!
//! Collections are ordered vectors of BSON documents behind async-aware read-write locks, so
//! natural order is insertion order, as with a fresh MongoDB collection.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document};
use tracing::trace;

use mongo_models_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{ModelError, ModelResult},
    index::IndexSpec,
    query::{FindOneAndDeleteOptions, FindOneAndModifyOptions, FindOneOptions, FindOptions, ReturnDocument, UpdateOptions},
    raw::{DeleteOutcome, ID_FIELD, RawResult, UpdateOutcome, ensure_id},
};

use crate::{
    evaluator::{Comparable, DocumentEvaluator, lookup},
    projection::{compare, project, sort_documents},
    update::{apply_replacement, apply_update, ensure_replacement, upsert_seed},
};

type CollectionMap = Vec<Document>;
type StoreMap = HashMap<String, CollectionMap>;
type IndexMap = HashMap<String, Vec<IndexSpec>>;


/// Thread-safe in-memory storage backend.
///
/// `InMemoryStore` is cloneable and uses `Arc`-wrapped internal state; clones share the same
/// data, so a clone kept by a test can observe what models wrote through another.
///
/// Every query scans the whole collection. Indexes are recorded but not used for lookups;
/// unique indexes are not enforced.
///
/// # Example
///
/// ```ignore
/// use mongo_models_memory::InMemoryStore;
/// use mongo_models::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// store.insert_one("users", doc! { "name": "Alice" }).await?;
///
/// assert_eq!(store.count("users", doc! {}).await?, 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> documents in natural order
    store: Arc<RwLock<StoreMap>>,
    /// collection name -> declared indexes
    indexes: Arc<RwLock<IndexMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
            indexes: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Creates a builder, for use with
    /// [`ModelStore::connect`](mongo_models_core::store::ModelStore::connect).
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns the indexes created on a collection.
    pub async fn indexes(&self, collection: &str) -> Vec<IndexSpec> {
        self.indexes
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the names of collections holding at least one document.
    pub async fn collection_names(&self) -> Vec<String> {
        let mut names = self
            .store
            .read()
            .await
            .iter()
            .filter(|(_, documents)| !documents.is_empty())
            .map(|(name, _)| name.clone())
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

/// Positions of the documents matching `filter`, ordered by `sort` when given.
fn select(documents: &[Document], filter: &Document, sort: Option<&Document>) -> ModelResult<Vec<usize>> {
    let mut positions = Vec::new();

    for (position, document) in documents.iter().enumerate() {
        if DocumentEvaluator::new(document).matches(filter)? {
            positions.push(position);
        }
    }

    if let Some(sort) = sort.filter(|sort| !sort.is_empty()) {
        positions.sort_by(|&a, &b| compare(&documents[a], &documents[b], sort));
    }

    Ok(positions)
}

fn projected(document: Document, projection: Option<&Document>) -> ModelResult<Document> {
    match projection {
        Some(projection) => project(document, projection),
        None => Ok(document),
    }
}

fn check_unique_ids(existing: &[Document], incoming: &[Document], collection: &str) -> ModelResult<()> {
    for (position, document) in incoming.iter().enumerate() {
        let id = document.get(ID_FIELD);
        let taken = existing
            .iter()
            .chain(&incoming[..position])
            .any(|other| other.get(ID_FIELD) == id);

        if taken {
            let id = id.map(ToString::to_string).unwrap_or_default();
            return Err(ModelError::DocumentAlreadyExists(id, collection.to_string()));
        }
    }

    Ok(())
}

impl InMemoryStore {
    async fn update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        multi: bool,
    ) -> ModelResult<UpdateOutcome> {
        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        let mut positions = select(documents, &filter, None)?;
        if !multi {
            positions.truncate(1);
        }

        if positions.is_empty() {
            if options.upsert != Some(true) {
                return Ok(UpdateOutcome::default());
            }

            let mut inserted = upsert_seed(&filter)?;
            apply_update(&mut inserted, &update, true)?;
            let id = ensure_id(&mut inserted);
            check_unique_ids(documents, std::slice::from_ref(&inserted), collection)?;
            documents.push(inserted);

            return Ok(UpdateOutcome { matched_count: 0, modified_count: 0, upserted_id: Some(id) });
        }

        // Apply every update before writing any, so a failing one leaves the collection untouched.
        let mut updated = Vec::with_capacity(positions.len());
        for &position in &positions {
            let mut document = documents[position].clone();
            apply_update(&mut document, &update, false)?;
            updated.push((position, document));
        }

        let mut modified_count = 0;
        for (position, document) in updated {
            if documents[position] != document {
                documents[position] = document;
                modified_count += 1;
            }
        }

        Ok(UpdateOutcome {
            matched_count: positions.len() as u64,
            modified_count,
            upserted_id: None,
        })
    }

    async fn delete(&self, collection: &str, filter: Document, multi: bool) -> ModelResult<DeleteOutcome> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(DeleteOutcome::default());
        };

        let mut positions = select(documents, &filter, None)?;
        if !multi {
            positions.truncate(1);
        }

        for &position in positions.iter().rev() {
            documents.remove(position);
        }

        Ok(DeleteOutcome { deleted_count: positions.len() as u64 })
    }

    /// Shared body of find-and-update and find-and-replace.
    async fn find_and_modify(
        &self,
        collection: &str,
        filter: Document,
        modify: impl Fn(&Document) -> ModelResult<Document> + Send,
        upsert: impl FnOnce() -> ModelResult<Document> + Send,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        let return_after = options.return_document == Some(ReturnDocument::After);
        let position = select(documents, &filter, options.sort.as_ref())?
            .into_iter()
            .next();

        let value = match position {
            Some(position) => {
                let before = documents[position].clone();
                let after = modify(&before)?;
                documents[position] = after.clone();

                Some(if return_after { after } else { before })
            }
            None if options.upsert == Some(true) => {
                let mut inserted = upsert()?;
                ensure_id(&mut inserted);
                check_unique_ids(documents, std::slice::from_ref(&inserted), collection)?;
                documents.push(inserted.clone());

                return_after.then_some(inserted)
            }
            None => None,
        };

        Ok(RawResult::FindAndModify {
            value: value
                .map(|document| projected(document, options.projection.as_ref()))
                .transpose()?,
        })
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn find(&self, collection: &str, filter: Document, options: FindOptions) -> ModelResult<RawResult> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(RawResult::Documents(vec![]));
        };

        let mut matched = DocumentEvaluator::filter_documents(documents, &filter)?;
        if let Some(sort) = &options.sort {
            sort_documents(&mut matched, sort);
        }

        trace!(collection, matched = matched.len(), "in-memory find");

        Ok(RawResult::Documents(
            matched
                .into_iter()
                .skip(options.skip.unwrap_or(0) as usize)
                // A limit of 0 means no limit, as on the server.
                .take(
                    options
                        .limit
                        .filter(|limit| *limit > 0)
                        .map_or(usize::MAX, |limit| limit as usize),
                )
                .map(|document| projected(document, options.projection.as_ref()))
                .collect::<ModelResult<Vec<_>>>()?,
        ))
    }

    async fn find_one(&self, collection: &str, filter: Document, options: FindOneOptions) -> ModelResult<RawResult> {
        let options = FindOptions {
            projection: options.projection,
            sort: options.sort,
            limit: Some(1),
            skip: None,
        };

        match self.find(collection, filter, options).await? {
            RawResult::Documents(documents) => Ok(documents
                .into_iter()
                .next()
                .map_or(RawResult::Null, RawResult::Document)),
            other => Ok(other),
        }
    }

    async fn insert_one(&self, collection: &str, document: Document) -> ModelResult<RawResult> {
        self.insert_many(collection, vec![document]).await
    }

    async fn insert_many(&self, collection: &str, mut documents: Vec<Document>) -> ModelResult<RawResult> {
        for document in &mut documents {
            ensure_id(document);
        }

        let mut store = self.store.write().await;
        let existing = store
            .entry(collection.to_string())
            .or_default();

        check_unique_ids(existing, &documents, collection)?;
        existing.extend(documents.iter().cloned());

        Ok(RawResult::Write { ops: documents })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        self.update(collection, filter, update, options, false).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        self.update(collection, filter, update, options, true).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        ensure_replacement(&replacement)?;

        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        match select(documents, &filter, None)?.first() {
            Some(&position) => {
                let replaced = apply_replacement(&documents[position], &replacement)?;
                let modified = documents[position] != replaced;
                documents[position] = replaced;

                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                    upserted_id: None,
                })
            }
            None if options.upsert == Some(true) => {
                let mut inserted = upsert_seed(&filter)?
                    .get(ID_FIELD)
                    .map(|id| bson::doc! { ID_FIELD: id.clone() })
                    .unwrap_or_default();
                inserted.extend(replacement);
                let id = ensure_id(&mut inserted);
                check_unique_ids(documents, std::slice::from_ref(&inserted), collection)?;
                documents.push(inserted);

                Ok(UpdateOutcome { matched_count: 0, modified_count: 0, upserted_id: Some(id) })
            }
            None => Ok(UpdateOutcome::default()),
        }
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome> {
        self.delete(collection, filter, false).await
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome> {
        self.delete(collection, filter, true).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        let seed = upsert_seed(&filter)?;

        self.find_and_modify(
            collection,
            filter,
            |existing| {
                let mut document = existing.clone();
                apply_update(&mut document, &update, false)?;
                Ok(document)
            },
            || {
                let mut inserted = seed;
                apply_update(&mut inserted, &update, true)?;
                Ok(inserted)
            },
            options,
        )
        .await
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        ensure_replacement(&replacement)?;
        let seed = upsert_seed(&filter)?;

        self.find_and_modify(
            collection,
            filter,
            |existing| apply_replacement(existing, &replacement),
            || {
                let mut inserted = seed
                    .get(ID_FIELD)
                    .map(|id| bson::doc! { ID_FIELD: id.clone() })
                    .unwrap_or_default();
                inserted.extend(replacement.clone());
                Ok(inserted)
            },
            options,
        )
        .await
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: FindOneAndDeleteOptions,
    ) -> ModelResult<RawResult> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(RawResult::FindAndModify { value: None });
        };

        let value = match select(documents, &filter, options.sort.as_ref())?.first() {
            Some(&position) => Some(projected(documents.remove(position), options.projection.as_ref())?),
            None => None,
        };

        Ok(RawResult::FindAndModify { value })
    }

    async fn count(&self, collection: &str, filter: Document) -> ModelResult<u64> {
        let store = self.store.read().await;

        match store.get(collection) {
            Some(documents) => Ok(select(documents, &filter, None)?.len() as u64),
            None => Ok(0),
        }
    }

    async fn distinct(&self, collection: &str, field: &str, filter: Document) -> ModelResult<Vec<Bson>> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut values: Vec<Bson> = Vec::new();

        for position in select(documents, &filter, None)? {
            for value in lookup(&documents[position], field) {
                let candidates = match value {
                    Bson::Array(items) => items.iter().collect::<Vec<_>>(),
                    single => vec![single],
                };

                for candidate in candidates {
                    let seen = values
                        .iter()
                        .any(|known| Comparable::from(known) == Comparable::from(candidate));

                    if !seen {
                        values.push(candidate.clone());
                    }
                }
            }
        }

        Ok(values)
    }

    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexSpec>) -> ModelResult<Vec<String>> {
        let mut registered = self.indexes.write().await;
        let existing = registered
            .entry(collection.to_string())
            .or_default();

        let mut names = Vec::with_capacity(indexes.len());

        for index in indexes {
            let name = index.resolved_name();

            match existing
                .iter()
                .position(|known| known.resolved_name() == name)
            {
                Some(position) => existing[position] = index,
                None => existing.push(index),
            }

            names.push(name);
        }

        Ok(names)
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new, empty [`InMemoryStore`]. Always succeeds.
    async fn build(self) -> ModelResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
