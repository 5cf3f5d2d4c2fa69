#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use mongo_models::{
    async_trait,
    bson::{Bson, Document, doc, oid::ObjectId},
    memory::InMemoryStore,
    prelude::*,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[model(collection = "dummies", schema = dummy_schema, indexes = dummy_indexes)]
pub struct Dummy {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(rename = "hasHat", default)]
    pub has_hat: bool,
}

impl Dummy {
    pub fn new(name: &str) -> Self {
        Self { id: None, name: name.to_string(), has_hat: false }
    }

    pub fn with_hat(mut self) -> Self {
        self.has_hat = true;
        self
    }
}

fn dummy_schema() -> Schema {
    Schema::object()
        .field("_id", FieldRule::object_id())
        .field("name", FieldRule::string().required())
        .field("hasHat", FieldRule::boolean())
}

fn dummy_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::new(doc! { "name": 1 }),
        IndexSpec::new(doc! { "hasHat": -1 }),
    ]
}

/// A model without indexes, keyed by plain strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[model(collection = "tags", id = string_id)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    pub label: String,
}

fn string_id(id: Bson) -> ModelResult<Bson> {
    match id {
        Bson::String(id) if !id.is_empty() => Ok(Bson::String(id)),
        other => Err(ModelError::InvalidId(format!("tag ids are non-empty strings, got {other}"))),
    }
}

/// Wraps an [`InMemoryStore`], counting backend calls and failing on demand.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
    shutdowns: AtomicUsize,
    fail_count: AtomicBool,
    fail_find: AtomicBool,
    fail_indexes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn fail_count(&self) {
        self.fail_count.store(true, Ordering::SeqCst);
    }

    pub fn fail_find(&self) {
        self.fail_find.store(true, Ordering::SeqCst);
    }

    pub fn fail_indexes(&self) {
        self.fail_indexes.store(true, Ordering::SeqCst);
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> ModelResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(ModelError::Backend(format!("{what} failed")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StoreBackend for RecordingStore {
    async fn find(&self, collection: &str, filter: Document, options: FindOptions) -> ModelResult<RawResult> {
        self.record();
        Self::check(&self.fail_find, "find")?;
        self.inner.find(collection, filter, options).await
    }

    async fn find_one(&self, collection: &str, filter: Document, options: FindOneOptions) -> ModelResult<RawResult> {
        self.record();
        self.inner.find_one(collection, filter, options).await
    }

    async fn insert_one(&self, collection: &str, document: Document) -> ModelResult<RawResult> {
        self.record();
        self.inner.insert_one(collection, document).await
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> ModelResult<RawResult> {
        self.record();
        self.inner.insert_many(collection, documents).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        self.record();
        self.inner.update_one(collection, filter, update, options).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        self.record();
        self.inner.update_many(collection, filter, update, options).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        self.record();
        self.inner.replace_one(collection, filter, replacement, options).await
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome> {
        self.record();
        self.inner.delete_one(collection, filter).await
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome> {
        self.record();
        self.inner.delete_many(collection, filter).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        self.record();
        self.inner.find_one_and_update(collection, filter, update, options).await
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        self.record();
        self.inner.find_one_and_replace(collection, filter, replacement, options).await
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: FindOneAndDeleteOptions,
    ) -> ModelResult<RawResult> {
        self.record();
        self.inner.find_one_and_delete(collection, filter, options).await
    }

    async fn count(&self, collection: &str, filter: Document) -> ModelResult<u64> {
        self.record();
        Self::check(&self.fail_count, "count")?;
        self.inner.count(collection, filter).await
    }

    async fn distinct(&self, collection: &str, field: &str, filter: Document) -> ModelResult<Vec<Bson>> {
        self.record();
        self.inner.distinct(collection, field, filter).await
    }

    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexSpec>) -> ModelResult<Vec<String>> {
        self.record();
        Self::check(&self.fail_indexes, "createIndexes")?;
        self.inner.create_indexes(collection, indexes).await
    }

    async fn shutdown(&self) -> ModelResult<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.inner.shutdown().await
    }
}

/// Builds a fresh [`RecordingStore`].
#[derive(Default)]
pub struct RecordingStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for RecordingStoreBuilder {
    type Backend = RecordingStore;

    async fn build(self) -> ModelResult<Self::Backend> {
        Ok(RecordingStore::new())
    }
}

/// A builder whose connection attempt always fails.
pub struct UnreachableBuilder;

#[async_trait]
impl StoreBackendBuilder for UnreachableBuilder {
    type Backend = RecordingStore;

    async fn build(self) -> ModelResult<Self::Backend> {
        Err(ModelError::Initialization("connection refused".into()))
    }
}

pub fn recording_store() -> ModelStore<RecordingStore> {
    ModelStore::new(RecordingStore::new())
}

pub async fn seed(store: &ModelStore<RecordingStore>, names: &[&str]) -> Vec<Dummy> {
    let dummies = names.iter().map(|name| Dummy::new(name)).collect::<Vec<_>>();

    store
        .model::<Dummy>()
        .insert_many(&dummies)
        .await
        .expect("seed dummies")
}
