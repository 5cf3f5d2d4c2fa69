use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document};
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    options::{
        ClientOptions, FindOneAndDeleteOptions as MongoFindOneAndDeleteOptions,
        FindOneAndReplaceOptions, FindOneAndUpdateOptions, FindOneOptions as MongoFindOneOptions,
        FindOptions as MongoFindOptions, IndexOptions, ReplaceOptions,
        ReturnDocument as MongoReturnDocument, UpdateOptions as MongoUpdateOptions,
    },
};
use tracing::debug;

use mongo_models_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    config::ConnectionConfig,
    error::{ModelError, ModelResult},
    index::IndexSpec,
    query::{FindOneAndDeleteOptions, FindOneAndModifyOptions, FindOneOptions, FindOptions, ReturnDocument, UpdateOptions},
    raw::{DeleteOutcome, RawResult, UpdateOutcome, ensure_id},
};


#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    /// The underlying driver client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }
}

fn return_document(options: &FindOneAndModifyOptions) -> Option<MongoReturnDocument> {
    options
        .return_document
        .map(|mode| match mode {
            ReturnDocument::Before => MongoReturnDocument::Before,
            ReturnDocument::After => MongoReturnDocument::After,
        })
}

fn update_options(options: UpdateOptions) -> MongoUpdateOptions {
    let mut update = MongoUpdateOptions::default();
    update.upsert = options.upsert;
    update
}

fn index_model(index: IndexSpec) -> IndexModel {
    let mut options = IndexOptions::default();
    options.name = Some(index.resolved_name());
    if index.unique {
        options.unique = Some(true);
    }

    IndexModel::builder()
        .keys(index.keys)
        .options(options)
        .build()
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn find(&self, collection: &str, filter: Document, options: FindOptions) -> ModelResult<RawResult> {
        let mut find = MongoFindOptions::default();
        find.projection = options.projection;
        find.sort = options.sort;
        find.skip = options.skip;
        find.limit = options
            .limit
            .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));

        Ok(RawResult::Documents(
            self.get_collection(collection)
                .find(filter)
                .with_options(find)
                .await
                .map_err(|e| ModelError::Backend(e.to_string()))?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(|e| ModelError::Backend(e.to_string()))?,
        ))
    }

    async fn find_one(&self, collection: &str, filter: Document, options: FindOneOptions) -> ModelResult<RawResult> {
        let mut find = MongoFindOneOptions::default();
        find.projection = options.projection;
        find.sort = options.sort;

        Ok(self
            .get_collection(collection)
            .find_one(filter)
            .with_options(find)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?
            .map_or(RawResult::Null, RawResult::Document))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> ModelResult<RawResult> {
        ensure_id(&mut document);

        self.get_collection(collection)
            .insert_one(&document)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(RawResult::Write { ops: vec![document] })
    }

    async fn insert_many(&self, collection: &str, mut documents: Vec<Document>) -> ModelResult<RawResult> {
        if documents.is_empty() {
            return Ok(RawResult::Write { ops: documents });
        }

        for document in &mut documents {
            ensure_id(document);
        }

        self.get_collection(collection)
            .insert_many(&documents)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(RawResult::Write { ops: documents })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        let result = self
            .get_collection(collection)
            .update_one(filter, update)
            .with_options(update_options(options))
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        let result = self
            .get_collection(collection)
            .update_many(filter, update)
            .with_options(update_options(options))
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: UpdateOptions,
    ) -> ModelResult<UpdateOutcome> {
        let mut replace = ReplaceOptions::default();
        replace.upsert = options.upsert;

        let result = self
            .get_collection(collection)
            .replace_one(filter, &replacement)
            .with_options(replace)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome> {
        let result = self
            .get_collection(collection)
            .delete_one(filter)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(DeleteOutcome { deleted_count: result.deleted_count })
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> ModelResult<DeleteOutcome> {
        let result = self
            .get_collection(collection)
            .delete_many(filter)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(DeleteOutcome { deleted_count: result.deleted_count })
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        let mut modify = FindOneAndUpdateOptions::default();
        modify.return_document = return_document(&options);
        modify.projection = options.projection;
        modify.sort = options.sort;
        modify.upsert = options.upsert;

        let value = self
            .get_collection(collection)
            .find_one_and_update(filter, update)
            .with_options(modify)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(RawResult::FindAndModify { value })
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: FindOneAndModifyOptions,
    ) -> ModelResult<RawResult> {
        let mut modify = FindOneAndReplaceOptions::default();
        modify.return_document = return_document(&options);
        modify.projection = options.projection;
        modify.sort = options.sort;
        modify.upsert = options.upsert;

        let value = self
            .get_collection(collection)
            .find_one_and_replace(filter, &replacement)
            .with_options(modify)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(RawResult::FindAndModify { value })
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: FindOneAndDeleteOptions,
    ) -> ModelResult<RawResult> {
        let mut delete = MongoFindOneAndDeleteOptions::default();
        delete.projection = options.projection;
        delete.sort = options.sort;

        let value = self
            .get_collection(collection)
            .find_one_and_delete(filter)
            .with_options(delete)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        Ok(RawResult::FindAndModify { value })
    }

    async fn count(&self, collection: &str, filter: Document) -> ModelResult<u64> {
        self.get_collection(collection)
            .count_documents(filter)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))
    }

    async fn distinct(&self, collection: &str, field: &str, filter: Document) -> ModelResult<Vec<Bson>> {
        self.get_collection(collection)
            .distinct(field, filter)
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))
    }

    async fn create_indexes(&self, collection: &str, indexes: Vec<IndexSpec>) -> ModelResult<Vec<String>> {
        if indexes.is_empty() {
            return Ok(vec![]);
        }

        Ok(self
            .get_collection(collection)
            .create_indexes(indexes.into_iter().map(index_model))
            .await
            .map_err(|e| ModelError::Backend(e.to_string()))?
            .index_names)
    }

    async fn shutdown(&self) -> ModelResult<()> {
        self.client.clone().shutdown().await;
        debug!(database = %self.database, "mongodb client shut down");

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
    app_name: Option<String>,
    max_pool_size: Option<u32>,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            app_name: None,
            max_pool_size: None,
        }
    }

    /// Creates a builder from a [`ConnectionConfig`].
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            dsn: config.uri.clone(),
            database: config.database.clone(),
            app_name: config.app_name.clone(),
            max_pool_size: config.max_pool_size,
        }
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = Some(max_pool_size);
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> ModelResult<Self::Backend> {
        let mut options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| ModelError::Initialization(e.to_string()))?;

        if let Some(app_name) = self.app_name {
            options.app_name = Some(app_name);
        }
        if let Some(max_pool_size) = self.max_pool_size {
            options.max_pool_size = Some(max_pool_size);
        }

        let client = Client::with_options(options).map_err(|e| ModelError::Initialization(e.to_string()))?;

        // The driver connects lazily; ping so an unreachable server fails here.
        client
            .database(&self.database)
            .run_command(bson::doc! { "ping": 1 })
            .await
            .map_err(|e| ModelError::Initialization(e.to_string()))?;

        debug!(database = %self.database, "connected to mongodb");

        Ok(MongoDbStore::new(client, self.database))
    }
}
