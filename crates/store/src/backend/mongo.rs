//! MongoDB-backed crypto store.

use async_trait::async_trait;
use bson::{Document, doc};
use cryptovote_types::{Crypto, CryptoId, CryptoUpdate, NewCrypto, VoteAdjustment};
use futures::StreamExt;
use mongodb::{
    Client, Collection,
    options::{ClientOptions, ReturnDocument},
};
use snafu::{OptionExt, ResultExt};
use tracing::{debug, info};

use super::{CryptoStore, CryptoStream, ListOrder, ListQuery};
use crate::{
    document::CryptoDocument,
    error::{ConnectSnafu, PingSnafu, Result, StoreError, UnexpectedInsertIdSnafu},
};

const APP_NAME: &str = "cryptovote";

/// Connection settings for [`MongoCryptoStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Collection holding crypto documents.
    pub collection: String,
}

impl MongoConfig {
    /// Connection string for the configured server.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("mongodb://{}:{}", self.host, self.port)
    }
}

/// Crypto store backed by a single MongoDB collection.
///
/// Vote adjustments run as one `findOneAndUpdate` with an aggregation
/// pipeline, so the clamp at zero, the `voteRate` recomputation and the
/// `updatedAt` refresh are applied atomically on the server.
#[derive(Debug, Clone)]
pub struct MongoCryptoStore {
    client: Client,
    collection: Collection<CryptoDocument>,
}

impl MongoCryptoStore {
    /// Connects to the configured server and verifies it answers a ping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connect`] if the connection string is rejected,
    /// or [`StoreError::Ping`] if the database does not respond.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let uri = config.uri();
        let mut options =
            ClientOptions::parse(uri.as_str()).await.context(ConnectSnafu { uri: &uri })?;
        options.app_name = Some(APP_NAME.to_owned());
        let client = Client::with_options(options).context(ConnectSnafu { uri: &uri })?;

        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .context(PingSnafu { database: &config.database })?;

        info!(
            uri = %uri,
            database = %config.database,
            collection = %config.collection,
            "Connected to document store"
        );

        let collection = database.collection::<CryptoDocument>(&config.collection);
        Ok(Self { client, collection })
    }

    /// Closes the client, waiting for in-flight operations to finish.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

fn by_id(id: CryptoId) -> Document {
    doc! { "_id": id.object_id() }
}

fn list_filter(query: &ListQuery) -> Document {
    match query.name_pattern() {
        Some(pattern) => doc! { "name": { "$regex": pattern, "$options": "i" } },
        None => doc! {},
    }
}

fn list_sort(order: ListOrder) -> Document {
    match order {
        ListOrder::VoteRateDesc => doc! { "voteRate": -1, "_id": 1 },
        ListOrder::LikesDesc => doc! { "likes": -1, "_id": 1 },
    }
}

/// Pipeline applying `adjustment`, clamping at zero and recomputing
/// `voteRate` from the updated counters.
fn vote_pipeline(adjustment: VoteAdjustment) -> Vec<Document> {
    let field = adjustment.counter.field_name();
    let mut step = Document::new();
    step.insert(
        field,
        doc! { "$max": [ { "$add": [ format!("${field}"), adjustment.direction.delta() ] }, 0_i64 ] },
    );
    step.insert("updatedAt", "$$NOW");

    vec![
        doc! { "$set": step },
        doc! { "$set": { "voteRate": { "$subtract": ["$likes", "$dislikes"] } } },
    ]
}

fn decode(document: Option<CryptoDocument>) -> Result<Option<Crypto>> {
    document.map(CryptoDocument::into_crypto).transpose()
}

#[async_trait]
impl CryptoStore for MongoCryptoStore {
    async fn insert(&self, new: NewCrypto) -> Result<Crypto> {
        let mut document = CryptoDocument::new_record(&new, bson::DateTime::now());
        let inserted = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|e| StoreError::from_driver("insert_one", e))?;

        let oid = inserted
            .inserted_id
            .as_object_id()
            .context(UnexpectedInsertIdSnafu { value: inserted.inserted_id.to_string() })?;
        document.id = Some(oid);
        debug!(id = %oid, name = %document.name, "Inserted crypto");
        document.into_crypto()
    }

    async fn find_one(&self, id: CryptoId) -> Result<Option<Crypto>> {
        let document = self
            .collection
            .find_one(by_id(id))
            .await
            .map_err(|e| StoreError::from_driver("find_one", e))?;
        decode(document)
    }

    async fn find_all(&self, query: ListQuery) -> Result<CryptoStream> {
        let cursor = self
            .collection
            .find(list_filter(&query))
            .sort(list_sort(query.order()))
            .await
            .map_err(|e| StoreError::from_driver("find", e))?;

        let stream = cursor.map(|item| match item {
            Ok(document) => document.into_crypto(),
            Err(e) => Err(StoreError::from_driver("find", e)),
        });
        Ok(stream.boxed())
    }

    async fn update(&self, id: CryptoId, update: CryptoUpdate) -> Result<Option<Crypto>> {
        let change = doc! {
            "$set": {
                "name": update.name(),
                "description": update.description(),
                "updatedAt": bson::DateTime::now(),
            }
        };
        let document = self
            .collection
            .find_one_and_update(by_id(id), change)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| StoreError::from_driver("find_one_and_update", e))?;
        decode(document)
    }

    async fn adjust_votes(
        &self,
        id: CryptoId,
        adjustment: VoteAdjustment,
    ) -> Result<Option<Crypto>> {
        let document = self
            .collection
            .find_one_and_update(by_id(id), vote_pipeline(adjustment))
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| StoreError::from_driver("find_one_and_update", e))?;
        decode(document)
    }

    async fn delete_one(&self, id: CryptoId) -> Result<bool> {
        let result = self
            .collection
            .delete_one(by_id(id))
            .await
            .map_err(|e| StoreError::from_driver("delete_one", e))?;
        Ok(result.deleted_count > 0)
    }
}
