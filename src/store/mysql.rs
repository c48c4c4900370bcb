//! MySqlStore - Document store on a single MySQL table
//!
//! Schema (see `migrations/`):
//! ```sql
//! CREATE TABLE documents (
//!     collection VARCHAR(64)  NOT NULL,
//!     id         VARCHAR(255) NOT NULL,
//!     data       LONGTEXT     NOT NULL,
//!     updated_at TIMESTAMP    NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
//!     PRIMARY KEY (collection, id)
//! );
//! ```
//!
//! Conditional and batch writes run inside a transaction that locks the rows
//! with `SELECT ... FOR UPDATE`. The change feed is in-process: it only sees
//! writes made through this instance.

use super::{
    ChangeFeed, ChangeStream, Document, DocumentChange, DocumentStore, DocumentWrite, FieldFilter,
    StoreError, merge_into,
};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, Transaction};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub struct MySqlStore {
    connection_pool: MySqlPool,
    feed: ChangeFeed,
}

impl MySqlStore {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self {
            connection_pool,
            feed: ChangeFeed::new(),
        }
    }

    /// Opens the pool and applies pending migrations.
    #[instrument(skip(database_url))]
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        connection_lifetime_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .max_lifetime(Duration::from_secs(connection_lifetime_secs))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {}", e)))?;

        info!("Connected to MySQL document store");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.connection_pool
    }

    fn decode(raw: String) -> Result<Document, StoreError> {
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::InvalidDocument(
                "stored data is not a JSON object".to_string(),
            )),
        }
    }

    fn encode(doc: &Document) -> Result<String, StoreError> {
        Ok(serde_json::to_string(doc)?)
    }

    async fn lock_row(
        tx: &mut Transaction<'_, MySql>,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let raw: Option<String> = sqlx::query_scalar(
            "SELECT data FROM documents WHERE collection = ? AND id = ? FOR UPDATE",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        raw.map(Self::decode).transpose()
    }

    async fn upsert_row(
        tx: &mut Transaction<'_, MySql>,
        collection: &str,
        id: &str,
        doc: &Document,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO documents (collection, id, data) VALUES (?, ?, ?) \
             ON DUPLICATE KEY UPDATE data = VALUES(data)",
        )
        .bind(collection)
        .bind(id)
        .bind(Self::encode(doc)?)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MySqlStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT data FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.connection_pool)
                .await?;

        raw.map(Self::decode).transpose()
    }

    #[instrument(skip(self, data))]
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        let mut tx = self.connection_pool.begin().await?;
        let before = Self::lock_row(&mut tx, collection, id).await?;

        let after = match (&before, merge) {
            (Some(existing), true) => {
                let mut merged = existing.clone();
                merge_into(&mut merged, data);
                merged
            }
            _ => data,
        };

        Self::upsert_row(&mut tx, collection, id, &after).await?;
        tx.commit().await?;

        self.feed.publish(DocumentChange::new(collection, id, before, Some(after)));
        Ok(())
    }

    #[instrument(skip(self, data))]
    async fn create_document(&self, collection: &str, id: &str, data: Document) -> Result<(), StoreError> {
        let result = sqlx::query("INSERT INTO documents (collection, id, data) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(id)
            .bind(Self::encode(&data)?)
            .execute(&self.connection_pool)
            .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(StoreError::already_exists(collection, id));
            }
            Err(e) => return Err(e.into()),
        }

        debug!("Document created");
        self.feed.publish(DocumentChange::new(collection, id, None, Some(data)));
        Ok(())
    }

    #[instrument(skip(self, preconditions, partial))]
    async fn update_document_if(
        &self,
        collection: &str,
        id: &str,
        preconditions: &[FieldFilter],
        partial: Document,
    ) -> Result<Document, StoreError> {
        let mut tx = self.connection_pool.begin().await?;
        let before = Self::lock_row(&mut tx, collection, id)
            .await?
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        if !preconditions.iter().all(|p| p.matches(&before)) {
            // dropping the transaction rolls it back
            return Err(StoreError::precondition_failed(collection, id));
        }

        let mut after = before.clone();
        merge_into(&mut after, partial);
        Self::upsert_row(&mut tx, collection, id, &after).await?;
        tx.commit().await?;

        self.feed.publish(DocumentChange::new(
            collection,
            id,
            Some(before),
            Some(after.clone()),
        ));
        Ok(after)
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut tx = self.connection_pool.begin().await?;
        let before = Self::lock_row(&mut tx, collection, id).await?;

        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if before.is_some() {
            self.feed.publish(DocumentChange::new(collection, id, before, None));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn query_documents(
        &self,
        collection: &str,
        filter: &FieldFilter,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, data FROM documents WHERE collection = ?")
                .bind(collection)
                .fetch_all(&self.connection_pool)
                .await?;

        let mut found = Vec::new();
        for (id, raw) in rows {
            let doc = Self::decode(raw)?;
            if filter.matches(&doc) {
                found.push((id, doc));
            }
        }
        Ok(found)
    }

    #[instrument(skip(self, writes), fields(count = writes.len()))]
    async fn batch_update(&self, writes: Vec<DocumentWrite>) -> Result<(), StoreError> {
        let mut tx = self.connection_pool.begin().await?;
        let mut changes = Vec::with_capacity(writes.len());

        for write in writes {
            let before = Self::lock_row(&mut tx, &write.collection, &write.id)
                .await?
                .ok_or_else(|| StoreError::not_found(&write.collection, &write.id))?;
            let mut after = before.clone();
            merge_into(&mut after, write.partial);
            Self::upsert_row(&mut tx, &write.collection, &write.id, &after).await?;
            changes.push(DocumentChange::new(
                write.collection,
                write.id,
                Some(before),
                Some(after),
            ));
        }

        tx.commit().await?;
        for change in changes {
            self.feed.publish(change);
        }
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> ChangeStream {
        self.feed.subscribe(collection)
    }
}
