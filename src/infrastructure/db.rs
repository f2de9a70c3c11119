//! Embedded SurrealDB document store.
//!
//! Every collection is a schemaless table whose rows hold the document under
//! `doc` and its `_id` under `doc_id`, with a unique index on `doc_id`.
//! On disk the store lives in RocksDB at `<database_path>/<database_name>`;
//! tests use the in-memory engine.

use crate::config::settings::Settings;
use crate::domain::documents::USERS_COLLECTION;
use crate::domain::ports::{DocumentStore, Filter};
use crate::domain::types::DataCategory;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;
use tokio::sync::Mutex;

const NAMESPACE: &str = "llm_twin";

const INSERT_ROWS: &str = r#"
BEGIN TRANSACTION;
FOR $row IN $rows {
    CREATE type::table($table) CONTENT $row;
};
COMMIT TRANSACTION;
"#;

/// 每個資料庫位置在整個程序中只開啟一次
static STORES: LazyLock<Mutex<HashMap<PathBuf, Arc<dyn DocumentStore>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

#[derive(Deserialize)]
struct StoredDocument {
    doc: Value,
}

fn known_collections() -> impl Iterator<Item = &'static str> {
    std::iter::once(USERS_COLLECTION).chain(
        [
            DataCategory::Prompt,
            DataCategory::Queries,
            DataCategory::InstructDatasetSamples,
            DataCategory::InstructDataset,
            DataCategory::PreferenceDatasetSamples,
            DataCategory::PreferenceDataset,
            DataCategory::Posts,
            DataCategory::Articles,
            DataCategory::Repositories,
        ]
        .into_iter()
        .map(|c| c.as_str()),
    )
}

/// Table and field names are interpolated into queries, so only
/// `[A-Za-z0-9_]` is accepted.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn table_name(collection: &str) -> Result<&str> {
    if is_plain_name(collection) {
        Ok(collection)
    } else {
        Err(EtlError::ConfigValidationError {
            field: "collection".to_string(),
            message: format!("'{}' is not a valid collection name", collection),
        })
    }
}

fn document_id(collection: &str, document: &Value) -> Result<String> {
    document
        .get("_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EtlError::WriteError {
            collection: collection.to_string(),
            message: "document has no string _id".to_string(),
        })
}

/// `WHERE` clause for an equality filter; values are bound as `$p0`, `$p1`, ...
fn where_clause(filter: &Filter) -> Result<(String, Vec<(String, Value)>)> {
    if filter.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let mut conditions = Vec::with_capacity(filter.len());
    let mut bindings = Vec::with_capacity(filter.len());
    for (i, (key, value)) in filter.iter().enumerate() {
        if !is_plain_name(key) {
            return Err(EtlError::QueryError {
                message: format!("unsupported filter key '{}'", key),
            });
        }
        conditions.push(format!("doc.`{}` = $p{}", key, i));
        bindings.push((format!("p{}", i), value.clone()));
    }

    Ok((format!(" WHERE {}", conditions.join(" AND ")), bindings))
}

fn query_error(e: surrealdb::Error) -> EtlError {
    EtlError::QueryError {
        message: e.to_string(),
    }
}

/// Document store backed by an embedded SurrealDB instance.
pub struct SurrealDocumentStore {
    client: Surreal<Db>,
    defined: Mutex<HashSet<String>>,
    write_lock: Mutex<()>,
}

impl SurrealDocumentStore {
    /// Opens (or creates) the RocksDB-backed store at `location`.
    pub async fn open(location: &Path, database: &str) -> Result<Self> {
        let endpoint = location.to_string_lossy().into_owned();
        let client = Surreal::new::<RocksDb>(&endpoint)
            .await
            .map_err(|e| EtlError::ConnectionError {
                message: format!("Failed to open RocksDB store at {}: {}", endpoint, e),
            })?;

        Self::with_client(client, database).await
    }

    pub async fn memory() -> Result<Self> {
        let client = Surreal::new::<Mem>(())
            .await
            .map_err(|e| EtlError::ConnectionError {
                message: format!("Failed to create memory client: {}", e),
            })?;

        Self::with_client(client, "memory").await
    }

    async fn with_client(client: Surreal<Db>, database: &str) -> Result<Self> {
        client
            .use_ns(NAMESPACE)
            .use_db(database)
            .await
            .map_err(|e| EtlError::ConnectionError {
                message: format!("Failed to set namespace/database: {}", e),
            })?;

        let store = Self {
            client,
            defined: Mutex::new(HashSet::new()),
            write_lock: Mutex::new(()),
        };

        for collection in known_collections() {
            store.define_collection(collection).await?;
        }

        Ok(store)
    }

    async fn define_collection(&self, collection: &str) -> Result<()> {
        let table = table_name(collection)?;

        let mut defined = self.defined.lock().await;
        if defined.contains(table) {
            return Ok(());
        }

        let schema = format!(
            "DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS;\n\
             DEFINE INDEX IF NOT EXISTS {table}_doc_id ON TABLE {table} FIELDS doc_id UNIQUE;"
        );
        self.client
            .query(schema)
            .await
            .and_then(|response| response.check())
            .map_err(|e| EtlError::ConnectionError {
                message: format!("Failed to define collection {}: {}", table, e),
            })?;

        defined.insert(table.to_string());
        Ok(())
    }

    async fn select(&self, collection: &str, filter: &Filter, limit: Option<usize>) -> Result<Vec<Value>> {
        let table = table_name(collection)?;
        let (conditions, bindings) = where_clause(filter)?;

        let mut statement = format!("SELECT doc, ord FROM type::table($table){} ORDER BY ord ASC", conditions);
        if let Some(limit) = limit {
            statement.push_str(&format!(" LIMIT {}", limit));
        }

        let mut query = self.client.query(statement).bind(("table", table.to_string()));
        for binding in bindings {
            query = query.bind(binding);
        }

        let mut response = query.await.map_err(query_error)?;
        let rows: Vec<StoredDocument> = response.take(0).map_err(query_error)?;
        Ok(rows.into_iter().map(|row| row.doc).collect())
    }
}

#[async_trait]
impl DocumentStore for SurrealDocumentStore {
    async fn ping(&self) -> Result<()> {
        self.client
            .query("INFO FOR DB")
            .await
            .and_then(|response| response.check())
            .map_err(|e| EtlError::ConnectionError {
                message: format!("Health check failed: {}", e),
            })?;
        Ok(())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
        Ok(self.select(collection, filter, Some(1)).await?.into_iter().next())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        self.select(collection, filter, None).await
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<()> {
        self.insert_many(collection, vec![document]).await
    }

    /// 整批在同一個交易內寫入；任何一筆失敗則全部不寫入
    async fn insert_many(&self, collection: &str, documents: Vec<Value>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        self.define_collection(collection).await?;

        // 以寫入時間加序號排序，讀取時維持插入順序
        let base = Utc::now().timestamp_micros().saturating_mul(1000);
        let inserted = documents.len();
        let rows = documents
            .into_iter()
            .enumerate()
            .map(|(i, doc)| {
                let id = document_id(collection, &doc)?;
                Ok(json!({ "doc_id": id, "doc": doc, "ord": base + i as i64 }))
            })
            .collect::<Result<Vec<_>>>()?;

        let _guard = self.write_lock.lock().await;
        self.client
            .query(INSERT_ROWS)
            .bind(("table", collection.to_string()))
            .bind(("rows", rows))
            .await
            .and_then(|response| response.check())
            .map_err(|e| EtlError::WriteError {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!("Inserted {} document(s) into {}", inserted, collection);
        Ok(())
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for collection in known_collections() {
            let mut response = self
                .client
                .query("SELECT VALUE doc_id FROM type::table($table) LIMIT 1")
                .bind(("table", collection.to_string()))
                .await
                .map_err(query_error)?;
            let ids: Vec<String> = response.take(0).map_err(query_error)?;
            if !ids.is_empty() {
                names.push(collection.to_string());
            }
        }
        Ok(names)
    }
}

/// Opens the configured document store and checks it is usable.
///
/// The handle is opened once per database location and shared by every
/// later call in the process.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn DocumentStore>> {
    let root = Path::new(&settings.database_path);
    tokio::fs::create_dir_all(root).await?;
    let location = tokio::fs::canonicalize(root).await?.join(&settings.database_name);

    let mut stores = STORES.lock().await;
    if let Some(store) = stores.get(&location) {
        tracing::debug!("Reusing document store connection: {}", location.display());
        return Ok(Arc::clone(store));
    }

    let store = match SurrealDocumentStore::open(&location, &settings.database_name).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("couldn't connect to the database: {}", e);
            return Err(e);
        }
    };
    store.ping().await?;

    tracing::info!("Connection to document store successful: {}", location.display());
    let store: Arc<dyn DocumentStore> = Arc::new(store);
    stores.insert(location, Arc::clone(&store));
    Ok(store)
}
