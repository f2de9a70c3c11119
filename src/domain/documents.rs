//! Documents persisted in the document store.
//!
//! Every document carries a v4 `id`, stored as the string `_id`. Equality and
//! hashing only look at the id, so two copies of the same stored document
//! compare equal even if one of them was modified in memory.

use crate::domain::ports::{DocumentStore, Filter};
use crate::domain::types::DataCategory;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const USERS_COLLECTION: &str = "users";

#[async_trait]
pub trait NoSqlDocument: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    /// 轉成資料庫格式：`id` 改名為 `_id`
    fn to_document(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        let map = value.as_object_mut().ok_or_else(|| EtlError::DocumentError {
            message: format!("{} did not serialize to an object", Self::COLLECTION),
        })?;

        if !map.contains_key("_id") {
            if let Some(id) = map.remove("id") {
                map.insert("_id".to_string(), id);
            }
        }

        Ok(value)
    }

    fn from_document(value: Value) -> Result<Self> {
        let mut map = match value {
            Value::Object(map) if !map.is_empty() => map,
            Value::Object(_) | Value::Null => {
                return Err(EtlError::DocumentError {
                    message: "Data is empty".to_string(),
                })
            }
            other => {
                return Err(EtlError::DocumentError {
                    message: format!("expected an object, got {}", other),
                })
            }
        };

        let id = map.remove("_id").ok_or_else(|| EtlError::DocumentError {
            message: format!("document in '{}' has no _id", Self::COLLECTION),
        })?;
        map.insert("id".to_string(), id);

        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Inserts the document. A rejected write is logged and reported as `None`.
    async fn save(self, store: &dyn DocumentStore) -> Result<Option<Self>> {
        let document = self.to_document()?;

        match store.insert_one(Self::COLLECTION, document).await {
            Ok(()) => Ok(Some(self)),
            Err(EtlError::WriteError { message, .. }) => {
                tracing::error!("Failed to insert document into {}: {}", Self::COLLECTION, message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn find(store: &dyn DocumentStore, filter: &Filter) -> Result<Option<Self>> {
        match store.find_one(Self::COLLECTION, filter).await? {
            Some(value) => Ok(Some(Self::from_document(value)?)),
            None => Ok(None),
        }
    }

    async fn bulk_find(store: &dyn DocumentStore, filter: &Filter) -> Result<Vec<Self>> {
        let values = store.find(Self::COLLECTION, filter).await?;

        let mut documents = Vec::with_capacity(values.len());
        for value in values {
            match Self::from_document(value) {
                Ok(document) => documents.push(document),
                Err(e) => tracing::error!("Skipping undecodable document in {}: {}", Self::COLLECTION, e),
            }
        }

        Ok(documents)
    }

    async fn get_or_create(store: &dyn DocumentStore, filter: &Filter) -> Result<Self> {
        if let Some(existing) = Self::find(store, filter).await? {
            return Ok(existing);
        }

        // 以篩選條件建立新文件，id 由 serde 預設值產生
        let instance: Self = serde_json::from_value(Value::Object(filter.clone()))?;
        instance
            .save(store)
            .await?
            .ok_or_else(|| EtlError::WriteError {
                collection: Self::COLLECTION.to_string(),
                message: format!("could not create document for filter {:?}", filter),
            })
    }

    async fn bulk_insert(store: &dyn DocumentStore, documents: Vec<Self>) -> Result<bool> {
        let values = documents
            .iter()
            .map(|document| document.to_document())
            .collect::<Result<Vec<_>>>()?;

        match store.insert_many(Self::COLLECTION, values).await {
            Ok(()) => Ok(true),
            Err(EtlError::WriteError { message, .. }) => {
                tracing::error!(
                    "Failed to insert documents of type {}: {}",
                    std::any::type_name::<Self>(),
                    message
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

macro_rules! document {
    ($ty:ty, $collection:expr) => {
        impl NoSqlDocument for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> Uuid {
                self.id
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl UserDocument {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

document!(UserDocument, USERS_COLLECTION);

/// Fields shared by everything a crawler stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFields {
    pub content: Map<String, Value>,
    pub platform: String,
    pub author_id: Uuid,
    pub author_full_name: String,
}

impl ContentFields {
    pub fn new(content: Map<String, Value>, platform: impl Into<String>, author: &UserDocument) -> Self {
        Self {
            content,
            platform: platform.into(),
            author_id: author.id,
            author_full_name: author.full_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDocument {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ContentFields,
    pub link: String,
}

impl ArticleDocument {
    pub fn new(fields: ContentFields, link: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            link: link.into(),
        }
    }
}

document!(ArticleDocument, "articles");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ContentFields,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl PostDocument {
    pub fn new(fields: ContentFields, image: Option<String>, link: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            image,
            link,
        }
    }
}

document!(PostDocument, "posts");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDocument {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ContentFields,
    pub name: String,
    pub link: String,
}

impl RepositoryDocument {
    pub fn new(fields: ContentFields, name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            name: name.into(),
            link: link.into(),
        }
    }
}

document!(RepositoryDocument, "repositories");

/// Collection name of a crawled content category.
pub fn collection_for(category: DataCategory) -> &'static str {
    match category {
        DataCategory::Articles => ArticleDocument::COLLECTION,
        DataCategory::Posts => PostDocument::COLLECTION,
        DataCategory::Repositories => RepositoryDocument::COLLECTION,
        other => other.as_str(),
    }
}
