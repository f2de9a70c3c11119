use crate::domain::documents::UserDocument;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Equality filter: a document matches when every key equals the document's field.
pub type Filter = Map<String, Value>;

pub fn filter<const N: usize>(pairs: [(&str, Value); N]) -> Filter {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    /// 存放位置的完整路徑，僅用於日誌與回報
    fn location(&self, path: &str) -> String;
}

/// Collection-oriented store of JSON documents keyed by `_id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>>;
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>>;
    async fn insert_one(&self, collection: &str, document: Value) -> Result<()>;
    async fn insert_many(&self, collection: &str, documents: Vec<Value>) -> Result<()>;
    async fn collections(&self) -> Result<Vec<String>>;
}

#[async_trait]
pub trait Crawler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn extract(&self, link: &str, user: &UserDocument) -> Result<()>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send + Summary;
    type Transformed: Send + Summary;

    fn name(&self) -> &str;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    async fn load(&self, result: Self::Transformed) -> Result<String>;
}

/// Anything the run can be summarised by once it is transformed.
pub trait Summary {
    fn summary(&self) -> String;
}
