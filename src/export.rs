//! Data-warehouse export: dumps the crawled collections into one ZIP archive.

use crate::domain::documents::collection_for;
use crate::domain::ports::{DocumentStore, Filter, Storage};
use crate::domain::types::DataCategory;
use crate::utils::error::{EtlError, Result};
use serde_json::Value;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const DOCUMENTS_INDEX: &str = "documents.csv";

#[derive(Debug, serde::Serialize)]
struct IndexRow<'a> {
    collection: &'a str,
    id: &'a str,
    platform: &'a str,
    link: &'a str,
    author_full_name: &'a str,
}

fn field<'a>(document: &'a Value, key: &str) -> &'a str {
    document.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn build_index(exported: &[(&str, Vec<Value>)]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    // 即使沒有任何文件也要寫出標題列
    writer.write_record(["collection", "id", "platform", "link", "author_full_name"])?;
    for (collection, documents) in exported {
        for document in documents {
            writer.serialize(IndexRow {
                collection,
                id: field(document, "_id"),
                platform: field(document, "platform"),
                link: field(document, "link"),
                author_full_name: field(document, "author_full_name"),
            })?;
        }
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to finish {}: {}", DOCUMENTS_INDEX, e),
    })
}

/// Writes `<collection>.json` for every non-empty content collection plus a
/// `documents.csv` index, and returns where the archive landed.
pub async fn export_collections<S: Storage>(
    store: &dyn DocumentStore,
    storage: &S,
    filename: &str,
) -> Result<String> {
    let everything = Filter::new();

    let mut exported = Vec::new();
    for category in DataCategory::CONTENT {
        let collection = collection_for(category);
        let documents = store.find(collection, &everything).await?;
        tracing::debug!("Collection {} holds {} document(s)", collection, documents.len());

        if documents.is_empty() {
            continue;
        }
        exported.push((collection, documents));
    }

    let index = build_index(&exported)?;

    let zip_data = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for (collection, documents) in &exported {
            zip.start_file::<_, ()>(format!("{}.json", collection), FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(documents)?.as_bytes())?;
        }

        zip.start_file::<_, ()>(DOCUMENTS_INDEX, FileOptions::default())?;
        zip.write_all(&index)?;

        zip.finish()?.into_inner()
    };

    tracing::debug!("Writing export archive ({} bytes)", zip_data.len());
    storage.write_file(filename, &zip_data).await?;

    let total: usize = exported.iter().map(|(_, documents)| documents.len()).sum();
    tracing::info!(
        "Exported {} document(s) from {} collection(s)",
        total,
        exported.len()
    );

    Ok(storage.location(filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use crate::domain::documents::{
        ArticleDocument, ContentFields, NoSqlDocument, RepositoryDocument, UserDocument,
    };
    use crate::infrastructure::db::SurrealDocumentStore;
    use serde_json::Map;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_entry(bytes: &[u8], name: &str) -> Option<String> {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).ok()?;
        let mut entry = archive.by_name(name).ok()?;
        let mut text = String::new();
        entry.read_to_string(&mut text).ok()?;
        Some(text)
    }

    #[tokio::test]
    async fn test_export_skips_empty_collections() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().to_string());
        let store = SurrealDocumentStore::memory().await.unwrap();
        let user = UserDocument::new("Jane", "Doe");

        let article = ArticleDocument::new(
            ContentFields::new(Map::new(), "example.com", &user),
            "https://example.com/a",
        );
        let repository = RepositoryDocument::new(
            ContentFields::new(Map::new(), "github", &user),
            "repo",
            "https://github.com/jane/repo",
        );
        article.clone().save(&store).await.unwrap();
        repository.save(&store).await.unwrap();

        let location = export_collections(&store, &storage, "warehouse.zip")
            .await
            .unwrap();
        assert!(location.ends_with("warehouse.zip"));

        let bytes = std::fs::read(temp_dir.path().join("warehouse.zip")).unwrap();
        assert!(read_entry(&bytes, "articles.json").is_some());
        assert!(read_entry(&bytes, "repositories.json").is_some());
        assert!(read_entry(&bytes, "posts.json").is_none());

        let index = read_entry(&bytes, DOCUMENTS_INDEX).unwrap();
        let lines: Vec<&str> = index.lines().collect();
        assert_eq!(lines[0], "collection,id,platform,link,author_full_name");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with(&format!("articles,{},example.com", article.id)));
        assert!(lines[2].contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_export_of_empty_store_only_has_index() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().to_string());
        let store = SurrealDocumentStore::memory().await.unwrap();

        export_collections(&store, &storage, "empty.zip").await.unwrap();

        let bytes = std::fs::read(temp_dir.path().join("empty.zip")).unwrap();
        let index = read_entry(&bytes, DOCUMENTS_INDEX).unwrap();
        assert_eq!(index.trim(), "collection,id,platform,link,author_full_name");
    }
}
