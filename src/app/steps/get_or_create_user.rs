use crate::application::utils::split_user_full_name;
use crate::domain::documents::{NoSqlDocument, UserDocument};
use crate::domain::model::UserMetadata;
use crate::domain::ports::{filter, DocumentStore};
use crate::utils::error::Result;
use serde_json::Value;

/// Retrieves the user with this full name, creating it when missing.
pub async fn get_or_create_user(
    store: &dyn DocumentStore,
    user_full_name: &str,
) -> Result<(UserDocument, UserMetadata)> {
    tracing::info!("Getting or creating user: {}", user_full_name);

    let (first_name, last_name) = split_user_full_name(Some(user_full_name))?;
    let query = filter([
        ("first_name", Value::String(first_name)),
        ("last_name", Value::String(last_name)),
    ]);

    let user = UserDocument::get_or_create(store, &query).await?;
    let metadata = UserMetadata::new(user_full_name, &user);

    tracing::debug!("Using user {} ({})", user.full_name(), user.id);
    Ok((user, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::documents::USERS_COLLECTION;
    use crate::domain::ports::Filter;
    use crate::infrastructure::db::SurrealDocumentStore;

    #[tokio::test]
    async fn test_same_name_returns_same_user() {
        let store = SurrealDocumentStore::memory().await.unwrap();

        let (first, metadata) = get_or_create_user(&store, "Paul Iusztin").await.unwrap();
        let (second, _) = get_or_create_user(&store, "Paul Iusztin").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(metadata.retrieved.first_name, "Paul");
        assert_eq!(metadata.retrieved.last_name, "Iusztin");
        assert_eq!(metadata.retrieved.user_id, first.id.to_string());
        assert_eq!(store.find(USERS_COLLECTION, &Filter::new()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_different_names_create_different_users() {
        let store = SurrealDocumentStore::memory().await.unwrap();

        let (a, _) = get_or_create_user(&store, "Paul Iusztin").await.unwrap();
        let (b, _) = get_or_create_user(&store, "Maxime Labonne").await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let store = SurrealDocumentStore::memory().await.unwrap();
        assert!(get_or_create_user(&store, " ").await.is_err());
    }
}
