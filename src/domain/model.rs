use crate::domain::documents::UserDocument;
use crate::domain::ports::Summary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Result of crawling a single link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub link: String,
    pub domain: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 網路類錯誤，重跑可能成功
    #[serde(default)]
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainStats {
    pub successful: usize,
    pub total: usize,
}

/// Per-domain crawl counters, ordered by domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlMetadata(BTreeMap<String, DomainStats>);

impl CrawlMetadata {
    pub fn add(&mut self, domain: &str, success: bool) {
        let stats = self.0.entry(domain.to_string()).or_default();
        stats.total += 1;
        if success {
            stats.successful += 1;
        }
    }

    pub fn get(&self, domain: &str) -> Option<&DomainStats> {
        self.0.get(domain)
    }

    pub fn domains(&self) -> impl Iterator<Item = (&String, &DomainStats)> {
        self.0.iter()
    }

    pub fn successful(&self) -> usize {
        self.0.values().map(|s| s.successful).sum()
    }

    pub fn total(&self) -> usize {
        self.0.values().map(|s| s.total).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    pub user_full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedUser {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMetadata {
    pub query: UserQuery,
    pub retrieved: RetrievedUser,
}

impl UserMetadata {
    pub fn new(user_full_name: &str, user: &UserDocument) -> Self {
        Self {
            query: UserQuery {
                user_full_name: user_full_name.to_string(),
            },
            retrieved: RetrievedUser {
                user_id: user.id.to_string(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
            },
        }
    }
}

/// Everything the extract phase produced.
#[derive(Debug, Clone)]
pub struct CrawlBatch {
    pub user: UserDocument,
    pub user_metadata: UserMetadata,
    pub outcomes: Vec<CrawlOutcome>,
    pub metadata: CrawlMetadata,
    pub started_at: DateTime<Utc>,
}

impl Summary for CrawlBatch {
    fn summary(&self) -> String {
        format!(
            "{} links crawled for {}",
            self.outcomes.len(),
            self.user.full_name()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub user: UserMetadata,
    pub crawled_links: Vec<String>,
    pub crawled: usize,
    pub successful: usize,
    pub failures: Vec<CrawlOutcome>,
    pub metadata: CrawlMetadata,
}

impl Summary for RunReport {
    fn summary(&self) -> String {
        format!(
            "{} / {} links crawled successfully across {} domain(s)",
            self.successful,
            self.crawled,
            self.metadata.domains().count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_metadata_counts_per_domain() {
        let mut metadata = CrawlMetadata::default();
        metadata.add("medium.com", true);
        metadata.add("medium.com", false);
        metadata.add("github.com", true);

        assert_eq!(
            metadata.get("medium.com"),
            Some(&DomainStats { successful: 1, total: 2 })
        );
        assert_eq!(metadata.get("github.com").unwrap().successful, 1);
        assert_eq!(metadata.successful(), 2);
        assert_eq!(metadata.total(), 3);
    }

    #[test]
    fn test_crawl_metadata_serializes_as_map() {
        let mut metadata = CrawlMetadata::default();
        metadata.add("github.com", false);

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json, serde_json::json!({"github.com": {"successful": 0, "total": 1}}));
    }

    #[test]
    fn test_user_metadata() {
        let user = UserDocument::new("Jane", "Doe");
        let metadata = UserMetadata::new("Jane Doe", &user);

        assert_eq!(metadata.query.user_full_name, "Jane Doe");
        assert_eq!(metadata.retrieved.user_id, user.id.to_string());
        assert_eq!(metadata.retrieved.last_name, "Doe");
    }
}
