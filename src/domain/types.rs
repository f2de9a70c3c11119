use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection names used by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCategory {
    Prompt,
    Queries,
    InstructDatasetSamples,
    InstructDataset,
    PreferenceDatasetSamples,
    PreferenceDataset,
    Posts,
    Articles,
    Repositories,
}

impl DataCategory {
    /// 爬蟲寫入的內容集合
    pub const CONTENT: [DataCategory; 3] = [
        DataCategory::Articles,
        DataCategory::Posts,
        DataCategory::Repositories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataCategory::Prompt => "prompt",
            DataCategory::Queries => "queries",
            DataCategory::InstructDatasetSamples => "instruct_dataset_samples",
            DataCategory::InstructDataset => "instruct_dataset",
            DataCategory::PreferenceDatasetSamples => "preference_dataset_samples",
            DataCategory::PreferenceDataset => "preference_dataset",
            DataCategory::Posts => "posts",
            DataCategory::Articles => "articles",
            DataCategory::Repositories => "repositories",
        }
    }
}

impl fmt::Display for DataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_collection_names() {
        for category in [
            DataCategory::Prompt,
            DataCategory::InstructDatasetSamples,
            DataCategory::PreferenceDataset,
            DataCategory::Repositories,
        ] {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json.as_str().unwrap(), category.as_str());
        }
    }
}
