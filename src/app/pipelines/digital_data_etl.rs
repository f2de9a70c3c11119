use crate::app::steps::{crawl_links, get_or_create_user};
use crate::application::crawlers::{CrawlerContext, CrawlerDispatcher};
use crate::config::etl_config::EtlRunConfig;
use crate::config::settings::Settings;
use crate::domain::model::{CrawlBatch, RunReport};
use crate::domain::ports::{DocumentStore, Pipeline, Storage};
use crate::infrastructure::db;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub const PIPELINE_NAME: &str = "digital_data_etl";

/// Crawls the links of one user into the document store.
///
/// extract: resolve the user, then crawl every link.
/// transform: summarise the crawl into a [`RunReport`].
/// load: write the report as `runs/<run_id>.json`.
pub struct DigitalDataEtl<S: Storage> {
    store: Arc<dyn DocumentStore>,
    dispatcher: CrawlerDispatcher,
    storage: S,
    config: EtlRunConfig,
    show_progress: bool,
}

impl<S: Storage> DigitalDataEtl<S> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        dispatcher: CrawlerDispatcher,
        storage: S,
        config: EtlRunConfig,
    ) -> Self {
        Self {
            store,
            dispatcher,
            storage,
            config,
            show_progress: false,
        }
    }

    /// Connects to the configured store and registers every crawler.
    pub async fn from_settings(settings: &Settings, config: EtlRunConfig, storage: S) -> Result<Self> {
        config.validate()?;

        let store = db::connect(settings).await?;
        let context = CrawlerContext::new(store.clone(), settings)?;
        let dispatcher = CrawlerDispatcher::build(context)
            .register_linkedin()?
            .register_medium()?
            .register_github()?;

        Ok(Self::new(store, dispatcher, storage, config))
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for DigitalDataEtl<S> {
    type Extracted = CrawlBatch;
    type Transformed = RunReport;

    fn name(&self) -> &str {
        PIPELINE_NAME
    }

    async fn extract(&self) -> Result<CrawlBatch> {
        let started_at = Utc::now();

        let (user, user_metadata) =
            get_or_create_user(self.store.as_ref(), self.config.user_full_name()).await?;
        let (outcomes, metadata) =
            crawl_links(&self.dispatcher, &user, self.config.links(), self.show_progress).await;

        Ok(CrawlBatch {
            user,
            user_metadata,
            outcomes,
            metadata,
            started_at,
        })
    }

    async fn transform(&self, data: CrawlBatch) -> Result<RunReport> {
        let crawled_links = data.outcomes.iter().map(|o| o.link.clone()).collect();
        let failures = data.outcomes.iter().filter(|o| !o.success).cloned().collect();

        Ok(RunReport {
            run_id: Uuid::new_v4(),
            pipeline: PIPELINE_NAME.to_string(),
            started_at: data.started_at,
            finished_at: Utc::now(),
            user: data.user_metadata,
            crawled_links,
            crawled: data.outcomes.len(),
            successful: data.metadata.successful(),
            failures,
            metadata: data.metadata,
        })
    }

    async fn load(&self, result: RunReport) -> Result<String> {
        let path = format!("runs/{}.json", result.run_id);
        let data = serde_json::to_vec_pretty(&result)?;

        tracing::debug!("Writing run report ({} bytes) to storage", data.len());
        self.storage.write_file(&path, &data).await?;

        Ok(self.storage.location(&path))
    }
}
