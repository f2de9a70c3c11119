use super::base::CrawlerContext;
use super::custom_article::CustomArticleCrawler;
use super::github::GithubCrawler;
use super::linkedin::LinkedInCrawler;
use super::medium::MediumCrawler;
use crate::domain::ports::Crawler;
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::sync::Arc;
use url::Url;

/// Picks the crawler responsible for a URL.
///
/// Crawlers are matched in registration order; URLs no crawler claims go to
/// the generic article crawler.
pub struct CrawlerDispatcher {
    context: CrawlerContext,
    crawlers: Vec<(Regex, Arc<dyn Crawler>)>,
    fallback: Arc<dyn Crawler>,
}

impl CrawlerDispatcher {
    pub fn build(context: CrawlerContext) -> Self {
        let fallback: Arc<dyn Crawler> = Arc::new(CustomArticleCrawler::new(context.clone()));
        Self {
            context,
            crawlers: Vec::new(),
            fallback,
        }
    }

    pub fn register_medium(mut self) -> Result<Self> {
        let crawler = Arc::new(MediumCrawler::new(self.context.clone()));
        self.register("https://medium.com", crawler)?;
        Ok(self)
    }

    pub fn register_linkedin(mut self) -> Result<Self> {
        let crawler = Arc::new(LinkedInCrawler::new(self.context.clone()));
        self.register("https://linkedin.com", crawler)?;
        Ok(self)
    }

    pub fn register_github(mut self) -> Result<Self> {
        let crawler = Arc::new(GithubCrawler::new(self.context.clone()));
        self.register("https://github.com", crawler)?;
        Ok(self)
    }

    /// Registers `crawler` for the host of `domain` (with or without `www.`).
    pub fn register(&mut self, domain: &str, crawler: Arc<dyn Crawler>) -> Result<()> {
        let parsed = Url::parse(domain)?;
        let host = parsed.host_str().ok_or_else(|| EtlError::InvalidConfigValueError {
            field: "domain".to_string(),
            value: domain.to_string(),
            reason: "URL has no host".to_string(),
        })?;

        // 主機名稱後只能接路徑、查詢、錨點、埠號或字串結尾
        let pattern = format!(r"^https://(www\.)?{}(?:[/?#:]|$)", regex::escape(host));
        let regex = Regex::new(&pattern).map_err(|e| EtlError::ConfigError {
            message: format!("invalid crawler pattern {}: {}", pattern, e),
        })?;

        tracing::debug!("Registered {} crawler for {}", crawler.name(), host);
        self.crawlers.push((regex, crawler));
        Ok(())
    }

    pub fn get_crawler(&self, url: &str) -> Arc<dyn Crawler> {
        for (pattern, crawler) in &self.crawlers {
            if pattern.is_match(url) {
                return Arc::clone(crawler);
            }
        }

        tracing::warn!("No crawler found for {}. Defaulting to CustomArticleCrawler.", url);
        Arc::clone(&self.fallback)
    }

    pub fn registered(&self) -> usize {
        self.crawlers.len()
    }
}
