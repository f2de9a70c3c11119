use crate::application::crawlers::CrawlerDispatcher;
use crate::domain::documents::UserDocument;
use crate::domain::model::{CrawlMetadata, CrawlOutcome};
use url::Url;

/// Crawls every link in order.
///
/// A failing link is logged and recorded, it never stops the remaining links.
pub async fn crawl_links(
    dispatcher: &CrawlerDispatcher,
    user: &UserDocument,
    links: &[String],
    show_progress: bool,
) -> (Vec<CrawlOutcome>, CrawlMetadata) {
    tracing::info!("Start to crawl {} link(s)", links.len());

    let progress = Progress::new(links.len(), show_progress);
    let mut metadata = CrawlMetadata::default();
    let mut outcomes = Vec::with_capacity(links.len());

    for link in links {
        progress.set_message(link);
        let outcome = crawl_link(dispatcher, link, user).await;
        metadata.add(&outcome.domain, outcome.success);
        outcomes.push(outcome);
        progress.inc();
    }
    progress.finish();

    tracing::info!(
        "Successfully crawled {} / {} links.",
        metadata.successful(),
        links.len()
    );

    (outcomes, metadata)
}

async fn crawl_link(dispatcher: &CrawlerDispatcher, link: &str, user: &UserDocument) -> CrawlOutcome {
    let crawler = dispatcher.get_crawler(link);
    let domain = Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_default();

    match crawler.extract(link, user).await {
        Ok(()) => CrawlOutcome {
            link: link.to_string(),
            domain,
            success: true,
            error: None,
            retryable: false,
        },
        Err(e) => {
            let retryable = e.is_retryable();
            if retryable {
                tracing::warn!("Crawling {} failed, a later run may succeed: {}", link, e);
            } else {
                tracing::error!("An error occurred while crawling {}: {}", link, e);
            }
            CrawlOutcome {
                link: link.to_string(),
                domain,
                success: false,
                error: Some(e.to_string()),
                retryable,
            }
        }
    }
}

#[cfg(feature = "cli")]
struct Progress(Option<indicatif::ProgressBar>);

#[cfg(feature = "cli")]
impl Progress {
    fn new(len: usize, enabled: bool) -> Self {
        if !enabled {
            return Self(None);
        }

        let bar = indicatif::ProgressBar::new(len as u64);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self(Some(bar))
    }

    fn set_message(&self, link: &str) {
        if let Some(bar) = &self.0 {
            bar.set_message(link.to_string());
        }
    }

    fn inc(&self) {
        if let Some(bar) = &self.0 {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = &self.0 {
            bar.finish_with_message("done");
        }
    }
}

// 非 CLI 建置沒有進度條
#[cfg(not(feature = "cli"))]
struct Progress;

#[cfg(not(feature = "cli"))]
impl Progress {
    fn new(_len: usize, _enabled: bool) -> Self {
        Self
    }

    fn set_message(&self, _link: &str) {}

    fn inc(&self) {}

    fn finish(&self) {}
}
