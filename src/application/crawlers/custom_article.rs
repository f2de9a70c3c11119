use super::base::{first_attr, first_text, optional_string, readable_text, CrawlerContext};
use crate::domain::documents::{ArticleDocument, ContentFields, NoSqlDocument, UserDocument};
use crate::domain::ports::Crawler;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use scraper::Html;
use serde_json::{Map, Value};
use url::Url;

/// Generic crawler for any article page.
pub struct CustomArticleCrawler {
    context: CrawlerContext,
}

impl CustomArticleCrawler {
    pub fn new(context: CrawlerContext) -> Self {
        Self { context }
    }
}

pub(crate) fn parse_article(html: &str) -> Result<Map<String, Value>> {
    let document = Html::parse_document(html);

    let title = first_text(&document, "title")?;
    let subtitle = first_attr(&document, r#"meta[name="description"]"#, "content")?;
    let language = first_attr(&document, "html", "lang")?;
    let content = readable_text(&document);

    let mut data = Map::new();
    data.insert("Title".to_string(), optional_string(title));
    data.insert("Subtitle".to_string(), optional_string(subtitle));
    data.insert("Content".to_string(), Value::String(content));
    data.insert("language".to_string(), optional_string(language));
    Ok(data)
}

#[async_trait]
impl Crawler for CustomArticleCrawler {
    fn name(&self) -> &'static str {
        "custom_article"
    }

    async fn extract(&self, link: &str, user: &UserDocument) -> Result<()> {
        if self.context.already_stored::<ArticleDocument>(link).await? {
            tracing::info!("Article exists in database: {}", link);
            return Ok(());
        }

        tracing::info!("Starting scrapping article: {}", link);

        let platform = Url::parse(link)?
            .host_str()
            .map(str::to_string)
            .ok_or_else(|| EtlError::CrawlError {
                crawler: self.name().to_string(),
                link: link.to_string(),
                message: "URL has no host".to_string(),
            })?;

        let html = self.context.fetch_html(link).await?;
        let content = parse_article(&html)?;

        let article = ArticleDocument::new(ContentFields::new(content, platform, user), link);
        article.save(self.context.store()).await?;

        tracing::info!("Finished scrapping custom article: {}", link);
        Ok(())
    }
}
