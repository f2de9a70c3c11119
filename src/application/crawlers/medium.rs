use super::base::{first_text, full_text, optional_string, CrawlerContext};
use crate::domain::documents::{ArticleDocument, ContentFields, NoSqlDocument, UserDocument};
use crate::domain::ports::Crawler;
use crate::utils::error::Result;
use async_trait::async_trait;
use scraper::Html;
use serde_json::{Map, Value};

pub struct MediumCrawler {
    context: CrawlerContext,
}

impl MediumCrawler {
    pub fn new(context: CrawlerContext) -> Self {
        Self { context }
    }
}

pub(crate) fn parse_medium_article(html: &str) -> Result<Map<String, Value>> {
    let document = Html::parse_document(html);

    let title = first_text(&document, "h1.pw-post-title")?;
    let subtitle = first_text(&document, "h2.pw-subtitle-paragraph")?;

    let mut data = Map::new();
    data.insert("Title".to_string(), optional_string(title));
    data.insert("Subtitle".to_string(), optional_string(subtitle));
    data.insert("Content".to_string(), Value::String(full_text(&document)));
    Ok(data)
}

#[async_trait]
impl Crawler for MediumCrawler {
    fn name(&self) -> &'static str {
        "medium"
    }

    async fn extract(&self, link: &str, user: &UserDocument) -> Result<()> {
        if self.context.already_stored::<ArticleDocument>(link).await? {
            tracing::info!("Article already exists in the database: {}", link);
            return Ok(());
        }

        tracing::info!("Starting scrapping Medium article: {}", link);

        let html = self.context.fetch_html(link).await?;
        let data = parse_medium_article(&html)?;

        let article = ArticleDocument::new(ContentFields::new(data, "medium", user), link);
        article.save(self.context.store()).await?;

        tracing::info!("Successfully scraped and saved article: {}", link);
        Ok(())
    }
}
