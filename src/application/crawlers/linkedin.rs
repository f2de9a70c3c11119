use super::base::{element_text, first_attr, selector, CrawlerContext};
use crate::domain::documents::{ContentFields, NoSqlDocument, PostDocument, UserDocument};
use crate::domain::ports::Crawler;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html};
use serde_json::{Map, Value};

/// Post commentary containers, most specific first.
const POST_SELECTORS: [&str; 3] = [
    r#"[data-test-id="main-feed-activity-card__commentary"]"#,
    ".feed-shared-update-v2__description",
    ".attributed-text-segment-list__content",
];

/// Classes of the card wrapping one post with its media.
const POST_CARDS: [&str; 2] = ["main-feed-activity-card", "feed-shared-update-v2"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScrapedPost {
    pub text: String,
    pub image: Option<String>,
}

pub struct LinkedInCrawler {
    context: CrawlerContext,
}

impl LinkedInCrawler {
    pub fn new(context: CrawlerContext) -> Self {
        Self { context }
    }
}

fn post_image(element: ElementRef<'_>) -> Result<Option<String>> {
    let img = selector("img[src]")?;
    // 只在所屬貼文卡片內找圖片，找不到卡片就只看貼文本身
    let container = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().classes().any(|class| POST_CARDS.contains(&class)))
        .unwrap_or(element);

    Ok(container
        .select(&img)
        .next()
        .and_then(|image| image.value().attr("src"))
        .map(str::to_string))
}

/// 解析頁面上的貼文；沒有貼文容器時退回 Open Graph 描述
pub(crate) fn parse_posts(html: &str) -> Result<Vec<ScrapedPost>> {
    let document = Html::parse_document(html);

    for css in POST_SELECTORS {
        let post_selector = selector(css)?;
        let mut posts = Vec::new();

        for element in document.select(&post_selector) {
            let text = element_text(element);
            if text.is_empty() {
                continue;
            }
            posts.push(ScrapedPost {
                text,
                image: post_image(element)?,
            });
        }

        if !posts.is_empty() {
            return Ok(posts);
        }
    }

    let description = first_attr(&document, r#"meta[property="og:description"]"#, "content")?;
    Ok(description
        .map(|text| ScrapedPost {
            text,
            image: first_attr(&document, r#"meta[property="og:image"]"#, "content")
                .ok()
                .flatten(),
        })
        .into_iter()
        .collect())
}

#[async_trait]
impl Crawler for LinkedInCrawler {
    fn name(&self) -> &'static str {
        "linkedin"
    }

    async fn extract(&self, link: &str, user: &UserDocument) -> Result<()> {
        if self.context.already_stored::<PostDocument>(link).await? {
            tracing::info!("Posts already exist in the database: {}", link);
            return Ok(());
        }

        tracing::info!("Starting scrapping LinkedIn posts: {}", link);

        let html = self.context.fetch_html(link).await?;
        let posts = parse_posts(&html)?;
        if posts.is_empty() {
            return Err(EtlError::CrawlError {
                crawler: self.name().to_string(),
                link: link.to_string(),
                message: "no posts found on the page".to_string(),
            });
        }

        let documents: Vec<PostDocument> = posts
            .into_iter()
            .map(|post| {
                let mut content = Map::new();
                content.insert("Content".to_string(), Value::String(post.text));
                PostDocument::new(
                    ContentFields::new(content, "linkedin", user),
                    post.image,
                    Some(link.to_string()),
                )
            })
            .collect();

        let count = documents.len();
        PostDocument::bulk_insert(self.context.store(), documents).await?;

        tracing::info!("Finished scrapping {} LinkedIn post(s): {}", count, link);
        Ok(())
    }
}
