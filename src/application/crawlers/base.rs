//! Shared pieces of the crawlers: the HTTP context and HTML text helpers.
//!
//! `scraper::Html` is not `Send`, so documents are parsed and reduced to owned
//! values inside plain functions and never held across an `.await`.

use crate::config::settings::Settings;
use crate::domain::documents::NoSqlDocument;
use crate::domain::ports::{filter, DocumentStore};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::Arc;

const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "head", "template"];

/// Everything a crawler needs to fetch pages and store documents.
#[derive(Clone)]
pub struct CrawlerContext {
    pub store: Arc<dyn DocumentStore>,
    pub client: Client,
    pub github_ignore: Vec<String>,
}

impl CrawlerContext {
    pub fn new(store: Arc<dyn DocumentStore>, settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.http_timeout())
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            store,
            client,
            github_ignore: settings.github_ignore.clone(),
        })
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub async fn fetch_html(&self, link: &str) -> Result<String> {
        tracing::debug!("Fetching {}", link);
        let response = self.client.get(link).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::HttpStatusError {
                url: link.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// 是否已經有相同連結的文件
    pub async fn already_stored<D: NoSqlDocument>(&self, link: &str) -> Result<bool> {
        let existing = D::find(self.store(), &filter([("link", Value::from(link))])).await?;
        Ok(existing.is_some())
    }
}

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::ProcessingError {
        message: format!("invalid CSS selector '{}': {:?}", css, e),
    })
}

/// Collapses runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matching `css`, if any and non-empty.
pub fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    let selector = selector(css)?;
    Ok(document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty()))
}

pub fn first_attr(document: &Html, css: &str, attr: &str) -> Result<Option<String>> {
    let selector = selector(css)?;
    Ok(document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Visible text of a page, one line per text node, skipping scripts and styles.
pub fn readable_text(document: &Html) -> String {
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        let line = collapse_whitespace(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Every text node of the page, `<head>` included, one per line.
pub fn full_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn optional_string(value: Option<String>) -> Value {
    value.map(Value::String).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>  A   title </title>
  <meta name="description" content="A short description">
  <style>body { color: red; }</style>
</head>
<body>
  <h1 class="headline">Hello
     world</h1>
  <script>var tracking = true;</script>
  <p>First paragraph.</p>
  <noscript>Enable JavaScript</noscript>
  <p>  Second   paragraph. </p>
</body>
</html>"#;

    #[test]
    fn test_readable_text_skips_scripts_and_styles() {
        let document = Html::parse_document(PAGE);
        let text = readable_text(&document);

        assert_eq!(text, "Hello world\nFirst paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_first_text_and_attr() {
        let document = Html::parse_document(PAGE);

        assert_eq!(first_text(&document, "title").unwrap().as_deref(), Some("A title"));
        assert_eq!(first_text(&document, "h2").unwrap(), None);
        assert_eq!(
            first_attr(&document, r#"meta[name="description"]"#, "content")
                .unwrap()
                .as_deref(),
            Some("A short description")
        );
        assert_eq!(first_attr(&document, "html", "lang").unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        assert!(selector("h1[").is_err());
    }
}
