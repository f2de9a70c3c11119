pub mod base;
pub mod custom_article;
pub mod dispatcher;
pub mod github;
pub mod linkedin;
pub mod medium;

pub use base::CrawlerContext;
pub use custom_article::CustomArticleCrawler;
pub use dispatcher::CrawlerDispatcher;
pub use github::GithubCrawler;
pub use linkedin::LinkedInCrawler;
pub use medium::MediumCrawler;
