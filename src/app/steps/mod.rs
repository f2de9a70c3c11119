pub mod crawl_links;
pub mod get_or_create_user;

pub use crawl_links::crawl_links;
pub use get_or_create_user::get_or_create_user;
