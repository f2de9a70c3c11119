// Application layer: crawlers and helpers used by the ETL steps.

pub mod crawlers;
pub mod utils;
