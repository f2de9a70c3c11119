pub mod etl;

pub use crate::domain::ports::{DocumentStore, Pipeline, Storage};
pub use crate::utils::error::Result;
