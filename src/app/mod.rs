pub mod pipelines;
pub mod steps;
