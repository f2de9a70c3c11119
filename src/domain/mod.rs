// Domain layer: documents, run model and ports (interfaces).

pub mod documents;
pub mod model;
pub mod ports;
pub mod types;
