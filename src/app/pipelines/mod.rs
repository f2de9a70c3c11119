pub mod digital_data_etl;

pub use digital_data_etl::DigitalDataEtl;
