//! Market data aggregate: records, the dataset, ingestion and statistics.

pub mod entities;
pub mod ingest;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use ingest::{IngestReport, parse_csv};
pub use services::{DatasetStats, SampleGenerator};
pub use value_objects::*;
