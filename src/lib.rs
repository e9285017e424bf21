//! Ingestion and reconciliation of per-location hourly load and
//! temperature CSV fragments into one timestamp-indexed dataset.

pub mod assemble;
pub mod cache;
pub mod compute;
pub mod config;
pub mod convert;
pub mod error;
pub mod graph;
pub mod location;
pub mod model;
pub mod store;
pub mod year;

pub use assemble::assemble;
pub use cache::DatasetCache;
pub use config::PipelineConfig;
pub use error::LoadError;
pub use model::{DailyAggregate, LoadedDataset, LocationRecord, LocationSet, UnifiedDataset};
