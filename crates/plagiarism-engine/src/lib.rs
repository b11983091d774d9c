pub mod analysis;
pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod extract;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use analysis::{SimilarityEngine, TextNormalizer};
pub use catalog::{FileCatalogProvider, HttpFileCatalog};
pub use config::{load_config, EngineConfig};
pub use engine::{Clock, ReportAggregator, SystemClock, TaskAnalysisOrchestrator};
pub use error::{
    CatalogError, ConfigError, EngineError, ErrorKind, ExtractError, Result, StoreError,
    ValidationError,
};
pub use extract::{DocumentExtractor, TextExtractor};
pub use model::{AggregatedMatch, FileDescriptor, PlagiarismReport, Task, TaskReport};
pub use service::{
    GetPlagiarismReportRequest, GetPlagiarismReportResponse, PlagiarismService, ServiceError,
    StatusCode,
};
pub use store::{ReportStore, SqliteReportStore};
