//! Task analysis cycle: staleness check, pairwise comparison, aggregation.

pub mod aggregator;
pub mod clock;
pub mod lock;
pub mod orchestrator;

pub use aggregator::ReportAggregator;
pub use clock::{Clock, SystemClock};
pub use lock::TaskLocks;
pub use orchestrator::TaskAnalysisOrchestrator;
