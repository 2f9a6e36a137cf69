//! Services for report aggregation and snapshot loading

pub mod aggregator;
pub mod bucketer;
pub mod data_loader;
pub mod order_filter;
pub mod report;

pub use aggregator::Aggregator;
pub use bucketer::BucketPlan;
pub use data_loader::{DataLoaderService, DirectorySource, HttpSource, SnapshotSource};
pub use order_filter::eligible_for_report;
pub use report::{ReportAssembler, ReportInputs};
