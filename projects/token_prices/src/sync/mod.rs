//! Subgraph to database reconciliation: one-shot backfill at start-up and
//! an hourly refresh of every tracked token.

pub mod hour;
pub mod schedule;
pub mod source;
pub mod synchronizer;

pub use source::PriceSource;
pub use synchronizer::{SampleFailure, SyncError, SyncReport, Synchronizer};
