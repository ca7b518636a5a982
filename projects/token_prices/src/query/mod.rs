//! Read side: trailing-week history of a token, resampled to a fixed
//! interval and split into one series per metric.

pub mod resample;
pub mod service;

pub use resample::{Metric, SeriesEntry, TokenHistory};
pub use service::{QueryError, QueryService};
