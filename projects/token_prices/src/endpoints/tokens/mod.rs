pub mod read;
pub mod read_chart;
pub mod read_history;
pub mod sync;

use serde::Deserialize;

/// `?timeUnit=<hours>` of the history endpoints.
#[derive(Debug, Deserialize)]
pub struct TimeUnitQuery {
    #[serde(rename = "timeUnit")]
    pub time_unit: u32,
}
