use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::{db::token_price::models::TokenPriceData, sync::hour::SECONDS_PER_HOUR};

/// How far back a history query reaches.
pub const HISTORY_WINDOW_SECONDS: i64 = 7 * 24 * SECONDS_PER_HOUR;

/// `yyyy-MM-dd'T'HH:mm:ss`, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Price columns exposed as separate series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "close")]
    Close,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "priceUSD")]
    PriceUsd,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Open,
        Metric::Close,
        Metric::High,
        Metric::Low,
        Metric::PriceUsd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Open => "open",
            Metric::Close => "close",
            Metric::High => "high",
            Metric::Low => "low",
            Metric::PriceUsd => "priceUSD",
        }
    }

    pub fn value(self, point: &TokenPriceData) -> f64 {
        match self {
            Metric::Open => point.open,
            Metric::Close => point.close,
            Metric::High => point.high,
            Metric::Low => point.low,
            Metric::PriceUsd => point.price_usd,
        }
    }
}

/// `(timestamp, metric, value)`, serialized as a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry(pub String, pub Metric, pub f64);

/// Resampled history of one token, one series per metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHistory {
    pub symbol: String,
    pub token_address: String,
    pub interval_hours: u32,
    pub open: Vec<SeriesEntry>,
    pub close: Vec<SeriesEntry>,
    pub high: Vec<SeriesEntry>,
    pub low: Vec<SeriesEntry>,
    #[serde(rename = "priceUSD")]
    pub price_usd: Vec<SeriesEntry>,
}

impl TokenHistory {
    pub fn series(&self, metric: Metric) -> &[SeriesEntry] {
        match metric {
            Metric::Open => &self.open,
            Metric::Close => &self.close,
            Metric::High => &self.high,
            Metric::Low => &self.low,
            Metric::PriceUsd => &self.price_usd,
        }
    }
}

/// Keeps the points lying a whole number of intervals away from
/// `reference_epoch_seconds`, in either direction.
pub fn resample(
    points: Vec<TokenPriceData>,
    reference_epoch_seconds: i64,
    interval_hours: u32,
) -> Vec<TokenPriceData> {
    let step = i64::from(interval_hours.max(1)) * SECONDS_PER_HOUR;

    points
        .into_iter()
        .filter(|point| (point.period_start_unix - reference_epoch_seconds).rem_euclid(step) == 0)
        .collect()
}

pub fn format_timestamp<Tz: TimeZone>(epoch_seconds: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_opt(epoch_seconds, 0).single() {
        Some(datetime) => datetime.format(TIMESTAMP_FORMAT).to_string(),
        None => Utc
            .timestamp_opt(epoch_seconds, 0)
            .single()
            .map(|datetime| datetime.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| epoch_seconds.to_string()),
    }
}

/// Splits already resampled points into the five metric series.
pub fn to_history<Tz: TimeZone>(
    symbol: &str,
    token_address: &str,
    interval_hours: u32,
    points: &[TokenPriceData],
    tz: &Tz,
) -> TokenHistory
where
    Tz::Offset: std::fmt::Display,
{
    let timestamps: Vec<String> = points
        .iter()
        .map(|point| format_timestamp(point.period_start_unix, tz))
        .collect();

    let series = |metric: Metric| -> Vec<SeriesEntry> {
        points
            .iter()
            .zip(&timestamps)
            .map(|(point, timestamp)| SeriesEntry(timestamp.clone(), metric, metric.value(point)))
            .collect()
    };

    TokenHistory {
        symbol: symbol.to_string(),
        token_address: token_address.to_string(),
        interval_hours,
        open: series(Metric::Open),
        close: series(Metric::Close),
        high: series(Metric::High),
        low: series(Metric::Low),
        price_usd: series(Metric::PriceUsd),
    }
}
