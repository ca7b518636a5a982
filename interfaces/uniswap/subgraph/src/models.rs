use serde::{de, Deserialize, Deserializer, Serialize};

/// Envelope of every GraphQL answer.
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQueryData {
    pub token: Option<TokenMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHourDataQueryData {
    pub token_hour_data: Option<HourlyPrice>,
}

/// Static metadata of a token as reported by the subgraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "de_f64")]
    pub total_supply: f64,
    #[serde(rename = "volumeUSD", deserialize_with = "de_f64")]
    pub volume_usd: f64,
    #[serde(deserialize_with = "de_i32")]
    pub decimals: i32,
}

/// One `tokenHourData` entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPrice {
    #[serde(default)]
    pub id: String,
    #[serde(deserialize_with = "de_i64")]
    pub period_start_unix: i64,
    #[serde(deserialize_with = "de_f64")]
    pub open: f64,
    #[serde(deserialize_with = "de_f64")]
    pub close: f64,
    #[serde(deserialize_with = "de_f64")]
    pub high: f64,
    #[serde(deserialize_with = "de_f64")]
    pub low: f64,
    #[serde(rename = "priceUSD", deserialize_with = "de_f64")]
    pub price_usd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenMetadataResult {
    Found(TokenMetadata),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HourlyPriceResult {
    Found(HourlyPrice),
    NotFound,
}

// The subgraph serializes BigDecimal and BigInt as strings, but cached
// responses and fixtures often carry plain JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    String(String),
}

fn de_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(number) => number
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("{number} is not a finite number"))),
        NumberOrString::String(text) => text.trim().parse::<f64>().map_err(de::Error::custom),
    }
}

fn de_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(number) => number
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("{number} is not an integer"))),
        NumberOrString::String(text) => text.trim().parse::<i64>().map_err(de::Error::custom),
    }
}

fn de_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = de_i64(deserializer)?;
    i32::try_from(value).map_err(de::Error::custom)
}
