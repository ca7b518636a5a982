use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{
    GraphQLResponse, HourlyPriceResult, TokenHourDataQueryData, TokenMetadataResult,
    TokenQueryData,
};

pub const UNISWAP_V3_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v3";

const TOKEN_QUERY: &str = r#"
    query getToken($id: ID!) {
        token(id: $id) {
            name
            symbol
            totalSupply
            volumeUSD
            decimals
        }
    }
"#;

const TOKEN_HOUR_DATA_QUERY: &str = r#"
    query getTokenHourData($id: ID!) {
        tokenHourData(id: $id) {
            id
            periodStartUnix
            open
            close
            high
            low
            priceUSD
        }
    }
"#;

/// Raw answer of the subgraph before decoding.
pub struct SubgraphResult {
    pub body: String,
    pub status: StatusCode,
}

/// Entity id of a `tokenHourData` record: `{address}-{hourIndex}`.
pub fn token_hour_data_id(address: &str, hour_index: i64) -> String {
    format!("{address}-{hour_index}")
}

#[derive(Debug, Clone)]
pub struct SubgraphClient {
    client: Client,
    endpoint: String,
}

impl SubgraphClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BuildClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("rust-client")
            .build()
            .map_err(|source| BuildClientError::Build { source })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch_token(&self, address: &str) -> Result<TokenMetadataResult, FetchError> {
        let result = self
            .post_query(TOKEN_QUERY, serde_json::json!({ "id": address }))
            .await?;

        parse_token_response(result)
    }

    pub async fn fetch_token_hour_data(
        &self,
        address: &str,
        hour_index: i64,
    ) -> Result<HourlyPriceResult, FetchError> {
        let id = token_hour_data_id(address, hour_index);
        let result = self
            .post_query(TOKEN_HOUR_DATA_QUERY, serde_json::json!({ "id": id }))
            .await?;

        parse_token_hour_data_response(result)
    }

    async fn post_query(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<SubgraphResult, FetchError> {
        let payload = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|source| FetchError::RequestSend { source })?;

        let status = response.status();

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::ResponseRead { status, source })?;

        Ok(SubgraphResult { body, status })
    }
}

pub fn parse_token_response(result: SubgraphResult) -> Result<TokenMetadataResult, FetchError> {
    let data: TokenQueryData = decode_data(result)?;

    Ok(match data.token {
        Some(token) => TokenMetadataResult::Found(token),
        None => TokenMetadataResult::NotFound,
    })
}

pub fn parse_token_hour_data_response(
    result: SubgraphResult,
) -> Result<HourlyPriceResult, FetchError> {
    let data: TokenHourDataQueryData = decode_data(result)?;

    Ok(match data.token_hour_data {
        Some(price) => HourlyPriceResult::Found(price),
        None => HourlyPriceResult::NotFound,
    })
}

fn decode_data<T: DeserializeOwned>(result: SubgraphResult) -> Result<T, FetchError> {
    let SubgraphResult { body, status } = result;

    if !status.is_success() {
        return Err(FetchError::Status { status, body });
    }

    let parsed = match serde_json::from_str::<GraphQLResponse<T>>(&body) {
        Ok(parsed) => parsed,
        Err(source) => {
            return Err(FetchError::DeserializeResponseBody {
                status,
                body,
                source,
            })
        }
    };

    if !parsed.errors.is_empty() {
        let messages = parsed
            .errors
            .into_iter()
            .map(|error| error.message)
            .collect();
        return Err(FetchError::GraphQL {
            status,
            body,
            messages,
        });
    }

    parsed.data.ok_or(FetchError::DataMissing { status, body })
}

#[derive(Debug, Error)]
pub enum BuildClientError {
    #[error("Build: {source}")]
    Build { source: reqwest::Error },
}

/// Every way a subgraph call can fail short of producing an answer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("RequestSend: {source}")]
    RequestSend { source: reqwest::Error },

    #[error("ResponseRead ({status}): {source}")]
    ResponseRead {
        status: StatusCode,
        source: reqwest::Error,
    },

    #[error("Status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("GraphQL ({status}): {}", .messages.join("; "))]
    GraphQL {
        status: StatusCode,
        body: String,
        messages: Vec<String>,
    },

    #[error("DeserializeResponseBody ({status}): {source}")]
    DeserializeResponseBody {
        status: StatusCode,
        body: String,
        source: serde_json::Error,
    },

    #[error("DataMissing ({status})")]
    DataMissing { status: StatusCode, body: String },
}

impl FetchError {
    /// HTTP status of the remote answer, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::RequestSend { source } => source.status(),
            FetchError::ResponseRead { status, .. }
            | FetchError::Status { status, .. }
            | FetchError::GraphQL { status, .. }
            | FetchError::DeserializeResponseBody { status, .. }
            | FetchError::DataMissing { status, .. } => Some(*status),
        }
    }

    /// Raw remote body, kept for diagnostics.
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchError::RequestSend { .. } | FetchError::ResponseRead { .. } => None,
            FetchError::Status { body, .. }
            | FetchError::GraphQL { body, .. }
            | FetchError::DeserializeResponseBody { body, .. }
            | FetchError::DataMissing { body, .. } => Some(body),
        }
    }
}
