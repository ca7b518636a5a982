//! Service settings, read from the environment (and `.env` when present).

use std::{net::SocketAddr, time::Duration};

use interfaces_uniswap_subgraph::index::UNISWAP_V3_SUBGRAPH_URL;
use thiserror::Error;

/// Tokens tracked when `TRACKED_TOKENS` is not set.
pub const DEFAULT_TRACKED_TOKENS: &[(&str, &str)] = &[
    ("WBTC", "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599"),
    ("GNO", "0x6810e776880c02933d47db1b9fc05908e5386b96"),
    ("SHIB", "0x95ad61b0a150d79219dcf64e1e6cc01f0b64c4ce"),
];

#[derive(Debug, Error)]
#[error("TokenNotSupported: {symbol}")]
pub struct TokenNotSupported {
    pub symbol: String,
}

/// Immutable symbol to address table shared by the synchronizer and the
/// query service. Symbols are matched case-insensitively, addresses are
/// stored lowercase as the subgraph indexes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTable {
    entries: Vec<(String, String)>,
}

impl TokenTable {
    pub fn new<S, A>(entries: impl IntoIterator<Item = (S, A)>) -> Self
    where
        S: AsRef<str>,
        A: AsRef<str>,
    {
        let mut table = Self {
            entries: Vec::new(),
        };
        for (symbol, address) in entries {
            let symbol = symbol.as_ref().trim().to_ascii_uppercase();
            let address = address.as_ref().trim().to_ascii_lowercase();
            match table.entries.iter_mut().find(|(known, _)| *known == symbol) {
                Some(entry) => entry.1 = address,
                None => table.entries.push((symbol, address)),
            }
        }
        table
    }

    /// Parses `SYMBOL=0xaddress` pairs separated by commas.
    pub fn parse(raw: &str) -> Result<Self, ParseTokenTableError> {
        let mut entries = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (symbol, address) = entry
                .split_once('=')
                .ok_or_else(|| ParseTokenTableError::MalformedEntry {
                    entry: entry.to_string(),
                })?;
            let (symbol, address) = (symbol.trim(), address.trim());
            if symbol.is_empty() {
                return Err(ParseTokenTableError::MalformedEntry {
                    entry: entry.to_string(),
                });
            }
            if !is_address(address) {
                return Err(ParseTokenTableError::InvalidAddress {
                    symbol: symbol.to_string(),
                    address: address.to_string(),
                });
            }
            entries.push((symbol, address));
        }

        if entries.is_empty() {
            return Err(ParseTokenTableError::Empty);
        }

        Ok(Self::new(entries))
    }

    pub fn address_of(&self, symbol: &str) -> Option<&str> {
        let symbol = symbol.trim();
        self.entries
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(symbol))
            .map(|(_, address)| address.as_str())
    }

    pub fn resolve(&self, symbol: &str) -> Result<&str, TokenNotSupported> {
        self.address_of(symbol).ok_or_else(|| TokenNotSupported {
            symbol: symbol.to_string(),
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(symbol, _)| symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TokenTable {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKED_TOKENS.iter().copied())
    }
}

fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[derive(Debug, Error)]
pub enum ParseTokenTableError {
    #[error("MalformedEntry: expected SYMBOL=0xaddress, got {entry:?}")]
    MalformedEntry { entry: String },
    #[error("InvalidAddress: {symbol} -> {address:?}")]
    InvalidAddress { symbol: String, address: String },
    #[error("Empty token table")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub subgraph_url: String,
    pub subgraph_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sync_interval: Duration,
    pub tokens: TokenTable,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        // A missing .env file is fine, the variables may come from the process.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or(SettingsError::MissingVar {
                name: "DATABASE_URL",
            })?;

        let subgraph_url =
            lookup("SUBGRAPH_URL").unwrap_or_else(|| UNISWAP_V3_SUBGRAPH_URL.to_string());

        let subgraph_timeout =
            Duration::from_secs(parse_var(&lookup, "SUBGRAPH_TIMEOUT_SECS", 30u64)?);

        let bind_addr = parse_var(
            &lookup,
            "BIND_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 8000)),
        )?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let sync_interval = match parse_var(&lookup, "SYNC_INTERVAL_SECS", 3600u64)? {
            0 => {
                return Err(SettingsError::InvalidVar {
                    name: "SYNC_INTERVAL_SECS",
                    value: "0".to_string(),
                    reason: "must be positive".to_string(),
                })
            }
            secs => Duration::from_secs(secs),
        };

        let tokens = match lookup("TRACKED_TOKENS") {
            Some(raw) => {
                TokenTable::parse(&raw).map_err(|source| SettingsError::TokenTable { source })?
            }
            None => TokenTable::default(),
        };

        Ok(Self {
            database_url,
            subgraph_url,
            subgraph_timeout,
            bind_addr,
            log_level,
            sync_interval,
            tokens,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|err: T::Err| SettingsError::InvalidVar {
                name,
                value: value.clone(),
                reason: err.to_string(),
            }),
        None => Ok(default),
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("MissingVar: {name}")]
    MissingVar { name: &'static str },
    #[error("InvalidVar: {name}={value:?}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("TokenTable: {source}")]
    TokenTable { source: ParseTokenTableError },
}
