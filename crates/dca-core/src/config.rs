//! Configuration
//!
//! Named settings resolved once at start-up. Anything required fails fast with
//! [`DcaError::Config`] before a single request leaves the process.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{DcaError, Result};
use crate::strategy::InvestmentPolicy;

pub const MAX_INVEST_KEY: &str = "MAX_INVEST_JPY";
pub const SYMBOL_KEY: &str = "DCA_SYMBOL";
pub const POLICY_KEY: &str = "DCA_POLICY";

pub const DEFAULT_SYMBOL: &str = "BTC";

/// A source of named string settings.
pub trait ConfigSource: Send + Sync {
    /// Raw value, `None` when unset.
    fn get(&self, key: &str) -> Option<String>;

    /// Value that must be present and non-blank.
    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| DcaError::Config(format!("{key} not set")))
    }
}

/// Process environment (after `.env` has been loaded by the binary).
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory settings, for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Parse a required setting.
pub fn parse_required<T>(source: &dyn ConfigSource, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = source.require(key)?;
    raw.trim()
        .parse()
        .map_err(|e| DcaError::Config(format!("{key}={raw:?} is malformed: {e}")))
}

/// Parse an optional setting, falling back to `default` when unset or blank.
pub fn parse_or<T>(source: &dyn ConfigSource, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match source.get(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| DcaError::Config(format!("{key}={raw:?} is malformed: {e}"))),
        None => Ok(default),
    }
}

/// Investment settings for one run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DcaSettings {
    /// Target fiat amount per run
    pub investment_cap: Decimal,

    /// Instrument symbol on the exchange (e.g. "BTC")
    pub symbol: String,

    /// Policy used to size the buy
    pub policy: InvestmentPolicy,
}

impl DcaSettings {
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        let investment_cap: Decimal = parse_required(source, MAX_INVEST_KEY)?;
        if investment_cap <= Decimal::ZERO {
            return Err(DcaError::Config(format!(
                "{MAX_INVEST_KEY} must be positive, got {investment_cap}"
            )));
        }

        let symbol = source
            .get(SYMBOL_KEY)
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

        let policy = parse_or(source, POLICY_KEY, InvestmentPolicy::default())?;

        tracing::info!(
            investment_cap = %investment_cap,
            symbol = %symbol,
            policy = %policy,
            "Loaded investment settings"
        );

        Ok(Self {
            investment_cap,
            symbol,
            policy,
        })
    }
}
