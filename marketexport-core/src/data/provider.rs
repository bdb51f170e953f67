//! Market data provider trait and structured fetch errors.
//!
//! The MarketDataProvider trait abstracts over the upstream source so the
//! orchestrator can be driven by the HTTP provider in production and by a
//! scripted provider in tests.

use serde_json::Value;
use thiserror::Error;

use crate::domain::{ExchangeCode, ListedCompany, PricePoint, SectionKind, Ticker};

/// Why a single upstream fetch failed.
///
/// Every variant is non-fatal to a run: the orchestrator logs it, counts the
/// update as skipped, and moves on to the next entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request for {entity} timed out")]
    Timeout { entity: String },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("not found: {entity}")]
    NotFound { entity: String },

    #[error("provider returned no data for {entity}")]
    NoData { entity: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP {status} for {entity}")]
    Status { status: u16, entity: String },

    #[error("network unreachable: {0}")]
    Network(String),
}

impl FetchError {
    /// Short machine-readable reason, used as a structured log field.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "timeout",
            FetchError::RateLimited { .. } => "rate-limited",
            FetchError::NotFound { .. } => "not-found",
            FetchError::NoData { .. } => "no-data",
            FetchError::MalformedResponse(_) => "malformed-response",
            FetchError::Status { .. } => "upstream-status",
            FetchError::Network(_) => "network",
        }
    }
}

/// Upstream source of exchange and stock data.
///
/// One call is one HTTP request (or equivalent) for one entity; pacing
/// between calls is the caller's job.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Full index price history of an exchange.
    fn index_prices(&self, exchange: &ExchangeCode) -> Result<Vec<PricePoint>, FetchError>;

    /// Companies currently listed on an exchange.
    fn listed_companies(&self, exchange: &ExchangeCode) -> Result<Vec<ListedCompany>, FetchError>;

    /// Full price history of one stock.
    fn stock_prices(
        &self,
        exchange: &ExchangeCode,
        ticker: &Ticker,
    ) -> Result<Vec<PricePoint>, FetchError>;

    /// Current records of one snapshot section of a stock.
    fn stock_section(
        &self,
        exchange: &ExchangeCode,
        ticker: &Ticker,
        kind: SectionKind,
    ) -> Result<Vec<Value>, FetchError>;
}
