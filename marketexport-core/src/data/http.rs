//! HTTP market data provider.
//!
//! Fetches JSON arrays from a REST-style upstream, one blocking request per
//! entity:
//!
//! - `GET {base}/exchanges/{exchange}/index-price`
//! - `GET {base}/exchanges/{exchange}/companies`
//! - `GET {base}/stocks/{exchange}/{ticker}/price`
//! - `GET {base}/stocks/{exchange}/{ticker}/{competitors|performance|growth-valuation}`
//!
//! There is no retry and no backoff here. A failed request is reported once
//! and the orchestrator moves on.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::provider::{FetchError, MarketDataProvider};
use crate::domain::{ExchangeCode, ListedCompany, PricePoint, SectionKind, Ticker};

/// Retry-After fallback when a 429 carries no usable header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Connection settings for [`HttpProvider`].
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Trading days covered by the performance section.
    pub performance_window_days: u32,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000/api".into(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("marketexport/", env!("CARGO_PKG_VERSION")).into(),
            performance_window_days: 10,
        }
    }
}

/// Blocking HTTP provider.
pub struct HttpProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    performance_window_days: u32,
}

impl HttpProvider {
    pub fn new(config: HttpProviderConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            performance_window_days: config.performance_window_days,
        })
    }

    fn index_url(&self, exchange: &ExchangeCode) -> String {
        format!("{}/exchanges/{exchange}/index-price", self.base_url)
    }

    fn companies_url(&self, exchange: &ExchangeCode) -> String {
        format!("{}/exchanges/{exchange}/companies", self.base_url)
    }

    fn stock_url(&self, exchange: &ExchangeCode, ticker: &Ticker, resource: &str) -> String {
        format!("{}/stocks/{exchange}/{ticker}/{resource}", self.base_url)
    }

    fn section_url(&self, exchange: &ExchangeCode, ticker: &Ticker, kind: SectionKind) -> String {
        let url = self.stock_url(exchange, ticker, kind.route_segment());
        match kind {
            SectionKind::Performance => format!("{url}?days={}", self.performance_window_days),
            _ => url,
        }
    }

    /// Issue one GET and decode a non-empty JSON array.
    fn get_records<T: DeserializeOwned>(&self, url: &str, entity: &str) -> Result<Vec<T>, FetchError> {
        tracing::debug!(%url, "GET");

        let resp = self.client.get(url).send().map_err(|e| classify(e, entity))?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                entity: entity.to_string(),
            });
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                entity: entity.to_string(),
            });
        }

        let body = resp.text().map_err(|e| classify(e, entity))?;
        let records: Vec<T> = serde_json::from_str(&body).map_err(|e| {
            FetchError::MalformedResponse(format!("failed to parse response for {entity}: {e}"))
        })?;

        if records.is_empty() {
            return Err(FetchError::NoData {
                entity: entity.to_string(),
            });
        }

        Ok(records)
    }
}

fn classify(e: reqwest::Error, entity: &str) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            entity: entity.to_string(),
        }
    } else if e.is_decode() {
        FetchError::MalformedResponse(format!("{entity}: {e}"))
    } else {
        FetchError::Network(format!("{entity}: {e}"))
    }
}

impl MarketDataProvider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn index_prices(&self, exchange: &ExchangeCode) -> Result<Vec<PricePoint>, FetchError> {
        self.get_records(&self.index_url(exchange), &format!("{exchange} index"))
    }

    fn listed_companies(&self, exchange: &ExchangeCode) -> Result<Vec<ListedCompany>, FetchError> {
        self.get_records(&self.companies_url(exchange), &format!("{exchange} companies"))
    }

    fn stock_prices(
        &self,
        exchange: &ExchangeCode,
        ticker: &Ticker,
    ) -> Result<Vec<PricePoint>, FetchError> {
        self.get_records(
            &self.stock_url(exchange, ticker, "price"),
            &format!("{exchange}/{ticker} price"),
        )
    }

    fn stock_section(
        &self,
        exchange: &ExchangeCode,
        ticker: &Ticker,
        kind: SectionKind,
    ) -> Result<Vec<Value>, FetchError> {
        self.get_records(
            &self.section_url(exchange, ticker, kind),
            &format!("{exchange}/{ticker} {kind}"),
        )
    }
}
