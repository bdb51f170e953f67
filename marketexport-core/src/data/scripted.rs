//! Scripted in-memory provider.
//!
//! Answers from tables filled in up front and records every call, so
//! orchestrator tests can run full and incremental exports without a network.
//! Anything not scripted answers `NotFound`.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::provider::{FetchError, MarketDataProvider};
use crate::domain::{ExchangeCode, ListedCompany, PricePoint, SectionKind, Ticker};

type Scripted<T> = Result<T, FetchError>;

#[derive(Default)]
pub struct ScriptedProvider {
    index: HashMap<String, Scripted<Vec<PricePoint>>>,
    companies: HashMap<String, Scripted<Vec<ListedCompany>>>,
    prices: HashMap<(String, String), Scripted<Vec<PricePoint>>>,
    sections: HashMap<(String, String, SectionKind), Scripted<Vec<Value>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, exchange: &str, points: Vec<PricePoint>) -> Self {
        self.index.insert(key(exchange), Ok(points));
        self
    }

    pub fn with_companies(mut self, exchange: &str, companies: Vec<ListedCompany>) -> Self {
        self.companies.insert(key(exchange), Ok(companies));
        self
    }

    pub fn with_stock_prices(mut self, exchange: &str, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.prices.insert(stock_key(exchange, ticker), Ok(points));
        self
    }

    pub fn with_section(
        mut self,
        exchange: &str,
        ticker: &str,
        kind: SectionKind,
        records: Vec<Value>,
    ) -> Self {
        let (e, t) = stock_key(exchange, ticker);
        self.sections.insert((e, t, kind), Ok(records));
        self
    }

    /// Script the same records for all three sections of a stock.
    pub fn with_all_sections(self, exchange: &str, ticker: &str, records: Vec<Value>) -> Self {
        SectionKind::ALL.iter().fold(self, |p, kind| {
            p.with_section(exchange, ticker, *kind, records.clone())
        })
    }

    pub fn failing_index(mut self, exchange: &str, error: FetchError) -> Self {
        self.index.insert(key(exchange), Err(error));
        self
    }

    pub fn failing_companies(mut self, exchange: &str, error: FetchError) -> Self {
        self.companies.insert(key(exchange), Err(error));
        self
    }

    pub fn failing_stock_prices(mut self, exchange: &str, ticker: &str, error: FetchError) -> Self {
        self.prices.insert(stock_key(exchange, ticker), Err(error));
        self
    }

    pub fn failing_section(
        mut self,
        exchange: &str,
        ticker: &str,
        kind: SectionKind,
        error: FetchError,
    ) -> Self {
        let (e, t) = stock_key(exchange, ticker);
        self.sections.insert((e, t, kind), Err(error));
        self
    }

    /// Every call made so far, as `"{resource} {entity}"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn key(exchange: &str) -> String {
    exchange.to_ascii_lowercase()
}

fn stock_key(exchange: &str, ticker: &str) -> (String, String) {
    (exchange.to_ascii_lowercase(), ticker.to_ascii_uppercase())
}

fn lookup<K, T>(table: &HashMap<K, Scripted<T>>, k: &K, entity: String) -> Result<T, FetchError>
where
    K: std::hash::Hash + Eq,
    T: Clone,
{
    table
        .get(k)
        .cloned()
        .unwrap_or(Err(FetchError::NotFound { entity }))
}

impl MarketDataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn index_prices(&self, exchange: &ExchangeCode) -> Result<Vec<PricePoint>, FetchError> {
        self.record(format!("index {exchange}"));
        lookup(&self.index, &key(exchange.as_str()), format!("{exchange} index"))
    }

    fn listed_companies(&self, exchange: &ExchangeCode) -> Result<Vec<ListedCompany>, FetchError> {
        self.record(format!("companies {exchange}"));
        lookup(
            &self.companies,
            &key(exchange.as_str()),
            format!("{exchange} companies"),
        )
    }

    fn stock_prices(
        &self,
        exchange: &ExchangeCode,
        ticker: &Ticker,
    ) -> Result<Vec<PricePoint>, FetchError> {
        self.record(format!("price {exchange}/{ticker}"));
        lookup(
            &self.prices,
            &stock_key(exchange.as_str(), ticker.as_str()),
            format!("{exchange}/{ticker} price"),
        )
    }

    fn stock_section(
        &self,
        exchange: &ExchangeCode,
        ticker: &Ticker,
        kind: SectionKind,
    ) -> Result<Vec<Value>, FetchError> {
        self.record(format!("{} {exchange}/{ticker}", kind.file_suffix()));
        let (e, t) = stock_key(exchange.as_str(), ticker.as_str());
        lookup(
            &self.sections,
            &(e, t, kind),
            format!("{exchange}/{ticker} {kind}"),
        )
    }
}
