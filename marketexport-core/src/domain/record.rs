//! Aggregate views of what the exported tree holds for one exchange or stock.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::company::{collect_tickers, ListedCompany};
use super::ids::{ExchangeCode, Ticker};
use super::price::PricePoint;
use super::section::SectionKind;

/// Exchange-level data: listed companies and the index price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub exchange: ExchangeCode,
    pub listed_companies: Vec<ListedCompany>,
    pub index_prices: Vec<PricePoint>,
}

impl ExchangeRecord {
    pub fn tickers(&self) -> Vec<Ticker> {
        collect_tickers(&self.listed_companies)
    }
}

/// Stock-level data: the price series plus the three snapshot sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub ticker: Ticker,
    pub exchange: ExchangeCode,
    pub prices: Vec<PricePoint>,
    pub competitors: Vec<Value>,
    pub performance: Vec<Value>,
    pub growth_valuation: Vec<Value>,
}

impl StockRecord {
    pub fn section(&self, kind: SectionKind) -> &[Value] {
        match kind {
            SectionKind::Competitors => &self.competitors,
            SectionKind::Performance => &self.performance,
            SectionKind::GrowthValuation => &self.growth_valuation,
        }
    }
}
