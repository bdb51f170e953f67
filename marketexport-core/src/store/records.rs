//! Assemble exchange and stock records from the stored files.

use serde_json::Value;

use super::policy::{read_json, read_listed_companies, read_price_series};
use super::{layout, DocumentStore, StoreError};
use crate::domain::{ExchangeCode, ExchangeRecord, SectionKind, StockRecord, Ticker};

/// Everything stored for an exchange. Missing files read as empty.
pub fn load_exchange_record(
    store: &dyn DocumentStore,
    exchange: &ExchangeCode,
) -> Result<ExchangeRecord, StoreError> {
    Ok(ExchangeRecord {
        exchange: exchange.clone(),
        listed_companies: read_listed_companies(store, exchange)?,
        index_prices: read_price_series(store, &layout::index_price(exchange))?,
    })
}

/// Everything stored for a stock. Missing files read as empty.
pub fn load_stock_record(
    store: &dyn DocumentStore,
    exchange: &ExchangeCode,
    ticker: &Ticker,
) -> Result<StockRecord, StoreError> {
    let section = |kind: SectionKind| -> Result<Vec<Value>, StoreError> {
        Ok(read_json(store, &layout::stock_section(exchange, ticker, kind))?.unwrap_or_default())
    };

    Ok(StockRecord {
        ticker: ticker.clone(),
        exchange: exchange.clone(),
        prices: read_price_series(store, &layout::stock_price(exchange, ticker))?,
        competitors: section(SectionKind::Competitors)?,
        performance: section(SectionKind::Performance)?,
        growth_valuation: section(SectionKind::GrowthValuation)?,
    })
}
