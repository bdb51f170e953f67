//! Route handlers. Every file read runs on the blocking pool.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use marketexport_core::domain::{ExchangeCode, ExchangeRecord, SectionKind, StockRecord, Ticker};
use marketexport_core::store::{layout, load_exchange_record, load_stock_record, StoreError};

use crate::error::ApiError;
use crate::ApiState;

#[derive(Debug, Serialize)]
pub struct TickerList {
    pub market: String,
    pub tickers: Vec<String>,
}

pub async fn root(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "message": "Market Data API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "exchange_index": "/exchange/{market}/index-price",
            "exchange_companies": "/exchange/{market}/companies",
            "stock_price": "/stock/{market}/{ticker}/price",
            "stock_growth": "/stock/{market}/{ticker}/growth-valuation",
            "stock_performance": "/stock/{market}/{ticker}/performance",
            "stock_competitors": "/stock/{market}/{ticker}/competitors",
            "stock_tickers": "/stock/{market}/tickers",
            "exchange_record": "/exchange/{market}",
            "stock_record": "/stock/{market}/{ticker}"
        },
        "valid_markets": state.market_names(),
    }))
}

pub async fn index_price(
    State(state): State<ApiState>,
    Path(market): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let market = state.market(&market)?;
    load(&state, layout::index_price(&market)).await
}

pub async fn companies(
    State(state): State<ApiState>,
    Path(market): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let market = state.market(&market)?;
    load(&state, layout::listed_companies(&market)).await
}

pub async fn stock_price(
    State(state): State<ApiState>,
    Path((market, ticker)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let (market, ticker) = stock(&state, &market, &ticker)?;
    load(&state, layout::stock_price(&market, &ticker)).await
}

pub async fn growth_valuation(
    state: State<ApiState>,
    path: Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    section(state, path, SectionKind::GrowthValuation).await
}

pub async fn performance(
    state: State<ApiState>,
    path: Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    section(state, path, SectionKind::Performance).await
}

pub async fn competitors(
    state: State<ApiState>,
    path: Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    section(state, path, SectionKind::Competitors).await
}

/// Tickers that have a stored price series, sorted.
pub async fn tickers(
    State(state): State<ApiState>,
    Path(market): Path<String>,
) -> Result<Json<TickerList>, ApiError> {
    let market = state.market(&market)?;
    let store = state.store.clone();
    let dir = layout::stocks_dir(&market);

    let files = tokio::task::spawn_blocking(move || store.list(&dir))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut tickers: Vec<String> = files
        .iter()
        .filter_map(|name| layout::ticker_from_price_file(name))
        .map(str::to_string)
        .collect();
    tickers.sort();
    tickers.dedup();

    Ok(Json(TickerList {
        market: market.to_string(),
        tickers,
    }))
}

/// Companies and index series of an exchange in one document.
pub async fn exchange_record(
    State(state): State<ApiState>,
    Path(market): Path<String>,
) -> Result<Json<ExchangeRecord>, ApiError> {
    let market = state.market(&market)?;
    let store = state.store.clone();

    let record = tokio::task::spawn_blocking(move || load_exchange_record(store.as_ref(), &market))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(store_error)?;

    if record.listed_companies.is_empty() && record.index_prices.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(record))
}

/// Price series and the three sections of a stock in one document.
pub async fn stock_record(
    State(state): State<ApiState>,
    Path((market, ticker)): Path<(String, String)>,
) -> Result<Json<StockRecord>, ApiError> {
    let (market, ticker) = stock(&state, &market, &ticker)?;
    let store = state.store.clone();

    let record = tokio::task::spawn_blocking(move || load_stock_record(store.as_ref(), &market, &ticker))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(store_error)?;

    let nothing_stored = record.prices.is_empty()
        && SectionKind::ALL.iter().all(|kind| record.section(*kind).is_empty());
    if nothing_stored {
        return Err(ApiError::NotFound);
    }
    Ok(Json(record))
}

async fn section(
    State(state): State<ApiState>,
    Path((market, ticker)): Path<(String, String)>,
    kind: SectionKind,
) -> Result<Json<Value>, ApiError> {
    let (market, ticker) = stock(&state, &market, &ticker)?;
    load(&state, layout::stock_section(&market, &ticker, kind)).await
}

fn stock(state: &ApiState, market: &str, ticker: &str) -> Result<(ExchangeCode, Ticker), ApiError> {
    let market = state.market(market)?;
    let ticker = Ticker::new(ticker).map_err(|_| ApiError::InvalidTicker(ticker.to_string()))?;
    Ok((market, ticker))
}

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::Malformed { ref path, .. } => {
            tracing::warn!(path = %path.display(), error = %err, "stored file is not valid");
            ApiError::InvalidData
        }
        other => ApiError::Internal(other.to_string()),
    }
}

async fn load(state: &ApiState, path: PathBuf) -> Result<Json<Value>, ApiError> {
    let store = state.store.clone();
    let read_path = path.clone();

    let bytes = tokio::task::spawn_blocking(move || store.read(&read_path))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e: StoreError| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound)?;

    serde_json::from_slice(&bytes).map(Json).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "stored file is not valid JSON");
        ApiError::InvalidData
    })
}
