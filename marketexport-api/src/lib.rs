//! Market Export API: read-only HTTP queries over the exported tree.
//!
//! Serves the files the exporter writes, one route per file kind. Nothing
//! here writes to the store.

pub mod error;
pub mod handlers;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use marketexport_core::domain::ExchangeCode;
use marketexport_core::store::DocumentStore;

pub use error::ApiError;

/// Shared state: the store to read from and the markets that may be queried.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn DocumentStore>,
    markets: Arc<Vec<ExchangeCode>>,
}

impl ApiState {
    pub fn new(store: Arc<dyn DocumentStore>, markets: Vec<ExchangeCode>) -> Self {
        Self {
            store,
            markets: Arc::new(markets),
        }
    }

    pub fn market_names(&self) -> Vec<String> {
        self.markets.iter().map(|m| m.to_string()).collect()
    }

    /// Resolve a path segment to a configured market, case-insensitively.
    pub fn market(&self, raw: &str) -> Result<ExchangeCode, ApiError> {
        let lower = raw.to_ascii_lowercase();
        self.markets
            .iter()
            .find(|m| m.as_str() == lower)
            .cloned()
            .ok_or_else(|| ApiError::InvalidMarket {
                valid: self.market_names(),
            })
    }
}

/// All query routes with permissive CORS and request tracing.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/exchange/:market", get(handlers::exchange_record))
        .route("/exchange/:market/index-price", get(handlers::index_price))
        .route("/exchange/:market/companies", get(handlers::companies))
        .route("/stock/:market/tickers", get(handlers::tickers))
        .route("/stock/:market/:ticker", get(handlers::stock_record))
        .route("/stock/:market/:ticker/price", get(handlers::stock_price))
        .route(
            "/stock/:market/:ticker/growth-valuation",
            get(handlers::growth_valuation),
        )
        .route("/stock/:market/:ticker/performance", get(handlers::performance))
        .route("/stock/:market/:ticker/competitors", get(handlers::competitors))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: ApiState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "query API listening");
    axum::serve(listener, router(state)).await
}
