//! On-disk layout of the exported tree, relative to the data directory.
//!
//! ```text
//! export_summary.json
//! exchanges/{exchange}_index_price.json
//! exchanges/{exchange}_listed_companies.json
//! stocks/{exchange}/{TICKER}_price.json
//! stocks/{exchange}/{TICKER}_{competitors|performance|growth_valuation}.json
//! ```

use std::path::PathBuf;

use crate::domain::{ExchangeCode, SectionKind, Ticker};

pub const DEFAULT_DATA_DIR: &str = "market_data";
pub const SUMMARY_FILE: &str = "export_summary.json";
pub const EXCHANGES_DIR: &str = "exchanges";
pub const STOCKS_DIR: &str = "stocks";

const PRICE_SUFFIX: &str = "_price.json";

pub fn summary() -> PathBuf {
    PathBuf::from(SUMMARY_FILE)
}

pub fn index_price(exchange: &ExchangeCode) -> PathBuf {
    PathBuf::from(EXCHANGES_DIR).join(format!("{exchange}_index_price.json"))
}

pub fn listed_companies(exchange: &ExchangeCode) -> PathBuf {
    PathBuf::from(EXCHANGES_DIR).join(format!("{exchange}_listed_companies.json"))
}

pub fn stocks_dir(exchange: &ExchangeCode) -> PathBuf {
    PathBuf::from(STOCKS_DIR).join(exchange.as_str())
}

pub fn stock_price(exchange: &ExchangeCode, ticker: &Ticker) -> PathBuf {
    stocks_dir(exchange).join(format!("{ticker}{PRICE_SUFFIX}"))
}

pub fn stock_section(exchange: &ExchangeCode, ticker: &Ticker, kind: SectionKind) -> PathBuf {
    stocks_dir(exchange).join(format!("{ticker}_{}.json", kind.file_suffix()))
}

/// `NPN_price.json` → `Some("NPN")`; anything else → `None`.
pub fn ticker_from_price_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(PRICE_SUFFIX)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn paths_follow_layout() {
        let jse = ExchangeCode::new("JSE").unwrap();
        let npn = Ticker::new("npn").unwrap();

        assert_eq!(summary(), Path::new("export_summary.json"));
        assert_eq!(index_price(&jse), Path::new("exchanges/jse_index_price.json"));
        assert_eq!(
            listed_companies(&jse),
            Path::new("exchanges/jse_listed_companies.json")
        );
        assert_eq!(stock_price(&jse, &npn), Path::new("stocks/jse/NPN_price.json"));
        assert_eq!(
            stock_section(&jse, &npn, SectionKind::GrowthValuation),
            Path::new("stocks/jse/NPN_growth_valuation.json")
        );
        assert_eq!(
            stock_section(&jse, &npn, SectionKind::Competitors),
            Path::new("stocks/jse/NPN_competitors.json")
        );
    }

    #[test]
    fn extracts_ticker_from_price_file_name() {
        assert_eq!(ticker_from_price_file("NPN_price.json"), Some("NPN"));
        assert_eq!(ticker_from_price_file("NPN_performance.json"), None);
        assert_eq!(ticker_from_price_file("_price.json"), None);
    }
}
