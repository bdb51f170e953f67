//! Listed companies of an exchange.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ids::{IdentifierError, Ticker};

/// One row of an exchange's listed-companies snapshot.
///
/// Upstream rows occasionally arrive without a ticker, so it stays optional
/// here and is validated when the stock list is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedCompany {
    pub ticker: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
}

impl ListedCompany {
    pub fn new(ticker: &str, name: &str) -> Self {
        Self {
            ticker: Some(ticker.to_string()),
            name: Some(name.to_string()),
            volume: None,
            price: None,
            change: None,
        }
    }

    /// `None` when the row has no ticker at all.
    pub fn parsed_ticker(&self) -> Option<Result<Ticker, IdentifierError>> {
        self.ticker
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(Ticker::new)
    }
}

/// Distinct, valid tickers in listing order. Invalid rows are logged and skipped.
pub fn collect_tickers(companies: &[ListedCompany]) -> Vec<Ticker> {
    let mut seen = HashSet::new();
    let mut tickers = Vec::new();
    for company in companies {
        match company.parsed_ticker() {
            Some(Ok(ticker)) => {
                if seen.insert(ticker.clone()) {
                    tickers.push(ticker);
                }
            }
            Some(Err(e)) => tracing::warn!(error = %e, "skipping listed company"),
            None => {}
        }
    }
    tickers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_tickers_dedups_and_skips_blank() {
        let mut blank = ListedCompany::new("", "Nameless");
        blank.ticker = None;
        let companies = vec![
            ListedCompany::new("npn", "Naspers"),
            blank,
            ListedCompany::new("SBK", "Standard Bank"),
            ListedCompany::new("NPN", "Naspers again"),
            ListedCompany::new("bad/ticker", "Broken"),
        ];
        let tickers: Vec<String> = collect_tickers(&companies)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tickers, vec!["NPN", "SBK"]);
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let c: ListedCompany = serde_json::from_str(r#"{"ticker":"MTNN"}"#).unwrap();
        assert_eq!(c.ticker.as_deref(), Some("MTNN"));
        assert!(c.name.is_none());

        let c: ListedCompany = serde_json::from_str(r#"{"ticker":null,"name":"x"}"#).unwrap();
        assert!(c.parsed_ticker().is_none());
    }
}
