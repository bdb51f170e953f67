//! Exchange registry: the exchanges an export run covers.
//!
//! Defaults to the ten African exchanges the exporter was built for; the
//! runner configuration can replace the list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ExchangeCode;

/// An exchange: code used in paths and URLs, plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub code: ExchangeCode,
    pub name: String,
}

impl Exchange {
    pub fn new(code: ExchangeCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("exchange '{0}' is listed more than once")]
    Duplicate(String),
}

/// Ordered, duplicate-free list of exchanges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRegistry {
    exchanges: Vec<Exchange>,
}

const AFRICAN_MARKETS: [(&str, &str); 10] = [
    ("bse", "Botswana Stock Exchange"),
    ("brvm", "Bourse Régionale des Valeurs Mobilières"),
    ("gse", "Ghana Stock Exchange"),
    ("jse", "Johannesburg Stock Exchange"),
    ("luse", "Lusaka Securities Exchange"),
    ("mse", "Malawi Stock Exchange"),
    ("nse", "Nairobi Securities Exchange"),
    ("ngx", "Nigerian Stock Exchange"),
    ("use", "Uganda Securities Exchange"),
    ("zse", "Zimbabwe Stock Exchange"),
];

impl ExchangeRegistry {
    pub fn new(exchanges: Vec<Exchange>) -> Result<Self, RegistryError> {
        for (i, exchange) in exchanges.iter().enumerate() {
            if exchanges[..i].iter().any(|e| e.code == exchange.code) {
                return Err(RegistryError::Duplicate(exchange.code.to_string()));
            }
        }
        Ok(Self { exchanges })
    }

    /// The default registry of African exchanges.
    pub fn african_markets() -> Self {
        let exchanges = AFRICAN_MARKETS
            .iter()
            .filter_map(|(code, name)| {
                ExchangeCode::new(code)
                    .ok()
                    .map(|code| Exchange::new(code, *name))
            })
            .collect();
        Self { exchanges }
    }

    /// Exchanges in their configured order.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn codes(&self) -> Vec<ExchangeCode> {
        self.exchanges.iter().map(|e| e.code.clone()).collect()
    }

    pub fn get(&self, code: &ExchangeCode) -> Option<&Exchange> {
        self.exchanges.iter().find(|e| &e.code == code)
    }

    pub fn contains(&self, code: &ExchangeCode) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl Default for ExchangeRegistry {
    fn default() -> Self {
        Self::african_markets()
    }
}
