//! Exchange and ticker identifiers.
//!
//! Both end up as path components in the exported tree, so construction
//! normalizes case and rejects anything outside `[A-Za-z0-9._-]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },

    #[error("{kind} '{value}' contains characters outside [A-Za-z0-9._-]")]
    InvalidCharacters { kind: &'static str, value: String },

    #[error("{kind} '{value}' must contain at least one letter or digit")]
    NoAlphanumeric { kind: &'static str, value: String },
}

fn validate(kind: &'static str, raw: &str) -> Result<(), IdentifierError> {
    if raw.is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    if !raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(IdentifierError::InvalidCharacters {
            kind,
            value: raw.to_string(),
        });
    }
    // Rejects "." and ".." style components.
    if !raw.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(IdentifierError::NoAlphanumeric {
            kind,
            value: raw.to_string(),
        });
    }
    Ok(())
}

/// Exchange code, always lowercase (e.g. `jse`, `ngx`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExchangeCode(String);

impl ExchangeCode {
    pub fn new(raw: &str) -> Result<Self, IdentifierError> {
        let normalized = raw.trim().to_ascii_lowercase();
        validate("exchange code", &normalized)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExchangeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ExchangeCode {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ExchangeCode> for String {
    fn from(code: ExchangeCode) -> Self {
        code.0
    }
}

/// Stock ticker, always uppercase (e.g. `NPN`, `MTNN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn new(raw: &str) -> Result<Self, IdentifierError> {
        let normalized = raw.trim().to_ascii_uppercase();
        validate("ticker", &normalized)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_code_is_lowercased() {
        let code = ExchangeCode::new(" JSE ").unwrap();
        assert_eq!(code.as_str(), "jse");
        assert_eq!(code.to_string(), "jse");
    }

    #[test]
    fn ticker_is_uppercased() {
        let ticker = Ticker::new("mtnn").unwrap();
        assert_eq!(ticker.as_str(), "MTNN");
    }

    #[test]
    fn dotted_tickers_are_allowed() {
        assert_eq!(Ticker::new("brk.b").unwrap().as_str(), "BRK.B");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(
            Ticker::new("  "),
            Err(IdentifierError::Empty { kind: "ticker" })
        );
    }

    #[test]
    fn rejects_path_separators() {
        assert!(matches!(
            ExchangeCode::new("../etc"),
            Err(IdentifierError::InvalidCharacters { .. })
        ));
        assert!(matches!(
            Ticker::new("a/b"),
            Err(IdentifierError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn rejects_dot_only_components() {
        assert!(matches!(
            ExchangeCode::new(".."),
            Err(IdentifierError::NoAlphanumeric { .. })
        ));
    }

    #[test]
    fn serde_normalizes_and_validates() {
        let code: ExchangeCode = serde_json::from_str("\"NGX\"").unwrap();
        assert_eq!(code.as_str(), "ngx");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"ngx\"");
        assert!(serde_json::from_str::<Ticker>("\"\"").is_err());
    }
}
