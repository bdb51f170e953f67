//! Upstream data access and the exchange registry

pub mod http;
pub mod provider;
pub mod registry;
pub mod scripted;

pub use http::{HttpProvider, HttpProviderConfig};
pub use provider::{FetchError, MarketDataProvider};
pub use registry::{Exchange, ExchangeRegistry, RegistryError};
pub use scripted::ScriptedProvider;
