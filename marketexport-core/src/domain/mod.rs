//! Domain types for the market data export.

pub mod company;
pub mod ids;
pub mod price;
pub mod record;
pub mod section;

pub use company::{collect_tickers, ListedCompany};
pub use ids::{ExchangeCode, IdentifierError, Ticker};
pub use price::{latest_point, PricePoint};
pub use record::{ExchangeRecord, StockRecord};
pub use section::SectionKind;
