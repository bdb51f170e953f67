//! Market Export Core: domain types, upstream provider, pacing, JSON store.
//!
//! This crate contains the building blocks of an export run:
//! - Domain types (exchange codes, tickers, price points, listed companies)
//! - The `MarketDataProvider` trait with HTTP and scripted implementations
//! - The exchange registry
//! - Fixed-size batching with static pauses
//! - The `DocumentStore` trait, its disk and in-memory implementations, and
//!   the append/replace update policies

pub mod data;
pub mod domain;
pub mod pacing;
pub mod store;
