//! Cached financial-market data for LLM agents
//!
//! This crate fetches company data from Financial Modeling Prep and exposes it
//! to agents as tools. It includes:
//!
//! - A remote data client with path- and query-based symbol placement
//! - A versioned read-through cache over Redis (or an in-process store) with
//!   per-volatility-class TTLs and a degraded no-op mode
//! - Data-access operations returning normalized tables and scalars
//! - Valuation models (discounted free cash flow, Piotroski F-score)
//! - Agent tools wrapping the operations
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_market::{MarketConfig, MarketData, Period};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MarketConfig::from_env()?;
//!     let market = MarketData::from_config(&config).await?;
//!
//!     // First call fetches and caches for a week, later calls hit the cache
//!     let income = market.income_statement("AAPL", Period::Annual, 4).await?;
//!     println!("{} periods", income.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod tools;
pub mod valuation;

pub use api::{Endpoint, FmpClient, IndicatorKind, Period, SerperClient};
pub use cache::{CacheLayer, Cell, Table, TtlPolicy, VolatilityClass};
pub use config::{CacheConfig, MarketConfig};
pub use data::{DataRequest, MarketData};
pub use error::{MarketError, Result};
pub use tools::default_registry;
pub use valuation::DcfAssumptions;
