//! API clients for market data providers

pub mod endpoints;
pub mod fmp;
pub mod serper;
pub mod types;

pub use endpoints::{Endpoint, SymbolPlacement};
pub use fmp::FmpClient;
pub use serper::{SearchHit, SearchResults, SerperClient};
pub use types::{
    CompanyProfile, DcfValuation, HistoricalPrices, IndicatorKind, IndicatorPoint, Period,
    PriceBar, Record, Transcript,
};
