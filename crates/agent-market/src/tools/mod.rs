//! Market data tools for LLM agents
//!
//! Every tool answers with `{ "symbol", "data", "guidance" }`: the normalized
//! data plus a note on how a summarizer should read it.

pub mod analyst;
pub mod company;
pub mod search;
pub mod statements;
pub mod technical;
pub mod transcript;
pub mod valuation;

pub use analyst::{AnalystEstimatesTool, EarningSurpriseTool, PriceTargetsTool};
pub use company::{CompanyProfileTool, SocialSentimentTool};
pub use search::WebSearchTool;
pub use statements::{CashFlowStatementTool, IncomeStatementTool};
pub use technical::{HistoricalPriceVolumeTool, TechnicalAnalysisTool};
pub use transcript::EarningsTranscriptTool;
pub use valuation::{DiscountedCashFlowTool, IntrinsicValueTool, PiotroskiScoreTool};

use crate::api::SerperClient;
use crate::cache::Table;
use crate::config::MarketConfig;
use crate::data::MarketData;
use crate::error::Result;
use agent_tools::ToolRegistry;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Parameters of tools that only take a ticker
#[derive(Debug, Deserialize)]
pub(crate) struct SymbolParams {
    pub symbol: String,
}

pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> agent_core::Result<T> {
    Ok(serde_json::from_value(params)?)
}

pub(crate) fn tool_output(symbol: &str, data: Value, guidance: &str) -> Value {
    json!({
        "symbol": symbol,
        "data": data,
        "guidance": guidance,
    })
}

/// First `rows` rows as JSON objects
pub(crate) fn table_data(table: &Table, rows: usize) -> Value {
    Value::Array(table.head(rows).to_records())
}

pub(crate) fn symbol_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "Stock ticker symbol (e.g., 'AAPL', 'MSFT')"
            }
        },
        "required": ["symbol"]
    })
}

pub(crate) fn statement_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "Stock ticker symbol (e.g., 'AAPL', 'MSFT')"
            },
            "quarterly": {
                "type": "boolean",
                "description": "Quarterly statements instead of annual",
                "default": false
            }
        },
        "required": ["symbol"]
    })
}

/// The tool set exposed to the agent
///
/// `web_search` is only registered when a search API key is configured.
pub fn default_registry(market: Arc<MarketData>, config: &MarketConfig) -> Result<ToolRegistry> {
    let registry = ToolRegistry::new();

    registry.register(Arc::new(CompanyProfileTool::new(Arc::clone(&market))));
    registry.register(Arc::new(DiscountedCashFlowTool::new(Arc::clone(&market))));
    registry.register(Arc::new(IntrinsicValueTool::new(Arc::clone(&market))));
    registry.register(Arc::new(PiotroskiScoreTool::new(Arc::clone(&market))));
    registry.register(Arc::new(IncomeStatementTool::new(Arc::clone(&market))));
    registry.register(Arc::new(CashFlowStatementTool::new(Arc::clone(&market))));
    registry.register(Arc::new(TechnicalAnalysisTool::new(Arc::clone(&market))));
    registry.register(Arc::new(HistoricalPriceVolumeTool::new(Arc::clone(&market))));
    registry.register(Arc::new(AnalystEstimatesTool::new(Arc::clone(&market))));
    registry.register(Arc::new(EarningSurpriseTool::new(Arc::clone(&market))));
    registry.register(Arc::new(PriceTargetsTool::new(Arc::clone(&market))));
    registry.register(Arc::new(EarningsTranscriptTool::new(Arc::clone(&market))));
    registry.register(Arc::new(SocialSentimentTool::new(market)));

    if let Some(key) = &config.serper_api_key {
        let client = SerperClient::new(key, config.request_timeout)?;
        registry.register(Arc::new(WebSearchTool::new(client)));
    }

    info!(tools = registry.len(), "Registered market tools");
    Ok(registry)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::api::FmpClient;
    use crate::cache::{CacheLayer, TtlPolicy};
    use crate::data::MarketData;
    use std::sync::Arc;
    use std::time::Duration;

    /// Market data against a mock server with an in-memory cache
    pub fn market(base_url: &str) -> Arc<MarketData> {
        let client = FmpClient::new("test_key", base_url, Duration::from_secs(5)).unwrap();
        let cache = CacheLayer::in_memory("test", TtlPolicy::default());
        Arc::new(MarketData::new(client, cache))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(serper: Option<&str>) -> MarketConfig {
        let mut builder = MarketConfig::builder().fmp_api_key("test_key");
        if let Some(key) = serper {
            builder = builder.serper_api_key(key);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_default_registry_without_search() {
        let market = test_support::market("http://127.0.0.1:9");
        let registry = default_registry(market, &config(None)).unwrap();

        assert_eq!(registry.len(), 13);
        assert!(registry.get("web_search").is_none());
        for name in [
            "company_profile",
            "discounted_cash_flow",
            "intrinsic_value_dcf",
            "piotroski_score",
            "income_statement",
            "cash_flow_statement",
            "technical_analysis_daily",
            "historical_price_volume",
            "analyst_estimates",
            "analyst_earning_surprise",
            "analyst_price_targets",
            "earnings_transcript",
            "social_sentiment",
        ] {
            assert!(registry.get(name).is_some(), "missing tool {name}");
        }
    }

    #[test]
    fn test_default_registry_with_search() {
        let market = test_support::market("http://127.0.0.1:9");
        let registry = default_registry(market, &config(Some("serper_key"))).unwrap();
        assert_eq!(registry.len(), 14);
        assert!(registry.get("web_search").is_some());
    }

    #[test]
    fn test_every_schema_requires_input() {
        let market = test_support::market("http://127.0.0.1:9");
        let registry = default_registry(market, &config(Some("serper_key"))).unwrap();
        for definition in registry.definitions() {
            assert_eq!(definition.input_schema["type"], "object", "{}", definition.name);
            assert!(!definition.description.is_empty());
        }
    }

    #[test]
    fn test_parse_params_error_kind() {
        let err = parse_params::<SymbolParams>(json!({"ticker": "ACME"})).unwrap_err();
        assert!(matches!(err, agent_core::Error::InvalidParameters(_)));
    }
}
