//! Analyst coverage tools: estimates, earnings surprises, price targets

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{SymbolParams, parse_params, symbol_schema, table_data, tool_output};
use crate::api::Period;
use crate::data::{MarketData, normalize_symbol};

const ESTIMATE_PERIODS: usize = 8;
const SURPRISE_ROWS: usize = 12;
const PRICE_TARGET_ROWS: usize = 10;

#[derive(Debug, Deserialize)]
struct EstimateParams {
    symbol: String,
    #[serde(default = "default_quarterly")]
    quarterly: bool,
}

fn default_quarterly() -> bool {
    true
}

/// Consensus estimates for upcoming periods
pub struct AnalystEstimatesTool {
    market: Arc<MarketData>,
}

impl AnalystEstimatesTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for AnalystEstimatesTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: EstimateParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let period = Period::from_quarterly(params.quarterly);

        let estimates = self
            .market
            .analyst_estimates(&symbol, period, ESTIMATE_PERIODS)
            .await?;
        Ok(tool_output(
            &symbol,
            table_data(&estimates, ESTIMATE_PERIODS),
            "Analyst consensus for revenue, EBITDA, net income and EPS (low, average, high). \
             Give the date of every estimate you quote.",
        ))
    }

    fn name(&self) -> &'static str {
        "analyst_estimates"
    }

    fn description(&self) -> &'static str {
        "Get analyst estimates (expectations) for a company's upcoming quarters or years: \
         revenue, EBITDA, net income and EPS."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock ticker symbol (e.g., 'AAPL', 'MSFT')"
                },
                "quarterly": {
                    "type": "boolean",
                    "description": "Quarterly estimates instead of annual",
                    "default": true
                }
            },
            "required": ["symbol"]
        })
    }
}

/// Reported EPS against the estimate
pub struct EarningSurpriseTool {
    market: Arc<MarketData>,
}

impl EarningSurpriseTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for EarningSurpriseTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        let surprises = self.market.earnings_surprises(&symbol).await?;
        Ok(tool_output(
            &symbol,
            table_data(&surprises, SURPRISE_ROWS),
            "Actual EPS (`actualEarningResult`) against the analyst estimate \
             (`estimatedEarning`) per report date. Say whether each quarter beat or missed \
             and give the date.",
        ))
    }

    fn name(&self) -> &'static str {
        "analyst_earning_surprise"
    }

    fn description(&self) -> &'static str {
        "Compare actual earnings results against analyst expectations for the EPS metric."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

/// Analyst price target summary
pub struct PriceTargetsTool {
    market: Arc<MarketData>,
}

impl PriceTargetsTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for PriceTargetsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        let targets = self.market.price_target_summary(&symbol).await?;
        Ok(tool_output(
            &symbol,
            table_data(&targets, PRICE_TARGET_ROWS),
            "Number of published targets and their average over the last month, quarter, \
             year and all time. Compare with the current price and any DCF value.",
        ))
    }

    fn name(&self) -> &'static str {
        "analyst_price_targets"
    }

    fn description(&self) -> &'static str {
        "Get the analyst price target summary for a stock. \
         Useful next to a DCF or intrinsic value to judge the stock price."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::market;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_price_targets_query_based() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v4/price-target-summary")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "ACME".into()),
                Matcher::UrlEncoded("apikey".into(), "test_key".into()),
            ]))
            .with_body(
                json!([{
                    "symbol": "ACME",
                    "lastMonth": 3,
                    "lastMonthAvgPriceTarget": 120.5,
                    "publishers": "[\"Benzinga\"]"
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let tool = PriceTargetsTool::new(market(&server.url()));
        let output = tool.execute(json!({ "symbol": "ACME" })).await.unwrap();
        assert_eq!(output["data"][0]["symbol"], "ACME");
        assert_eq!(output["data"][0]["lastMonthAvgPriceTarget"], 120.5);
        assert!(output["data"][0]["allTime"].is_null());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_estimates_default_to_quarterly() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/analyst-estimates/ACME")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("period".into(), "quarter".into()),
                Matcher::UrlEncoded("limit".into(), "8".into()),
            ]))
            .with_body(json!([{"date": "2026-12-31", "estimatedEpsAvg": 1.1}]).to_string())
            .create_async()
            .await;

        let tool = AnalystEstimatesTool::new(market(&server.url()));
        let output = tool.execute(json!({ "symbol": "ACME" })).await.unwrap();
        assert_eq!(output["data"][0]["estimatedEpsAvg"], 1.1);
        mock.assert_async().await;
    }
}
