//! Valuation tools: provider DCF, own intrinsic value model, Piotroski score

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{SymbolParams, parse_params, symbol_schema, table_data, tool_output};
use crate::data::{MarketData, normalize_symbol};
use crate::valuation::DcfAssumptions;

const NOT_ADVICE: &str = "This is not financial advice nor an endorsement of the company.";

/// The data provider's DCF value next to the current price
pub struct DiscountedCashFlowTool {
    market: Arc<MarketData>,
}

impl DiscountedCashFlowTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for DiscountedCashFlowTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        let dcf = self.market.discounted_cash_flow(&symbol).await?;
        Ok(tool_output(
            &symbol,
            table_data(&dcf, 1),
            &format!(
                "Show the DCF value together with the current stock price. \
                 Growth and discount rates are the data provider's own estimates. {NOT_ADVICE}"
            ),
        ))
    }

    fn name(&self) -> &'static str {
        "discounted_cash_flow"
    }

    fn description(&self) -> &'static str {
        "Get a discounted cash flow (DCF) estimate of a stock's intrinsic value \
         alongside its current price, as computed by the data provider."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

#[derive(Debug, Deserialize)]
struct IntrinsicValueParams {
    symbol: String,
    #[serde(default)]
    growth_rate: Option<f64>,
    #[serde(default)]
    perpetual_growth_rate: Option<f64>,
    #[serde(default)]
    wacc: Option<f64>,
    #[serde(default)]
    periods: Option<u32>,
}

impl IntrinsicValueParams {
    /// Explicit assumptions, `None` when the caller gave none
    fn assumptions(&self) -> Option<DcfAssumptions> {
        if self.growth_rate.is_none()
            && self.perpetual_growth_rate.is_none()
            && self.wacc.is_none()
            && self.periods.is_none()
        {
            return None;
        }

        let defaults = DcfAssumptions::default();
        Some(DcfAssumptions {
            growth_rate: self.growth_rate.unwrap_or(defaults.growth_rate),
            perpetual_growth_rate: self
                .perpetual_growth_rate
                .unwrap_or(defaults.perpetual_growth_rate),
            wacc: self.wacc.unwrap_or(defaults.wacc),
            periods: self.periods.unwrap_or(defaults.periods),
        })
    }
}

/// Intrinsic value from a discounted free-cash-flow model
///
/// With explicit assumptions one value is computed; without, low and high
/// scenarios are derived from the company's free-cash-flow growth.
pub struct IntrinsicValueTool {
    market: Arc<MarketData>,
}

impl IntrinsicValueTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for IntrinsicValueTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: IntrinsicValueParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        let data = match params.assumptions() {
            Some(assumptions) => {
                let value = self.market.intrinsic_value(&symbol, assumptions).await?;
                let price = self.market.current_price(&symbol).await?;
                json!({
                    "intrinsicValue": value,
                    "currentPrice": price,
                    "percentOfCurrentPrice": (price != 0.0).then(|| value / price),
                    "assumptions": assumptions,
                })
            }
            None => {
                let scenarios = self.market.estimate_intrinsic_value(&symbol).await?;
                table_data(&scenarios, scenarios.len())
            }
        };

        Ok(tool_output(
            &symbol,
            data,
            &format!(
                "An intrinsic value below the current price suggests the stock is overvalued, \
                 above it undervalued. Give the percentage move the intrinsic value implies. \
                 {NOT_ADVICE}"
            ),
        ))
    }

    fn name(&self) -> &'static str {
        "intrinsic_value_dcf"
    }

    fn description(&self) -> &'static str {
        "Calculate the intrinsic value per share of a stock with a discounted cash flow model. \
         Pass growth rate, perpetual growth rate, WACC and periods to value one scenario, \
         or only the symbol for low and high scenarios based on historical free cash flow growth."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock ticker symbol (e.g., 'AAPL', 'MSFT')"
                },
                "growth_rate": {
                    "type": "number",
                    "description": "Annual free cash flow growth, e.g. 0.11 for 11%"
                },
                "perpetual_growth_rate": {
                    "type": "number",
                    "description": "Growth after the projection period, e.g. 0.03"
                },
                "wacc": {
                    "type": "number",
                    "description": "Weighted average cost of capital, e.g. 0.08"
                },
                "periods": {
                    "type": "integer",
                    "description": "Projection length in years",
                    "minimum": 1,
                    "maximum": 50
                }
            },
            "required": ["symbol"]
        })
    }
}

/// Piotroski F-score from the latest two annual reports
pub struct PiotroskiScoreTool {
    market: Arc<MarketData>,
}

impl PiotroskiScoreTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for PiotroskiScoreTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        let score = self.market.piotroski_score(&symbol).await?;
        Ok(tool_output(
            &symbol,
            table_data(&score, score.len()),
            "Nine criteria scored 1 (pass) or 0 (fail) and their total. \
             8-9 indicates strong financial health, 0-2 weak.",
        ))
    }

    fn name(&self) -> &'static str {
        "piotroski_score"
    }

    fn description(&self) -> &'static str {
        "Get the Piotroski F-score of a company: nine profitability, leverage and \
         efficiency checks on its latest annual statements."
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

    #[test]
    fn test_partial_assumptions_use_defaults() {
        let params: IntrinsicValueParams =
            serde_json::from_value(json!({ "symbol": "ACME", "wacc": 0.09 })).unwrap();
        let assumptions = params.assumptions().unwrap();
        assert_eq!(assumptions.wacc, 0.09);
        assert_eq!(assumptions.periods, 10);

        let params: IntrinsicValueParams =
            serde_json::from_value(json!({ "symbol": "ACME" })).unwrap();
        assert!(params.assumptions().is_none());
    }

    #[tokio::test]
    async fn test_rejects_wacc_below_perpetual_growth() {
        let tool = IntrinsicValueTool::new(market("http://127.0.0.1:9"));
        let err = tool
            .execute(json!({ "symbol": "ACME", "wacc": 0.02, "perpetual_growth_rate": 0.03 }))
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_discounted_cash_flow() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/discounted-cash-flow/ACME")
            .match_query(Matcher::Any)
            .with_body(
                json!([{"symbol": "ACME", "date": "2026-10-16", "dcf": 150.25, "Stock Price": 120.0}])
                    .to_string(),
            )
            .create_async()
            .await;

        let tool = DiscountedCashFlowTool::new(market(&server.url()));
        let output = tool.execute(json!({ "symbol": "ACME" })).await.unwrap();
        assert_eq!(output["data"][0]["dcf"], 150.25);
        assert_eq!(output["data"][0]["stockPrice"], 120.0);
    }
}
