//! Financial statement tools

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{parse_params, statement_schema, table_data, tool_output};
use crate::api::Period;
use crate::data::{MarketData, normalize_symbol};

/// Periods fetched and returned per call
const STATEMENT_PERIODS: usize = 12;

#[derive(Debug, Deserialize)]
struct StatementParams {
    symbol: String,
    #[serde(default)]
    quarterly: bool,
}

/// Income statements: revenue, margins, net income, EPS
pub struct IncomeStatementTool {
    market: Arc<MarketData>,
}

impl IncomeStatementTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for IncomeStatementTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: StatementParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let period = Period::from_quarterly(params.quarterly);

        let statements = self
            .market
            .income_statement(&symbol, period, STATEMENT_PERIODS)
            .await?;
        Ok(tool_output(
            &symbol,
            table_data(&statements, STATEMENT_PERIODS),
            "Income statements, most recent period first. Use them for revenue, \
             gross profit, EBITDA, operating and net income, EPS and diluted EPS. \
             Always mention the period each figure belongs to.",
        ))
    }

    fn name(&self) -> &'static str {
        "income_statement"
    }

    fn description(&self) -> &'static str {
        "Get annual or quarterly income statements for a stock: revenue, cost of revenue, \
         gross profit, EBITDA, operating income, net income, EPS."
    }

    fn input_schema(&self) -> Value {
        statement_schema()
    }
}

/// Cash-flow statements: operating, investing and free cash flow
pub struct CashFlowStatementTool {
    market: Arc<MarketData>,
}

impl CashFlowStatementTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for CashFlowStatementTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: StatementParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let period = Period::from_quarterly(params.quarterly);

        let statements = self
            .market
            .cash_flow_statement(&symbol, period, STATEMENT_PERIODS)
            .await?;
        Ok(tool_output(
            &symbol,
            table_data(&statements, STATEMENT_PERIODS),
            "Cash-flow statements, most recent period first. Use them for questions about \
             free cash flow (FCF), operating cash flow (OCF), capital expenditure and buybacks.",
        ))
    }

    fn name(&self) -> &'static str {
        "cash_flow_statement"
    }

    fn description(&self) -> &'static str {
        "Get annual or quarterly cash-flow statements for a stock: net income, operating \
         cash flow, capital expenditure, free cash flow, dividends, buybacks."
    }

    fn input_schema(&self) -> Value {
        statement_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::market;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_cash_flow_uses_cash_flow_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/cash-flow-statement/ACME")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("period".into(), "quarter".into()),
                Matcher::UrlEncoded("limit".into(), "12".into()),
            ]))
            .with_body(
                json!([
                    {"date": "2026-06-30", "period": "Q2", "freeCashFlow": 120, "operatingCashFlow": 200},
                    {"date": "2026-03-31", "period": "Q1", "freeCashFlow": 100, "operatingCashFlow": 180}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let tool = CashFlowStatementTool::new(market(&server.url()));
        let output = tool
            .execute(json!({ "symbol": "ACME", "quarterly": true }))
            .await
            .unwrap();

        assert_eq!(output["data"][0]["date"], "2026-06-30");
        assert_eq!(output["data"][0]["freeCashFlow"], 120);
        assert!(output["data"][1]["dividendsPaid"].is_null());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_income_statement_defaults_to_annual() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/income-statement/ACME")
            .match_query(Matcher::UrlEncoded("period".into(), "annual".into()))
            .with_body(json!([{"date": "2025-12-31", "revenue": 1000, "eps": 1.5}]).to_string())
            .create_async()
            .await;

        let tool = IncomeStatementTool::new(market(&server.url()));
        let output = tool.execute(json!({ "symbol": "ACME" })).await.unwrap();
        assert_eq!(output["data"][0]["eps"], 1.5);
        mock.assert_async().await;
    }
}
