//! Company profile and social sentiment tools

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{SymbolParams, parse_params, symbol_schema, table_data, tool_output};
use crate::data::{MarketData, normalize_symbol};

/// Days of sentiment handed to the agent
const SENTIMENT_DAYS: usize = 7;

/// Company profile: sector, industry, size, description
pub struct CompanyProfileTool {
    market: Arc<MarketData>,
}

impl CompanyProfileTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for CompanyProfileTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        let profile = self.market.company_profile(&symbol).await?;
        Ok(tool_output(
            &symbol,
            table_data(&profile, 1),
            "Company profile fields as reported by the data provider. \
             Quote the sector, industry and market cap when describing the company.",
        ))
    }

    fn name(&self) -> &'static str {
        "company_profile"
    }

    fn description(&self) -> &'static str {
        "Get the company profile for a stock ticker: name, sector, industry, \
         market cap, price, beta, CEO and business description."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

/// Daily social media sentiment
pub struct SocialSentimentTool {
    market: Arc<MarketData>,
}

impl SocialSentimentTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for SocialSentimentTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        let sentiment = self.market.social_sentiment(&symbol).await?;
        Ok(tool_output(
            &symbol,
            table_data(&sentiment, SENTIMENT_DAYS),
            "One row per day, most recent first. Average `stocktwitsSentiment` over the week, \
             sum `stocktwitsPosts` to say how many posts it is based on, \
             and rate the overall mood as Bearish or Bullish.",
        ))
    }

    fn name(&self) -> &'static str {
        "social_sentiment"
    }

    fn description(&self) -> &'static str {
        "Get the daily social media sentiment for a stock over the last week."
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
    use serde_json::json;

    #[tokio::test]
    async fn test_company_profile_output() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/profile/ACME")
            .match_query(Matcher::Any)
            .with_body(
                json!([{
                    "symbol": "ACME",
                    "companyName": "Acme Corp",
                    "sector": "Industrials",
                    "mktCap": 5_000_000
                }])
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let tool = CompanyProfileTool::new(market(&server.url()));
        for _ in 0..2 {
            let output = tool.execute(json!({ "symbol": "acme" })).await.unwrap();
            assert_eq!(output["symbol"], "ACME");
            assert_eq!(output["data"][0]["companyName"], "Acme Corp");
            assert_eq!(output["data"][0]["mktCap"], 5_000_000.0);
            assert!(output["guidance"].as_str().is_some());
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_company_profile_remote_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/profile/ACME")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let tool = CompanyProfileTool::new(market(&server.url()));
        let err = tool.execute(json!({ "symbol": "ACME" })).await.unwrap_err();
        assert!(matches!(err, agent_core::Error::ProcessingFailed(_)));
    }

    #[tokio::test]
    async fn test_rejects_bad_symbol() {
        let tool = CompanyProfileTool::new(market("http://127.0.0.1:9"));
        let err = tool
            .execute(json!({ "symbol": "not a ticker" }))
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_social_sentiment_keeps_one_week() {
        let days: Vec<Value> = (1..=10)
            .map(|d| json!({ "date": format!("2026-10-{d:02}"), "stocktwitsSentiment": 0.6 }))
            .collect();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v4/historical/social-sentiment")
            .match_query(Matcher::UrlEncoded("symbol".into(), "ACME".into()))
            .with_body(Value::Array(days).to_string())
            .create_async()
            .await;

        let tool = SocialSentimentTool::new(market(&server.url()));
        let output = tool.execute(json!({ "symbol": "ACME" })).await.unwrap();
        assert_eq!(output["data"].as_array().unwrap().len(), SENTIMENT_DAYS);
        assert_eq!(output["data"][0]["stocktwitsSentiment"], 0.6);
    }
}
