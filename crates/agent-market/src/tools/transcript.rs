//! Earnings call transcript tool

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{parse_params, table_data, tool_output};
use crate::data::{MarketData, normalize_symbol};

/// Most years accepted in one multi-year request
const MAX_YEARS: usize = 5;

const TRANSCRIPT_GUIDANCE: &str = "\
Write the following sections from the transcript, naming the call date:
1. Key metrics: revenue and revenue growth, EPS and EPS growth, other figures management highlights.
2. Guidance: management's outlook for the coming quarter or year.
3. Notable questions from analysts and how management answered.";

#[derive(Debug, Deserialize)]
struct TranscriptParams {
    symbol: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    quarter: Option<u8>,
    #[serde(default)]
    years: Vec<i32>,
}

/// Latest, single-quarter or multi-year earnings call transcripts
pub struct EarningsTranscriptTool {
    market: Arc<MarketData>,
}

impl EarningsTranscriptTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for EarningsTranscriptTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: TranscriptParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        if params.years.len() > MAX_YEARS {
            return Err(agent_core::Error::InvalidParameters(format!(
                "at most {MAX_YEARS} years per request"
            )));
        }

        let data = if params.years.is_empty() {
            let transcripts = self
                .market
                .earnings_transcript(&symbol, params.year, params.quarter)
                .await?;
            table_data(&transcripts, 1)
        } else {
            let transcripts = self
                .market
                .batch_earnings_transcripts(&symbol, &params.years)
                .await?;
            table_data(&transcripts, transcripts.len())
        };

        Ok(tool_output(&symbol, data, TRANSCRIPT_GUIDANCE))
    }

    fn name(&self) -> &'static str {
        "earnings_transcript"
    }

    fn description(&self) -> &'static str {
        "Get the latest earnings call transcript for a company, a particular quarter's \
         transcript, or every transcript of a list of years."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock ticker symbol (e.g., 'AAPL', 'MSFT')"
                },
                "year": {
                    "type": "integer",
                    "description": "Fiscal year of the call. Omit for the latest call."
                },
                "quarter": {
                    "type": "integer",
                    "description": "Fiscal quarter of the call, only used with year",
                    "minimum": 1,
                    "maximum": 4
                },
                "years": {
                    "type": "array",
                    "items": { "type": "integer" },
                    "description": "Fetch every call of these years instead",
                    "maxItems": MAX_YEARS
                }
            },
            "required": ["symbol"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::market;
    use mockito::Matcher;

    fn transcript(year: i32, quarter: u8) -> Value {
        json!({
            "symbol": "ACME",
            "quarter": quarter,
            "year": year,
            "date": format!("{year}-0{}-28 17:00:00", quarter * 3),
            "content": format!("Q{quarter} {year} call")
        })
    }

    #[tokio::test]
    async fn test_latest_transcript() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/earning_call_transcript/ACME")
            .match_query(Matcher::UrlEncoded("apikey".into(), "test_key".into()))
            .with_body(json!([transcript(2026, 2)]).to_string())
            .create_async()
            .await;

        let tool = EarningsTranscriptTool::new(market(&server.url()));
        let output = tool.execute(json!({ "symbol": "ACME" })).await.unwrap();
        assert_eq!(output["data"][0]["content"], "Q2 2026 call");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_multi_year_skips_failed_year() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v4/batch_earning_call_transcript/ACME")
            .match_query(Matcher::UrlEncoded("year".into(), "2025".into()))
            .with_body(json!([transcript(2025, 1), transcript(2025, 2)]).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/v4/batch_earning_call_transcript/ACME")
            .match_query(Matcher::UrlEncoded("year".into(), "2024".into()))
            .with_status(502)
            .create_async()
            .await;

        let tool = EarningsTranscriptTool::new(market(&server.url()));
        let output = tool
            .execute(json!({ "symbol": "ACME", "years": [2024, 2025] }))
            .await
            .unwrap();

        let rows = output["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["year"] == 2025));
    }

    #[tokio::test]
    async fn test_too_many_years() {
        let tool = EarningsTranscriptTool::new(market("http://127.0.0.1:9"));
        let err = tool
            .execute(json!({ "symbol": "ACME", "years": [2020, 2021, 2022, 2023, 2024, 2025] }))
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_invalid_quarter() {
        let tool = EarningsTranscriptTool::new(market("http://127.0.0.1:9"));
        let err = tool
            .execute(json!({ "symbol": "ACME", "year": 2025, "quarter": 5 }))
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::InvalidParameters(_)));
    }
}
