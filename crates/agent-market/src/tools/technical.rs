//! Chart-based tools: moving averages, RSI, price and volume history

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{SymbolParams, parse_params, table_data, tool_output};
use crate::api::IndicatorKind;
use crate::data::{MarketData, normalize_symbol};

/// Trading days shown for every series
const CHART_DAYS: usize = 14;

/// Default and maximum lookback of the price history tool
const DEFAULT_HISTORY_DAYS: usize = 30;
const MAX_HISTORY_DAYS: usize = 365;

const TECHNICAL_GUIDANCE: &str = "\
1. Technical read: a close above the open is positive and a close below it negative, \
both stronger on high volume; rising volume strengthens the signal. \
RSI above 60 suggests overbought, below 30 oversold. \
Trading above the 20-day EMA and 50-day WMA is positive, below them negative.
2. Support: one or more levels below the current price.
3. Resistance: one or more levels above the current price.
4. Rate technical strength from 1 (Strong Sell) to 5 (Strong Buy).";

/// Daily chart technical analysis
///
/// Fetches the 20-day EMA, 50-day WMA, 14-day RSI and recent prices concurrently.
pub struct TechnicalAnalysisTool {
    market: Arc<MarketData>,
}

impl TechnicalAnalysisTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for TechnicalAnalysisTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;

        let (ema, wma, rsi, prices) = tokio::try_join!(
            self.market.technical_indicator(&symbol, IndicatorKind::Ema, 20),
            self.market.technical_indicator(&symbol, IndicatorKind::Wma, 50),
            self.market.technical_indicator(&symbol, IndicatorKind::Rsi, 14),
            self.market.historical_prices(&symbol, CHART_DAYS),
        )?;

        let data = json!({
            "ema20": table_data(&ema, CHART_DAYS),
            "wma50": table_data(&wma, CHART_DAYS),
            "rsi14": table_data(&rsi, CHART_DAYS),
            "priceVolume": table_data(&prices, CHART_DAYS),
        });
        Ok(tool_output(&symbol, data, TECHNICAL_GUIDANCE))
    }

    fn name(&self) -> &'static str {
        "technical_analysis_daily"
    }

    fn description(&self) -> &'static str {
        "Perform technical analysis on the daily chart using moving averages \
         (20-day EMA, 50-day WMA), 14-day RSI and the last two weeks of price and volume."
    }

    fn input_schema(&self) -> Value {
        super::symbol_schema()
    }
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    symbol: String,
    #[serde(default)]
    days: Option<usize>,
}

/// End-of-day price and volume history
pub struct HistoricalPriceVolumeTool {
    market: Arc<MarketData>,
}

impl HistoricalPriceVolumeTool {
    pub fn new(market: Arc<MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for HistoricalPriceVolumeTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: HistoryParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let days = params
            .days
            .unwrap_or(DEFAULT_HISTORY_DAYS)
            .clamp(1, MAX_HISTORY_DAYS);

        let prices = self.market.historical_prices(&symbol, days).await?;
        Ok(tool_output(
            &symbol,
            table_data(&prices, days),
            "Daily open, high, low, close and volume, most recent first.",
        ))
    }

    fn name(&self) -> &'static str {
        "historical_price_volume"
    }

    fn description(&self) -> &'static str {
        "Get historical end-of-day price and volume data for a stock."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock ticker symbol (e.g., 'AAPL', 'MSFT')"
                },
                "days": {
                    "type": "integer",
                    "description": "Number of trading days, most recent first",
                    "default": DEFAULT_HISTORY_DAYS,
                    "minimum": 1,
                    "maximum": MAX_HISTORY_DAYS
                }
            },
            "required": ["symbol"]
        })
    }
}
