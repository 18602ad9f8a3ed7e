//! Read-through data-access operations
//!
//! Each operation builds a key from its [`DataRequest`], answers from the
//! cache when it can and otherwise fetches, normalizes into a [`Table`] or a
//! scalar, and stores the result with the TTL of its volatility class.
//! Fetch failures reach the caller unchanged and leave the cache untouched.

mod columns;
mod request;

pub use request::DataRequest;

use crate::api::FmpClient;
use crate::api::types::{
    HistoricalPrices, IndicatorKind, IndicatorPoint, Period, Record, Transcript,
};
use crate::cache::{CacheLayer, Cell, Table};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::valuation::{
    DcfAssumptions, DcfInputs, PiotroskiInputs, Scenario, average_recent_growth,
    intrinsic_value_per_share, piotroski_criteria, ttm_yoy_growth,
};
use chrono::{Datelike, Utc};
use futures::future::join_all;
use regex::Regex;
use serde::Serialize;
use std::future::Future;
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

static SYMBOL_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9^][A-Z0-9.\-=]{0,15}$"));

/// Quarters of cash-flow history behind the growth averages
const GROWTH_QUARTERS: usize = 28;

/// Growth windows: label and number of year-over-year observations
const GROWTH_WINDOWS: [(&str, usize); 3] = [("1y", 1), ("3y", 12), ("5y", 20)];

/// Trim and upper-case a ticker, rejecting anything that cannot be one
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let pattern = SYMBOL_PATTERN
        .as_ref()
        .map_err(|e| MarketError::ConfigError(e.to_string()))?;

    let symbol = symbol.trim().to_uppercase();
    if pattern.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(MarketError::InvalidSymbol(symbol))
    }
}

/// Market data behind a versioned cache
#[derive(Debug, Clone)]
pub struct MarketData {
    client: FmpClient,
    cache: CacheLayer,
}

impl MarketData {
    pub fn new(client: FmpClient, cache: CacheLayer) -> Self {
        Self { client, cache }
    }

    /// Build the client and connect the cache, degrading if the store is down
    pub async fn from_config(config: &MarketConfig) -> Result<Self> {
        config.validate()?;
        let client = FmpClient::from_config(config)?;
        let cache = CacheLayer::connect(&config.cache, config.ttl).await;
        Ok(Self::new(client, cache))
    }

    pub fn client(&self) -> &FmpClient {
        &self.client
    }

    pub fn cache(&self) -> &CacheLayer {
        &self.cache
    }

    async fn cached_table<F, Fut>(&self, symbol: &str, request: DataRequest, fetch: F) -> Result<Table>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Table>>,
    {
        let key = self.cache.key_for(symbol, &request);
        self.cache
            .table_or_fetch(&key, request.volatility(), fetch)
            .await
    }

    async fn cached_scalar<F, Fut>(&self, symbol: &str, request: DataRequest, fetch: F) -> Result<f64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<f64>>,
    {
        let key = self.cache.key_for(symbol, &request);
        self.cache
            .scalar_or_fetch(&key, request.volatility(), fetch)
            .await
    }

    /// Company profile, one row indexed by symbol
    pub async fn company_profile(&self, symbol: &str) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::CompanyProfile, || async {
            let profile = self.client.company_profile(&symbol).await?;
            let record = to_record(&profile)?;
            Ok(Table::from_records_all_columns(columns::SYMBOL, &[record]))
        })
        .await
    }

    /// Provider DCF value next to the stock price
    pub async fn discounted_cash_flow(&self, symbol: &str) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::DiscountedCashFlow, || async {
            let dcf = self.client.discounted_cash_flow(&symbol).await?;
            let mut table = Table::new(columns::SYMBOL, columns::DCF.iter().copied());
            table.push_row(
                dcf.symbol,
                vec![dcf.date.into(), dcf.dcf.into(), dcf.stock_price.into()],
            )?;
            Ok(table)
        })
        .await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn income_statement(&self, symbol: &str, period: Period, limit: usize) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        let request = DataRequest::IncomeStatement { period, limit };
        self.cached_table(&symbol, request, || async {
            let records = self.client.income_statement(&symbol, period, limit).await?;
            Ok(Table::from_records(columns::DATE, columns::INCOME_STATEMENT, &records))
        })
        .await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn cash_flow_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        let request = DataRequest::CashFlowStatement { period, limit };
        self.cached_table(&symbol, request, || async {
            let records = self
                .client
                .cash_flow_statement(&symbol, period, limit)
                .await?;
            Ok(Table::from_records(
                columns::DATE,
                columns::CASH_FLOW_STATEMENT,
                &records,
            ))
        })
        .await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn balance_sheet(&self, symbol: &str, period: Period, limit: usize) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        let request = DataRequest::BalanceSheet { period, limit };
        self.cached_table(&symbol, request, || async {
            let records = self
                .client
                .balance_sheet_statement(&symbol, period, limit)
                .await?;
            Ok(Table::from_records(columns::DATE, columns::BALANCE_SHEET, &records))
        })
        .await
    }

    pub async fn analyst_estimates(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        let request = DataRequest::AnalystEstimates { period, limit };
        self.cached_table(&symbol, request, || async {
            let records = self.client.analyst_estimates(&symbol, period, limit).await?;
            Ok(Table::from_records(
                columns::DATE,
                columns::ANALYST_ESTIMATES,
                &records,
            ))
        })
        .await
    }

    pub async fn earnings_surprises(&self, symbol: &str) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::EarningsSurprises, || async {
            let records = self.client.earnings_surprises(&symbol).await?;
            Ok(Table::from_records(
                columns::DATE,
                columns::EARNINGS_SURPRISES,
                &records,
            ))
        })
        .await
    }

    pub async fn price_target_summary(&self, symbol: &str) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::PriceTargetSummary, || async {
            let records = self.client.price_target_summary(&symbol).await?;
            Ok(Table::from_records(
                columns::SYMBOL,
                columns::PRICE_TARGET_SUMMARY,
                &records,
            ))
        })
        .await
    }

    /// End-of-day prices for the last `days` trading days, most recent first
    pub async fn historical_prices(&self, symbol: &str, days: usize) -> Result<Table> {
        if days == 0 {
            return Err(MarketError::InvalidParameter("days must be positive".to_string()));
        }
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::HistoricalPrices { days }, || async {
            let prices = self.client.historical_prices(&symbol, days).await?;
            price_table(&prices)
        })
        .await
    }

    /// Daily indicator series, the value in a column named after `kind`
    pub async fn technical_indicator(
        &self,
        symbol: &str,
        kind: IndicatorKind,
        period: u32,
    ) -> Result<Table> {
        if period == 0 {
            return Err(MarketError::InvalidParameter(
                "indicator period must be positive".to_string(),
            ));
        }
        let symbol = normalize_symbol(symbol)?;
        let request = DataRequest::TechnicalIndicator { kind, period };
        self.cached_table(&symbol, request, || async {
            let points = self.client.technical_indicator(&symbol, kind, period).await?;
            indicator_table(kind, &points)
        })
        .await
    }

    pub async fn social_sentiment(&self, symbol: &str) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::SocialSentiment, || async {
            let records = self.client.social_sentiment(&symbol).await?;
            Ok(Table::from_records(
                columns::DATE,
                columns::SOCIAL_SENTIMENT,
                &records,
            ))
        })
        .await
    }

    /// Transcript of one quarter, or the latest one when `year` is `None`
    ///
    /// `quarter` without `year` is ignored, as the provider ignores it.
    pub async fn earnings_transcript(
        &self,
        symbol: &str,
        year: Option<i32>,
        quarter: Option<u8>,
    ) -> Result<Table> {
        if let Some(q) = quarter {
            if !(1..=4).contains(&q) {
                return Err(MarketError::InvalidParameter(format!(
                    "quarter must be 1-4, got {q}"
                )));
            }
        }
        if let Some(year) = year {
            validate_year(year)?;
        }
        let symbol = normalize_symbol(symbol)?;
        let quarter = year.and(quarter);
        let request = DataRequest::EarningsTranscript { year, quarter };
        self.cached_table(&symbol, request, || async {
            let transcripts = self
                .client
                .earning_call_transcript(&symbol, year, quarter)
                .await?;
            transcript_table(&transcripts)
        })
        .await
    }

    /// Every transcript of the given years, each year cached on its own
    ///
    /// A year that fails to load is logged and left out.
    pub async fn batch_earnings_transcripts(&self, symbol: &str, years: &[i32]) -> Result<Table> {
        for &year in years {
            validate_year(year)?;
        }
        let symbol = normalize_symbol(symbol)?;
        let symbol = symbol.as_str();

        let fetches = years.iter().map(|&year| async move {
            let result = self
                .cached_table(symbol, DataRequest::BatchTranscripts { year }, || async {
                    let transcripts = self
                        .client
                        .batch_earning_call_transcripts(symbol, year)
                        .await?;
                    transcript_table(&transcripts)
                })
                .await;
            (year, result)
        });

        let mut combined = Table::new(columns::DATE, columns::TRANSCRIPT.iter().copied());
        for (year, result) in join_all(fetches).await {
            match result {
                Ok(table) => combined.append(table)?,
                Err(e) => warn!(symbol, year, error = %e, "Failed to get transcripts, skipping year"),
            }
        }
        Ok(combined)
    }

    /// Latest adjusted close
    pub async fn current_price(&self, symbol: &str) -> Result<f64> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_scalar(&symbol, DataRequest::CurrentPrice, || async {
            let prices = self.historical_prices(&symbol, 5).await?;
            latest_number(&prices, "adjClose")
                .or_else(|| latest_number(&prices, "close"))
                .ok_or_else(|| unavailable(&symbol, "no recent closing price"))
        })
        .await
    }

    /// Average year-over-year growth of trailing-twelve-month free cash flow
    ///
    /// Rows "1y", "3y" and "5y"; a window without usable observations is null.
    pub async fn cash_flow_growth_rates(&self, symbol: &str) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::CashFlowGrowthRates, || async {
            let statements = self
                .cash_flow_statement(&symbol, Period::Quarter, GROWTH_QUARTERS)
                .await?;
            let quarterly: Vec<Option<f64>> = statements
                .column("freeCashFlow")
                .unwrap_or_default()
                .into_iter()
                .map(Cell::as_f64)
                .collect();

            let growth = ttm_yoy_growth(&quarterly);
            if growth.is_empty() {
                return Err(unavailable(
                    &symbol,
                    &format!("{} quarters of free cash flow, need at least 8", quarterly.len()),
                ));
            }

            let mut table = Table::new("window", columns::GROWTH_RATES.iter().copied());
            for (label, points) in GROWTH_WINDOWS {
                let observations = growth.iter().rev().take(points).filter(|g| g.is_some()).count();
                table.push_row(
                    label,
                    vec![
                        average_recent_growth(&growth, points).into(),
                        Cell::Int(observations as i64),
                    ],
                )?;
            }
            debug!(symbol = %symbol, ?growth, "Computed free cash flow growth");
            Ok(table)
        })
        .await
    }

    /// Intrinsic value per share from a discounted free-cash-flow model
    pub async fn intrinsic_value(&self, symbol: &str, assumptions: DcfAssumptions) -> Result<f64> {
        assumptions.validate()?;
        let symbol = normalize_symbol(symbol)?;
        let request = DataRequest::IntrinsicValue { assumptions };
        self.cached_scalar(&symbol, request, || async {
            let inputs = self.dcf_inputs(&symbol).await?;
            intrinsic_value_per_share(&inputs, &assumptions)
        })
        .await
    }

    /// Low and high intrinsic value scenarios against the current price
    pub async fn estimate_intrinsic_value(&self, symbol: &str) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::EstimateIntrinsicValue, || async {
            let growth = self.cash_flow_growth_rates(&symbol).await?;
            let rates: Vec<f64> = growth
                .column("freeCashFlowGrowth")
                .unwrap_or_default()
                .into_iter()
                .filter_map(Cell::as_f64)
                .collect();
            let price = self.current_price(&symbol).await?;

            let mut table = Table::new("scenario", columns::INTRINSIC_ESTIMATE.iter().copied());
            for scenario in [Scenario::Low, Scenario::High] {
                let assumptions = scenario
                    .assumptions(&rates)
                    .ok_or_else(|| unavailable(&symbol, "no free cash flow growth rates"))?;
                let estimate = self.intrinsic_value(&symbol, assumptions).await?;
                let percent = (price != 0.0).then(|| estimate / price);

                table.push_row(
                    scenario.as_str(),
                    vec![
                        estimate.into(),
                        assumptions.growth_rate.into(),
                        assumptions.perpetual_growth_rate.into(),
                        assumptions.wacc.into(),
                        percent.into(),
                    ],
                )?;
            }
            Ok(table)
        })
        .await
    }

    /// Piotroski F-score criteria from the two latest annual statements
    ///
    /// One row per criterion scored 0 or 1, then a "Piotroski Score" total.
    pub async fn piotroski_score(&self, symbol: &str) -> Result<Table> {
        let symbol = normalize_symbol(symbol)?;
        self.cached_table(&symbol, DataRequest::PiotroskiScore, || async {
            let income = self.income_statement(&symbol, Period::Annual, 2).await?;
            let balance = self.balance_sheet(&symbol, Period::Annual, 2).await?;
            let cash_flow = self.cash_flow_statement(&symbol, Period::Annual, 2).await?;

            if income.len() < 2 || balance.len() < 2 || cash_flow.len() < 2 {
                return Err(unavailable(&symbol, "two annual periods of statements required"));
            }

            let inputs = |row: usize| PiotroskiInputs {
                net_income: number(&income, row, "netIncome"),
                operating_cash_flow: number(&cash_flow, row, "operatingCashFlow"),
                total_assets: number(&balance, row, "totalAssets"),
                long_term_debt: number(&balance, row, "longTermDebt"),
                current_assets: number(&balance, row, "totalCurrentAssets"),
                current_liabilities: number(&balance, row, "totalCurrentLiabilities"),
                shares_outstanding: number(&income, row, "weightedAverageShsOut"),
                revenue: number(&income, row, "revenue"),
                gross_profit: number(&income, row, "grossProfit"),
            };

            let criteria = piotroski_criteria(&inputs(0), &inputs(1));
            let total = criteria.iter().filter(|c| c.passed).count();

            let mut table = Table::new("criterion", columns::PIOTROSKI.iter().copied());
            for criterion in criteria {
                table.push_row(criterion.name, vec![Cell::Int(i64::from(criterion.passed))])?;
            }
            table.push_row("Piotroski Score", vec![Cell::Int(total as i64)])?;
            Ok(table)
        })
        .await
    }

    async fn dcf_inputs(&self, symbol: &str) -> Result<DcfInputs> {
        let cash_flow = self.cash_flow_statement(symbol, Period::Annual, 1).await?;
        let balance = self.balance_sheet(symbol, Period::Annual, 1).await?;
        let income = self.income_statement(symbol, Period::Annual, 1).await?;

        let require = |table: &Table, column: &str| {
            latest_number(table, column)
                .ok_or_else(|| unavailable(symbol, &format!("latest annual {column} missing")))
        };

        Ok(DcfInputs {
            free_cash_flow: require(&cash_flow, "freeCashFlow")?,
            net_debt: require(&balance, "netDebt")?,
            shares_outstanding: require(&income, "weightedAverageShsOutDil")?,
        })
    }
}

/// JSON object form of a typed response
fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(record)) => Ok(record),
        Ok(other) => Err(MarketError::SerializationError(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(MarketError::SerializationError(e.to_string())),
    }
}

/// Earliest fiscal year with transcripts on file
const FIRST_TRANSCRIPT_YEAR: i32 = 2000;

/// Fiscal years may run one calendar year ahead
fn validate_year(year: i32) -> Result<()> {
    let latest = Utc::now().year() + 1;
    if (FIRST_TRANSCRIPT_YEAR..=latest).contains(&year) {
        Ok(())
    } else {
        Err(MarketError::InvalidParameter(format!(
            "year must be {FIRST_TRANSCRIPT_YEAR}-{latest}, got {year}"
        )))
    }
}

fn unavailable(symbol: &str, reason: &str) -> MarketError {
    MarketError::DataUnavailable {
        symbol: symbol.to_string(),
        reason: reason.to_string(),
    }
}

fn latest_number(table: &Table, column: &str) -> Option<f64> {
    table.get(0, column).and_then(Cell::as_f64)
}

/// Figure at a row, zero when missing
fn number(table: &Table, row: usize, column: &str) -> f64 {
    table.get(row, column).and_then(Cell::as_f64).unwrap_or_default()
}

fn price_table(prices: &HistoricalPrices) -> Result<Table> {
    let mut table = Table::new(columns::DATE, columns::HISTORICAL_PRICES.iter().copied());
    for bar in &prices.historical {
        table.push_row(
            bar.date.clone(),
            vec![
                bar.open.into(),
                bar.high.into(),
                bar.low.into(),
                bar.close.into(),
                bar.adj_close.into(),
                bar.volume.into(),
                bar.change_percent.into(),
            ],
        )?;
    }
    Ok(table)
}

fn indicator_table(kind: IndicatorKind, points: &[IndicatorPoint]) -> Result<Table> {
    let names = columns::INDICATOR_PRICES
        .iter()
        .copied()
        .chain(std::iter::once(kind.as_str()));
    let mut table = Table::new(columns::DATE, names);
    for point in points {
        table.push_row(
            point.date.clone(),
            vec![
                point.open.into(),
                point.high.into(),
                point.low.into(),
                point.close.into(),
                point.volume.into(),
                point.value.into(),
            ],
        )?;
    }
    Ok(table)
}

fn transcript_table(transcripts: &[Transcript]) -> Result<Table> {
    let mut table = Table::new(columns::DATE, columns::TRANSCRIPT.iter().copied());
    for t in transcripts {
        table.push_row(
            t.date.clone(),
            vec![
                t.symbol.as_str().into(),
                Cell::Int(i64::from(t.year)),
                Cell::Int(i64::from(t.quarter)),
                t.content.as_str().into(),
            ],
        )?;
    }
    Ok(table)
}
