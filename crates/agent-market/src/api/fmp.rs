//! Financial Modeling Prep API client

use crate::api::endpoints::{Endpoint, SymbolPlacement};
use crate::api::types::{
    CompanyProfile, DcfValuation, HistoricalPrices, IndicatorKind, IndicatorPoint, Period, Record,
    Transcript,
};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Financial Modeling Prep API client
///
/// Transport and HTTP failures are returned as-is; retrying is left to the
/// caller.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    base_url: String,
    api_key: String,
    rate_limiter: Option<SharedRateLimiter>,
}

impl FmpClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - provider API key, must not be blank
    /// * `base_url` - API root, e.g. `https://financialmodelingprep.com/api`
    /// * `timeout` - per-request timeout
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MarketError::ConfigError(
                "FMP_API_KEY env variable not set!".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            rate_limiter: None,
        })
    }

    /// Create from a validated configuration
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        let client = Self::new(
            &config.fmp_api_key,
            &config.fmp_base_url,
            config.request_timeout,
        )?;

        Ok(match config.rate_limit_per_minute {
            Some(limit) => client.with_rate_limit(limit),
            None => client,
        })
    }

    /// Limit outbound requests per minute
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        if let Some(limit) = NonZeroU32::new(per_minute) {
            self.rate_limiter = Some(Arc::new(RateLimiter::direct(Quota::per_minute(limit))));
        }
        self
    }

    /// Build the request URL for an endpoint
    ///
    /// Path-based: `{base}/{endpoint}/{symbol}?apikey=..&params`.
    /// Query-based: `{base}/{endpoint}?symbol={symbol}&apikey=..&params`.
    pub fn build_url(
        &self,
        endpoint: &str,
        symbol: &str,
        placement: SymbolPlacement,
        params: &[(&str, String)],
    ) -> Result<Url> {
        let endpoint = endpoint.trim_matches('/');
        if endpoint.is_empty() {
            return Err(MarketError::InvalidParameter("endpoint".to_string()));
        }
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(MarketError::InvalidSymbol(symbol.to_string()));
        }

        let base = format!("{}/{endpoint}", self.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .map_err(|e| MarketError::ConfigError(format!("invalid URL {base}: {e}")))?;

        if placement.is_path_based() {
            url.path_segments_mut()
                .map_err(|()| MarketError::ConfigError(format!("URL cannot be a base: {base}")))?
                .push(symbol);
        }

        {
            let mut query = url.query_pairs_mut();
            if !placement.is_path_based() {
                query.append_pair("symbol", symbol);
            }
            query.append_pair("apikey", &self.api_key);
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }

        debug!(url = %redact(&url), params = ?params, "Built request URL");
        Ok(url)
    }

    /// Issue a GET and return the parsed JSON body
    pub async fn fetch(
        &self,
        endpoint: &str,
        symbol: &str,
        placement: SymbolPlacement,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let url = self.build_url(endpoint, symbol, placement, params)?;
        self.get_json(endpoint, url).await
    }

    /// Fetch a catalogued endpoint using its own symbol placement
    pub async fn fetch_endpoint(
        &self,
        endpoint: Endpoint,
        symbol: &str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        self.fetch(endpoint.path(), symbol, endpoint.symbol_placement(), params)
            .await
    }

    async fn get_json(&self, endpoint: &str, url: Url) -> Result<Value> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let redacted = redact(&url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let err = MarketError::from(e);
                debug!(url = %redacted, timeout = err.is_timeout(), error = %err, "Request failed");
                return Err(err);
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(url = %redacted, %status, "Request failed");
            return Err(MarketError::HttpStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let data: Value = response.json().await?;
        debug!(url = %redacted, response = %data, "GET");

        // The provider reports some failures (bad key, plan limits) with a 200
        if let Some(message) = data.get("Error Message").and_then(Value::as_str) {
            return Err(MarketError::UnexpectedResponse {
                endpoint: endpoint.to_string(),
                reason: message.to_string(),
            });
        }

        Ok(data)
    }

    async fn fetch_as<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        symbol: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let data = self.fetch_endpoint(endpoint, symbol, params).await?;
        decode(endpoint, data)
    }

    async fn fetch_first<T: DeserializeOwned>(&self, endpoint: Endpoint, symbol: &str) -> Result<T> {
        let mut items: Vec<T> = self.fetch_as(endpoint, symbol, &[]).await?;
        if items.is_empty() {
            return Err(MarketError::InvalidSymbol(symbol.to_string()));
        }
        Ok(items.swap_remove(0))
    }

    /// Get the company profile
    pub async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        self.fetch_first(Endpoint::CompanyProfile, symbol).await
    }

    /// Get the provider's own discounted cash-flow valuation
    pub async fn discounted_cash_flow(&self, symbol: &str) -> Result<DcfValuation> {
        self.fetch_first(Endpoint::DiscountedCashFlow, symbol).await
    }

    /// Get income statements, most recent first
    pub async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<Record>> {
        self.fetch_as(Endpoint::IncomeStatement, symbol, &statement_params(period, limit))
            .await
    }

    /// Get balance sheet statements, most recent first
    pub async fn balance_sheet_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<Record>> {
        self.fetch_as(
            Endpoint::BalanceSheetStatement,
            symbol,
            &statement_params(period, limit),
        )
        .await
    }

    /// Get cash-flow statements, most recent first
    pub async fn cash_flow_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<Record>> {
        self.fetch_as(Endpoint::CashFlowStatement, symbol, &statement_params(period, limit))
            .await
    }

    /// Get analyst estimates for upcoming periods
    pub async fn analyst_estimates(
        &self,
        symbol: &str,
        period: Period,
        limit: usize,
    ) -> Result<Vec<Record>> {
        self.fetch_as(Endpoint::AnalystEstimates, symbol, &statement_params(period, limit))
            .await
    }

    /// Get actual vs. estimated EPS per reporting date
    pub async fn earnings_surprises(&self, symbol: &str) -> Result<Vec<Record>> {
        self.fetch_as(Endpoint::EarningsSurprises, symbol, &[]).await
    }

    /// Get the analyst price-target summary
    pub async fn price_target_summary(&self, symbol: &str) -> Result<Vec<Record>> {
        self.fetch_as(Endpoint::PriceTargetSummary, symbol, &[]).await
    }

    /// Get daily social sentiment, most recent first
    pub async fn social_sentiment(&self, symbol: &str) -> Result<Vec<Record>> {
        self.fetch_as(Endpoint::SocialSentiment, symbol, &[]).await
    }

    /// Get end-of-day prices for the last `days` trading days
    pub async fn historical_prices(&self, symbol: &str, days: usize) -> Result<HistoricalPrices> {
        let data = self
            .fetch_endpoint(
                Endpoint::HistoricalPriceEod,
                symbol,
                &[("timeseries", days.to_string())],
            )
            .await?;

        // Unknown symbols come back as `{}`
        if data.as_object().is_some_and(serde_json::Map::is_empty) {
            return Ok(HistoricalPrices {
                symbol: symbol.to_string(),
                historical: Vec::new(),
            });
        }

        let mut prices: HistoricalPrices = decode(Endpoint::HistoricalPriceEod, data)?;
        prices.historical.truncate(days);
        Ok(prices)
    }

    /// Get a daily technical indicator series, most recent first
    pub async fn technical_indicator(
        &self,
        symbol: &str,
        kind: IndicatorKind,
        period: u32,
    ) -> Result<Vec<IndicatorPoint>> {
        let records: Vec<Record> = self
            .fetch_as(
                Endpoint::TechnicalIndicatorDaily,
                symbol,
                &[("type", kind.as_str().to_string()), ("period", period.to_string())],
            )
            .await?;

        records
            .iter()
            .map(|r| {
                IndicatorPoint::from_record(r, kind).ok_or_else(|| MarketError::UnexpectedResponse {
                    endpoint: Endpoint::TechnicalIndicatorDaily.to_string(),
                    reason: "indicator row without date or prices".to_string(),
                })
            })
            .collect()
    }

    /// Get the earnings call transcript for a quarter, or the latest one
    ///
    /// `quarter` is only sent together with `year`.
    pub async fn earning_call_transcript(
        &self,
        symbol: &str,
        year: Option<i32>,
        quarter: Option<u8>,
    ) -> Result<Vec<Transcript>> {
        let mut params = Vec::new();
        if let Some(year) = year {
            params.push(("year", year.to_string()));
            if let Some(quarter) = quarter {
                params.push(("quarter", quarter.to_string()));
            }
        }
        self.fetch_as(Endpoint::EarningCallTranscript, symbol, &params)
            .await
    }

    /// Get every transcript published for a year
    pub async fn batch_earning_call_transcripts(
        &self,
        symbol: &str,
        year: i32,
    ) -> Result<Vec<Transcript>> {
        self.fetch_as(
            Endpoint::BatchEarningCallTranscript,
            symbol,
            &[("year", year.to_string())],
        )
        .await
    }
}

fn statement_params(period: Period, limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("period", period.as_str().to_string()),
        ("limit", limit.to_string()),
    ]
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| MarketError::UnexpectedResponse {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Hide the API key before a URL reaches the logs
fn redact(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(base_url: &str) -> FmpClient {
        FmpClient::new("test_key", base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        // Nothing listens on port 1
        let client = FmpClient::new("secret_key", "http://127.0.0.1:1/api", Duration::from_secs(2))
            .unwrap();
        let err = client.company_profile("ACME").await.unwrap_err();

        assert!(matches!(err, MarketError::NetworkError(_)));
        assert!(err.is_remote());
        assert!(!err.to_string().contains("secret_key"));
        assert!(!format!("{err:?}").contains("secret_key"));

        let agent_err: agent_core::Error = err.into();
        assert!(!agent_err.to_string().contains("secret_key"));
    }

    #[test]
    fn test_client_requires_api_key() {
        let err = FmpClient::new("  ", "https://example.com/api", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, MarketError::ConfigError(_)));
    }

    #[test]
    fn test_url_shape_depends_on_placement() {
        let client = client("https://financialmodelingprep.com/api");

        let path = client
            .build_url("v3/profile", "ACME", SymbolPlacement::Path, &[])
            .unwrap();
        assert_eq!(
            path.as_str(),
            "https://financialmodelingprep.com/api/v3/profile/ACME?apikey=test_key"
        );

        let query = client
            .build_url("v3/profile", "ACME", SymbolPlacement::Query, &[])
            .unwrap();
        assert_eq!(
            query.as_str(),
            "https://financialmodelingprep.com/api/v3/profile?symbol=ACME&apikey=test_key"
        );
    }

    #[test]
    fn test_url_includes_params_after_key() {
        let client = client("https://financialmodelingprep.com/api/");
        let url = client
            .build_url(
                Endpoint::PriceTargetSummary.path(),
                "ACME",
                Endpoint::PriceTargetSummary.symbol_placement(),
                &[("limit", "10".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://financialmodelingprep.com/api/v4/price-target-summary?symbol=ACME&apikey=test_key&limit=10"
        );
    }

    #[test]
    fn test_url_rejects_blank_inputs() {
        let client = client("https://financialmodelingprep.com/api");
        assert!(matches!(
            client.build_url("", "ACME", SymbolPlacement::Path, &[]),
            Err(MarketError::InvalidParameter(_))
        ));
        assert!(matches!(
            client.build_url("v3/profile", " ", SymbolPlacement::Path, &[]),
            Err(MarketError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn test_redact_hides_key() {
        let url = Url::parse("https://x.test/v3/profile/ACME?apikey=secret&limit=1").unwrap();
        let redacted = redact(&url);
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("limit=1"));
    }

    #[tokio::test]
    async fn test_http_error_is_remote_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/profile/ACME")
            .match_query(Matcher::UrlEncoded("apikey".into(), "test_key".into()))
            .with_status(500)
            .create_async()
            .await;

        let err = client(&server.url()).company_profile("ACME").await.unwrap_err();
        assert!(err.is_remote());
        assert!(matches!(err, MarketError::HttpStatus { status: 500, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_based_endpoint_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v4/price-target-summary")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "ACME".into()),
                Matcher::UrlEncoded("apikey".into(), "test_key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([{"symbol": "ACME", "lastMonth": 3}]).to_string())
            .create_async()
            .await;

        let records = client(&server.url())
            .price_target_summary("ACME")
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["lastMonth"], 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_message_body_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/income-statement/ACME")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"Error Message": "Invalid API KEY."}).to_string())
            .create_async()
            .await;

        let err = client(&server.url())
            .income_statement("ACME", Period::Annual, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::UnexpectedResponse { reason, .. } if reason.contains("Invalid API KEY")));
    }

    #[tokio::test]
    async fn test_empty_profile_is_invalid_symbol() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/profile/NOPE")
            .match_query(Matcher::Any)
            .with_body("[]")
            .create_async()
            .await;

        let err = client(&server.url()).company_profile("NOPE").await.unwrap_err();
        assert!(matches!(err, MarketError::InvalidSymbol(s) if s == "NOPE"));
    }

    #[tokio::test]
    async fn test_transcript_quarter_requires_year() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/earning_call_transcript/ACME")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("apikey".into(), "test_key".into()),
                Matcher::UrlEncoded("year".into(), "2025".into()),
                Matcher::UrlEncoded("quarter".into(), "2".into()),
            ]))
            .with_body(
                json!([{
                    "symbol": "ACME", "quarter": 2, "year": 2025,
                    "date": "2025-07-30 17:00:00", "content": "Good afternoon."
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let transcripts = client(&server.url())
            .earning_call_transcript("ACME", Some(2025), Some(2))
            .await
            .unwrap();
        assert_eq!(transcripts[0].quarter, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_historical_prices_unknown_symbol() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/historical-price-full/NOPE")
            .match_query(Matcher::Any)
            .with_body("{}")
            .create_async()
            .await;

        let prices = client(&server.url()).historical_prices("NOPE", 30).await.unwrap();
        assert!(prices.historical.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires FMP_API_KEY and network access
    async fn test_live_company_profile() {
        let config = MarketConfig::from_env().unwrap();
        let profile = FmpClient::from_config(&config)
            .unwrap()
            .company_profile("AAPL")
            .await
            .unwrap();
        assert_eq!(profile.symbol, "AAPL");
    }
}
