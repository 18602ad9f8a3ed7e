//! Response and request types of the financial data provider

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One JSON object of a statement-like response
pub type Record = serde_json::Map<String, Value>;

/// Reporting period granularity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Annual,
    Quarter,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Annual => "annual",
            Period::Quarter => "quarter",
        }
    }

    pub fn from_quarterly(quarterly: bool) -> Self {
        if quarterly { Period::Quarter } else { Period::Annual }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily technical indicators offered by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Wma,
    Dema,
    Tema,
    Williams,
    Rsi,
    Adx,
    #[serde(rename = "standardDeviation")]
    StandardDeviation,
}

impl IndicatorKind {
    /// Value of the `type` query parameter, also the response field name
    pub fn as_str(self) -> &'static str {
        match self {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Ema => "ema",
            IndicatorKind::Wma => "wma",
            IndicatorKind::Dema => "dema",
            IndicatorKind::Tema => "tema",
            IndicatorKind::Williams => "williams",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Adx => "adx",
            IndicatorKind::StandardDeviation => "standardDeviation",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(Value::String(s.to_string()))
            .map_err(|_| MarketError::InvalidParameter(format!("unknown indicator type: {s}")))
    }
}

/// Company profile, the first element of the profile response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub symbol: String,
    pub company_name: Option<String>,
    pub price: Option<f64>,
    pub beta: Option<f64>,
    pub vol_avg: Option<f64>,
    pub mkt_cap: Option<f64>,
    pub last_div: Option<f64>,
    pub range: Option<String>,
    pub currency: Option<String>,
    pub exchange_short_name: Option<String>,
    pub industry: Option<String>,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub ceo: Option<String>,
    pub full_time_employees: Option<String>,
    pub website: Option<String>,
    pub ipo_date: Option<String>,
    pub description: Option<String>,
}

/// Provider-computed discounted cash-flow value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub symbol: String,
    #[serde(default)]
    pub date: Option<String>,
    pub dcf: f64,
    #[serde(rename = "Stock Price", default)]
    pub stock_price: Option<f64>,
}

/// End-of-day price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBar {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub adj_close: Option<f64>,
    pub volume: f64,
    #[serde(default)]
    pub change_percent: Option<f64>,
}

/// Historical end-of-day prices, most recent first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPrices {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub historical: Vec<PriceBar>,
}

/// One day of a technical indicator series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub value: Option<f64>,
}

impl IndicatorPoint {
    /// Decode a record whose indicator value lives under the field named after `kind`
    pub fn from_record(record: &Record, kind: IndicatorKind) -> Option<Self> {
        let num = |field: &str| record.get(field).and_then(Value::as_f64);
        Some(Self {
            date: record.get("date")?.as_str()?.to_string(),
            open: num("open")?,
            high: num("high")?,
            low: num("low")?,
            close: num("close")?,
            volume: num("volume").unwrap_or_default(),
            value: num(kind.as_str()),
        })
    }
}

/// Earnings call transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub symbol: String,
    pub quarter: u8,
    pub year: i32,
    pub date: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indicator_kind_round_trip() {
        assert_eq!("rsi".parse::<IndicatorKind>().unwrap(), IndicatorKind::Rsi);
        assert_eq!(
            "standardDeviation".parse::<IndicatorKind>().unwrap(),
            IndicatorKind::StandardDeviation
        );
        assert!("macd".parse::<IndicatorKind>().is_err());
        assert_eq!(IndicatorKind::Wma.to_string(), "wma");
    }

    #[test]
    fn test_decode_profile() {
        let profile: CompanyProfile = serde_json::from_value(json!({
            "symbol": "ACME",
            "companyName": "Acme Corp",
            "price": 12.5,
            "mktCap": 1_000_000,
            "fullTimeEmployees": "120",
            "isEtf": false
        }))
        .unwrap();
        assert_eq!(profile.company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(profile.mkt_cap, Some(1_000_000.0));
        assert!(profile.sector.is_none());
    }

    #[test]
    fn test_decode_dcf() {
        let dcf: DcfValuation = serde_json::from_value(json!({
            "symbol": "ACME",
            "date": "2026-10-16",
            "dcf": 101.2,
            "Stock Price": 95.0
        }))
        .unwrap();
        assert_eq!(dcf.stock_price, Some(95.0));
    }

    #[test]
    fn test_indicator_point_from_record() {
        let record = json!({
            "date": "2026-10-16 00:00:00",
            "open": 10.0, "high": 11.0, "low": 9.5, "close": 10.5,
            "volume": 1000, "rsi": 55.5
        });
        let point =
            IndicatorPoint::from_record(record.as_object().unwrap(), IndicatorKind::Rsi).unwrap();
        assert_eq!(point.value, Some(55.5));

        let missing =
            IndicatorPoint::from_record(record.as_object().unwrap(), IndicatorKind::Ema).unwrap();
        assert_eq!(missing.value, None);
    }
}
