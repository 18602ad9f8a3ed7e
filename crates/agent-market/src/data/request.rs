//! Typed descriptors of the data-access operations

use crate::api::types::{IndicatorKind, Period};
use crate::cache::{KeyArg, KeyDescriptor, VolatilityClass};
use crate::valuation::DcfAssumptions;

/// One data-access call, minus the symbol
///
/// Every field that changes the result is part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataRequest {
    CompanyProfile,
    DiscountedCashFlow,
    IncomeStatement { period: Period, limit: usize },
    CashFlowStatement { period: Period, limit: usize },
    BalanceSheet { period: Period, limit: usize },
    AnalystEstimates { period: Period, limit: usize },
    EarningsSurprises,
    PriceTargetSummary,
    HistoricalPrices { days: usize },
    TechnicalIndicator { kind: IndicatorKind, period: u32 },
    SocialSentiment,
    EarningsTranscript { year: Option<i32>, quarter: Option<u8> },
    BatchTranscripts { year: i32 },
    CurrentPrice,
    CashFlowGrowthRates,
    IntrinsicValue { assumptions: DcfAssumptions },
    EstimateIntrinsicValue,
    PiotroskiScore,
}

impl DataRequest {
    /// TTL class of the result
    pub fn volatility(&self) -> VolatilityClass {
        match self {
            DataRequest::HistoricalPrices { .. }
            | DataRequest::TechnicalIndicator { .. }
            | DataRequest::SocialSentiment
            | DataRequest::CurrentPrice => VolatilityClass::Hourly,

            DataRequest::CompanyProfile
            | DataRequest::DiscountedCashFlow
            | DataRequest::PriceTargetSummary
            | DataRequest::EstimateIntrinsicValue => VolatilityClass::Daily,

            DataRequest::IncomeStatement { .. }
            | DataRequest::CashFlowStatement { .. }
            | DataRequest::BalanceSheet { .. }
            | DataRequest::AnalystEstimates { .. }
            | DataRequest::EarningsSurprises
            | DataRequest::CashFlowGrowthRates
            | DataRequest::IntrinsicValue { .. }
            | DataRequest::PiotroskiScore => VolatilityClass::Weekly,

            // "Latest" moves when a new call is published
            DataRequest::EarningsTranscript { year: None, .. } => VolatilityClass::Daily,
            DataRequest::EarningsTranscript { .. } | DataRequest::BatchTranscripts { .. } => {
                VolatilityClass::Monthly
            }
        }
    }
}

impl KeyDescriptor for DataRequest {
    fn operation(&self) -> &'static str {
        match self {
            DataRequest::CompanyProfile => "company_profile",
            DataRequest::DiscountedCashFlow => "discounted_cash_flow",
            DataRequest::IncomeStatement { .. } => "income_statement",
            DataRequest::CashFlowStatement { .. } => "cash_flow_statement",
            DataRequest::BalanceSheet { .. } => "balance_sheet",
            DataRequest::AnalystEstimates { .. } => "analyst_estimates",
            DataRequest::EarningsSurprises => "earnings_surprises",
            DataRequest::PriceTargetSummary => "price_target_summary",
            DataRequest::HistoricalPrices { .. } => "historical_prices",
            DataRequest::TechnicalIndicator { .. } => "technical_indicator",
            DataRequest::SocialSentiment => "social_sentiment",
            DataRequest::EarningsTranscript { .. } => "earnings_transcript",
            DataRequest::BatchTranscripts { .. } => "batch_earnings_transcripts",
            DataRequest::CurrentPrice => "current_price",
            DataRequest::CashFlowGrowthRates => "cash_flow_growth_rates",
            DataRequest::IntrinsicValue { .. } => "intrinsic_value",
            DataRequest::EstimateIntrinsicValue => "estimate_intrinsic_value",
            DataRequest::PiotroskiScore => "piotroski_score",
        }
    }

    fn positional_args(&self) -> Vec<KeyArg> {
        match *self {
            DataRequest::CompanyProfile
            | DataRequest::DiscountedCashFlow
            | DataRequest::EarningsSurprises
            | DataRequest::PriceTargetSummary
            | DataRequest::SocialSentiment
            | DataRequest::EarningsTranscript { .. }
            | DataRequest::CurrentPrice
            | DataRequest::CashFlowGrowthRates
            | DataRequest::EstimateIntrinsicValue
            | DataRequest::PiotroskiScore => Vec::new(),

            DataRequest::IncomeStatement { period, limit }
            | DataRequest::CashFlowStatement { period, limit }
            | DataRequest::BalanceSheet { period, limit }
            | DataRequest::AnalystEstimates { period, limit } => vec![period.into(), limit.into()],

            DataRequest::HistoricalPrices { days } => vec![days.into()],
            DataRequest::TechnicalIndicator { kind, period } => vec![kind.into(), period.into()],
            DataRequest::BatchTranscripts { year } => vec![year.into()],
            DataRequest::IntrinsicValue {
                assumptions:
                    DcfAssumptions {
                        growth_rate,
                        perpetual_growth_rate,
                        wacc,
                        periods,
                    },
            } => vec![
                growth_rate.into(),
                perpetual_growth_rate.into(),
                wacc.into(),
                periods.into(),
            ],
        }
    }

    fn keyword_args(&self) -> Vec<(&'static str, KeyArg)> {
        match *self {
            DataRequest::EarningsTranscript { year, quarter } => {
                vec![("year", year.into()), ("quarter", quarter.into())]
            }
            _ => Vec::new(),
        }
    }
}
