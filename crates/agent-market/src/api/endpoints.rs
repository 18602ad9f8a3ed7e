//! Endpoint catalogue of the financial data provider

use std::fmt;

/// Where the ticker symbol goes in the request URL
///
/// The provider is inconsistent: most endpoints take the symbol as the last
/// path segment, a few only accept it as a `symbol=` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolPlacement {
    /// `{endpoint}/{symbol}?apikey=...`
    Path,
    /// `{endpoint}?symbol={symbol}&apikey=...`
    Query,
}

impl SymbolPlacement {
    pub fn is_path_based(self) -> bool {
        self == Self::Path
    }
}

impl From<bool> for SymbolPlacement {
    fn from(path_based: bool) -> Self {
        if path_based { Self::Path } else { Self::Query }
    }
}

/// Remote endpoints used by the data-access operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CompanyProfile,
    DiscountedCashFlow,
    AnalystEstimates,
    EarningCallTranscript,
    BatchEarningCallTranscript,
    EarningsSurprises,
    IncomeStatement,
    BalanceSheetStatement,
    CashFlowStatement,
    PriceTargetSummary,
    HistoricalPriceEod,
    TechnicalIndicatorDaily,
    SocialSentiment,
}

impl Endpoint {
    pub const ALL: [Endpoint; 13] = [
        Endpoint::CompanyProfile,
        Endpoint::DiscountedCashFlow,
        Endpoint::AnalystEstimates,
        Endpoint::EarningCallTranscript,
        Endpoint::BatchEarningCallTranscript,
        Endpoint::EarningsSurprises,
        Endpoint::IncomeStatement,
        Endpoint::BalanceSheetStatement,
        Endpoint::CashFlowStatement,
        Endpoint::PriceTargetSummary,
        Endpoint::HistoricalPriceEod,
        Endpoint::TechnicalIndicatorDaily,
        Endpoint::SocialSentiment,
    ];

    /// Path relative to the API base URL
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::CompanyProfile => "v3/profile",
            Endpoint::DiscountedCashFlow => "v3/discounted-cash-flow",
            Endpoint::AnalystEstimates => "v3/analyst-estimates",
            Endpoint::EarningCallTranscript => "v3/earning_call_transcript",
            Endpoint::BatchEarningCallTranscript => "v4/batch_earning_call_transcript",
            Endpoint::EarningsSurprises => "v3/earnings-surprises",
            Endpoint::IncomeStatement => "v3/income-statement",
            Endpoint::BalanceSheetStatement => "v3/balance-sheet-statement",
            Endpoint::CashFlowStatement => "v3/cash-flow-statement",
            Endpoint::PriceTargetSummary => "v4/price-target-summary",
            Endpoint::HistoricalPriceEod => "v3/historical-price-full",
            Endpoint::TechnicalIndicatorDaily => "v3/technical_indicator/1day",
            Endpoint::SocialSentiment => "v4/historical/social-sentiment",
        }
    }

    pub const fn symbol_placement(self) -> SymbolPlacement {
        match self {
            Endpoint::PriceTargetSummary | Endpoint::SocialSentiment => SymbolPlacement::Query,
            _ => SymbolPlacement::Path,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_are_unique() {
        let paths: HashSet<_> = Endpoint::ALL.iter().map(|e| e.path()).collect();
        assert_eq!(paths.len(), Endpoint::ALL.len());
    }

    #[test]
    fn test_query_based_endpoints() {
        let query_based: Vec<_> = Endpoint::ALL
            .iter()
            .filter(|e| !e.symbol_placement().is_path_based())
            .collect();
        assert_eq!(
            query_based,
            vec![&Endpoint::PriceTargetSummary, &Endpoint::SocialSentiment]
        );
    }

    #[test]
    fn test_cash_flow_statement_path() {
        assert_eq!(Endpoint::CashFlowStatement.path(), "v3/cash-flow-statement");
        assert_ne!(
            Endpoint::CashFlowStatement.path(),
            Endpoint::EarningsSurprises.path()
        );
    }
}
