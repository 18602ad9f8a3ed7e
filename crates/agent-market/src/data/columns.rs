//! Fixed column sets of the tabular results
//!
//! Field names are the provider's. Missing fields become nulls, extra
//! fields are dropped, so cached and fresh tables always share a shape.

pub const DATE: &str = "date";
pub const SYMBOL: &str = "symbol";

pub const INCOME_STATEMENT: &[&str] = &[
    "period",
    "calendarYear",
    "reportedCurrency",
    "revenue",
    "costOfRevenue",
    "grossProfit",
    "grossProfitRatio",
    "researchAndDevelopmentExpenses",
    "sellingGeneralAndAdministrativeExpenses",
    "operatingExpenses",
    "ebitda",
    "ebitdaratio",
    "operatingIncome",
    "operatingIncomeRatio",
    "interestExpense",
    "incomeBeforeTax",
    "incomeTaxExpense",
    "netIncome",
    "netIncomeRatio",
    "eps",
    "epsdiluted",
    "weightedAverageShsOut",
    "weightedAverageShsOutDil",
];

pub const CASH_FLOW_STATEMENT: &[&str] = &[
    "period",
    "calendarYear",
    "reportedCurrency",
    "netIncome",
    "depreciationAndAmortization",
    "stockBasedCompensation",
    "changeInWorkingCapital",
    "netCashProvidedByOperatingActivities",
    "investmentsInPropertyPlantAndEquipment",
    "acquisitionsNet",
    "netCashUsedForInvestingActivites",
    "debtRepayment",
    "commonStockRepurchased",
    "dividendsPaid",
    "netCashUsedProvidedByFinancingActivities",
    "netChangeInCash",
    "operatingCashFlow",
    "capitalExpenditure",
    "freeCashFlow",
];

pub const BALANCE_SHEET: &[&str] = &[
    "period",
    "calendarYear",
    "reportedCurrency",
    "cashAndCashEquivalents",
    "totalCurrentAssets",
    "totalAssets",
    "totalCurrentLiabilities",
    "shortTermDebt",
    "longTermDebt",
    "totalDebt",
    "totalLiabilities",
    "totalStockholdersEquity",
    "netDebt",
];

pub const ANALYST_ESTIMATES: &[&str] = &[
    "estimatedRevenueLow",
    "estimatedRevenueHigh",
    "estimatedRevenueAvg",
    "estimatedEbitdaAvg",
    "estimatedNetIncomeAvg",
    "estimatedEpsLow",
    "estimatedEpsHigh",
    "estimatedEpsAvg",
    "numberAnalystEstimatedRevenue",
    "numberAnalystsEstimatedEps",
];

pub const EARNINGS_SURPRISES: &[&str] = &["actualEarningResult", "estimatedEarning"];

/// Indexed by symbol
pub const PRICE_TARGET_SUMMARY: &[&str] = &[
    "lastMonth",
    "lastMonthAvgPriceTarget",
    "lastQuarter",
    "lastQuarterAvgPriceTarget",
    "lastYear",
    "lastYearAvgPriceTarget",
    "allTime",
    "allTimeAvgPriceTarget",
    "publishers",
];

pub const SOCIAL_SENTIMENT: &[&str] = &[
    "stocktwitsPosts",
    "twitterPosts",
    "stocktwitsComments",
    "twitterComments",
    "stocktwitsLikes",
    "twitterLikes",
    "stocktwitsImpressions",
    "twitterImpressions",
    "stocktwitsSentiment",
    "twitterSentiment",
];

pub const HISTORICAL_PRICES: &[&str] =
    &["open", "high", "low", "close", "adjClose", "volume", "changePercent"];

/// Followed by one column named after the indicator
pub const INDICATOR_PRICES: &[&str] = &["open", "high", "low", "close", "volume"];

pub const TRANSCRIPT: &[&str] = &["symbol", "year", "quarter", "content"];

pub const DCF: &[&str] = &["date", "dcf", "stockPrice"];

/// Indexed by window ("1y", "3y", "5y")
pub const GROWTH_RATES: &[&str] = &["freeCashFlowGrowth", "observations"];

/// Indexed by scenario ("low", "high")
pub const INTRINSIC_ESTIMATE: &[&str] = &[
    "estimate",
    "growthRate",
    "perpetualGrowthRate",
    "wacc",
    "percentOfCurrentPrice",
];

/// Indexed by criterion
pub const PIOTROSKI: &[&str] = &["score"];
