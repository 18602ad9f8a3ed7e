//! Valuation models over statement figures
//!
//! Pure functions, no I/O. Statement series are ordered most recent first,
//! the order the provider returns them in.

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};

/// Inputs of a discounted free-cash-flow model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfAssumptions {
    /// Annual free-cash-flow growth over the projection
    pub growth_rate: f64,
    /// Growth after the projection, used for the terminal value
    pub perpetual_growth_rate: f64,
    /// Discount rate
    pub wacc: f64,
    /// Projection length in years
    pub periods: u32,
}

impl Default for DcfAssumptions {
    fn default() -> Self {
        Self {
            growth_rate: 0.11,
            perpetual_growth_rate: 0.03,
            wacc: 0.08,
            periods: 10,
        }
    }
}

impl DcfAssumptions {
    pub fn validate(&self) -> Result<()> {
        let rates = [self.growth_rate, self.perpetual_growth_rate, self.wacc];
        if rates.iter().any(|r| !r.is_finite()) {
            return Err(MarketError::InvalidParameter(
                "DCF rates must be finite numbers".to_string(),
            ));
        }
        if self.wacc <= self.perpetual_growth_rate {
            return Err(MarketError::InvalidParameter(format!(
                "wacc ({}) must exceed the perpetual growth rate ({})",
                self.wacc, self.perpetual_growth_rate
            )));
        }
        if self.periods == 0 || self.periods > 50 {
            return Err(MarketError::InvalidParameter(format!(
                "periods must be between 1 and 50, got {}",
                self.periods
            )));
        }
        Ok(())
    }
}

/// Company figures the DCF model needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcfInputs {
    pub free_cash_flow: f64,
    pub net_debt: f64,
    pub shares_outstanding: f64,
}

/// Intrinsic value per share, rounded to cents
///
/// Enterprise value is the present value of the projected free cash flows
/// plus a Gordon-growth terminal value; net debt is subtracted to get equity.
pub fn intrinsic_value_per_share(inputs: &DcfInputs, assumptions: &DcfAssumptions) -> Result<f64> {
    assumptions.validate()?;
    if inputs.shares_outstanding <= 0.0 {
        return Err(MarketError::InvalidParameter(
            "shares outstanding must be positive".to_string(),
        ));
    }

    let DcfAssumptions {
        growth_rate,
        perpetual_growth_rate,
        wacc,
        periods,
    } = *assumptions;

    let mut cash_flow = inputs.free_cash_flow;
    let mut discount = 1.0;
    let mut present_value = 0.0;
    for _ in 0..periods {
        cash_flow *= 1.0 + growth_rate;
        discount *= 1.0 + wacc;
        present_value += cash_flow / discount;
    }

    let terminal = cash_flow * (1.0 + perpetual_growth_rate) / (wacc - perpetual_growth_rate);
    let enterprise_value = present_value + terminal / discount;
    let equity_value = enterprise_value - inputs.net_debt;

    Ok(round_cents(equity_value / inputs.shares_outstanding))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Valuation scenario derived from observed growth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Low,
    High,
}

impl Scenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Low => "low",
            Scenario::High => "high",
        }
    }

    /// Assumptions for this scenario given the observed growth rates
    ///
    /// The low case takes the smallest observed growth at an 8% discount rate,
    /// the high case the largest plus 10% at 6%. Perpetual growth is half the
    /// projected growth, floored at 3% (low) or 5% (high) and capped one point
    /// under the discount rate.
    pub fn assumptions(self, growth_rates: &[f64]) -> Option<DcfAssumptions> {
        let finite = growth_rates.iter().copied().filter(|g| g.is_finite());
        let (growth_rate, wacc, floor): (f64, f64, f64) = match self {
            Scenario::Low => (finite.reduce(f64::min)?, 0.08, 0.03),
            Scenario::High => (finite.reduce(f64::max)? * 1.1, 0.06, 0.05),
        };
        let perpetual_growth_rate = floor.max(growth_rate / 2.0).min(wacc - 0.01);

        Some(DcfAssumptions {
            growth_rate,
            perpetual_growth_rate,
            wacc,
            periods: 10,
        })
    }
}

/// Year-over-year growth of trailing-twelve-month sums
///
/// `quarterly` is most recent first, `None` for a quarter the provider left
/// blank. The result is oldest first; a point is `None` when either sum
/// touches a blank quarter or the year-earlier sum is not positive.
pub fn ttm_yoy_growth(quarterly: &[Option<f64>]) -> Vec<Option<f64>> {
    let chronological: Vec<Option<f64>> = quarterly.iter().rev().copied().collect();
    let ttm: Vec<Option<f64>> = chronological
        .windows(4)
        .map(|w| w.iter().copied().sum::<Option<f64>>())
        .collect();

    ttm.iter()
        .zip(ttm.iter().skip(4))
        .map(|(earlier, later)| match (*earlier, *later) {
            (Some(earlier), Some(later)) if earlier > 0.0 => Some(later / earlier - 1.0),
            _ => None,
        })
        .collect()
}

/// Average growth over the latest `points` growth observations
pub fn average_recent_growth(growth: &[Option<f64>], points: usize) -> Option<f64> {
    let recent: Vec<f64> = growth
        .iter()
        .rev()
        .take(points)
        .filter_map(|g| *g)
        .collect();

    if recent.is_empty() {
        None
    } else {
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }
}

/// One fiscal period of the figures the Piotroski score reads
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PiotroskiInputs {
    pub net_income: f64,
    pub operating_cash_flow: f64,
    pub total_assets: f64,
    pub long_term_debt: f64,
    pub current_assets: f64,
    pub current_liabilities: f64,
    pub shares_outstanding: f64,
    pub revenue: f64,
    pub gross_profit: f64,
}

impl PiotroskiInputs {
    fn return_on_assets(&self) -> Option<f64> {
        ratio(self.net_income, self.total_assets)
    }

    fn leverage(&self) -> Option<f64> {
        ratio(self.long_term_debt, self.total_assets)
    }

    fn current_ratio(&self) -> Option<f64> {
        ratio(self.current_assets, self.current_liabilities)
    }

    fn gross_margin(&self) -> Option<f64> {
        ratio(self.gross_profit, self.revenue)
    }

    fn asset_turnover(&self) -> Option<f64> {
        ratio(self.revenue, self.total_assets)
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator != 0.0).then(|| numerator / denominator)
}

/// Outcome of one Piotroski criterion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criterion {
    pub name: &'static str,
    pub passed: bool,
}

/// The nine Piotroski F-score criteria comparing the latest period to the prior one
///
/// A criterion whose ratio cannot be computed counts as failed.
pub fn piotroski_criteria(current: &PiotroskiInputs, prior: &PiotroskiInputs) -> Vec<Criterion> {
    let improved = |now: Option<f64>, before: Option<f64>| matches!((now, before), (Some(a), Some(b)) if a > b);
    let reduced = |now: Option<f64>, before: Option<f64>| matches!((now, before), (Some(a), Some(b)) if a < b);

    vec![
        Criterion {
            name: "Return on Assets",
            passed: current.return_on_assets().is_some_and(|r| r > 0.0),
        },
        Criterion {
            name: "Operating Cash Flow",
            passed: current.operating_cash_flow > 0.0,
        },
        Criterion {
            name: "Change in Return on Assets",
            passed: improved(current.return_on_assets(), prior.return_on_assets()),
        },
        Criterion {
            name: "Accruals",
            passed: current.operating_cash_flow > current.net_income,
        },
        Criterion {
            name: "Change in Leverage",
            passed: reduced(current.leverage(), prior.leverage()),
        },
        Criterion {
            name: "Change in Current Ratio",
            passed: improved(current.current_ratio(), prior.current_ratio()),
        },
        Criterion {
            name: "Number of Shares",
            passed: current.shares_outstanding <= prior.shares_outstanding,
        },
        Criterion {
            name: "Gross Margin",
            passed: improved(current.gross_margin(), prior.gross_margin()),
        },
        Criterion {
            name: "Asset Turnover Ratio",
            passed: improved(current.asset_turnover(), prior.asset_turnover()),
        },
    ]
}
