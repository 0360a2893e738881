use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::model::Investment;
use crate::types::InvestmentId;

/// simple return of a position against its principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSummary {
    pub absolute_return: Money,
    /// percent of the initial amount
    pub return_percentage: Decimal,
    pub is_profit: bool,
    pub is_loss: bool,
}

/// geometric-mean annual return over a holding period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualizedReturn {
    pub annualized_return: Rate,
    pub total_return: Rate,
}

/// one investment's position in the best/worst ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStanding {
    pub investment_id: InvestmentId,
    pub name: String,
    pub return_percentage: Decimal,
}

/// aggregate view over a set of investments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_invested: Money,
    pub total_value: Money,
    pub total_return: Money,
    pub return_percentage: Decimal,
    pub best_performing: Option<PortfolioStanding>,
    pub worst_performing: Option<PortfolioStanding>,
    pub average_return: Decimal,
}

/// absolute and percentage return of `current` against `initial`
pub fn return_percentage(initial: Money, current: Money) -> Result<ReturnSummary> {
    if !initial.is_positive() {
        return Err(LedgerError::InvalidAmount { amount: initial });
    }

    let absolute = current - initial;
    let percentage = absolute.as_decimal() / initial.as_decimal() * Decimal::from(100);

    Ok(ReturnSummary {
        absolute_return: absolute,
        return_percentage: percentage,
        is_profit: absolute.is_positive(),
        is_loss: absolute.is_negative(),
    })
}

/// `(final/initial)^(1/years) - 1`
pub fn annualized_return(initial: Money, final_value: Money, years: Decimal) -> Result<AnnualizedReturn> {
    if !initial.is_positive() {
        return Err(LedgerError::InvalidAmount { amount: initial });
    }
    if final_value.is_negative() {
        return Err(LedgerError::InvalidAmount { amount: final_value });
    }
    if years <= Decimal::ZERO {
        return Err(LedgerError::InvalidPeriod {
            message: format!("non-positive years: {years}"),
        });
    }

    let growth = final_value.as_decimal() / initial.as_decimal();
    let annualized = growth
        .checked_powd(Decimal::ONE / years)
        .ok_or(LedgerError::Calculation {
            message: format!("{growth}^(1/{years}) out of range"),
        })?
        - Decimal::ONE;

    Ok(AnnualizedReturn {
        annualized_return: Rate::from_decimal(annualized),
        total_return: Rate::from_decimal(growth - Decimal::ONE),
    })
}

/// portfolio totals plus best/worst ranking. only investments with a
/// positive principal are ranked; ties keep the first-seen entry.
pub fn portfolio_metrics(investments: &[Investment]) -> PortfolioMetrics {
    let mut total_invested = Money::ZERO;
    let mut total_value = Money::ZERO;
    let mut best: Option<PortfolioStanding> = None;
    let mut worst: Option<PortfolioStanding> = None;
    let mut eligible = 0u32;
    let mut percentage_sum = Decimal::ZERO;

    for inv in investments {
        total_invested += inv.initial_amount;
        total_value += inv.current_balance;

        if !inv.initial_amount.is_positive() {
            continue;
        }
        eligible += 1;

        let gain = inv.current_balance - inv.initial_amount;
        let pct = gain.as_decimal() / inv.initial_amount.as_decimal() * Decimal::from(100);
        percentage_sum += pct;

        let standing = PortfolioStanding {
            investment_id: inv.id,
            name: inv.name.clone(),
            return_percentage: pct,
        };
        match &best {
            Some(b) if pct <= b.return_percentage => {}
            _ => best = Some(standing.clone()),
        }
        match &worst {
            Some(w) if pct >= w.return_percentage => {}
            _ => worst = Some(standing),
        }
    }

    let total_return = total_value - total_invested;
    let return_pct = if total_invested.is_positive() {
        total_return.as_decimal() / total_invested.as_decimal() * Decimal::from(100)
    } else {
        Decimal::ZERO
    };
    let average = if eligible > 0 {
        percentage_sum / Decimal::from(eligible)
    } else {
        Decimal::ZERO
    };

    PortfolioMetrics {
        total_invested,
        total_value,
        total_return,
        return_percentage: return_pct,
        best_performing: best,
        worst_performing: worst,
        average_return: average,
    }
}
