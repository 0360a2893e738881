use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::CompoundingFrequency;

/// result of a plain compound-interest projection
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundInterest {
    pub future_value: Money,
    pub total_returns: Money,
    pub effective_annual_rate: Rate,
}

/// result of compounding over an exact day span
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodInterest {
    pub interest: Money,
    pub new_balance: Money,
    /// the effective rate applied over the span
    pub effective_rate: Rate,
}

/// result of a contribution growth projection
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionGrowth {
    pub future_value: Money,
    pub total_contributions: Money,
    pub total_returns: Money,
}

fn pow(base: Decimal, exponent: Decimal) -> Result<Decimal> {
    base.checked_powd(exponent).ok_or(LedgerError::Calculation {
        message: format!("{base}^{exponent} out of range"),
    })
}

/// future value of `principal` at `annual_rate` compounded `frequency`
/// for `years`: `principal * (1 + r/n)^(n*t)`
pub fn compound_interest(
    principal: Money,
    annual_rate: Rate,
    frequency: CompoundingFrequency,
    years: Decimal,
) -> Result<CompoundInterest> {
    if !principal.is_positive() {
        return Err(LedgerError::InvalidAmount { amount: principal });
    }
    if annual_rate.is_negative() {
        return Err(LedgerError::InvalidRate { rate: annual_rate });
    }
    if years.is_sign_negative() {
        return Err(LedgerError::InvalidPeriod {
            message: format!("negative years: {years}"),
        });
    }

    let n = Decimal::from(frequency.periods_per_year());
    let base = Decimal::ONE + annual_rate.as_decimal() / n;

    let factor = pow(base, n * years)?;
    let future_value = principal * factor;
    let effective_annual = pow(base, n)? - Decimal::ONE;

    Ok(CompoundInterest {
        future_value,
        total_returns: future_value - principal,
        effective_annual_rate: Rate::from_decimal(effective_annual),
    })
}

/// interest for an exact day span, compounding within the partial period:
/// `t = days / 365.25`, `effective = (1 + r/n)^(n*t) - 1`.
/// this is not simple pro-rata.
pub fn period_interest(
    principal: Money,
    annual_rate: Rate,
    frequency: CompoundingFrequency,
    period_days: i64,
) -> Result<PeriodInterest> {
    if !principal.is_positive() {
        return Err(LedgerError::InvalidAmount { amount: principal });
    }
    if annual_rate.is_negative() {
        return Err(LedgerError::InvalidRate { rate: annual_rate });
    }
    if period_days <= 0 {
        return Err(LedgerError::InvalidPeriod {
            message: format!("non-positive day span: {period_days}"),
        });
    }

    let n = Decimal::from(frequency.periods_per_year());
    let t_years = Decimal::from(period_days) / dec!(365.25);
    let base = Decimal::ONE + annual_rate.as_decimal() / n;

    let effective = pow(base, n * t_years)? - Decimal::ONE;
    let interest = principal * effective;

    Ok(PeriodInterest {
        interest,
        new_balance: principal + interest,
        effective_rate: Rate::from_decimal(effective),
    })
}

/// monthly-compounded accumulation of a principal plus level monthly
/// contributions, each contribution applied at the start of its month
pub fn future_value_with_contributions(
    principal: Money,
    monthly_contribution: Money,
    annual_rate: Rate,
    years: u32,
) -> Result<ContributionGrowth> {
    if principal.is_negative() {
        return Err(LedgerError::InvalidAmount { amount: principal });
    }
    if monthly_contribution.is_negative() {
        return Err(LedgerError::InvalidAmount {
            amount: monthly_contribution,
        });
    }
    if annual_rate.is_negative() {
        return Err(LedgerError::InvalidRate { rate: annual_rate });
    }
    if years == 0 {
        return Err(LedgerError::InvalidPeriod {
            message: "zero years".to_string(),
        });
    }

    let monthly_factor = Decimal::ONE + annual_rate.as_decimal() / dec!(12);
    let mut balance = principal;
    let mut contributed = Money::ZERO;

    for _ in 0..years * 12 {
        balance = (balance + monthly_contribution) * monthly_factor;
        contributed += monthly_contribution;
    }

    Ok(ContributionGrowth {
        future_value: balance,
        total_contributions: contributed,
        total_returns: balance - principal - contributed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_interest_monthly() {
        let result = compound_interest(
            Money::from_major(10_000),
            Rate::from_percentage(12),
            CompoundingFrequency::Monthly,
            Decimal::ONE,
        )
        .unwrap();

        assert_eq!(result.future_value.round_dp(2), Money::from_str_exact("11268.25").unwrap());
        assert_eq!(result.total_returns.round_dp(2), Money::from_str_exact("1268.25").unwrap());
        // 12% APR compounded monthly yields ~12.68% effective
        assert!(result.effective_annual_rate.as_percent() > dec!(12.6));
        assert!(result.effective_annual_rate.as_percent() < dec!(12.7));
    }

    #[test]
    fn test_compound_interest_frequency_ordering() {
        let principal = Money::from_major(10_000);
        let rate = Rate::from_percentage(12);

        let annually = compound_interest(principal, rate, CompoundingFrequency::Annually, Decimal::ONE).unwrap();
        let quarterly = compound_interest(principal, rate, CompoundingFrequency::Quarterly, Decimal::ONE).unwrap();
        let monthly = compound_interest(principal, rate, CompoundingFrequency::Monthly, Decimal::ONE).unwrap();
        let daily = compound_interest(principal, rate, CompoundingFrequency::Daily, Decimal::ONE).unwrap();

        assert_eq!(annually.future_value, Money::from_major(11_200));
        assert!(annually.future_value < quarterly.future_value);
        assert!(quarterly.future_value < monthly.future_value);
        assert!(monthly.future_value < daily.future_value);
    }

    #[test]
    fn test_compound_interest_rejects_bad_input() {
        let rate = Rate::from_percentage(5);
        assert!(compound_interest(Money::ZERO, rate, CompoundingFrequency::Monthly, Decimal::ONE).is_err());
        assert!(compound_interest(
            Money::from_major(100),
            Rate::from_decimal(dec!(-0.01)),
            CompoundingFrequency::Monthly,
            Decimal::ONE
        )
        .is_err());
        assert!(compound_interest(Money::from_major(100), rate, CompoundingFrequency::Monthly, dec!(-1)).is_err());
    }

    #[test]
    fn test_period_interest_31_days() {
        // 10000 at 12% APR, monthly compounding, 31 days:
        // (1 + 0.01)^(12 * 31/365.25) - 1 applied to the principal
        let result = period_interest(
            Money::from_major(10_000),
            Rate::from_percentage(12),
            CompoundingFrequency::Monthly,
            31,
        )
        .unwrap();

        assert_eq!(result.interest.round_dp(2), Money::from_str_exact("101.86").unwrap());
        assert_eq!(result.new_balance, Money::from_major(10_000) + result.interest);
    }

    #[test]
    fn test_period_interest_compounds_within_period() {
        // over a full year of days the exact-day method must land close to
        // the effective annual rate, not the simple pro-rata one
        let result = period_interest(
            Money::from_major(10_000),
            Rate::from_percentage(12),
            CompoundingFrequency::Monthly,
            366, // 365.25 rounded up
        )
        .unwrap();

        assert!(result.interest > Money::from_major(1_265));
        assert!(result.interest < Money::from_major(1_275));
    }

    #[test]
    fn test_period_interest_rejects_non_positive_span() {
        let principal = Money::from_major(1_000);
        let rate = Rate::from_percentage(5);
        assert!(period_interest(principal, rate, CompoundingFrequency::Monthly, 0).is_err());
        assert!(period_interest(principal, rate, CompoundingFrequency::Monthly, -3).is_err());
    }

    #[test]
    fn test_contributions_zero_rate() {
        let result = future_value_with_contributions(
            Money::from_major(1_000),
            Money::from_major(100),
            Rate::ZERO,
            2,
        )
        .unwrap();

        assert_eq!(result.future_value, Money::from_major(3_400));
        assert_eq!(result.total_contributions, Money::from_major(2_400));
        assert_eq!(result.total_returns, Money::ZERO);
    }

    #[test]
    fn test_contributions_grow_with_rate() {
        let result = future_value_with_contributions(
            Money::from_major(1_000),
            Money::from_major(100),
            Rate::from_percentage(12),
            1,
        )
        .unwrap();

        assert_eq!(result.total_contributions, Money::from_major(1_200));
        // must beat the uninvested sum
        assert!(result.future_value > Money::from_major(2_200));
        assert!(result.total_returns.is_positive());
    }
}
