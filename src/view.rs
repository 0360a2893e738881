/// serialization support for investment statements
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::model::{Investment, Transaction};
use crate::types::{InvestmentId, InvestmentStatus, ReturnType};

/// serializable view of an investment's state
#[derive(Debug, Serialize, Deserialize)]
pub struct InvestmentView {
    pub id: InvestmentId,
    pub name: String,
    pub category: Option<String>,
    pub currency: String,
    pub status: InvestmentStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub financial: FinancialView,
    pub schedule: ScheduleView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinancialView {
    pub initial_amount: Money,
    pub current_balance: Money,
    pub absolute_return: Money,
    pub return_type: ReturnType,
    pub interest_rate: Option<Rate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleView {
    pub auto_calculate_interest: bool,
    pub compounding_frequency: Option<String>,
    pub last_interest_calculated: Option<DateTime<Utc>>,
    pub next_interest_due: Option<DateTime<Utc>>,
}

/// serializable statement line for one ledger entry
#[derive(Debug, Serialize, Deserialize)]
pub struct StatementLine {
    pub date: DateTime<Utc>,
    pub kind: String,
    pub amount: Money,
    pub balance: Money,
    pub percentage: Option<Decimal>,
    pub description: String,
}

impl InvestmentView {
    pub fn from_investment(investment: &Investment) -> Self {
        InvestmentView {
            id: investment.id,
            name: investment.name.clone(),
            category: investment.category.clone(),
            currency: investment.currency.clone(),
            status: investment.status,
            start_date: investment.start_date,
            end_date: investment.end_date,
            financial: FinancialView {
                initial_amount: investment.initial_amount,
                current_balance: investment.current_balance,
                absolute_return: investment.current_balance - investment.initial_amount,
                return_type: investment.return_type,
                interest_rate: investment.interest_rate,
            },
            schedule: ScheduleView {
                auto_calculate_interest: investment.auto_calculate_interest,
                compounding_frequency: investment
                    .compounding_frequency
                    .map(|f| format!("{f:?}")),
                last_interest_calculated: investment.last_interest_calculated,
                next_interest_due: investment.next_interest_due,
            },
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl StatementLine {
    pub fn from_transaction(transaction: &Transaction) -> Self {
        StatementLine {
            date: transaction.transaction_date,
            kind: format!("{:?}", transaction.kind),
            amount: transaction.amount,
            balance: transaction.balance,
            percentage: transaction.percentage,
            description: transaction.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompoundingFrequency;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_view_round_trips_through_json() {
        let inv = Investment::fixed(
            Uuid::new_v4(),
            "bond ladder",
            "USD",
            Money::from_major(10_000),
            Rate::from_percent(dec!(4.5)),
            CompoundingFrequency::Quarterly,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            true,
        );

        let view = InvestmentView::from_investment(&inv);
        let json = view.to_json_pretty().unwrap();
        assert!(json.contains("bond ladder"));
        assert!(json.contains("Quarterly"));

        let parsed: InvestmentView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, inv.id);
        assert_eq!(parsed.financial.current_balance, inv.current_balance);
        assert_eq!(parsed.financial.interest_rate, inv.interest_rate);
    }

    #[test]
    fn test_domain_records_round_trip_through_json() {
        let inv = Investment::variable(
            Uuid::new_v4(),
            "fund",
            "EUR",
            Money::from_major(500),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );

        let json = serde_json::to_string(&inv).unwrap();
        let parsed: Investment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, inv);
    }

    #[test]
    fn test_statement_line() {
        let txn = Transaction::new(
            Uuid::new_v4(),
            crate::types::TransactionType::Dividend,
            Money::from_major(25),
            Money::from_major(1_025),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            "quarterly payout",
        );

        let line = StatementLine::from_transaction(&txn);
        assert_eq!(line.kind, "Dividend");
        assert_eq!(line.balance, Money::from_major(1_025));

        let json = serde_json::to_string(&line).unwrap();
        let parsed: StatementLine = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.amount, Money::from_major(25));
    }
}
