use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calc::schedule::next_due_date;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{
    CalculationId, CalculationType, CompoundingFrequency, InvestmentId, InvestmentStatus,
    ReturnType, TransactionId, TransactionType, UserId,
};

/// a tracked investment with its running balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: InvestmentId,
    pub owner_id: UserId,
    pub name: String,
    pub category: Option<String>,
    pub currency: String,

    /// immutable principal, never changed after opening
    pub initial_amount: Money,
    /// authoritative running value
    pub current_balance: Money,

    pub return_type: ReturnType,
    /// annual rate, present iff the return type is fixed
    pub interest_rate: Option<Rate>,
    pub compounding_frequency: Option<CompoundingFrequency>,

    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: InvestmentStatus,

    /// period end of the last applied calculation, none until the first one
    pub last_interest_calculated: Option<DateTime<Utc>>,
    /// scheduler trigger point
    pub next_interest_due: Option<DateTime<Utc>>,
    pub auto_calculate_interest: bool,

    /// optimistic token, checked and bumped on every store write
    pub version: u64,
}

impl Investment {
    /// open a fixed-rate investment
    pub fn fixed(
        owner_id: UserId,
        name: impl Into<String>,
        currency: impl Into<String>,
        principal: Money,
        rate: Rate,
        frequency: CompoundingFrequency,
        start_date: DateTime<Utc>,
        auto_calculate: bool,
    ) -> Self {
        let next_due = auto_calculate.then(|| next_due_date(start_date, frequency));
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            category: None,
            currency: currency.into(),
            initial_amount: principal,
            current_balance: principal,
            return_type: ReturnType::Fixed,
            interest_rate: Some(rate),
            compounding_frequency: Some(frequency),
            start_date,
            end_date: None,
            status: InvestmentStatus::Active,
            last_interest_calculated: None,
            next_interest_due: next_due,
            auto_calculate_interest: auto_calculate,
            version: 0,
        }
    }

    /// open a variable-return investment
    pub fn variable(
        owner_id: UserId,
        name: impl Into<String>,
        currency: impl Into<String>,
        principal: Money,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            category: None,
            currency: currency.into(),
            initial_amount: principal,
            current_balance: principal,
            return_type: ReturnType::Variable,
            interest_rate: None,
            compounding_frequency: None,
            start_date,
            end_date: None,
            status: InvestmentStatus::Active,
            last_interest_calculated: None,
            next_interest_due: None,
            auto_calculate_interest: false,
            version: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == InvestmentStatus::Active
    }

    /// fail unless the investment is active
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(LedgerError::InvestmentNotActive { status: self.status })
        }
    }

    /// fail if the investment reached its terminal state
    pub fn ensure_mutable(&self) -> Result<()> {
        if self.status == InvestmentStatus::Cancelled {
            Err(LedgerError::InvestmentNotActive { status: self.status })
        } else {
            Ok(())
        }
    }

    /// fail unless the return type matches
    pub fn ensure_return_type(&self, expected: ReturnType) -> Result<()> {
        if self.return_type == expected {
            Ok(())
        } else {
            Err(LedgerError::WrongReturnType {
                expected,
                actual: self.return_type,
            })
        }
    }

    /// annual rate, required for any fixed-rate operation
    pub fn require_rate(&self) -> Result<Rate> {
        self.interest_rate.ok_or(LedgerError::MissingInterestRate)
    }

    /// frequency to compound with, falling back to the engine default
    pub fn effective_frequency(&self, default: CompoundingFrequency) -> CompoundingFrequency {
        self.compounding_frequency.unwrap_or(default)
    }

    /// start of the next calculation period
    pub fn period_start(&self) -> DateTime<Utc> {
        self.last_interest_calculated.unwrap_or(self.start_date)
    }

    /// balance implied by the principal plus all recorded entries.
    /// `current_balance` must always equal this.
    pub fn expected_balance(&self, transactions: &[Transaction]) -> Money {
        transactions
            .iter()
            .fold(self.initial_amount, |acc, t| acc + t.signed_effect())
    }
}

/// a balance-affecting ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub investment_id: InvestmentId,
    pub kind: TransactionType,
    /// signed effect magnitude; withdrawals are stored as a reduction
    pub amount: Money,
    /// investment balance snapshot after this entry applied
    pub balance: Money,
    /// set for return entries computed from a rate or percentage
    pub percentage: Option<Decimal>,
    /// effective date, user-controlled, never in the future
    pub transaction_date: DateTime<Utc>,
    pub description: String,
}

impl Transaction {
    pub fn new(
        investment_id: InvestmentId,
        kind: TransactionType,
        amount: Money,
        balance: Money,
        transaction_date: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            investment_id,
            kind,
            amount,
            balance,
            percentage: None,
            transaction_date,
            description: description.into(),
        }
    }

    pub fn with_percentage(mut self, percentage: Decimal) -> Self {
        self.percentage = Some(percentage);
        self
    }

    /// signed contribution of this entry to the running balance
    pub fn signed_effect(&self) -> Money {
        self.kind.signed_effect(self.amount)
    }
}

/// audit-trail row for one applied fixed-interest calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestCalculation {
    pub id: CalculationId,
    pub investment_id: InvestmentId,
    pub calculation_type: CalculationType,
    pub calculated_at: DateTime<Utc>,

    /// exact day-span covered
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,

    /// balance at period start
    pub principal_amount: Money,
    /// annual rate used
    pub interest_rate: Rate,
    pub interest_earned: Money,
    pub new_balance: Money,

    /// the return transaction this calculation produced, cleared on revert
    pub transaction_id: Option<TransactionId>,

    pub is_reverted: bool,
    pub reverted_at: Option<DateTime<Utc>>,
    pub reverted_by: Option<UserId>,
}

impl InterestCalculation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        investment_id: InvestmentId,
        calculation_type: CalculationType,
        calculated_at: DateTime<Utc>,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        principal_amount: Money,
        interest_rate: Rate,
        interest_earned: Money,
        new_balance: Money,
        transaction_id: TransactionId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            investment_id,
            calculation_type,
            calculated_at,
            period_start,
            period_end,
            principal_amount,
            interest_rate,
            interest_earned,
            new_balance,
            transaction_id: Some(transaction_id),
            is_reverted: false,
            reverted_at: None,
            reverted_by: None,
        }
    }

    /// flip to reverted, stamping the audit metadata. never re-activated.
    pub fn mark_reverted(&mut self, reverted_at: DateTime<Utc>, reverted_by: UserId) {
        self.is_reverted = true;
        self.reverted_at = Some(reverted_at);
        self.reverted_by = Some(reverted_by);
        self.transaction_id = None;
    }
}
