use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for an investment
pub type InvestmentId = Uuid;

/// unique identifier for a ledger transaction
pub type TransactionId = Uuid;

/// unique identifier for an interest calculation
pub type CalculationId = Uuid;

/// authenticated owner identity, supplied by the caller and trusted
pub type UserId = Uuid;

/// how an investment earns returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnType {
    /// contractual annual rate, eligible for scheduled calculation
    Fixed,
    /// no fixed rate, balance moves only via explicit entries
    Variable,
}

/// investment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentStatus {
    Active,
    Completed,
    /// terminal soft-state, all further mutation rejected
    Cancelled,
}

/// ledger transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Return,
    Withdrawal,
    Deposit,
    Dividend,
}

impl TransactionType {
    /// signed balance effect of an entry of this kind.
    /// withdrawals reduce the balance by their absolute magnitude.
    pub fn signed_effect(&self, amount: Money) -> Money {
        match self {
            TransactionType::Withdrawal => -amount.abs(),
            TransactionType::Return | TransactionType::Deposit | TransactionType::Dividend => {
                amount
            }
        }
    }
}

/// origin of an interest calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationType {
    /// produced by the scheduled sweep
    Automatic,
    /// requested explicitly by the owner
    Manual,
}

/// compounding frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundingFrequency {
    Daily,
    Monthly,
    Quarterly,
    Annually,
}

impl CompoundingFrequency {
    /// number of compounding periods per year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Daily => 365,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Annually => 1,
        }
    }
}
