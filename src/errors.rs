use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{CalculationId, InvestmentId, InvestmentStatus, ReturnType, TransactionId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("investment not found: {id}")]
    InvestmentNotFound {
        id: InvestmentId,
    },

    #[error("transaction not found: {id}")]
    TransactionNotFound {
        id: TransactionId,
    },

    #[error("calculation not found: {id}")]
    CalculationNotFound {
        id: CalculationId,
    },

    #[error("investment not active: current status is {status:?}")]
    InvestmentNotActive {
        status: InvestmentStatus,
    },

    #[error("operation requires a {expected:?} investment, this one is {actual:?}")]
    WrongReturnType {
        expected: ReturnType,
        actual: ReturnType,
    },

    #[error("no new period to calculate since {since}")]
    NoNewPeriod {
        since: DateTime<Utc>,
    },

    #[error("no calculation to revert")]
    NothingToRevert,

    #[error("fixed investment has no interest rate")]
    MissingInterestRate,

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("invalid rate: {rate}")]
    InvalidRate {
        rate: Rate,
    },

    #[error("invalid percentage: {percentage}")]
    InvalidPercentage {
        percentage: Decimal,
    },

    #[error("invalid period: {message}")]
    InvalidPeriod {
        message: String,
    },

    #[error("transaction date {date} is in the future")]
    DateInFuture {
        date: DateTime<Utc>,
    },

    #[error("balance would become negative: balance {balance}, change {change}")]
    NegativeBalance {
        balance: Money,
        change: Money,
    },

    #[error("withdrawal exceeds balance: balance {balance}, requested {requested}")]
    WithdrawalExceedsBalance {
        balance: Money,
        requested: Money,
    },

    #[error("stale investment version: stored {stored}, given {given}")]
    StaleVersion {
        stored: u64,
        given: u64,
    },

    #[error("duplicate record: {message}")]
    DuplicateRecord {
        message: String,
    },

    #[error("calculation failed: {message}")]
    Calculation {
        message: String,
    },
}

/// stable machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidInput,
    NegativeBalance,
    Conflict,
}

impl LedgerError {
    /// the stable category carried alongside the human-readable message
    pub fn kind(&self) -> ErrorKind {
        use LedgerError::*;
        match self {
            InvestmentNotFound { .. } | TransactionNotFound { .. } | CalculationNotFound { .. } => {
                ErrorKind::NotFound
            }
            InvestmentNotActive { .. }
            | WrongReturnType { .. }
            | NoNewPeriod { .. }
            | NothingToRevert => ErrorKind::InvalidState,
            MissingInterestRate
            | InvalidAmount { .. }
            | InvalidRate { .. }
            | InvalidPercentage { .. }
            | InvalidPeriod { .. }
            | DateInFuture { .. }
            | Calculation { .. } => ErrorKind::InvalidInput,
            NegativeBalance { .. } | WithdrawalExceedsBalance { .. } => ErrorKind::NegativeBalance,
            StaleVersion { .. } | DuplicateRecord { .. } => ErrorKind::Conflict,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
