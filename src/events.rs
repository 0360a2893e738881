use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{
    CalculationId, CompoundingFrequency, InvestmentId, InvestmentStatus, TransactionId,
    TransactionType, UserId,
};

/// all events emitted by the engine, ledger and scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    InvestmentOpened {
        investment_id: InvestmentId,
        owner_id: UserId,
        principal: Money,
        timestamp: DateTime<Utc>,
    },
    InvestmentStatusChanged {
        investment_id: InvestmentId,
        old_status: InvestmentStatus,
        new_status: InvestmentStatus,
        timestamp: DateTime<Utc>,
    },

    // return events
    ReturnApplied {
        investment_id: InvestmentId,
        transaction_id: TransactionId,
        amount: Money,
        new_balance: Money,
        percentage: Option<Decimal>,
        timestamp: DateTime<Utc>,
    },
    InterestCalculated {
        investment_id: InvestmentId,
        calculation_id: CalculationId,
        period_days: i64,
        interest: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    CalculationReverted {
        investment_id: InvestmentId,
        calculation_id: CalculationId,
        amount_reversed: Money,
        restored_balance: Money,
        timestamp: DateTime<Utc>,
    },
    ScheduleUpdated {
        investment_id: InvestmentId,
        auto_calculate: bool,
        frequency: Option<CompoundingFrequency>,
        timestamp: DateTime<Utc>,
    },

    // ledger events
    TransactionRecorded {
        investment_id: InvestmentId,
        transaction_id: TransactionId,
        kind: TransactionType,
        amount: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    TransactionAmended {
        investment_id: InvestmentId,
        transaction_id: TransactionId,
        balance_delta: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    TransactionRemoved {
        investment_id: InvestmentId,
        transaction_id: TransactionId,
        reversed_amount: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },

    // scheduler events
    SweepCompleted {
        processed: usize,
        succeeded: usize,
        failed: usize,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
