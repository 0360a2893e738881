use std::sync::Arc;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::model::Transaction;
use crate::store::Store;
use crate::types::{InvestmentId, TransactionId, TransactionType, UserId};

/// a user-entered ledger row waiting to be recorded
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub investment_id: InvestmentId,
    pub kind: TransactionType,
    /// positive magnitude; the kind decides the sign of the effect
    pub amount: Money,
    /// defaults to now, never accepted in the future
    pub transaction_date: Option<DateTime<Utc>>,
    pub description: String,
    pub percentage: Option<Decimal>,
}

/// partial edit of an existing ledger row
#[derive(Debug, Clone, Default)]
pub struct TransactionAmendment {
    pub kind: Option<TransactionType>,
    pub amount: Option<Money>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

/// generic transaction CRUD every deposit/withdrawal/dividend/return
/// entry passes through. each operation keeps the investment's running
/// balance and the row's balance snapshot consistent, atomically.
pub struct TransactionLedger<S> {
    store: Arc<S>,
    events: EventStore,
}

impl<S: Store> TransactionLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            events: EventStore::new(),
        }
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// record a new entry and apply its effect to the balance
    pub fn record(
        &mut self,
        owner: UserId,
        entry: NewTransaction,
        time: &SafeTimeProvider,
    ) -> Result<Transaction> {
        let now = time.now();
        if !entry.amount.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: entry.amount });
        }
        let date = entry.transaction_date.unwrap_or(now);
        if date > now {
            return Err(LedgerError::DateInFuture { date });
        }

        let transaction = self.store.in_transaction(|tx| {
            let mut inv = tx.investment(owner, entry.investment_id)?;
            inv.ensure_mutable()?;

            if entry.kind == TransactionType::Withdrawal && entry.amount > inv.current_balance {
                return Err(LedgerError::WithdrawalExceedsBalance {
                    balance: inv.current_balance,
                    requested: entry.amount,
                });
            }

            let effect = entry.kind.signed_effect(entry.amount);
            let new_balance = inv.current_balance + effect;
            if new_balance.is_negative() {
                return Err(LedgerError::NegativeBalance {
                    balance: inv.current_balance,
                    change: effect,
                });
            }

            let mut transaction = Transaction::new(
                inv.id,
                entry.kind,
                entry.amount,
                new_balance,
                date,
                entry.description.clone(),
            );
            transaction.percentage = entry.percentage;
            tx.insert_transaction(transaction.clone())?;

            inv.current_balance = new_balance;
            tx.update_investment(&mut inv)?;

            Ok(transaction)
        })?;

        self.events.emit(Event::TransactionRecorded {
            investment_id: transaction.investment_id,
            transaction_id: transaction.id,
            kind: transaction.kind,
            amount: transaction.amount,
            new_balance: transaction.balance,
            timestamp: now,
        });

        Ok(transaction)
    }

    /// edit an entry in place, re-applying the difference between its
    /// old and new balance effect
    pub fn amend(
        &mut self,
        owner: UserId,
        id: TransactionId,
        changes: TransactionAmendment,
        time: &SafeTimeProvider,
    ) -> Result<Transaction> {
        let now = time.now();
        if let Some(date) = changes.transaction_date {
            if date > now {
                return Err(LedgerError::DateInFuture { date });
            }
        }

        let (transaction, delta, new_balance) = self.store.in_transaction(|tx| {
            let old = tx.transaction(owner, id)?;
            let mut inv = tx.investment(owner, old.investment_id)?;
            inv.ensure_mutable()?;

            let kind = changes.kind.unwrap_or(old.kind);
            let amount = changes.amount.unwrap_or(old.amount);
            if !amount.is_positive() {
                return Err(LedgerError::InvalidAmount { amount });
            }

            let delta = kind.signed_effect(amount) - old.signed_effect();
            let new_balance = inv.current_balance + delta;
            if new_balance.is_negative() {
                return Err(LedgerError::NegativeBalance {
                    balance: inv.current_balance,
                    change: delta,
                });
            }

            let mut updated = old.clone();
            updated.kind = kind;
            updated.amount = amount;
            updated.balance = old.balance + delta;
            if let Some(date) = changes.transaction_date {
                updated.transaction_date = date;
            }
            if let Some(description) = changes.description.clone() {
                updated.description = description;
            }
            tx.update_transaction(&updated)?;

            inv.current_balance = new_balance;
            tx.update_investment(&mut inv)?;

            Ok((updated, delta, new_balance))
        })?;

        self.events.emit(Event::TransactionAmended {
            investment_id: transaction.investment_id,
            transaction_id: transaction.id,
            balance_delta: delta,
            new_balance,
            timestamp: now,
        });

        Ok(transaction)
    }

    /// delete an entry, reversing its balance effect
    pub fn remove(&mut self, owner: UserId, id: TransactionId, time: &SafeTimeProvider) -> Result<()> {
        let now = time.now();

        let (investment_id, reversed, new_balance) = self.store.in_transaction(|tx| {
            let old = tx.transaction(owner, id)?;
            let mut inv = tx.investment(owner, old.investment_id)?;
            inv.ensure_mutable()?;

            let reversal = -old.signed_effect();
            let new_balance = inv.current_balance + reversal;
            if new_balance.is_negative() {
                return Err(LedgerError::NegativeBalance {
                    balance: inv.current_balance,
                    change: reversal,
                });
            }

            tx.delete_transaction(old.id)?;
            inv.current_balance = new_balance;
            tx.update_investment(&mut inv)?;

            Ok((inv.id, reversal, new_balance))
        })?;

        self.events.emit(Event::TransactionRemoved {
            investment_id,
            transaction_id: id,
            reversed_amount: reversed,
            new_balance,
            timestamp: now,
        });

        Ok(())
    }
}
