use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::Event;
use crate::model::{Investment, Transaction};
use crate::store::Store;
use crate::types::{InvestmentId, ReturnType, TransactionType, UserId};

use super::InterestEngine;

/// the entry and updated investment written by a variable update
#[derive(Debug, Clone)]
pub struct VariableOutcome {
    pub transaction: Transaction,
    pub investment: Investment,
}

impl<S: Store> InterestEngine<S> {
    /// apply a manual percentage return to a variable investment.
    /// negative percentages record losses; anything below -100% would
    /// drive the balance negative and is rejected up front.
    /// no audit calculation row is produced for variable paths.
    pub fn update_by_percentage(
        &mut self,
        owner: UserId,
        id: InvestmentId,
        percentage: Decimal,
        effective_date: Option<DateTime<Utc>>,
        time: &SafeTimeProvider,
    ) -> Result<VariableOutcome> {
        let now = time.now();
        if percentage < dec!(-100) {
            return Err(LedgerError::InvalidPercentage { percentage });
        }
        let date = effective_date.unwrap_or(now);
        if date > now {
            return Err(LedgerError::DateInFuture { date });
        }

        let outcome = self.store.in_transaction(|tx| {
            let mut inv = tx.investment(owner, id)?;
            inv.ensure_return_type(ReturnType::Variable)?;
            inv.ensure_active()?;

            let amount = inv.current_balance.percent_of(percentage);
            let new_balance = inv.current_balance + amount;

            let transaction = Transaction::new(
                inv.id,
                TransactionType::Return,
                amount,
                new_balance,
                date,
                format!("{percentage}% return"),
            )
            .with_percentage(percentage);
            tx.insert_transaction(transaction.clone())?;

            inv.current_balance = new_balance;
            tx.update_investment(&mut inv)?;

            Ok(VariableOutcome {
                transaction,
                investment: inv,
            })
        })?;

        self.events.emit(Event::ReturnApplied {
            investment_id: outcome.investment.id,
            transaction_id: outcome.transaction.id,
            amount: outcome.transaction.amount,
            new_balance: outcome.investment.current_balance,
            percentage: Some(percentage),
            timestamp: now,
        });

        Ok(outcome)
    }

    /// set a variable investment to an observed balance, deriving the
    /// return amount and percentage from the difference
    pub fn update_by_balance(
        &mut self,
        owner: UserId,
        id: InvestmentId,
        new_balance: Money,
        effective_date: Option<DateTime<Utc>>,
        time: &SafeTimeProvider,
    ) -> Result<VariableOutcome> {
        let now = time.now();
        if new_balance.is_negative() {
            return Err(LedgerError::InvalidAmount { amount: new_balance });
        }
        let date = effective_date.unwrap_or(now);
        if date > now {
            return Err(LedgerError::DateInFuture { date });
        }

        let outcome = self.store.in_transaction(|tx| {
            let mut inv = tx.investment(owner, id)?;
            inv.ensure_return_type(ReturnType::Variable)?;
            inv.ensure_active()?;

            let amount = new_balance - inv.current_balance;
            let percentage = if inv.current_balance.is_positive() {
                amount.as_decimal() / inv.current_balance.as_decimal() * Decimal::from(100)
            } else {
                Decimal::ZERO
            };

            let transaction = Transaction::new(
                inv.id,
                TransactionType::Return,
                amount,
                new_balance,
                date,
                format!("balance set to {new_balance}"),
            )
            .with_percentage(percentage);
            tx.insert_transaction(transaction.clone())?;

            inv.current_balance = new_balance;
            tx.update_investment(&mut inv)?;

            Ok(VariableOutcome {
                transaction,
                investment: inv,
            })
        })?;

        self.events.emit(Event::ReturnApplied {
            investment_id: outcome.investment.id,
            transaction_id: outcome.transaction.id,
            amount: outcome.transaction.amount,
            new_balance: outcome.investment.current_balance,
            percentage: outcome.transaction.percentage,
            timestamp: now,
        });

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::errors::ErrorKind;
    use crate::store::MemoryStore;
    use crate::types::{CompoundingFrequency, InvestmentStatus};
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;
    use std::sync::Arc;
    use uuid::Uuid;

    fn test_clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn variable_investment(
        store: &Arc<MemoryStore>,
        owner: UserId,
        balance: i64,
        time: &SafeTimeProvider,
    ) -> Investment {
        let inv = Investment::variable(owner, "etf", "USD", Money::from_major(balance), time.now());
        let record = inv.clone();
        store
            .in_transaction(|tx| tx.insert_investment(record.clone()))
            .unwrap();
        inv
    }

    #[test]
    fn test_percentage_round_trip() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let inv = variable_investment(&store, owner, 1_000, &time);
        let mut engine = InterestEngine::new(Arc::clone(&store));

        let outcome = engine
            .update_by_percentage(owner, inv.id, dec!(10), None, &time)
            .unwrap();

        assert_eq!(outcome.transaction.amount, Money::from_major(100));
        assert_eq!(outcome.investment.current_balance, Money::from_major(1_100));
        assert_eq!(outcome.transaction.percentage, Some(dec!(10)));
        assert_eq!(outcome.transaction.balance, Money::from_major(1_100));

        // no audit calculation row for variable paths
        assert!(store.calculations(owner, inv.id).unwrap().is_empty());
    }

    #[test]
    fn test_balance_round_trip() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let inv = variable_investment(&store, owner, 1_000, &time);
        let mut engine = InterestEngine::new(Arc::clone(&store));

        let outcome = engine
            .update_by_balance(owner, inv.id, Money::from_major(1_100), None, &time)
            .unwrap();

        assert_eq!(outcome.transaction.amount, Money::from_major(100));
        assert_eq!(outcome.transaction.percentage, Some(dec!(10)));
        assert_eq!(outcome.investment.current_balance, Money::from_major(1_100));
    }

    #[test]
    fn test_loss_and_floor() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let inv = variable_investment(&store, owner, 1_000, &time);
        let mut engine = InterestEngine::new(Arc::clone(&store));

        let outcome = engine
            .update_by_percentage(owner, inv.id, dec!(-25), None, &time)
            .unwrap();
        assert_eq!(outcome.investment.current_balance, Money::from_major(750));
        assert_eq!(outcome.transaction.amount, Money::from_major(-250));

        // a total loss empties the position
        let outcome = engine
            .update_by_percentage(owner, inv.id, dec!(-100), None, &time)
            .unwrap();
        assert!(outcome.investment.current_balance.is_zero());

        // below -100% is rejected before any write
        let err = engine
            .update_by_percentage(owner, inv.id, dec!(-100.5), None, &time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_balance_identity_across_updates() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let inv = variable_investment(&store, owner, 1_000, &time);
        let mut engine = InterestEngine::new(Arc::clone(&store));

        engine.update_by_percentage(owner, inv.id, dec!(10), None, &time).unwrap();
        engine.update_by_balance(owner, inv.id, Money::from_major(900), None, &time).unwrap();
        engine.update_by_percentage(owner, inv.id, dec!(-5), None, &time).unwrap();

        let stored = store.investment(owner, inv.id).unwrap();
        let txns = store.transactions(owner, inv.id).unwrap();
        assert_eq!(stored.expected_balance(&txns), stored.current_balance);
        assert_eq!(stored.current_balance, Money::from_major(855));
    }

    #[test]
    fn test_percentage_of_zero_balance() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let inv = variable_investment(&store, owner, 0, &time);
        let mut engine = InterestEngine::new(Arc::clone(&store));

        // derived percentage is zero when there is no balance to compare to
        let outcome = engine
            .update_by_balance(owner, inv.id, Money::from_major(500), None, &time)
            .unwrap();
        assert_eq!(outcome.transaction.percentage, Some(Decimal::ZERO));
        assert_eq!(outcome.investment.current_balance, Money::from_major(500));
    }

    #[test]
    fn test_rejects_negative_target_and_future_date() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let inv = variable_investment(&store, owner, 1_000, &time);
        let mut engine = InterestEngine::new(Arc::clone(&store));

        let err = engine
            .update_by_balance(owner, inv.id, Money::from_major(-10), None, &time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let tomorrow = time.now() + Duration::days(1);
        let err = engine
            .update_by_percentage(owner, inv.id, dec!(5), Some(tomorrow), &time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::DateInFuture { .. }));

        // backdated entries are allowed
        let yesterday = time.now() - Duration::days(1);
        assert!(engine
            .update_by_percentage(owner, inv.id, dec!(5), Some(yesterday), &time)
            .is_ok());
    }

    #[test]
    fn test_variable_updates_reject_fixed_and_inactive() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let mut engine = InterestEngine::new(Arc::clone(&store));

        let fixed = Investment::fixed(
            owner,
            "bond",
            "USD",
            Money::from_major(1_000),
            Rate::from_percentage(5),
            CompoundingFrequency::Monthly,
            time.now(),
            false,
        );
        let record = fixed.clone();
        store
            .in_transaction(|tx| tx.insert_investment(record.clone()))
            .unwrap();
        let err = engine
            .update_by_percentage(owner, fixed.id, dec!(5), None, &time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::WrongReturnType { .. }));

        let cancelled = variable_investment(&store, owner, 1_000, &time);
        store
            .in_transaction(|tx| {
                let mut inv = tx.investment(owner, cancelled.id)?;
                inv.status = InvestmentStatus::Cancelled;
                tx.update_investment(&mut inv)
            })
            .unwrap();
        let err = engine
            .update_by_percentage(owner, cancelled.id, dec!(5), None, &time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}
