use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;

use crate::calc::{days_between, next_due_date, period_interest};
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::events::Event;
use crate::model::{InterestCalculation, Investment, Transaction};
use crate::store::Store;
use crate::types::{
    CalculationType, CompoundingFrequency, InvestmentId, ReturnType, TransactionId,
    TransactionType, UserId,
};

use super::InterestEngine;

/// everything written by one applied calculation
#[derive(Debug, Clone)]
pub struct CalculationOutcome {
    pub calculation: InterestCalculation,
    pub transaction: Transaction,
    pub investment: Investment,
}

/// what-if view of the pending period, nothing persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodPreview {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub period_days: i64,
    pub interest: Money,
    pub new_balance: Money,
    pub effective_rate: Rate,
}

/// result of undoing the most recent calculation
#[derive(Debug, Clone)]
pub struct RevertOutcome {
    pub calculation: InterestCalculation,
    pub investment: Investment,
    pub removed_transaction: Option<TransactionId>,
}

impl<S: Store> InterestEngine<S> {
    /// apply interest for the period since the last calculation (or the
    /// start date) up to now. writes the return transaction, the audit
    /// row and the investment update as one unit.
    pub fn calculate_now(
        &mut self,
        owner: UserId,
        id: InvestmentId,
        calculation_type: CalculationType,
        time: &SafeTimeProvider,
    ) -> Result<CalculationOutcome> {
        let now = time.now();
        let default_freq = self.config.default_compounding;

        let outcome = self.store.in_transaction(|tx| {
            let mut inv = tx.investment(owner, id)?;
            inv.ensure_return_type(ReturnType::Fixed)?;
            inv.ensure_active()?;
            let rate = inv.require_rate()?;

            let period_start = inv.period_start();
            let days = days_between(period_start, now);
            if days <= 0 {
                return Err(LedgerError::NoNewPeriod { since: period_start });
            }

            let freq = inv.effective_frequency(default_freq);
            let period = period_interest(inv.current_balance, rate, freq, days)?;

            let transaction = Transaction::new(
                inv.id,
                TransactionType::Return,
                period.interest,
                period.new_balance,
                now,
                format!("interest for {days} day(s)"),
            )
            .with_percentage(period.effective_rate.as_percent());
            tx.insert_transaction(transaction.clone())?;

            let calculation = InterestCalculation::new(
                inv.id,
                calculation_type,
                now,
                period_start,
                now,
                inv.current_balance,
                rate,
                period.interest,
                period.new_balance,
                transaction.id,
            );
            tx.insert_calculation(calculation.clone())?;

            inv.current_balance = period.new_balance;
            inv.last_interest_calculated = Some(now);
            inv.next_interest_due = Some(next_due_date(now, freq));
            tx.update_investment(&mut inv)?;

            Ok(CalculationOutcome {
                calculation,
                transaction,
                investment: inv,
            })
        })?;

        self.events.emit(Event::InterestCalculated {
            investment_id: outcome.investment.id,
            calculation_id: outcome.calculation.id,
            period_days: days_between(outcome.calculation.period_start, now),
            interest: outcome.calculation.interest_earned,
            new_balance: outcome.calculation.new_balance,
            timestamp: now,
        });

        Ok(outcome)
    }

    /// recompute the pending period without persisting anything
    pub fn preview(
        &self,
        owner: UserId,
        id: InvestmentId,
        time: &SafeTimeProvider,
    ) -> Result<PeriodPreview> {
        let now = time.now();

        let inv = self.store.investment(owner, id)?;
        inv.ensure_return_type(ReturnType::Fixed)?;
        inv.ensure_active()?;
        let rate = inv.require_rate()?;

        let period_start = inv.period_start();
        let days = days_between(period_start, now);
        if days <= 0 {
            return Err(LedgerError::NoNewPeriod { since: period_start });
        }

        let freq = inv.effective_frequency(self.config.default_compounding);
        let period = period_interest(inv.current_balance, rate, freq, days)?;

        Ok(PeriodPreview {
            period_start,
            period_end: now,
            period_days: days,
            interest: period.interest,
            new_balance: period.new_balance,
            effective_rate: period.effective_rate,
        })
    }

    /// undo the most recent non-reverted calculation: mark it reverted,
    /// delete its return transaction, restore the balance and roll the
    /// schedule back to the calculation before it. single-level undo:
    /// reverting again needs another prior calculation.
    pub fn revert_last(
        &mut self,
        owner: UserId,
        id: InvestmentId,
        time: &SafeTimeProvider,
    ) -> Result<RevertOutcome> {
        let now = time.now();
        let default_freq = self.config.default_compounding;

        let outcome = self.store.in_transaction(|tx| {
            let mut inv = tx.investment(owner, id)?;
            inv.ensure_return_type(ReturnType::Fixed)?;
            inv.ensure_mutable()?;

            let mut calculation = tx
                .latest_calculation(inv.id)?
                .ok_or(LedgerError::NothingToRevert)?;

            let restored = inv.current_balance - calculation.interest_earned;
            if restored.is_negative() {
                return Err(LedgerError::NegativeBalance {
                    balance: inv.current_balance,
                    change: -calculation.interest_earned,
                });
            }

            let removed_transaction = calculation.transaction_id;
            if let Some(txn_id) = removed_transaction {
                tx.delete_transaction(txn_id)?;
            }
            calculation.mark_reverted(now, owner);
            tx.update_calculation(&calculation)?;

            let freq = inv.effective_frequency(default_freq);
            match tx.calculation_before(inv.id, calculation.calculated_at)? {
                Some(prior) => {
                    inv.last_interest_calculated = Some(prior.calculated_at);
                    inv.next_interest_due = Some(next_due_date(prior.calculated_at, freq));
                }
                None => {
                    inv.last_interest_calculated = None;
                    inv.next_interest_due = Some(next_due_date(now, freq));
                }
            }
            inv.current_balance = restored;
            tx.update_investment(&mut inv)?;

            Ok(RevertOutcome {
                calculation,
                investment: inv,
                removed_transaction,
            })
        })?;

        self.events.emit(Event::CalculationReverted {
            investment_id: outcome.investment.id,
            calculation_id: outcome.calculation.id,
            amount_reversed: outcome.calculation.interest_earned,
            restored_balance: outcome.investment.current_balance,
            timestamp: now,
        });

        Ok(outcome)
    }

    /// update the auto-calculation flag and compounding frequency.
    /// no balance effect; the due date is seeded only when enabling
    /// auto-calculation on an investment that never had one.
    pub fn update_schedule(
        &mut self,
        owner: UserId,
        id: InvestmentId,
        auto_calculate: bool,
        frequency: Option<CompoundingFrequency>,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        let now = time.now();
        let default_freq = self.config.default_compounding;

        let investment = self.store.in_transaction(|tx| {
            let mut inv = tx.investment(owner, id)?;
            inv.ensure_return_type(ReturnType::Fixed)?;
            inv.ensure_mutable()?;

            inv.auto_calculate_interest = auto_calculate;
            if let Some(freq) = frequency {
                inv.compounding_frequency = Some(freq);
            }
            if auto_calculate && inv.next_interest_due.is_none() {
                let freq = inv.effective_frequency(default_freq);
                inv.next_interest_due = Some(next_due_date(inv.period_start(), freq));
            }
            tx.update_investment(&mut inv)?;
            Ok(inv)
        })?;

        self.events.emit(Event::ScheduleUpdated {
            investment_id: investment.id,
            auto_calculate,
            frequency,
            timestamp: now,
        });

        Ok(investment)
    }
}
