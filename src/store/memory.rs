use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::errors::{LedgerError, Result};
use crate::model::{InterestCalculation, Investment, Transaction};
use crate::store::{Store, StoreWriter};
use crate::types::{InvestmentId, InvestmentStatus, ReturnType, TransactionId, UserId};

/// the three record shelves, cloned wholesale for transaction staging
#[derive(Debug, Clone, Default)]
struct Shelves {
    investments: HashMap<InvestmentId, Investment>,
    transactions: HashMap<TransactionId, Transaction>,
    calculations: HashMap<InvestmentId, Vec<InterestCalculation>>,
}

impl Shelves {
    fn investment(&self, owner: UserId, id: InvestmentId) -> Result<Investment> {
        self.investments
            .get(&id)
            .filter(|inv| inv.owner_id == owner)
            .cloned()
            .ok_or(LedgerError::InvestmentNotFound { id })
    }

    fn transaction(&self, owner: UserId, id: TransactionId) -> Result<Transaction> {
        let txn = self
            .transactions
            .get(&id)
            .ok_or(LedgerError::TransactionNotFound { id })?;
        // ownership goes through the owning investment
        self.investment(owner, txn.investment_id)
            .map_err(|_| LedgerError::TransactionNotFound { id })?;
        Ok(txn.clone())
    }

    fn transactions_for(&self, owner: UserId, investment: InvestmentId) -> Result<Vec<Transaction>> {
        self.investment(owner, investment)?;
        let mut rows: Vec<Transaction> = self
            .transactions
            .values()
            .filter(|t| t.investment_id == investment)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.transaction_date, t.id));
        Ok(rows)
    }

    fn calculation_rows(&self, investment: InvestmentId) -> &[InterestCalculation] {
        self.calculations
            .get(&investment)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn latest_calculation(&self, investment: InvestmentId) -> Option<InterestCalculation> {
        self.calculation_rows(investment)
            .iter()
            .filter(|c| !c.is_reverted)
            .max_by_key(|c| c.calculated_at)
            .cloned()
    }

    fn calculation_before(
        &self,
        investment: InvestmentId,
        before: DateTime<Utc>,
    ) -> Option<InterestCalculation> {
        self.calculation_rows(investment)
            .iter()
            .filter(|c| !c.is_reverted && c.calculated_at < before)
            .max_by_key(|c| c.calculated_at)
            .cloned()
    }
}

/// in-memory store. one mutex serializes atomic units, and each unit
/// stages on a copy of the shelves, so an `Err` from the closure
/// discards every write made inside it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Shelves>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::MutexGuard<'_, Shelves> {
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

struct MemoryWriter {
    staged: Shelves,
}

impl StoreWriter for MemoryWriter {
    fn investment(&self, owner: UserId, id: InvestmentId) -> Result<Investment> {
        self.staged.investment(owner, id)
    }

    fn insert_investment(&mut self, investment: Investment) -> Result<()> {
        if self.staged.investments.contains_key(&investment.id) {
            return Err(LedgerError::DuplicateRecord {
                message: format!("investment {}", investment.id),
            });
        }
        self.staged.investments.insert(investment.id, investment);
        Ok(())
    }

    fn update_investment(&mut self, investment: &mut Investment) -> Result<()> {
        let stored = self
            .staged
            .investments
            .get(&investment.id)
            .ok_or(LedgerError::InvestmentNotFound { id: investment.id })?;
        if stored.version != investment.version {
            return Err(LedgerError::StaleVersion {
                stored: stored.version,
                given: investment.version,
            });
        }
        investment.version += 1;
        self.staged.investments.insert(investment.id, investment.clone());
        Ok(())
    }

    fn transaction(&self, owner: UserId, id: TransactionId) -> Result<Transaction> {
        self.staged.transaction(owner, id)
    }

    fn transactions(&self, owner: UserId, investment: InvestmentId) -> Result<Vec<Transaction>> {
        self.staged.transactions_for(owner, investment)
    }

    fn insert_transaction(&mut self, transaction: Transaction) -> Result<()> {
        if !self.staged.investments.contains_key(&transaction.investment_id) {
            return Err(LedgerError::InvestmentNotFound {
                id: transaction.investment_id,
            });
        }
        if self.staged.transactions.contains_key(&transaction.id) {
            return Err(LedgerError::DuplicateRecord {
                message: format!("transaction {}", transaction.id),
            });
        }
        self.staged.transactions.insert(transaction.id, transaction);
        Ok(())
    }

    fn update_transaction(&mut self, transaction: &Transaction) -> Result<()> {
        if !self.staged.transactions.contains_key(&transaction.id) {
            return Err(LedgerError::TransactionNotFound { id: transaction.id });
        }
        self.staged
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(())
    }

    fn delete_transaction(&mut self, id: TransactionId) -> Result<()> {
        self.staged
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::TransactionNotFound { id })
    }

    fn insert_calculation(&mut self, calculation: InterestCalculation) -> Result<()> {
        let rows = self
            .staged
            .calculations
            .entry(calculation.investment_id)
            .or_default();
        if rows.iter().any(|c| c.id == calculation.id) {
            return Err(LedgerError::DuplicateRecord {
                message: format!("calculation {}", calculation.id),
            });
        }
        rows.push(calculation);
        Ok(())
    }

    fn update_calculation(&mut self, calculation: &InterestCalculation) -> Result<()> {
        let rows = self
            .staged
            .calculations
            .entry(calculation.investment_id)
            .or_default();
        match rows.iter_mut().find(|c| c.id == calculation.id) {
            Some(slot) => {
                *slot = calculation.clone();
                Ok(())
            }
            None => Err(LedgerError::CalculationNotFound { id: calculation.id }),
        }
    }

    fn latest_calculation(&self, investment: InvestmentId) -> Result<Option<InterestCalculation>> {
        Ok(self.staged.latest_calculation(investment))
    }

    fn calculation_before(
        &self,
        investment: InvestmentId,
        before: DateTime<Utc>,
    ) -> Result<Option<InterestCalculation>> {
        Ok(self.staged.calculation_before(investment, before))
    }
}

impl Store for MemoryStore {
    fn in_transaction<T>(&self, f: impl FnOnce(&mut dyn StoreWriter) -> Result<T>) -> Result<T> {
        let mut guard = self.read();
        let mut writer = MemoryWriter {
            staged: guard.clone(),
        };
        match f(&mut writer) {
            Ok(out) => {
                *guard = writer.staged;
                Ok(out)
            }
            Err(err) => {
                log::debug!("store transaction rolled back: {err}");
                Err(err)
            }
        }
    }

    fn investment(&self, owner: UserId, id: InvestmentId) -> Result<Investment> {
        self.read().investment(owner, id)
    }

    fn list_investments(&self, owner: UserId) -> Result<Vec<Investment>> {
        let mut rows: Vec<Investment> = self
            .read()
            .investments
            .values()
            .filter(|inv| inv.owner_id == owner)
            .cloned()
            .collect();
        rows.sort_by_key(|inv| (inv.start_date, inv.id));
        Ok(rows)
    }

    fn transaction(&self, owner: UserId, id: TransactionId) -> Result<Transaction> {
        self.read().transaction(owner, id)
    }

    fn transactions(&self, owner: UserId, investment: InvestmentId) -> Result<Vec<Transaction>> {
        self.read().transactions_for(owner, investment)
    }

    fn calculations(
        &self,
        owner: UserId,
        investment: InvestmentId,
    ) -> Result<Vec<InterestCalculation>> {
        let shelves = self.read();
        shelves.investment(owner, investment)?;
        let mut rows = shelves.calculation_rows(investment).to_vec();
        rows.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));
        Ok(rows)
    }

    fn latest_calculation(
        &self,
        owner: UserId,
        investment: InvestmentId,
    ) -> Result<Option<InterestCalculation>> {
        let shelves = self.read();
        shelves.investment(owner, investment)?;
        Ok(shelves.latest_calculation(investment))
    }

    fn investments_due(&self, now: DateTime<Utc>) -> Result<Vec<Investment>> {
        let mut due: Vec<Investment> = self
            .read()
            .investments
            .values()
            .filter(|inv| {
                inv.return_type == ReturnType::Fixed
                    && inv.auto_calculate_interest
                    && inv.status == InvestmentStatus::Active
                    && inv.next_interest_due.is_some_and(|d| d <= now)
            })
            .cloned()
            .collect();
        due.sort_by_key(|inv| (inv.next_interest_due, inv.id));
        Ok(due)
    }
}
