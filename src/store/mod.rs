pub mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::model::{InterestCalculation, Investment, Transaction};
use crate::types::{InvestmentId, TransactionId, UserId};

/// within-transaction view of the store. reads observe staged writes;
/// every mutation is discarded unless the whole unit returns `Ok`.
pub trait StoreWriter {
    fn investment(&self, owner: UserId, id: InvestmentId) -> Result<Investment>;
    fn insert_investment(&mut self, investment: Investment) -> Result<()>;
    /// persists the record and bumps its version. fails with a conflict
    /// when the stored version no longer matches the one read.
    fn update_investment(&mut self, investment: &mut Investment) -> Result<()>;

    fn transaction(&self, owner: UserId, id: TransactionId) -> Result<Transaction>;
    fn transactions(&self, owner: UserId, investment: InvestmentId) -> Result<Vec<Transaction>>;
    fn insert_transaction(&mut self, transaction: Transaction) -> Result<()>;
    fn update_transaction(&mut self, transaction: &Transaction) -> Result<()>;
    fn delete_transaction(&mut self, id: TransactionId) -> Result<()>;

    fn insert_calculation(&mut self, calculation: InterestCalculation) -> Result<()>;
    fn update_calculation(&mut self, calculation: &InterestCalculation) -> Result<()>;
    /// most recent non-reverted calculation, by `calculated_at` descending
    fn latest_calculation(&self, investment: InvestmentId) -> Result<Option<InterestCalculation>>;
    /// most recent non-reverted calculation strictly before `before`
    fn calculation_before(
        &self,
        investment: InvestmentId,
        before: DateTime<Utc>,
    ) -> Result<Option<InterestCalculation>>;
}

/// persistence contract for the engine, ledger and scheduler.
///
/// every read is ownership-scoped: a record that exists but belongs to a
/// different owner surfaces as the same not-found error as one that does
/// not exist at all. `in_transaction` is the atomic all-or-nothing unit
/// every mutating sequence wraps.
pub trait Store: Send + Sync {
    fn in_transaction<T>(&self, f: impl FnOnce(&mut dyn StoreWriter) -> Result<T>) -> Result<T>
    where
        Self: Sized;

    fn investment(&self, owner: UserId, id: InvestmentId) -> Result<Investment>;
    fn list_investments(&self, owner: UserId) -> Result<Vec<Investment>>;
    fn transaction(&self, owner: UserId, id: TransactionId) -> Result<Transaction>;
    fn transactions(&self, owner: UserId, investment: InvestmentId) -> Result<Vec<Transaction>>;
    fn calculations(
        &self,
        owner: UserId,
        investment: InvestmentId,
    ) -> Result<Vec<InterestCalculation>>;
    fn latest_calculation(
        &self,
        owner: UserId,
        investment: InvestmentId,
    ) -> Result<Option<InterestCalculation>>;
    /// fixed, auto-calculating, active investments whose due date has passed
    fn investments_due(&self, now: DateTime<Utc>) -> Result<Vec<Investment>>;
}
