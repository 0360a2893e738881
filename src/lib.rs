pub mod calc;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod investments;
pub mod ledger;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod types;
pub mod view;

// re-export key types
pub use config::{EngineConfig, SweepConfig};
pub use decimal::{Money, Rate};
pub use engine::{
    CalculationOutcome, InterestEngine, PeriodPreview, RevertOutcome, VariableOutcome,
};
pub use errors::{ErrorKind, LedgerError, Result};
pub use events::{Event, EventStore};
pub use investments::{InvestmentService, OpenInvestment, OpenTerms};
pub use ledger::{NewTransaction, TransactionAmendment, TransactionLedger};
pub use model::{InterestCalculation, Investment, Transaction};
pub use report::{InvestmentPerformance, PortfolioSummary, Reporter};
pub use scheduler::{InterestSweeper, SweepError, SweepSummary};
pub use store::{MemoryStore, Store, StoreWriter};
pub use types::{
    CalculationId, CalculationType, CompoundingFrequency, InvestmentId, InvestmentStatus,
    ReturnType, TransactionId, TransactionType, UserId,
};
pub use view::{InvestmentView, StatementLine};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
