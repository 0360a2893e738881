pub mod fixed;
pub mod variable;

pub use fixed::{CalculationOutcome, PeriodPreview, RevertOutcome};
pub use variable::VariableOutcome;

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::events::{Event, EventStore};
use crate::store::Store;

/// orchestrates fetch-validate-compute-persist for interest and return
/// application. every mutating operation runs inside one atomic store
/// unit; preconditions fail with zero writes.
pub struct InterestEngine<S> {
    pub(crate) store: Arc<S>,
    pub(crate) config: EngineConfig,
    pub(crate) events: EventStore,
}

impl<S: Store> InterestEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            events: EventStore::new(),
        }
    }

    /// drain events emitted since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
