use std::sync::Arc;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use log::{info, warn};

use crate::config::{EngineConfig, SweepConfig};
use crate::engine::InterestEngine;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::store::Store;
use crate::types::{CalculationType, InvestmentId};

/// one investment's failure inside a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepError {
    pub investment_id: InvestmentId,
    pub message: String,
}

/// outcome of one scheduler pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<SweepError>,
}

/// periodic trigger that applies due automatic interest calculations.
/// the host process owns the loop; `run_once` is the unit of work and
/// `SweepConfig.interval` says how often to call it.
pub struct InterestSweeper<S> {
    store: Arc<S>,
    config: SweepConfig,
    engine: InterestEngine<S>,
    events: EventStore,
}

impl<S: Store> InterestSweeper<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, SweepConfig::default(), EngineConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: SweepConfig, engine_config: EngineConfig) -> Self {
        let engine = InterestEngine::with_config(Arc::clone(&store), engine_config);
        Self {
            store,
            config,
            engine,
            events: EventStore::new(),
        }
    }

    /// when the host should schedule the next pass
    pub fn next_run_after(&self, completed_at: DateTime<Utc>) -> DateTime<Utc> {
        completed_at + self.config.interval
    }

    /// process every due investment once, isolating per-investment
    /// failures so one bad record never blocks the batch
    pub fn run_once(&mut self, time: &SafeTimeProvider) -> Result<SweepSummary> {
        let now = time.now();
        let mut due = self.store.investments_due(now)?;
        if let Some(limit) = self.config.batch_limit {
            due.truncate(limit);
        }
        info!("interest sweep started: {} investment(s) due", due.len());

        let mut summary = SweepSummary::default();
        for investment in due {
            summary.processed += 1;
            match self.engine.calculate_now(
                investment.owner_id,
                investment.id,
                CalculationType::Automatic,
                time,
            ) {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    info!(
                        "applied {} interest to investment {}",
                        outcome.calculation.interest_earned, investment.id
                    );
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!("investment {} failed in sweep: {err}", investment.id);
                    summary.errors.push(SweepError {
                        investment_id: investment.id,
                        message: err.to_string(),
                    });
                }
            }
        }

        for event in self.engine.take_events() {
            self.events.emit(event);
        }
        self.events.emit(Event::SweepCompleted {
            processed: summary.processed,
            succeeded: summary.succeeded,
            failed: summary.failed,
            timestamp: now,
        });

        info!(
            "interest sweep finished: processed={} succeeded={} failed={}",
            summary.processed, summary.succeeded, summary.failed
        );
        Ok(summary)
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::model::Investment;
    use crate::store::MemoryStore;
    use crate::types::CompoundingFrequency;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;
    use uuid::Uuid;

    fn test_clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn auto_fixed(owner: uuid::Uuid, name: &str, time: &SafeTimeProvider) -> Investment {
        Investment::fixed(
            owner,
            name,
            "USD",
            Money::from_major(10_000),
            Rate::from_percentage(6),
            CompoundingFrequency::Monthly,
            time.now(),
            true,
        )
    }

    #[test]
    fn test_sweep_processes_due_investments() {
        let time = test_clock();
        let control = time.test_control().unwrap();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();

        let a = auto_fixed(owner, "a", &time);
        let b = auto_fixed(owner, "b", &time);
        let (a_rec, b_rec) = (a.clone(), b.clone());
        store
            .in_transaction(|tx| {
                tx.insert_investment(a_rec.clone())?;
                tx.insert_investment(b_rec.clone())
            })
            .unwrap();

        let mut sweeper = InterestSweeper::new(Arc::clone(&store));

        // nothing due yet
        let summary = sweeper.run_once(&time).unwrap();
        assert_eq!(summary, SweepSummary::default());

        control.advance(Duration::days(40));
        let summary = sweeper.run_once(&time).unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);

        for id in [a.id, b.id] {
            let stored = store.investment(owner, id).unwrap();
            assert!(stored.current_balance > Money::from_major(10_000));
            assert_eq!(stored.last_interest_calculated, Some(time.now()));
        }

        // a second pass before the new due dates is a clean no-op
        let summary = sweeper.run_once(&time).unwrap();
        assert_eq!(summary.processed, 0);
    }

    #[test]
    fn test_sweep_isolates_failures() {
        let time = test_clock();
        let control = time.test_control().unwrap();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();

        let a = auto_fixed(owner, "a", &time);
        // b is corrupt: fixed and auto-calculating but with no rate
        let mut b = auto_fixed(owner, "b", &time);
        b.interest_rate = None;
        let c = auto_fixed(owner, "c", &time);

        // deterministic order: due dates one minute apart
        let mut records = [a.clone(), b.clone(), c.clone()];
        for (i, record) in records.iter_mut().enumerate() {
            record.next_interest_due = Some(time.now() + Duration::minutes(i as i64));
        }
        store
            .in_transaction(|tx| {
                for record in &records {
                    tx.insert_investment(record.clone())?;
                }
                Ok(())
            })
            .unwrap();

        control.advance(Duration::days(31));
        let mut sweeper = InterestSweeper::new(Arc::clone(&store));
        let summary = sweeper.run_once(&time).unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].investment_id, b.id);

        // the healthy neighbours were both updated
        assert!(store.investment(owner, a.id).unwrap().current_balance > Money::from_major(10_000));
        assert!(store.investment(owner, c.id).unwrap().current_balance > Money::from_major(10_000));
        assert_eq!(
            store.investment(owner, b.id).unwrap().current_balance,
            Money::from_major(10_000)
        );
    }

    #[test]
    fn test_sweep_respects_batch_limit() {
        let time = test_clock();
        let control = time.test_control().unwrap();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();

        for name in ["a", "b", "c"] {
            let record = auto_fixed(owner, name, &time);
            store
                .in_transaction(|tx| tx.insert_investment(record.clone()))
                .unwrap();
        }

        control.advance(Duration::days(40));
        let config = SweepConfig {
            batch_limit: Some(2),
            ..SweepConfig::default()
        };
        let mut sweeper =
            InterestSweeper::with_config(Arc::clone(&store), config, EngineConfig::default());

        let summary = sweeper.run_once(&time).unwrap();
        assert_eq!(summary.processed, 2);

        // the rest picked up on the next pass
        let summary = sweeper.run_once(&time).unwrap();
        assert_eq!(summary.processed, 1);
    }

    #[test]
    fn test_sweep_emits_summary_event() {
        let time = test_clock();
        let control = time.test_control().unwrap();
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let record = auto_fixed(owner, "a", &time);
        store
            .in_transaction(|tx| tx.insert_investment(record.clone()))
            .unwrap();

        control.advance(Duration::days(31));
        let mut sweeper = InterestSweeper::new(Arc::clone(&store));
        sweeper.run_once(&time).unwrap();

        let events = sweeper.take_events();
        assert!(matches!(events.first(), Some(Event::InterestCalculated { .. })));
        assert!(matches!(
            events.last(),
            Some(Event::SweepCompleted { processed: 1, succeeded: 1, failed: 0, .. })
        ));
    }

    #[test]
    fn test_next_run_after_uses_interval() {
        let store = Arc::new(MemoryStore::new());
        let sweeper = InterestSweeper::new(store);
        let done = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(
            sweeper.next_run_after(done),
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap()
        );
    }
}
