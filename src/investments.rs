use std::sync::Arc;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::model::Investment;
use crate::store::Store;
use crate::types::{CompoundingFrequency, InvestmentId, InvestmentStatus, UserId};

/// terms for a new investment
#[derive(Debug, Clone)]
pub enum OpenTerms {
    Fixed {
        rate: Rate,
        frequency: CompoundingFrequency,
        auto_calculate: bool,
    },
    Variable,
}

/// everything needed to open an investment
#[derive(Debug, Clone)]
pub struct OpenInvestment {
    pub name: String,
    pub category: Option<String>,
    pub currency: String,
    pub principal: Money,
    pub terms: OpenTerms,
    /// defaults to now
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// lifecycle operations on investments: open, complete, cancel, read.
/// investments are never hard-deleted; cancellation is terminal.
pub struct InvestmentService<S> {
    store: Arc<S>,
    events: EventStore,
}

impl<S: Store> InvestmentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            events: EventStore::new(),
        }
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// open a new investment with its balance set to the principal
    pub fn open(
        &mut self,
        owner: UserId,
        request: OpenInvestment,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        let now = time.now();
        if !request.principal.is_positive() {
            return Err(LedgerError::InvalidAmount {
                amount: request.principal,
            });
        }
        let start = request.start_date.unwrap_or(now);

        let mut investment = match request.terms {
            OpenTerms::Fixed {
                rate,
                frequency,
                auto_calculate,
            } => {
                if rate.is_negative() {
                    return Err(LedgerError::InvalidRate { rate });
                }
                Investment::fixed(
                    owner,
                    request.name,
                    request.currency,
                    request.principal,
                    rate,
                    frequency,
                    start,
                    auto_calculate,
                )
            }
            OpenTerms::Variable => {
                Investment::variable(owner, request.name, request.currency, request.principal, start)
            }
        };
        investment.category = request.category;
        investment.end_date = request.end_date;

        let record = investment.clone();
        self.store
            .in_transaction(move |tx| tx.insert_investment(record))?;

        self.events.emit(Event::InvestmentOpened {
            investment_id: investment.id,
            owner_id: owner,
            principal: investment.initial_amount,
            timestamp: now,
        });

        Ok(investment)
    }

    /// close out an investment that ran to its end
    pub fn complete(
        &mut self,
        owner: UserId,
        id: InvestmentId,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        self.transition(owner, id, InvestmentStatus::Completed, time)
    }

    /// cancel an investment. terminal: every later mutation is rejected.
    pub fn cancel(
        &mut self,
        owner: UserId,
        id: InvestmentId,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        self.transition(owner, id, InvestmentStatus::Cancelled, time)
    }

    fn transition(
        &mut self,
        owner: UserId,
        id: InvestmentId,
        new_status: InvestmentStatus,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        let now = time.now();

        let (investment, old_status) = self.store.in_transaction(|tx| {
            let mut inv = tx.investment(owner, id)?;
            inv.ensure_active()?;
            let old_status = inv.status;
            inv.status = new_status;
            inv.end_date = Some(now);
            if new_status == InvestmentStatus::Cancelled {
                inv.auto_calculate_interest = false;
                inv.next_interest_due = None;
            }
            tx.update_investment(&mut inv)?;
            Ok((inv, old_status))
        })?;

        self.events.emit(Event::InvestmentStatusChanged {
            investment_id: investment.id,
            old_status,
            new_status,
            timestamp: now,
        });

        Ok(investment)
    }

    pub fn get(&self, owner: UserId, id: InvestmentId) -> Result<Investment> {
        self.store.investment(owner, id)
    }

    pub fn list(&self, owner: UserId) -> Result<Vec<Investment>> {
        self.store.list_investments(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::store::MemoryStore;
    use crate::types::ReturnType;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn test_clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn fixed_request() -> OpenInvestment {
        OpenInvestment {
            name: "5y bond".to_string(),
            category: Some("bonds".to_string()),
            currency: "USD".to_string(),
            principal: Money::from_major(10_000),
            terms: OpenTerms::Fixed {
                rate: Rate::from_percent(dec!(4.5)),
                frequency: CompoundingFrequency::Quarterly,
                auto_calculate: true,
            },
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_open_fixed() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let mut service = InvestmentService::new(Arc::clone(&store));
        let owner = Uuid::new_v4();

        let inv = service.open(owner, fixed_request(), &time).unwrap();

        assert_eq!(inv.return_type, ReturnType::Fixed);
        assert_eq!(inv.current_balance, inv.initial_amount);
        assert_eq!(inv.interest_rate, Some(Rate::from_percent(dec!(4.5))));
        assert!(inv.next_interest_due.is_some());
        assert_eq!(inv.category.as_deref(), Some("bonds"));

        assert_eq!(service.get(owner, inv.id).unwrap().id, inv.id);
        assert_eq!(service.list(owner).unwrap().len(), 1);
    }

    #[test]
    fn test_open_validates_principal() {
        let time = test_clock();
        let mut service = InvestmentService::new(Arc::new(MemoryStore::new()));
        let owner = Uuid::new_v4();

        let mut request = fixed_request();
        request.principal = Money::ZERO;
        let err = service.open(owner, request, &time).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_cancel_is_terminal() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let mut service = InvestmentService::new(Arc::clone(&store));
        let owner = Uuid::new_v4();

        let inv = service.open(owner, fixed_request(), &time).unwrap();
        let cancelled = service.cancel(owner, inv.id, &time).unwrap();

        assert_eq!(cancelled.status, InvestmentStatus::Cancelled);
        assert!(!cancelled.auto_calculate_interest);
        assert!(cancelled.next_interest_due.is_none());
        assert_eq!(cancelled.end_date, Some(time.now()));

        // no coming back
        let err = service.complete(owner, inv.id, &time).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = service.cancel(owner, inv.id, &time).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_complete_marks_end() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let mut service = InvestmentService::new(Arc::clone(&store));
        let owner = Uuid::new_v4();

        let inv = service.open(owner, fixed_request(), &time).unwrap();
        let completed = service.complete(owner, inv.id, &time).unwrap();
        assert_eq!(completed.status, InvestmentStatus::Completed);
        assert_eq!(completed.end_date, Some(time.now()));
    }

    #[test]
    fn test_listing_is_owner_scoped() {
        let time = test_clock();
        let store = Arc::new(MemoryStore::new());
        let mut service = InvestmentService::new(Arc::clone(&store));
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let inv = service.open(owner, fixed_request(), &time).unwrap();

        assert!(service.list(other).unwrap().is_empty());
        assert_eq!(service.get(other, inv.id).unwrap_err().kind(), ErrorKind::NotFound);
    }
}
