use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calc::{
    annualized_return, days_between, portfolio_metrics, return_percentage, AnnualizedReturn,
    PortfolioMetrics, ReturnSummary,
};
use crate::decimal::Money;
use crate::errors::Result;
use crate::model::Investment;
use crate::store::Store;
use crate::types::{InvestmentId, InvestmentStatus, UserId};

/// aggregate portfolio view for one owner
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub metrics: PortfolioMetrics,
    pub investment_count: usize,
    pub active_count: usize,
}

/// per-investment performance view
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentPerformance {
    pub investment_id: InvestmentId,
    pub name: String,
    pub initial_amount: Money,
    pub current_balance: Money,
    pub returns: ReturnSummary,
    /// present once the holding period is long enough to annualize
    pub annualized: Option<AnnualizedReturn>,
    pub transaction_count: usize,
    pub calculation_count: usize,
}

/// read-side queries over already-consistent data
pub struct Reporter<S> {
    store: Arc<S>,
}

impl<S: Store> Reporter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn portfolio_summary(&self, owner: UserId) -> Result<PortfolioSummary> {
        let investments = self.store.list_investments(owner)?;
        let active_count = investments
            .iter()
            .filter(|inv| inv.status == InvestmentStatus::Active)
            .count();

        Ok(PortfolioSummary {
            metrics: portfolio_metrics(&investments),
            investment_count: investments.len(),
            active_count,
        })
    }

    pub fn investment_performance(
        &self,
        owner: UserId,
        id: InvestmentId,
        as_of: DateTime<Utc>,
    ) -> Result<InvestmentPerformance> {
        let investment = self.store.investment(owner, id)?;
        let transactions = self.store.transactions(owner, id)?;
        let calculations = self.store.calculations(owner, id)?;

        let returns = return_percentage(investment.initial_amount, investment.current_balance)?;
        let annualized = holding_years(&investment, as_of)
            .and_then(|years| {
                annualized_return(investment.initial_amount, investment.current_balance, years).ok()
            });

        Ok(InvestmentPerformance {
            investment_id: investment.id,
            name: investment.name.clone(),
            initial_amount: investment.initial_amount,
            current_balance: investment.current_balance,
            returns,
            annualized,
            transaction_count: transactions.len(),
            calculation_count: calculations.len(),
        })
    }
}

/// holding period in years, none until at least one full day elapsed
fn holding_years(investment: &Investment, as_of: DateTime<Utc>) -> Option<Decimal> {
    let end = investment.end_date.unwrap_or(as_of);
    let days = days_between(investment.start_date, end);
    if days <= 0 {
        return None;
    }
    Some(Decimal::from(days) / dec!(365.25))
}
