pub mod compound;
pub mod returns;
pub mod schedule;

pub use compound::{
    compound_interest, future_value_with_contributions, period_interest, CompoundInterest,
    ContributionGrowth, PeriodInterest,
};
pub use returns::{
    annualized_return, portfolio_metrics, return_percentage, AnnualizedReturn, PortfolioMetrics,
    PortfolioStanding, ReturnSummary,
};
pub use schedule::{days_between, next_due_date};
