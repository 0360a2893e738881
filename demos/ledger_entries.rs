/// ledger entries - deposits, withdrawals and a variable return
use std::sync::Arc;

use investment_ledger_rs::{
    InterestEngine, InvestmentService, MemoryStore, Money, NewTransaction, OpenInvestment,
    OpenTerms, Reporter, SafeTimeProvider, TimeSource, TransactionLedger, TransactionType, Uuid,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let store = Arc::new(MemoryStore::new());
    let owner = Uuid::new_v4();

    let mut investments = InvestmentService::new(Arc::clone(&store));
    let fund = investments.open(
        owner,
        OpenInvestment {
            name: "index fund".to_string(),
            category: Some("equities".to_string()),
            currency: "USD".to_string(),
            principal: Money::from_major(5_000),
            terms: OpenTerms::Variable,
            start_date: None,
            end_date: None,
        },
        &time,
    )?;

    // a deposit and a withdrawal through the ledger
    let mut ledger = TransactionLedger::new(Arc::clone(&store));
    ledger.record(
        owner,
        NewTransaction {
            investment_id: fund.id,
            kind: TransactionType::Deposit,
            amount: Money::from_major(1_000),
            transaction_date: None,
            description: "monthly savings".to_string(),
            percentage: None,
        },
        &time,
    )?;
    ledger.record(
        owner,
        NewTransaction {
            investment_id: fund.id,
            kind: TransactionType::Withdrawal,
            amount: Money::from_major(250),
            transaction_date: None,
            description: "rebalancing".to_string(),
            percentage: None,
        },
        &time,
    )?;

    // the fund gained 4.2% this quarter
    let mut engine = InterestEngine::new(Arc::clone(&store));
    let outcome = engine.update_by_percentage(owner, fund.id, dec!(4.2), None, &time)?;
    println!(
        "return {} -> balance {}",
        outcome.transaction.amount.to_display(),
        outcome.investment.current_balance.to_display()
    );

    let reporter = Reporter::new(Arc::clone(&store));
    let summary = reporter.portfolio_summary(owner)?;
    println!(
        "portfolio: invested {} now worth {}",
        summary.metrics.total_invested.to_display(),
        summary.metrics.total_value.to_display()
    );

    Ok(())
}
