/// time control - drive the scheduler with a test clock, then revert
use std::sync::Arc;

use investment_ledger_rs::chrono::{Duration, TimeZone, Utc};
use investment_ledger_rs::{
    CompoundingFrequency, InterestEngine, InterestSweeper, InvestmentService, MemoryStore, Money,
    OpenInvestment, OpenTerms, Rate, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // start the world on a known date
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let control = time.test_control().expect("test clock");

    let store = Arc::new(MemoryStore::new());
    let owner = Uuid::new_v4();

    let mut investments = InvestmentService::new(Arc::clone(&store));
    let investment = investments.open(
        owner,
        OpenInvestment {
            name: "auto-compounding bond".to_string(),
            category: None,
            currency: "USD".to_string(),
            principal: Money::from_major(50_000),
            terms: OpenTerms::Fixed {
                rate: Rate::from_percentage(6),
                frequency: CompoundingFrequency::Monthly,
                auto_calculate: true,
            },
            start_date: None,
            end_date: None,
        },
        &time,
    )?;

    // three months pass, one sweep per month
    let mut sweeper = InterestSweeper::new(Arc::clone(&store));
    for month in 1..=3 {
        control.advance(Duration::days(31));
        let summary = sweeper.run_once(&time)?;
        let balance = store_balance(&store, owner, investment.id)?;
        println!("month {month}: processed {} -> balance {balance}", summary.processed);
    }

    // the last calculation was premature: undo it
    let mut engine = InterestEngine::new(Arc::clone(&store));
    let reverted = engine.revert_last(owner, investment.id, &time)?;
    println!(
        "reverted {} -> balance {}",
        reverted.calculation.interest_earned.to_display(),
        reverted.investment.current_balance.to_display()
    );

    Ok(())
}

fn store_balance(
    store: &Arc<MemoryStore>,
    owner: investment_ledger_rs::UserId,
    id: investment_ledger_rs::InvestmentId,
) -> Result<investment_ledger_rs::Decimal, Box<dyn std::error::Error>> {
    use investment_ledger_rs::Store;
    Ok(store.investment(owner, id)?.current_balance.to_display())
}
