/// quick start - open a fixed investment and apply interest
use std::sync::Arc;

use investment_ledger_rs::{
    CalculationType, CompoundingFrequency, InterestEngine, InvestmentService, MemoryStore, Money,
    OpenInvestment, OpenTerms, Rate, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let store = Arc::new(MemoryStore::new());
    let owner = Uuid::new_v4();

    // open a $10,000 certificate at 5% compounded monthly
    let mut investments = InvestmentService::new(Arc::clone(&store));
    let investment = investments.open(
        owner,
        OpenInvestment {
            name: "12-month certificate".to_string(),
            category: Some("savings".to_string()),
            currency: "USD".to_string(),
            principal: Money::from_major(10_000),
            terms: OpenTerms::Fixed {
                rate: Rate::from_percentage(5),
                frequency: CompoundingFrequency::Monthly,
                auto_calculate: true,
            },
            start_date: Some(time.now() - investment_ledger_rs::chrono::Duration::days(31)),
            end_date: None,
        },
        &time,
    )?;

    println!("opened {} with balance {}", investment.name, investment.current_balance);

    // preview the pending period, then apply it
    let mut engine = InterestEngine::new(Arc::clone(&store));
    let preview = engine.preview(owner, investment.id, &time)?;
    println!(
        "{} day(s) pending, interest {}",
        preview.period_days,
        preview.interest.to_display()
    );

    let outcome = engine.calculate_now(owner, investment.id, CalculationType::Manual, &time)?;
    println!(
        "applied {} -> new balance {}",
        outcome.calculation.interest_earned.to_display(),
        outcome.investment.current_balance.to_display()
    );

    Ok(())
}
