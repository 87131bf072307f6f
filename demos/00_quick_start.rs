/// quick start - minimal example to get started
use rust_decimal_macros::dec;
use savings_calc_rs::{calculate_fd_returns, CompoundingFrequency, FdInput, Money, Rate, ToJsonPretty};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ₹1,00,000 fixed deposit at 7% for one year, compounded annually
    let input = FdInput {
        start_date: "2023-04-01".to_string(),
        invested_amount: Money::from_major(100_000),
        rate: Rate::from_percentage(dec!(7)),
        tenure_years: 1,
        tenure_months: 0,
        tenure_days: 0,
        compounding: CompoundingFrequency::Annually,
    };

    let summary = calculate_fd_returns(&input)?;

    // print the summary with its financial-year breakdown
    println!("{}", summary.to_json_pretty()?);

    Ok(())
}
