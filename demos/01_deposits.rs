/// deposits - fixed and recurring deposits with per financial year interest
use rust_decimal_macros::dec;
use savings_calc_rs::{
    calculate_fd_returns, calculate_rd_returns, CompoundingFrequency, FdInput, Money, Rate, RdInput,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== fixed deposit ===\n");

    for compounding in [
        CompoundingFrequency::Annually,
        CompoundingFrequency::HalfYearly,
        CompoundingFrequency::Quarterly,
        CompoundingFrequency::Monthly,
    ] {
        let fd = FdInput {
            start_date: "2022-09-15".to_string(),
            invested_amount: Money::from_major(250_000),
            rate: Rate::from_percentage(dec!(7.25)),
            tenure_years: 3,
            tenure_months: 5,
            tenure_days: 10,
            compounding,
        };
        let summary = calculate_fd_returns(&fd)?;
        println!(
            "{:?}: maturity {} (interest {})",
            compounding,
            summary.maturity_amount.round_dp(2),
            summary.total_interest_earned.round_dp(2)
        );
    }

    let fd = FdInput {
        start_date: "2022-09-15".to_string(),
        invested_amount: Money::from_major(250_000),
        rate: Rate::from_percentage(dec!(7.25)),
        tenure_years: 3,
        tenure_months: 5,
        tenure_days: 10,
        compounding: CompoundingFrequency::Quarterly,
    };
    println!("\nquarterly breakdown:");
    for fy in calculate_fd_returns(&fd)?.fy_data {
        println!(
            "  {}: {} -> {} (+{})",
            fy.fy_year,
            fy.start_balance.round_dp(2),
            fy.end_balance.round_dp(2),
            fy.interest_earned.round_dp(2)
        );
    }

    println!("\n=== recurring deposit ===\n");

    let rd = RdInput {
        start_date: "2023-10-15".to_string(),
        monthly_installment: Money::from_major(5_000),
        rate: Rate::from_percentage(dec!(7)),
        tenure_years: 2,
        tenure_months: 0,
    };
    let summary = calculate_rd_returns(&rd)?;
    for fy in &summary.fy_data {
        println!(
            "  {}: deposited {} interest {} closing {}",
            fy.fy_year,
            fy.contribution.unwrap_or(Money::ZERO).round_dp(2),
            fy.interest_earned.round_dp(2),
            fy.end_balance.round_dp(2)
        );
    }
    println!("maturity: {}", summary.maturity_amount.round_dp(2));

    // malformed dates are rejected rather than producing garbage
    let bad = RdInput { start_date: "15/10/2023".to_string(), ..rd };
    match calculate_rd_returns(&bad) {
        Ok(_) => println!("unexpectedly accepted"),
        Err(e) => println!("\nrejected: {}", e),
    }

    Ok(())
}
