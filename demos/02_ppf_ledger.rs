/// ppf ledger - fifteen year public provident fund projection
use rust_decimal_macros::dec;
use savings_calc_rs::ppf::uniform_contributions;
use savings_calc_rs::{CalculatorConfig, Money, PpfCalculator, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // defaults can be overridden from json, missing fields keep their defaults
    let config = CalculatorConfig::from_json(r#"{"ppf": {"defaultRate": 7.1}}"#)?;
    let calculator = PpfCalculator::with_config(config.ppf)?;

    // maximum deposit on the first day of every financial year
    let mut contributions = uniform_contributions(2020, 15, Money::from_major(150_000));
    // one year with a different notified rate
    contributions[3].interest_rate = Some(Rate::from_percentage(dec!(7.6)));

    calculator.validate_contributions(&contributions)?;
    let result = calculator.calculate(2020, &contributions);

    println!("{:<12} {:>14} {:>12} {:>12} {:>14}", "year", "opening", "deposit", "interest", "closing");
    for year in &result.yearly_data {
        println!(
            "{:<12} {:>14} {:>12} {:>12} {:>14}",
            year.fy_year,
            year.opening_balance.round_dp(2),
            year.contribution.round_dp(2),
            year.interest.round_dp(2),
            year.closing_balance.round_dp(2)
        );
    }

    println!("\ninvested: {}", result.total_invested.round_dp(2));
    println!("interest: {}", result.total_interest_earned.round_dp(2));
    println!("maturity: {}", result.maturity_amount.round_dp(2));
    println!("return:   {}", result.absolute_return_percentage);

    // deposits above the statutory limit are rejected
    let too_much = uniform_contributions(2020, 1, Money::from_major(200_000));
    if let Err(e) = calculator.validate_contributions(&too_much) {
        println!("\n{}", e);
    }

    Ok(())
}
