/// time control - deterministic "today" for sips and trailing returns
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use savings_calc_rs::investments::calculate_investment_value;
use savings_calc_rs::{
    calculate_timeframe_returns, Money, NavHistory, NavPoint, SafeTimeProvider, Timeframe, TimeSource,
    UserInvestment,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    // create controlled time for testing
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let history = NavHistory::new(vec![
        NavPoint { date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), nav: dec!(10.00) },
        NavPoint { date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), nav: dec!(12.00) },
    ]);

    let sip = UserInvestment::sip(
        1,
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        Money::from_major(1_000),
        1,
    );

    println!("as of {}", time.now().format("%Y-%m-%d"));
    let value = calculate_investment_value(&sip, &history, &time)?;
    println!("sip invested {} worth {}", value.invested_amount, value.current_value);
    let returns = calculate_timeframe_returns(&history, &time);
    println!("1Y return: {}", returns[&Timeframe::OneYear].percentage_return);

    // advance 90 days, three more installments are due
    controller.advance(Duration::days(90));
    println!("\nadvanced to: {}", time.now().format("%Y-%m-%d"));
    let value = calculate_investment_value(&sip, &history, &time)?;
    println!("sip invested {} worth {}", value.invested_amount, value.current_value);

    // the one year window still starts from the january 2023 nav
    let returns = calculate_timeframe_returns(&history, &time);
    let one_year = &returns[&Timeframe::OneYear];
    println!("1Y from {} to {}: {}", one_year.start_nav, one_year.end_nav, one_year.percentage_return);
    // nothing is old enough for two years
    println!("2Y available: {}", returns[&Timeframe::TwoYears].is_available);

    // cancel the sip, later months stop accruing
    let cancelled = sip.cancel_sip(NaiveDate::from_ymd_opt(2023, 6, 30).unwrap())?;
    let value = calculate_investment_value(&cancelled, &history, &time)?;
    println!("\ncancelled sip invested {}", value.invested_amount);

    Ok(())
}
