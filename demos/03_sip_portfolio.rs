/// sip portfolio - installments, valuation and returns of a mutual fund holding
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use savings_calc_rs::{
    generate_installments, Money, MutualFundScheme, NavData, NavHistory, SafeTimeProvider, SchemeReport,
    TimeSource, UserInvestment, UserInvestmentData,
};

// a synthetic nav series rising about 1% a month, one record every 7 days
fn synthetic_history(from: NaiveDate, to: NaiveDate) -> Vec<NavData> {
    let mut records = Vec::new();
    let mut date = from;
    let mut nav = dec!(25);
    while date <= to {
        records.push(NavData::new(date, nav.round_dp(4)));
        nav *= dec!(1.0023);
        date += Duration::days(7);
    }
    records
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let today = Utc.with_ymd_and_hms(2024, 9, 30, 10, 0, 0).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(today));

    let records = synthetic_history(
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        today.date_naive(),
    );
    let history = NavHistory::from_records(&records);

    let sip = UserInvestment::sip(
        120503,
        NaiveDate::from_ymd_opt(2022, 4, 5).unwrap(),
        Money::from_major(5_000),
        10,
    )
    // step-up from the next financial year
    .modify_sip_amount(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(), Money::from_major(7_500))?;

    let data = UserInvestmentData::new(120503)
        .with_investment(sip)
        .with_investment(UserInvestment::lumpsum(
            120503,
            NaiveDate::from_ymd_opt(2021, 11, 15).unwrap(),
            Money::from_major(100_000),
        ));

    let installments = generate_installments(&data, &history, &time)?;
    println!("{} installments", installments.len());
    for inst in installments.iter().take(4) {
        println!(
            "  {} {:?} {} @ {} = {} units",
            inst.installment_date,
            inst.installment_type,
            inst.amount.round_dp(2),
            inst.nav,
            inst.units.round_dp(4)
        );
    }

    let scheme = MutualFundScheme::new(120503, "Example Flexi Cap Fund - Direct Growth");
    let report = SchemeReport::build(scheme, &data, &history, &time)?;
    let summary = &report.details.summary;

    println!("\ninvested:      {}", summary.total_invested.round_dp(2));
    println!("current value: {}", summary.current_value.round_dp(2));
    println!("gain:          {} ({})", summary.absolute_gain.round_dp(2), summary.percentage_return);
    match summary.xirr {
        Some(xirr) => println!("xirr:          {}", xirr),
        None => println!("xirr:          could not be determined"),
    }
    if let Some(cagr) = summary.cagr {
        println!("cagr:          {}", cagr);
    }
    println!("held for {} years", report.holding_years);

    println!("\ntrailing returns at nav {}:", report.latest_nav);
    for (timeframe, metrics) in &report.returns {
        if metrics.is_available {
            println!("  {:>3}: {} (cagr {})", timeframe, metrics.percentage_return, metrics.cagr);
        } else {
            println!("  {:>3}: n/a", timeframe);
        }
    }

    let units: Decimal = installments.iter().map(|i| i.units).sum();
    println!("\nunits held: {}", units.round_dp(4));

    Ok(())
}
