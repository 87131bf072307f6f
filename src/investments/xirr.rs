use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::{debug, warn};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::config::XirrConfig;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::fiscal::{as_of_date, days_between};
use crate::investments::installments::investment_installments;
use crate::investments::model::UserInvestment;
use crate::investments::valuation::portfolio_value;
use crate::nav::NavHistory;

/// dated signed amount, investments negative, redemption value positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Money,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self { date, amount }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverMethod {
    NewtonRaphson,
    Bisection,
}

/// annualized rate solving the discounted cash flow equation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XirrSolution {
    /// fraction, 0.1 is 10%
    pub rate: f64,
    pub iterations: u32,
    pub method: SolverMethod,
}

// bisection gives up once the bracket is narrower than this
const BRACKET_WIDTH: f64 = 1e-12;
const MAX_BISECTIONS: u32 = 200;
// rates probed for a sign change, ascending
const BRACKET_GRID: [f64; 13] = [
    -0.999_999, -0.99, -0.9, -0.5, -0.1, 0.0, 0.1, 0.5, 1.0, 2.0, 10.0, 100.0, 1_000.0,
];

/// investment outflows plus a terminal inflow of the current value dated today
///
/// sips contribute one outflow per scheduled, uncancelled installment whatever
/// the nav availability. sorted ascending by date.
pub fn build_cash_flows(
    investments: &[UserInvestment],
    history: &NavHistory,
    time: &SafeTimeProvider,
) -> Result<Vec<CashFlow>> {
    if investments.is_empty() || history.is_empty() {
        return Ok(Vec::new());
    }
    let today = as_of_date(time);

    let mut next_id = 0;
    let mut flows = Vec::new();
    for investment in investments {
        investment.validate()?;
        flows.extend(
            investment_installments(investment, history, today, &mut next_id)
                .into_iter()
                .filter(|i| !i.is_cancelled)
                .map(|i| CashFlow::new(i.installment_date, -i.amount)),
        );
    }

    let value = portfolio_value(investments, history, today);
    flows.push(CashFlow::new(today, value.current_value));
    flows.sort_by_key(|f| f.date);
    Ok(flows)
}

struct Discounted {
    years: Vec<f64>,
    amounts: Vec<f64>,
}

impl Discounted {
    fn new(flows: &[CashFlow], day_basis: f64) -> Option<Self> {
        let base = flows.iter().map(|f| f.date).min()?;
        let years = flows
            .iter()
            .map(|f| days_between(base, f.date) as f64 / day_basis)
            .collect();
        let amounts = flows
            .iter()
            .map(|f| f.amount.as_decimal().to_f64())
            .collect::<Option<Vec<f64>>>()?;
        Some(Self { years, amounts })
    }

    fn npv(&self, rate: f64) -> f64 {
        self.years
            .iter()
            .zip(&self.amounts)
            .map(|(t, a)| a * (1.0 + rate).powf(-t))
            .sum()
    }

    fn npv_derivative(&self, rate: f64) -> f64 {
        self.years
            .iter()
            .zip(&self.amounts)
            .map(|(t, a)| -t * a * (1.0 + rate).powf(-t - 1.0))
            .sum()
    }
}

/// newton-raphson from the configured guess, bisection when newton stalls
///
/// `None` means the rate could not be determined: the flows do not contain
/// both an outflow and an inflow, or no sign change was found to bisect.
pub fn solve_xirr(flows: &[CashFlow], config: &XirrConfig) -> Option<XirrSolution> {
    let has_outflow = flows.iter().any(|f| f.amount.is_negative());
    let has_inflow = flows.iter().any(|f| f.amount.is_positive());
    if !has_outflow || !has_inflow {
        return None;
    }
    let discounted = Discounted::new(flows, config.day_basis)?;

    newton(&discounted, config).or_else(|| {
        debug!("xirr: newton-raphson did not converge, bisecting");
        bisect(&discounted, config)
    })
}

fn newton(d: &Discounted, config: &XirrConfig) -> Option<XirrSolution> {
    let mut rate = config.initial_guess;
    for iteration in 1..=config.max_iterations {
        if rate <= -1.0 || !rate.is_finite() {
            return None;
        }
        let npv = d.npv(rate);
        if !npv.is_finite() {
            return None;
        }
        if npv.abs() < config.tolerance {
            return Some(XirrSolution {
                rate,
                iterations: iteration,
                method: SolverMethod::NewtonRaphson,
            });
        }
        let derivative = d.npv_derivative(rate);
        if derivative == 0.0 || !derivative.is_finite() {
            return None;
        }
        rate -= npv / derivative;
    }
    None
}

fn bisect(d: &Discounted, config: &XirrConfig) -> Option<XirrSolution> {
    // signum(0.0) is 1.0, so a root sitting on the grid is never bracketed
    if let Some(&rate) = BRACKET_GRID.iter().find(|rate| d.npv(**rate) == 0.0) {
        return Some(XirrSolution {
            rate,
            iterations: 0,
            method: SolverMethod::Bisection,
        });
    }
    let (mut lo, mut hi) = BRACKET_GRID.windows(2).find_map(|pair| {
        let (a, b) = (d.npv(pair[0]), d.npv(pair[1]));
        (a.is_finite() && b.is_finite() && a.signum() != b.signum()).then_some((pair[0], pair[1]))
    })?;
    let mut npv_lo = d.npv(lo);

    for iteration in 1..=MAX_BISECTIONS {
        let mid = (lo + hi) / 2.0;
        let npv_mid = d.npv(mid);
        if npv_mid.abs() < config.tolerance || hi - lo < BRACKET_WIDTH {
            return Some(XirrSolution {
                rate: mid,
                iterations: iteration,
                method: SolverMethod::Bisection,
            });
        }
        if npv_mid.signum() == npv_lo.signum() {
            lo = mid;
            npv_lo = npv_mid;
        } else {
            hi = mid;
        }
    }
    None
}

/// xirr of a set of investments in one scheme
pub fn calculate_xirr(
    investments: &[UserInvestment],
    history: &NavHistory,
    time: &SafeTimeProvider,
) -> Result<Option<Rate>> {
    calculate_xirr_with(investments, history, time, &XirrConfig::default())
}

pub fn calculate_xirr_with(
    investments: &[UserInvestment],
    history: &NavHistory,
    time: &SafeTimeProvider,
    config: &XirrConfig,
) -> Result<Option<Rate>> {
    let flows = build_cash_flows(investments, history, time)?;
    let solution = solve_xirr(&flows, config);
    if solution.is_none() && !flows.is_empty() {
        warn!("xirr could not be determined for {} cash flows", flows.len());
    }
    Ok(solution.and_then(|s| Rate::from_f64(s.rate)))
}
