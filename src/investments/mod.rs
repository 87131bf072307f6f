//! mutual fund investments: installments, valuation and annualized returns

pub mod installments;
pub mod model;
pub mod valuation;
pub mod xirr;

pub use installments::{generate_installments, sip_schedule, InvestmentInstallment};
pub use model::{SipAmountModification, UserInvestment, UserInvestmentData};
pub use valuation::{
    aggregate, calculate_cagr, calculate_investment_value, fund_investment_details,
    investment_duration, FundInvestmentDetails, InvestmentMetrics, InvestmentValue,
};
pub use xirr::{
    build_cash_flows, calculate_xirr, calculate_xirr_with, solve_xirr, CashFlow, SolverMethod,
    XirrSolution,
};
