pub mod config;
pub mod decimal;
pub mod deposits;
pub mod errors;
pub mod fiscal;
pub mod interest;
pub mod investments;
pub mod nav;
pub mod ppf;
pub mod provider;
pub mod returns;
pub mod serialization;
pub mod types;

// re-export key types
pub use config::{CalculatorConfig, PpfConfig, XirrConfig};
pub use decimal::{Money, Rate};
pub use deposits::{calculate_fd_returns, calculate_rd_returns, DepositSummary, FdInput, FyData, RdInput};
pub use errors::{CalculatorError, FetchError, FetchResult, Result};
pub use fiscal::{fiscal_year, fiscal_year_bounds, fiscal_year_label, FiscalYear};
pub use interest::{AccrualEngine, CompoundingEngine, CompoundingFrequency};
pub use investments::{
    aggregate, calculate_cagr, calculate_investment_value, calculate_xirr, fund_investment_details,
    generate_installments, investment_duration, solve_xirr, CashFlow, FundInvestmentDetails,
    InvestmentInstallment, InvestmentMetrics, InvestmentValue, SipAmountModification, UserInvestment,
    UserInvestmentData,
};
pub use nav::{NavData, NavHistory, NavPoint};
pub use ppf::{calculate_ppf, PpfCalculationResult, PpfCalculator, PpfContribution, PpfSingleContribution, PpfYearData};
pub use provider::{CachedNavSource, MutualFundScheme, NavDataSource, RequestCache, SchemeHistory, SearchResult};
pub use returns::{calculate_timeframe_returns, ReturnsMetrics, Timeframe};
pub use serialization::{SchemeReport, ToJsonPretty};
pub use types::{InstallmentType, InvestmentType, SchemeCode};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
