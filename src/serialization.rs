/// serialization support for calculator outputs
use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::Result;
use crate::fiscal::as_of_date;
use crate::investments::{fund_investment_details, investment_duration, FundInvestmentDetails, UserInvestmentData};
use crate::nav::NavHistory;
use crate::provider::MutualFundScheme;
use crate::returns::{calculate_timeframe_returns, ReturnsMetrics, Timeframe};

/// pretty-printed json for any serializable output
pub trait ToJsonPretty {
    fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error>;
}

impl<T: Serialize + ?Sized> ToJsonPretty for T {
    fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// everything the scheme page shows for one scheme, as of one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeReport {
    pub as_of: NaiveDate,
    pub latest_nav: Decimal,
    /// years since the first investment
    pub holding_years: Decimal,
    pub details: FundInvestmentDetails,
    pub returns: BTreeMap<Timeframe, ReturnsMetrics>,
}

impl SchemeReport {
    pub fn build(
        scheme: MutualFundScheme,
        data: &UserInvestmentData,
        history: &NavHistory,
        time: &SafeTimeProvider,
    ) -> Result<Self> {
        Ok(SchemeReport {
            as_of: as_of_date(time),
            latest_nav: history.latest_nav(),
            holding_years: investment_duration(&data.investments, time).round_dp(2),
            details: fund_investment_details(scheme, data, history, time)?,
            returns: calculate_timeframe_returns(history, time),
        })
    }

    /// windows with enough history to be measured
    pub fn available_returns(&self) -> impl Iterator<Item = (&Timeframe, &ReturnsMetrics)> {
        self.returns.iter().filter(|(_, m)| m.is_available)
    }
}
