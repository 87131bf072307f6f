use thiserror::Error;

use crate::decimal::Money;

/// failure reported by the nav data collaborator
///
/// cloneable so one failed in-flight request can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed: {message}")]
    Request {
        message: String,
    },

    #[error("unexpected response: {message}")]
    InvalidResponse {
        message: String,
    },

    #[error("scheme not found: {scheme_code}")]
    SchemeNotFound {
        scheme_code: u32,
    },
}

#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid input for {field}: {reason}")]
    InvalidInput {
        field: String,
        reason: String,
    },

    #[error("contribution limit exceeded for FY {year}: limit {limit}, provided {provided}")]
    ContributionLimitExceeded {
        year: i32,
        limit: Money,
        provided: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}

impl CalculatorError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        CalculatorError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalculatorError>;

pub type FetchResult<T> = std::result::Result<T, FetchError>;
