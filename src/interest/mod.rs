pub mod accrual;
pub mod compound;

pub use accrual::AccrualEngine;
pub use compound::{annuity_balance, future_value, CompoundingEngine, CompoundingFrequency};
