//! Investment Strategies
//!
//! Per-run investment policies and lot-size rounding.

mod dca;

pub use dca::{actual_cost, lot_quantity, InvestmentCalculator, InvestmentPolicy};
