//! # dca-core
//!
//! Investment policy for a scheduled, single-shot crypto DCA bot.
//!
//! Each run the bot looks at the fiat balance on the exchange and decides how
//! much of it to spend. The goal is to invest roughly one *cap* per run while
//! never leaving a remainder too small to be worth its own run:
//!
//! ```text
//! balance 52000, cap 10000, ask 5,000,000
//!
//!   surplus = 52000 mod 10000 = 2000   (< half a cap)
//!   invest  = 2000 + 10000    = 12000
//!   qty     = 12000 / 5e6     = 0.0024 (lot size 0.0001)
//!   cost    = 5e6 * 0.0024    = 12000
//! ```
//!
//! This crate knows nothing about HTTP; the exchange client lives in
//! `dca-exchange`.

pub mod config;
pub mod error;
pub mod model;
pub mod strategy;

pub use config::{ConfigSource, DcaSettings, EnvSource, MapSource};
pub use error::{DcaError, Result};
pub use model::{BuyPlan, BuyQuantity, LOT_DECIMALS};
pub use strategy::{InvestmentCalculator, InvestmentPolicy};
