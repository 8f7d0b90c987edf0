//! Residual-Carry Dollar-Cost Averaging
//!
//! Decides how much fiat to invest this run so that no worthless remainder is
//! left behind for the next one, then converts it to a lot-rounded quantity.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DcaError, Result};
use crate::model::{BuyPlan, BuyQuantity};

/// How the per-run investment amount is derived from balance and cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestmentPolicy {
    /// Invest `balance mod cap`, or one extra cap on top of it when the
    /// remainder is below half a cap.
    #[default]
    ModuloWithFloor,

    /// Keep exactly one cap in reserve and invest everything above it:
    /// `balance - (floor(balance / cap) - 1) * cap`.
    FloorMinusOne,
}

impl InvestmentPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ModuloWithFloor => "modulo-with-floor",
            Self::FloorMinusOne => "floor-minus-one",
        }
    }

    /// Raw policy amount, before clamping to the available balance.
    ///
    /// Fails with [`DcaError::InvalidInput`] when an intermediate value leaves
    /// the `Decimal` range.
    pub fn invest_amount(
        &self,
        available_balance: Decimal,
        investment_cap: Decimal,
    ) -> Result<Decimal> {
        let overflow = || {
            DcaError::InvalidInput(format!(
                "{self} amount for balance {available_balance} and cap {investment_cap} overflows"
            ))
        };

        match self {
            Self::ModuloWithFloor => {
                let surplus = available_balance.checked_rem(investment_cap).ok_or_else(overflow)?;
                let half_cap = investment_cap.checked_mul(dec!(0.5)).ok_or_else(overflow)?;
                if surplus >= half_cap {
                    Ok(surplus)
                } else {
                    // under half a cap is not worth its own run
                    surplus.checked_add(investment_cap).ok_or_else(overflow)
                }
            }
            Self::FloorMinusOne => {
                let runs = available_balance
                    .checked_div(investment_cap)
                    .ok_or_else(overflow)?
                    .floor();
                let reserved = runs
                    .checked_sub(Decimal::ONE)
                    .and_then(|kept| kept.checked_mul(investment_cap))
                    .ok_or_else(overflow)?;
                available_balance.checked_sub(reserved).ok_or_else(overflow)
            }
        }
    }
}

impl fmt::Display for InvestmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentPolicy {
    type Err = DcaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modulo-with-floor" | "modulo" => Ok(Self::ModuloWithFloor),
            "floor-minus-one" | "floor" => Ok(Self::FloorMinusOne),
            other => Err(DcaError::Config(format!(
                "unknown investment policy '{other}' (expected modulo-with-floor or floor-minus-one)"
            ))),
        }
    }
}

/// Turns (balance, cap, ask) into a [`BuyPlan`].
#[derive(Clone, Copy, Debug, Default)]
pub struct InvestmentCalculator {
    policy: InvestmentPolicy,
}

impl InvestmentCalculator {
    pub const fn new(policy: InvestmentPolicy) -> Self {
        Self { policy }
    }

    /// Compute this run's buy quantity and what it will actually cost.
    ///
    /// The invested amount never exceeds `available_balance`, and neither does
    /// the rounded `actual_cost`; with an empty balance the plan is empty.
    pub fn compute_buy_amount(
        &self,
        available_balance: Decimal,
        investment_cap: Decimal,
        ask_price: Decimal,
    ) -> Result<BuyPlan> {
        if investment_cap <= Decimal::ZERO {
            return Err(DcaError::InvalidInput(format!(
                "investment cap must be positive, got {investment_cap}"
            )));
        }
        if ask_price <= Decimal::ZERO {
            return Err(DcaError::InvalidInput(format!(
                "ask price must be positive, got {ask_price}"
            )));
        }
        if available_balance < Decimal::ZERO {
            return Err(DcaError::InvalidInput(format!(
                "available balance must not be negative, got {available_balance}"
            )));
        }

        let raw = self.policy.invest_amount(available_balance, investment_cap)?;
        let invest_amount = raw.min(available_balance);
        if invest_amount != raw {
            warn!(
                policy = %self.policy,
                computed = %raw,
                available = %available_balance,
                "Invest amount exceeds available balance, clamping"
            );
        }

        // whole units only, so the cost rounded half-up stays within the balance
        let affordable =
            BuyQuantity::round_down(checked_div(available_balance.floor(), ask_price)?)?;
        let quantity = lot_quantity(invest_amount, ask_price)?.min(affordable);
        let actual_cost = actual_cost(ask_price, &quantity)?;

        info!(
            policy = %self.policy,
            invest_amount = %invest_amount,
            ask_price = %ask_price,
            quantity = %quantity,
            "Calculated buy quantity"
        );
        info!(actual_cost = %actual_cost, "Actual invest amount");

        Ok(BuyPlan {
            policy: self.policy,
            invest_amount,
            quantity,
            actual_cost,
        })
    }
}

/// `invest_amount / ask_price`, rounded half-up to the lot size.
pub fn lot_quantity(invest_amount: Decimal, ask_price: Decimal) -> Result<BuyQuantity> {
    BuyQuantity::round_half_up(checked_div(invest_amount, ask_price)?)
}

/// What `quantity` costs at `ask_price`, rounded to whole fiat units.
pub fn actual_cost(ask_price: Decimal, quantity: &BuyQuantity) -> Result<Decimal> {
    ask_price
        .checked_mul(quantity.as_decimal())
        .map(|cost| cost.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| {
            DcaError::InvalidInput(format!("cost of {quantity} at {ask_price} overflows"))
        })
}

fn checked_div(amount: Decimal, price: Decimal) -> Result<Decimal> {
    amount
        .checked_div(price)
        .ok_or_else(|| DcaError::InvalidInput(format!("{amount} / {price} is not representable")))
}
