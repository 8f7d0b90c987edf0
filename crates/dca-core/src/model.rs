//! Domain Models
//!
//! Value types passed between the exchange client and the calculator.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::{DcaError, Result};
use crate::strategy::InvestmentPolicy;

/// Fractional digits of the exchange's minimum order increment.
pub const LOT_DECIMALS: u32 = 4;

/// Asset quantity on the exchange's lot grid.
///
/// Always non-negative and always carries exactly [`LOT_DECIMALS`] fractional
/// digits, so `to_string()` yields the exact `size` sent to the exchange
/// (`0.0030`, never `0.003`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BuyQuantity(Decimal);

impl BuyQuantity {
    pub fn zero() -> Self {
        Self::on_grid(Decimal::ZERO)
    }

    /// Round half-up onto the lot grid.
    pub fn round_half_up(raw: Decimal) -> Result<Self> {
        Self::rounded(raw, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Largest lot-multiple not above `raw`.
    pub fn round_down(raw: Decimal) -> Result<Self> {
        Self::rounded(raw, RoundingStrategy::ToZero)
    }

    fn rounded(raw: Decimal, strategy: RoundingStrategy) -> Result<Self> {
        if raw.is_sign_negative() && !raw.is_zero() {
            return Err(DcaError::InvalidInput(format!(
                "buy quantity must not be negative, got {raw}"
            )));
        }
        Ok(Self::on_grid(raw.round_dp_with_strategy(LOT_DECIMALS, strategy)))
    }

    fn on_grid(mut value: Decimal) -> Self {
        // pads to the fixed scale; the value is already rounded
        value.rescale(LOT_DECIMALS);
        value.set_sign_positive(true);
        Self(value)
    }

    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for BuyQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Output of one calculator run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuyPlan {
    /// Policy that produced the plan
    pub policy: InvestmentPolicy,

    /// Fiat amount the policy decided to invest (after clamping to balance)
    pub invest_amount: Decimal,

    /// Quantity to order
    pub quantity: BuyQuantity,

    /// `ask * quantity` rounded to whole fiat units; for logging only
    pub actual_cost: Decimal,
}

impl BuyPlan {
    /// Nothing to buy this run.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantity_keeps_four_digits() {
        let qty = BuyQuantity::round_half_up(dec!(0.003)).unwrap();
        assert_eq!(qty.to_string(), "0.0030");

        let qty = BuyQuantity::round_half_up(dec!(2)).unwrap();
        assert_eq!(qty.to_string(), "2.0000");

        assert_eq!(BuyQuantity::zero().to_string(), "0.0000");
        assert_eq!(BuyQuantity::round_down(dec!(0.0001)).unwrap().to_string(), "0.0001");
    }

    #[test]
    fn test_quantity_rounds_half_up() {
        assert_eq!(BuyQuantity::round_half_up(dec!(0.00245)).unwrap().as_decimal(), dec!(0.0025));
        assert_eq!(BuyQuantity::round_half_up(dec!(0.00244999)).unwrap().as_decimal(), dec!(0.0024));
        assert_eq!(BuyQuantity::round_down(dec!(0.00249999)).unwrap().as_decimal(), dec!(0.0024));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        assert!(matches!(
            BuyQuantity::round_half_up(dec!(-0.1)),
            Err(DcaError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tiny_amount_rounds_to_zero() {
        let qty = BuyQuantity::round_half_up(dec!(0.00004)).unwrap();
        assert!(qty.is_zero());
        assert_eq!(qty.to_string(), "0.0000");
    }
}
