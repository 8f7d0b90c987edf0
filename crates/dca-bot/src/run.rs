//! One DCA run: balance, then price, then (maybe) an order.

use std::fmt;

use tracing::{info, warn};

use dca_core::config::DcaSettings;
use dca_core::error::{DcaError, Result};
use dca_core::model::BuyPlan;
use dca_core::strategy::InvestmentCalculator;
use dca_exchange::{ExchangeClient, OrderReceipt};

/// How a run ended, short of an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// An order was submitted
    Ordered { plan: BuyPlan, receipt: OrderReceipt },

    /// Dry run: the plan was computed and nothing was sent
    DryRun { plan: BuyPlan },

    /// The plan rounded down to zero lots
    NothingToInvest { plan: BuyPlan },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordered { plan, receipt } => write!(
                f,
                "ordered {} (order {}, http {})",
                plan.quantity,
                receipt.order_id.as_deref().unwrap_or("-"),
                receipt.http_status
            ),
            Self::DryRun { plan } => write!(f, "dry run, would order {}", plan.quantity),
            Self::NothingToInvest { plan } => {
                write!(f, "nothing to invest (invest amount {})", plan.invest_amount)
            }
        }
    }
}

/// Execute a single run against `client`.
///
/// Calls are strictly sequential; no order is placed unless both the balance
/// and the price are known and the calculator accepted them. A missing quote
/// surfaces as [`DcaError::DataUnavailable`].
pub async fn run_once<C>(client: &C, settings: &DcaSettings, dry_run: bool) -> Result<RunOutcome>
where
    C: ExchangeClient + ?Sized,
{
    info!(
        exchange = client.name(),
        symbol = client.symbol(),
        investment_cap = %settings.investment_cap,
        dry_run,
        "Starting DCA run"
    );

    let available = client.available_balance().await?;

    let ask = client.ask_price().await?.ok_or_else(|| {
        DcaError::DataUnavailable(format!("no unique ask price for {}", client.symbol()))
    })?;

    let plan = InvestmentCalculator::new(settings.policy).compute_buy_amount(
        available,
        settings.investment_cap,
        ask,
    )?;

    if plan.is_empty() {
        warn!(available = %available, ask = %ask, "Buy quantity rounds to zero, skipping order");
        return Ok(RunOutcome::NothingToInvest { plan });
    }

    if dry_run {
        info!(size = %plan.quantity, cost = %plan.actual_cost, "Dry run, not placing order");
        return Ok(RunOutcome::DryRun { plan });
    }

    let receipt = client.place_market_buy(&plan.quantity).await?;
    Ok(RunOutcome::Ordered { plan, receipt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dca_core::InvestmentPolicy;
    use dca_exchange::MockExchangeClient;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn settings(policy: InvestmentPolicy) -> DcaSettings {
        DcaSettings {
            investment_cap: dec!(10000),
            symbol: "BTC".into(),
            policy,
        }
    }

    #[tokio::test]
    async fn test_run_places_order() {
        let exchange = MockExchangeClient::new("BTC", dec!(52000), Some(dec!(5000000)));
        let outcome = run_once(&exchange, &settings(InvestmentPolicy::ModuloWithFloor), false)
            .await
            .unwrap();

        let RunOutcome::Ordered { plan, receipt } = outcome else {
            panic!("expected an order, got {outcome:?}");
        };
        assert_eq!(plan.invest_amount, dec!(12000));
        assert!(receipt.accepted());

        let orders = exchange.orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].to_string(), "0.0024");
    }

    #[tokio::test]
    async fn test_policy_choice_reaches_the_order() {
        let exchange = MockExchangeClient::new("BTC", dec!(57000), Some(dec!(5000000)));
        run_once(&exchange, &settings(InvestmentPolicy::FloorMinusOne), false)
            .await
            .unwrap();
        // 17000 / 5,000,000
        assert_eq!(exchange.orders().await[0].to_string(), "0.0034");
    }

    #[tokio::test]
    async fn test_missing_price_skips_without_order() {
        let exchange = MockExchangeClient::new("BTC", dec!(52000), None);
        let err = run_once(&exchange, &settings(InvestmentPolicy::default()), false)
            .await
            .unwrap_err();

        assert!(matches!(err, DcaError::DataUnavailable(_)));
        assert!(!err.is_fatal());
        assert!(exchange.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_balance_places_nothing() {
        let exchange = MockExchangeClient::new("BTC", Decimal::ZERO, Some(dec!(5000000)));
        let outcome = run_once(&exchange, &settings(InvestmentPolicy::FloorMinusOne), false)
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::NothingToInvest { .. }));
        assert!(exchange.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_dust_balance_places_nothing() {
        // 100 / 5,000,000 = 0.00002, below one lot
        let exchange = MockExchangeClient::new("BTC", dec!(100), Some(dec!(5000000)));
        let outcome = run_once(&exchange, &settings(InvestmentPolicy::default()), false)
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::NothingToInvest { .. }));
        assert!(exchange.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_places_nothing() {
        let exchange = MockExchangeClient::new("BTC", dec!(52000), Some(dec!(5000000)));
        let outcome = run_once(&exchange, &settings(InvestmentPolicy::default()), true)
            .await
            .unwrap();

        let RunOutcome::DryRun { plan } = outcome else {
            panic!("expected a dry run, got {outcome:?}");
        };
        assert_eq!(plan.quantity.to_string(), "0.0024");
        assert!(exchange.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_bad_quote_aborts_before_order() {
        let exchange = MockExchangeClient::new("BTC", dec!(52000), Some(Decimal::ZERO));
        let err = run_once(&exchange, &settings(InvestmentPolicy::default()), false)
            .await
            .unwrap_err();

        assert!(matches!(err, DcaError::InvalidInput(_)));
        assert!(err.is_fatal());
        assert!(exchange.orders().await.is_empty());
    }

    #[test]
    fn test_outcome_display() {
        let plan = InvestmentCalculator::default()
            .compute_buy_amount(dec!(52000), dec!(10000), dec!(5000000))
            .unwrap();
        assert_eq!(
            RunOutcome::DryRun { plan }.to_string(),
            "dry run, would order 0.0024"
        );
    }
}
