//! Mock Exchange Client
//!
//! Test double for code driving an [`ExchangeClient`]. Serves a fixed
//! balance and ask price and records every order instead of sending it.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use dca_core::error::Result;
use dca_core::model::BuyQuantity;

use super::ExchangeClient;
use crate::response::OrderReceipt;

/// In-memory exchange with static market data
pub struct MockExchangeClient {
    symbol: String,
    balance: Decimal,
    ask: Option<Decimal>,
    orders: Mutex<Vec<BuyQuantity>>,
}

impl MockExchangeClient {
    pub fn new(symbol: impl Into<String>, balance: Decimal, ask: Option<Decimal>) -> Self {
        Self {
            symbol: symbol.into(),
            balance,
            ask,
            orders: Mutex::new(Vec::new()),
        }
    }

    /// Quantities "ordered" so far, oldest first
    pub async fn orders(&self) -> Vec<BuyQuantity> {
        self.orders.lock().await.clone()
    }
}

#[async_trait]
impl ExchangeClient for MockExchangeClient {
    async fn ask_price(&self) -> Result<Option<Decimal>> {
        Ok(self.ask)
    }

    async fn available_balance(&self) -> Result<Decimal> {
        Ok(self.balance)
    }

    async fn place_market_buy(&self, quantity: &BuyQuantity) -> Result<OrderReceipt> {
        let order_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(symbol = %self.symbol, size = %quantity, order_id = %order_id, "Recorded dry-run order");

        self.orders.lock().await.push(*quantity);

        Ok(OrderReceipt {
            http_status: 200,
            api_status: Some(0),
            body: format!(r#"{{"status":0,"data":"{order_id}"}}"#),
            order_id: Some(order_id),
        })
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn name(&self) -> &str {
        "MockExchange"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_exchange() {
        let exchange = MockExchangeClient::new("BTC", dec!(52000), Some(dec!(5000000)));

        assert_eq!(exchange.available_balance().await.unwrap(), dec!(52000));
        assert_eq!(exchange.ask_price().await.unwrap(), Some(dec!(5000000)));
        assert_eq!(exchange.symbol(), "BTC");

        let qty = BuyQuantity::round_half_up(dec!(0.0024)).unwrap();
        let receipt = exchange.place_market_buy(&qty).await.unwrap();
        assert!(receipt.accepted());
        assert_eq!(exchange.orders().await, vec![qty]);
    }

    #[tokio::test]
    async fn test_mock_without_quote() {
        let exchange = MockExchangeClient::new("BTC", dec!(52000), None);
        assert_eq!(exchange.ask_price().await.unwrap(), None);
        assert!(exchange.orders().await.is_empty());
    }
}
