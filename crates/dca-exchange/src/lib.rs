//! # dca-exchange
//!
//! Exchange integration for the DCA bot: a signed REST client for GMO Coin,
//! the HTTP transport seam beneath it, and an in-memory exchange for tests.
//!
//! The client knows nothing about how much to buy; it reads the balance and
//! the ask price, and submits whatever quantity it is handed.

mod gmo;
mod mock;
pub mod response;
pub mod signing;
pub mod transport;

pub use gmo::{
    GmoCoinClient, GmoCoinConfig, API_KEY_KEY, DEFAULT_PRIVATE_URL, DEFAULT_PUBLIC_URL,
    PRIVATE_URL_KEY, PUBLIC_URL_KEY, SECRET_KEY_KEY, TIMEOUT_KEY,
};
pub use mock::MockExchangeClient;
pub use response::OrderReceipt;
pub use signing::{Credentials, RequestSigner, SignatureParams};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

use async_trait::async_trait;
use rust_decimal::Decimal;

use dca_core::error::Result;
use dca_core::model::BuyQuantity;

/// Exchange client trait (Strategy pattern)
///
/// One instrument per client. Calls are independent round trips; callers
/// sequence them.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Best ask for the instrument.
    ///
    /// `None` when the exchange reports no quote, or more than one, for the
    /// symbol. That is a reason to skip the run, not an error.
    async fn ask_price(&self) -> Result<Option<Decimal>>;

    /// Fiat available for new positions
    async fn available_balance(&self) -> Result<Decimal>;

    /// Submit a market buy for exactly `quantity`. Fills are not verified.
    async fn place_market_buy(&self, quantity: &BuyQuantity) -> Result<OrderReceipt>;

    /// Instrument symbol this client trades
    fn symbol(&self) -> &str;

    /// Exchange name
    fn name(&self) -> &str;
}
