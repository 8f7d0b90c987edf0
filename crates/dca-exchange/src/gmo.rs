//! GMO Coin Client
//!
//! Public ticker plus the two private endpoints the bot needs. Every private
//! request is signed on its own; nothing is cached between calls.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use dca_core::config::{parse_or, ConfigSource};
use dca_core::error::{DcaError, Result};
use dca_core::model::BuyQuantity;

use crate::response::{
    describe, parse_decimal, Envelope, Margin, MarketOrderRequest, OrderReceipt, TickerEntry,
};
use crate::signing::{
    Credentials, RequestSigner, SignatureParams, HEADER_API_KEY, HEADER_API_SIGN,
    HEADER_API_TIMESTAMP,
};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, DEFAULT_TIMEOUT_SECS};
use crate::ExchangeClient;

pub const API_KEY_KEY: &str = "GMOCOIN_API_KEY";
pub const SECRET_KEY_KEY: &str = "GMOCOIN_SECRET_KEY";
pub const PUBLIC_URL_KEY: &str = "GMOCOIN_PUBLIC_URL";
pub const PRIVATE_URL_KEY: &str = "GMOCOIN_PRIVATE_URL";
pub const TIMEOUT_KEY: &str = "DCA_HTTP_TIMEOUT_SECS";

pub const DEFAULT_PUBLIC_URL: &str = "https://api.coin.z.com/public";
pub const DEFAULT_PRIVATE_URL: &str = "https://api.coin.z.com/private";

const TICKER_PATH: &str = "/v1/ticker";
const MARGIN_PATH: &str = "/v1/account/margin";
const ORDER_PATH: &str = "/v1/order";

/// Connection settings
#[derive(Clone, Debug)]
pub struct GmoCoinConfig {
    /// Base URL of the public API
    pub public_url: String,

    /// Base URL of the private API
    pub private_url: String,

    /// API key pair
    pub credentials: Credentials,

    /// Per-request timeout
    pub timeout: Duration,
}

impl GmoCoinConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            public_url: DEFAULT_PUBLIC_URL.into(),
            private_url: DEFAULT_PRIVATE_URL.into(),
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        let credentials = Credentials::new(source.require(API_KEY_KEY)?, source.require(SECRET_KEY_KEY)?);

        let base_url = |key: &str, default: &str| {
            source
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        let timeout_secs: u64 = parse_or(source, TIMEOUT_KEY, DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(DcaError::Config(format!("{TIMEOUT_KEY} must be at least 1 second")));
        }

        Ok(Self {
            public_url: base_url(PUBLIC_URL_KEY, DEFAULT_PUBLIC_URL),
            private_url: base_url(PRIVATE_URL_KEY, DEFAULT_PRIVATE_URL),
            credentials,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Signed REST client for one instrument
pub struct GmoCoinClient<T = ReqwestTransport> {
    transport: T,
    config: GmoCoinConfig,
    signer: RequestSigner,
    symbol: String,
}

impl GmoCoinClient<ReqwestTransport> {
    /// Client over a real HTTP transport honoring `config.timeout`.
    pub fn from_config(config: GmoCoinConfig, symbol: impl Into<String>) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, symbol, transport))
    }
}

impl<T: HttpTransport> GmoCoinClient<T> {
    pub fn with_transport(config: GmoCoinConfig, symbol: impl Into<String>, transport: T) -> Self {
        let signer = config.credentials.signer();
        Self {
            transport,
            config,
            signer,
            symbol: symbol.into(),
        }
    }

    /// Attach `API-*` auth headers for `path` to a private request.
    fn sign_request(&self, request: HttpRequest, path: &str) -> Result<HttpRequest> {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let sign = self.signer.sign(&SignatureParams {
            timestamp: &timestamp,
            method: request.method.as_str(),
            path,
            payload: request.body.as_deref(),
        })?;

        Ok(request
            .header("Content-Type", "application/json")
            .header(HEADER_API_KEY, self.config.credentials.api_key.clone())
            .header(HEADER_API_TIMESTAMP, timestamp)
            .header(HEADER_API_SIGN, sign))
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(
            method = %request.method,
            url = %request.url,
            payload = request.body.as_deref().unwrap_or(""),
            "Request"
        );

        let started = Instant::now();
        let response = self.transport.send(request).await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(
            status = response.status,
            body = %response.body,
            elapsed_ms,
            "Response"
        );
        if !response.is_success() {
            warn!(status = response.status, elapsed_ms, "Non-success HTTP status");
        }
        Ok(response)
    }
}

#[async_trait]
impl<T: HttpTransport> ExchangeClient for GmoCoinClient<T> {
    async fn ask_price(&self) -> Result<Option<Decimal>> {
        let url = format!("{}{}?symbol={}", self.config.public_url, TICKER_PATH, self.symbol);
        let response = self.round_trip(HttpRequest::get(url)).await?;

        // entries for other instruments stay untyped
        let envelope: Envelope<Vec<Value>> = serde_json::from_str(&response.body)?;
        if envelope.status != 0 {
            warn!(
                status = envelope.status,
                messages = %describe(&envelope.messages),
                "Ticker request rejected"
            );
        }

        let Some(entries) = envelope.data else {
            return Err(DcaError::Parse(format!(
                "ticker response without data (http {}, status {}): {}",
                response.status,
                envelope.status,
                describe(&envelope.messages)
            )));
        };

        let matching: Vec<&Value> = entries
            .iter()
            .filter(|entry| {
                entry.get("symbol").and_then(Value::as_str) == Some(self.symbol.as_str())
            })
            .collect();
        let [entry] = matching.as_slice() else {
            error!(
                symbol = %self.symbol,
                matches = matching.len(),
                "There is no unique {} data in response",
                self.symbol
            );
            return Ok(None);
        };

        let entry = TickerEntry::deserialize(*entry)?;
        let ask = parse_decimal(&entry.ask)
            .map_err(|e| DcaError::Parse(format!("ask {:?} for {}: {e}", entry.ask, self.symbol)))?;

        info!(
            symbol = %self.symbol,
            ask = %ask,
            bid = entry.bid.as_deref().unwrap_or("-"),
            last = entry.last.as_deref().unwrap_or("-"),
            "{} Ask Price = {}",
            self.symbol,
            ask
        );
        Ok(Some(ask))
    }

    async fn available_balance(&self) -> Result<Decimal> {
        let url = format!("{}{}", self.config.private_url, MARGIN_PATH);
        let request = self.sign_request(HttpRequest::get(url), MARGIN_PATH)?;
        let response = self.round_trip(request).await?;

        let envelope: Envelope<Margin> = serde_json::from_str(&response.body)?;
        let margin = envelope.data.ok_or_else(|| {
            DcaError::Parse(format!(
                "margin response without data (http {}, status {}): {}",
                response.status,
                envelope.status,
                describe(&envelope.messages)
            ))
        })?;

        info!(available_amount = %margin.available_amount, "Available Amount = {}", margin.available_amount);
        Ok(margin.available_amount)
    }

    async fn place_market_buy(&self, quantity: &BuyQuantity) -> Result<OrderReceipt> {
        let payload = serde_json::to_string(&MarketOrderRequest {
            symbol: &self.symbol,
            side: "BUY",
            execution_type: "MARKET",
            size: quantity.to_string(),
        })?;

        info!(symbol = %self.symbol, size = %quantity, "Placing market buy");

        let url = format!("{}{}", self.config.private_url, ORDER_PATH);
        let request = self.sign_request(HttpRequest::post(url, payload), ORDER_PATH)?;
        let response = self.round_trip(request).await?;

        let envelope = serde_json::from_str::<Envelope<String>>(&response.body).ok();
        let receipt = OrderReceipt {
            http_status: response.status,
            api_status: envelope.as_ref().map(|e| e.status),
            order_id: envelope.as_ref().and_then(|e| e.data.clone()),
            body: response.body,
        };

        if receipt.accepted() {
            info!(order_id = receipt.order_id.as_deref().unwrap_or_default(), "Order accepted");
        } else {
            warn!(
                http_status = receipt.http_status,
                api_status = ?receipt.api_status,
                messages = %envelope.as_ref().map(|e| describe(&e.messages)).unwrap_or_default(),
                "Order not accepted"
            );
        }

        Ok(receipt)
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn name(&self) -> &str {
        "GMO Coin"
    }
}
