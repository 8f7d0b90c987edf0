//! GMO Coin wire types

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope every endpoint responds with. `status` is `0` on success (and
/// when omitted); otherwise `messages` explains the failure and `data` is
/// absent.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: i64,
    pub data: Option<T>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message_code: String,
    pub message_string: String,
}

/// `messages` joined for logs and error text.
pub fn describe(messages: &[ApiMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.message_code, m.message_string))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Plain or exponent notation, as the exchange may send either.
pub fn parse_decimal(raw: &str) -> Result<Decimal, rust_decimal::Error> {
    let raw = raw.trim();
    Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw))
}

fn decimal_string<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_decimal(&raw).map_err(|e| serde::de::Error::custom(format!("{raw:?}: {e}")))
}

/// One entry of `GET /v1/ticker`, read only once it matched the symbol.
/// Only `ask` is read as a number.
#[derive(Debug, Deserialize)]
pub struct TickerEntry {
    pub symbol: String,
    pub ask: String,
    #[serde(default)]
    pub bid: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

/// `data` of `GET /v1/account/margin`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Margin {
    #[serde(deserialize_with = "decimal_string")]
    pub available_amount: Decimal,
}

/// Body of `POST /v1/order`. Field order is the signed byte order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOrderRequest<'a> {
    pub symbol: &'a str,
    pub side: &'static str,
    pub execution_type: &'static str,
    pub size: String,
}

/// What came back from an order submission; logged, never acted on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderReceipt {
    /// HTTP status code
    pub http_status: u16,

    /// `status` field of the envelope, when the body parsed
    pub api_status: Option<i64>,

    /// Exchange order id on success
    pub order_id: Option<String>,

    /// Raw response body
    pub body: String,
}

impl OrderReceipt {
    pub const fn accepted(&self) -> bool {
        self.http_status >= 200
            && self.http_status < 300
            && matches!(self.api_status, Some(0))
            && self.order_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_margin_parses_decimal_string() {
        let body = r#"{"status":0,"data":{"profitLoss":"0","actualProfitLoss":"52000","availableAmount":"52000","margin":"0"},"responsetime":"2024-01-01T00:00:00.000Z"}"#;
        let env: Envelope<Margin> = serde_json::from_str(body).unwrap();
        assert_eq!(env.status, 0);
        assert_eq!(env.data.unwrap().available_amount, dec!(52000));
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"status":1,"messages":[{"message_code":"ERR-5012","message_string":"Invalid API-KEY."}],"responsetime":"2024-01-01T00:00:00.000Z"}"#;
        let env: Envelope<Margin> = serde_json::from_str(body).unwrap();
        assert_eq!(env.status, 1);
        assert!(env.data.is_none());
        assert_eq!(describe(&env.messages), "ERR-5012: Invalid API-KEY.");
    }

    #[test]
    fn test_status_defaults_to_success() {
        let env: Envelope<Margin> = serde_json::from_str(r#"{"data":{"availableAmount":"52000"}}"#).unwrap();
        assert_eq!(env.status, 0);
        assert_eq!(env.data.unwrap().available_amount, dec!(52000));
    }

    #[test]
    fn test_parse_decimal_accepts_exponent_form() {
        assert_eq!(parse_decimal("750760").unwrap(), dec!(750760));
        assert_eq!(parse_decimal(" 7.5e6 ").unwrap(), dec!(7500000));
        assert_eq!(parse_decimal("1.25E-2").unwrap(), dec!(0.0125));
        for raw in ["NaN", "Infinity", "-inf", "n/a", ""] {
            assert!(parse_decimal(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_order_body_field_order() {
        let body = serde_json::to_string(&MarketOrderRequest {
            symbol: "BTC",
            side: "BUY",
            execution_type: "MARKET",
            size: "0.0024".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            r#"{"symbol":"BTC","side":"BUY","executionType":"MARKET","size":"0.0024"}"#
        );
    }
}
