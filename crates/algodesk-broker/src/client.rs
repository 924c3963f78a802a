//! OpenAlgo REST client
//!
//! Thin pass-through to the platform's `/api/v1/*` endpoints. The API key is
//! injected into every request body; responses are normalized so callers can
//! always read a `status` field.

use crate::error::{BrokerError, Result};
use crate::types::{
    BasketLeg, HistoryParams, ModifyOrderParams, OpenPositionParams, PlaceOrderParams,
    QuoteParams, SmartOrderParams, SplitOrderParams, DEFAULT_STRATEGY,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default platform host
pub const DEFAULT_HOST: &str = "http://127.0.0.1:5000";

fn mask_api_key(key: &str) -> String {
    if key.len() <= 10 {
        return "****".to_string();
    }
    format!("{}...{}", &key[..5], &key[key.len() - 5..])
}

/// OpenAlgo client configuration
#[derive(Clone)]
pub struct OpenAlgoConfig {
    /// Platform API key
    pub api_key: String,
    /// Platform host (scheme + authority)
    pub host: String,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for OpenAlgoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAlgoConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("host", &self.host)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAlgoConfig {
    /// Create a configuration with the given API key and default host
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host: DEFAULT_HOST.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the platform host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

/// Client for the OpenAlgo REST API
pub struct OpenAlgoClient {
    client: Client,
    config: OpenAlgoConfig,
}

impl OpenAlgoClient {
    /// Create a new client
    #[must_use]
    pub fn new(config: OpenAlgoConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// The configured platform host
    #[must_use]
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// POST a body to `/api/v1/{endpoint}` with the API key injected,
    /// returning the platform payload normalized to carry a `status` field.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value> {
        let obj = body
            .as_object_mut()
            .ok_or_else(|| BrokerError::Validation("request body must be an object".into()))?;
        obj.insert("apikey".to_string(), json!(self.config.api_key));

        let url = format!("{}/api/v1/{}", self.config.host.trim_end_matches('/'), endpoint);
        debug!("Dispatching platform request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BrokerError::Http(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| BrokerError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request rejected by platform")
                .to_string();
            return Err(BrokerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(normalize_status(payload))
    }

    /// Place a new order
    pub async fn place_order(&self, params: PlaceOrderParams) -> Result<Value> {
        let params = params.normalized();
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("placeorder", body).await
    }

    /// Modify an existing order
    pub async fn modify_order(&self, params: ModifyOrderParams) -> Result<Value> {
        let params = params.normalized();
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("modifyorder", body).await
    }

    /// Cancel a specific order by ID
    pub async fn cancel_order(&self, order_id: &str) -> Result<Value> {
        self.post(
            "cancelorder",
            json!({"orderid": order_id, "strategy": DEFAULT_STRATEGY}),
        )
        .await
    }

    /// Cancel all open orders for the strategy
    pub async fn cancel_all_orders(&self) -> Result<Value> {
        self.post("cancelallorder", json!({"strategy": DEFAULT_STRATEGY}))
            .await
    }

    /// Get the status of a specific order
    pub async fn order_status(&self, order_id: &str) -> Result<Value> {
        self.post(
            "orderstatus",
            json!({"orderid": order_id, "strategy": DEFAULT_STRATEGY}),
        )
        .await
    }

    /// Get market quotes for a symbol
    pub async fn quotes(&self, params: QuoteParams) -> Result<Value> {
        let params = params.normalized();
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("quotes", body).await
    }

    /// Get market depth for a symbol
    pub async fn depth(&self, params: QuoteParams) -> Result<Value> {
        let params = params.normalized();
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("depth", body).await
    }

    /// Get historical candles
    pub async fn history(&self, params: HistoryParams) -> Result<Value> {
        let params = params.normalized();
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("history", body).await
    }

    /// Get the candle intervals the platform supports
    pub async fn intervals(&self) -> Result<Value> {
        self.post("intervals", json!({})).await
    }

    /// Get metadata for a symbol
    pub async fn symbol_metadata(&self, params: QuoteParams) -> Result<Value> {
        let params = params.normalized();
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("symbol", body).await
    }

    /// Get all available tickers, optionally filtered by exchange
    pub async fn tickers(&self, exchange: Option<&str>) -> Result<Value> {
        let mut body = json!({});
        if let Some(exchange) = exchange {
            body["exchange"] = json!(exchange.to_uppercase());
        }
        self.post("ticker", body).await
    }

    /// Get available funds and margin information
    pub async fn funds(&self) -> Result<Value> {
        self.post("funds", json!({})).await
    }

    /// Get the order book
    pub async fn order_book(&self) -> Result<Value> {
        self.post("orderbook", json!({})).await
    }

    /// Get the trade book
    pub async fn trade_book(&self) -> Result<Value> {
        self.post("tradebook", json!({})).await
    }

    /// Get the position book
    pub async fn position_book(&self) -> Result<Value> {
        self.post("positionbook", json!({})).await
    }

    /// Get portfolio holdings
    pub async fn holdings(&self) -> Result<Value> {
        self.post("holdings", json!({})).await
    }

    /// Get an open position for a specific symbol
    pub async fn open_position(&self, params: OpenPositionParams) -> Result<Value> {
        let params = params.normalized();
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("openposition", body).await
    }

    /// Close all open positions for the strategy
    pub async fn close_all_positions(&self) -> Result<Value> {
        self.post("closeposition", json!({"strategy": DEFAULT_STRATEGY}))
            .await
    }

    /// Place multiple orders at once
    pub async fn basket_order(&self, orders: Vec<BasketLeg>) -> Result<Value> {
        if orders.is_empty() {
            return Err(BrokerError::Validation(
                "basket order requires at least one leg".to_string(),
            ));
        }
        let legs: Vec<BasketLeg> = orders.into_iter().map(BasketLeg::normalized).collect();
        self.post("basketorder", json!({ "orders": legs })).await
    }

    /// Split a large order into smaller chunks
    pub async fn split_order(&self, params: SplitOrderParams) -> Result<Value> {
        let params = params.normalized();
        if params.split_size == 0 {
            return Err(BrokerError::Validation(
                "splitsize must be greater than zero".to_string(),
            ));
        }
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("splitorder", body).await
    }

    /// Place an order that accounts for the current position size
    pub async fn smart_order(&self, params: SmartOrderParams) -> Result<Value> {
        let params = params.normalized();
        let body = serde_json::to_value(&params)
            .map_err(|e| BrokerError::Validation(e.to_string()))?;
        self.post("placesmartorder", body).await
    }
}

/// Ensure the payload carries a `status` field.
///
/// Well-behaved platform responses already do; anything else is wrapped so
/// downstream consumers never have to probe for its presence.
fn normalize_status(payload: Value) -> Value {
    match payload {
        Value::Object(ref obj) if obj.contains_key("status") => payload,
        other => json!({"status": "success", "data": other}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_debug_masks_key() {
        let config = OpenAlgoConfig::new("abcdef1234567890xyz");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("1234567890"));
        assert!(debug_str.contains("abcde...0xyz"));
    }

    #[test]
    fn test_normalize_status_passthrough() {
        let payload = json!({"status": "success", "data": {"cash": 808.18}});
        assert_eq!(normalize_status(payload.clone()), payload);
    }

    #[test]
    fn test_normalize_status_wraps_bare_payloads() {
        let normalized = normalize_status(json!([{"symbol": "SBIN"}]));
        assert_eq!(normalized["status"], "success");
        assert!(normalized["data"].is_array());
    }

    #[tokio::test]
    async fn test_basket_order_rejects_empty_basket() {
        let client = OpenAlgoClient::new(OpenAlgoConfig::new("key"));
        let err = client.basket_order(vec![]).await.unwrap_err();
        assert!(matches!(err, BrokerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_split_order_rejects_zero_split() {
        let client = OpenAlgoClient::new(OpenAlgoConfig::new("key"));
        let params: SplitOrderParams = serde_json::from_str(
            r#"{"symbol": "SBIN", "exchange": "NSE", "action": "BUY",
                "quantity": 100, "splitsize": 0}"#,
        )
        .unwrap();
        let err = client.split_order(params).await.unwrap_err();
        assert!(matches!(err, BrokerError::Validation(_)));
    }
}
