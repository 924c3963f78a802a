//! Request parameter types for the OpenAlgo v1 endpoints
//!
//! Field names serialize to the platform's wire names. Symbols, exchanges,
//! actions, price types, and products are upper-cased by `normalized()`
//! before dispatch, mirroring what the platform expects.

use serde::{Deserialize, Serialize};

/// Strategy tag attached to every order-side request
pub const DEFAULT_STRATEGY: &str = "Rust";

fn default_strategy() -> String {
    DEFAULT_STRATEGY.to_string()
}

fn default_exchange() -> String {
    "NSE".to_string()
}

fn default_price_type() -> String {
    "MARKET".to_string()
}

fn default_product() -> String {
    "MIS".to_string()
}

/// Parameters for `placeorder`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderParams {
    /// Trading symbol (e.g. SBIN, RELIANCE)
    pub symbol: String,
    /// Order quantity
    pub quantity: u32,
    /// BUY or SELL
    pub action: String,
    /// Exchange (NSE, BSE, NFO, ...)
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// MARKET, LIMIT, SL, SL-M
    #[serde(default = "default_price_type", rename = "pricetype")]
    pub price_type: String,
    /// MIS, CNC, NRML
    #[serde(default = "default_product")]
    pub product: String,
    /// Strategy tag
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Order price (required for LIMIT, SL orders)
    #[serde(default)]
    pub price: f64,
    /// Trigger price (required for SL, SL-M orders)
    #[serde(default)]
    pub trigger_price: f64,
    /// Disclosed quantity
    #[serde(default)]
    pub disclosed_quantity: u32,
}

impl PlaceOrderParams {
    /// Upper-case the fields the platform expects upper-cased
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self.action = self.action.to_uppercase();
        self.exchange = self.exchange.to_uppercase();
        self.price_type = self.price_type.to_uppercase();
        self.product = self.product.to_uppercase();
        self
    }
}

/// Parameters for `modifyorder`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyOrderParams {
    /// Order ID to modify
    #[serde(rename = "orderid")]
    pub order_id: String,
    /// Trading symbol
    pub symbol: String,
    /// New quantity
    pub quantity: u32,
    /// New price
    pub price: f64,
    /// New action (BUY/SELL), when changing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Exchange, when changing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// Price type, when changing
    #[serde(rename = "pricetype", skip_serializing_if = "Option::is_none")]
    pub price_type: Option<String>,
    /// Product, when changing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// New trigger price, when changing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<f64>,
    /// Strategy tag
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl ModifyOrderParams {
    /// Upper-case the fields the platform expects upper-cased
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self.action = self.action.map(|a| a.to_uppercase());
        self.exchange = self.exchange.map(|e| e.to_uppercase());
        self.price_type = self.price_type.map(|p| p.to_uppercase());
        self.product = self.product.map(|p| p.to_uppercase());
        self
    }
}

/// Parameters for symbol-scoped market data lookups (`quotes`, `depth`,
/// `symbol`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteParams {
    /// Trading symbol
    pub symbol: String,
    /// Exchange
    #[serde(default = "default_exchange")]
    pub exchange: String,
}

impl QuoteParams {
    /// Upper-case symbol and exchange
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self.exchange = self.exchange.to_uppercase();
        self
    }
}

/// Parameters for `history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryParams {
    /// Trading symbol
    pub symbol: String,
    /// Exchange
    pub exchange: String,
    /// Candle interval (see the `get_intervals` tool)
    pub interval: String,
    /// Range start (YYYY-MM-DD)
    pub start_date: String,
    /// Range end (YYYY-MM-DD)
    pub end_date: String,
}

impl HistoryParams {
    /// Upper-case symbol and exchange
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self.exchange = self.exchange.to_uppercase();
        self
    }
}

/// Parameters for `openposition`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPositionParams {
    /// Trading symbol
    pub symbol: String,
    /// Exchange
    pub exchange: String,
    /// Product (MIS, CNC, NRML)
    pub product: String,
    /// Strategy tag
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl OpenPositionParams {
    /// Upper-case symbol, exchange, and product
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self.exchange = self.exchange.to_uppercase();
        self.product = self.product.to_uppercase();
        self
    }
}

/// One leg of a basket order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketLeg {
    /// Trading symbol
    pub symbol: String,
    /// Exchange
    pub exchange: String,
    /// BUY or SELL
    pub action: String,
    /// Quantity for this leg
    pub quantity: u32,
    /// MARKET, LIMIT, SL, SL-M
    #[serde(rename = "pricetype", default = "default_price_type")]
    pub price_type: String,
    /// MIS, CNC, NRML
    #[serde(default = "default_product")]
    pub product: String,
}

impl BasketLeg {
    /// Upper-case the fields the platform expects upper-cased
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self.exchange = self.exchange.to_uppercase();
        self.action = self.action.to_uppercase();
        self.price_type = self.price_type.to_uppercase();
        self.product = self.product.to_uppercase();
        self
    }
}

/// Parameters for `splitorder`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitOrderParams {
    /// Trading symbol
    pub symbol: String,
    /// Exchange
    pub exchange: String,
    /// BUY or SELL
    pub action: String,
    /// Total order quantity
    pub quantity: u32,
    /// Size of each split order
    #[serde(rename = "splitsize")]
    pub split_size: u32,
    /// MARKET, LIMIT, SL, SL-M
    #[serde(rename = "pricetype", default = "default_price_type")]
    pub price_type: String,
    /// MIS, CNC, NRML
    #[serde(default = "default_product")]
    pub product: String,
    /// Order price (LIMIT, SL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Trigger price (SL, SL-M)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<f64>,
    /// Strategy tag
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl SplitOrderParams {
    /// Upper-case fields and drop price fields irrelevant to the price type
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self.exchange = self.exchange.to_uppercase();
        self.action = self.action.to_uppercase();
        self.price_type = self.price_type.to_uppercase();
        self.product = self.product.to_uppercase();
        if !matches!(self.price_type.as_str(), "LIMIT" | "SL") {
            self.price = None;
        }
        if !matches!(self.price_type.as_str(), "SL" | "SL-M") {
            self.trigger_price = None;
        }
        self
    }
}

/// Parameters for `placesmartorder`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartOrderParams {
    /// Trading symbol
    pub symbol: String,
    /// BUY or SELL
    pub action: String,
    /// Order quantity
    pub quantity: u32,
    /// Current position size the order should account for
    pub position_size: i64,
    /// Exchange
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// MARKET, LIMIT, SL, SL-M
    #[serde(rename = "pricetype", default = "default_price_type")]
    pub price_type: String,
    /// MIS, CNC, NRML
    #[serde(default = "default_product")]
    pub product: String,
    /// Strategy tag
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl SmartOrderParams {
    /// Upper-case the fields the platform expects upper-cased
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self.action = self.action.to_uppercase();
        self.exchange = self.exchange.to_uppercase();
        self.price_type = self.price_type.to_uppercase();
        self.product = self.product.to_uppercase();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_order_defaults() {
        let params: PlaceOrderParams = serde_json::from_str(
            r#"{"symbol": "sbin", "quantity": 10, "action": "buy"}"#,
        )
        .unwrap();
        let params = params.normalized();

        assert_eq!(params.symbol, "SBIN");
        assert_eq!(params.action, "BUY");
        assert_eq!(params.exchange, "NSE");
        assert_eq!(params.price_type, "MARKET");
        assert_eq!(params.product, "MIS");
        assert_eq!(params.strategy, DEFAULT_STRATEGY);
    }

    #[test]
    fn test_place_order_wire_names() {
        let params = PlaceOrderParams {
            symbol: "SBIN".into(),
            quantity: 1,
            action: "BUY".into(),
            exchange: "NSE".into(),
            price_type: "LIMIT".into(),
            product: "MIS".into(),
            strategy: DEFAULT_STRATEGY.into(),
            price: 800.5,
            trigger_price: 0.0,
            disclosed_quantity: 0,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["pricetype"], "LIMIT");
        assert!(json.get("price_type").is_none());
    }

    #[test]
    fn test_split_order_drops_irrelevant_prices() {
        let params: SplitOrderParams = serde_json::from_str(
            r#"{"symbol": "SBIN", "exchange": "NSE", "action": "BUY",
                "quantity": 100, "splitsize": 10, "price": 800.0, "trigger_price": 790.0}"#,
        )
        .unwrap();
        let params = params.normalized();

        // MARKET orders carry neither price nor trigger price
        assert!(params.price.is_none());
        assert!(params.trigger_price.is_none());
    }

    #[test]
    fn test_modify_order_optional_fields_omitted() {
        let params = ModifyOrderParams {
            order_id: "2407".into(),
            symbol: "SBIN".into(),
            quantity: 5,
            price: 810.0,
            action: None,
            exchange: None,
            price_type: None,
            product: None,
            trigger_price: None,
            strategy: DEFAULT_STRATEGY.into(),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["orderid"], "2407");
        assert!(json.get("action").is_none());
    }
}
