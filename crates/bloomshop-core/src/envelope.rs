//! Event envelope and typed payloads shared by producers and the aggregator.
//!
//! Envelopes serialize to a flat JSON object: `event_type` and `timestamp`
//! sit next to the payload fields rather than nesting them. Payload shapes
//! are not versioned; decoding is deliberately lenient so producers and the
//! aggregator can be deployed independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event type emitted when a product detail page is viewed.
pub const EVENT_PRODUCT_VIEW: &str = "product_view";

/// Event type emitted when an order is created.
pub const EVENT_ORDER_CREATED: &str = "order_created";

/// Wire-format envelope for every published event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Event type name used for consumer-side routing.
    pub event_type: String,
    /// Publish timestamp stamped by the producer.
    pub timestamp: DateTime<Utc>,
    /// Payload fields, flattened into the same JSON object.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    /// Builds an envelope from any serializable payload.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the payload does not serialize to a
    /// JSON object.
    pub fn from_payload<T: Serialize>(
        event_type: &str,
        payload: &T,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(payload)?;
        let payload = match value {
            Value::Object(map) => map,
            other => {
                return Err(serde::ser::Error::custom(format!(
                    "event payload must be a JSON object, got {other}"
                )));
            }
        };
        Ok(Self {
            event_type: event_type.to_owned(),
            timestamp,
            payload,
        })
    }

    /// Builds a `product_view` envelope.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn product_view(
        payload: &ProductViewPayload,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Self::from_payload(EVENT_PRODUCT_VIEW, payload, timestamp)
    }

    /// Builds an `order_created` envelope.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn order_created(
        payload: &OrderCreatedPayload,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Self::from_payload(EVENT_ORDER_CREATED, payload, timestamp)
    }

    /// Serializes the envelope to its wire bytes.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn unknown_product_name() -> String {
    "Unknown".to_owned()
}

fn unknown_delivery_type() -> String {
    "unknown".to_owned()
}

/// Payload of a `product_view` event.
///
/// `product_id` is required; everything else defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductViewPayload {
    /// Catalog identifier of the viewed product.
    pub product_id: i64,
    /// Display name at view time; `"Unknown"` when the producer omits it.
    #[serde(default = "unknown_product_name")]
    pub product_name: String,
    /// Viewer identity, when known.
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// One line item inside an `order_created` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Catalog identifier of the ordered product.
    pub product_id: i64,
    /// Display name at order time; `"Unknown"` when the producer omits it.
    #[serde(default = "unknown_product_name")]
    pub product_name: String,
    /// Units ordered. Informational only: aggregation counts line items,
    /// not units.
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Payload of an `order_created` event.
///
/// `order_id`, `user_id`, and `total_amount` are required; a message missing
/// any of them is malformed and dropped by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedPayload {
    /// Identifier of the created order.
    pub order_id: i64,
    /// Identifier of the ordering user.
    pub user_id: i64,
    /// Order total.
    pub total_amount: f64,
    /// Number of line items as reported by the producer.
    #[serde(default)]
    pub items_count: i32,
    /// Delivery method; `"unknown"` when the producer omits it.
    #[serde(default = "unknown_delivery_type")]
    pub delivery_type: String,
    /// Ordered line items.
    #[serde(default)]
    pub items: Vec<OrderLine>,
    /// Order creation time as reported by the producer.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
