//! Raw wire-format event fixtures, as an upstream producer would emit them.

use serde_json::json;

/// Builds the wire bytes of a `product_view` event.
#[must_use]
pub fn product_view_message(product_id: i64, product_name: &str, user_id: Option<i64>) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "event_type": "product_view",
        "product_id": product_id,
        "product_name": product_name,
        "user_id": user_id,
        "timestamp": "2026-03-01T12:00:00Z",
    }))
    .expect("fixture serialization cannot fail")
}

/// Builds the wire bytes of an `order_created` event. Items are
/// `(product_id, product_name, quantity)` triples.
#[must_use]
pub fn order_created_message(
    order_id: i64,
    user_id: i64,
    total_amount: f64,
    delivery_type: &str,
    items: &[(i64, &str, i64)],
) -> Vec<u8> {
    let items: Vec<_> = items
        .iter()
        .map(|(product_id, product_name, quantity)| {
            json!({
                "product_id": product_id,
                "product_name": product_name,
                "quantity": quantity,
            })
        })
        .collect();

    serde_json::to_vec(&json!({
        "event_type": "order_created",
        "order_id": order_id,
        "user_id": user_id,
        "total_amount": total_amount,
        "items_count": items.len(),
        "delivery_type": delivery_type,
        "items": items,
        "created_at": "2026-03-01T12:00:00Z",
    }))
    .expect("fixture serialization cannot fail")
}
