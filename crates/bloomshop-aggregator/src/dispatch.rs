//! Per-message routing from raw broker payloads to handlers.

use serde::Deserialize;
use sqlx::PgPool;

use bloomshop_core::clock::Clock;
use bloomshop_core::envelope::{
    EVENT_ORDER_CREATED, EVENT_PRODUCT_VIEW, OrderCreatedPayload, ProductViewPayload,
};
use bloomshop_core::error::PipelineError;
use bloomshop_core::topics;

use crate::handlers;

/// Minimal projection used to peek at the routing field before committing
/// to a full payload shape.
#[derive(Debug, Deserialize)]
struct EventKind {
    #[serde(default)]
    event_type: String,
}

/// Routes one consumed message to its handler.
///
/// Routing accepts either the topic or the embedded `event_type`, matching
/// what producers actually send. Unknown events are warn-logged and dropped
/// without error so the loop keeps its offset moving.
///
/// # Errors
///
/// Returns `MalformedEvent` when the payload does not decode, and
/// propagates `HandlerFailure` from the handlers.
pub async fn dispatch(
    pool: &PgPool,
    clock: &dyn Clock,
    topic: &str,
    payload: &[u8],
) -> Result<(), PipelineError> {
    let kind: EventKind =
        serde_json::from_slice(payload).map_err(|err| PipelineError::malformed(topic, err))?;

    if topic == topics::PRODUCT_VIEWS || kind.event_type == EVENT_PRODUCT_VIEW {
        let event: ProductViewPayload =
            serde_json::from_slice(payload).map_err(|err| PipelineError::malformed(topic, err))?;
        handlers::handle_product_view(pool, clock, &event).await
    } else if topic == topics::ORDER_EVENTS || kind.event_type == EVENT_ORDER_CREATED {
        let event: OrderCreatedPayload =
            serde_json::from_slice(payload).map_err(|err| PipelineError::malformed(topic, err))?;
        handlers::handle_order_created(pool, clock, &event).await
    } else {
        tracing::warn!(
            topic,
            event_type = %kind.event_type,
            "unknown event type; dropping message"
        );
        Ok(())
    }
}
