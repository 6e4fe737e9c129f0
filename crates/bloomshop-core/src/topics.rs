//! Topic and consumer-group names shared across services.

/// Topic carrying product view events.
pub const PRODUCT_VIEWS: &str = "product_views";

/// Topic carrying order lifecycle events.
pub const ORDER_EVENTS: &str = "order_events";

/// Topic carrying catalog lifecycle events (created/updated/deleted).
/// Published by the catalog service; not aggregated today.
pub const CATALOG_EVENTS: &str = "catalog_events";

/// Consumer group under which aggregator instances share partitions.
pub const CONSUMER_GROUP: &str = "analytics-service";

/// Topics the aggregator subscribes to.
pub const AGGREGATED_TOPICS: &[&str] = &[PRODUCT_VIEWS, ORDER_EVENTS];
