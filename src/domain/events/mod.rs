//! Domain events published to the message bus.
//!
//! Publishing is fire-and-forget: it runs off the request path and a
//! delivery failure never fails the operation that raised the event.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    OrderPlaced {
        order_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
        currency: String,
    },
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            DomainEvent::OrderPlaced { .. } => "nextstore.orders.placed",
        }
    }
}

pub async fn publish(client: &async_nats::Client, event: &DomainEvent) {
    match serde_json::to_vec(event) {
        Ok(payload) => {
            if let Err(err) = client.publish(event.subject().to_string(), payload.into()).await {
                tracing::warn!(subject = event.subject(), error = %err, "event publish failed");
            }
        }
        Err(err) => tracing::warn!(error = %err, "event serialization failed"),
    }
}
