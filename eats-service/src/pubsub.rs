use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::orders::model::Order;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    PendingOrders,
    CookedOrders,
    OrderUpdates,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::PendingOrders => "pending_orders",
            Topic::CookedOrders => "cooked_orders",
            Topic::OrderUpdates => "order_updates",
        }
    }
}

/// Order snapshot plus the owner of its restaurant, resolved once at publish time.
#[derive(Debug, Clone)]
pub struct OrderEvent {
    pub order: Order,
    pub owner_id: Option<Uuid>,
}

/// In-process hub with one broadcast channel per topic.
#[derive(Clone)]
pub struct PubSub {
    pending_orders: broadcast::Sender<OrderEvent>,
    cooked_orders: broadcast::Sender<OrderEvent>,
    order_updates: broadcast::Sender<OrderEvent>,
}

impl Default for PubSub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PubSub {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending_orders: broadcast::channel(capacity).0,
            cooked_orders: broadcast::channel(capacity).0,
            order_updates: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<OrderEvent> {
        match topic {
            Topic::PendingOrders => &self.pending_orders,
            Topic::CookedOrders => &self.cooked_orders,
            Topic::OrderUpdates => &self.order_updates,
        }
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, topic: Topic, event: OrderEvent) -> usize {
        let order_id = event.order.id;
        match self.sender(topic).send(event) {
            Ok(receivers) => {
                debug!(topic = topic.as_str(), %order_id, receivers, "published order event");
                receivers
            }
            Err(_) => {
                debug!(topic = topic.as_str(), %order_id, "no subscribers for order event");
                0
            }
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }

    /// Stream of events on `topic`. A lagging subscriber skips what it missed.
    pub fn subscribe(&self, topic: Topic) -> impl Stream<Item = OrderEvent> + Send + 'static {
        let receiver = self.sender(topic).subscribe();
        stream::unfold(receiver, move |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(topic = topic.as_str(), skipped, "subscriber lagged; dropping oldest events");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::model::OrderStatus;
    use chrono::Utc;
    use common_money::Money;
    use futures_util::StreamExt;

    fn event(status: OrderStatus) -> OrderEvent {
        let now = Utc::now();
        OrderEvent {
            order: Order {
                id: Uuid::new_v4(),
                customer_id: Some(Uuid::new_v4()),
                driver_id: None,
                restaurant_id: Some(Uuid::new_v4()),
                total: Money::from_cents(1_000),
                status,
                created_at: now,
                updated_at: now,
            },
            owner_id: Some(Uuid::new_v4()),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_not_an_error() {
        let hub = PubSub::default();
        assert_eq!(hub.publish(Topic::PendingOrders, event(OrderStatus::Pending)), 0);
    }

    #[tokio::test]
    async fn fan_out_reaches_every_subscriber_of_the_topic() {
        let hub = PubSub::default();
        let first = hub.subscribe(Topic::OrderUpdates);
        let second = hub.subscribe(Topic::OrderUpdates);
        let other = hub.subscribe(Topic::CookedOrders);
        tokio::pin!(first, second, other);

        let sent = event(OrderStatus::InProgress);
        assert_eq!(hub.publish(Topic::OrderUpdates, sent.clone()), 2);

        assert_eq!(first.next().await.map(|e| e.order.id), Some(sent.order.id));
        assert_eq!(second.next().await.map(|e| e.order.id), Some(sent.order.id));
        assert_eq!(hub.subscriber_count(Topic::CookedOrders), 1);
        let idle = tokio::time::timeout(std::time::Duration::from_millis(20), other.next()).await;
        assert!(idle.is_err(), "other topics stay quiet");
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_to_newest_events() {
        let hub = PubSub::new(2);
        let stream = hub.subscribe(Topic::PendingOrders);
        tokio::pin!(stream);

        let events: Vec<OrderEvent> = (0..4).map(|_| event(OrderStatus::Pending)).collect();
        for item in &events {
            hub.publish(Topic::PendingOrders, item.clone());
        }

        assert_eq!(stream.next().await.map(|e| e.order.id), Some(events[2].order.id));
        assert_eq!(stream.next().await.map(|e| e.order.id), Some(events[3].order.id));
    }
}
