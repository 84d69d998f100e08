//! In-process publish/subscribe bus for content events.
//!
//! The bus is an explicitly constructed, injectable component: tests build
//! an isolated bus per case and the bootstrap wires one with process-wide
//! lifetime. Each topic is a broadcast channel; delivery is fire-and-forget
//! to whichever subscribers are registered at publish time, with no replay
//! and no persistence.

use tokio::sync::broadcast;
use tracing::{trace, warn};

use super::events::{ContentEvent, Topic};

/// Default per-topic channel capacity used by the bootstrap.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Broadcast bus keyed by [`Topic`].
#[derive(Debug, Clone)]
pub struct EventBus {
    post_added: broadcast::Sender<ContentEvent>,
    post_updated: broadcast::Sender<ContentEvent>,
    comment_added: broadcast::Sender<ContentEvent>,
}

impl EventBus {
    /// Build a bus whose per-topic channels buffer `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (post_added, _) = broadcast::channel(capacity);
        let (post_updated, _) = broadcast::channel(capacity);
        let (comment_added, _) = broadcast::channel(capacity);
        Self {
            post_added,
            post_updated,
            comment_added,
        }
    }

    /// Publish an event to its topic's current subscribers.
    ///
    /// Fire-and-forget: having no subscribers is not an error, and publish
    /// failures are never surfaced to the mutation that triggered them.
    pub fn publish(&self, event: ContentEvent) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            trace!(topic = %topic, "event published with no subscribers");
        }
    }

    /// Open a live subscription to a topic.
    ///
    /// The stream yields every payload published from this moment onward;
    /// events published earlier are missed permanently. Dropping the
    /// subscription is the only unsubscribe.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        Subscription {
            topic,
            receiver: self.sender(topic).subscribe(),
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<ContentEvent> {
        match topic {
            Topic::PostAdded => &self.post_added,
            Topic::PostUpdated => &self.post_updated,
            Topic::CommentAdded => &self.comment_added,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Per-subscriber live event sequence for one topic.
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    receiver: broadcast::Receiver<ContentEvent>,
}

impl Subscription {
    /// Topic this subscription listens on.
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// Wait for the next event; `None` once the bus is gone.
    ///
    /// A subscriber that falls behind the channel capacity skips the
    /// overwritten events and keeps receiving (at-most-once delivery per
    /// connected subscriber, not a queue).
    pub async fn next(&mut self) -> Option<ContentEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(topic = %self.topic, skipped, "subscriber lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::PostEvent;
    use crate::domain::post::{Post, PostId, Title};
    use crate::domain::user::UserId;
    use rstest::rstest;

    fn post_added(title: &str) -> ContentEvent {
        let title = Title::new(title).expect("valid title");
        let post = Post::new(PostId::random(), title, UserId::random());
        ContentEvent::PostAdded(PostEvent::from(&post))
    }

    #[rstest]
    #[tokio::test]
    async fn each_subscriber_receives_every_payload() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe(Topic::PostAdded);
        let mut second = bus.subscribe(Topic::PostAdded);

        let event = post_added("Hello");
        bus.publish(event.clone());

        assert_eq!(first.next().await, Some(event.clone()));
        assert_eq!(second.next().await, Some(event));
    }

    #[rstest]
    #[tokio::test]
    async fn late_subscribers_miss_earlier_events() {
        let bus = EventBus::new(8);
        bus.publish(post_added("before"));

        let mut late = bus.subscribe(Topic::PostAdded);
        let after = post_added("after");
        bus.publish(after.clone());

        assert_eq!(late.next().await, Some(after));
    }

    #[rstest]
    #[tokio::test]
    async fn topics_are_independent() {
        let bus = EventBus::new(8);
        let mut updates = bus.subscribe(Topic::PostUpdated);

        bus.publish(post_added("ignored"));
        let update = ContentEvent::PostUpdated(match post_added("seen") {
            ContentEvent::PostAdded(payload) => payload,
            other => panic!("unexpected event {other:?}"),
        });
        bus.publish(update.clone());

        assert_eq!(updates.next().await, Some(update));
    }

    #[rstest]
    fn publishing_without_subscribers_is_not_an_error() {
        let bus = EventBus::new(8);
        bus.publish(post_added("nobody listening"));
    }

    #[rstest]
    #[tokio::test]
    async fn lagged_subscriber_skips_and_continues() {
        let bus = EventBus::new(1);
        let mut slow = bus.subscribe(Topic::PostAdded);

        bus.publish(post_added("first"));
        let second = post_added("second");
        bus.publish(second.clone());

        // Capacity 1: the first event was overwritten, the second survives.
        assert_eq!(slow.next().await, Some(second));
    }
}
