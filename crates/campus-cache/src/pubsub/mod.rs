//! Redis Pub/Sub: channel naming, the publisher and the resubscribing
//! gateway-side subscriber.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{PubSubChannel, BROADCAST_CHANNEL};
pub use publisher::{EventTarget, PubSubEvent, Publisher};
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberConfig, SubscriberError, SubscriberResult,
};
