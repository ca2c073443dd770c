//! Redis Pub/Sub subscriber.
//!
//! One subscriber connection feeds a whole gateway process. Channels are
//! added and removed at runtime as rooms gain and lose local sockets, and
//! a dropped Redis connection is re-established with the same channel set.

use crate::pubsub::{PubSubChannel, PubSubEvent};
use futures_util::StreamExt;
use redis::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to parse event: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Received message from Pub/Sub
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Channel the message was received on
    pub channel: PubSubChannel,
    /// Parsed event (if valid JSON)
    pub event: Option<PubSubEvent>,
    /// Raw payload
    pub payload: String,
}

impl ReceivedMessage {
    /// Create from raw Redis message
    fn from_redis(channel_name: String, payload: String) -> Self {
        let channel = PubSubChannel::parse(&channel_name);
        let event = serde_json::from_str(&payload).ok();

        Self {
            channel,
            event,
            payload,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Buffer size of the fan-in event channel
    pub event_buffer: usize,
    /// Delay before re-dialing a lost connection
    pub reconnect_delay: Duration,
    /// Channels held for the lifetime of the subscriber
    pub initial_channels: Vec<PubSubChannel>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            event_buffer: 1024,
            reconnect_delay: Duration::from_millis(1000),
            initial_channels: Vec::new(),
        }
    }
}

/// Channel-set change requests sent to the listener task
#[derive(Debug)]
enum Command {
    Add(String),
    Remove(String),
    Stop,
}

/// How a listener pass ended
enum Exit {
    Stopped,
    Reconnect,
}

/// Redis Pub/Sub subscriber
///
/// `channels` is the desired channel set, not a mirror of connection
/// state: the listener converges the live connection to it, and a
/// reconnect replays it wholesale.
pub struct Subscriber {
    channels: Arc<RwLock<HashSet<String>>>,
    events_tx: broadcast::Sender<ReceivedMessage>,
    commands: mpsc::Sender<Command>,
}

impl Subscriber {
    /// Start the background listener and subscribe the initial channels
    pub async fn new(config: SubscriberConfig) -> SubscriberResult<Self> {
        let (events_tx, _) = broadcast::channel(config.event_buffer);
        let (commands_tx, commands_rx) = mpsc::channel(32);
        let channels = Arc::new(RwLock::new(HashSet::new()));

        let initial = config.initial_channels.clone();
        tokio::spawn(Self::listen(
            config,
            channels.clone(),
            events_tx.clone(),
            commands_rx,
        ));

        let subscriber = Self {
            channels,
            events_tx,
            commands: commands_tx,
        };

        for channel in &initial {
            subscriber.subscribe(channel).await?;
        }

        Ok(subscriber)
    }

    /// Reconnect loop around the listener
    async fn listen(
        config: SubscriberConfig,
        channels: Arc<RwLock<HashSet<String>>>,
        events_tx: broadcast::Sender<ReceivedMessage>,
        mut commands: mpsc::Receiver<Command>,
    ) {
        loop {
            match Self::pump(&config, &channels, &events_tx, &mut commands).await {
                Ok(Exit::Stopped) => {
                    tracing::info!("Subscriber shutting down");
                    break;
                }
                Ok(Exit::Reconnect) => {
                    tracing::warn!("Pub/Sub stream ended, reconnecting");
                    tokio::time::sleep(config.reconnect_delay).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Subscriber error, reconnecting");
                    tokio::time::sleep(config.reconnect_delay).await;
                }
            }
        }
    }

    /// Dial Redis, replay the channel set, and pump until stop or failure
    async fn pump(
        config: &SubscriberConfig,
        channels: &Arc<RwLock<HashSet<String>>>,
        events_tx: &broadcast::Sender<ReceivedMessage>,
        commands: &mut mpsc::Receiver<Command>,
    ) -> SubscriberResult<Exit> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        {
            let desired = channels.read().await;
            for channel in desired.iter() {
                pubsub.subscribe(channel).await?;
            }
        }

        tracing::info!("Subscriber connected to Redis");

        loop {
            // The message stream borrows the connection, so every command
            // first bounces out of the inner loop to free `pubsub`.
            let cmd = {
                let mut stream = pubsub.on_message();
                loop {
                    tokio::select! {
                        msg = stream.next() => match msg {
                            Some(msg) => Self::forward(events_tx, &msg),
                            None => return Ok(Exit::Reconnect),
                        },
                        cmd = commands.recv() => break cmd,
                    }
                }
            };

            match cmd {
                Some(Command::Add(channel)) => {
                    // Intent is recorded before the round-trip: if the
                    // subscribe fails here, the reconnect replay still
                    // converges the connection to the set.
                    channels.write().await.insert(channel.clone());
                    pubsub.subscribe(&channel).await?;
                    tracing::debug!(channel = %channel, "Subscribed to channel");
                }
                Some(Command::Remove(channel)) => {
                    channels.write().await.remove(&channel);
                    pubsub.unsubscribe(&channel).await?;
                    tracing::debug!(channel = %channel, "Unsubscribed from channel");
                }
                Some(Command::Stop) | None => return Ok(Exit::Stopped),
            }
        }
    }

    /// Hand one raw Redis message to the fan-in channel
    fn forward(events_tx: &broadcast::Sender<ReceivedMessage>, msg: &redis::Msg) {
        let channel_name = msg.get_channel_name().to_string();
        let payload: String = msg.get_payload().unwrap_or_default();

        // A send error only means nobody is listening yet.
        let _ = events_tx.send(ReceivedMessage::from_redis(channel_name.clone(), payload));

        tracing::trace!(channel = %channel_name, "Received Pub/Sub message");
    }

    /// Add a channel to the subscription set
    pub async fn subscribe(&self, channel: &PubSubChannel) -> SubscriberResult<()> {
        self.commands
            .send(Command::Add(channel.name()))
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    /// Remove a channel from the subscription set
    pub async fn unsubscribe(&self, channel: &PubSubChannel) -> SubscriberResult<()> {
        self.commands
            .send(Command::Remove(channel.name()))
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    /// Get a receiver for the fan-in event channel
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.events_tx.subscribe()
    }

    /// Snapshot of the desired channel set
    pub async fn subscribed_channels(&self) -> Vec<String> {
        self.channels.read().await.iter().cloned().collect()
    }

    /// Shut down the listener task
    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.commands
            .send(Command::Stop)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}
