use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::{OutboxHandler, PayloadCodec};
use crate::clock::{add_duration, Clock};
use crate::error::HandlerError;
use crate::item::{OutboxPayload, OutboxType};

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_RETENTION: Duration = Duration::from_secs(10 * 24 * 60 * 60);

type FailureHook<T> = Box<dyn Fn(T) + Send + Sync>;

/// A handler for a typed payload `T`, driven by a closure.
///
/// - the payload is checked against `T` and encoded with a [`PayloadCodec`] when added
/// - the first run is immediate, every retry runs `retry_delay` later
/// - the item fails terminally once `max_retries` retries have been made
/// - completed items are retained for ten days by default
///
/// ## Example
///
/// ```ignore
/// let handler = SimpleOutboxHandler::new("order-placed", clock, |order: OrderPlaced| {
///     broker.publish("orders", &order).map_err(|e| HandlerError::failed(e.to_string()))
/// })
/// .with_codec(PayloadCodec::Bitcode)
/// .with_max_retries(5)
/// .with_failure_handler(|order: OrderPlaced| alert(order.id));
/// ```
pub struct SimpleOutboxHandler<T, F> {
    supported_type: OutboxType,
    clock: Arc<dyn Clock>,
    codec: PayloadCodec,
    max_retries: u32,
    retry_delay: Duration,
    retention: Duration,
    on_handle: F,
    on_failure: Option<FailureHook<T>>,
    _payload: PhantomData<fn() -> T>,
}

impl<T, F> SimpleOutboxHandler<T, F>
where
    T: Serialize + DeserializeOwned,
    F: Fn(T) -> Result<(), HandlerError> + Send + Sync,
{
    pub fn new(supported_type: impl Into<OutboxType>, clock: Arc<dyn Clock>, on_handle: F) -> Self {
        Self {
            supported_type: supported_type.into(),
            clock,
            codec: PayloadCodec::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            retention: DEFAULT_RETENTION,
            on_handle,
            on_failure: None,
            _payload: PhantomData,
        }
    }

    pub fn with_codec(mut self, codec: PayloadCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Invoked with the decoded payload when the item fails terminally.
    pub fn with_failure_handler(mut self, hook: impl Fn(T) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Box::new(hook));
        self
    }

    pub fn codec(&self) -> PayloadCodec {
        self.codec
    }
}

impl<T, F> OutboxHandler for SimpleOutboxHandler<T, F>
where
    T: Serialize + DeserializeOwned,
    F: Fn(T) -> Result<(), HandlerError> + Send + Sync,
{
    fn supported_type(&self) -> OutboxType {
        self.supported_type.clone()
    }

    fn serialize(&self, payload: &OutboxPayload) -> Result<String, HandlerError> {
        let typed: T = serde_json::from_value(payload.clone())?;
        self.codec.encode(&typed)
    }

    fn next_execution_time(&self, current_retries: u32) -> DateTime<Utc> {
        let now = self.clock.now();
        match current_retries {
            0 => now,
            _ => add_duration(now, self.retry_delay),
        }
    }

    fn has_reached_max_retries(&self, retries: u32) -> bool {
        retries >= self.max_retries
    }

    fn handle(&self, payload: &str) -> Result<(), HandlerError> {
        let typed: T = self.codec.decode(payload)?;
        (self.on_handle)(typed)
    }

    fn handle_failure(&self, payload: &str) {
        let Some(hook) = &self.on_failure else {
            return;
        };
        match self.codec.decode::<T>(payload) {
            Ok(typed) => hook(typed),
            Err(err) => warn!(
                item_type = %self.supported_type,
                error = %err,
                "could not decode payload for failure hook"
            ),
        }
    }

    fn retention_duration(&self) -> Duration {
        self.retention
    }
}
