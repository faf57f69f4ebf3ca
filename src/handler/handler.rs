use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::HandlerError;
use crate::item::{OutboxPayload, OutboxType};

/// Business logic for one outbox item type.
///
/// A handler is responsible for:
/// - serializing the payload when an item is added
/// - computing the next execution time and the max-retries policy
/// - handling the serialized payload (may fail, triggering a retry)
/// - reacting to terminal failure
/// - telling cleanup how long completed items are retained
///
/// Handlers run concurrently on the worker pool and must be `Send + Sync`.
/// Delivery is at-least-once: `handle` may see the same payload again after
/// a crash or a stale claim, so it should be idempotent.
///
/// ## Example
///
/// ```ignore
/// struct WelcomeEmailHandler;
///
/// impl OutboxHandler for WelcomeEmailHandler {
///     fn supported_type(&self) -> OutboxType { OutboxType::new("welcome-email") }
///     fn serialize(&self, payload: &OutboxPayload) -> Result<String, HandlerError> {
///         Ok(payload.to_string())
///     }
///     fn next_execution_time(&self, _retries: u32) -> DateTime<Utc> { Utc::now() }
///     fn has_reached_max_retries(&self, retries: u32) -> bool { retries >= 3 }
///     fn handle(&self, payload: &str) -> Result<(), HandlerError> { send_email(payload) }
///     fn handle_failure(&self, payload: &str) { alert_operator(payload) }
///     fn retention_duration(&self) -> Duration { Duration::from_secs(7 * 24 * 3600) }
/// }
/// ```
pub trait OutboxHandler: Send + Sync {
    /// The item type this handler processes.
    fn supported_type(&self) -> OutboxType;

    /// Turn the business payload into the string stored on the item.
    fn serialize(&self, payload: &OutboxPayload) -> Result<String, HandlerError>;

    /// When the item should run next, given the retries performed so far.
    fn next_execution_time(&self, current_retries: u32) -> DateTime<Utc>;

    fn has_reached_max_retries(&self, retries: u32) -> bool;

    /// Perform the side effect.
    fn handle(&self, payload: &str) -> Result<(), HandlerError>;

    /// Invoked once when the item fails terminally. Best effort.
    fn handle_failure(&self, payload: &str);

    /// How long a completed item is kept before cleanup may delete it.
    fn retention_duration(&self) -> Duration;

    fn supports(&self, item_type: &OutboxType) -> bool {
        self.supported_type() == *item_type
    }
}
