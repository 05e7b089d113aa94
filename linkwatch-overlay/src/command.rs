//! Inbound command surface.
//!
//! Requests arrive as `{ "event": <name>, "sid": <n>, "payload": {...} }`
//! and are routed through a static table of event name to handler.

use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::CommandError;
use crate::mode::Mode;
use crate::overlay::Overlay;
use crate::threshold::parse_kilobytes;

/// Clear the display and enter the requested mode.
pub const DISPLAY_START: &str = "linkwatchDisplayStart";
/// Emit one build when monitoring, otherwise clear the display.
pub const DISPLAY_UPDATE: &str = "linkwatchDisplayUpdate";
/// Stop monitoring and clear the display.
pub const DISPLAY_STOP: &str = "linkwatchDisplayStop";
/// Replace the traffic threshold (kilobytes/sec).
pub const THRESHOLD_UPDATE: &str = "trafficThresholdUpdate";

/// A decoded inbound request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request {
    pub event: String,
    #[serde(default)]
    pub sid: u64,
    #[serde(default)]
    pub payload: Value,
}

impl Request {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            sid: 0,
            payload,
        }
    }

    /// Decode one JSON request.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(line)?)
    }
}

/// A command handler.
pub type Handler =
    for<'a> fn(&'a Overlay, &'a Value) -> BoxFuture<'a, Result<(), CommandError>>;

const HANDLERS: &[(&str, Handler)] = &[
    (DISPLAY_START, display_start),
    (DISPLAY_UPDATE, display_update),
    (DISPLAY_STOP, display_stop),
    (THRESHOLD_UPDATE, threshold_update),
];

/// Look up the handler registered for an event name.
pub fn handler_for(event: &str) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(name, _)| *name == event)
        .map(|(_, handler)| *handler)
}

/// Names of all handled events.
pub fn events() -> impl Iterator<Item = &'static str> {
    HANDLERS.iter().map(|(name, _)| *name)
}

/// Route a request to its handler.
pub async fn dispatch(overlay: &Overlay, request: &Request) -> Result<(), CommandError> {
    let handler = handler_for(&request.event)
        .ok_or_else(|| CommandError::UnknownEvent(request.event.clone()))?;
    debug!("Dispatching {} (sid {})", request.event, request.sid);
    handler(overlay, &request.payload).await
}

fn display_start<'a>(
    overlay: &'a Overlay,
    payload: &'a Value,
) -> BoxFuture<'a, Result<(), CommandError>> {
    Box::pin(async move {
        let mode = Mode::from_request(payload.get("mode").and_then(Value::as_str));
        overlay.start(mode).await?;
        Ok(())
    })
}

fn display_update<'a>(
    overlay: &'a Overlay,
    _payload: &'a Value,
) -> BoxFuture<'a, Result<(), CommandError>> {
    Box::pin(async move {
        overlay.update().await?;
        Ok(())
    })
}

fn display_stop<'a>(
    overlay: &'a Overlay,
    _payload: &'a Value,
) -> BoxFuture<'a, Result<(), CommandError>> {
    Box::pin(async move {
        overlay.stop().await?;
        Ok(())
    })
}

fn threshold_update<'a>(
    overlay: &'a Overlay,
    payload: &'a Value,
) -> BoxFuture<'a, Result<(), CommandError>> {
    Box::pin(async move {
        if let Some(kilobytes) = parse_kilobytes(payload.get("threshold"))? {
            overlay.set_threshold_kbps(kilobytes);
        }
        Ok(())
    })
}
