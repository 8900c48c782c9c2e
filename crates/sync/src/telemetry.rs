//! Telemetry events emitted by the cache

use std::collections::BTreeMap;
use tracing::info;

/// Key/value payload of a telemetry event
pub type EventData = BTreeMap<String, String>;

/// Sink for best-effort structured events.
///
/// Implementations must not panic; the cache does not observe their outcome.
pub trait EventLogger: Send + Sync {
    fn log_event(&self, source: &str, event: &str, data: &EventData);
}

/// Forwards telemetry events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventLogger;

impl EventLogger for TracingEventLogger {
    fn log_event(&self, source: &str, event: &str, data: &EventData) {
        info!(
            target: "blazebridge::telemetry",
            source = %source,
            event = %event,
            data = ?data,
            "telemetry_event"
        );
    }
}
