//! Alert sink that reports through tracing.

use tracing::warn;
use trackplan_ports::{Alert, AlertSink};

/// Logs every alert as a `warn!` event. Used when no presentation layer
/// is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn alert(&self, alert: Alert) {
        warn!(
            event = "alert.raised",
            title = %alert.title,
            message = %alert.message,
            raised_at = %alert.raised_at,
        );
    }
}
