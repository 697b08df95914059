//! Observability collaborator injected into the aggregation pipeline.
//!
//! Components never log through ambient state; they report named events to an
//! [`Observer`] handed to them by the session that owns them.

use tracing::{debug, warn};

pub mod events {
    pub const NORMALIZED: &str = "transactions.normalized";
    pub const BUCKETIZED: &str = "weeks.bucketized";
    pub const CATEGORIES_AGGREGATED: &str = "categories.aggregated";
    pub const CACHE_HIT: &str = "cache.hit";
    pub const CACHE_MISS: &str = "cache.miss";
    pub const CACHE_INVALIDATED: &str = "cache.invalidated";
    /// A derivation failed and was replaced by its empty default.
    pub const FAULT: &str = "aggregation.fault";
}

pub trait Observer: Send + Sync {
    fn record(&self, event: &str, fields: &[(&str, String)]);
}

/// Forwards events to `tracing`. Faults are emitted at `warn`, everything else
/// at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn record(&self, event: &str, fields: &[(&str, String)]) {
        let rendered = render_fields(fields);
        if event == events::FAULT {
            warn!(event, fields = %rendered, "Aggregation fault");
        } else {
            debug!(event, fields = %rendered, "Aggregation event");
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn record(&self, _event: &str, _fields: &[(&str, String)]) {}
}

fn render_fields(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fields() {
        let fields = [("kept", "3".to_string()), ("dropped", "1".to_string())];
        assert_eq!(render_fields(&fields), "kept=3 dropped=1");
        assert_eq!(render_fields(&[]), "");
    }

    #[test]
    fn test_observers_accept_events() {
        TracingObserver.record(events::FAULT, &[("stage", "weekly".to_string())]);
        NoopObserver.record(events::NORMALIZED, &[]);
    }
}
