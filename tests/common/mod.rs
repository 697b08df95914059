//! Shared fixtures for integration tests.
//!
//! Provides a `RecordingObserver` that keeps every reported event so tests can
//! assert on what the aggregation session did, plus a few raw feeds.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use spendscope::config::EngineConfig;
use spendscope::observability::Observer;
use spendscope::AggregationSession;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub fields: Vec<(String, String)>,
}

impl RecordedEvent {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn named(&self, name: &str) -> Vec<RecordedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Observer for RecordingObserver {
    fn record(&self, event: &str, fields: &[(&str, String)]) {
        self.events.lock().unwrap().push(RecordedEvent {
            name: event.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
    }
}

/// A session wired to a fresh recording observer.
pub fn recording_session(config: EngineConfig) -> (AggregationSession, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let session = AggregationSession::with_observer(config, observer.clone());
    (session, observer)
}

/// The three-transaction example: Food 20 + 30, Rent 10.
pub fn scenario_feed() -> Value {
    json!([
        {"date": "2024-01-03", "amount": 20, "category": "Food"},
        {"date": "2024-01-10", "amount": 30, "category": "Food"},
        {"date": "2024-01-15", "amount": 10, "category": "Rent"}
    ])
}

/// A feed mixing every supported field spelling plus records that must be
/// dropped.
pub fn messy_feed() -> Value {
    json!([
        {"transactionDate": "2024-02-02", "value": "$1,250.00", "categoryName": "Rent", "id": 1},
        {"postedAt": "2024-02-05T09:30:00Z", "amount": 42.5, "description": "Groceries", "id": 2},
        {"date": "02/07/2024", "amount": "12,50", "payee": "Cafe", "id": 3},
        {"timestamp": 1_707_523_200_000_i64, "total": 8, "category": "Transport", "id": 4},
        {"date": "soon", "amount": 99, "category": "Food", "id": 5},
        {"amount": 10, "category": "Food", "id": 6},
        {"created_at": "2024-02-12", "amount": "free", "category": "Gifts", "id": 7},
        "not a record",
        null
    ])
}
