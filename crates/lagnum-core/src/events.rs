use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notifications broadcast by a `LagTimer`. Callers subscribe via
/// `LagTimer::subscribe`; events are delivered whether or not the value is
/// ever polled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The current transition's effective duration elapsed and its value is
    /// settled at the stop value. Emitted exactly once per transition; a
    /// transition superseded by a new `set` before expiry never emits it.
    TargetReached {
        start_value: f64,
        stop_value: f64,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_reached_serializes_tagged() {
        let event = Event::TargetReached {
            start_value: 50.0,
            stop_value: 150.0,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"TargetReached\""));
        assert!(json.contains("\"stop_value\":150.0"));
    }
}
