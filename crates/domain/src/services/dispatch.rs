//! Alert dispatch contract.
//!
//! Detection hands high/critical events to an injected dispatcher; the
//! concrete implementation (contact resolution, quiet hours, delivery
//! channels) lives at the application layer. Dispatchers never raise:
//! failures are reported as attempts with a failed outcome so a delivery
//! problem cannot abort ping ingestion.

use std::sync::Mutex;

use uuid::Uuid;

use crate::models::contact::ContactMethod;
use crate::models::geofence_event::GeofenceEvent;

/// Result of one notification send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Delivered to the channel.
    Sent,
    /// The channel reported a failure.
    Failed(String),
    /// Skipped before sending (quiet hours, missing address).
    Skipped(String),
}

/// One (contact, method) delivery attempt for an event.
#[derive(Debug, Clone)]
pub struct SendAttempt {
    pub contact_id: Uuid,
    pub contact_name: String,
    pub method: ContactMethod,
    pub outcome: SendOutcome,
}

/// Dispatcher for alertable geofence events.
///
/// Safe to call with zero resolved contacts (returns an empty attempt
/// list). Implementations must not propagate errors to the caller.
#[async_trait::async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn dispatch(&self, event: &GeofenceEvent) -> Vec<SendAttempt>;
}

/// Mock dispatcher for development and testing.
///
/// Records dispatched event ids and optionally simulates channel failures.
#[derive(Debug, Default)]
pub struct MockDispatcher {
    pub simulate_failure: bool,
    dispatched: Mutex<Vec<Uuid>>,
}

impl MockDispatcher {
    /// Create a new mock dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock dispatcher that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Event ids dispatched so far.
    pub fn dispatched_events(&self) -> Vec<Uuid> {
        self.dispatched.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AlertDispatcher for MockDispatcher {
    async fn dispatch(&self, event: &GeofenceEvent) -> Vec<SendAttempt> {
        self.dispatched.lock().unwrap().push(event.event_id);

        let outcome = if self.simulate_failure {
            tracing::warn!(
                event_id = %event.event_id,
                animal_id = %event.animal_id,
                "Mock dispatcher simulating failure"
            );
            SendOutcome::Failed("Simulated failure".to_string())
        } else {
            tracing::info!(
                event_id = %event.event_id,
                animal_id = %event.animal_id,
                transition = %event.transition,
                severity = %event.severity,
                "Mock: would dispatch geofence alert"
            );
            SendOutcome::Sent
        };

        vec![SendAttempt {
            contact_id: Uuid::nil(),
            contact_name: "mock".to_string(),
            method: ContactMethod::Sms,
            outcome,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::geofence_event::{Severity, TransitionType};
    use chrono::Utc;

    fn test_event() -> GeofenceEvent {
        GeofenceEvent {
            id: 1,
            event_id: Uuid::new_v4(),
            animal_id: Uuid::new_v4(),
            zone_id: None,
            zone_name: None,
            ping_id: Uuid::new_v4(),
            transition: TransitionType::Violation,
            severity: Severity::High,
            distance_from_boundary_m: Some(87.3),
            duration_outside_secs: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mock_dispatcher_records_event() {
        let dispatcher = MockDispatcher::new();
        let event = test_event();

        let attempts = dispatcher.dispatch(&event).await;
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].outcome, SendOutcome::Sent);
        assert_eq!(dispatcher.dispatched_events(), vec![event.event_id]);
    }

    #[tokio::test]
    async fn test_mock_dispatcher_failure_is_reported_not_raised() {
        let dispatcher = MockDispatcher::failing();
        let attempts = dispatcher.dispatch(&test_event()).await;
        assert!(matches!(attempts[0].outcome, SendOutcome::Failed(_)));
    }
}
