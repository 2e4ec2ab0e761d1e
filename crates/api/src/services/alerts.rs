//! Contact alert dispatcher.
//!
//! Implements the domain `AlertDispatcher` trait: resolves active contacts
//! linked to the event's animal or zone, drops contacts inside their
//! quiet-hours window and issues one send per (contact, preferred method)
//! through a delivery channel. Failures are reported as attempts, never
//! raised, so a delivery problem cannot abort ping ingestion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::models::{ContactMethod, GeofenceEvent, NotificationContact};
use domain::services::dispatch::{AlertDispatcher, SendAttempt, SendOutcome};
use persistence::repositories::ContactRepository;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

/// Error type for alert channel operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Alert endpoint returned status {0}")]
    Status(u16),
}

/// A delivery channel for one (contact, method) send.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn send(
        &self,
        contact: &NotificationContact,
        method: ContactMethod,
        event: &GeofenceEvent,
    ) -> Result<(), ChannelError>;
}

/// Human-readable alert text for an event.
fn alert_message(event: &GeofenceEvent) -> String {
    let mut message = match (&event.zone_name, event.transition) {
        (Some(zone), transition) => {
            format!("Animal {} {} zone {}", event.animal_id, transition, zone)
        }
        (None, transition) => format!("Animal {}: {}", event.animal_id, transition),
    };
    if let Some(distance) = event.distance_from_boundary_m {
        message.push_str(&format!(", {:.0} m from nearest boundary", distance));
    }
    if let Some(secs) = event.duration_outside_secs {
        message.push_str(&format!(", outside for {} min", secs / 60));
    }
    message
}

/// Channel that logs sends instead of delivering them. Default for
/// development deployments.
#[derive(Debug, Clone, Default)]
pub struct ConsoleChannel;

#[async_trait]
impl AlertChannel for ConsoleChannel {
    async fn send(
        &self,
        contact: &NotificationContact,
        method: ContactMethod,
        event: &GeofenceEvent,
    ) -> Result<(), ChannelError> {
        info!(
            contact = %contact.name,
            method = %method,
            event_id = %event.event_id,
            severity = %event.severity,
            message = %alert_message(event),
            "Console alert"
        );
        Ok(())
    }
}

/// Outgoing webhook payload for one send.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookAlert<'a> {
    event_id: uuid::Uuid,
    animal_id: uuid::Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone_id: Option<uuid::Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone_name: Option<&'a str>,
    transition: &'a str,
    severity: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_from_boundary_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_outside_secs: Option<i64>,
    message: String,
    contact: &'a str,
    method: &'a str,
}

/// Channel that POSTs alerts to an external notification gateway.
pub struct WebhookChannel {
    client: Client,
    url: String,
    timeout: Duration,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl AlertChannel for WebhookChannel {
    async fn send(
        &self,
        contact: &NotificationContact,
        method: ContactMethod,
        event: &GeofenceEvent,
    ) -> Result<(), ChannelError> {
        let payload = WebhookAlert {
            event_id: event.event_id,
            animal_id: event.animal_id,
            zone_id: event.zone_id,
            zone_name: event.zone_name.as_deref(),
            transition: event.transition.as_str(),
            severity: event.severity.as_str(),
            distance_from_boundary_m: event.distance_from_boundary_m,
            duration_outside_secs: event.duration_outside_secs,
            message: alert_message(event),
            contact: &contact.name,
            method: method.as_str(),
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChannelError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Production dispatcher: contact resolution, quiet hours, one send per
/// (contact, preferred method).
pub struct ContactAlertDispatcher {
    contacts: ContactRepository,
    channel: Arc<dyn AlertChannel>,
    enabled: bool,
}

impl ContactAlertDispatcher {
    pub fn new(contacts: ContactRepository, channel: Arc<dyn AlertChannel>, enabled: bool) -> Self {
        Self {
            contacts,
            channel,
            enabled,
        }
    }

    /// Whether the contact can receive the method at all.
    fn missing_address(contact: &NotificationContact, method: ContactMethod) -> Option<&'static str> {
        match method {
            ContactMethod::Sms if contact.phone.is_none() => Some("no phone number"),
            ContactMethod::Email if contact.email.is_none() => Some("no email address"),
            _ => None,
        }
    }
}

#[async_trait]
impl AlertDispatcher for ContactAlertDispatcher {
    async fn dispatch(&self, event: &GeofenceEvent) -> Vec<SendAttempt> {
        if !self.enabled {
            info!(event_id = %event.event_id, "Alert dispatch disabled, skipping");
            return Vec::new();
        }

        let entities = match self
            .contacts
            .find_active_for_event(event.animal_id, event.zone_id)
            .await
        {
            Ok(entities) => entities,
            Err(err) => {
                error!(
                    event_id = %event.event_id,
                    error = %err,
                    "Failed to resolve alert contacts"
                );
                return Vec::new();
            }
        };

        // Quiet hours are evaluated against the event's own time-of-day
        let time_of_day = event.created_at.time();

        let mut attempts = Vec::new();
        for entity in entities {
            let contact: NotificationContact = entity.into();

            for method in contact.methods.clone() {
                if contact.is_quiet_at(time_of_day) {
                    attempts.push(SendAttempt {
                        contact_id: contact.contact_id,
                        contact_name: contact.name.clone(),
                        method,
                        outcome: SendOutcome::Skipped("quiet hours".to_string()),
                    });
                    continue;
                }

                if let Some(reason) = Self::missing_address(&contact, method) {
                    attempts.push(SendAttempt {
                        contact_id: contact.contact_id,
                        contact_name: contact.name.clone(),
                        method,
                        outcome: SendOutcome::Skipped(reason.to_string()),
                    });
                    continue;
                }

                let outcome = match self.channel.send(&contact, method, event).await {
                    Ok(()) => SendOutcome::Sent,
                    Err(err) => SendOutcome::Failed(err.to_string()),
                };
                attempts.push(SendAttempt {
                    contact_id: contact.contact_id,
                    contact_name: contact.name.clone(),
                    method,
                    outcome,
                });
            }
        }

        attempts
    }
}
