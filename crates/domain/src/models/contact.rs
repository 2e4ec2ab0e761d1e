//! Notification contact domain model.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::zone::TimeWindow;

/// Supported notification delivery methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactMethod {
    Sms,
    Email,
    Push,
}

impl ContactMethod {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactMethod::Sms => "sms",
            ContactMethod::Email => "email",
            ContactMethod::Push => "push",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sms" => Some(ContactMethod::Sms),
            "email" => Some(ContactMethod::Email),
            "push" => Some(ContactMethod::Push),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person to alert on high or critical geofence events.
///
/// Contacts are linked to specific animals and/or zones; a contact with a
/// quiet-hours window is skipped while the window is open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContact {
    pub id: i64,
    pub contact_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub methods: Vec<ContactMethod>,
    pub quiet_hours: Option<TimeWindow>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationContact {
    /// Whether the contact is inside its quiet-hours window at the given
    /// time-of-day. Contacts without a window are never quiet.
    pub fn is_quiet_at(&self, time: NaiveTime) -> bool {
        match &self.quiet_hours {
            Some(window) => window.contains(time),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn test_contact(quiet_hours: Option<TimeWindow>) -> NotificationContact {
        NotificationContact {
            id: 1,
            contact_id: Uuid::new_v4(),
            name: "Ranch manager".to_string(),
            phone: Some("+254700000001".to_string()),
            email: None,
            methods: vec![ContactMethod::Sms],
            quiet_hours,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_contact_method_round_trip() {
        for method in [ContactMethod::Sms, ContactMethod::Email, ContactMethod::Push] {
            assert_eq!(ContactMethod::parse(method.as_str()), Some(method));
        }
        assert_eq!(ContactMethod::parse("carrier-pigeon"), None);
    }

    #[test]
    fn test_no_quiet_hours_is_never_quiet() {
        let contact = test_contact(None);
        assert!(!contact.is_quiet_at(time(3, 0)));
    }

    #[test]
    fn test_quiet_hours_overnight() {
        let contact = test_contact(Some(TimeWindow::new(time(21, 0), time(7, 0))));
        assert!(contact.is_quiet_at(time(23, 30)));
        assert!(contact.is_quiet_at(time(5, 0)));
        assert!(!contact.is_quiet_at(time(12, 0)));
    }
}
