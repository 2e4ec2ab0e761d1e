//! Notification contact entity (database row mapping).

use chrono::{DateTime, NaiveTime, Utc};
use domain::models::{ContactMethod, NotificationContact, TimeWindow};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

/// Database row mapping for the notification_contacts table.
#[derive(Debug, Clone, FromRow)]
pub struct ContactEntity {
    pub id: i64,
    pub contact_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub methods: serde_json::Value,
    pub quiet_start: Option<NaiveTime>,
    pub quiet_end: Option<NaiveTime>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContactEntity> for NotificationContact {
    fn from(entity: ContactEntity) -> Self {
        let methods = entity
            .methods
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| {
                        let raw = v.as_str()?;
                        let method = ContactMethod::parse(raw);
                        if method.is_none() {
                            warn!(
                                contact_id = %entity.contact_id,
                                method = raw,
                                "Skipping unknown contact method"
                            );
                        }
                        method
                    })
                    .collect()
            })
            .unwrap_or_default();

        let quiet_hours = match (entity.quiet_start, entity.quiet_end) {
            (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
            _ => None,
        };

        Self {
            id: entity.id,
            contact_id: entity.contact_id,
            name: entity.name,
            phone: entity.phone,
            email: entity.email,
            methods,
            quiet_hours,
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_methods_parse_and_skip_unknown() {
        let entity = ContactEntity {
            id: 1,
            contact_id: Uuid::new_v4(),
            name: "Vet on call".to_string(),
            phone: Some("+254700000002".to_string()),
            email: Some("vet@example.com".to_string()),
            methods: json!(["sms", "fax", "email"]),
            quiet_start: None,
            quiet_end: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let contact: NotificationContact = entity.into();
        assert_eq!(contact.methods, vec![ContactMethod::Sms, ContactMethod::Email]);
        assert!(contact.quiet_hours.is_none());
    }
}
