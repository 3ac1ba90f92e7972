// src/models/contact.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contact_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    New,
    Read,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactPayload {
    #[validate(length(min = 2, max = 100, message = "Name must have 2 to 100 characters."))]
    pub name: String,
    #[validate(email(message = "Invalid email."))]
    pub email: String,
    #[validate(length(max = 30, message = "Phone must have at most 30 characters."))]
    pub phone: Option<String>,
    #[validate(length(min = 2, max = 150, message = "Subject must have 2 to 150 characters."))]
    pub subject: String,
    #[validate(length(min = 10, max = 5000, message = "Message must have 10 to 5000 characters."))]
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactStatusPayload {
    pub status: ContactStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_email_and_short_message() {
        let payload = CreateContactPayload {
            name: "Ana".into(),
            email: "not-an-email".into(),
            phone: None,
            subject: "Tryouts".into(),
            message: "hi".into(),
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("message"));
    }
}
