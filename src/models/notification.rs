// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OfferReceived,
    OfferAccepted,
    OfferRejected,
    OfferCountered,
    OfferWithdrawn,
    ItemReceived,
    RatingReceived,
    MembershipActivated,
    MembershipRenewed,
    MembershipSuspended,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Notificação ainda não gravada.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new(user_id: Uuid, kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            body: body.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastPayload {
    #[validate(length(min = 1, max = 120, message = "Title must have 1 to 120 characters."))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Body must have 1 to 2000 characters."))]
    pub body: String,
    pub link: Option<String>,
    /// Vazio = todos os usuários
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_link() {
        let user = Uuid::new_v4();
        let n = NewNotification::new(user, NotificationKind::OfferReceived, "New offer", "You got an offer")
            .with_link("/marketplace/offers/received");
        assert_eq!(n.user_id, user);
        assert_eq!(n.link.as_deref(), Some("/marketplace/offers/received"));
    }

    #[test]
    fn broadcast_requires_title() {
        let payload = BroadcastPayload {
            title: String::new(),
            body: "Training cancelled".into(),
            link: None,
            user_ids: vec![],
        };
        assert!(payload.validate().is_err());
    }
}
