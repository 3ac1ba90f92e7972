// src/services/notification_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NotificationRepository, UserRepository},
    models::notification::{BroadcastPayload, NewNotification, Notification, NotificationKind},
};

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    user_repo: UserRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self { repo, user_repo }
    }

    /// Efeito colateral de outra operação: a falha é registrada e não interrompe quem chamou.
    pub async fn notify(&self, notification: NewNotification) {
        let user_id = notification.user_id;
        if let Err(e) = self.repo.create(&notification).await {
            tracing::warn!("⚠️ Falha ao criar notificação para {}: {}", user_id, e);
        }
    }

    pub async fn list(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>, AppError> {
        self.repo.list_for_user(user_id, unread_only).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.repo.unread_count(user_id).await
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, AppError> {
        self.repo
            .mark_read(id, user_id)
            .await?
            .ok_or(AppError::NotFound("notification"))
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.repo.mark_all_read(user_id).await
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id, user_id).await? {
            return Err(AppError::NotFound("notification"));
        }
        Ok(())
    }

    /// Sem destinatários explícitos, envia para todos os usuários.
    pub async fn broadcast(&self, payload: BroadcastPayload) -> Result<u64, AppError> {
        let recipients = if payload.user_ids.is_empty() {
            self.user_repo.list_ids().await?
        } else {
            payload.user_ids
        };

        let batch: Vec<NewNotification> = recipients
            .into_iter()
            .map(|user_id| {
                let n = NewNotification::new(user_id, NotificationKind::System, &payload.title, &payload.body);
                match &payload.link {
                    Some(link) => n.with_link(link),
                    None => n,
                }
            })
            .collect();

        let sent = self.repo.create_many(&batch).await?;
        tracing::info!("📣 Aviso enviado para {} usuários", sent);
        Ok(sent)
    }
}
