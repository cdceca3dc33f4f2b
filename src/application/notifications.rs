//! Per-user notification inbox.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::fanout::{ExplicitRecipients, NotificationFanout};
use crate::application::repos::{NotificationsRepo, RepoError};
use crate::domain::entities::NotificationRecord;
use crate::domain::notices::Notice;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("Notificación no encontrada")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateNotificationCommand {
    pub title: String,
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationsRepo>,
    fanout: NotificationFanout,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationsRepo>, fanout: NotificationFanout) -> Self {
        Self { repo, fanout }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<NotificationRecord>, NotificationError> {
        Ok(self.repo.list_for_user(user_id).await?)
    }

    pub async fn unread(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<NotificationRecord>, NotificationError> {
        Ok(self.repo.list_unread_for_user(user_id).await?)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, NotificationError> {
        Ok(self.repo.count_unread(user_id).await?)
    }

    pub async fn mark_as_read(
        &self,
        user_id: Uuid,
        id: i64,
    ) -> Result<NotificationRecord, NotificationError> {
        self.repo
            .mark_read(id, user_id, OffsetDateTime::now_utc())
            .await?
            .ok_or(NotificationError::NotFound)
    }

    pub async fn mark_all_as_read(&self, user_id: Uuid) -> Result<u64, NotificationError> {
        Ok(self
            .repo
            .mark_all_read(user_id, OffsetDateTime::now_utc())
            .await?)
    }

    pub async fn delete(&self, user_id: Uuid, id: i64) -> Result<(), NotificationError> {
        if self.repo.delete_for_user(id, user_id).await? {
            Ok(())
        } else {
            Err(NotificationError::NotFound)
        }
    }

    pub async fn delete_all_read(&self, user_id: Uuid) -> Result<u64, NotificationError> {
        Ok(self.repo.delete_read_for_user(user_id).await?)
    }

    /// Store a notification for one user and push it to their devices.
    pub async fn create(
        &self,
        actor: &Principal,
        cmd: CreateNotificationCommand,
    ) -> Result<NotificationRecord, NotificationError> {
        let title = cmd.title.trim().to_string();
        let message = cmd.message.trim().to_string();
        if title.is_empty() {
            return Err(NotificationError::ConstraintViolation("El título es requerido"));
        }
        if message.is_empty() {
            return Err(NotificationError::ConstraintViolation("El mensaje es requerido"));
        }

        let receipt = self
            .fanout
            .publish(
                &Notice::direct(title, message),
                Some(actor),
                &ExplicitRecipients(vec![cmd.user_id]),
            )
            .await?;

        receipt
            .notifications
            .first()
            .cloned()
            .ok_or(NotificationError::NotFound)
    }
}
