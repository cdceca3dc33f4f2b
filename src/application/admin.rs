//! Account and notification administration.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::repos::{
    AdminNotificationRecord, NotificationStats, NotificationsRepo, RepoError, RoleCount,
    UserWithCounts, UsersRepo,
};
use crate::domain::entities::UserRecord;
use crate::domain::error::DomainError;
use crate::domain::types::Role;

const NOTIFICATION_LIST_DEFAULT: i64 = 100;
const CLEANUP_DEFAULT_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("No puedes cambiar tu propio rol a uno sin permisos de administrador")]
    SelfDemotion,
    #[error("Solo SUPER_ADMIN puede eliminar usuarios")]
    OnlySuperAdmin,
    #[error("No puedes eliminarte a ti mismo")]
    SelfDeletion,
    #[error("Usuario no encontrado")]
    UserNotFound,
    #[error("Notificación no encontrada")]
    NotificationNotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total: i64,
    pub by_role: Vec<RoleCount>,
}

/// Outcome of a bulk maintenance action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub count: u64,
    pub message: String,
}

#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UsersRepo>,
    notifications: Arc<dyn NotificationsRepo>,
}

impl AdminService {
    pub fn new(users: Arc<dyn UsersRepo>, notifications: Arc<dyn NotificationsRepo>) -> Self {
        Self {
            users,
            notifications,
        }
    }

    pub fn is_admin(&self, actor: &Principal) -> bool {
        actor.role.is_admin()
    }

    pub async fn users(&self) -> Result<Vec<UserWithCounts>, AdminError> {
        Ok(self.users.list_users_with_counts().await?)
    }

    pub async fn update_role(
        &self,
        actor: &Principal,
        user_id: Uuid,
        role: Role,
    ) -> Result<UserRecord, AdminError> {
        if actor.user_id == user_id && !role.is_admin() {
            return Err(AdminError::SelfDemotion);
        }
        let user = self
            .users
            .update_role(user_id, role)
            .await
            .map_err(user_not_found_or_repo)?;
        info!(
            target = "carpas::admin",
            actor_id = %actor.user_id,
            user_id = %user.id,
            role = role.as_str(),
            "user role updated"
        );
        Ok(user)
    }

    pub async fn delete_user(&self, actor: &Principal, user_id: Uuid) -> Result<(), AdminError> {
        if actor.role != Role::SuperAdmin {
            return Err(AdminError::OnlySuperAdmin);
        }
        if actor.user_id == user_id {
            return Err(AdminError::SelfDeletion);
        }
        if !self.users.delete_user(user_id).await? {
            return Err(AdminError::UserNotFound);
        }
        info!(
            target = "carpas::admin",
            actor_id = %actor.user_id,
            user_id = %user_id,
            "user deleted"
        );
        Ok(())
    }

    pub async fn user_stats(&self) -> Result<UserStats, AdminError> {
        let by_role = self.users.count_users_by_role().await?;
        let total = by_role.iter().map(|row| row.count).sum();
        Ok(UserStats { total, by_role })
    }

    /// Assign a role by email. Used by the command line to bootstrap administrators.
    pub async fn set_role_by_email(&self, email: &str, role: Role) -> Result<UserRecord, AdminError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(AdminError::UserNotFound)?;
        self.users
            .update_role(user.id, role)
            .await
            .map_err(user_not_found_or_repo)
    }

    pub async fn notifications(
        &self,
        limit: Option<i64>,
        is_read: Option<bool>,
    ) -> Result<Vec<AdminNotificationRecord>, AdminError> {
        let limit = limit.unwrap_or(NOTIFICATION_LIST_DEFAULT);
        if limit < 1 {
            return Err(DomainError::validation("El límite debe ser mayor que 0").into());
        }
        Ok(self.notifications.list_all(limit, is_read).await?)
    }

    pub async fn notification_stats(&self) -> Result<NotificationStats, AdminError> {
        Ok(self.notifications.notification_stats().await?)
    }

    /// Delete notifications older than `days_old` days, by default only read ones.
    pub async fn clean_old_notifications(
        &self,
        days_old: Option<i64>,
        only_read: Option<bool>,
    ) -> Result<BulkOutcome, AdminError> {
        let days_old = days_old.unwrap_or(CLEANUP_DEFAULT_DAYS);
        if days_old < 1 {
            return Err(DomainError::validation("Los días deben ser al menos 1").into());
        }
        let cutoff = OffsetDateTime::now_utc() - Duration::days(days_old);
        let count = self
            .notifications
            .delete_older_than(cutoff, only_read.unwrap_or(true))
            .await?;
        info!(
            target = "carpas::admin",
            days_old,
            deleted = count,
            "old notifications removed"
        );
        Ok(BulkOutcome {
            count,
            message: format!("Se eliminaron {count} notificaciones"),
        })
    }

    pub async fn delete_all_read(&self) -> Result<BulkOutcome, AdminError> {
        let count = self.notifications.delete_all_read().await?;
        Ok(BulkOutcome {
            count,
            message: format!("Se eliminaron {count} notificaciones leídas"),
        })
    }

    pub async fn delete_notification(&self, id: i64) -> Result<(), AdminError> {
        if self.notifications.delete_notification(id).await? {
            Ok(())
        } else {
            Err(AdminError::NotificationNotFound)
        }
    }

    pub async fn mark_all_read(&self) -> Result<BulkOutcome, AdminError> {
        let count = self
            .notifications
            .mark_everything_read(OffsetDateTime::now_utc())
            .await?;
        Ok(BulkOutcome {
            count,
            message: format!("Se marcaron {count} notificaciones como leídas"),
        })
    }
}

fn user_not_found_or_repo(err: RepoError) -> AdminError {
    match err {
        RepoError::NotFound => AdminError::UserNotFound,
        other => AdminError::Repo(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::NewNotification;
    use crate::application::testing::{MemoryStore, principal_for, services};

    #[tokio::test]
    async fn admin_cannot_demote_themselves() {
        let store = Arc::new(MemoryStore::default());
        let me = store.add_user("admin@carpas.cl", Role::Admin);
        let actor = principal_for(me, Role::Admin);
        let svc = services(&store).admin;

        let err = svc.update_role(&actor, me, Role::Worker).await.unwrap_err();
        assert!(matches!(err, AdminError::SelfDemotion));
        assert_eq!(
            err.to_string(),
            "No puedes cambiar tu propio rol a uno sin permisos de administrador"
        );

        let promoted = svc
            .update_role(&actor, me, Role::SuperAdmin)
            .await
            .expect("self promotion keeps admin rights");
        assert_eq!(promoted.role, Role::SuperAdmin);
    }

    #[tokio::test]
    async fn only_super_admin_deletes_and_never_themselves() {
        let store = Arc::new(MemoryStore::default());
        let root = store.add_user("root@carpas.cl", Role::SuperAdmin);
        let admin = store.add_user("admin@carpas.cl", Role::Admin);
        let worker = store.add_user("worker@carpas.cl", Role::Worker);
        let svc = services(&store).admin;

        assert!(matches!(
            svc.delete_user(&principal_for(admin, Role::Admin), worker).await,
            Err(AdminError::OnlySuperAdmin)
        ));
        let root_actor = principal_for(root, Role::SuperAdmin);
        assert!(matches!(
            svc.delete_user(&root_actor, root).await,
            Err(AdminError::SelfDeletion)
        ));
        svc.delete_user(&root_actor, worker).await.expect("delete");
        assert_eq!(store.user_count(), 2);

        let stats = svc.user_stats().await.expect("stats");
        assert_eq!(stats.total, 2);
    }

    #[tokio::test]
    async fn bulk_actions_report_counts() {
        let store = Arc::new(MemoryStore::default());
        let user = store.add_user("worker@carpas.cl", Role::Worker);
        let rows = (0..3)
            .map(|i| NewNotification {
                user_id: user,
                title: format!("Aviso {i}"),
                message: "m".into(),
                action_by: None,
                action_by_name: None,
            })
            .collect();
        store.insert_notifications(rows).await.expect("insert");
        let svc = services(&store).admin;

        let marked = svc.mark_all_read().await.expect("mark");
        assert_eq!(marked.message, "Se marcaron 3 notificaciones como leídas");

        let cleaned = svc
            .clean_old_notifications(Some(30), None)
            .await
            .expect("clean");
        assert_eq!(cleaned.count, 0);
        assert!(svc.clean_old_notifications(Some(0), None).await.is_err());

        let purged = svc.delete_all_read().await.expect("purge");
        assert_eq!(purged.message, "Se eliminaron 3 notificaciones leídas");
    }
}
