use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        AdminNotificationRecord, NewNotification, NotificationStats, NotificationsRepo,
        PushSubscriptionsRepo, RepoError, TitleCount, UpsertSubscriptionParams,
    },
    domain::entities::{NotificationRecord, PushSubscriptionRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, is_read, read_at, action_by, action_by_name, created_at";

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, endpoint, p256dh, auth, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TotalsRow {
    total: i64,
    unread: i64,
}

#[async_trait]
impl NotificationsRepo for PostgresRepositories {
    async fn insert_notifications(
        &self,
        rows: Vec<NewNotification>,
    ) -> Result<Vec<NotificationRecord>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO notifications (user_id, title, message, action_by, action_by_name) ",
        );
        qb.push_values(rows, |mut row, notification| {
            row.push_bind(notification.user_id)
                .push_bind(notification.title)
                .push_bind(notification.message)
                .push_bind(notification.action_by)
                .push_bind(notification.action_by_name);
        });
        qb.push(" RETURNING ");
        qb.push(NOTIFICATION_COLUMNS);

        qb.build_query_as::<NotificationRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationRecord>, RepoError> {
        sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_unread_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<NotificationRecord>, RepoError> {
        sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 AND NOT is_read \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<NotificationRecord>, RepoError> {
        sqlx::query_as::<_, NotificationRecord>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<i64, RepoError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn mark_read(
        &self,
        id: i64,
        user_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Option<NotificationRecord>, RepoError> {
        sqlx::query_as::<_, NotificationRecord>(&format!(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, $3) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(at)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn mark_all_read(&self, user_id: Uuid, at: OffsetDateTime) -> Result<u64, RepoError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2 \
             WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .bind(at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_for_user(&self, id: i64, user_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_read_for_user(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1 AND is_read")
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn list_all(
        &self,
        limit: i64,
        is_read: Option<bool>,
    ) -> Result<Vec<AdminNotificationRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT n.id, n.user_id, n.title, n.message, n.is_read, n.read_at, n.action_by, \
             n.action_by_name, n.created_at, u.name AS user_name, u.email AS user_email \
             FROM notifications n \
             INNER JOIN users u ON u.id = n.user_id",
        );

        if let Some(is_read) = is_read {
            qb.push(" WHERE n.is_read = ");
            qb.push_bind(is_read);
        }

        qb.push(" ORDER BY n.created_at DESC, n.id DESC LIMIT ");
        qb.push_bind(limit);

        qb.build_query_as::<AdminNotificationRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn notification_stats(&self) -> Result<NotificationStats, RepoError> {
        let totals = sqlx::query_as::<_, TotalsRow>(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE NOT is_read) AS unread \
             FROM notifications",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let by_type = sqlx::query_as::<_, TitleCount>(
            "SELECT title, COUNT(*) AS count FROM notifications \
             GROUP BY title ORDER BY count DESC, title ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(NotificationStats {
            total: totals.total,
            unread: totals.unread,
            read: totals.total - totals.unread,
            by_type,
        })
    }

    async fn delete_older_than(
        &self,
        cutoff: OffsetDateTime,
        only_read: bool,
    ) -> Result<u64, RepoError> {
        let sql = if only_read {
            "DELETE FROM notifications WHERE created_at < $1 AND is_read"
        } else {
            "DELETE FROM notifications WHERE created_at < $1"
        };
        let result = sqlx::query(sql)
            .bind(cutoff)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_all_read(&self) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM notifications WHERE is_read")
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_everything_read(&self, at: OffsetDateTime) -> Result<u64, RepoError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE, read_at = $1 WHERE NOT is_read")
                .bind(at)
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PushSubscriptionsRepo for PostgresRepositories {
    async fn upsert_subscription(
        &self,
        params: UpsertSubscriptionParams,
    ) -> Result<PushSubscriptionRecord, RepoError> {
        sqlx::query_as::<_, PushSubscriptionRecord>(&format!(
            "INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (endpoint) DO UPDATE SET \
                user_id = EXCLUDED.user_id, \
                p256dh = EXCLUDED.p256dh, \
                auth = EXCLUDED.auth, \
                updated_at = now() \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        ))
        .bind(params.user_id)
        .bind(params.endpoint)
        .bind(params.p256dh)
        .bind(params.auth)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_subscription(&self, endpoint: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn latest_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PushSubscriptionRecord>, RepoError> {
        sqlx::query_as::<_, PushSubscriptionRecord>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM push_subscriptions WHERE user_id = $1 \
             ORDER BY updated_at DESC, id DESC \
             LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_subscriptions_for(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PushSubscriptionRecord>, RepoError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, PushSubscriptionRecord>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM push_subscriptions WHERE user_id = ANY($1) \
             ORDER BY id ASC"
        ))
        .bind(user_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
