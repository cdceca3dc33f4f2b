use async_trait::async_trait;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CreateSessionParams, CreateUserParams, EventActivity, ProfileCounts, ProfileRepo,
        ProfileStats, RepoError, RoleCount, SessionsRepo, SketchActivity, UpdateProfileParams,
        UserWithCounts, UsersRepo,
    },
    domain::{
        entities::{SessionRecord, UserRecord, UserSummary},
        types::Role,
    },
};

use super::{PostgresRepositories, map_sqlx_error};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, image, avatar_url, phone, \
    address, bio, preferences, timezone, language, email_verified, created_at, updated_at";

const SESSION_COLUMNS: &str =
    "id, user_id, prefix, hashed_secret, expires_at, last_used_at, created_at";

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(params.name)
        .bind(params.email)
        .bind(params.password_hash)
        .bind(params.role)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_users_with_counts(&self) -> Result<Vec<UserWithCounts>, RepoError> {
        sqlx::query_as::<_, UserWithCounts>(
            r#"
            SELECT
                u.id,
                u.name,
                u.email,
                u.role,
                u.image,
                u.created_at,
                (SELECT COUNT(*) FROM events e WHERE e.created_by = u.id) AS event_count,
                (SELECT COUNT(*) FROM notifications n WHERE n.user_id = u.id) AS notification_count
            FROM users u
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_user_summaries(&self) -> Result<Vec<UserSummary>, RepoError> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email FROM users ORDER BY name ASC NULLS LAST, email ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_user_ids(&self) -> Result<Vec<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_users_by_role(&self) -> Result<Vec<RoleCount>, RepoError> {
        sqlx::query_as::<_, RoleCount>(
            "SELECT role, COUNT(*) AS count FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<UserRecord, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SessionsRepo for PostgresRepositories {
    async fn create_session(
        &self,
        params: CreateSessionParams,
    ) -> Result<SessionRecord, RepoError> {
        sqlx::query_as::<_, SessionRecord>(&format!(
            "INSERT INTO sessions (user_id, prefix, hashed_secret, expires_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(params.user_id)
        .bind(params.prefix)
        .bind(params.hashed_secret)
        .bind(params.expires_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_session_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<SessionRecord>, RepoError> {
        sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE prefix = $1"
        ))
        .bind(prefix)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn touch_session(&self, id: Uuid, at: OffsetDateTime) -> Result<(), RepoError> {
        sqlx::query("UPDATE sessions SET last_used_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_session(&self, prefix: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM sessions WHERE prefix = $1")
            .bind(prefix)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProfileRepo for PostgresRepositories {
    async fn profile_counts(&self, user_id: Uuid) -> Result<ProfileCounts, RepoError> {
        sqlx::query_as::<_, ProfileCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM events WHERE created_by = $1) AS events,
                (SELECT COUNT(*) FROM notifications WHERE user_id = $1) AS notifications,
                (SELECT COUNT(*) FROM sketches WHERE created_by = $1) AS sketches
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        params: UpdateProfileParams,
    ) -> Result<UserRecord, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                phone = COALESCE($3, phone), \
                address = COALESCE($4, address), \
                bio = COALESCE($5, bio), \
                timezone = COALESCE($6, timezone), \
                language = COALESCE($7, language), \
                preferences = COALESCE($8, preferences), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(params.name)
        .bind(params.phone)
        .bind(params.address)
        .bind(params.bio)
        .bind(params.timezone)
        .bind(params.language)
        .bind(params.preferences)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_avatar(
        &self,
        user_id: Uuid,
        avatar_url: Option<String>,
    ) -> Result<UserRecord, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET avatar_url = $2, updated_at = now() WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(avatar_url)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: JsonValue,
    ) -> Result<UserRecord, RepoError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET preferences = $2, updated_at = now() WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(preferences)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn profile_stats(&self, user_id: Uuid) -> Result<ProfileStats, RepoError> {
        sqlx::query_as::<_, ProfileStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM events WHERE created_by = $1) AS total_events,
                (SELECT COUNT(*) FROM events
                    WHERE created_by = $1 AND estado = 'COMPLETADO') AS completed_events,
                (SELECT COUNT(*) FROM events
                    WHERE created_by = $1 AND estado = 'PENDIENTE') AS pending_events,
                (SELECT COUNT(*) FROM sketches WHERE created_by = $1) AS total_sketches,
                (SELECT COUNT(*) FROM notifications
                    WHERE user_id = $1 AND NOT is_read) AS unread_notifications
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn recent_events_by(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<EventActivity>, RepoError> {
        sqlx::query_as::<_, EventActivity>(
            r#"
            SELECT id, nombre_cliente, estado, monto_total, start_date, created_at
            FROM events
            WHERE created_by = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn recent_sketches_by(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SketchActivity>, RepoError> {
        sqlx::query_as::<_, SketchActivity>(
            r#"
            SELECT id, name, created_at
            FROM sketches
            WHERE created_by = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
