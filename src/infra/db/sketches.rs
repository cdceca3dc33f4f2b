use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::repos::{RepoError, SketchFields, SketchesRepo},
    domain::entities::SketchRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const SKETCH_COLUMNS: &str =
    "id, name, description, data, event_id, created_by, created_at, updated_at";

#[async_trait]
impl SketchesRepo for PostgresRepositories {
    async fn list_sketches(&self) -> Result<Vec<SketchRecord>, RepoError> {
        sqlx::query_as::<_, SketchRecord>(&format!(
            "SELECT {SKETCH_COLUMNS} FROM sketches ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_sketch(&self, id: i64) -> Result<Option<SketchRecord>, RepoError> {
        sqlx::query_as::<_, SketchRecord>(&format!(
            "SELECT {SKETCH_COLUMNS} FROM sketches WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_sketches_for_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<SketchRecord>, RepoError> {
        sqlx::query_as::<_, SketchRecord>(&format!(
            "SELECT {SKETCH_COLUMNS} FROM sketches WHERE event_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(event_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_unassigned_sketches(&self) -> Result<Vec<SketchRecord>, RepoError> {
        sqlx::query_as::<_, SketchRecord>(&format!(
            "SELECT {SKETCH_COLUMNS} FROM sketches WHERE event_id IS NULL \
             ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_sketch(
        &self,
        fields: SketchFields,
        created_by: Uuid,
    ) -> Result<SketchRecord, RepoError> {
        sqlx::query_as::<_, SketchRecord>(&format!(
            "INSERT INTO sketches (name, description, data, event_id, created_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {SKETCH_COLUMNS}"
        ))
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.data)
        .bind(fields.event_id)
        .bind(created_by)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_sketch(
        &self,
        id: i64,
        fields: SketchFields,
    ) -> Result<SketchRecord, RepoError> {
        sqlx::query_as::<_, SketchRecord>(&format!(
            "UPDATE sketches SET \
                name = $2, description = $3, data = $4, event_id = $5, updated_at = now() \
             WHERE id = $1 \
             RETURNING {SKETCH_COLUMNS}"
        ))
        .bind(id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.data)
        .bind(fields.event_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_sketch(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM sketches WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_sketch(
        &self,
        id: i64,
        event_id: Option<i64>,
    ) -> Result<SketchRecord, RepoError> {
        sqlx::query_as::<_, SketchRecord>(&format!(
            "UPDATE sketches SET event_id = $2, updated_at = now() WHERE id = $1 \
             RETURNING {SKETCH_COLUMNS}"
        ))
        .bind(id)
        .bind(event_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
