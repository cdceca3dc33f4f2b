use async_trait::async_trait;
use tracing::debug;

use crate::{
    application::repos::{
        InventoryRepo, ItemFields, ItemWithCounts, RepoError, StockAdjustmentOutcome,
        StockAdjustmentParams,
    },
    domain::{
        entities::{ItemRecord, ReservationRecord, StockMovementRecord},
        stock::next_quantity,
    },
};

use super::{PostgresRepositories, map_sqlx_error};

const ITEM_COLUMNS: &str = "id, name, type, quantity, unit, image_url, created_at, updated_at";

const MOVEMENT_COLUMNS: &str = "id, item_id, kind, quantity, reason, created_at";

#[async_trait]
impl InventoryRepo for PostgresRepositories {
    async fn list_items(&self) -> Result<Vec<ItemWithCounts>, RepoError> {
        sqlx::query_as::<_, ItemWithCounts>(
            r#"
            SELECT
                i.id, i.name, i.type, i.quantity, i.unit, i.image_url, i.created_at, i.updated_at,
                (SELECT COUNT(*) FROM stock_movements m WHERE m.item_id = i.id) AS movement_count,
                (SELECT COUNT(*) FROM reservations r WHERE r.item_id = i.id) AS reservation_count
            FROM items i
            ORDER BY i.created_at DESC, i.id DESC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_item(&self, id: i64) -> Result<Option<ItemRecord>, RepoError> {
        sqlx::query_as::<_, ItemRecord>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn recent_movements(
        &self,
        item_id: i64,
        limit: i64,
    ) -> Result<Vec<StockMovementRecord>, RepoError> {
        sqlx::query_as::<_, StockMovementRecord>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE item_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        ))
        .bind(item_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn active_reservations(
        &self,
        item_id: i64,
    ) -> Result<Vec<ReservationRecord>, RepoError> {
        sqlx::query_as::<_, ReservationRecord>(
            r#"
            SELECT
                r.id, r.item_id, r.event_id, r.quantity, r.status,
                e.nombre_cliente AS event_nombre_cliente,
                e.start_date AS event_start_date,
                e.end_date AS event_end_date,
                r.created_at
            FROM reservations r
            INNER JOIN events e ON e.id = r.event_id
            WHERE r.item_id = $1 AND r.status = 'ACTIVE'
            ORDER BY e.start_date ASC
            "#,
        )
        .bind(item_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_item(&self, fields: ItemFields) -> Result<ItemRecord, RepoError> {
        sqlx::query_as::<_, ItemRecord>(&format!(
            "INSERT INTO items (name, type, quantity, unit, image_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(fields.name)
        .bind(fields.item_type)
        .bind(fields.quantity)
        .bind(fields.unit)
        .bind(fields.image_url)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_item(&self, id: i64, fields: ItemFields) -> Result<ItemRecord, RepoError> {
        sqlx::query_as::<_, ItemRecord>(&format!(
            "UPDATE items SET \
                name = $2, type = $3, quantity = $4, unit = $5, image_url = $6, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(fields.name)
        .bind(fields.item_type)
        .bind(fields.quantity)
        .bind(fields.unit)
        .bind(fields.image_url)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_item(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_item_types(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>("SELECT DISTINCT type FROM items ORDER BY type ASC")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn adjust_stock(
        &self,
        params: StockAdjustmentParams,
    ) -> Result<StockAdjustmentOutcome, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let current = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM items WHERE id = $1 FOR UPDATE",
        )
        .bind(params.item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(current) = current else {
            return Ok(StockAdjustmentOutcome::ItemMissing);
        };

        let quantity = match next_quantity(current, params.kind, params.quantity) {
            Ok(quantity) => quantity,
            Err(err) => {
                debug!(
                    target = "carpas::infra::db::inventory",
                    item_id = params.item_id,
                    current,
                    "stock adjustment rejected, rolling back"
                );
                return Ok(StockAdjustmentOutcome::Rejected(err));
            }
        };

        let item = sqlx::query_as::<_, ItemRecord>(&format!(
            "UPDATE items SET quantity = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(params.item_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let movement = sqlx::query_as::<_, StockMovementRecord>(&format!(
            "INSERT INTO stock_movements (item_id, kind, quantity, reason) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {MOVEMENT_COLUMNS}"
        ))
        .bind(params.item_id)
        .bind(params.kind)
        .bind(params.quantity)
        .bind(params.reason)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(StockAdjustmentOutcome::Applied { item, movement })
    }
}
