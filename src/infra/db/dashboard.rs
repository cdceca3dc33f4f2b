use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::{
        dashboard::shift_months,
        repos::{
            DashboardRepo, DashboardStats, EventActivity, MonthRevenue, RepoError, StatusCount,
            VisitActivity,
        },
    },
    domain::entities::{EventRecord, TechnicalVisitRecord},
};

use super::{
    PostgresRepositories,
    events::{EVENT_COLUMNS, VISIT_SELECT},
    map_sqlx_error,
};

const LOW_STOCK_THRESHOLD: i32 = 10;

#[async_trait]
impl DashboardRepo for PostgresRepositories {
    async fn dashboard_stats(&self, now: OffsetDateTime) -> Result<DashboardStats, RepoError> {
        let first_day = now.date().replace_day(1).unwrap_or(now.date());
        let month_start = first_day.midnight().assume_utc();
        let month_end = shift_months(first_day, 1).midnight().assume_utc();

        sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM events
                    WHERE estado IN ('PENDIENTE', 'EN_PROCESO')) AS active_events,
                (SELECT COUNT(*) FROM items) AS total_items,
                (SELECT COUNT(*) FROM items WHERE quantity < $1) AS low_stock_items,
                (SELECT COALESCE(SUM(monto_total), 0)::BIGINT FROM events
                    WHERE estado = 'COMPLETADO'
                      AND end_date >= $2 AND end_date < $3) AS monthly_revenue,
                (SELECT COUNT(*) FROM technical_visits
                    WHERE estado = 'PROGRAMADA' AND fecha_visita >= $4) AS scheduled_visits
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(month_start)
        .bind(month_end)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn recent_events(&self, limit: i64) -> Result<Vec<EventActivity>, RepoError> {
        sqlx::query_as::<_, EventActivity>(
            "SELECT id, nombre_cliente, estado, monto_total, start_date, created_at \
             FROM events ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn recent_visits(&self, limit: i64) -> Result<Vec<VisitActivity>, RepoError> {
        sqlx::query_as::<_, VisitActivity>(
            "SELECT id, nombre_cliente, estado, fecha_visita, created_at \
             FROM technical_visits ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn events_in_window(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<EventRecord>, RepoError> {
        sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE estado <> 'CANCELADO' AND start_date <= $2 AND end_date >= $1 \
             ORDER BY start_date ASC, id ASC"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn visits_in_window(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<TechnicalVisitRecord>, RepoError> {
        sqlx::query_as::<_, TechnicalVisitRecord>(&format!(
            "{VISIT_SELECT} FROM technical_visits v LEFT JOIN users u ON u.id = v.assigned_to \
             WHERE v.estado <> 'CANCELADA' AND v.fecha_visita BETWEEN $1 AND $2 \
             ORDER BY v.fecha_visita ASC, v.id ASC"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn events_by_status(&self) -> Result<Vec<StatusCount>, RepoError> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT estado AS status, COUNT(*) AS count FROM events \
             GROUP BY estado ORDER BY estado",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn revenue_by_month(
        &self,
        since: OffsetDateTime,
    ) -> Result<Vec<MonthRevenue>, RepoError> {
        sqlx::query_as::<_, MonthRevenue>(
            r#"
            SELECT
                to_char(end_date AT TIME ZONE 'UTC', 'YYYY-MM') AS month,
                COALESCE(SUM(monto_total), 0)::BIGINT AS revenue
            FROM events
            WHERE estado = 'COMPLETADO' AND end_date >= $1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(since)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
