use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    application::repos::{
        ClientStats, ClientTypeCount, ClienteParams, ClienteSearch, ClienteWithCount, ClientsRepo,
        RepoError,
    },
    domain::entities::{ClienteRecord, EventRecord},
};

use super::{PostgresRepositories, events::EVENT_COLUMNS, map_sqlx_error, util::convert_count};

const CLIENTE_COLUMNS: &str = "id, nombre, email, telefono, direccion, tipo_cliente, empresa, \
    rut, notas, created_by, created_at, updated_at";

const CLIENTE_WITH_COUNT: &str = "SELECT c.id, c.nombre, c.email, c.telefono, c.direccion, \
    c.tipo_cliente, c.empresa, c.rut, c.notas, c.created_by, c.created_at, c.updated_at, \
    COUNT(e.id) AS event_count \
    FROM clientes c \
    LEFT JOIN events e ON e.cliente_id = c.id ";

#[derive(sqlx::FromRow)]
struct StatsRow {
    total: i64,
    con_eventos: i64,
    eventos_totales: i64,
}

#[async_trait]
impl ClientsRepo for PostgresRepositories {
    async fn list_clients(&self) -> Result<Vec<ClienteWithCount>, RepoError> {
        sqlx::query_as::<_, ClienteWithCount>(&format!(
            "{CLIENTE_WITH_COUNT} GROUP BY c.id ORDER BY c.created_at DESC, c.id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_client(&self, id: i64) -> Result<Option<ClienteRecord>, RepoError> {
        sqlx::query_as::<_, ClienteRecord>(&format!(
            "SELECT {CLIENTE_COLUMNS} FROM clientes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_client_events(&self, id: i64) -> Result<Vec<EventRecord>, RepoError> {
        sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE cliente_id = $1 \
             ORDER BY start_date DESC, id DESC"
        ))
        .bind(id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_client(
        &self,
        params: ClienteParams,
        created_by: Uuid,
    ) -> Result<ClienteRecord, RepoError> {
        sqlx::query_as::<_, ClienteRecord>(&format!(
            "INSERT INTO clientes \
                (nombre, email, telefono, direccion, tipo_cliente, empresa, rut, notas, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {CLIENTE_COLUMNS}"
        ))
        .bind(params.nombre)
        .bind(params.email)
        .bind(params.telefono)
        .bind(params.direccion)
        .bind(params.tipo_cliente)
        .bind(params.empresa)
        .bind(params.rut)
        .bind(params.notas)
        .bind(created_by)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_client(
        &self,
        id: i64,
        params: ClienteParams,
    ) -> Result<ClienteRecord, RepoError> {
        sqlx::query_as::<_, ClienteRecord>(&format!(
            "UPDATE clientes SET \
                nombre = $2, email = $3, telefono = $4, direccion = $5, tipo_cliente = $6, \
                empresa = $7, rut = $8, notas = $9, updated_at = now() \
             WHERE id = $1 \
             RETURNING {CLIENTE_COLUMNS}"
        ))
        .bind(id)
        .bind(params.nombre)
        .bind(params.email)
        .bind(params.telefono)
        .bind(params.direccion)
        .bind(params.tipo_cliente)
        .bind(params.empresa)
        .bind(params.rut)
        .bind(params.notas)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_client(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM clientes WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_client_events(&self, id: i64) -> Result<u64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE cliente_id = $1")
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        convert_count(count)
    }

    async fn search_clients(
        &self,
        search: &ClienteSearch,
    ) -> Result<Vec<ClienteWithCount>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(CLIENTE_WITH_COUNT);
        qb.push(" WHERE TRUE");

        if !search.query.is_empty() {
            let pattern = format!("%{}%", search.query);
            qb.push(" AND (c.nombre ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR c.email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR c.telefono ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR c.empresa ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR c.rut ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        if let Some(tipo) = search.tipo_cliente {
            qb.push(" AND c.tipo_cliente = ");
            qb.push_bind(tipo);
        }

        qb.push(" GROUP BY c.id ORDER BY c.nombre ASC");

        qb.build_query_as::<ClienteWithCount>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn client_stats(&self) -> Result<ClientStats, RepoError> {
        let totals = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM clientes) AS total,
                (SELECT COUNT(DISTINCT cliente_id) FROM events
                    WHERE cliente_id IS NOT NULL) AS con_eventos,
                (SELECT COUNT(*) FROM events WHERE cliente_id IS NOT NULL) AS eventos_totales
            "#,
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let por_tipo = sqlx::query_as::<_, ClientTypeCount>(
            "SELECT tipo_cliente, COUNT(*) AS count FROM clientes \
             GROUP BY tipo_cliente ORDER BY tipo_cliente",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ClientStats {
            total: totals.total,
            por_tipo,
            con_eventos: totals.con_eventos,
            eventos_totales: totals.eventos_totales,
        })
    }

    async fn most_active_clients(&self, limit: i64) -> Result<Vec<ClienteWithCount>, RepoError> {
        sqlx::query_as::<_, ClienteWithCount>(&format!(
            "{CLIENTE_WITH_COUNT} GROUP BY c.id \
             ORDER BY event_count DESC, c.nombre ASC \
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
