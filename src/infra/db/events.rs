use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    application::repos::{EventFields, EventsRepo, RepoError, VisitFields, VisitsRepo},
    domain::{
        entities::{EventRecord, TechnicalVisitRecord},
        types::{EventStatus, VisitStatus},
    },
};

use super::{PostgresRepositories, map_sqlx_error};

pub(super) const EVENT_COLUMNS: &str = "id, nombre_cliente, contacto, direccion, descripcion, \
    metros2, monto_total, anticipo, start_date, end_date, hora_inicio, hora_termino, carpa, \
    toldo, iluminacion, calefaccion, cubre_piso, estado, comentario, cliente_id, \
    technical_visit_id, created_by, created_at, updated_at";

/// Visit columns joined with the assignee's name; expects the visit aliased as `v`.
pub(super) const VISIT_SELECT: &str = "SELECT v.id, v.nombre_cliente, v.contacto, v.direccion, \
    v.descripcion, v.fecha_visita, v.hora_visita, v.estado, v.assigned_to, \
    u.name AS assigned_name, v.created_at, v.updated_at";

const VISIT_ASSIGNEE_JOIN: &str = " LEFT JOIN users u ON u.id = v.assigned_to";

#[async_trait]
impl EventsRepo for PostgresRepositories {
    async fn list_events(&self) -> Result<Vec<EventRecord>, RepoError> {
        sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_event(&self, id: i64) -> Result<Option<EventRecord>, RepoError> {
        sqlx::query_as::<_, EventRecord>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_events_by_status(
        &self,
        estado: EventStatus,
    ) -> Result<Vec<EventRecord>, RepoError> {
        sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE estado = $1 ORDER BY start_date ASC, id ASC"
        ))
        .bind(estado)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_event(
        &self,
        fields: EventFields,
        created_by: Uuid,
    ) -> Result<EventRecord, RepoError> {
        sqlx::query_as::<_, EventRecord>(&format!(
            "INSERT INTO events ( \
                nombre_cliente, contacto, direccion, descripcion, metros2, monto_total, anticipo, \
                start_date, end_date, hora_inicio, hora_termino, carpa, toldo, iluminacion, \
                calefaccion, cubre_piso, estado, comentario, cliente_id, technical_visit_id, \
                created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                $17, $18, $19, $20, $21) \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(fields.nombre_cliente)
        .bind(fields.contacto)
        .bind(fields.direccion)
        .bind(fields.descripcion)
        .bind(fields.metros2)
        .bind(fields.monto_total)
        .bind(fields.anticipo)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.hora_inicio)
        .bind(fields.hora_termino)
        .bind(fields.carpa)
        .bind(fields.toldo)
        .bind(fields.iluminacion)
        .bind(fields.calefaccion)
        .bind(fields.cubre_piso)
        .bind(fields.estado)
        .bind(fields.comentario)
        .bind(fields.cliente_id)
        .bind(fields.technical_visit_id)
        .bind(created_by)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_event(&self, id: i64, fields: EventFields) -> Result<EventRecord, RepoError> {
        sqlx::query_as::<_, EventRecord>(&format!(
            "UPDATE events SET \
                nombre_cliente = $2, contacto = $3, direccion = $4, descripcion = $5, \
                metros2 = $6, monto_total = $7, anticipo = $8, start_date = $9, end_date = $10, \
                hora_inicio = $11, hora_termino = $12, carpa = $13, toldo = $14, \
                iluminacion = $15, calefaccion = $16, cubre_piso = $17, estado = $18, \
                comentario = $19, cliente_id = $20, technical_visit_id = $21, updated_at = now() \
             WHERE id = $1 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(fields.nombre_cliente)
        .bind(fields.contacto)
        .bind(fields.direccion)
        .bind(fields.descripcion)
        .bind(fields.metros2)
        .bind(fields.monto_total)
        .bind(fields.anticipo)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.hora_inicio)
        .bind(fields.hora_termino)
        .bind(fields.carpa)
        .bind(fields.toldo)
        .bind(fields.iluminacion)
        .bind(fields.calefaccion)
        .bind(fields.cubre_piso)
        .bind(fields.estado)
        .bind(fields.comentario)
        .bind(fields.cliente_id)
        .bind(fields.technical_visit_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_event(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl VisitsRepo for PostgresRepositories {
    async fn list_visits(&self) -> Result<Vec<TechnicalVisitRecord>, RepoError> {
        sqlx::query_as::<_, TechnicalVisitRecord>(&format!(
            "{VISIT_SELECT} FROM technical_visits v{VISIT_ASSIGNEE_JOIN} \
             ORDER BY v.created_at DESC, v.id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_visit(&self, id: i64) -> Result<Option<TechnicalVisitRecord>, RepoError> {
        sqlx::query_as::<_, TechnicalVisitRecord>(&format!(
            "{VISIT_SELECT} FROM technical_visits v{VISIT_ASSIGNEE_JOIN} WHERE v.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_visits_by_status(
        &self,
        estado: VisitStatus,
        newest_first: bool,
    ) -> Result<Vec<TechnicalVisitRecord>, RepoError> {
        let direction = if newest_first { "DESC" } else { "ASC" };
        sqlx::query_as::<_, TechnicalVisitRecord>(&format!(
            "{VISIT_SELECT} FROM technical_visits v{VISIT_ASSIGNEE_JOIN} \
             WHERE v.estado = $1 \
             ORDER BY v.fecha_visita {direction}, v.id {direction}"
        ))
        .bind(estado)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_visit(&self, fields: VisitFields) -> Result<TechnicalVisitRecord, RepoError> {
        sqlx::query_as::<_, TechnicalVisitRecord>(&format!(
            "WITH v AS ( \
                INSERT INTO technical_visits \
                    (nombre_cliente, contacto, direccion, descripcion, fecha_visita, hora_visita, \
                     estado, assigned_to) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                RETURNING * \
             ) \
             {VISIT_SELECT} FROM v{VISIT_ASSIGNEE_JOIN}"
        ))
        .bind(fields.nombre_cliente)
        .bind(fields.contacto)
        .bind(fields.direccion)
        .bind(fields.descripcion)
        .bind(fields.fecha_visita)
        .bind(fields.hora_visita)
        .bind(fields.estado)
        .bind(fields.assigned_to)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_visit(
        &self,
        id: i64,
        fields: VisitFields,
    ) -> Result<TechnicalVisitRecord, RepoError> {
        sqlx::query_as::<_, TechnicalVisitRecord>(&format!(
            "WITH v AS ( \
                UPDATE technical_visits SET \
                    nombre_cliente = $2, contacto = $3, direccion = $4, descripcion = $5, \
                    fecha_visita = $6, hora_visita = $7, estado = $8, assigned_to = $9, \
                    updated_at = now() \
                WHERE id = $1 \
                RETURNING * \
             ) \
             {VISIT_SELECT} FROM v{VISIT_ASSIGNEE_JOIN}"
        ))
        .bind(id)
        .bind(fields.nombre_cliente)
        .bind(fields.contacto)
        .bind(fields.direccion)
        .bind(fields.descripcion)
        .bind(fields.fecha_visita)
        .bind(fields.hora_visita)
        .bind(fields.estado)
        .bind(fields.assigned_to)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_visit(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM technical_visits WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
