use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    application::repos::{
        ProveedorParams, ProveedorSearch, RepoError, ServiceTypeCount, SupplierStats,
        SuppliersRepo,
    },
    domain::{entities::ProveedorRecord, types::ServiceType},
};

use super::{PostgresRepositories, map_sqlx_error};

const PROVEEDOR_COLUMNS: &str = "id, nombre, email, telefono, direccion, tipo_servicio, \
    contacto, rut, notas, activo, created_by, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ActivityRow {
    total: i64,
    activos: i64,
}

#[async_trait]
impl SuppliersRepo for PostgresRepositories {
    async fn list_suppliers(&self) -> Result<Vec<ProveedorRecord>, RepoError> {
        sqlx::query_as::<_, ProveedorRecord>(&format!(
            "SELECT {PROVEEDOR_COLUMNS} FROM proveedores ORDER BY nombre ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_supplier(&self, id: i64) -> Result<Option<ProveedorRecord>, RepoError> {
        sqlx::query_as::<_, ProveedorRecord>(&format!(
            "SELECT {PROVEEDOR_COLUMNS} FROM proveedores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn create_supplier(
        &self,
        params: ProveedorParams,
        created_by: Uuid,
    ) -> Result<ProveedorRecord, RepoError> {
        sqlx::query_as::<_, ProveedorRecord>(&format!(
            "INSERT INTO proveedores \
                (nombre, email, telefono, direccion, tipo_servicio, contacto, rut, notas, activo, \
                 created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PROVEEDOR_COLUMNS}"
        ))
        .bind(params.nombre)
        .bind(params.email)
        .bind(params.telefono)
        .bind(params.direccion)
        .bind(params.tipo_servicio)
        .bind(params.contacto)
        .bind(params.rut)
        .bind(params.notas)
        .bind(params.activo)
        .bind(created_by)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_supplier(
        &self,
        id: i64,
        params: ProveedorParams,
    ) -> Result<ProveedorRecord, RepoError> {
        sqlx::query_as::<_, ProveedorRecord>(&format!(
            "UPDATE proveedores SET \
                nombre = $2, email = $3, telefono = $4, direccion = $5, tipo_servicio = $6, \
                contacto = $7, rut = $8, notas = $9, activo = $10, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PROVEEDOR_COLUMNS}"
        ))
        .bind(id)
        .bind(params.nombre)
        .bind(params.email)
        .bind(params.telefono)
        .bind(params.direccion)
        .bind(params.tipo_servicio)
        .bind(params.contacto)
        .bind(params.rut)
        .bind(params.notas)
        .bind(params.activo)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_supplier(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM proveedores WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_suppliers(
        &self,
        search: &ProveedorSearch,
    ) -> Result<Vec<ProveedorRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PROVEEDOR_COLUMNS} FROM proveedores WHERE TRUE"
        ));

        if !search.query.is_empty() {
            let pattern = format!("%{}%", search.query);
            qb.push(" AND (nombre ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR contacto ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR rut ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        if let Some(tipo) = search.tipo_servicio {
            qb.push(" AND tipo_servicio = ");
            qb.push_bind(tipo);
        }

        if let Some(activo) = search.activo {
            qb.push(" AND activo = ");
            qb.push_bind(activo);
        }

        qb.push(" ORDER BY nombre ASC");

        qb.build_query_as::<ProveedorRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn supplier_stats(&self) -> Result<SupplierStats, RepoError> {
        let activity = sqlx::query_as::<_, ActivityRow>(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE activo) AS activos FROM proveedores",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let por_tipo = sqlx::query_as::<_, ServiceTypeCount>(
            "SELECT tipo_servicio, COUNT(*) AS count FROM proveedores \
             GROUP BY tipo_servicio ORDER BY tipo_servicio",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(SupplierStats {
            total: activity.total,
            por_tipo,
            activos: activity.activos,
            inactivos: activity.total - activity.activos,
        })
    }

    async fn list_active_by_service(
        &self,
        tipo: ServiceType,
    ) -> Result<Vec<ProveedorRecord>, RepoError> {
        sqlx::query_as::<_, ProveedorRecord>(&format!(
            "SELECT {PROVEEDOR_COLUMNS} FROM proveedores \
             WHERE tipo_servicio = $1 AND activo \
             ORDER BY nombre ASC"
        ))
        .bind(tipo)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn toggle_supplier(&self, id: i64) -> Result<Option<ProveedorRecord>, RepoError> {
        sqlx::query_as::<_, ProveedorRecord>(&format!(
            "UPDATE proveedores SET activo = NOT activo, updated_at = now() WHERE id = $1 \
             RETURNING {PROVEEDOR_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
