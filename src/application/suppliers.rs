//! Supplier (proveedor) registry.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::auth::Principal;
use crate::application::repos::{
    ProveedorParams, ProveedorSearch, RepoError, SupplierStats, SuppliersRepo,
};
use crate::domain::entities::ProveedorRecord;
use crate::domain::error::DomainError;
use crate::domain::types::ServiceType;
use crate::domain::validation::{optional_email, optional_text, required_text};

#[derive(Debug, Error)]
pub enum SupplierError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("Proveedor no encontrado")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct ProveedorInput {
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub tipo_servicio: ServiceType,
    pub contacto: Option<String>,
    pub rut: Option<String>,
    pub notas: Option<String>,
    pub activo: Option<bool>,
}

impl ProveedorInput {
    fn normalize(self) -> Result<ProveedorParams, DomainError> {
        Ok(ProveedorParams {
            nombre: required_text(&self.nombre, "El nombre es requerido")?,
            email: optional_email(self.email)?,
            telefono: optional_text(self.telefono),
            direccion: optional_text(self.direccion),
            tipo_servicio: self.tipo_servicio,
            contacto: optional_text(self.contacto),
            rut: optional_text(self.rut),
            notas: optional_text(self.notas),
            activo: self.activo.unwrap_or(true),
        })
    }
}

#[derive(Clone)]
pub struct SupplierService {
    repo: Arc<dyn SuppliersRepo>,
}

impl SupplierService {
    pub fn new(repo: Arc<dyn SuppliersRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<ProveedorRecord>, SupplierError> {
        Ok(self.repo.list_suppliers().await?)
    }

    pub async fn get(&self, id: i64) -> Result<ProveedorRecord, SupplierError> {
        self.repo
            .find_supplier(id)
            .await?
            .ok_or(SupplierError::NotFound)
    }

    pub async fn create(
        &self,
        actor: &Principal,
        input: ProveedorInput,
    ) -> Result<ProveedorRecord, SupplierError> {
        let params = input.normalize()?;
        let proveedor = self.repo.create_supplier(params, actor.user_id).await?;
        info!(
            target = "carpas::suppliers",
            proveedor_id = proveedor.id,
            tipo = proveedor.tipo_servicio.as_str(),
            "supplier created"
        );
        Ok(proveedor)
    }

    pub async fn update(
        &self,
        id: i64,
        input: ProveedorInput,
    ) -> Result<ProveedorRecord, SupplierError> {
        let params = input.normalize()?;
        self.repo
            .update_supplier(id, params)
            .await
            .map_err(not_found_or_repo)
    }

    pub async fn delete(&self, id: i64) -> Result<(), SupplierError> {
        if self.repo.delete_supplier(id).await? {
            Ok(())
        } else {
            Err(SupplierError::NotFound)
        }
    }

    pub async fn search(
        &self,
        search: ProveedorSearch,
    ) -> Result<Vec<ProveedorRecord>, SupplierError> {
        let search = ProveedorSearch {
            query: search.query.trim().to_string(),
            ..search
        };
        Ok(self.repo.search_suppliers(&search).await?)
    }

    pub async fn stats(&self) -> Result<SupplierStats, SupplierError> {
        Ok(self.repo.supplier_stats().await?)
    }

    pub async fn by_service(
        &self,
        tipo: ServiceType,
    ) -> Result<Vec<ProveedorRecord>, SupplierError> {
        Ok(self.repo.list_active_by_service(tipo).await?)
    }

    pub async fn toggle(&self, id: i64) -> Result<ProveedorRecord, SupplierError> {
        self.repo
            .toggle_supplier(id)
            .await?
            .ok_or(SupplierError::NotFound)
    }
}

fn not_found_or_repo(err: RepoError) -> SupplierError {
    match err {
        RepoError::NotFound => SupplierError::NotFound,
        other => SupplierError::Repo(other),
    }
}
