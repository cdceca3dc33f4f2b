//! Client (cliente) registry.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::application::auth::Principal;
use crate::application::repos::{
    ClientStats, ClienteParams, ClienteSearch, ClienteWithCount, ClientsRepo, RepoError,
};
use crate::domain::entities::{ClienteRecord, EventRecord};
use crate::domain::error::DomainError;
use crate::domain::types::ClientType;
use crate::domain::validation::{optional_email, optional_text, required_text};

const MOST_ACTIVE_DEFAULT: i64 = 10;
const MOST_ACTIVE_MAX: i64 = 20;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("Cliente no encontrado")]
    NotFound,
    #[error(
        "No se puede eliminar el cliente porque tiene {count} evento(s) asociado(s). Primero elimine o desasocie los eventos."
    )]
    HasEvents { count: u64 },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Client fields as submitted. Update replaces every field.
#[derive(Debug, Clone, Default)]
pub struct ClienteInput {
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub tipo_cliente: Option<ClientType>,
    pub empresa: Option<String>,
    pub rut: Option<String>,
    pub notas: Option<String>,
}

impl ClienteInput {
    fn normalize(self) -> Result<ClienteParams, DomainError> {
        Ok(ClienteParams {
            nombre: required_text(&self.nombre, "El nombre es requerido")?,
            email: optional_email(self.email)?,
            telefono: optional_text(self.telefono),
            direccion: optional_text(self.direccion),
            tipo_cliente: self.tipo_cliente.unwrap_or_default(),
            empresa: optional_text(self.empresa),
            rut: optional_text(self.rut),
            notas: optional_text(self.notas),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClienteDetail {
    #[serde(flatten)]
    pub cliente: ClienteRecord,
    pub events: Vec<EventRecord>,
}

#[derive(Clone)]
pub struct ClientService {
    repo: Arc<dyn ClientsRepo>,
}

impl ClientService {
    pub fn new(repo: Arc<dyn ClientsRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<ClienteWithCount>, ClientError> {
        Ok(self.repo.list_clients().await?)
    }

    pub async fn get(&self, id: i64) -> Result<ClienteDetail, ClientError> {
        let cliente = self.repo.find_client(id).await?.ok_or(ClientError::NotFound)?;
        let events = self.repo.list_client_events(id).await?;
        Ok(ClienteDetail { cliente, events })
    }

    pub async fn create(
        &self,
        actor: &Principal,
        input: ClienteInput,
    ) -> Result<ClienteRecord, ClientError> {
        let params = input.normalize()?;
        let cliente = self.repo.create_client(params, actor.user_id).await?;
        info!(
            target = "carpas::clients",
            cliente_id = cliente.id,
            user_id = %actor.user_id,
            "client created"
        );
        Ok(cliente)
    }

    pub async fn update(&self, id: i64, input: ClienteInput) -> Result<ClienteRecord, ClientError> {
        let params = input.normalize()?;
        self.repo
            .update_client(id, params)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => ClientError::NotFound,
                other => ClientError::Repo(other),
            })
    }

    /// Refuses while any event still references the client.
    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        if self.repo.find_client(id).await?.is_none() {
            return Err(ClientError::NotFound);
        }

        let count = self.repo.count_client_events(id).await?;
        if count > 0 {
            return Err(ClientError::HasEvents { count });
        }

        match self.repo.delete_client(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ClientError::NotFound),
            // an event was linked between the count and the delete
            Err(RepoError::Integrity { .. }) => {
                let count = self.repo.count_client_events(id).await?;
                Err(ClientError::HasEvents {
                    count: count.max(1),
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    pub async fn search(&self, search: ClienteSearch) -> Result<Vec<ClienteWithCount>, ClientError> {
        let search = ClienteSearch {
            query: search.query.trim().to_string(),
            ..search
        };
        Ok(self.repo.search_clients(&search).await?)
    }

    pub async fn stats(&self) -> Result<ClientStats, ClientError> {
        Ok(self.repo.client_stats().await?)
    }

    pub async fn most_active(&self, limit: Option<i64>) -> Result<Vec<ClienteWithCount>, ClientError> {
        let limit = limit.unwrap_or(MOST_ACTIVE_DEFAULT);
        if !(1..=MOST_ACTIVE_MAX).contains(&limit) {
            return Err(DomainError::validation("El límite debe estar entre 1 y 20").into());
        }
        Ok(self.repo.most_active_clients(limit).await?)
    }
}
