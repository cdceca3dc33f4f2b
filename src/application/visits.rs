//! Technical visits scheduled ahead of an event.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::fanout::{AllUsers, NotificationFanout};
use crate::application::repos::{RepoError, UsersRepo, VisitFields, VisitsRepo};
use crate::domain::entities::{TechnicalVisitRecord, UserSummary};
use crate::domain::error::DomainError;
use crate::domain::notices::Notice;
use crate::domain::types::VisitStatus;
use crate::domain::validation::required_text;

#[derive(Debug, Error)]
pub enum VisitError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("Visita técnica no encontrada")]
    NotFound,
    #[error("El usuario asignado no existe")]
    UnknownAssignee,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateVisitCommand {
    pub nombre_cliente: String,
    pub contacto: String,
    pub direccion: String,
    pub descripcion: String,
    pub fecha_visita: OffsetDateTime,
    pub hora_visita: OffsetDateTime,
    pub estado: Option<VisitStatus>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateVisitCommand {
    pub nombre_cliente: Option<String>,
    pub contacto: Option<String>,
    pub direccion: Option<String>,
    pub descripcion: Option<String>,
    pub fecha_visita: Option<OffsetDateTime>,
    pub hora_visita: Option<OffsetDateTime>,
    pub estado: Option<VisitStatus>,
    pub assigned_to: Option<Uuid>,
}

impl UpdateVisitCommand {
    /// Any submitted field besides `estado`; a new assignee counts as an edit.
    fn edits_details(&self) -> bool {
        self.nombre_cliente.is_some()
            || self.contacto.is_some()
            || self.direccion.is_some()
            || self.descripcion.is_some()
            || self.fecha_visita.is_some()
            || self.hora_visita.is_some()
            || self.assigned_to.is_some()
    }

    fn apply(self, fields: &mut VisitFields) -> Result<(), DomainError> {
        if let Some(value) = self.nombre_cliente {
            fields.nombre_cliente = required_text(&value, "El nombre del cliente es requerido")?;
        }
        if let Some(value) = self.contacto {
            fields.contacto = required_text(&value, "El contacto es requerido")?;
        }
        if let Some(value) = self.direccion {
            fields.direccion = required_text(&value, "La dirección es requerida")?;
        }
        if let Some(value) = self.descripcion {
            fields.descripcion = required_text(&value, "La descripción es requerida")?;
        }
        if let Some(value) = self.fecha_visita {
            fields.fecha_visita = value;
        }
        if let Some(value) = self.hora_visita {
            fields.hora_visita = value;
        }
        if let Some(value) = self.estado {
            fields.estado = value;
        }
        if let Some(value) = self.assigned_to {
            fields.assigned_to = Some(value);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct VisitService {
    visits: Arc<dyn VisitsRepo>,
    users: Arc<dyn UsersRepo>,
    everyone: AllUsers,
    fanout: NotificationFanout,
}

impl VisitService {
    pub fn new(
        visits: Arc<dyn VisitsRepo>,
        users: Arc<dyn UsersRepo>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            visits,
            everyone: AllUsers::new(users.clone()),
            users,
            fanout,
        }
    }

    pub async fn list(&self) -> Result<Vec<TechnicalVisitRecord>, VisitError> {
        Ok(self.visits.list_visits().await?)
    }

    pub async fn get(&self, id: i64) -> Result<TechnicalVisitRecord, VisitError> {
        self.visits.find_visit(id).await?.ok_or(VisitError::NotFound)
    }

    /// Visits in the given state, soonest first.
    pub async fn by_status(
        &self,
        estado: VisitStatus,
    ) -> Result<Vec<TechnicalVisitRecord>, VisitError> {
        Ok(self.visits.list_visits_by_status(estado, false).await?)
    }

    /// Accounts a visit can be assigned to.
    pub async fn assignable_users(&self) -> Result<Vec<UserSummary>, VisitError> {
        Ok(self.users.list_user_summaries().await?)
    }

    pub async fn create(
        &self,
        actor: &Principal,
        cmd: CreateVisitCommand,
    ) -> Result<TechnicalVisitRecord, VisitError> {
        let fields = VisitFields {
            nombre_cliente: required_text(
                &cmd.nombre_cliente,
                "El nombre del cliente es requerido",
            )?,
            contacto: required_text(&cmd.contacto, "El contacto es requerido")?,
            direccion: required_text(&cmd.direccion, "La dirección es requerida")?,
            descripcion: required_text(&cmd.descripcion, "La descripción es requerida")?,
            fecha_visita: cmd.fecha_visita,
            hora_visita: cmd.hora_visita,
            estado: cmd.estado.unwrap_or_default(),
            assigned_to: cmd.assigned_to,
        };
        self.ensure_assignee(fields.assigned_to).await?;

        let visit = self.visits.create_visit(fields).await?;
        info!(
            target = "carpas::visits",
            visit_id = visit.id,
            estado = visit.estado.as_str(),
            "technical visit scheduled"
        );

        let notice = Notice::visit_scheduled(
            actor.display_name(),
            &visit.nombre_cliente,
            visit.fecha_visita,
        );
        self.fanout
            .publish_detached(&notice, Some(actor), &self.everyone)
            .await;
        Ok(visit)
    }

    pub async fn update(
        &self,
        actor: &Principal,
        id: i64,
        cmd: UpdateVisitCommand,
    ) -> Result<TechnicalVisitRecord, VisitError> {
        let previous = self.get(id).await?;
        let edits_details = cmd.edits_details();
        let requested_status = cmd.estado;
        self.ensure_assignee(cmd.assigned_to).await?;

        let mut fields = VisitFields::from(&previous);
        cmd.apply(&mut fields)?;

        let updated = self
            .visits
            .update_visit(id, fields)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => VisitError::NotFound,
                other => VisitError::Repo(other),
            })?;

        let notice = match requested_status {
            Some(estado) if estado != previous.estado => Some(Notice::visit_status_changed(
                actor.display_name(),
                &updated.nombre_cliente,
                previous.estado,
                estado,
            )),
            _ if edits_details => Some(Notice::visit_edited(
                actor.display_name(),
                &updated.nombre_cliente,
            )),
            _ => None,
        };
        if let Some(notice) = notice {
            self.fanout
                .publish_detached(&notice, Some(actor), &self.everyone)
                .await;
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), VisitError> {
        if self.visits.delete_visit(id).await? {
            Ok(())
        } else {
            Err(VisitError::NotFound)
        }
    }

    async fn ensure_assignee(&self, assignee: Option<Uuid>) -> Result<(), VisitError> {
        match assignee {
            Some(user_id) if self.users.find_user(user_id).await?.is_none() => {
                Err(VisitError::UnknownAssignee)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MemoryStore, principal, services};
    use crate::domain::types::Role;
    use time::macros::datetime;

    fn command() -> CreateVisitCommand {
        CreateVisitCommand {
            nombre_cliente: "Hotel W".into(),
            contacto: "recepcion@hotelw.cl".into(),
            direccion: "Isidora Goyenechea 3000".into(),
            descripcion: "Medir terraza".into(),
            fecha_visita: datetime!(2025-05-02 12:00 UTC),
            hora_visita: datetime!(2025-05-02 12:00 UTC),
            estado: None,
            assigned_to: None,
        }
    }

    #[tokio::test]
    async fn omitted_status_defaults_to_programada() {
        let store = Arc::new(MemoryStore::default());
        store.add_user("tec@carpas.cl", Role::Technician);
        let svc = services(&store).visits;

        let visit = svc
            .create(&principal(Role::Sales, Some("Luis")), command())
            .await
            .expect("create");
        assert_eq!(visit.estado, VisitStatus::Programada);
        assert_eq!(
            store.notification_titles(),
            vec!["Nueva visita técnica programada"]
        );
    }

    #[tokio::test]
    async fn reassignment_counts_as_edit() {
        let store = Arc::new(MemoryStore::default());
        let tech = store.add_user("tec@carpas.cl", Role::Technician);
        let svc = services(&store).visits;
        let actor = principal(Role::Sales, Some("Luis"));
        let visit = svc.create(&actor, command()).await.expect("create");

        let updated = svc
            .update(
                &actor,
                visit.id,
                UpdateVisitCommand {
                    assigned_to: Some(tech),
                    ..UpdateVisitCommand::default()
                },
            )
            .await
            .expect("assign");
        assert_eq!(updated.assigned_to, Some(tech));
        assert_eq!(
            store.notification_titles().last().map(String::as_str),
            Some("Visita técnica actualizada")
        );
    }

    #[tokio::test]
    async fn unknown_assignee_is_rejected() {
        let store = Arc::new(MemoryStore::default());
        let svc = services(&store).visits;
        let err = svc
            .create(
                &principal(Role::Sales, None),
                CreateVisitCommand {
                    assigned_to: Some(Uuid::new_v4()),
                    ..command()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VisitError::UnknownAssignee));
    }
}
