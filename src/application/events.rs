//! Rental events and their change notifications.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::application::auth::Principal;
use crate::application::fanout::{AllUsers, NotificationFanout};
use crate::application::repos::{EventFields, EventsRepo, RepoError, UsersRepo, VisitsRepo};
use crate::domain::entities::{EventRecord, TechnicalVisitRecord};
use crate::domain::error::DomainError;
use crate::domain::notices::Notice;
use crate::domain::types::{EventStatus, VisitStatus};
use crate::domain::validation::{optional_text, required_text};

#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("Evento no encontrado")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateEventCommand {
    pub nombre_cliente: String,
    pub contacto: String,
    pub direccion: String,
    pub descripcion: String,
    pub metros2: i32,
    pub monto_total: i64,
    pub anticipo: i64,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub hora_inicio: OffsetDateTime,
    pub hora_termino: OffsetDateTime,
    pub carpa: bool,
    pub toldo: bool,
    pub iluminacion: bool,
    pub calefaccion: bool,
    pub cubre_piso: bool,
    pub estado: Option<EventStatus>,
    pub comentario: Option<String>,
    pub cliente_id: Option<i64>,
    pub technical_visit_id: Option<i64>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateEventCommand {
    pub nombre_cliente: Option<String>,
    pub contacto: Option<String>,
    pub direccion: Option<String>,
    pub descripcion: Option<String>,
    pub metros2: Option<i32>,
    pub monto_total: Option<i64>,
    pub anticipo: Option<i64>,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
    pub hora_inicio: Option<OffsetDateTime>,
    pub hora_termino: Option<OffsetDateTime>,
    pub carpa: Option<bool>,
    pub toldo: Option<bool>,
    pub iluminacion: Option<bool>,
    pub calefaccion: Option<bool>,
    pub cubre_piso: Option<bool>,
    pub estado: Option<EventStatus>,
    pub comentario: Option<String>,
    pub cliente_id: Option<i64>,
}

impl UpdateEventCommand {
    /// Whether any field other than `estado` and `comentario` was submitted.
    fn edits_details(&self) -> bool {
        self.nombre_cliente.is_some()
            || self.contacto.is_some()
            || self.direccion.is_some()
            || self.descripcion.is_some()
            || self.metros2.is_some()
            || self.monto_total.is_some()
            || self.anticipo.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.hora_inicio.is_some()
            || self.hora_termino.is_some()
            || self.carpa.is_some()
            || self.toldo.is_some()
            || self.iluminacion.is_some()
            || self.calefaccion.is_some()
            || self.cubre_piso.is_some()
            || self.cliente_id.is_some()
    }

    fn apply(self, fields: &mut EventFields) -> Result<(), DomainError> {
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
        if let Some(value) = self.metros2 {
            fields.metros2 = value;
        }
        if let Some(value) = self.monto_total {
            fields.monto_total = value;
        }
        if let Some(value) = self.anticipo {
            fields.anticipo = value;
        }
        if let Some(value) = self.start_date {
            fields.start_date = value;
        }
        if let Some(value) = self.end_date {
            fields.end_date = value;
        }
        if let Some(value) = self.hora_inicio {
            fields.hora_inicio = value;
        }
        if let Some(value) = self.hora_termino {
            fields.hora_termino = value;
        }
        if let Some(value) = self.carpa {
            fields.carpa = value;
        }
        if let Some(value) = self.toldo {
            fields.toldo = value;
        }
        if let Some(value) = self.iluminacion {
            fields.iluminacion = value;
        }
        if let Some(value) = self.calefaccion {
            fields.calefaccion = value;
        }
        if let Some(value) = self.cubre_piso {
            fields.cubre_piso = value;
        }
        if let Some(value) = self.estado {
            fields.estado = value;
        }
        if self.comentario.is_some() {
            fields.comentario = optional_text(self.comentario);
        }
        if let Some(value) = self.cliente_id {
            fields.cliente_id = Some(value);
        }
        check_amounts(fields)
    }
}

fn check_amounts(fields: &EventFields) -> Result<(), DomainError> {
    if fields.metros2 < 1 {
        return Err(DomainError::validation("Los metros cuadrados son requeridos"));
    }
    if fields.monto_total < 0 {
        return Err(DomainError::validation(
            "El monto total debe ser mayor o igual a 0",
        ));
    }
    if fields.anticipo < 0 {
        return Err(DomainError::validation(
            "El anticipo debe ser mayor o igual a 0",
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventsRepo>,
    visits: Arc<dyn VisitsRepo>,
    everyone: AllUsers,
    fanout: NotificationFanout,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventsRepo>,
        visits: Arc<dyn VisitsRepo>,
        users: Arc<dyn UsersRepo>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            events,
            visits,
            everyone: AllUsers::new(users),
            fanout,
        }
    }

    pub async fn list(&self) -> Result<Vec<EventRecord>, EventError> {
        Ok(self.events.list_events().await?)
    }

    pub async fn get(&self, id: i64) -> Result<EventRecord, EventError> {
        self.events.find_event(id).await?.ok_or(EventError::NotFound)
    }

    pub async fn by_status(&self, estado: EventStatus) -> Result<Vec<EventRecord>, EventError> {
        Ok(self.events.list_events_by_status(estado).await?)
    }

    /// Finished technical visits an event can be created from, newest first.
    pub async fn completed_visits(&self) -> Result<Vec<TechnicalVisitRecord>, EventError> {
        Ok(self
            .visits
            .list_visits_by_status(VisitStatus::Realizada, true)
            .await?)
    }

    pub async fn create(
        &self,
        actor: &Principal,
        cmd: CreateEventCommand,
    ) -> Result<EventRecord, EventError> {
        let fields = EventFields {
            nombre_cliente: required_text(
                &cmd.nombre_cliente,
                "El nombre del cliente es requerido",
            )?,
            contacto: required_text(&cmd.contacto, "El contacto es requerido")?,
            direccion: required_text(&cmd.direccion, "La dirección es requerida")?,
            descripcion: required_text(&cmd.descripcion, "La descripción es requerida")?,
            metros2: cmd.metros2,
            monto_total: cmd.monto_total,
            anticipo: cmd.anticipo,
            start_date: cmd.start_date,
            end_date: cmd.end_date,
            hora_inicio: cmd.hora_inicio,
            hora_termino: cmd.hora_termino,
            carpa: cmd.carpa,
            toldo: cmd.toldo,
            iluminacion: cmd.iluminacion,
            calefaccion: cmd.calefaccion,
            cubre_piso: cmd.cubre_piso,
            estado: cmd.estado.unwrap_or_default(),
            comentario: optional_text(cmd.comentario),
            cliente_id: cmd.cliente_id,
            technical_visit_id: cmd.technical_visit_id,
        };
        check_amounts(&fields)?;

        let event = self.events.create_event(fields, actor.user_id).await?;
        info!(
            target = "carpas::events",
            event_id = event.id,
            estado = event.estado.as_str(),
            "event created"
        );

        let notice = Notice::event_created(
            actor.display_name(),
            &event.nombre_cliente,
            event.start_date,
        );
        self.fanout
            .publish_detached(&notice, Some(actor), &self.everyone)
            .await;
        Ok(event)
    }

    pub async fn update(
        &self,
        actor: &Principal,
        id: i64,
        cmd: UpdateEventCommand,
    ) -> Result<EventRecord, EventError> {
        let previous = self.get(id).await?;
        let edits_details = cmd.edits_details();
        let requested_status = cmd.estado;

        let mut fields = EventFields::from(&previous);
        cmd.apply(&mut fields)?;

        let updated = self
            .events
            .update_event(id, fields)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => EventError::NotFound,
                other => EventError::Repo(other),
            })?;

        let notice = match requested_status {
            Some(estado) if estado != previous.estado => Some(Notice::event_status_changed(
                actor.display_name(),
                &updated.nombre_cliente,
                previous.estado,
                estado,
            )),
            _ if edits_details => Some(Notice::event_edited(
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

    pub async fn delete(&self, id: i64) -> Result<(), EventError> {
        if self.events.delete_event(id).await? {
            Ok(())
        } else {
            Err(EventError::NotFound)
        }
    }
}
