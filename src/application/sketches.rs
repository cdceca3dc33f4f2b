//! Floor-plan sketches, optionally attached to an event.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::auth::Principal;
use crate::application::fanout::{AllUsers, NotificationFanout};
use crate::application::repos::{EventsRepo, RepoError, SketchFields, SketchesRepo, UsersRepo};
use crate::domain::entities::SketchRecord;
use crate::domain::error::DomainError;
use crate::domain::notices::Notice;
use crate::domain::validation::{optional_text, required_text};

#[derive(Debug, Error)]
pub enum SketchError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("Boceto no encontrado")]
    NotFound,
    #[error("Evento no encontrado")]
    EventNotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateSketchCommand {
    pub name: String,
    pub description: Option<String>,
    pub data: String,
    pub event_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSketchCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    pub data: Option<String>,
    /// `Some(None)` detaches the sketch from its event.
    pub event_id: Option<Option<i64>>,
}

#[derive(Clone)]
pub struct SketchService {
    sketches: Arc<dyn SketchesRepo>,
    events: Arc<dyn EventsRepo>,
    everyone: AllUsers,
    fanout: NotificationFanout,
}

impl SketchService {
    pub fn new(
        sketches: Arc<dyn SketchesRepo>,
        events: Arc<dyn EventsRepo>,
        users: Arc<dyn UsersRepo>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            sketches,
            events,
            everyone: AllUsers::new(users),
            fanout,
        }
    }

    pub async fn list(&self) -> Result<Vec<SketchRecord>, SketchError> {
        Ok(self.sketches.list_sketches().await?)
    }

    pub async fn get(&self, id: i64) -> Result<SketchRecord, SketchError> {
        self.sketches
            .find_sketch(id)
            .await?
            .ok_or(SketchError::NotFound)
    }

    pub async fn for_event(&self, event_id: i64) -> Result<Vec<SketchRecord>, SketchError> {
        Ok(self.sketches.list_sketches_for_event(event_id).await?)
    }

    pub async fn unassigned(&self) -> Result<Vec<SketchRecord>, SketchError> {
        Ok(self.sketches.list_unassigned_sketches().await?)
    }

    pub async fn create(
        &self,
        actor: &Principal,
        cmd: CreateSketchCommand,
    ) -> Result<SketchRecord, SketchError> {
        let fields = SketchFields {
            name: required_text(&cmd.name, "El nombre es requerido")?,
            description: optional_text(cmd.description),
            data: cmd.data,
            event_id: cmd.event_id,
        };
        let event = match fields.event_id {
            Some(event_id) => Some(
                self.events
                    .find_event(event_id)
                    .await?
                    .ok_or(SketchError::EventNotFound)?,
            ),
            None => None,
        };

        let sketch = self.sketches.create_sketch(fields, actor.user_id).await?;
        info!(
            target = "carpas::sketches",
            sketch_id = sketch.id,
            event_id = ?sketch.event_id,
            "sketch created"
        );

        if let Some(event) = event {
            let notice =
                Notice::sketch_created(actor.display_name(), &sketch.name, &event.nombre_cliente);
            self.fanout
                .publish_detached(&notice, Some(actor), &self.everyone)
                .await;
        }
        Ok(sketch)
    }

    pub async fn update(&self, id: i64, cmd: UpdateSketchCommand) -> Result<SketchRecord, SketchError> {
        let current = self.get(id).await?;
        let mut fields = SketchFields {
            name: current.name,
            description: current.description,
            data: current.data,
            event_id: current.event_id,
        };
        if let Some(name) = cmd.name {
            fields.name = required_text(&name, "El nombre es requerido")?;
        }
        if cmd.description.is_some() {
            fields.description = optional_text(cmd.description);
        }
        if let Some(data) = cmd.data {
            fields.data = data;
        }
        if let Some(event_id) = cmd.event_id {
            if let Some(event_id) = event_id {
                self.ensure_event(event_id).await?;
            }
            fields.event_id = event_id;
        }

        self.sketches
            .update_sketch(id, fields)
            .await
            .map_err(not_found_or_repo)
    }

    pub async fn delete(&self, id: i64) -> Result<(), SketchError> {
        if self.sketches.delete_sketch(id).await? {
            Ok(())
        } else {
            Err(SketchError::NotFound)
        }
    }

    /// Attach to an event, or detach with `None`. Attaching notifies everyone.
    pub async fn assign(
        &self,
        actor: &Principal,
        id: i64,
        event_id: Option<i64>,
    ) -> Result<SketchRecord, SketchError> {
        let event = match event_id {
            Some(event_id) => Some(
                self.events
                    .find_event(event_id)
                    .await?
                    .ok_or(SketchError::EventNotFound)?,
            ),
            None => None,
        };

        let sketch = self
            .sketches
            .assign_sketch(id, event_id)
            .await
            .map_err(not_found_or_repo)?;

        if let Some(event) = event {
            let notice =
                Notice::sketch_assigned(actor.display_name(), &sketch.name, &event.nombre_cliente);
            self.fanout
                .publish_detached(&notice, Some(actor), &self.everyone)
                .await;
        }
        Ok(sketch)
    }

    async fn ensure_event(&self, event_id: i64) -> Result<(), SketchError> {
        match self.events.find_event(event_id).await? {
            Some(_) => Ok(()),
            None => Err(SketchError::EventNotFound),
        }
    }
}

fn not_found_or_repo(err: RepoError) -> SketchError {
    match err {
        RepoError::NotFound => SketchError::NotFound,
        other => SketchError::Repo(other),
    }
}
