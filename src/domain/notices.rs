//! User-facing notification texts emitted by mutations.

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::domain::types::{EventStatus, VisitStatus};

const ANONYMOUS_ACTOR: &str = "Un usuario";
const DAY_MONTH_YEAR: &[FormatItem<'static>] = format_description!("[day]-[month]-[year]");

/// A notification to fan out: stored title/message plus push routing hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub url: &'static str,
    pub tag: &'static str,
}

impl Notice {
    fn new(title: &str, message: String, url: &'static str, tag: &'static str) -> Self {
        Self {
            title: title.to_string(),
            message,
            url,
            tag,
        }
    }

    pub fn event_created(actor: Option<&str>, cliente: &str, start: OffsetDateTime) -> Self {
        Self::new(
            "Nuevo evento creado",
            format!(
                "{} ha creado el evento para {} el {}",
                actor_label(actor),
                cliente,
                short_date(start)
            ),
            "/eventos",
            "evento-nuevo",
        )
    }

    pub fn event_status_changed(
        actor: Option<&str>,
        cliente: &str,
        from: EventStatus,
        to: EventStatus,
    ) -> Self {
        Self::new(
            "Estado de evento actualizado",
            format!(
                "{} cambió el estado del evento de {} de {} a {}",
                actor_label(actor),
                cliente,
                from.as_str(),
                to.as_str()
            ),
            "/eventos",
            "evento-actualizado",
        )
    }

    pub fn event_edited(actor: Option<&str>, cliente: &str) -> Self {
        Self::new(
            "Evento actualizado",
            format!("{} ha editado el evento de {}", actor_label(actor), cliente),
            "/eventos",
            "evento-actualizado",
        )
    }

    pub fn visit_scheduled(actor: Option<&str>, cliente: &str, fecha: OffsetDateTime) -> Self {
        Self::new(
            "Nueva visita técnica programada",
            format!(
                "{} ha programado una visita para {} el {}",
                actor_label(actor),
                cliente,
                short_date(fecha)
            ),
            "/technical-visits",
            "visita-nueva",
        )
    }

    pub fn visit_status_changed(
        actor: Option<&str>,
        cliente: &str,
        from: VisitStatus,
        to: VisitStatus,
    ) -> Self {
        Self::new(
            "Estado de visita técnica actualizado",
            format!(
                "{} cambió el estado de la visita de {} de {} a {}",
                actor_label(actor),
                cliente,
                from.as_str(),
                to.as_str()
            ),
            "/technical-visits",
            "visita-actualizada",
        )
    }

    pub fn visit_edited(actor: Option<&str>, cliente: &str) -> Self {
        Self::new(
            "Visita técnica actualizada",
            format!(
                "{} ha editado la visita técnica de {}",
                actor_label(actor),
                cliente
            ),
            "/technical-visits",
            "visita-actualizada",
        )
    }

    pub fn sketch_created(actor: Option<&str>, sketch: &str, cliente: &str) -> Self {
        Self::new(
            "Nuevo boceto creado",
            format!(
                "{} ha creado el boceto \"{}\" para el evento de {}",
                actor_label(actor),
                sketch,
                cliente
            ),
            "/sketches",
            "boceto-nuevo",
        )
    }

    pub fn sketch_assigned(actor: Option<&str>, sketch: &str, cliente: &str) -> Self {
        Self::new(
            "Boceto asignado a evento",
            format!(
                "{} ha asignado el boceto \"{}\" al evento de {}",
                actor_label(actor),
                sketch,
                cliente
            ),
            "/sketches",
            "boceto-asignado",
        )
    }

    /// A directly addressed notification created through the notification API.
    pub fn direct(title: String, message: String) -> Self {
        Self {
            title,
            message,
            url: "/notifications",
            tag: "notification",
        }
    }
}

fn actor_label(actor: Option<&str>) -> &str {
    match actor.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => ANONYMOUS_ACTOR,
    }
}

/// Render a date as `dd-mm-yyyy`, the short form used in Chilean Spanish.
pub fn short_date(value: OffsetDateTime) -> String {
    value
        .format(DAY_MONTH_YEAR)
        .unwrap_or_else(|_| value.date().to_string())
}
