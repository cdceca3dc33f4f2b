//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{
    ClientType, EventStatus, MovementKind, ReservationStatus, Role, ServiceType, VisitStatus,
};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub image: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub preferences: Option<JsonValue>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub email_verified: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Minimal user projection used in pickers and assignment lists.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prefix: String,
    pub hashed_secret: Vec<u8>,
    pub expires_at: OffsetDateTime,
    pub last_used_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub nombre_cliente: String,
    pub contacto: String,
    pub direccion: String,
    pub descripcion: String,
    pub metros2: i32,
    pub monto_total: i64,
    pub anticipo: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub hora_inicio: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub hora_termino: OffsetDateTime,
    pub carpa: bool,
    pub toldo: bool,
    pub iluminacion: bool,
    pub calefaccion: bool,
    pub cubre_piso: bool,
    pub estado: EventStatus,
    pub comentario: Option<String>,
    pub cliente_id: Option<i64>,
    pub technical_visit_id: Option<i64>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TechnicalVisitRecord {
    pub id: i64,
    pub nombre_cliente: String,
    pub contacto: String,
    pub direccion: String,
    pub descripcion: String,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_visita: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub hora_visita: OffsetDateTime,
    pub estado: VisitStatus,
    pub assigned_to: Option<Uuid>,
    pub assigned_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ItemRecord {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i32,
    pub unit: String,
    pub image_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StockMovementRecord {
    pub id: i64,
    pub item_id: i64,
    pub kind: MovementKind,
    pub quantity: i32,
    pub reason: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// An active reservation joined with the event it holds stock for.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReservationRecord {
    pub id: i64,
    pub item_id: i64,
    pub event_id: i64,
    pub quantity: i32,
    pub status: ReservationStatus,
    pub event_nombre_cliente: String,
    #[serde(with = "time::serde::rfc3339")]
    pub event_start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub event_end_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ClienteRecord {
    pub id: i64,
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub tipo_cliente: ClientType,
    pub empresa: Option<String>,
    pub rut: Option<String>,
    pub notas: Option<String>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ProveedorRecord {
    pub id: i64,
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub tipo_servicio: ServiceType,
    pub contacto: Option<String>,
    pub rut: Option<String>,
    pub notas: Option<String>,
    pub activo: bool,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SketchRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub data: String,
    pub event_id: Option<i64>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct NotificationRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
    pub action_by: Option<Uuid>,
    pub action_by_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PushSubscriptionRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
