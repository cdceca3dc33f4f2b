use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::clients::ClienteInput;
use crate::application::events::{CreateEventCommand, UpdateEventCommand};
use crate::application::inventory::{AdjustStockCommand, CreateItemCommand, UpdateItemCommand};
use crate::application::profile::UpdateProfileCommand;
use crate::application::push::SubscribeCommand;
use crate::application::sketches::{CreateSketchCommand, UpdateSketchCommand};
use crate::application::suppliers::ProveedorInput;
use crate::application::visits::{CreateVisitCommand, UpdateVisitCommand};
use crate::domain::entities::UserRecord;
use crate::domain::types::{
    ClientType, EventStatus, MovementKind, Role, ServiceType, VisitStatus,
};

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ----- auth -----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserRecord,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: UserRecord,
}

// ----- admin -----

#[derive(Debug, Serialize)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminNotificationsQuery {
    pub limit: Option<i64>,
    pub is_read: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CleanNotificationsRequest {
    pub days_old: Option<i64>,
    pub only_read: Option<bool>,
}

// ----- shared -----

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

// ----- clients & suppliers -----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClienteRequest {
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub tipo_cliente: Option<ClientType>,
    pub empresa: Option<String>,
    pub rut: Option<String>,
    pub notas: Option<String>,
}

impl From<ClienteRequest> for ClienteInput {
    fn from(request: ClienteRequest) -> Self {
        Self {
            nombre: request.nombre,
            email: request.email,
            telefono: request.telefono,
            direccion: request.direccion,
            tipo_cliente: request.tipo_cliente,
            empresa: request.empresa,
            rut: request.rut,
            notas: request.notas,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientSearchQuery {
    pub query: Option<String>,
    pub tipo_cliente: Option<ClientType>,
}

#[derive(Debug, Deserialize)]
pub struct ProveedorRequest {
    #[serde(default)]
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

impl From<ProveedorRequest> for ProveedorInput {
    fn from(request: ProveedorRequest) -> Self {
        Self {
            nombre: request.nombre,
            email: request.email,
            telefono: request.telefono,
            direccion: request.direccion,
            tipo_servicio: request.tipo_servicio,
            contacto: request.contacto,
            rut: request.rut,
            notas: request.notas,
            activo: request.activo,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SupplierSearchQuery {
    pub query: Option<String>,
    pub tipo_servicio: Option<ServiceType>,
    pub activo: Option<bool>,
}

// ----- events & visits -----

#[derive(Debug, Deserialize)]
pub struct EventCreateRequest {
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
    #[serde(default)]
    pub carpa: bool,
    #[serde(default)]
    pub toldo: bool,
    #[serde(default)]
    pub iluminacion: bool,
    #[serde(default)]
    pub calefaccion: bool,
    #[serde(default)]
    pub cubre_piso: bool,
    pub estado: Option<EventStatus>,
    pub comentario: Option<String>,
    pub cliente_id: Option<i64>,
    pub technical_visit_id: Option<i64>,
}

impl From<EventCreateRequest> for CreateEventCommand {
    fn from(request: EventCreateRequest) -> Self {
        Self {
            nombre_cliente: request.nombre_cliente,
            contacto: request.contacto,
            direccion: request.direccion,
            descripcion: request.descripcion,
            metros2: request.metros2,
            monto_total: request.monto_total,
            anticipo: request.anticipo,
            start_date: request.start_date,
            end_date: request.end_date,
            hora_inicio: request.hora_inicio,
            hora_termino: request.hora_termino,
            carpa: request.carpa,
            toldo: request.toldo,
            iluminacion: request.iluminacion,
            calefaccion: request.calefaccion,
            cubre_piso: request.cubre_piso,
            estado: request.estado,
            comentario: request.comentario,
            cliente_id: request.cliente_id,
            technical_visit_id: request.technical_visit_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventUpdateRequest {
    pub nombre_cliente: Option<String>,
    pub contacto: Option<String>,
    pub direccion: Option<String>,
    pub descripcion: Option<String>,
    pub metros2: Option<i32>,
    pub monto_total: Option<i64>,
    pub anticipo: Option<i64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub hora_inicio: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
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

impl From<EventUpdateRequest> for UpdateEventCommand {
    fn from(request: EventUpdateRequest) -> Self {
        Self {
            nombre_cliente: request.nombre_cliente,
            contacto: request.contacto,
            direccion: request.direccion,
            descripcion: request.descripcion,
            metros2: request.metros2,
            monto_total: request.monto_total,
            anticipo: request.anticipo,
            start_date: request.start_date,
            end_date: request.end_date,
            hora_inicio: request.hora_inicio,
            hora_termino: request.hora_termino,
            carpa: request.carpa,
            toldo: request.toldo,
            iluminacion: request.iluminacion,
            calefaccion: request.calefaccion,
            cubre_piso: request.cubre_piso,
            estado: request.estado,
            comentario: request.comentario,
            cliente_id: request.cliente_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VisitCreateRequest {
    pub nombre_cliente: String,
    pub contacto: String,
    pub direccion: String,
    pub descripcion: String,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_visita: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub hora_visita: OffsetDateTime,
    pub estado: Option<VisitStatus>,
    pub assigned_to: Option<Uuid>,
}

impl From<VisitCreateRequest> for CreateVisitCommand {
    fn from(request: VisitCreateRequest) -> Self {
        Self {
            nombre_cliente: request.nombre_cliente,
            contacto: request.contacto,
            direccion: request.direccion,
            descripcion: request.descripcion,
            fecha_visita: request.fecha_visita,
            hora_visita: request.hora_visita,
            estado: request.estado,
            assigned_to: request.assigned_to,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VisitUpdateRequest {
    pub nombre_cliente: Option<String>,
    pub contacto: Option<String>,
    pub direccion: Option<String>,
    pub descripcion: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub fecha_visita: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub hora_visita: Option<OffsetDateTime>,
    pub estado: Option<VisitStatus>,
    pub assigned_to: Option<Uuid>,
}

impl From<VisitUpdateRequest> for UpdateVisitCommand {
    fn from(request: VisitUpdateRequest) -> Self {
        Self {
            nombre_cliente: request.nombre_cliente,
            contacto: request.contacto,
            direccion: request.direccion,
            descripcion: request.descripcion,
            fecha_visita: request.fecha_visita,
            hora_visita: request.hora_visita,
            estado: request.estado,
            assigned_to: request.assigned_to,
        }
    }
}

// ----- inventory -----

#[derive(Debug, Deserialize)]
pub struct ItemCreateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    pub quantity: i32,
    pub unit: Option<String>,
    pub image_url: Option<String>,
}

impl From<ItemCreateRequest> for CreateItemCommand {
    fn from(request: ItemCreateRequest) -> Self {
        Self {
            name: request.name,
            item_type: request.item_type,
            quantity: request.quantity,
            unit: request.unit,
            image_url: request.image_url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemUpdateRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub image_url: Option<String>,
}

impl From<ItemUpdateRequest> for UpdateItemCommand {
    fn from(request: ItemUpdateRequest) -> Self {
        Self {
            name: request.name,
            item_type: request.item_type,
            quantity: request.quantity,
            unit: request.unit,
            image_url: request.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub quantity: i32,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub reason: Option<String>,
}

impl From<AdjustStockRequest> for AdjustStockCommand {
    fn from(request: AdjustStockRequest) -> Self {
        Self {
            kind: request.kind,
            quantity: request.quantity,
            reason: request.reason,
        }
    }
}

// ----- notifications -----

#[derive(Debug, Deserialize)]
pub struct NotificationCreateRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

// ----- sketches -----

#[derive(Debug, Deserialize)]
pub struct SketchCreateRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub data: JsonValue,
    pub event_id: Option<i64>,
}

impl From<SketchCreateRequest> for CreateSketchCommand {
    fn from(request: SketchCreateRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            data: sketch_data(request.data),
            event_id: request.event_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SketchUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub data: Option<JsonValue>,
    #[serde(deserialize_with = "double_option")]
    pub event_id: Option<Option<i64>>,
}

impl From<SketchUpdateRequest> for UpdateSketchCommand {
    fn from(request: SketchUpdateRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            data: request.data.map(sketch_data),
            event_id: request.event_id,
        }
    }
}

/// Canvas data arrives either as a serialized string or as the raw JSON document.
fn sketch_data(value: JsonValue) -> String {
    match value {
        JsonValue::String(raw) => raw,
        other => other.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssignSketchRequest {
    pub event_id: Option<i64>,
}

// ----- push -----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: PushKeys,
    pub old_endpoint: Option<String>,
}

impl From<SubscribeRequest> for SubscribeCommand {
    fn from(request: SubscribeRequest) -> Self {
        Self {
            endpoint: request.endpoint,
            p256dh: request.keys.p256dh,
            auth: request.keys.auth,
            old_endpoint: request.old_endpoint,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
pub struct HasSubscriptionResponse {
    pub has_subscription: bool,
}

#[derive(Debug, Serialize)]
pub struct PublicKeyResponse {
    pub enabled: bool,
    pub public_key: Option<String>,
}

// ----- profile -----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub preferences: Option<JsonValue>,
}

impl From<ProfileUpdateRequest> for UpdateProfileCommand {
    fn from(request: ProfileUpdateRequest) -> Self {
        Self {
            name: request.name,
            phone: request.phone,
            address: request.address,
            bio: request.bio,
            timezone: request.timezone,
            language: request.language,
            preferences: request.preferences,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AvatarRequest {
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sketch_update_distinguishes_null_from_absent() {
        let detach: SketchUpdateRequest =
            serde_json::from_str(r#"{"event_id": null}"#).expect("parse");
        assert_eq!(detach.event_id, Some(None));

        let untouched: SketchUpdateRequest =
            serde_json::from_str(r#"{"name": "Planta"}"#).expect("parse");
        assert_eq!(untouched.event_id, None);

        let attach: SketchUpdateRequest =
            serde_json::from_str(r#"{"event_id": 4}"#).expect("parse");
        assert_eq!(attach.event_id, Some(Some(4)));
    }

    #[test]
    fn sketch_data_accepts_raw_documents() {
        let request: SketchCreateRequest =
            serde_json::from_str(r#"{"name": "Planta", "data": {"shapes": []}}"#).expect("parse");
        let command = CreateSketchCommand::from(request);
        assert_eq!(command.data, r#"{"shapes":[]}"#);
    }

    #[test]
    fn stock_adjustment_reads_the_movement_type() {
        let request: AdjustStockRequest =
            serde_json::from_str(r#"{"quantity": 5, "type": "OUT"}"#).expect("parse");
        assert_eq!(request.kind, MovementKind::Out);
        assert_eq!(request.reason, None);
    }

    #[test]
    fn subscription_keys_are_nested() {
        let request: SubscribeRequest = serde_json::from_str(
            r#"{"endpoint": "https://push.example/1", "keys": {"p256dh": "p", "auth": "a"}}"#,
        )
        .expect("parse");
        let command = SubscribeCommand::from(request);
        assert_eq!(command.p256dh, "p");
        assert_eq!(command.old_endpoint, None);
    }
}
