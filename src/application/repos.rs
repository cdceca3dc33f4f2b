//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    ClienteRecord, EventRecord, ItemRecord, NotificationRecord, ProveedorRecord,
    PushSubscriptionRecord, ReservationRecord, SessionRecord, SketchRecord, StockMovementRecord,
    TechnicalVisitRecord, UserRecord, UserSummary,
};
use crate::domain::stock::StockError;
use crate::domain::types::{
    ClientType, EventStatus, MovementKind, Role, ServiceType, VisitStatus,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

// ----- users & sessions -----

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserWithCounts {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub event_count: i64,
    pub notification_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RoleCount {
    pub role: Role,
    pub count: i64,
}

#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub user_id: Uuid,
    pub prefix: String,
    pub hashed_secret: Vec<u8>,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn list_users_with_counts(&self) -> Result<Vec<UserWithCounts>, RepoError>;

    /// Users ordered by name, for assignment pickers.
    async fn list_user_summaries(&self) -> Result<Vec<UserSummary>, RepoError>;

    async fn list_user_ids(&self) -> Result<Vec<Uuid>, RepoError>;

    async fn count_users_by_role(&self) -> Result<Vec<RoleCount>, RepoError>;

    async fn update_role(&self, id: Uuid, role: Role) -> Result<UserRecord, RepoError>;

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn create_session(&self, params: CreateSessionParams)
    -> Result<SessionRecord, RepoError>;

    async fn find_session_by_prefix(&self, prefix: &str)
    -> Result<Option<SessionRecord>, RepoError>;

    async fn touch_session(&self, id: Uuid, at: OffsetDateTime) -> Result<(), RepoError>;

    async fn delete_session(&self, prefix: &str) -> Result<bool, RepoError>;

    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError>;
}

// ----- profile -----

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileParams {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub preferences: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ProfileCounts {
    pub events: i64,
    pub notifications: i64,
    pub sketches: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ProfileStats {
    pub total_events: i64,
    pub completed_events: i64,
    pub pending_events: i64,
    pub total_sketches: i64,
    pub unread_notifications: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventActivity {
    pub id: i64,
    pub nombre_cliente: String,
    pub estado: EventStatus,
    pub monto_total: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SketchActivity {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn profile_counts(&self, user_id: Uuid) -> Result<ProfileCounts, RepoError>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        params: UpdateProfileParams,
    ) -> Result<UserRecord, RepoError>;

    async fn update_avatar(
        &self,
        user_id: Uuid,
        avatar_url: Option<String>,
    ) -> Result<UserRecord, RepoError>;

    async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: JsonValue,
    ) -> Result<UserRecord, RepoError>;

    async fn profile_stats(&self, user_id: Uuid) -> Result<ProfileStats, RepoError>;

    async fn recent_events_by(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<EventActivity>, RepoError>;

    async fn recent_sketches_by(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SketchActivity>, RepoError>;
}

// ----- clients -----

#[derive(Debug, Clone)]
pub struct ClienteParams {
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub tipo_cliente: ClientType,
    pub empresa: Option<String>,
    pub rut: Option<String>,
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClienteWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub cliente: ClienteRecord,
    pub event_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ClienteSearch {
    pub query: String,
    pub tipo_cliente: Option<ClientType>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClientTypeCount {
    pub tipo_cliente: ClientType,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientStats {
    pub total: i64,
    pub por_tipo: Vec<ClientTypeCount>,
    pub con_eventos: i64,
    pub eventos_totales: i64,
}

#[async_trait]
pub trait ClientsRepo: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<ClienteWithCount>, RepoError>;

    async fn find_client(&self, id: i64) -> Result<Option<ClienteRecord>, RepoError>;

    async fn list_client_events(&self, id: i64) -> Result<Vec<EventRecord>, RepoError>;

    async fn create_client(
        &self,
        params: ClienteParams,
        created_by: Uuid,
    ) -> Result<ClienteRecord, RepoError>;

    async fn update_client(&self, id: i64, params: ClienteParams)
    -> Result<ClienteRecord, RepoError>;

    async fn delete_client(&self, id: i64) -> Result<bool, RepoError>;

    async fn count_client_events(&self, id: i64) -> Result<u64, RepoError>;

    async fn search_clients(&self, search: &ClienteSearch)
    -> Result<Vec<ClienteWithCount>, RepoError>;

    async fn client_stats(&self) -> Result<ClientStats, RepoError>;

    async fn most_active_clients(&self, limit: i64) -> Result<Vec<ClienteWithCount>, RepoError>;
}

// ----- suppliers -----

#[derive(Debug, Clone)]
pub struct ProveedorParams {
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub tipo_servicio: ServiceType,
    pub contacto: Option<String>,
    pub rut: Option<String>,
    pub notas: Option<String>,
    pub activo: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProveedorSearch {
    pub query: String,
    pub tipo_servicio: Option<ServiceType>,
    pub activo: Option<bool>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ServiceTypeCount {
    pub tipo_servicio: ServiceType,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierStats {
    pub total: i64,
    pub por_tipo: Vec<ServiceTypeCount>,
    pub activos: i64,
    pub inactivos: i64,
}

#[async_trait]
pub trait SuppliersRepo: Send + Sync {
    async fn list_suppliers(&self) -> Result<Vec<ProveedorRecord>, RepoError>;

    async fn find_supplier(&self, id: i64) -> Result<Option<ProveedorRecord>, RepoError>;

    async fn create_supplier(
        &self,
        params: ProveedorParams,
        created_by: Uuid,
    ) -> Result<ProveedorRecord, RepoError>;

    async fn update_supplier(
        &self,
        id: i64,
        params: ProveedorParams,
    ) -> Result<ProveedorRecord, RepoError>;

    async fn delete_supplier(&self, id: i64) -> Result<bool, RepoError>;

    async fn search_suppliers(
        &self,
        search: &ProveedorSearch,
    ) -> Result<Vec<ProveedorRecord>, RepoError>;

    async fn supplier_stats(&self) -> Result<SupplierStats, RepoError>;

    async fn list_active_by_service(
        &self,
        tipo: ServiceType,
    ) -> Result<Vec<ProveedorRecord>, RepoError>;

    /// Flip `activo`; `None` when the supplier does not exist.
    async fn toggle_supplier(&self, id: i64) -> Result<Option<ProveedorRecord>, RepoError>;
}

// ----- events & visits -----

#[derive(Debug, Clone, PartialEq)]
pub struct EventFields {
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
    pub estado: EventStatus,
    pub comentario: Option<String>,
    pub cliente_id: Option<i64>,
    pub technical_visit_id: Option<i64>,
}

impl From<&EventRecord> for EventFields {
    fn from(record: &EventRecord) -> Self {
        Self {
            nombre_cliente: record.nombre_cliente.clone(),
            contacto: record.contacto.clone(),
            direccion: record.direccion.clone(),
            descripcion: record.descripcion.clone(),
            metros2: record.metros2,
            monto_total: record.monto_total,
            anticipo: record.anticipo,
            start_date: record.start_date,
            end_date: record.end_date,
            hora_inicio: record.hora_inicio,
            hora_termino: record.hora_termino,
            carpa: record.carpa,
            toldo: record.toldo,
            iluminacion: record.iluminacion,
            calefaccion: record.calefaccion,
            cubre_piso: record.cubre_piso,
            estado: record.estado,
            comentario: record.comentario.clone(),
            cliente_id: record.cliente_id,
            technical_visit_id: record.technical_visit_id,
        }
    }
}

#[async_trait]
pub trait EventsRepo: Send + Sync {
    async fn list_events(&self) -> Result<Vec<EventRecord>, RepoError>;

    async fn find_event(&self, id: i64) -> Result<Option<EventRecord>, RepoError>;

    async fn list_events_by_status(&self, estado: EventStatus)
    -> Result<Vec<EventRecord>, RepoError>;

    async fn create_event(
        &self,
        fields: EventFields,
        created_by: Uuid,
    ) -> Result<EventRecord, RepoError>;

    async fn update_event(&self, id: i64, fields: EventFields) -> Result<EventRecord, RepoError>;

    async fn delete_event(&self, id: i64) -> Result<bool, RepoError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitFields {
    pub nombre_cliente: String,
    pub contacto: String,
    pub direccion: String,
    pub descripcion: String,
    pub fecha_visita: OffsetDateTime,
    pub hora_visita: OffsetDateTime,
    pub estado: VisitStatus,
    pub assigned_to: Option<Uuid>,
}

impl From<&TechnicalVisitRecord> for VisitFields {
    fn from(record: &TechnicalVisitRecord) -> Self {
        Self {
            nombre_cliente: record.nombre_cliente.clone(),
            contacto: record.contacto.clone(),
            direccion: record.direccion.clone(),
            descripcion: record.descripcion.clone(),
            fecha_visita: record.fecha_visita,
            hora_visita: record.hora_visita,
            estado: record.estado,
            assigned_to: record.assigned_to,
        }
    }
}

#[async_trait]
pub trait VisitsRepo: Send + Sync {
    async fn list_visits(&self) -> Result<Vec<TechnicalVisitRecord>, RepoError>;

    async fn find_visit(&self, id: i64) -> Result<Option<TechnicalVisitRecord>, RepoError>;

    /// Visits with the given status ordered by visit date.
    async fn list_visits_by_status(
        &self,
        estado: VisitStatus,
        newest_first: bool,
    ) -> Result<Vec<TechnicalVisitRecord>, RepoError>;

    async fn create_visit(&self, fields: VisitFields)
    -> Result<TechnicalVisitRecord, RepoError>;

    async fn update_visit(
        &self,
        id: i64,
        fields: VisitFields,
    ) -> Result<TechnicalVisitRecord, RepoError>;

    async fn delete_visit(&self, id: i64) -> Result<bool, RepoError>;
}

// ----- inventory -----

#[derive(Debug, Clone)]
pub struct ItemFields {
    pub name: String,
    pub item_type: String,
    pub quantity: i32,
    pub unit: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ItemWithCounts {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub item: ItemRecord,
    pub movement_count: i64,
    pub reservation_count: i64,
}

#[derive(Debug, Clone)]
pub struct StockAdjustmentParams {
    pub item_id: i64,
    pub kind: MovementKind,
    pub quantity: i32,
    pub reason: Option<String>,
}

/// Result of a locked read-modify-write on an item's quantity.
#[derive(Debug, Clone)]
pub enum StockAdjustmentOutcome {
    Applied {
        item: ItemRecord,
        movement: StockMovementRecord,
    },
    Rejected(StockError),
    ItemMissing,
}

#[async_trait]
pub trait InventoryRepo: Send + Sync {
    async fn list_items(&self) -> Result<Vec<ItemWithCounts>, RepoError>;

    async fn find_item(&self, id: i64) -> Result<Option<ItemRecord>, RepoError>;

    async fn recent_movements(
        &self,
        item_id: i64,
        limit: i64,
    ) -> Result<Vec<StockMovementRecord>, RepoError>;

    async fn active_reservations(&self, item_id: i64)
    -> Result<Vec<ReservationRecord>, RepoError>;

    async fn create_item(&self, fields: ItemFields) -> Result<ItemRecord, RepoError>;

    async fn update_item(&self, id: i64, fields: ItemFields) -> Result<ItemRecord, RepoError>;

    async fn delete_item(&self, id: i64) -> Result<bool, RepoError>;

    async fn list_item_types(&self) -> Result<Vec<String>, RepoError>;

    /// Apply a stock movement atomically: the item row is locked, the new quantity is
    /// computed, and the quantity update plus movement row commit together.
    async fn adjust_stock(
        &self,
        params: StockAdjustmentParams,
    ) -> Result<StockAdjustmentOutcome, RepoError>;
}

// ----- sketches -----

#[derive(Debug, Clone)]
pub struct SketchFields {
    pub name: String,
    pub description: Option<String>,
    pub data: String,
    pub event_id: Option<i64>,
}

#[async_trait]
pub trait SketchesRepo: Send + Sync {
    async fn list_sketches(&self) -> Result<Vec<SketchRecord>, RepoError>;

    async fn find_sketch(&self, id: i64) -> Result<Option<SketchRecord>, RepoError>;

    async fn list_sketches_for_event(&self, event_id: i64)
    -> Result<Vec<SketchRecord>, RepoError>;

    async fn list_unassigned_sketches(&self) -> Result<Vec<SketchRecord>, RepoError>;

    async fn create_sketch(
        &self,
        fields: SketchFields,
        created_by: Uuid,
    ) -> Result<SketchRecord, RepoError>;

    async fn update_sketch(&self, id: i64, fields: SketchFields)
    -> Result<SketchRecord, RepoError>;

    async fn delete_sketch(&self, id: i64) -> Result<bool, RepoError>;

    async fn assign_sketch(
        &self,
        id: i64,
        event_id: Option<i64>,
    ) -> Result<SketchRecord, RepoError>;
}

// ----- notifications & push -----

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub action_by: Option<Uuid>,
    pub action_by_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminNotificationRecord {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub notification: NotificationRecord,
    pub user_name: Option<String>,
    pub user_email: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TitleCount {
    pub title: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationStats {
    pub total: i64,
    pub unread: i64,
    pub read: i64,
    pub by_type: Vec<TitleCount>,
}

#[async_trait]
pub trait NotificationsRepo: Send + Sync {
    /// Insert all rows in one statement, every row unread.
    async fn insert_notifications(
        &self,
        rows: Vec<NewNotification>,
    ) -> Result<Vec<NotificationRecord>, RepoError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationRecord>, RepoError>;

    async fn list_unread_for_user(&self, user_id: Uuid)
    -> Result<Vec<NotificationRecord>, RepoError>;

    async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<NotificationRecord>, RepoError>;

    async fn count_unread(&self, user_id: Uuid) -> Result<i64, RepoError>;

    async fn mark_read(
        &self,
        id: i64,
        user_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Option<NotificationRecord>, RepoError>;

    async fn mark_all_read(&self, user_id: Uuid, at: OffsetDateTime) -> Result<u64, RepoError>;

    async fn delete_for_user(&self, id: i64, user_id: Uuid) -> Result<bool, RepoError>;

    async fn delete_read_for_user(&self, user_id: Uuid) -> Result<u64, RepoError>;

    async fn list_all(
        &self,
        limit: i64,
        is_read: Option<bool>,
    ) -> Result<Vec<AdminNotificationRecord>, RepoError>;

    async fn notification_stats(&self) -> Result<NotificationStats, RepoError>;

    async fn delete_older_than(
        &self,
        cutoff: OffsetDateTime,
        only_read: bool,
    ) -> Result<u64, RepoError>;

    async fn delete_all_read(&self) -> Result<u64, RepoError>;

    async fn delete_notification(&self, id: i64) -> Result<bool, RepoError>;

    async fn mark_everything_read(&self, at: OffsetDateTime) -> Result<u64, RepoError>;
}

#[derive(Debug, Clone)]
pub struct UpsertSubscriptionParams {
    pub user_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

#[async_trait]
pub trait PushSubscriptionsRepo: Send + Sync {
    /// Insert or re-point the subscription with this endpoint to `user_id`.
    async fn upsert_subscription(
        &self,
        params: UpsertSubscriptionParams,
    ) -> Result<PushSubscriptionRecord, RepoError>;

    async fn delete_subscription(&self, endpoint: &str) -> Result<bool, RepoError>;

    async fn latest_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PushSubscriptionRecord>, RepoError>;

    async fn list_subscriptions_for(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PushSubscriptionRecord>, RepoError>;
}

// ----- dashboard -----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
    pub active_events: i64,
    pub total_items: i64,
    pub low_stock_items: i64,
    pub monthly_revenue: i64,
    pub scheduled_visits: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VisitActivity {
    pub id: i64,
    pub nombre_cliente: String,
    pub estado: VisitStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_visita: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: EventStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MonthRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: i64,
}

#[async_trait]
pub trait DashboardRepo: Send + Sync {
    async fn dashboard_stats(&self, now: OffsetDateTime) -> Result<DashboardStats, RepoError>;

    async fn recent_events(&self, limit: i64) -> Result<Vec<EventActivity>, RepoError>;

    async fn recent_visits(&self, limit: i64) -> Result<Vec<VisitActivity>, RepoError>;

    /// Non-cancelled events overlapping `[from, to]`.
    async fn events_in_window(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<EventRecord>, RepoError>;

    /// Non-cancelled visits dated within `[from, to]`.
    async fn visits_in_window(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<TechnicalVisitRecord>, RepoError>;

    async fn events_by_status(&self) -> Result<Vec<StatusCount>, RepoError>;

    async fn revenue_by_month(&self, since: OffsetDateTime)
    -> Result<Vec<MonthRevenue>, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
