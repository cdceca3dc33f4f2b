//! In-memory repositories and push doubles shared by service tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use time::macros::datetime;
use uuid::Uuid;

use crate::application::auth::Principal;
use crate::application::context::ServiceContext;
use crate::application::dashboard::month_key;
use crate::application::push::{PushError, PushGateway, PushPayload};
use crate::application::repos::*;
use crate::domain::entities::{
    ClienteRecord, EventRecord, ItemRecord, NotificationRecord, ProveedorRecord,
    PushSubscriptionRecord, ReservationRecord, SessionRecord, SketchRecord, StockMovementRecord,
    TechnicalVisitRecord, UserRecord, UserSummary,
};
use crate::domain::stock::next_quantity;
use crate::domain::types::{EventStatus, ReservationStatus, Role, VisitStatus};

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<UserRecord>,
    sessions: Vec<SessionRecord>,
    clients: Vec<ClienteRecord>,
    suppliers: Vec<ProveedorRecord>,
    events: Vec<EventRecord>,
    visits: Vec<TechnicalVisitRecord>,
    items: Vec<ItemRecord>,
    movements: Vec<StockMovementRecord>,
    reservations: Vec<ReservationRecord>,
    sketches: Vec<SketchRecord>,
    notifications: Vec<NotificationRecord>,
    subscriptions: Vec<PushSubscriptionRecord>,
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_name(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.users.iter().find(|u| u.id == id))
            .and_then(|u| u.name.clone())
    }

    fn event_count_for_client(&self, id: i64) -> i64 {
        self.events
            .iter()
            .filter(|e| e.cliente_id == Some(id))
            .count() as i64
    }

    fn with_count(&self, cliente: &ClienteRecord) -> ClienteWithCount {
        ClienteWithCount {
            cliente: cliente.clone(),
            event_count: self.event_count_for_client(cliente.id),
        }
    }
}

/// A single in-memory backend implementing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store lock")
    }

    pub fn add_user(&self, email: &str, role: Role) -> Uuid {
        let now = OffsetDateTime::now_utc();
        let id = Uuid::new_v4();
        self.state().users.push(UserRecord {
            id,
            name: Some(email.split('@').next().unwrap_or(email).to_string()),
            email: email.to_string(),
            password_hash: None,
            role,
            image: None,
            avatar_url: None,
            phone: None,
            address: None,
            bio: None,
            preferences: None,
            timezone: None,
            language: None,
            email_verified: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_subscription(&self, user_id: Uuid, endpoint: &str) {
        let now = OffsetDateTime::now_utc();
        let mut state = self.state();
        let id = state.id();
        state.subscriptions.push(PushSubscriptionRecord {
            id,
            user_id,
            endpoint: endpoint.to_string(),
            p256dh: "p256dh".into(),
            auth: "auth".into(),
            created_at: now,
            updated_at: now,
        });
    }

    pub fn user_count(&self) -> usize {
        self.state().users.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.state().subscriptions.len()
    }

    pub fn notification_count(&self) -> usize {
        self.state().notifications.len()
    }

    /// Stored notification titles in insertion order.
    pub fn notification_titles(&self) -> Vec<String> {
        self.state()
            .notifications
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }
}

pub fn principal(role: Role, name: Option<&str>) -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        name: name.map(str::to_string),
        email: "actor@carpas.cl".into(),
        role,
        session_prefix: "testprefix00".into(),
    }
}

pub fn principal_for(user_id: Uuid, role: Role) -> Principal {
    Principal {
        user_id,
        ..principal(role, None)
    }
}

pub fn services(store: &Arc<MemoryStore>) -> ServiceContext {
    ServiceContext::assemble(
        store.clone(),
        Arc::new(ScriptedGateway::default()),
        Duration::from_secs(3600),
    )
}

pub fn sample_event_fields(nombre_cliente: &str) -> EventFields {
    EventFields {
        nombre_cliente: nombre_cliente.to_string(),
        contacto: "+56 9 8765 4321".into(),
        direccion: "Av. Apoquindo 4500".into(),
        descripcion: "Cóctel corporativo".into(),
        metros2: 80,
        monto_total: 1_200_000,
        anticipo: 300_000,
        start_date: datetime!(2025-04-10 18:00 UTC),
        end_date: datetime!(2025-04-10 23:30 UTC),
        hora_inicio: datetime!(2025-04-10 18:00 UTC),
        hora_termino: datetime!(2025-04-10 23:30 UTC),
        carpa: true,
        toldo: false,
        iluminacion: true,
        calefaccion: false,
        cubre_piso: false,
        estado: EventStatus::Pendiente,
        comentario: None,
        cliente_id: None,
        technical_visit_id: None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum GatewayMode {
    #[default]
    Accept,
    Fail,
    Disabled,
}

/// Push gateway double with scripted per-endpoint outcomes.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGateway {
    mode: GatewayMode,
    gone: HashSet<String>,
}

impl ScriptedGateway {
    pub fn failing() -> Self {
        Self {
            mode: GatewayMode::Fail,
            ..Self::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            mode: GatewayMode::Disabled,
            ..Self::default()
        }
    }

    pub fn gone_for(endpoints: &[&str]) -> Self {
        Self {
            gone: endpoints.iter().map(|e| e.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PushGateway for ScriptedGateway {
    async fn send(
        &self,
        subscription: &PushSubscriptionRecord,
        _payload: &PushPayload,
    ) -> Result<(), PushError> {
        if self.gone.contains(&subscription.endpoint) {
            return Err(PushError::Gone);
        }
        match self.mode {
            GatewayMode::Accept => Ok(()),
            GatewayMode::Fail => Err(PushError::Rejected { status: 500 }),
            GatewayMode::Disabled => Err(PushError::Transport("disabled".into())),
        }
    }

    fn enabled(&self) -> bool {
        self.mode != GatewayMode::Disabled
    }

    fn public_key(&self) -> Option<&str> {
        Some("BTestPublicKey")
    }
}

fn event_activity(event: &EventRecord) -> EventActivity {
    EventActivity {
        id: event.id,
        nombre_cliente: event.nombre_cliente.clone(),
        estado: event.estado,
        monto_total: event.monto_total,
        start_date: event.start_date,
        created_at: event.created_at,
    }
}

fn newest_first<T, F: Fn(&T) -> i64>(rows: &mut [T], key: F) {
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
}

fn matches_query(query: &str, fields: &[Option<&str>]) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&needle))
}

#[async_trait]
impl UsersRepo for MemoryStore {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut state = self.state();
        if state.users.iter().any(|u| u.email == params.email) {
            return Err(RepoError::Duplicate {
                constraint: "users_email_key".into(),
            });
        }
        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: Some(params.name),
            email: params.email,
            password_hash: Some(params.password_hash),
            role: params.role,
            image: None,
            avatar_url: None,
            phone: None,
            address: None,
            bio: None,
            preferences: None,
            timezone: None,
            language: None,
            email_verified: None,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.state().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users_with_counts(&self) -> Result<Vec<UserWithCounts>, RepoError> {
        let state = self.state();
        let mut rows: Vec<UserWithCounts> = state
            .users
            .iter()
            .map(|u| UserWithCounts {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                role: u.role,
                image: u.image.clone(),
                created_at: u.created_at,
                event_count: state
                    .events
                    .iter()
                    .filter(|e| e.created_by == Some(u.id))
                    .count() as i64,
                notification_count: state
                    .notifications
                    .iter()
                    .filter(|n| n.user_id == u.id)
                    .count() as i64,
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_user_summaries(&self) -> Result<Vec<UserSummary>, RepoError> {
        let mut rows: Vec<UserSummary> = self
            .state()
            .users
            .iter()
            .map(|u| UserSummary {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_user_ids(&self) -> Result<Vec<Uuid>, RepoError> {
        Ok(self.state().users.iter().map(|u| u.id).collect())
    }

    async fn count_users_by_role(&self) -> Result<Vec<RoleCount>, RepoError> {
        let state = self.state();
        Ok(Role::ALL
            .into_iter()
            .map(|role| RoleCount {
                role,
                count: state.users.iter().filter(|u| u.role == role).count() as i64,
            })
            .filter(|row| row.count > 0)
            .collect())
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<UserRecord, RepoError> {
        let mut state = self.state();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepoError::NotFound)?;
        user.role = role;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        state.sessions.retain(|s| s.user_id != id);
        state.notifications.retain(|n| n.user_id != id);
        state.subscriptions.retain(|s| s.user_id != id);
        Ok(state.users.len() < before)
    }
}

#[async_trait]
impl SessionsRepo for MemoryStore {
    async fn create_session(
        &self,
        params: CreateSessionParams,
    ) -> Result<SessionRecord, RepoError> {
        let session = SessionRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            prefix: params.prefix,
            hashed_secret: params.hashed_secret,
            expires_at: params.expires_at,
            last_used_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.state().sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<SessionRecord>, RepoError> {
        Ok(self
            .state()
            .sessions
            .iter()
            .find(|s| s.prefix == prefix)
            .cloned())
    }

    async fn touch_session(&self, id: Uuid, at: OffsetDateTime) -> Result<(), RepoError> {
        if let Some(session) = self.state().sessions.iter_mut().find(|s| s.id == id) {
            session.last_used_at = Some(at);
        }
        Ok(())
    }

    async fn delete_session(&self, prefix: &str) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.prefix != prefix);
        Ok(state.sessions.len() < before)
    }

    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError> {
        let mut state = self.state();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl ProfileRepo for MemoryStore {
    async fn profile_counts(&self, user_id: Uuid) -> Result<ProfileCounts, RepoError> {
        let state = self.state();
        Ok(ProfileCounts {
            events: state
                .events
                .iter()
                .filter(|e| e.created_by == Some(user_id))
                .count() as i64,
            notifications: state
                .notifications
                .iter()
                .filter(|n| n.user_id == user_id)
                .count() as i64,
            sketches: state
                .sketches
                .iter()
                .filter(|s| s.created_by == Some(user_id))
                .count() as i64,
        })
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        params: UpdateProfileParams,
    ) -> Result<UserRecord, RepoError> {
        let mut state = self.state();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(RepoError::NotFound)?;
        if let Some(name) = params.name {
            user.name = Some(name);
        }
        if let Some(phone) = params.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = params.address {
            user.address = Some(address);
        }
        if let Some(bio) = params.bio {
            user.bio = Some(bio);
        }
        if let Some(timezone) = params.timezone {
            user.timezone = Some(timezone);
        }
        if let Some(language) = params.language {
            user.language = Some(language);
        }
        if let Some(preferences) = params.preferences {
            user.preferences = Some(preferences);
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn update_avatar(
        &self,
        user_id: Uuid,
        avatar_url: Option<String>,
    ) -> Result<UserRecord, RepoError> {
        let mut state = self.state();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(RepoError::NotFound)?;
        user.avatar_url = avatar_url;
        Ok(user.clone())
    }

    async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: JsonValue,
    ) -> Result<UserRecord, RepoError> {
        let mut state = self.state();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(RepoError::NotFound)?;
        user.preferences = Some(preferences);
        Ok(user.clone())
    }

    async fn profile_stats(&self, user_id: Uuid) -> Result<ProfileStats, RepoError> {
        let state = self.state();
        let mine = || {
            state
                .events
                .iter()
                .filter(move |e| e.created_by == Some(user_id))
        };
        Ok(ProfileStats {
            total_events: mine().count() as i64,
            completed_events: mine()
                .filter(|e| e.estado == EventStatus::Completado)
                .count() as i64,
            pending_events: mine()
                .filter(|e| e.estado == EventStatus::Pendiente)
                .count() as i64,
            total_sketches: state
                .sketches
                .iter()
                .filter(|s| s.created_by == Some(user_id))
                .count() as i64,
            unread_notifications: state
                .notifications
                .iter()
                .filter(|n| n.user_id == user_id && !n.is_read)
                .count() as i64,
        })
    }

    async fn recent_events_by(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<EventActivity>, RepoError> {
        let state = self.state();
        let mut rows: Vec<EventActivity> = state
            .events
            .iter()
            .filter(|e| e.created_by == Some(user_id))
            .map(event_activity)
            .collect();
        newest_first(&mut rows, |row| row.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn recent_sketches_by(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SketchActivity>, RepoError> {
        let state = self.state();
        let mut rows: Vec<SketchActivity> = state
            .sketches
            .iter()
            .filter(|s| s.created_by == Some(user_id))
            .map(|s| SketchActivity {
                id: s.id,
                name: s.name.clone(),
                created_at: s.created_at,
            })
            .collect();
        newest_first(&mut rows, |row| row.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl ClientsRepo for MemoryStore {
    async fn list_clients(&self) -> Result<Vec<ClienteWithCount>, RepoError> {
        let state = self.state();
        let mut rows: Vec<ClienteWithCount> =
            state.clients.iter().map(|c| state.with_count(c)).collect();
        newest_first(&mut rows, |row| row.cliente.id);
        Ok(rows)
    }

    async fn find_client(&self, id: i64) -> Result<Option<ClienteRecord>, RepoError> {
        Ok(self.state().clients.iter().find(|c| c.id == id).cloned())
    }

    async fn list_client_events(&self, id: i64) -> Result<Vec<EventRecord>, RepoError> {
        let mut rows: Vec<EventRecord> = self
            .state()
            .events
            .iter()
            .filter(|e| e.cliente_id == Some(id))
            .cloned()
            .collect();
        newest_first(&mut rows, |row| row.id);
        Ok(rows)
    }

    async fn create_client(
        &self,
        params: ClienteParams,
        created_by: Uuid,
    ) -> Result<ClienteRecord, RepoError> {
        let mut state = self.state();
        let now = OffsetDateTime::now_utc();
        let cliente = ClienteRecord {
            id: state.id(),
            nombre: params.nombre,
            email: params.email,
            telefono: params.telefono,
            direccion: params.direccion,
            tipo_cliente: params.tipo_cliente,
            empresa: params.empresa,
            rut: params.rut,
            notas: params.notas,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        state.clients.push(cliente.clone());
        Ok(cliente)
    }

    async fn update_client(
        &self,
        id: i64,
        params: ClienteParams,
    ) -> Result<ClienteRecord, RepoError> {
        let mut state = self.state();
        let cliente = state
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound)?;
        cliente.nombre = params.nombre;
        cliente.email = params.email;
        cliente.telefono = params.telefono;
        cliente.direccion = params.direccion;
        cliente.tipo_cliente = params.tipo_cliente;
        cliente.empresa = params.empresa;
        cliente.rut = params.rut;
        cliente.notas = params.notas;
        cliente.updated_at = OffsetDateTime::now_utc();
        Ok(cliente.clone())
    }

    async fn delete_client(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state();
        if state.event_count_for_client(id) > 0 {
            return Err(RepoError::Integrity {
                message: "events reference this client".into(),
            });
        }
        let before = state.clients.len();
        state.clients.retain(|c| c.id != id);
        Ok(state.clients.len() < before)
    }

    async fn count_client_events(&self, id: i64) -> Result<u64, RepoError> {
        Ok(self.state().event_count_for_client(id) as u64)
    }

    async fn search_clients(
        &self,
        search: &ClienteSearch,
    ) -> Result<Vec<ClienteWithCount>, RepoError> {
        let state = self.state();
        Ok(state
            .clients
            .iter()
            .filter(|c| search.tipo_cliente.is_none_or(|t| t == c.tipo_cliente))
            .filter(|c| {
                matches_query(
                    &search.query,
                    &[
                        Some(c.nombre.as_str()),
                        c.email.as_deref(),
                        c.empresa.as_deref(),
                        c.rut.as_deref(),
                        c.telefono.as_deref(),
                    ],
                )
            })
            .map(|c| state.with_count(c))
            .collect())
    }

    async fn client_stats(&self) -> Result<ClientStats, RepoError> {
        let state = self.state();
        let mut por_tipo: BTreeMap<&'static str, ClientTypeCount> = BTreeMap::new();
        for cliente in &state.clients {
            por_tipo
                .entry(cliente.tipo_cliente.as_str())
                .or_insert(ClientTypeCount {
                    tipo_cliente: cliente.tipo_cliente,
                    count: 0,
                })
                .count += 1;
        }
        Ok(ClientStats {
            total: state.clients.len() as i64,
            por_tipo: por_tipo.into_values().collect(),
            con_eventos: state
                .clients
                .iter()
                .filter(|c| state.event_count_for_client(c.id) > 0)
                .count() as i64,
            eventos_totales: state.events.iter().filter(|e| e.cliente_id.is_some()).count()
                as i64,
        })
    }

    async fn most_active_clients(&self, limit: i64) -> Result<Vec<ClienteWithCount>, RepoError> {
        let state = self.state();
        let mut rows: Vec<ClienteWithCount> =
            state.clients.iter().map(|c| state.with_count(c)).collect();
        newest_first(&mut rows, |row| row.event_count);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

#[async_trait]
impl SuppliersRepo for MemoryStore {
    async fn list_suppliers(&self) -> Result<Vec<ProveedorRecord>, RepoError> {
        let mut rows = self.state().suppliers.clone();
        rows.sort_by(|a, b| a.nombre.cmp(&b.nombre));
        Ok(rows)
    }

    async fn find_supplier(&self, id: i64) -> Result<Option<ProveedorRecord>, RepoError> {
        Ok(self.state().suppliers.iter().find(|s| s.id == id).cloned())
    }

    async fn create_supplier(
        &self,
        params: ProveedorParams,
        created_by: Uuid,
    ) -> Result<ProveedorRecord, RepoError> {
        let mut state = self.state();
        let now = OffsetDateTime::now_utc();
        let proveedor = ProveedorRecord {
            id: state.id(),
            nombre: params.nombre,
            email: params.email,
            telefono: params.telefono,
            direccion: params.direccion,
            tipo_servicio: params.tipo_servicio,
            contacto: params.contacto,
            rut: params.rut,
            notas: params.notas,
            activo: params.activo,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        state.suppliers.push(proveedor.clone());
        Ok(proveedor)
    }

    async fn update_supplier(
        &self,
        id: i64,
        params: ProveedorParams,
    ) -> Result<ProveedorRecord, RepoError> {
        let mut state = self.state();
        let proveedor = state
            .suppliers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepoError::NotFound)?;
        proveedor.nombre = params.nombre;
        proveedor.email = params.email;
        proveedor.telefono = params.telefono;
        proveedor.direccion = params.direccion;
        proveedor.tipo_servicio = params.tipo_servicio;
        proveedor.contacto = params.contacto;
        proveedor.rut = params.rut;
        proveedor.notas = params.notas;
        proveedor.activo = params.activo;
        proveedor.updated_at = OffsetDateTime::now_utc();
        Ok(proveedor.clone())
    }

    async fn delete_supplier(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.suppliers.len();
        state.suppliers.retain(|s| s.id != id);
        Ok(state.suppliers.len() < before)
    }

    async fn search_suppliers(
        &self,
        search: &ProveedorSearch,
    ) -> Result<Vec<ProveedorRecord>, RepoError> {
        Ok(self
            .state()
            .suppliers
            .iter()
            .filter(|s| search.tipo_servicio.is_none_or(|t| t == s.tipo_servicio))
            .filter(|s| search.activo.is_none_or(|a| a == s.activo))
            .filter(|s| {
                matches_query(
                    &search.query,
                    &[
                        Some(s.nombre.as_str()),
                        s.email.as_deref(),
                        s.contacto.as_deref(),
                        s.rut.as_deref(),
                    ],
                )
            })
            .cloned()
            .collect())
    }

    async fn supplier_stats(&self) -> Result<SupplierStats, RepoError> {
        let state = self.state();
        let mut por_tipo: BTreeMap<&'static str, ServiceTypeCount> = BTreeMap::new();
        for proveedor in &state.suppliers {
            por_tipo
                .entry(proveedor.tipo_servicio.as_str())
                .or_insert(ServiceTypeCount {
                    tipo_servicio: proveedor.tipo_servicio,
                    count: 0,
                })
                .count += 1;
        }
        let activos = state.suppliers.iter().filter(|s| s.activo).count() as i64;
        let total = state.suppliers.len() as i64;
        Ok(SupplierStats {
            total,
            por_tipo: por_tipo.into_values().collect(),
            activos,
            inactivos: total - activos,
        })
    }

    async fn list_active_by_service(
        &self,
        tipo: crate::domain::types::ServiceType,
    ) -> Result<Vec<ProveedorRecord>, RepoError> {
        Ok(self
            .state()
            .suppliers
            .iter()
            .filter(|s| s.activo && s.tipo_servicio == tipo)
            .cloned()
            .collect())
    }

    async fn toggle_supplier(&self, id: i64) -> Result<Option<ProveedorRecord>, RepoError> {
        let mut state = self.state();
        Ok(state.suppliers.iter_mut().find(|s| s.id == id).map(|s| {
            s.activo = !s.activo;
            s.clone()
        }))
    }
}

fn apply_event_fields(event: &mut EventRecord, fields: EventFields) {
    event.nombre_cliente = fields.nombre_cliente;
    event.contacto = fields.contacto;
    event.direccion = fields.direccion;
    event.descripcion = fields.descripcion;
    event.metros2 = fields.metros2;
    event.monto_total = fields.monto_total;
    event.anticipo = fields.anticipo;
    event.start_date = fields.start_date;
    event.end_date = fields.end_date;
    event.hora_inicio = fields.hora_inicio;
    event.hora_termino = fields.hora_termino;
    event.carpa = fields.carpa;
    event.toldo = fields.toldo;
    event.iluminacion = fields.iluminacion;
    event.calefaccion = fields.calefaccion;
    event.cubre_piso = fields.cubre_piso;
    event.estado = fields.estado;
    event.comentario = fields.comentario;
    event.cliente_id = fields.cliente_id;
    event.technical_visit_id = fields.technical_visit_id;
}

#[async_trait]
impl EventsRepo for MemoryStore {
    async fn list_events(&self) -> Result<Vec<EventRecord>, RepoError> {
        let mut rows = self.state().events.clone();
        newest_first(&mut rows, |row| row.id);
        Ok(rows)
    }

    async fn find_event(&self, id: i64) -> Result<Option<EventRecord>, RepoError> {
        Ok(self.state().events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events_by_status(
        &self,
        estado: EventStatus,
    ) -> Result<Vec<EventRecord>, RepoError> {
        let mut rows: Vec<EventRecord> = self
            .state()
            .events
            .iter()
            .filter(|e| e.estado == estado)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.start_date);
        Ok(rows)
    }

    async fn create_event(
        &self,
        fields: EventFields,
        created_by: Uuid,
    ) -> Result<EventRecord, RepoError> {
        let mut state = self.state();
        let now = OffsetDateTime::now_utc();
        let id = state.id();
        let mut event = EventRecord {
            id,
            nombre_cliente: String::new(),
            contacto: String::new(),
            direccion: String::new(),
            descripcion: String::new(),
            metros2: 0,
            monto_total: 0,
            anticipo: 0,
            start_date: now,
            end_date: now,
            hora_inicio: now,
            hora_termino: now,
            carpa: false,
            toldo: false,
            iluminacion: false,
            calefaccion: false,
            cubre_piso: false,
            estado: EventStatus::default(),
            comentario: None,
            cliente_id: None,
            technical_visit_id: None,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        apply_event_fields(&mut event, fields);
        state.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: i64, fields: EventFields) -> Result<EventRecord, RepoError> {
        let mut state = self.state();
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RepoError::NotFound)?;
        apply_event_fields(event, fields);
        event.updated_at = OffsetDateTime::now_utc();
        Ok(event.clone())
    }

    async fn delete_event(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        for sketch in state.sketches.iter_mut().filter(|s| s.event_id == Some(id)) {
            sketch.event_id = None;
        }
        Ok(state.events.len() < before)
    }
}

#[async_trait]
impl VisitsRepo for MemoryStore {
    async fn list_visits(&self) -> Result<Vec<TechnicalVisitRecord>, RepoError> {
        let mut rows = self.state().visits.clone();
        newest_first(&mut rows, |row| row.id);
        Ok(rows)
    }

    async fn find_visit(&self, id: i64) -> Result<Option<TechnicalVisitRecord>, RepoError> {
        Ok(self.state().visits.iter().find(|v| v.id == id).cloned())
    }

    async fn list_visits_by_status(
        &self,
        estado: VisitStatus,
        newest_first: bool,
    ) -> Result<Vec<TechnicalVisitRecord>, RepoError> {
        let mut rows: Vec<TechnicalVisitRecord> = self
            .state()
            .visits
            .iter()
            .filter(|v| v.estado == estado)
            .cloned()
            .collect();
        rows.sort_by_key(|v| v.fecha_visita);
        if newest_first {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn create_visit(&self, fields: VisitFields) -> Result<TechnicalVisitRecord, RepoError> {
        let mut state = self.state();
        let now = OffsetDateTime::now_utc();
        let visit = TechnicalVisitRecord {
            id: state.id(),
            assigned_name: state.user_name(fields.assigned_to),
            nombre_cliente: fields.nombre_cliente,
            contacto: fields.contacto,
            direccion: fields.direccion,
            descripcion: fields.descripcion,
            fecha_visita: fields.fecha_visita,
            hora_visita: fields.hora_visita,
            estado: fields.estado,
            assigned_to: fields.assigned_to,
            created_at: now,
            updated_at: now,
        };
        state.visits.push(visit.clone());
        Ok(visit)
    }

    async fn update_visit(
        &self,
        id: i64,
        fields: VisitFields,
    ) -> Result<TechnicalVisitRecord, RepoError> {
        let mut state = self.state();
        let assigned_name = state.user_name(fields.assigned_to);
        let visit = state
            .visits
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(RepoError::NotFound)?;
        visit.nombre_cliente = fields.nombre_cliente;
        visit.contacto = fields.contacto;
        visit.direccion = fields.direccion;
        visit.descripcion = fields.descripcion;
        visit.fecha_visita = fields.fecha_visita;
        visit.hora_visita = fields.hora_visita;
        visit.estado = fields.estado;
        visit.assigned_to = fields.assigned_to;
        visit.assigned_name = assigned_name;
        visit.updated_at = OffsetDateTime::now_utc();
        Ok(visit.clone())
    }

    async fn delete_visit(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.visits.len();
        state.visits.retain(|v| v.id != id);
        Ok(state.visits.len() < before)
    }
}

#[async_trait]
impl InventoryRepo for MemoryStore {
    async fn list_items(&self) -> Result<Vec<ItemWithCounts>, RepoError> {
        let state = self.state();
        let mut rows: Vec<ItemWithCounts> = state
            .items
            .iter()
            .map(|item| ItemWithCounts {
                item: item.clone(),
                movement_count: state
                    .movements
                    .iter()
                    .filter(|m| m.item_id == item.id)
                    .count() as i64,
                reservation_count: state
                    .reservations
                    .iter()
                    .filter(|r| r.item_id == item.id)
                    .count() as i64,
            })
            .collect();
        newest_first(&mut rows, |row| row.item.id);
        Ok(rows)
    }

    async fn find_item(&self, id: i64) -> Result<Option<ItemRecord>, RepoError> {
        Ok(self.state().items.iter().find(|i| i.id == id).cloned())
    }

    async fn recent_movements(
        &self,
        item_id: i64,
        limit: i64,
    ) -> Result<Vec<StockMovementRecord>, RepoError> {
        let mut rows: Vec<StockMovementRecord> = self
            .state()
            .movements
            .iter()
            .filter(|m| m.item_id == item_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |row| row.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn active_reservations(
        &self,
        item_id: i64,
    ) -> Result<Vec<ReservationRecord>, RepoError> {
        Ok(self
            .state()
            .reservations
            .iter()
            .filter(|r| r.item_id == item_id && r.status == ReservationStatus::Active)
            .cloned()
            .collect())
    }

    async fn create_item(&self, fields: ItemFields) -> Result<ItemRecord, RepoError> {
        let mut state = self.state();
        let now = OffsetDateTime::now_utc();
        let item = ItemRecord {
            id: state.id(),
            name: fields.name,
            item_type: fields.item_type,
            quantity: fields.quantity,
            unit: fields.unit,
            image_url: fields.image_url,
            created_at: now,
            updated_at: now,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn update_item(&self, id: i64, fields: ItemFields) -> Result<ItemRecord, RepoError> {
        let mut state = self.state();
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepoError::NotFound)?;
        item.name = fields.name;
        item.item_type = fields.item_type;
        item.quantity = fields.quantity;
        item.unit = fields.unit;
        item.image_url = fields.image_url;
        item.updated_at = OffsetDateTime::now_utc();
        Ok(item.clone())
    }

    async fn delete_item(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.items.len();
        state.items.retain(|i| i.id != id);
        state.movements.retain(|m| m.item_id != id);
        state.reservations.retain(|r| r.item_id != id);
        Ok(state.items.len() < before)
    }

    async fn list_item_types(&self) -> Result<Vec<String>, RepoError> {
        let mut types: Vec<String> = self
            .state()
            .items
            .iter()
            .map(|i| i.item_type.clone())
            .collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    async fn adjust_stock(
        &self,
        params: StockAdjustmentParams,
    ) -> Result<StockAdjustmentOutcome, RepoError> {
        let mut state = self.state();
        let movement_id = state.id();
        let Some(item) = state.items.iter_mut().find(|i| i.id == params.item_id) else {
            return Ok(StockAdjustmentOutcome::ItemMissing);
        };
        let quantity = match next_quantity(item.quantity, params.kind, params.quantity) {
            Ok(quantity) => quantity,
            Err(err) => return Ok(StockAdjustmentOutcome::Rejected(err)),
        };
        let now = OffsetDateTime::now_utc();
        item.quantity = quantity;
        item.updated_at = now;
        let item = item.clone();
        let movement = StockMovementRecord {
            id: movement_id,
            item_id: params.item_id,
            kind: params.kind,
            quantity: params.quantity,
            reason: params.reason,
            created_at: now,
        };
        state.movements.push(movement.clone());
        Ok(StockAdjustmentOutcome::Applied { item, movement })
    }
}

#[async_trait]
impl SketchesRepo for MemoryStore {
    async fn list_sketches(&self) -> Result<Vec<SketchRecord>, RepoError> {
        let mut rows = self.state().sketches.clone();
        newest_first(&mut rows, |row| row.id);
        Ok(rows)
    }

    async fn find_sketch(&self, id: i64) -> Result<Option<SketchRecord>, RepoError> {
        Ok(self.state().sketches.iter().find(|s| s.id == id).cloned())
    }

    async fn list_sketches_for_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<SketchRecord>, RepoError> {
        let mut rows: Vec<SketchRecord> = self
            .state()
            .sketches
            .iter()
            .filter(|s| s.event_id == Some(event_id))
            .cloned()
            .collect();
        newest_first(&mut rows, |row| row.id);
        Ok(rows)
    }

    async fn list_unassigned_sketches(&self) -> Result<Vec<SketchRecord>, RepoError> {
        let mut rows: Vec<SketchRecord> = self
            .state()
            .sketches
            .iter()
            .filter(|s| s.event_id.is_none())
            .cloned()
            .collect();
        newest_first(&mut rows, |row| row.id);
        Ok(rows)
    }

    async fn create_sketch(
        &self,
        fields: SketchFields,
        created_by: Uuid,
    ) -> Result<SketchRecord, RepoError> {
        let mut state = self.state();
        let now = OffsetDateTime::now_utc();
        let sketch = SketchRecord {
            id: state.id(),
            name: fields.name,
            description: fields.description,
            data: fields.data,
            event_id: fields.event_id,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        state.sketches.push(sketch.clone());
        Ok(sketch)
    }

    async fn update_sketch(
        &self,
        id: i64,
        fields: SketchFields,
    ) -> Result<SketchRecord, RepoError> {
        let mut state = self.state();
        let sketch = state
            .sketches
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepoError::NotFound)?;
        sketch.name = fields.name;
        sketch.description = fields.description;
        sketch.data = fields.data;
        sketch.event_id = fields.event_id;
        sketch.updated_at = OffsetDateTime::now_utc();
        Ok(sketch.clone())
    }

    async fn delete_sketch(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.sketches.len();
        state.sketches.retain(|s| s.id != id);
        Ok(state.sketches.len() < before)
    }

    async fn assign_sketch(
        &self,
        id: i64,
        event_id: Option<i64>,
    ) -> Result<SketchRecord, RepoError> {
        let mut state = self.state();
        let sketch = state
            .sketches
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepoError::NotFound)?;
        sketch.event_id = event_id;
        sketch.updated_at = OffsetDateTime::now_utc();
        Ok(sketch.clone())
    }
}

#[async_trait]
impl NotificationsRepo for MemoryStore {
    async fn insert_notifications(
        &self,
        rows: Vec<NewNotification>,
    ) -> Result<Vec<NotificationRecord>, RepoError> {
        let mut state = self.state();
        let now = OffsetDateTime::now_utc();
        let mut written = Vec::with_capacity(rows.len());
        for row in rows {
            let record = NotificationRecord {
                id: state.id(),
                user_id: row.user_id,
                title: row.title,
                message: row.message,
                is_read: false,
                read_at: None,
                action_by: row.action_by,
                action_by_name: row.action_by_name,
                created_at: now,
            };
            state.notifications.push(record.clone());
            written.push(record);
        }
        Ok(written)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationRecord>, RepoError> {
        let mut rows: Vec<NotificationRecord> = self
            .state()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows, |row| row.id);
        Ok(rows)
    }

    async fn list_unread_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<NotificationRecord>, RepoError> {
        let mut rows = self.list_for_user(user_id).await?;
        rows.retain(|n| !n.is_read);
        Ok(rows)
    }

    async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<NotificationRecord>, RepoError> {
        let mut rows = self.list_for_user(user_id).await?;
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<i64, RepoError> {
        Ok(self
            .state()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn mark_read(
        &self,
        id: i64,
        user_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<Option<NotificationRecord>, RepoError> {
        let mut state = self.state();
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.is_read = true;
                n.read_at = Some(at);
                n.clone()
            }))
    }

    async fn mark_all_read(&self, user_id: Uuid, at: OffsetDateTime) -> Result<u64, RepoError> {
        let mut state = self.state();
        let mut count = 0;
        for n in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            n.read_at = Some(at);
            count += 1;
        }
        Ok(count)
    }

    async fn delete_for_user(&self, id: i64, user_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| !(n.id == id && n.user_id == user_id));
        Ok(state.notifications.len() < before)
    }

    async fn delete_read_for_user(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let mut state = self.state();
        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| !(n.user_id == user_id && n.is_read));
        Ok((before - state.notifications.len()) as u64)
    }

    async fn list_all(
        &self,
        limit: i64,
        is_read: Option<bool>,
    ) -> Result<Vec<AdminNotificationRecord>, RepoError> {
        let state = self.state();
        let mut rows: Vec<AdminNotificationRecord> = state
            .notifications
            .iter()
            .filter(|n| is_read.is_none_or(|flag| flag == n.is_read))
            .map(|n| {
                let user = state.users.iter().find(|u| u.id == n.user_id);
                AdminNotificationRecord {
                    notification: n.clone(),
                    user_name: user.and_then(|u| u.name.clone()),
                    user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
                }
            })
            .collect();
        newest_first(&mut rows, |row| row.notification.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn notification_stats(&self) -> Result<NotificationStats, RepoError> {
        let state = self.state();
        let mut by_title: BTreeMap<String, i64> = BTreeMap::new();
        for n in &state.notifications {
            *by_title.entry(n.title.clone()).or_default() += 1;
        }
        let total = state.notifications.len() as i64;
        let unread = state.notifications.iter().filter(|n| !n.is_read).count() as i64;
        Ok(NotificationStats {
            total,
            unread,
            read: total - unread,
            by_type: by_title
                .into_iter()
                .map(|(title, count)| TitleCount { title, count })
                .collect(),
        })
    }

    async fn delete_older_than(
        &self,
        cutoff: OffsetDateTime,
        only_read: bool,
    ) -> Result<u64, RepoError> {
        let mut state = self.state();
        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| !(n.created_at < cutoff && (!only_read || n.is_read)));
        Ok((before - state.notifications.len()) as u64)
    }

    async fn delete_all_read(&self) -> Result<u64, RepoError> {
        let mut state = self.state();
        let before = state.notifications.len();
        state.notifications.retain(|n| !n.is_read);
        Ok((before - state.notifications.len()) as u64)
    }

    async fn delete_notification(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.notifications.len();
        state.notifications.retain(|n| n.id != id);
        Ok(state.notifications.len() < before)
    }

    async fn mark_everything_read(&self, at: OffsetDateTime) -> Result<u64, RepoError> {
        let mut state = self.state();
        let mut count = 0;
        for n in state.notifications.iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            n.read_at = Some(at);
            count += 1;
        }
        Ok(count)
    }
}

#[async_trait]
impl PushSubscriptionsRepo for MemoryStore {
    async fn upsert_subscription(
        &self,
        params: UpsertSubscriptionParams,
    ) -> Result<PushSubscriptionRecord, RepoError> {
        let mut state = self.state();
        let now = OffsetDateTime::now_utc();
        if let Some(existing) = state
            .subscriptions
            .iter_mut()
            .find(|s| s.endpoint == params.endpoint)
        {
            existing.user_id = params.user_id;
            existing.p256dh = params.p256dh;
            existing.auth = params.auth;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let record = PushSubscriptionRecord {
            id: state.id(),
            user_id: params.user_id,
            endpoint: params.endpoint,
            p256dh: params.p256dh,
            auth: params.auth,
            created_at: now,
            updated_at: now,
        };
        state.subscriptions.push(record.clone());
        Ok(record)
    }

    async fn delete_subscription(&self, endpoint: &str) -> Result<bool, RepoError> {
        let mut state = self.state();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.endpoint != endpoint);
        Ok(state.subscriptions.len() < before)
    }

    async fn latest_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PushSubscriptionRecord>, RepoError> {
        Ok(self
            .state()
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| (s.updated_at, s.id))
            .cloned())
    }

    async fn list_subscriptions_for(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PushSubscriptionRecord>, RepoError> {
        Ok(self
            .state()
            .subscriptions
            .iter()
            .filter(|s| user_ids.contains(&s.user_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DashboardRepo for MemoryStore {
    async fn dashboard_stats(&self, now: OffsetDateTime) -> Result<DashboardStats, RepoError> {
        let state = self.state();
        let this_month = month_key(now.date());
        Ok(DashboardStats {
            active_events: state
                .events
                .iter()
                .filter(|e| matches!(e.estado, EventStatus::Pendiente | EventStatus::EnProceso))
                .count() as i64,
            total_items: state.items.len() as i64,
            low_stock_items: state.items.iter().filter(|i| i.quantity < 10).count() as i64,
            monthly_revenue: state
                .events
                .iter()
                .filter(|e| {
                    e.estado == EventStatus::Completado && month_key(e.end_date.date()) == this_month
                })
                .map(|e| e.monto_total)
                .sum(),
            scheduled_visits: state
                .visits
                .iter()
                .filter(|v| v.estado == VisitStatus::Programada && v.fecha_visita >= now)
                .count() as i64,
        })
    }

    async fn recent_events(&self, limit: i64) -> Result<Vec<EventActivity>, RepoError> {
        let mut rows: Vec<EventActivity> = self.state().events.iter().map(event_activity).collect();
        newest_first(&mut rows, |row| row.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn recent_visits(&self, limit: i64) -> Result<Vec<VisitActivity>, RepoError> {
        let mut rows: Vec<VisitActivity> = self
            .state()
            .visits
            .iter()
            .map(|v| VisitActivity {
                id: v.id,
                nombre_cliente: v.nombre_cliente.clone(),
                estado: v.estado,
                fecha_visita: v.fecha_visita,
                created_at: v.created_at,
            })
            .collect();
        newest_first(&mut rows, |row| row.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn events_in_window(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<EventRecord>, RepoError> {
        let mut rows: Vec<EventRecord> = self
            .state()
            .events
            .iter()
            .filter(|e| e.estado != EventStatus::Cancelado)
            .filter(|e| e.start_date <= to && e.end_date >= from)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.start_date);
        Ok(rows)
    }

    async fn visits_in_window(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<TechnicalVisitRecord>, RepoError> {
        let mut rows: Vec<TechnicalVisitRecord> = self
            .state()
            .visits
            .iter()
            .filter(|v| v.estado != VisitStatus::Cancelada)
            .filter(|v| v.fecha_visita >= from && v.fecha_visita <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|v| v.fecha_visita);
        Ok(rows)
    }

    async fn events_by_status(&self) -> Result<Vec<StatusCount>, RepoError> {
        let state = self.state();
        let statuses = [
            EventStatus::Pendiente,
            EventStatus::EnProceso,
            EventStatus::Completado,
            EventStatus::Cancelado,
        ];
        Ok(statuses
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: state.events.iter().filter(|e| e.estado == status).count() as i64,
            })
            .filter(|row| row.count > 0)
            .collect())
    }

    async fn revenue_by_month(
        &self,
        since: OffsetDateTime,
    ) -> Result<Vec<MonthRevenue>, RepoError> {
        let state = self.state();
        let mut by_month: BTreeMap<String, i64> = BTreeMap::new();
        for event in state
            .events
            .iter()
            .filter(|e| e.estado == EventStatus::Completado && e.end_date >= since)
        {
            *by_month.entry(month_key(event.end_date.date())).or_default() += event.monto_total;
        }
        Ok(by_month
            .into_iter()
            .map(|(month, revenue)| MonthRevenue { month, revenue })
            .collect())
    }
}

#[async_trait]
impl HealthRepo for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}
