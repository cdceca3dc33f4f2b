//! Wiring of application services over one repository implementation.

use std::sync::Arc;
use std::time::Duration;

use crate::application::admin::AdminService;
use crate::application::auth::SessionService;
use crate::application::clients::ClientService;
use crate::application::dashboard::DashboardService;
use crate::application::events::EventService;
use crate::application::fanout::NotificationFanout;
use crate::application::inventory::InventoryService;
use crate::application::notifications::NotificationService;
use crate::application::profile::ProfileService;
use crate::application::push::{PushDispatcher, PushGateway, PushSubscriptionService};
use crate::application::repos::{
    ClientsRepo, DashboardRepo, EventsRepo, HealthRepo, InventoryRepo, NotificationsRepo,
    ProfileRepo, PushSubscriptionsRepo, SessionsRepo, SketchesRepo, SuppliersRepo, UsersRepo,
    VisitsRepo,
};
use crate::application::sketches::SketchService;
use crate::application::suppliers::SupplierService;
use crate::application::visits::VisitService;

/// Every repository trait the services need, implemented by one backend.
pub trait Repositories:
    UsersRepo
    + SessionsRepo
    + ProfileRepo
    + ClientsRepo
    + SuppliersRepo
    + EventsRepo
    + VisitsRepo
    + InventoryRepo
    + SketchesRepo
    + NotificationsRepo
    + PushSubscriptionsRepo
    + DashboardRepo
    + HealthRepo
    + 'static
{
}

impl<T> Repositories for T where
    T: UsersRepo
        + SessionsRepo
        + ProfileRepo
        + ClientsRepo
        + SuppliersRepo
        + EventsRepo
        + VisitsRepo
        + InventoryRepo
        + SketchesRepo
        + NotificationsRepo
        + PushSubscriptionsRepo
        + DashboardRepo
        + HealthRepo
        + 'static
{
}

#[derive(Clone)]
pub struct ServiceContext {
    pub sessions: Arc<SessionService>,
    pub admin: Arc<AdminService>,
    pub clients: Arc<ClientService>,
    pub suppliers: Arc<SupplierService>,
    pub events: Arc<EventService>,
    pub visits: Arc<VisitService>,
    pub inventory: Arc<InventoryService>,
    pub sketches: Arc<SketchService>,
    pub notifications: Arc<NotificationService>,
    pub push: Arc<PushSubscriptionService>,
    pub dashboard: Arc<DashboardService>,
    pub profile: Arc<ProfileService>,
    pub health: Arc<dyn HealthRepo>,
}

impl ServiceContext {
    pub fn assemble<R: Repositories>(
        repos: Arc<R>,
        gateway: Arc<dyn PushGateway>,
        session_ttl: Duration,
    ) -> Self {
        let dispatcher = PushDispatcher::new(repos.clone(), gateway.clone());
        let fanout = NotificationFanout::new(repos.clone(), dispatcher);

        Self {
            sessions: Arc::new(SessionService::new(
                repos.clone(),
                repos.clone(),
                session_ttl,
            )),
            admin: Arc::new(AdminService::new(repos.clone(), repos.clone())),
            clients: Arc::new(ClientService::new(repos.clone())),
            suppliers: Arc::new(SupplierService::new(repos.clone())),
            events: Arc::new(EventService::new(
                repos.clone(),
                repos.clone(),
                repos.clone(),
                fanout.clone(),
            )),
            visits: Arc::new(VisitService::new(
                repos.clone(),
                repos.clone(),
                fanout.clone(),
            )),
            inventory: Arc::new(InventoryService::new(repos.clone())),
            sketches: Arc::new(SketchService::new(
                repos.clone(),
                repos.clone(),
                repos.clone(),
                fanout.clone(),
            )),
            notifications: Arc::new(NotificationService::new(repos.clone(), fanout)),
            push: Arc::new(PushSubscriptionService::new(repos.clone(), gateway)),
            dashboard: Arc::new(DashboardService::new(repos.clone(), repos.clone())),
            profile: Arc::new(ProfileService::new(repos.clone(), repos.clone())),
            health: repos,
        }
    }
}
