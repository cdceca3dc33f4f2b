pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};

use crate::domain::access::Capability;

pub fn build_api_router(state: ApiState) -> Router {
    let public = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login));

    let protected = Router::new()
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/v1/admin/is-admin", get(handlers::is_admin))
        .merge(admin_users_router())
        .merge(admin_delete_router())
        .merge(admin_notifications_router())
        .route(
            "/api/v1/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route("/api/v1/clients/search", get(handlers::search_clients))
        .route("/api/v1/clients/stats", get(handlers::client_stats))
        .route(
            "/api/v1/clients/most-active",
            get(handlers::most_active_clients),
        )
        .route(
            "/api/v1/clients/{id}",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .route(
            "/api/v1/suppliers",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route("/api/v1/suppliers/search", get(handlers::search_suppliers))
        .route("/api/v1/suppliers/stats", get(handlers::supplier_stats))
        .route(
            "/api/v1/suppliers/by-service/{tipo}",
            get(handlers::suppliers_by_service),
        )
        .route(
            "/api/v1/suppliers/{id}",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route(
            "/api/v1/suppliers/{id}/toggle",
            post(handlers::toggle_supplier),
        )
        .route(
            "/api/v1/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/api/v1/events/status/{estado}",
            get(handlers::events_by_status),
        )
        .route(
            "/api/v1/events/completed-visits",
            get(handlers::completed_visits),
        )
        .route(
            "/api/v1/events/{id}",
            get(handlers::get_event)
                .patch(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route(
            "/api/v1/visits",
            get(handlers::list_visits).post(handlers::create_visit),
        )
        .route(
            "/api/v1/visits/status/{estado}",
            get(handlers::visits_by_status),
        )
        .route("/api/v1/visits/users", get(handlers::assignable_users))
        .route(
            "/api/v1/visits/{id}",
            get(handlers::get_visit)
                .patch(handlers::update_visit)
                .delete(handlers::delete_visit),
        )
        .route(
            "/api/v1/inventory",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route("/api/v1/inventory/types", get(handlers::item_types))
        .route(
            "/api/v1/inventory/{id}",
            get(handlers::get_item)
                .patch(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/api/v1/inventory/{id}/adjust", post(handlers::adjust_stock))
        .route(
            "/api/v1/notifications",
            get(handlers::list_notifications).post(handlers::create_notification),
        )
        .route(
            "/api/v1/notifications/unread",
            get(handlers::unread_notifications),
        )
        .route(
            "/api/v1/notifications/unread/count",
            get(handlers::unread_count),
        )
        .route(
            "/api/v1/notifications/mark-all-read",
            post(handlers::mark_all_read),
        )
        .route(
            "/api/v1/notifications/read",
            delete(handlers::delete_read_notifications),
        )
        .route(
            "/api/v1/notifications/{id}/read",
            post(handlers::mark_notification_read),
        )
        .route(
            "/api/v1/notifications/{id}",
            delete(handlers::delete_notification),
        )
        .route("/api/v1/dashboard/stats", get(handlers::dashboard_stats))
        .route("/api/v1/dashboard/recent", get(handlers::recent_activity))
        .route(
            "/api/v1/dashboard/upcoming-events",
            get(handlers::upcoming_events),
        )
        .route(
            "/api/v1/dashboard/upcoming-visits",
            get(handlers::upcoming_visits),
        )
        .route(
            "/api/v1/dashboard/events-by-status",
            get(handlers::events_by_status_counts),
        )
        .route(
            "/api/v1/dashboard/monthly-revenue",
            get(handlers::monthly_revenue),
        )
        .route(
            "/api/v1/sketches",
            get(handlers::list_sketches).post(handlers::create_sketch),
        )
        .route(
            "/api/v1/sketches/unassigned",
            get(handlers::unassigned_sketches),
        )
        .route(
            "/api/v1/sketches/event/{event_id}",
            get(handlers::sketches_for_event),
        )
        .route(
            "/api/v1/sketches/{id}",
            get(handlers::get_sketch)
                .patch(handlers::update_sketch)
                .delete(handlers::delete_sketch),
        )
        .route(
            "/api/v1/sketches/{id}/assign",
            post(handlers::assign_sketch),
        )
        .route("/api/v1/push/subscribe", post(handlers::subscribe))
        .route("/api/v1/push/unsubscribe", post(handlers::unsubscribe))
        .route(
            "/api/v1/push/subscription",
            get(handlers::current_subscription),
        )
        .route(
            "/api/v1/push/has-subscription",
            get(handlers::has_subscription),
        )
        .route("/api/v1/push/public-key", get(handlers::public_key))
        .route(
            "/api/v1/profile",
            get(handlers::current_profile).patch(handlers::update_profile),
        )
        .route("/api/v1/profile/avatar", put(handlers::update_avatar))
        .route("/api/v1/profile/stats", get(handlers::profile_stats))
        .route("/api/v1/profile/activity", get(handlers::profile_activity))
        .route(
            "/api/v1/profile/preferences/options",
            get(handlers::preference_options),
        )
        .route(
            "/api/v1/profile/preferences",
            put(handlers::update_preferences),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::api_auth,
        ));

    public.merge(protected).with_state(state)
}

fn admin_users_router() -> Router<ApiState> {
    Router::new()
        .route("/api/v1/admin/users", get(handlers::list_users))
        .route("/api/v1/admin/users/stats", get(handlers::user_stats))
        .route(
            "/api/v1/admin/users/{id}/role",
            patch(handlers::update_user_role),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            Capability::AdministerUsers,
            middleware::require_capability,
        ))
}

fn admin_delete_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/v1/admin/users/{id}",
            delete(handlers::delete_user),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            Capability::DeleteUsers,
            middleware::require_capability,
        ))
}

fn admin_notifications_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/v1/admin/notifications",
            get(handlers::list_all_notifications),
        )
        .route(
            "/api/v1/admin/notifications/stats",
            get(handlers::notification_stats),
        )
        .route(
            "/api/v1/admin/notifications/clean",
            post(handlers::clean_old_notifications),
        )
        .route(
            "/api/v1/admin/notifications/read",
            delete(handlers::delete_all_read_notifications),
        )
        .route(
            "/api/v1/admin/notifications/mark-all-read",
            post(handlers::mark_all_notifications_read),
        )
        .route(
            "/api/v1/admin/notifications/{id}",
            delete(handlers::delete_any_notification),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            Capability::AdministerNotifications,
            middleware::require_capability,
        ))
}
