//! API handlers organized by resource.
//!
//! Service errors are converted to `ApiError` by the helpers at the bottom of this module.

mod admin;
mod auth;
mod clients;
mod dashboard;
mod events;
mod inventory;
mod notifications;
mod profile;
mod push;
mod sketches;
mod suppliers;
mod visits;

pub use admin::*;
pub use auth::*;
pub use clients::*;
pub use dashboard::*;
pub use events::*;
pub use inventory::*;
pub use notifications::*;
pub use profile::*;
pub use push::*;
pub use sketches::*;
pub use suppliers::*;
pub use visits::*;

// ----- Shared error conversions -----

use axum::http::StatusCode;

use crate::application::admin::AdminError;
use crate::application::auth::{LoginError, RegisterError};
use crate::application::clients::ClientError;
use crate::application::dashboard::DashboardError;
use crate::application::events::EventError;
use crate::application::inventory::InventoryError;
use crate::application::notifications::NotificationError;
use crate::application::profile::ProfileError;
use crate::application::push::PushSubscriptionError;
use crate::application::repos::RepoError;
use crate::application::sketches::SketchError;
use crate::application::suppliers::SupplierError;
use crate::application::visits::VisitError;
use crate::domain::error::DomainError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "El registro ya existe",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("Recurso no encontrado"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Datos inválidos",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "El registro está referenciado por otros datos",
            None,
        )
        .with_detail(message),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "La base de datos no respondió a tiempo",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Error interno del servidor",
            None,
        )
        .with_detail(message),
    }
}

pub(crate) fn domain_to_api(err: DomainError) -> ApiError {
    match err {
        DomainError::Validation { message } => ApiError::bad_request(message),
    }
}

pub(crate) fn register_to_api(err: RegisterError) -> ApiError {
    match err {
        RegisterError::MissingFields
        | RegisterError::InvalidEmail
        | RegisterError::AlreadyExists => ApiError::bad_request(err.to_string()),
        RegisterError::Repo(RepoError::Duplicate { .. }) => {
            ApiError::bad_request(RegisterError::AlreadyExists.to_string())
        }
        RegisterError::Hash(message) => ApiError::internal(message),
        RegisterError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn login_to_api(err: LoginError) -> ApiError {
    match err {
        LoginError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
        LoginError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn admin_to_api(err: AdminError) -> ApiError {
    match err {
        AdminError::Invalid(domain) => domain_to_api(domain),
        AdminError::SelfDemotion | AdminError::SelfDeletion => {
            ApiError::bad_request(err.to_string())
        }
        AdminError::OnlySuperAdmin => ApiError::forbidden(err.to_string()),
        AdminError::UserNotFound | AdminError::NotificationNotFound => {
            ApiError::not_found(err.to_string())
        }
        AdminError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn client_to_api(err: ClientError) -> ApiError {
    match err {
        ClientError::Invalid(domain) => domain_to_api(domain),
        ClientError::NotFound => ApiError::not_found(err.to_string()),
        ClientError::HasEvents { .. } => ApiError::conflict(err.to_string()),
        ClientError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn supplier_to_api(err: SupplierError) -> ApiError {
    match err {
        SupplierError::Invalid(domain) => domain_to_api(domain),
        SupplierError::NotFound => ApiError::not_found(err.to_string()),
        SupplierError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn event_to_api(err: EventError) -> ApiError {
    match err {
        EventError::Invalid(domain) => domain_to_api(domain),
        EventError::NotFound => ApiError::not_found(err.to_string()),
        EventError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn visit_to_api(err: VisitError) -> ApiError {
    match err {
        VisitError::Invalid(domain) => domain_to_api(domain),
        VisitError::NotFound => ApiError::not_found(err.to_string()),
        VisitError::UnknownAssignee => ApiError::bad_request(err.to_string()),
        VisitError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn inventory_to_api(err: InventoryError) -> ApiError {
    match err {
        InventoryError::Invalid(domain) => domain_to_api(domain),
        InventoryError::Stock(stock) => ApiError::bad_request(stock.to_string()),
        InventoryError::NotFound => ApiError::not_found(err.to_string()),
        InventoryError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn sketch_to_api(err: SketchError) -> ApiError {
    match err {
        SketchError::Invalid(domain) => domain_to_api(domain),
        SketchError::NotFound | SketchError::EventNotFound => ApiError::not_found(err.to_string()),
        SketchError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn notification_to_api(err: NotificationError) -> ApiError {
    match err {
        NotificationError::ConstraintViolation(message) => ApiError::bad_request(message),
        NotificationError::NotFound => ApiError::not_found(err.to_string()),
        NotificationError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn push_to_api(err: PushSubscriptionError) -> ApiError {
    match err {
        PushSubscriptionError::Invalid => ApiError::bad_request(err.to_string()),
        PushSubscriptionError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn profile_to_api(err: ProfileError) -> ApiError {
    match err {
        ProfileError::Invalid(domain) => domain_to_api(domain),
        ProfileError::NotFound => ApiError::not_found(err.to_string()),
        ProfileError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn dashboard_to_api(err: DashboardError) -> ApiError {
    match err {
        DashboardError::Repo(repo) => repo_to_api(repo),
    }
}
