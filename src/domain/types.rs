//! Shared domain enumerations aligned with persisted database enums.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Technician,
    Sales,
    Worker,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Manager,
        Role::Technician,
        Role::Sales,
        Role::Worker,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Technician => "TECHNICIAN",
            Role::Sales => "SALES",
            Role::Worker => "WORKER",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role `{s}`"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "event_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Pendiente,
    EnProceso,
    Completado,
    Cancelado,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Pendiente => "PENDIENTE",
            EventStatus::EnProceso => "EN_PROCESO",
            EventStatus::Completado => "COMPLETADO",
            EventStatus::Cancelado => "CANCELADO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "visit_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitStatus {
    #[default]
    Programada,
    Reprogramada,
    Realizada,
    Cancelada,
}

impl VisitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitStatus::Programada => "PROGRAMADA",
            VisitStatus::Reprogramada => "REPROGRAMADA",
            VisitStatus::Realizada => "REALIZADA",
            VisitStatus::Cancelada => "CANCELADA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "movement_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    In,
    Out,
    Adjustment,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::In => "IN",
            MovementKind::Out => "OUT",
            MovementKind::Adjustment => "ADJUSTMENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Active,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "client_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    #[default]
    Particular,
    Empresa,
    Organizacion,
    Gobierno,
    Embajada,
}

impl ClientType {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientType::Particular => "PARTICULAR",
            ClientType::Empresa => "EMPRESA",
            ClientType::Organizacion => "ORGANIZACION",
            ClientType::Gobierno => "GOBIERNO",
            ClientType::Embajada => "EMBAJADA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "service_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Mobiliario,
    Decoracion,
    Catering,
    Sonido,
    Iluminacion,
    Transporte,
    Otros,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Mobiliario => "MOBILIARIO",
            ServiceType::Decoracion => "DECORACION",
            ServiceType::Catering => "CATERING",
            ServiceType::Sonido => "SONIDO",
            ServiceType::Iluminacion => "ILUMINACION",
            ServiceType::Transporte => "TRANSPORTE",
            ServiceType::Otros => "OTROS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("super_admin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert_eq!(" WORKER ".parse::<Role>(), Ok(Role::Worker));
        assert!("OWNER".parse::<Role>().is_err());
    }

    #[test]
    fn statuses_serialize_in_upper_snake_case() {
        let json = serde_json::to_string(&EventStatus::EnProceso).expect("serialize");
        assert_eq!(json, "\"EN_PROCESO\"");
        let parsed: VisitStatus = serde_json::from_str("\"REPROGRAMADA\"").expect("parse");
        assert_eq!(parsed, VisitStatus::Reprogramada);
    }

    #[test]
    fn defaults_match_initial_states() {
        assert_eq!(EventStatus::default(), EventStatus::Pendiente);
        assert_eq!(VisitStatus::default(), VisitStatus::Programada);
        assert_eq!(ClientType::default(), ClientType::Particular);
    }
}
