//! Role to capability mapping used by the HTTP capability guard.

use serde::Serialize;

use crate::domain::types::Role;

/// An action class a route can demand from the authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Any authenticated account.
    UseApp,
    /// List users, change roles, read user statistics.
    AdministerUsers,
    /// Remove user accounts.
    DeleteUsers,
    /// Global notification maintenance.
    AdministerNotifications,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::UseApp => "use_app",
            Capability::AdministerUsers => "administer_users",
            Capability::DeleteUsers => "delete_users",
            Capability::AdministerNotifications => "administer_notifications",
        }
    }

    /// User-facing message returned when the capability is missing.
    pub fn denial_message(self) -> &'static str {
        match self {
            Capability::UseApp => "No autorizado",
            Capability::DeleteUsers => "Solo SUPER_ADMIN puede eliminar usuarios",
            Capability::AdministerUsers | Capability::AdministerNotifications => {
                "No tienes permisos de administrador"
            }
        }
    }
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    pub fn grants(self, capability: Capability) -> bool {
        match capability {
            Capability::UseApp => true,
            Capability::AdministerUsers | Capability::AdministerNotifications => self.is_admin(),
            Capability::DeleteUsers => self == Role::SuperAdmin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_super_admin_deletes_users() {
        let allowed: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|role| role.grants(Capability::DeleteUsers))
            .collect();
        assert_eq!(allowed, vec![Role::SuperAdmin]);
    }

    #[test]
    fn admin_capabilities_cover_both_admin_roles() {
        for role in Role::ALL {
            assert_eq!(role.grants(Capability::AdministerUsers), role.is_admin());
            assert_eq!(
                role.grants(Capability::AdministerNotifications),
                role.is_admin()
            );
            assert!(role.grants(Capability::UseApp));
        }
    }
}
