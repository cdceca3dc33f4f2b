//! The signed-in user's own profile.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::application::repos::{
    EventActivity, ProfileCounts, ProfileRepo, ProfileStats, RepoError, SketchActivity,
    UpdateProfileParams, UsersRepo,
};
use crate::domain::entities::UserRecord;
use crate::domain::error::DomainError;
use crate::domain::validation::{optional_text, required_text};

const ACTIVITY_DEFAULT: i64 = 10;
const ACTIVITY_MAX: i64 = 50;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("Usuario no encontrado")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub user: UserRecord,
    #[serde(rename = "_count")]
    pub counts: ProfileCounts,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileCommand {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub preferences: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
    pub events: Vec<EventActivity>,
    pub sketches: Vec<SketchActivity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationPreference {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceCatalog {
    pub timezones: Vec<PreferenceOption>,
    pub languages: Vec<PreferenceOption>,
    pub notification_preferences: Vec<NotificationPreference>,
}

const TIMEZONES: [(&str, &str); 6] = [
    ("America/Santiago", "Santiago (Chile)"),
    ("America/New_York", "Nueva York (EE.UU.)"),
    ("America/Los_Angeles", "Los Ángeles (EE.UU.)"),
    ("Europe/Madrid", "Madrid (España)"),
    ("Europe/London", "Londres (Reino Unido)"),
    ("Asia/Tokyo", "Tokio (Japón)"),
];

const LANGUAGES: [(&str, &str); 3] = [("es", "Español"), ("en", "English"), ("pt", "Português")];

const NOTIFICATION_PREFERENCES: [(&str, &str); 5] = [
    ("email_notifications", "Notificaciones por email"),
    ("push_notifications", "Notificaciones push"),
    ("event_reminders", "Recordatorios de eventos"),
    ("daily_summary", "Resumen diario"),
    ("weekly_report", "Reporte semanal"),
];

fn options(pairs: &[(&'static str, &'static str)]) -> Vec<PreferenceOption> {
    pairs
        .iter()
        .map(|&(value, label)| PreferenceOption { value, label })
        .collect()
}

pub fn preference_catalog() -> PreferenceCatalog {
    PreferenceCatalog {
        timezones: options(&TIMEZONES),
        languages: options(&LANGUAGES),
        notification_preferences: NOTIFICATION_PREFERENCES
            .iter()
            .map(|&(key, label)| NotificationPreference {
                key,
                label,
                kind: "boolean",
            })
            .collect(),
    }
}

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UsersRepo>,
    profile: Arc<dyn ProfileRepo>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UsersRepo>, profile: Arc<dyn ProfileRepo>) -> Self {
        Self { users, profile }
    }

    pub async fn current(&self, user_id: Uuid) -> Result<ProfileView, ProfileError> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or(ProfileError::NotFound)?;
        let counts = self.profile.profile_counts(user_id).await?;
        Ok(ProfileView { user, counts })
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        cmd: UpdateProfileCommand,
    ) -> Result<UserRecord, ProfileError> {
        let name = cmd
            .name
            .map(|name| required_text(&name, "El nombre es requerido"))
            .transpose()?;
        if let Some(preferences) = &cmd.preferences {
            ensure_object(preferences)?;
        }
        let params = UpdateProfileParams {
            name,
            phone: cmd.phone.map(|value| value.trim().to_string()),
            address: cmd.address.map(|value| value.trim().to_string()),
            bio: cmd.bio.map(|value| value.trim().to_string()),
            timezone: optional_text(cmd.timezone),
            language: optional_text(cmd.language),
            preferences: cmd.preferences,
        };
        self.profile
            .update_profile(user_id, params)
            .await
            .map_err(not_found_or_repo)
    }

    /// Replace the avatar. An empty value clears it.
    pub async fn update_avatar(
        &self,
        user_id: Uuid,
        avatar_url: Option<String>,
    ) -> Result<UserRecord, ProfileError> {
        let avatar_url = match optional_text(avatar_url) {
            Some(url) => {
                Url::parse(&url).map_err(|_| DomainError::validation("URL de avatar inválida"))?;
                Some(url)
            }
            None => None,
        };
        self.profile
            .update_avatar(user_id, avatar_url)
            .await
            .map_err(not_found_or_repo)
    }

    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        preferences: JsonValue,
    ) -> Result<UserRecord, ProfileError> {
        ensure_object(&preferences)?;
        self.profile
            .update_preferences(user_id, preferences)
            .await
            .map_err(not_found_or_repo)
    }

    pub async fn stats(&self, user_id: Uuid) -> Result<ProfileStats, ProfileError> {
        Ok(self.profile.profile_stats(user_id).await?)
    }

    pub async fn recent_activity(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<RecentActivity, ProfileError> {
        let limit = limit.unwrap_or(ACTIVITY_DEFAULT);
        if !(1..=ACTIVITY_MAX).contains(&limit) {
            return Err(DomainError::validation("El límite debe estar entre 1 y 50").into());
        }
        let events = self.profile.recent_events_by(user_id, limit).await?;
        let sketches = self.profile.recent_sketches_by(user_id, limit).await?;
        Ok(RecentActivity { events, sketches })
    }
}

fn ensure_object(value: &JsonValue) -> Result<(), DomainError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(DomainError::validation(
            "Las preferencias deben ser un objeto",
        ))
    }
}

fn not_found_or_repo(err: RepoError) -> ProfileError {
    match err {
        RepoError::NotFound => ProfileError::NotFound,
        other => ProfileError::Repo(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MemoryStore, services};
    use crate::domain::types::Role;
    use serde_json::json;

    #[tokio::test]
    async fn profile_update_keeps_untouched_fields() {
        let store = Arc::new(MemoryStore::default());
        let user = store.add_user("perfil@carpas.cl", Role::Worker);
        let svc = services(&store).profile;

        let updated = svc
            .update(
                user,
                UpdateProfileCommand {
                    phone: Some(" +56 2 2345 6789 ".into()),
                    preferences: Some(json!({"push_notifications": true})),
                    ..UpdateProfileCommand::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.phone.as_deref(), Some("+56 2 2345 6789"));
        assert_eq!(updated.email, "perfil@carpas.cl");

        let view = svc.current(user).await.expect("current");
        assert_eq!(view.counts, ProfileCounts::default());
        assert_eq!(
            view.user.preferences,
            Some(json!({"push_notifications": true}))
        );
    }

    #[tokio::test]
    async fn preferences_must_be_an_object() {
        let store = Arc::new(MemoryStore::default());
        let user = store.add_user("perfil@carpas.cl", Role::Worker);
        let svc = services(&store).profile;
        assert!(matches!(
            svc.update_preferences(user, json!(["a"])).await,
            Err(ProfileError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn activity_limit_is_bounded() {
        let store = Arc::new(MemoryStore::default());
        let user = store.add_user("perfil@carpas.cl", Role::Worker);
        let svc = services(&store).profile;
        assert!(svc.recent_activity(user, Some(50)).await.is_ok());
        assert!(svc.recent_activity(user, Some(51)).await.is_err());
        assert!(svc.recent_activity(user, Some(0)).await.is_err());
    }

    #[test]
    fn catalog_lists_supported_languages() {
        let catalog = preference_catalog();
        let languages: Vec<&str> = catalog.languages.iter().map(|l| l.value).collect();
        assert_eq!(languages, vec!["es", "en", "pt"]);
        assert_eq!(catalog.notification_preferences.len(), 5);
    }
}
