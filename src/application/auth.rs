//! Account registration, credential login and opaque session tokens.

use std::sync::Arc;
use std::time::Duration;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::repos::{
    CreateSessionParams, CreateUserParams, RepoError, SessionsRepo, UsersRepo,
};
use crate::domain::access::Capability;
use crate::domain::entities::UserRecord;
use crate::domain::types::Role;
use crate::domain::validation::is_valid_email;

const TOKEN_PREFIX: &str = "ses";
const MIN_SECRET_LEN: usize = 32;
/// Role given to self-registered accounts.
const REGISTERED_ROLE: Role = Role::Admin;

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Todos los campos son requeridos")]
    MissingFields,
    #[error("Email inválido")]
    InvalidEmail,
    #[error("El usuario ya existe")]
    AlreadyExists,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Credenciales inválidas")]
    InvalidCredentials,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing session token")]
    Missing,
    #[error("invalid session token")]
    Invalid,
    #[error("expired session token")]
    Expired,
}

#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SessionIssued {
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub user: UserRecord,
}

/// The authenticated caller of a request. The role is read fresh on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub session_prefix: String,
}

impl Principal {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UsersRepo>,
    sessions: Arc<dyn SessionsRepo>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(users: Arc<dyn UsersRepo>, sessions: Arc<dyn SessionsRepo>, ttl: Duration) -> Self {
        Self {
            users,
            sessions,
            ttl,
        }
    }

    pub async fn register(&self, cmd: RegisterCommand) -> Result<UserRecord, RegisterError> {
        let name = cmd.name.trim().to_string();
        let email = cmd.email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || cmd.password.is_empty() {
            return Err(RegisterError::MissingFields);
        }
        if !is_valid_email(&email) {
            return Err(RegisterError::InvalidEmail);
        }

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(RegisterError::AlreadyExists);
        }

        let password_hash =
            hash_password(&cmd.password).map_err(|err| RegisterError::Hash(err.to_string()))?;

        let user = self
            .users
            .create_user(CreateUserParams {
                name,
                email,
                password_hash,
                role: REGISTERED_ROLE,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => RegisterError::AlreadyExists,
                other => RegisterError::Repo(other),
            })?;

        info!(
            target = "carpas::auth",
            user_id = %user.id,
            role = user.role.as_str(),
            "user registered"
        );
        Ok(user)
    }

    pub async fn login(&self, cmd: LoginCommand) -> Result<SessionIssued, LoginError> {
        let email = cmd.email.trim().to_lowercase();
        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        let verified = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(&cmd.password, hash));
        if !verified {
            return Err(LoginError::InvalidCredentials);
        }

        let prefix = Self::generate_prefix();
        let secret = Self::generate_secret();
        let token = format!("{TOKEN_PREFIX}_{prefix}_{secret}");
        let expires_at = OffsetDateTime::now_utc() + self.ttl;

        self.sessions
            .create_session(CreateSessionParams {
                user_id: user.id,
                prefix,
                hashed_secret: Self::hash_secret(&secret),
                expires_at,
            })
            .await?;

        debug!(target = "carpas::auth", user_id = %user.id, "session issued");
        Ok(SessionIssued {
            token,
            expires_at,
            user,
        })
    }

    pub async fn logout(&self, principal: &Principal) -> Result<(), RepoError> {
        self.sessions
            .delete_session(&principal.session_prefix)
            .await
            .map(|_| ())
    }

    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let parsed = Self::parse_token(token).ok_or(AuthError::Invalid)?;
        let session = self
            .sessions
            .find_session_by_prefix(&parsed.prefix)
            .await
            .map_err(|_| AuthError::Invalid)?
            .ok_or(AuthError::Invalid)?;

        let hashed_input = Self::hash_secret(&parsed.secret);
        if session.hashed_secret.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AuthError::Invalid);
        }

        let now = OffsetDateTime::now_utc();
        if session.expires_at <= now {
            return Err(AuthError::Expired);
        }

        let user = self
            .users
            .find_user(session.user_id)
            .await
            .map_err(|_| AuthError::Invalid)?
            .ok_or(AuthError::Invalid)?;

        // best-effort last_used update; do not block auth
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            let _ = sessions.touch_session(session.id, now).await;
        });

        Ok(Principal {
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            session_prefix: session.prefix,
        })
    }

    pub async fn purge_expired(&self) -> Result<u64, RepoError> {
        self.sessions
            .delete_expired_sessions(OffsetDateTime::now_utc())
            .await
    }

    fn hash_secret(secret: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hasher.finalize().to_vec()
    }

    fn generate_prefix() -> String {
        Uuid::new_v4().simple().to_string()[..12].to_string()
    }

    fn generate_secret() -> String {
        format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
    }

    fn parse_token(token: &str) -> Option<ParsedToken> {
        let mut parts = token.splitn(3, '_');
        if parts.next()? != TOKEN_PREFIX {
            return None;
        }
        let prefix = parts.next()?;
        let secret = parts.next()?;
        if secret.len() < MIN_SECRET_LEN || prefix.is_empty() {
            return None;
        }
        Some(ParsedToken {
            prefix: prefix.to_string(),
            secret: secret.to_string(),
        })
    }
}

struct ParsedToken {
    prefix: String,
    secret: String,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())?;
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryStore;

    fn service(store: &Arc<MemoryStore>) -> SessionService {
        SessionService::new(store.clone(), store.clone(), Duration::from_secs(3600))
    }

    fn register_cmd(email: &str) -> RegisterCommand {
        RegisterCommand {
            name: "Camila Rojas".into(),
            email: email.into(),
            password: "carpa-segura".into(),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("toldo-2025").expect("hash");
        assert!(verify_password("toldo-2025", &hash));
        assert!(!verify_password("toldo-2024", &hash));
        assert!(!verify_password("toldo-2025", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn register_assigns_admin_role_and_hides_password() {
        let store = Arc::new(MemoryStore::default());
        let user = service(&store)
            .register(register_cmd("Camila@Carpas.cl"))
            .await
            .expect("register");

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.email, "camila@carpas.cl");
        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_new_row() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(&store);
        svc.register(register_cmd("camila@carpas.cl"))
            .await
            .expect("first");

        let err = svc
            .register(register_cmd("camila@carpas.cl"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::AlreadyExists));
        assert_eq!(err.to_string(), "El usuario ya existe");
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let store = Arc::new(MemoryStore::default());
        let err = service(&store)
            .register(RegisterCommand {
                name: " ".into(),
                email: "x@carpas.cl".into(),
                password: "secret".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Todos los campos son requeridos");
    }

    #[tokio::test]
    async fn login_then_authenticate_yields_principal() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(&store);
        svc.register(register_cmd("camila@carpas.cl"))
            .await
            .expect("register");

        let issued = svc
            .login(LoginCommand {
                email: "camila@carpas.cl".into(),
                password: "carpa-segura".into(),
            })
            .await
            .expect("login");
        assert!(issued.token.starts_with("ses_"));

        let principal = svc.authenticate(&issued.token).await.expect("auth");
        assert_eq!(principal.email, "camila@carpas.cl");
        assert!(principal.can(Capability::AdministerUsers));
        assert!(!principal.can(Capability::DeleteUsers));

        svc.logout(&principal).await.expect("logout");
        assert!(matches!(
            svc.authenticate(&issued.token).await,
            Err(AuthError::Invalid)
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_tampered_tokens_fail() {
        let store = Arc::new(MemoryStore::default());
        let svc = service(&store);
        svc.register(register_cmd("camila@carpas.cl"))
            .await
            .expect("register");

        let err = svc
            .login(LoginCommand {
                email: "camila@carpas.cl".into(),
                password: "otra".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));

        let issued = svc
            .login(LoginCommand {
                email: "camila@carpas.cl".into(),
                password: "carpa-segura".into(),
            })
            .await
            .expect("login");
        let mut tampered = issued.token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(svc.authenticate(&tampered).await.is_err());
        assert!(svc.authenticate("sk_abc_def").await.is_err());
    }
}
