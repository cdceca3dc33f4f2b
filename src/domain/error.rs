use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Carries a message shown to the user as-is.
    #[error("{message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
