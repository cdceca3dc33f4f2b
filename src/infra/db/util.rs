use crate::application::repos::RepoError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NOT_NULL_VIOLATION: &str = "23502";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";
const QUERY_CANCELED: &str = "57014";

/// Classify a sqlx error by its Postgres SQLSTATE.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => RepoError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            },
            Some(FOREIGN_KEY_VIOLATION | CHECK_VIOLATION | NOT_NULL_VIOLATION) => {
                RepoError::Integrity {
                    message: db.message().to_string(),
                }
            }
            Some(INVALID_TEXT_REPRESENTATION) => RepoError::InvalidInput {
                message: db.message().to_string(),
            },
            Some(QUERY_CANCELED) => RepoError::Timeout,
            _ => RepoError::from_persistence(db),
        },
        other => RepoError::from_persistence(other),
    }
}

pub fn convert_count(value: i64) -> Result<u64, RepoError> {
    value
        .try_into()
        .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
}
