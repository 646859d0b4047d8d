use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppResponse::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<LmdbError> for AppResponse {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::NotFound => AppResponse::NotFound("Key not found in content database".to_string()),
            LmdbError::MapFull => {
                AppResponse::DatabaseError("Content database is full; raise map_size_mb".to_string())
            }
            LmdbError::Corrupted | LmdbError::Panic => {
                AppResponse::DatabaseError(format!("Content database is corrupted: {}", err))
            }
            _ => AppResponse::DatabaseError(format!("LMDB error: {}", err)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for AppResponse {
    fn from(err: std::io::Error) -> Self {
        AppResponse::DatabaseError(format!("IO error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AppResponse::Ok(_))
    }

    /// The bare message without the variant prefix, for showing to a user.
    pub fn message(&self) -> &str {
        match self {
            AppResponse::DatabaseError(msg)
            | AppResponse::SerializationError(msg)
            | AppResponse::NotFound(msg)
            | AppResponse::ValidationError(msg)
            | AppResponse::BadRequest(msg)
            | AppResponse::Unauthorized(msg)
            | AppResponse::Conflict(msg)
            | AppResponse::Ok(msg) => msg,
        }
    }
}
