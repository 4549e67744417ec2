// Query service error types

use hyper::StatusCode;

use crate::store::StoreError;

/// Failures of the creature lookups
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Lookup matched no rows; the message goes to the client as-is
    #[error("{0}")]
    NotFound(String),
    /// Store unavailable or a row failed validation; never shown to clients
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn pokemon_not_found() -> Self {
        Self::NotFound("Pokémon not found".to_string())
    }

    pub fn type_not_found(type_name: &str) -> Self {
        Self::NotFound(format!("No Pokémon found with type {type_name}"))
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
