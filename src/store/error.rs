// Store error types

/// Failures while reading the creature store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file could not be opened or queried (missing, locked, not a database)
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    /// A row came back that does not fit the `Pokemon` record
    #[error("row does not match the pokemon record: {0}")]
    ShapeViolation(#[source] sqlx::Error),
}

impl StoreError {
    /// Classify an error raised while running a query
    pub fn from_query(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::Decode(_) => Self::ShapeViolation(err),
            other => Self::Unavailable(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_errors_are_shape_violations() {
        let err = StoreError::from_query(sqlx::Error::ColumnNotFound("name".to_string()));
        assert!(matches!(err, StoreError::ShapeViolation(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_other_errors_are_unavailable() {
        let err = StoreError::from_query(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
