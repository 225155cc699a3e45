//! Error types for the wishpage-store crate

use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in item store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row with this id
    #[error("couldn't find an item with id {0}")]
    ItemNotFound(i64),

    /// The item has no units left to reserve
    #[error("item {0} is already reserved out")]
    ReservedOut(i64),

    /// The guarded decrement matched no row
    #[error("item {0} was exhausted by a concurrent reservation")]
    ReservationConflict(i64),

    /// The relation rejected the row (NOT NULL or CHECK)
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Backend failure
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// True when a reservation failed because no units were left
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::ReservedOut(_) | Self::ReservationConflict(_))
    }

    /// True when the id did not match any item
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => {
                    return Self::Constraint(db_err.message().to_string());
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}
