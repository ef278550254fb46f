//! Database connection handling for the RSVP service
//!
//! Provides the connection pool used by all persistence code and the common
//! [`DatabaseError`] type which query code maps diesel errors into.
use diesel::r2d2::ConnectionManager;
use diesel::result::Error;
use diesel::{r2d2, PgConnection};

mod db;

pub use db::Db;

pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("database error: {0}")]
    Custom(String),
    #[error("diesel error: {0}")]
    DieselError(diesel::result::Error),
    #[error("the requested record was not found")]
    NotFound,
    #[error("connection pool error: {0}")]
    R2D2Error(String),
}

impl From<Error> for DatabaseError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound => Self::NotFound,
            _ => Self::DieselError(err),
        }
    }
}

/// Pendant to diesel's `OptionalExtension`, mapping `NotFound` back to `None`
pub trait OptionalExt<T, E> {
    fn optional(self) -> Result<Option<T>, E>;
}

impl<T> OptionalExt<T, DatabaseError> for Result<T, DatabaseError> {
    fn optional(self) -> Result<Option<T>, DatabaseError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(DatabaseError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
