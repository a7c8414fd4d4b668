//! Persistence error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("MongoDB connection error: {0}")]
    Connection(String),

    #[error("MongoDB query error: {0}")]
    Query(String),
}

impl From<mongodb::error::Error> for PersistenceError {
    fn from(e: mongodb::error::Error) -> Self {
        PersistenceError::Query(e.to_string())
    }
}
