use thiserror::Error;

/// Chainbase errors.
#[derive(Error, Debug)]
pub enum ChainbaseError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupted record in table {table}: {source}")]
    Corrupted {
        table: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("illegal snapshot state: {0}")]
    StateViolation(String),
}

impl ChainbaseError {
    pub(crate) fn state(message: impl Into<String>) -> Self {
        Self::StateViolation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ChainbaseError>;
