//! Queueing error types.

use thiserror::Error;

/// Errors that can occur during queue and pool registry operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("unknown queueing strategy: {0:?}")]
    UnknownStrategy(String),

    #[error("queue already exists: {0}")]
    QueueAlreadyExists(String),

    #[error("queue not found: {0}")]
    QueueNotFound(String),

    #[error("cluster queue already exists: {0}")]
    ClusterQueueAlreadyExists(String),

    #[error("cluster queue not found: {0}")]
    ClusterQueueNotFound(String),
}

pub type QueueResult<T> = Result<T, QueueError>;
