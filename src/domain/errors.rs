use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DomainError::NotFound(format!("{} {}", entity, id))
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        DomainError::InvalidRequest(msg.into())
    }
}
