use thiserror::Error;

/// Errors raised when constructing or validating model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid member id: {0:?}")]
    InvalidMemberId(String),
    #[error("member name must not be empty")]
    EmptyName,
    #[error("generation must be at least 1 (got {0})")]
    InvalidGeneration(i64),
    #[error("unknown gender code: {0:?}")]
    UnknownGenderCode(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
