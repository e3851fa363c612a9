use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("invalid permission key: {0}")]
    InvalidPermissionKey(String),
}

pub type AuthzResult<T> = Result<T, AuthzError>;
