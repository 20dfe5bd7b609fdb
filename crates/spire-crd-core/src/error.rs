use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Parse,
    NotFound,
    AlreadyExists,
    Conflict,
    Unavailable,
    DeadlineExceeded,
}

impl ErrorKind {
    /// Numeric code in the gRPC status space, so callers bridging to a SPIRE
    /// API surface can forward it unchanged.
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::Validation => 3,
            ErrorKind::DeadlineExceeded => 4,
            ErrorKind::NotFound => 5,
            ErrorKind::AlreadyExists => 6,
            ErrorKind::Conflict => 10,
            ErrorKind::Parse => 13,
            ErrorKind::Unavailable => 14,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Parse => "parse",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FederationError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("unparsable stored resource: {0}")]
    Parse(String),

    #[error("federation relationship not found: {0}")]
    NotFound(String),

    #[error("federation relationship already exists: {0}")]
    AlreadyExists(String),

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FederationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FederationError::Validation(_) | FederationError::InvalidConfig(_) => {
                ErrorKind::Validation
            }
            FederationError::Parse(_) => ErrorKind::Parse,
            FederationError::NotFound(_) => ErrorKind::NotFound,
            FederationError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            FederationError::Conflict(_) => ErrorKind::Conflict,
            FederationError::Unavailable(_) => ErrorKind::Unavailable,
            FederationError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }

    /// The message without the kind prefix that `Display` adds.
    pub fn detail(&self) -> &str {
        match self {
            FederationError::Validation(s)
            | FederationError::Parse(s)
            | FederationError::NotFound(s)
            | FederationError::AlreadyExists(s)
            | FederationError::Conflict(s)
            | FederationError::Unavailable(s)
            | FederationError::InvalidConfig(s) => s,
            FederationError::DeadlineExceeded => "deadline exceeded",
        }
    }
}

pub type Result<T> = std::result::Result<T, FederationError>;
