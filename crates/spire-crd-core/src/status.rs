use serde::Serialize;

use crate::{ErrorKind, FederationError, FederationRelationship, TrustDomain};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    Ok,
    Failure { kind: ErrorKind, message: String },
}

impl Status {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Status::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Status::Ok => None,
            Status::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Failure { kind, .. } => kind.code(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Ok => "OK",
            Status::Failure { message, .. } => message,
        }
    }
}

impl From<&FederationError> for Status {
    fn from(err: &FederationError) -> Self {
        Status::failure(err.kind(), err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchCreateResult {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation_relationship: Option<FederationRelationship>,
}

impl BatchCreateResult {
    pub fn ok(relationship: FederationRelationship) -> Self {
        Self {
            status: Status::Ok,
            federation_relationship: Some(relationship),
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: Status::failure(kind, message),
            federation_relationship: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchDeleteResult {
    pub status: Status,
    pub trust_domain: TrustDomain,
}
