use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WSL action requested by the caller.
///
/// The set is closed: every variant has exactly one argv template in the
/// command table of the CLI crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    List,
    Create,
    Delete,
    Import,
    Export,
    Run,
    SetDefault,
    Terminate,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 8] = [
        Self::List,
        Self::Create,
        Self::Delete,
        Self::Import,
        Self::Export,
        Self::Run,
        Self::SetDefault,
        Self::Terminate,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Import => "import",
            Self::Export => "export",
            Self::Run => "run",
            Self::SetDefault => "set-default",
            Self::Terminate => "terminate",
        }
    }

    /// Operations that may be repeated without side effects.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::List)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation '{0}'")]
pub struct ParseOperationError(pub String);

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseOperationError(s.to_string()))
    }
}

/// Closed taxonomy of failures surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidName,
    PathTraversal,
    UnsupportedOperation,
    RateLimited,
    WslNotInstalled,
    DistributionNotFound,
    DistributionAlreadyExists,
    OperationTimedOut,
    NetworkUnavailable,
    PermissionDenied,
    UnknownError,
}

impl ErrorKind {
    /// Stable machine-readable code, used in JSON error objects.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidName => "INVALID_NAME",
            Self::PathTraversal => "PATH_TRAVERSAL",
            Self::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            Self::RateLimited => "RATE_LIMITED",
            Self::WslNotInstalled => "WSL_NOT_INSTALLED",
            Self::DistributionNotFound => "DISTRIBUTION_NOT_FOUND",
            Self::DistributionAlreadyExists => "DISTRIBUTION_ALREADY_EXISTS",
            Self::OperationTimedOut => "OPERATION_TIMED_OUT",
            Self::NetworkUnavailable => "NETWORK_UNAVAILABLE",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
