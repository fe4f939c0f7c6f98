//! Shared error type across mcpbridge crates.

use std::fmt;

use thiserror::Error;

/// Stable error codes (used in logs and metrics labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed envelope.
    ParseError,
    /// Request without a `command` field.
    MissingCommand,
    /// A required parameter is absent.
    MissingParameter,
    /// A parameter is present but of the wrong JSON type.
    InvalidParameter,
    /// Command name not in the dispatch table.
    UnknownCommand,
    /// Node/file/scene (or other host resource) absent.
    NotFound,
    /// No live host executor.
    ConnectionUnavailable,
    /// No response within the request timeout.
    Timeout,
    /// The host raised a failure while performing the effect.
    HostExecution,
    /// Internal / startup failure.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::MissingCommand => "MISSING_COMMAND",
            ErrorCode::MissingParameter => "MISSING_PARAMETER",
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::UnknownCommand => "UNKNOWN_COMMAND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ConnectionUnavailable => "CONNECTION_UNAVAILABLE",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::HostExecution => "HOST_EXECUTION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Kind of host resource named by a `NotFound` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Node,
    File,
    Scene,
    Directory,
    Property,
    Method,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Node => "Node",
            ResourceKind::File => "File",
            ResourceKind::Scene => "Scene",
            ResourceKind::Directory => "Directory",
            ResourceKind::Property => "Property",
            ResourceKind::Method => "Method",
        };
        f.write_str(s)
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type used by core, gateway and executor.
///
/// The `Display` text is what controllers see in the `error` field of an
/// error envelope.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error("Invalid JSON: {0}")]
    Parse(String),
    #[error("Missing 'command' field in request")]
    MissingCommand,
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),
    #[error("Invalid parameter '{key}': expected {expected}")]
    InvalidParameter { key: String, expected: &'static str },
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },
    #[error("Executor not initialized")]
    ConnectionUnavailable,
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Host execution failed: {0}")]
    HostExecution(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BridgeError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        BridgeError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_parameter(key: impl Into<String>, expected: &'static str) -> Self {
        BridgeError::InvalidParameter {
            key: key.into(),
            expected,
        }
    }

    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::Parse(_) => ErrorCode::ParseError,
            BridgeError::MissingCommand => ErrorCode::MissingCommand,
            BridgeError::MissingParameter(_) => ErrorCode::MissingParameter,
            BridgeError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            BridgeError::UnknownCommand(_) => ErrorCode::UnknownCommand,
            BridgeError::NotFound { .. } => ErrorCode::NotFound,
            BridgeError::ConnectionUnavailable => ErrorCode::ConnectionUnavailable,
            BridgeError::Timeout(_) => ErrorCode::Timeout,
            BridgeError::HostExecution(_) => ErrorCode::HostExecution,
            BridgeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
