//! Error types for selection backend operations.

use std::fmt;

use thiserror::Error;

/// Backend operation, used to give failures context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Get,
    Delete,
    Clear,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Delete => "delete",
            Operation::Clear => "clear",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur while talking to the selection backend.
///
/// Every variant is a failed request from the user's point of view; none of them
/// is retried automatically.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The backend answered with a non-success status
    #[error("Request to {operation} selections failed ({status}): {message}")]
    RequestFailed {
        /// Operation that failed
        operation: Operation,
        /// HTTP status code
        status: u16,
        /// Error body returned by the backend
        message: String,
    },

    /// The request never got a response
    #[error("Request to {operation} selections failed: {message}")]
    Network {
        /// Operation that failed
        operation: Operation,
        /// Transport error description
        message: String,
    },

    /// The response body was not what the protocol expects
    #[error("Invalid response to {operation}: {source}")]
    Decode {
        /// Operation whose response was malformed
        operation: Operation,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized
    #[error("Could not encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PersistenceError {
    /// Create a request-failed error.
    pub fn request_failed(operation: Operation, status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            operation,
            status,
            message: message.into(),
        }
    }

    /// Create a network error.
    pub fn network(operation: Operation, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            message: message.into(),
        }
    }

    /// HTTP status of the failed request, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short text suitable for a status bar or alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::RequestFailed {
                operation, message, ..
            } if !message.is_empty() => format!("Could not {} selection: {}", operation, message),
            Self::RequestFailed {
                operation, status, ..
            } => format!("Could not {} selection (error {})", operation, status),
            Self::Network { operation, .. } => {
                format!("Could not {} selection: server unreachable", operation)
            }
            Self::Decode { operation, .. } => {
                format!("Could not {} selection: unexpected server response", operation)
            }
            Self::Encode(_) => "Could not prepare the selection for saving".to_string(),
        }
    }
}
