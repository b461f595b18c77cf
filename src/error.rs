//! Error types for ai-service.
//!
//! Every capability call either returns its normalized result or exactly one
//! [`ServiceError`]. Errors are never swallowed or replaced by defaults.

use std::time::Duration;
use thiserror::Error;

use crate::capability::Capability;
use crate::router::BackendId;

/// The error returned by every [`AiService`](crate::AiService) operation.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// No credential is available for the capability family, or the
    /// configuration itself is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A synchronous backend call failed (network, non-success status, rejected job).
    #[error("{backend} request failed{}: {message}", status_suffix(.status))]
    ProviderRequest {
        backend: BackendId,
        status: Option<u16>,
        message: String,
    },

    /// A job backend did not reach a terminal state within the poll budget.
    #[error("{backend} job did not finish after {attempts} status checks ({elapsed:?})")]
    ProviderTimeout {
        backend: BackendId,
        attempts: u32,
        elapsed: Duration,
    },

    /// The backend answered, but the payload cannot be coerced into the
    /// capability's result shape.
    #[error("Malformed {capability} response: {message}")]
    MalformedResponse {
        capability: Capability,
        message: String,
    },

    /// The caller's input was rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The call was cancelled through a [`CancelHandle`](crate::cancel::CancelHandle).
    #[error("Operation cancelled")]
    Cancelled,
}

impl ServiceError {
    pub fn provider(backend: BackendId, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ProviderRequest {
            backend,
            status,
            message: message.into(),
        }
    }

    pub fn malformed(capability: Capability, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            capability,
            message: message.into(),
        }
    }

    /// HTTP status of a failed provider request, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ProviderRequest { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether a retry policy may re-issue the request that produced this error.
    ///
    /// Only transport failures and transient HTTP statuses qualify; timeouts of
    /// job polling, malformed payloads and configuration problems never do.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProviderRequest { status: None, .. } => true,
            Self::ProviderRequest {
                status: Some(code), ..
            } => matches!(*code, 408 | 429 | 500..=599),
            _ => false,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ProviderTimeout { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ServiceError>;
