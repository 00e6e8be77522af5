//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Scp errors ────────────────────────────────────────────────────────────────

/// User-facing failures of `appctl scp`.
///
/// Every variant terminates the command with a non-zero exit status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScpError {
    #[error("'{0}' is not a valid argument for this command. Please use upload or download.")]
    InvalidArgument(String),

    #[error("Local file, file_path, or directory could not be found.")]
    LocalPathNotFound(String),

    #[error("Application '{0}' not found.")]
    ApplicationNotFound(String),

    #[error("The server {user} refused a connection with user {host}. The application may be unavailable.")]
    ConnectionRefused { host: String, user: String },

    #[error("The connection to {host} failed: {cause}")]
    SocketFailure { host: String, cause: String },

    #[error("Authentication to server {host} with user {user} failed")]
    AuthenticationFailed { host: String, user: String },

    #[error("An unknown error occurred: {0}")]
    UnknownTransport(String),
}

/// Classifier category of an [`ScpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidArgument,
    LocalPathNotFound,
    ApplicationNotFound,
    ConnectionRefused,
    SocketFailure,
    AuthenticationFailed,
    UnknownTransportError,
}

impl ScpError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidArgument(_) => FailureKind::InvalidArgument,
            Self::LocalPathNotFound(_) => FailureKind::LocalPathNotFound,
            Self::ApplicationNotFound(_) => FailureKind::ApplicationNotFound,
            Self::ConnectionRefused { .. } => FailureKind::ConnectionRefused,
            Self::SocketFailure { .. } => FailureKind::SocketFailure,
            Self::AuthenticationFailed { .. } => FailureKind::AuthenticationFailed,
            Self::UnknownTransport(_) => FailureKind::UnknownTransportError,
        }
    }
}

// ── Transport errors ──────────────────────────────────────────────────────────

/// Failures reported by an SCP transport implementation.
///
/// Consumers classify these by variant, never by message text. New variants
/// fall through to the generic arm of `domain::scp::classify`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("connection refused")]
    ConnectionRefused,

    /// DNS or socket level failure, carrying the failure class name.
    #[error("{0}")]
    Socket(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    /// SSH or SCP protocol error reported by the remote side or libssh2.
    #[error("{0}")]
    Protocol(String),

    /// Local file I/O failure while streaming.
    #[error("{0}")]
    Io(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },

    #[error("No application server configured. Run 'appctl config set server <url>' or set APPCTL_SERVER.")]
    MissingServer,

    #[error("No namespace configured. Pass --namespace or run 'appctl config set namespace <name>'.")]
    MissingNamespace,
}
