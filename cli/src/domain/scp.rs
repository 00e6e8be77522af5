//! Domain types for `appctl scp`: direction parsing, endpoints, failure
//! classification and the manual-transfer instructions.
//!
//! Pure functions only: no I/O, no filesystem access.

use std::fmt;

use anyhow::Context as _;
use url::Url;

use crate::domain::error::{ScpError, TransportError};

/// Result of a single transfer attempt.
pub type TransferOutcome = Result<(), ScpError>;

// ── Direction ─────────────────────────────────────────────────────────────────

/// Transfer direction relative to the local machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

impl Direction {
    /// Parses the direction token. Only the exact lowercase words are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ScpError::InvalidArgument`] naming the token otherwise.
    pub fn parse(token: &str) -> Result<Self, ScpError> {
        match token {
            "upload" => Ok(Self::Upload),
            "download" => Ok(Self::Download),
            other => Err(ScpError::InvalidArgument(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Download => f.write_str("download"),
        }
    }
}

// ── Transfer request ──────────────────────────────────────────────────────────

/// A single scp invocation with local and remote roles assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub application: String,
    pub direction: Direction,
    pub local_path: String,
    pub remote_path: String,
}

impl TransferRequest {
    /// Builds a request from the raw command operands.
    ///
    /// For `upload` the first path is the local source and the second the
    /// remote destination. For `download` the first path is the remote source
    /// and the second the local destination.
    ///
    /// # Errors
    ///
    /// Returns [`ScpError::InvalidArgument`] for an unknown direction token.
    pub fn new(
        application: &str,
        direction: &str,
        first: &str,
        second: &str,
    ) -> Result<Self, ScpError> {
        let direction = Direction::parse(direction)?;
        let (local_path, remote_path) = match direction {
            Direction::Upload => (first, second),
            Direction::Download => (second, first),
        };
        Ok(Self {
            application: application.to_string(),
            direction,
            local_path: local_path.to_string(),
            remote_path: remote_path.to_string(),
        })
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// SSH access point of an application container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshEndpoint {
    /// Hostname or IP address.
    pub host: String,
    /// Application-scoped login (a UUID-style identifier).
    pub user: String,
}

impl SshEndpoint {
    #[must_use]
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
        }
    }

    /// Parses an application `ssh_url` such as `ssh://<uuid>@<host>`.
    ///
    /// A missing `ssh://` scheme, a trailing slash and an explicit port are
    /// tolerated; the port is dropped. IPv6 hosts lose their brackets.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL cannot be parsed or has no user or host.
    pub fn from_ssh_url(ssh_url: &str) -> anyhow::Result<Self> {
        let parsed = if ssh_url.contains("://") {
            Url::parse(ssh_url)
        } else {
            Url::parse(&format!("ssh://{ssh_url}"))
        }
        .with_context(|| format!("invalid ssh url: {ssh_url}"))?;

        let user = parsed.username();
        anyhow::ensure!(!user.is_empty(), "invalid ssh url (missing user): {ssh_url}");
        let host = parsed
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| anyhow::anyhow!("invalid ssh url (missing host): {ssh_url}"))?;
        Ok(Self::new(host, user))
    }

    /// Renders `user@host:path`, bracketing IPv6 hosts.
    #[must_use]
    pub fn qualify(&self, path: &str) -> String {
        if self.host.contains(':') {
            format!("{}@[{}]:{path}", self.user, self.host)
        } else {
            format!("{}@{}:{path}", self.user, self.host)
        }
    }
}

// ── Classification ────────────────────────────────────────────────────────────

/// Maps a transport failure to the user-facing error for `endpoint`.
#[must_use]
pub fn classify(error: &TransportError, endpoint: &SshEndpoint) -> ScpError {
    match error {
        TransportError::ConnectionRefused => ScpError::ConnectionRefused {
            host: endpoint.host.clone(),
            user: endpoint.user.clone(),
        },
        TransportError::Socket(class) => ScpError::SocketFailure {
            host: endpoint.host.clone(),
            cause: class.clone(),
        },
        TransportError::AuthenticationFailed => ScpError::AuthenticationFailed {
            host: endpoint.host.clone(),
            user: endpoint.user.clone(),
        },
        other => ScpError::UnknownTransport(other.to_string()),
    }
}

// ── Manual transfer ───────────────────────────────────────────────────────────

/// Instructions shown instead of transferring when a custom ssh executable
/// is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualTransfer {
    /// The configured ssh executable.
    pub executable: String,
    /// Equivalent `scp` command line.
    pub command: String,
    /// Whether the host is Windows, where no `scp` ships by default.
    pub windows: bool,
}

impl ManualTransfer {
    #[must_use]
    pub fn new(
        executable: &str,
        request: &TransferRequest,
        endpoint: &SshEndpoint,
        windows: bool,
    ) -> Self {
        Self {
            executable: executable.to_string(),
            command: scp_command(executable, request, endpoint),
            windows,
        }
    }

    /// Lines to print, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        if self.windows {
            vec![format!(
                "User specified a ssh executable ({}). On Windows, file transfers with a custom \
                 ssh executable cannot be used with this command. Please run the transfer manually.",
                self.executable
            )]
        } else {
            vec![
                format!(
                    "User specified a ssh executable ({}). The following command can usually be \
                     used to perform the same transfer manually:",
                    self.executable
                ),
                self.command.clone(),
            ]
        }
    }
}

/// Renders `scp -S <exe> <src> <dst>` with the remote operand quoted.
#[must_use]
pub fn scp_command(executable: &str, request: &TransferRequest, endpoint: &SshEndpoint) -> String {
    let remote = format!("'{}'", endpoint.qualify(&request.remote_path));
    match request.direction {
        Direction::Upload => format!("scp -S {executable} {} {remote}", request.local_path),
        Direction::Download => format!("scp -S {executable} {remote} {}", request.local_path),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
