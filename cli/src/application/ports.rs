//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`; never from `crate::infra`,
//! `crate::commands`, or `crate::output`.
//!
//! Every port is synchronous: the scp command runs to completion on one
//! thread and only blocks on network I/O inside the adapters.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::{AppConfig, SshEndpoint, TransportError};

// ── Application Metadata Port ─────────────────────────────────────────────────

/// Looks up hosted applications.
pub trait ApplicationDirectory {
    /// Resolve the SSH endpoint of `application`.
    ///
    /// # Errors
    ///
    /// Returns `ScpError::ApplicationNotFound` for unknown applications, or
    /// any lookup failure of the backing service.
    fn ssh_endpoint(&self, application: &str) -> Result<SshEndpoint>;
}

// ── Settings and Platform Ports ───────────────────────────────────────────────

/// Read-only view of the settings the scp command consumes.
pub trait ScpSettings {
    /// Path of a user-preferred ssh executable, if one is configured.
    fn ssh_executable(&self) -> Option<String>;
}

/// Host platform capabilities.
pub trait Platform {
    /// Returns `true` when running on Windows.
    fn is_windows(&self) -> bool;
}

/// Abstracts local filesystem checks.
pub trait LocalFs {
    /// Returns `true` if `path` exists (file or directory).
    fn exists(&self, path: &Path) -> bool;
}

// ── Transport Port ────────────────────────────────────────────────────────────

/// SSH-backed file transfer.
///
/// Implementations connect, authenticate and stream in one blocking call and
/// never retry. Failures are reported as a [`TransportError`] variant.
pub trait ScpTransport {
    /// Copy `local` to `remote` on `host`, logging in as `user`.
    ///
    /// # Errors
    ///
    /// Returns the transport failure category.
    fn upload(
        &self,
        host: &str,
        user: &str,
        local: &Path,
        remote: &str,
    ) -> Result<(), TransportError>;

    /// Copy `remote` on `host` to `local`, logging in as `user`.
    ///
    /// # Errors
    ///
    /// Returns the transport failure category.
    fn download(
        &self,
        host: &str,
        user: &str,
        remote: &str,
        local: &Path,
    ) -> Result<(), TransportError>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence (load/save).
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<AppConfig>;
    /// Persist the configuration.
    fn save(&self, config: &AppConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
