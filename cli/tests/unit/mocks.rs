//! Shared mock infrastructure for unit tests.
//!
//! Hand-written recording fakes for the lookup ports, and a `mockall` transport
//! so tests can assert exact call counts and arguments.

#![allow(clippy::expect_used, dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use appctl_cli::application::ports::{
    ApplicationDirectory, LocalFs, Platform, ScpSettings, ScpTransport,
};
use appctl_cli::domain::{ScpError, SshEndpoint, TransportError};

pub const HOST: &str = "127.0.0.1";
pub const USER: &str = "fakeuuidfortestsapp1";
pub const SSH_PATH: &str = "/usr/bin/ssh";

// ── Mock: transport ───────────────────────────────────────────────────────────

mockall::mock! {
    pub Transport {}

    impl ScpTransport for Transport {
        fn upload(
            &self,
            host: &str,
            user: &str,
            local: &Path,
            remote: &str,
        ) -> Result<(), TransportError>;

        fn download(
            &self,
            host: &str,
            user: &str,
            remote: &str,
            local: &Path,
        ) -> Result<(), TransportError>;
    }
}

/// A transport that must never be called.
pub fn untouched_transport() -> MockTransport {
    let mut transport = MockTransport::new();
    transport.expect_upload().never();
    transport.expect_download().never();
    transport
}

// ── Mock: local filesystem ────────────────────────────────────────────────────

/// Reports only the listed paths as existing and records every check.
pub struct FakeFs {
    existing: Vec<PathBuf>,
    checked: Mutex<Vec<PathBuf>>,
}

impl FakeFs {
    pub fn with(paths: &[&str]) -> Self {
        Self {
            existing: paths.iter().map(PathBuf::from).collect(),
            checked: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with(&[])
    }

    pub fn checked(&self) -> Vec<PathBuf> {
        self.checked.lock().expect("lock").clone()
    }
}

impl LocalFs for FakeFs {
    fn exists(&self, path: &Path) -> bool {
        self.checked.lock().expect("lock").push(path.to_path_buf());
        self.existing.iter().any(|p| p == path)
    }
}

// ── Mock: application directory ───────────────────────────────────────────────

/// Knows a single application, `app1`, at the test endpoint.
pub struct FakeDirectory {
    lookups: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().expect("lock").len()
    }
}

impl ApplicationDirectory for FakeDirectory {
    fn ssh_endpoint(&self, application: &str) -> Result<SshEndpoint> {
        self.lookups
            .lock()
            .expect("lock")
            .push(application.to_string());
        if application == "app1" {
            Ok(SshEndpoint::new(HOST, USER))
        } else {
            Err(ScpError::ApplicationNotFound(application.to_string()).into())
        }
    }
}

// ── Mock: settings and platform ───────────────────────────────────────────────

pub struct FakeSettings(pub Option<String>);

impl FakeSettings {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn custom_ssh() -> Self {
        Self(Some(SSH_PATH.to_string()))
    }
}

impl ScpSettings for FakeSettings {
    fn ssh_executable(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Injected platform predicate that counts how often it is consulted.
pub struct FakePlatform {
    windows: bool,
    calls: Mutex<u32>,
}

impl FakePlatform {
    pub fn windows() -> Self {
        Self {
            windows: true,
            calls: Mutex::new(0),
        }
    }

    pub fn linux() -> Self {
        Self {
            windows: false,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().expect("lock")
    }
}

impl Platform for FakePlatform {
    fn is_windows(&self) -> bool {
        *self.calls.lock().expect("lock") += 1;
        self.windows
    }
}
