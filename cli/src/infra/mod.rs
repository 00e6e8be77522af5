//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the broker HTTP client, the
//! libssh2 transport, configuration persistence and host checks.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod broker;
pub mod config;
pub mod fs;
pub mod platform;
pub mod transport;
