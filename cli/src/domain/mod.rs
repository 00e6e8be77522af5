//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod scp;

pub use config::{AppConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, FailureKind, ScpError, TransportError};
pub use scp::{
    Direction, ManualTransfer, SshEndpoint, TransferOutcome, TransferRequest, classify,
};
