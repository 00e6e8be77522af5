//! Application service: `appctl scp` use-case.
//!
//! Orchestrates direction parsing, local path validation, endpoint lookup,
//! the custom ssh client check and the transfer itself. Every failure is
//! terminal; nothing is retried.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::application::ports::{
    ApplicationDirectory, LocalFs, Platform, ScpSettings, ScpTransport,
};
use crate::domain::error::ScpError;
use crate::domain::scp::{
    Direction, ManualTransfer, SshEndpoint, TransferOutcome, TransferRequest, classify,
};

/// Raw operands of one `appctl scp` invocation.
#[derive(Debug, Clone, Copy)]
pub struct ScpInvocation<'a> {
    pub application: &'a str,
    pub direction: &'a str,
    pub first: &'a str,
    pub second: &'a str,
}

/// Non-error outcomes of the scp use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScpOutcome {
    /// The transfer completed.
    Transferred(TransferRequest),
    /// A custom ssh executable is configured; the user must run the transfer.
    ManualTransfer(ManualTransfer),
}

/// Runs the scp use-case end to end.
///
/// # Errors
///
/// Returns a [`ScpError`] (wrapped in `anyhow`) for invalid arguments, a
/// missing local path or a classified transport failure, and passes endpoint
/// lookup errors through unchanged.
pub fn run_scp(
    invocation: &ScpInvocation<'_>,
    fs: &impl LocalFs,
    directory: &impl ApplicationDirectory,
    settings: &impl ScpSettings,
    platform: &impl Platform,
    transport: &impl ScpTransport,
) -> Result<ScpOutcome> {
    let request = prepare_request(invocation, fs)?;
    complete_request(request, directory, settings, platform, transport)
}

/// Local checks that need neither configuration nor network: direction
/// parsing and the local path check.
///
/// # Errors
///
/// Returns [`ScpError::InvalidArgument`] or [`ScpError::LocalPathNotFound`].
pub fn prepare_request(
    invocation: &ScpInvocation<'_>,
    fs: &impl LocalFs,
) -> Result<TransferRequest, ScpError> {
    let request = TransferRequest::new(
        invocation.application,
        invocation.direction,
        invocation.first,
        invocation.second,
    )?;
    debug!(
        application = %request.application,
        direction = %request.direction,
        local = %request.local_path,
        remote = %request.remote_path,
        "scp request"
    );

    validate_local_path(fs, &request)?;
    Ok(request)
}

/// Remote half of the use-case: endpoint lookup, the custom client check
/// and the transfer.
///
/// # Errors
///
/// Passes endpoint lookup errors through and returns the classified
/// [`ScpError`] for transfer failures.
pub fn complete_request(
    request: TransferRequest,
    directory: &impl ApplicationDirectory,
    settings: &impl ScpSettings,
    platform: &impl Platform,
    transport: &impl ScpTransport,
) -> Result<ScpOutcome> {
    let endpoint = resolve_endpoint(directory, &request.application)?;

    if let Some(manual) = detect_custom_client(settings, platform, &request, &endpoint) {
        return Ok(ScpOutcome::ManualTransfer(manual));
    }

    execute_transfer(transport, &endpoint, &request)?;
    Ok(ScpOutcome::Transferred(request))
}

/// Fails fast when the local operand does not exist.
///
/// # Errors
///
/// Returns [`ScpError::LocalPathNotFound`].
pub fn validate_local_path(fs: &impl LocalFs, request: &TransferRequest) -> Result<(), ScpError> {
    if fs.exists(Path::new(&request.local_path)) {
        Ok(())
    } else {
        Err(ScpError::LocalPathNotFound(request.local_path.clone()))
    }
}

/// Looks up the application's SSH endpoint.
///
/// # Errors
///
/// Propagates the directory's error unchanged.
pub fn resolve_endpoint(
    directory: &impl ApplicationDirectory,
    application: &str,
) -> Result<SshEndpoint> {
    let endpoint = directory.ssh_endpoint(application)?;
    debug!(host = %endpoint.host, user = %endpoint.user, "resolved ssh endpoint");
    Ok(endpoint)
}

/// Returns manual instructions when a custom ssh executable is configured.
pub fn detect_custom_client(
    settings: &impl ScpSettings,
    platform: &impl Platform,
    request: &TransferRequest,
    endpoint: &SshEndpoint,
) -> Option<ManualTransfer> {
    let executable = settings.ssh_executable()?;
    info!(executable = %executable, "custom ssh executable configured; skipping transfer");
    Some(ManualTransfer::new(
        &executable,
        request,
        endpoint,
        platform.is_windows(),
    ))
}

/// Calls the transport once and classifies any failure.
///
/// # Errors
///
/// Returns the classified [`ScpError`].
pub fn execute_transfer(
    transport: &impl ScpTransport,
    endpoint: &SshEndpoint,
    request: &TransferRequest,
) -> TransferOutcome {
    let local = Path::new(&request.local_path);
    let result = match request.direction {
        Direction::Upload => transport.upload(
            &endpoint.host,
            &endpoint.user,
            local,
            &request.remote_path,
        ),
        Direction::Download => transport.download(
            &endpoint.host,
            &endpoint.user,
            &request.remote_path,
            local,
        ),
    };

    result.map_err(|e| {
        let classified = classify(&e, endpoint);
        warn!(kind = ?classified.kind(), error = %e, "transfer failed");
        classified
    })
}
