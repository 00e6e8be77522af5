//! libssh2-backed implementation of the `ScpTransport` port.
//!
//! Each call opens one session: TCP connect, handshake, agent or key-file
//! authentication, then a single SCP transfer (SFTP for directory trees).
//! libssh2 and socket errors are folded into [`TransportError`] categories.

use std::fs::File;
use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ssh2::{ErrorCode, Session, Sftp};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::application::ports::ScpTransport;
use crate::domain::error::TransportError;

/// Default SSH port of application containers.
pub const SSH_PORT: u16 = 22;

/// TCP connect and libssh2 blocking-call timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure class reported for name resolution and unclassified socket errors.
const SOCKET_ERROR: &str = "SocketError";

/// Private keys tried, in order, when the agent cannot authenticate.
const IDENTITY_FILES: &[&str] = &["id_ed25519", "id_rsa", "id_ecdsa"];

// libssh2 session error codes (`LIBSSH2_ERROR_*`).
const ERROR_SOCKET_NONE: i32 = -1;
const ERROR_BANNER_RECV: i32 = -2;
const ERROR_BANNER_SEND: i32 = -3;
const ERROR_SOCKET_SEND: i32 = -7;
const ERROR_TIMEOUT: i32 = -9;
const ERROR_SOCKET_DISCONNECT: i32 = -13;
const ERROR_AUTHENTICATION_FAILED: i32 = -18;
const ERROR_PUBLICKEY_UNVERIFIED: i32 = -19;
const ERROR_SOCKET_TIMEOUT: i32 = -30;
const ERROR_SOCKET_RECV: i32 = -43;

/// Production `ScpTransport` over libssh2.
pub struct Ssh2Transport {
    port: u16,
    timeout: Duration,
    identity_dir: Option<PathBuf>,
}

impl Default for Ssh2Transport {
    fn default() -> Self {
        Self {
            port: SSH_PORT,
            timeout: CONNECT_TIMEOUT,
            identity_dir: dirs::home_dir().map(|h| h.join(".ssh")),
        }
    }
}

impl Ssh2Transport {
    /// Connects and authenticates as `user`.
    fn open(&self, host: &str, user: &str) -> Result<Session, TransportError> {
        debug!(host, user, port = self.port, "connecting");

        let tcp = self.connect_tcp(host)?;
        let mut session = Session::new().map_err(|e| ssh_error(&e))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX));
        session.handshake().map_err(|e| ssh_error(&e))?;

        self.authenticate(&session, user)?;
        debug!(host, user, "transferring");
        Ok(session)
    }

    fn connect_tcp(&self, host: &str) -> Result<TcpStream, TransportError> {
        let addrs = (host, self.port).to_socket_addrs().map_err(|e| {
            trace!(host, error = %e, "name resolution failed");
            TransportError::Socket(SOCKET_ERROR.to_string())
        })?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    trace!(%addr, error = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.map_or_else(
            || TransportError::Socket(SOCKET_ERROR.to_string()),
            |e| connect_error(&e),
        ))
    }

    fn authenticate(&self, session: &Session, user: &str) -> Result<(), TransportError> {
        if let Err(e) = session.userauth_agent(user) {
            trace!(error = %e, "agent authentication failed");
        }

        if !session.authenticated()
            && let Some(dir) = &self.identity_dir
        {
            for name in IDENTITY_FILES {
                let key = dir.join(name);
                if !key.exists() {
                    continue;
                }
                match session.userauth_pubkey_file(user, None, &key, None) {
                    Ok(()) => break,
                    Err(e) => trace!(key = %key.display(), error = %e, "key authentication failed"),
                }
            }
        }

        if session.authenticated() {
            Ok(())
        } else {
            Err(TransportError::AuthenticationFailed)
        }
    }
}

impl ScpTransport for Ssh2Transport {
    fn upload(
        &self,
        host: &str,
        user: &str,
        local: &Path,
        remote: &str,
    ) -> Result<(), TransportError> {
        let session = self.open(host, user)?;
        let remote = remote_relative(remote);

        if local.is_dir() {
            let sftp = session.sftp().map_err(|e| ssh_error(&e))?;
            let target = upload_target(&remote, remote_is_dir(&sftp, &remote), local)?;
            upload_tree(&session, &sftp, local, &target)?;
            debug!(host, target = %target, "upload complete");
            return Ok(());
        }

        // scp-only servers have no SFTP subsystem; send to the path as given.
        let remote_dir = match session.sftp() {
            Ok(sftp) => remote_is_dir(&sftp, &remote),
            Err(e) => {
                debug!(error = %e, "sftp unavailable, skipping remote directory check");
                false
            }
        };
        let target = upload_target(&remote, remote_dir, local)?;
        send_file(&session, local, &target)?;
        debug!(host, target = %target, "upload complete");
        Ok(())
    }

    fn download(
        &self,
        host: &str,
        user: &str,
        remote: &str,
        local: &Path,
    ) -> Result<(), TransportError> {
        let session = self.open(host, user)?;
        let remote = remote_relative(remote);
        let target = match (local.is_dir(), remote_name(&remote)) {
            (true, Some(name)) => local.join(name),
            _ => local.to_path_buf(),
        };

        let sftp = match session.sftp() {
            Ok(sftp) => Some(sftp),
            Err(e) => {
                debug!(error = %e, "sftp unavailable, treating remote as a file");
                None
            }
        };
        match &sftp {
            Some(sftp) if remote_is_dir(sftp, &remote) => download_tree(sftp, &remote, &target)?,
            _ => recv_file(&session, &remote, &target)?,
        }
        debug!(host, target = %target.display(), "download complete");
        Ok(())
    }
}

// ── Transfers ─────────────────────────────────────────────────────────────────

fn send_file(session: &Session, local: &Path, remote: &str) -> Result<(), TransportError> {
    let mut file = File::open(local).map_err(|e| local_error(local, &e))?;
    let meta = file.metadata().map_err(|e| local_error(local, &e))?;
    trace!(local = %local.display(), remote, size = meta.len(), "scp send");

    let mut channel = session
        .scp_send(Path::new(remote), file_mode(&meta), meta.len(), None)
        .map_err(|e| ssh_error_at(remote, &e))?;
    io::copy(&mut file, &mut channel).map_err(|e| stream_error(&e))?;

    channel.send_eof().map_err(|e| ssh_error(&e))?;
    channel.wait_eof().map_err(|e| ssh_error(&e))?;
    channel.close().map_err(|e| ssh_error(&e))?;
    channel.wait_close().map_err(|e| ssh_error(&e))
}

fn recv_file(session: &Session, remote: &str, local: &Path) -> Result<(), TransportError> {
    let (mut channel, stat) = session
        .scp_recv(Path::new(remote))
        .map_err(|e| ssh_error_at(remote, &e))?;
    trace!(remote, local = %local.display(), size = stat.size(), "scp recv");

    let mut file = File::create(local).map_err(|e| local_error(local, &e))?;
    io::copy(&mut (&mut channel).take(stat.size()), &mut file).map_err(|e| stream_error(&e))?;

    apply_mode(local, u32::try_from(stat.mode()).unwrap_or(0o644))?;

    channel.send_eof().map_err(|e| ssh_error(&e))?;
    channel.wait_eof().map_err(|e| ssh_error(&e))?;
    channel.close().map_err(|e| ssh_error(&e))?;
    channel.wait_close().map_err(|e| ssh_error(&e))
}

/// One entry of a local tree upload.
#[derive(Debug, PartialEq, Eq)]
enum TreeEntry {
    Dir(String),
    File(PathBuf, String),
}

/// Lists `local` depth-first with remote targets under `remote`. Symlinks are
/// followed so linked files and directories are sent as regular entries.
fn plan_upload(local: &Path, remote: &str) -> Result<Vec<TreeEntry>, TransportError> {
    let mut plan = Vec::new();
    for entry in WalkDir::new(local).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| TransportError::Io(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(local)
            .map_err(|e| TransportError::Io(e.to_string()))?;
        let target = relative.components().fold(remote.to_string(), |acc, c| {
            join_remote(&acc, &c.as_os_str().to_string_lossy())
        });

        let file_type = entry.file_type();
        if file_type.is_dir() {
            plan.push(TreeEntry::Dir(target));
        } else if file_type.is_file() {
            plan.push(TreeEntry::File(entry.into_path(), target));
        } else {
            warn!(path = %entry.path().display(), "skipping special file");
        }
    }
    Ok(plan)
}

fn upload_tree(
    session: &Session,
    sftp: &Sftp,
    local: &Path,
    remote: &str,
) -> Result<(), TransportError> {
    for entry in plan_upload(local, remote)? {
        match entry {
            TreeEntry::Dir(target) => ensure_remote_dir(sftp, &target)?,
            TreeEntry::File(path, target) => send_file(session, &path, &target)?,
        }
    }
    Ok(())
}

fn download_tree(sftp: &Sftp, remote: &str, local: &Path) -> Result<(), TransportError> {
    std::fs::create_dir_all(local).map_err(|e| local_error(local, &e))?;

    let entries = sftp
        .readdir(Path::new(remote))
        .map_err(|e| ssh_error_at(remote, &e))?;
    for (path, stat) in entries {
        let Some(name) = path.file_name() else {
            continue;
        };
        let child_local = local.join(name);
        let child_remote = path.to_string_lossy();

        if stat.is_dir() {
            download_tree(sftp, &child_remote, &child_local)?;
        } else if stat.is_file() {
            trace!(remote = %child_remote, "sftp fetch");
            let mut source = sftp.open(&path).map_err(|e| ssh_error_at(&child_remote, &e))?;
            let mut file =
                File::create(&child_local).map_err(|e| local_error(&child_local, &e))?;
            io::copy(&mut source, &mut file).map_err(|e| stream_error(&e))?;
            if let Some(perm) = stat.perm {
                apply_mode(&child_local, perm)?;
            }
        }
    }
    Ok(())
}

fn remote_is_dir(sftp: &Sftp, remote: &str) -> bool {
    sftp.stat(Path::new(remote)).is_ok_and(|stat| stat.is_dir())
}

fn ensure_remote_dir(sftp: &Sftp, path: &str) -> Result<(), TransportError> {
    match sftp.stat(Path::new(path)) {
        Ok(stat) if stat.is_dir() => Ok(()),
        _ => sftp
            .mkdir(Path::new(path), 0o755)
            .map_err(|e| ssh_error_at(path, &e)),
    }
}

// ── Paths ─────────────────────────────────────────────────────────────────────

/// Remote paths are relative to the login directory; `~` is not expanded by
/// the remote scp, so strip it.
fn remote_relative(path: &str) -> String {
    match path {
        "" | "~" | "~/" => ".".to_string(),
        _ => path.strip_prefix("~/").unwrap_or(path).to_string(),
    }
}

fn join_remote(base: &str, name: &str) -> String {
    if name.is_empty() {
        return base.to_string();
    }
    format!("{}/{name}", base.trim_end_matches('/'))
}

fn remote_name(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
}

fn local_name(local: &Path) -> Result<String, TransportError> {
    let absolute = std::fs::canonicalize(local).map_err(|e| local_error(local, &e))?;
    absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransportError::Io(format!("{}: cannot determine file name", local.display())))
}

/// Picks the remote file path: inside `remote` when it is an existing
/// directory, otherwise `remote` itself.
fn upload_target(remote: &str, remote_is_dir: bool, local: &Path) -> Result<String, TransportError> {
    if remote_is_dir {
        Ok(join_remote(remote, &local_name(local)?))
    } else {
        Ok(remote.to_string())
    }
}

/// Sets the permission bits of a downloaded file. No-op off Unix.
#[cfg(unix)]
fn apply_mode(local: &Path, mode: u32) -> Result<(), TransportError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(local, std::fs::Permissions::from_mode(mode & 0o777))
        .map_err(|e| local_error(local, &e))
}

#[cfg(not(unix))]
fn apply_mode(_local: &Path, _mode: u32) -> Result<(), TransportError> {
    Ok(())
}

#[cfg(unix)]
fn file_mode(meta: &std::fs::Metadata) -> i32 {
    use std::os::unix::fs::PermissionsExt;
    i32::try_from(meta.permissions().mode() & 0o777).unwrap_or(0o644)
}

#[cfg(not(unix))]
fn file_mode(_meta: &std::fs::Metadata) -> i32 {
    0o644
}

// ── Error mapping ─────────────────────────────────────────────────────────────

fn connect_error(e: &io::Error) -> TransportError {
    use io::ErrorKind as K;
    match e.kind() {
        K::ConnectionRefused => TransportError::ConnectionRefused,
        kind @ (K::TimedOut
        | K::ConnectionReset
        | K::ConnectionAborted
        | K::NotConnected
        | K::AddrInUse
        | K::AddrNotAvailable
        | K::HostUnreachable
        | K::NetworkUnreachable
        | K::NetworkDown
        | K::PermissionDenied) => TransportError::Socket(format!("{kind:?}")),
        _ => TransportError::Socket(SOCKET_ERROR.to_string()),
    }
}

fn ssh_error(e: &ssh2::Error) -> TransportError {
    match e.code() {
        ErrorCode::Session(ERROR_AUTHENTICATION_FAILED | ERROR_PUBLICKEY_UNVERIFIED) => {
            TransportError::AuthenticationFailed
        }
        ErrorCode::Session(code) => match socket_class(code) {
            Some(class) => TransportError::Socket(class.to_string()),
            None => TransportError::Protocol(e.message().to_string()),
        },
        ErrorCode::SFTP(_) => TransportError::Protocol(e.message().to_string()),
    }
}

fn ssh_error_at(path: &str, e: &ssh2::Error) -> TransportError {
    match ssh_error(e) {
        TransportError::Protocol(message) => TransportError::Protocol(format!("{path}: {message}")),
        other => other,
    }
}

fn stream_error(e: &io::Error) -> TransportError {
    match e.get_ref().and_then(|inner| inner.downcast_ref::<ssh2::Error>()) {
        Some(ssh) => ssh_error(ssh),
        None => TransportError::Io(e.to_string()),
    }
}

fn local_error(path: &Path, e: &io::Error) -> TransportError {
    TransportError::Io(format!("{}: {e}", path.display()))
}

fn socket_class(code: i32) -> Option<&'static str> {
    match code {
        ERROR_SOCKET_NONE => Some(SOCKET_ERROR),
        ERROR_BANNER_RECV | ERROR_BANNER_SEND => Some("BannerExchangeFailed"),
        ERROR_SOCKET_SEND => Some("SocketSendError"),
        ERROR_SOCKET_RECV => Some("SocketRecvError"),
        ERROR_SOCKET_DISCONNECT => Some("SocketDisconnect"),
        ERROR_TIMEOUT | ERROR_SOCKET_TIMEOUT => Some("TimedOut"),
        _ => None,
    }
}
