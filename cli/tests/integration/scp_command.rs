//! Integration tests for `appctl scp`.
//!
//! Every test points `APPCTL_CONFIG` at a temp file and clears the server and
//! namespace variables so the host environment cannot leak in. Lookups that
//! must succeed are served by a one-shot HTTP stub on localhost.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn config_path(&self) -> String {
        self.dir
            .path()
            .join("config.yaml")
            .to_string_lossy()
            .into_owned()
    }

    fn write_config(&self, yaml: &str) {
        std::fs::write(self.config_path(), yaml).expect("write config");
    }

    fn touch(&self, name: &str) {
        std::fs::write(self.dir.path().join(name), b"hello").expect("write file");
    }

    fn appctl(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("appctl"));
        cmd.current_dir(self.dir.path())
            .env("NO_COLOR", "1")
            .env("APPCTL_CONFIG", self.config_path())
            .env_remove("APPCTL_SERVER")
            .env_remove("APPCTL_NAMESPACE")
            .env_remove("APPCTL_LOG");
        cmd
    }
}

/// Serves a single HTTP response and returns the server URL.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("read");
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).expect("read") == 0 || line == "\r\n" {
                break;
            }
        }
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .expect("write");
        request_line
    });
    (url, handle)
}

const APP_BODY: &str =
    r#"{"status":"ok","data":{"name":"app1","ssh_url":"ssh://fakeuuidfortestsapp1@127.0.0.1"}}"#;

// --- Usage ---

#[test]
fn test_scp_without_operands_prints_usage_and_exits_one() {
    let sandbox = Sandbox::new();
    sandbox
        .appctl()
        .arg("scp")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("appctl scp"));
}

#[test]
fn test_scp_with_partial_operands_prints_usage() {
    let sandbox = Sandbox::new();
    sandbox
        .appctl()
        .args(["scp", "app1", "upload"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage:"));
}

// --- Argument validation ---

#[test]
fn test_scp_invalid_direction() {
    let sandbox = Sandbox::new();
    sandbox.touch("file.txt");
    sandbox
        .appctl()
        .args(["scp", "app1", "invalid_command", "file.txt", "app-root/data"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "'invalid_command' is not a valid argument for this command. Please use upload or download.",
        ));
}

#[test]
fn test_scp_invalid_direction_reported_before_broken_config() {
    let sandbox = Sandbox::new();
    sandbox.touch("file.txt");
    sandbox.write_config("server: [unclosed\n");
    sandbox
        .appctl()
        .args(["scp", "app1", "Upload", "file.txt", "app-root/data"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "'Upload' is not a valid argument for this command.",
        ))
        .stderr(predicate::str::contains("config.yaml").not());
}

#[test]
fn test_scp_missing_local_file_reported_before_broken_config() {
    let sandbox = Sandbox::new();
    sandbox.write_config("server: [unclosed\n");
    sandbox
        .appctl()
        .args(["scp", "app1", "upload", "file.txt", "app-root/data"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Local file, file_path, or directory could not be found.",
        ));
}

#[test]
fn test_scp_missing_local_file() {
    let sandbox = Sandbox::new();
    sandbox
        .appctl()
        .args(["scp", "app1", "upload", "file.txt", "app-root/data"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Local file, file_path, or directory could not be found.",
        ));
}

#[test]
fn test_scp_download_checks_local_destination() {
    let sandbox = Sandbox::new();
    sandbox
        .appctl()
        .args(["scp", "app1", "download", "app-root/data/file.txt", "missing-dir"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not be found"));
}

#[test]
fn test_scp_without_server_reports_configuration_hint() {
    let sandbox = Sandbox::new();
    sandbox.touch("file.txt");
    sandbox
        .appctl()
        .args(["scp", "app1", "upload", "file.txt", "app-root/data"])
        .args(["--namespace", "ns"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No application server configured"));
}

// --- Lookup ---

#[test]
fn test_scp_unknown_application() {
    let sandbox = Sandbox::new();
    sandbox.touch("file.txt");
    let (url, server) = serve_once("404 Not Found", r#"{"status":"not_found"}"#);

    sandbox
        .appctl()
        .args(["scp", "nosuchapp", "upload", "file.txt", "app-root/data"])
        .args(["--server", &url, "--namespace", "ns"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Application 'nosuchapp' not found."));

    let request = server.join().expect("server thread");
    assert!(
        request.starts_with("GET /broker/rest/domain/ns/application/nosuchapp "),
        "got: {request}"
    );
}

// --- Custom ssh executable ---

#[test]
fn test_scp_custom_ssh_prints_manual_upload_command() {
    let sandbox = Sandbox::new();
    sandbox.touch("file.txt");
    sandbox.write_config("ssh: /usr/bin/ssh\nnamespace: ns\n");
    let (url, server) = serve_once("200 OK", APP_BODY);

    let expected = if cfg!(windows) {
        "On Windows, file transfers"
    } else {
        "scp -S /usr/bin/ssh file.txt 'fakeuuidfortestsapp1@127.0.0.1:app-root/data'"
    };

    sandbox
        .appctl()
        .args(["scp", "app1", "upload", "file.txt", "app-root/data"])
        .args(["--server", &url])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("User specified a ssh executable"))
        .stdout(predicate::str::contains("/usr/bin/ssh"))
        .stdout(predicate::str::contains(expected));

    server.join().expect("server thread");
}

#[test]
#[cfg(not(windows))]
fn test_scp_custom_ssh_prints_manual_download_command() {
    let sandbox = Sandbox::new();
    sandbox.write_config("ssh: /usr/bin/ssh\nnamespace: ns\n");
    let (url, server) = serve_once("200 OK", APP_BODY);

    sandbox
        .appctl()
        .args(["scp", "app1", "download", "app-root/data/file.txt", "."])
        .args(["--server", &url])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "scp -S /usr/bin/ssh 'fakeuuidfortestsapp1@127.0.0.1:app-root/data/file.txt' .",
        ));
    server.join().expect("server thread");
}
