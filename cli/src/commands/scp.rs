//! `appctl scp`: copy a file or directory to or from an application.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, CommandFactory as _};

use crate::app::AppContext;
use crate::application::services::scp::{
    ScpInvocation, ScpOutcome, complete_request, prepare_request,
};
use crate::domain::scp::{Direction, ManualTransfer};
use crate::infra::broker::BrokerDirectory;
use crate::infra::fs::HostFs;
use crate::infra::platform::HostPlatform;
use crate::infra::transport::Ssh2Transport;

/// Arguments for the scp command.
///
/// Positionals are optional so a bare `appctl scp` can print usage to stdout.
#[derive(Args, Debug)]
pub struct ScpArgs {
    /// Application name
    pub application: Option<String>,

    /// Transfer direction: upload or download
    pub direction: Option<String>,

    /// Source path (local for upload, remote for download)
    pub source: Option<String>,

    /// Destination path (remote for upload, local for download)
    pub destination: Option<String>,

    /// Namespace the application belongs to
    #[arg(short, long, env = "APPCTL_NAMESPACE")]
    pub namespace: Option<String>,

    /// Application server URL
    #[arg(long, env = "APPCTL_SERVER")]
    pub server: Option<String>,
}

/// Run `appctl scp <application> <upload|download> <source> <destination>`.
///
/// Returns exit code 1 when usage is printed or a custom ssh executable
/// redirects the user to a manual command.
///
/// # Errors
///
/// Returns an error for invalid arguments, a missing local path, a failed
/// application lookup or a classified transfer failure.
pub fn run(app: &AppContext, args: ScpArgs) -> Result<ExitCode> {
    let (Some(application), Some(direction), Some(source), Some(destination)) = (
        args.application.as_deref(),
        args.direction.as_deref(),
        args.source.as_deref(),
        args.destination.as_deref(),
    ) else {
        print_usage();
        return Ok(ExitCode::FAILURE);
    };

    let invocation = ScpInvocation {
        application,
        direction,
        first: source,
        second: destination,
    };
    let request = prepare_request(&invocation, &HostFs)?;

    let config = app.config()?;
    let directory =
        BrokerDirectory::from_config(&config, args.server.as_deref(), args.namespace.as_deref());
    let outcome = complete_request(
        request,
        &directory,
        &config,
        &HostPlatform,
        &Ssh2Transport::default(),
    )?;

    match outcome {
        ScpOutcome::Transferred(request) => {
            let remote = format!("{}:{}", request.application, request.remote_path);
            let msg = match request.direction {
                Direction::Upload => format!("Uploaded {} to {remote}", request.local_path),
                Direction::Download => format!("Downloaded {remote} to {}", request.local_path),
            };
            app.output.success(&msg);
            Ok(ExitCode::SUCCESS)
        }
        ScpOutcome::ManualTransfer(manual) => {
            show_manual_transfer(app, &manual);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn show_manual_transfer(app: &AppContext, manual: &ManualTransfer) {
    let lines = manual.lines();
    let Some((first, rest)) = lines.split_first() else {
        return;
    };
    app.output.warn(first);
    for line in rest {
        app.output.command(line);
    }
}

fn print_usage() {
    let mut cmd = crate::cli::Cli::command();
    if let Some(scp) = cmd.find_subcommand_mut("scp") {
        let help = scp.clone().bin_name("appctl scp").render_help();
        println!("{help}");
    }
}
