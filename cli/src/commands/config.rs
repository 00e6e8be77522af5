//! `appctl config`: show and set configuration values.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set configuration value (an empty value clears it)
    Set {
        /// Configuration key: server, namespace, token, ssh
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written, or the key
/// or value is invalid.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Set { key, value } => set_config(app, &key, &value),
    }
}

fn show_config(app: &AppContext) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let path = app.config_store.path()?;
    let unset = "(not set)";

    app.output.kv("file     ", &path.display().to_string());
    app.output.kv("server   ", config.server.as_deref().unwrap_or(unset));
    app.output.kv("namespace", config.namespace.as_deref().unwrap_or(unset));
    app.output.kv("token    ", if config.token.is_some() { "********" } else { unset });
    app.output.kv("ssh      ", config.ssh.as_deref().unwrap_or(unset));
    Ok(ExitCode::SUCCESS)
}

fn set_config(app: &AppContext, key: &str, value: &str) -> Result<ExitCode> {
    config_service::set_value(&app.config_store, key, value)?;

    let shown = if key == "token" && !value.is_empty() { "********" } else { value };
    app.output.success(&format!("Set {key} = {shown}"));
    Ok(ExitCode::SUCCESS)
}
