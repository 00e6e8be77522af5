//! Application broker client: implements the `ApplicationDirectory` port
//! over the broker's REST API.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::ApplicationDirectory;
use crate::domain::config::AppConfig;
use crate::domain::error::{ConfigError, ScpError};
use crate::domain::scp::SshEndpoint;

/// Timeout for a single broker request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ApplicationResponse {
    data: ApplicationData,
}

#[derive(Debug, Deserialize)]
struct ApplicationData {
    ssh_url: String,
}

/// Resolves applications through `GET <server>/broker/rest/domain/<ns>/application/<app>`.
///
/// Missing settings are reported when a lookup is attempted, not at
/// construction, so argument validation still runs first.
pub struct BrokerDirectory {
    server: Option<String>,
    namespace: Option<String>,
    token: Option<String>,
    agent: ureq::Agent,
}

impl BrokerDirectory {
    /// Builds a directory from config, with optional command-line overrides.
    #[must_use]
    pub fn from_config(
        config: &AppConfig,
        server: Option<&str>,
        namespace: Option<&str>,
    ) -> Self {
        Self {
            server: server
                .map(str::to_string)
                .or_else(|| config.server.clone())
                .map(|s| s.trim_end_matches('/').to_string()),
            namespace: namespace.map(str::to_string).or_else(|| config.namespace.clone()),
            token: config.token.clone(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    fn application_url(&self, application: &str) -> Result<String> {
        let server = self.server.as_deref().ok_or(ConfigError::MissingServer)?;
        let namespace = self.namespace.as_deref().ok_or(ConfigError::MissingNamespace)?;
        anyhow::ensure!(
            !application.is_empty() && !application.contains('/'),
            "invalid application name: {application:?}"
        );
        Ok(format!(
            "{server}/broker/rest/domain/{namespace}/application/{application}"
        ))
    }
}

impl ApplicationDirectory for BrokerDirectory {
    fn ssh_endpoint(&self, application: &str) -> Result<SshEndpoint> {
        let url = self.application_url(application)?;
        tracing::debug!(%url, "looking up application");

        let mut request = self.agent.get(&url).set("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let body = match request.call() {
            Ok(response) => response
                .into_string()
                .context("cannot read application server response")?,
            Err(ureq::Error::Status(404, _)) => {
                return Err(ScpError::ApplicationNotFound(application.to_string()).into());
            }
            Err(ureq::Error::Status(code, _)) => {
                anyhow::bail!("application lookup for '{application}' failed: HTTP {code}")
            }
            Err(e) => {
                return Err(anyhow::Error::new(e))
                    .with_context(|| format!("cannot reach application server at {url}"));
            }
        };

        parse_application(&body)
            .with_context(|| format!("unexpected response for application '{application}'"))
    }
}

/// Extracts the SSH endpoint from an application response body.
///
/// # Errors
///
/// Returns an error if the body is not valid JSON or the `ssh_url` is malformed.
pub fn parse_application(body: &str) -> Result<SshEndpoint> {
    let response: ApplicationResponse =
        serde_json::from_str(body).context("cannot parse application response")?;
    SshEndpoint::from_ssh_url(&response.data.ssh_url)
}
