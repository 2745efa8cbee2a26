//! Configuration management for ticket-check
//!
//! The configuration is a YAML file, by default `~/.config/ticket-check/config.yaml`.
//! It is loaded once and handed to the correlator as a plain value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::ticket::{TicketId, TicketMatcher};

/// The name of the package, used for config directory naming
const PKG_NAME: &str = "ticket-check";

const DEFAULT_QUERY: &str =
    "(reporter={user} or assignee={user} or verifier={user}) and project={project} and status=resolved";

/// Get the default path to the configuration file
///
/// Returns `~/.config/ticket-check/config.yaml`.
pub fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| Error::Config("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join(PKG_NAME)
        .join("config.yaml"))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project prefix of the tickets, e.g. `HG`
    pub project: String,
    /// Search expression with `{project}` and `{user}` placeholders
    #[serde(default = "default_query")]
    pub query: String,
    /// Per-request timeout in seconds, applied to every outbound call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub jira: JiraConfig,
    pub jenkins: JenkinsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JiraConfig {
    /// REST search endpoint, e.g. `https://jira.example.com/rest/api/latest/search`
    pub rest_url: String,
    /// Human-browsable ticket prefix, e.g. `https://jira.example.com/browse/`
    pub browse_url: String,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JenkinsConfig {
    /// Job URLs, e.g. `https://ci.example.com/job/Server-QE`
    #[serde(default)]
    pub jobs: Vec<String>,
    /// Skip certificate checks for the CI server only
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Upper bound on build-detail requests in flight per job
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    8
}

impl Config {
    /// Load and validate the configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config(format!(
                "configuration file not found at {}",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the correlator cannot work with
    pub fn validate(&self) -> Result<()> {
        TicketMatcher::new(&self.project)?;

        parse_url("jira.rest_url", &self.jira.rest_url)?;
        parse_url("jira.browse_url", &self.jira.browse_url)?;
        for job in &self.jenkins.jobs {
            parse_url("jenkins.jobs", job)?;
        }

        if self.jenkins.max_concurrent == 0 {
            return Err(Error::Config(
                "jenkins.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        if self.jenkins.jobs.is_empty() {
            warn!("No CI jobs configured; no ticket can be reported as ready");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The search expression for `user`
    pub fn query(&self, user: &str) -> String {
        self.query
            .replace("{project}", &self.project.trim().to_uppercase())
            .replace("{user}", user)
    }

    /// The tracker search URL for `user`, with the query URL-encoded as `jql`
    pub fn query_url(&self, user: &str) -> Result<Url> {
        let mut url = parse_url("jira.rest_url", &self.jira.rest_url)?;
        url.query_pairs_mut().append_pair("jql", &self.query(user));
        Ok(url)
    }

    /// Link a person can open for `ticket`
    pub fn browse_url(&self, ticket: &TicketId) -> String {
        format!("{}{}", self.jira.browse_url, ticket)
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::Config(format!("{}: \"{}\" ({})", field, value, e)))
}
