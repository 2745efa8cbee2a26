//! Correlation of tracker tickets with CI build history
//!
//! One pass fetches the user's resolved tickets and the tickets referenced by
//! CI builds, then intersects them. Passes share no state: every pass asks
//! both services again.

use std::fmt;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::jenkins::{JenkinsClient, JobEndpoint};
use crate::jira::JiraClient;
use crate::ticket::TicketSet;

/// Tracker login
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Outcome of one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Tickets the tracker query returned
    pub tracker: TicketSet,
    /// Tickets referenced anywhere in CI build history
    pub builds: TicketSet,
    /// Tickets present in both
    pub ready: TicketSet,
}

impl Reconciliation {
    pub fn new(tracker: TicketSet, builds: TicketSet) -> Self {
        let ready = tracker.intersection(&builds).cloned().collect();
        Self {
            tracker,
            builds,
            ready,
        }
    }
}

pub struct Correlator {
    config: Config,
    jobs: Vec<JobEndpoint>,
    jira: JiraClient,
    jenkins: JenkinsClient,
}

impl Correlator {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let jobs = config
            .jenkins
            .jobs
            .iter()
            .map(|job| JobEndpoint::parse(job))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            jira: JiraClient::new(&config)?,
            jenkins: JenkinsClient::new(&config)?,
            jobs,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one pass
    ///
    /// Both services are queried concurrently and the intersection is taken
    /// once both have answered. The first failure on either side ends the
    /// pass and drops the other side's outstanding requests, so a failing CI
    /// job is fatal even when the tracker reports no tickets.
    pub async fn reconcile(&self, credentials: &Credentials) -> Result<Reconciliation> {
        let query_url = self.config.query_url(&credentials.username)?;

        let (tracker, builds) = tokio::try_join!(
            self.jira
                .fetch(&query_url, &credentials.username, &credentials.password),
            self.jenkins.fetch(&self.jobs),
        )?;

        if tracker.is_empty() {
            info!("No tickets assigned to \"{}\" by that query", credentials.username);
        }
        Ok(Reconciliation::new(tracker, builds))
    }

    /// Run passes until `after_pass` returns `false`; returns the number of passes
    ///
    /// `after_pass` sees every result and decides whether to check again.
    pub async fn run_until_declined<F>(
        &self,
        credentials: &Credentials,
        mut after_pass: F,
    ) -> Result<usize>
    where
        F: FnMut(&Reconciliation) -> Result<bool>,
    {
        let mut passes = 0;
        loop {
            let result = self.reconcile(credentials).await?;
            passes += 1;

            if !after_pass(&result)? {
                return Ok(passes);
            }
        }
    }
}
