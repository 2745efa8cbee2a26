//! Jenkins integration for ticket-check
//!
//! Walks job -> builds -> change sets through the Jenkins JSON API and
//! collects every ticket referenced by a change message.
//!
//! A partial walk would under-report tickets, so any failure (unreachable
//! server, non-success status, unexpected document) aborts the whole fetch.

use std::fmt;

use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http;
use crate::ticket::{TicketMatcher, TicketSet};

const INDEX_TREE: &str = "builds[number,url]";
const DETAIL_TREE: &str = "changeSet[items[msg]],changeSets[items[msg]]";

/// A CI job, addressed by its URL (e.g. `https://ci.example.com/job/Server-QE`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEndpoint(Url);

impl JobEndpoint {
    pub fn parse(url: &str) -> Result<Self> {
        Url::parse(url)
            .map(Self)
            .map_err(|e| Error::Config(format!("invalid job URL \"{}\": {}", url, e)))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for JobEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// One build of a job, as listed by the job index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReference {
    pub number: Option<u64>,
    pub url: Url,
}

#[derive(Debug, Deserialize)]
struct JobIndex {
    builds: Vec<BuildEntry>,
}

#[derive(Debug, Deserialize)]
struct BuildEntry {
    number: Option<u64>,
    url: String,
}

/// Freestyle jobs report one `changeSet`, pipelines a `changeSets` list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildDetail {
    change_set: Option<ChangeSet>,
    change_sets: Option<Vec<ChangeSet>>,
}

#[derive(Debug, Deserialize)]
struct ChangeSet {
    items: Vec<ChangeItem>,
}

#[derive(Debug, Deserialize)]
struct ChangeItem {
    msg: String,
}

impl BuildDetail {
    fn messages(&self) -> Option<Vec<&str>> {
        let sets: Vec<&ChangeSet> = match (&self.change_set, &self.change_sets) {
            (None, None) => return None,
            (one, many) => one.iter().chain(many.iter().flatten()).collect(),
        };

        Some(
            sets.into_iter()
                .flat_map(|set| set.items.iter())
                .map(|item| item.msg.as_str())
                .collect(),
        )
    }
}

pub struct JenkinsClient {
    http: Client,
    matcher: TicketMatcher,
    max_concurrent: usize,
}

impl JenkinsClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: http::build_client(config.timeout(), config.jenkins.accept_invalid_certs)?,
            matcher: TicketMatcher::new(&config.project)?,
            max_concurrent: config.jenkins.max_concurrent.max(1),
        })
    }

    /// Collect the tickets referenced by every build of every job
    ///
    /// Jobs are walked in order; the first failure ends the walk.
    pub async fn fetch(&self, jobs: &[JobEndpoint]) -> Result<TicketSet> {
        let mut tickets = TicketSet::new();
        for job in jobs {
            tickets.extend(self.fetch_job(job).await?);
        }

        info!("{} tickets found on CI", tickets.len());
        Ok(tickets)
    }

    /// Collect the tickets referenced by every build of one job
    ///
    /// Build details are fetched concurrently, at most `max_concurrent` at a
    /// time. Each build yields its own set and the sets are merged as they
    /// complete; on the first error the remaining requests are dropped.
    pub async fn fetch_job(&self, job: &JobEndpoint) -> Result<TicketSet> {
        info!("Checking {}...", job);

        let builds = self.build_index(job).await?;
        debug!("{} builds listed for {}", builds.len(), job);

        let tickets = stream::iter(builds)
            .map(|build| async move { self.fetch_build(&build).await })
            .buffer_unordered(self.max_concurrent)
            .try_fold(TicketSet::new(), |mut acc, found| async move {
                acc.extend(found);
                Ok(acc)
            })
            .await?;

        debug!("{} tickets referenced by {}", tickets.len(), job);
        Ok(tickets)
    }

    /// List the builds a job reports, newest first as Jenkins orders them
    pub async fn build_index(&self, job: &JobEndpoint) -> Result<Vec<BuildReference>> {
        let url = api_url(job.url());
        let index: JobIndex = self.get_json(url, INDEX_TREE).await?;

        index
            .builds
            .into_iter()
            .map(|entry| {
                let url = job.url().join(&entry.url).map_err(|e| {
                    Error::data_integrity(
                        job.url().as_str(),
                        format!("build URL \"{}\": {}", entry.url, e),
                    )
                })?;
                Ok(BuildReference {
                    number: entry.number,
                    url,
                })
            })
            .collect()
    }

    /// Tickets referenced by the change messages of one build
    pub async fn fetch_build(&self, build: &BuildReference) -> Result<TicketSet> {
        let url = api_url(&build.url);
        let label = url.to_string();
        let detail: BuildDetail = self.get_json(url, DETAIL_TREE).await?;

        let messages = detail
            .messages()
            .ok_or_else(|| Error::data_integrity(label, "no changeSet or changeSets field"))?;

        Ok(self.matcher.extract_all(messages))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, tree: &str) -> Result<T> {
        let label = url.to_string();
        let request = self
            .http
            .get(url)
            .query(&[("tree", tree)])
            .header("Accept", "application/json");

        let (status, body) = http::get_text(request, &label).await?;
        if !status.is_success() {
            return Err(Error::connectivity(label, status));
        }

        serde_json::from_str(&body).map_err(|e| Error::data_integrity(label, e))
    }
}

/// `<resource>/api/json`, tolerating a trailing slash on the resource URL
fn api_url(resource: &Url) -> Url {
    let mut url = resource.clone();
    url.set_query(None);
    url.set_fragment(None);

    let path = format!("{}/api/json", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url
}
