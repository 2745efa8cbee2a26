//! Jira integration for ticket-check
//!
//! Runs one search query against the tracker's REST search endpoint and
//! returns the keys of every matching issue.
//!
//! Authentication is HTTP basic: the credential pair is only encoded, not
//! encrypted, so the tracker must be reached over TLS or a trusted network.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http;
use crate::ticket::{TicketMatcher, TicketSet};

/// Search result envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Index of the first issue in this page
    pub start_at: Option<usize>,
    /// Total number of matches; absent when the endpoint does not page
    pub total: Option<usize>,
    pub issues: Vec<Issue>,
}

/// A single issue record; only the key is of interest
#[derive(Debug, Deserialize)]
pub struct Issue {
    pub key: String,
}

pub struct JiraClient {
    http: Client,
    matcher: TicketMatcher,
}

impl JiraClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: http::build_client(config.timeout(), config.jira.accept_invalid_certs)?,
            matcher: TicketMatcher::new(&config.project)?,
        })
    }

    /// Fetch the keys of every issue matched by `query_url`
    ///
    /// Follows result pages until the reported total is reached. Either every
    /// page succeeds or nothing is returned.
    pub async fn fetch(
        &self,
        query_url: &Url,
        username: &str,
        password: &str,
    ) -> Result<TicketSet> {
        let mut tickets = TicketSet::new();
        let mut seen = 0usize;
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(query_url, username, password, seen).await?;
            pages += 1;

            if let Some(start_at) = page.start_at.filter(|&start_at| start_at != seen) {
                return Err(Error::data_integrity(
                    query_url.as_str(),
                    format!("asked for page at {} but got {}", seen, start_at),
                ));
            }

            let count = page.issues.len();
            for issue in page.issues {
                let ticket = self.matcher.canonical(&issue.key).ok_or_else(|| {
                    Error::data_integrity(
                        query_url.as_str(),
                        format!(
                            "issue key \"{}\" is not a {} ticket",
                            issue.key,
                            self.matcher.prefix()
                        ),
                    )
                })?;
                tickets.insert(ticket);
            }
            seen += count;

            match page.total {
                Some(total) if seen < total && count == 0 => {
                    return Err(Error::data_integrity(
                        query_url.as_str(),
                        format!("empty page at {} of {} issues", seen, total),
                    ));
                }
                Some(total) if seen < total => {
                    debug!("Fetched {} of {} issues", seen, total);
                }
                _ => break,
            }
        }

        info!("{} tracker tickets found ({} page(s))", tickets.len(), pages);
        Ok(tickets)
    }

    async fn fetch_page(
        &self,
        query_url: &Url,
        username: &str,
        password: &str,
        start_at: usize,
    ) -> Result<SearchResponse> {
        let mut request = self
            .http
            .get(query_url.clone())
            .basic_auth(username, Some(password))
            .header("Accept", "application/json");
        if start_at > 0 {
            request = request.query(&[("startAt", start_at)]);
        }

        let (status, body) = http::get_text(request, query_url.as_str()).await?;

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::auth_or_query(query_url.as_str(), status));
            }
            s if !s.is_success() => {
                return Err(Error::connectivity(query_url.as_str(), s));
            }
            _ => {}
        }

        parse_search_response(query_url.as_str(), &body)
    }
}

/// Parse a search envelope
///
/// A body that is not JSON at all (typically a login page served in place of
/// the API response) means the credentials or the query were rejected.
fn parse_search_response(url: &str, body: &str) -> Result<SearchResponse> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| Error::auth_or_query(url, e))?;
    serde_json::from_value(value).map_err(|e| Error::data_integrity(url, e))
}
