//! Ticket references and their canonical form
//!
//! Commit messages refer to tickets inconsistently (`HG-1234`, `HG 1234`,
//! `hg1234`). Everything is normalized to `<PREFIX>-<digits>` before sets from
//! different services are compared.
//!
//! The prefix is matched anywhere in the text, so a word that merely ends in
//! the prefix and is followed by digits (`thg 12` with prefix `HG`) is also
//! reported. This is an accepted limitation.

use std::collections::BTreeSet;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    static ref PROJECT_KEY: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap();
}

/// A ticket identifier in canonical `<PREFIX>-<digits>` form (e.g. `HG-3323`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketId(String);

impl TicketId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of canonical ticket ids; ordered so reports come out stable
pub type TicketSet = BTreeSet<TicketId>;

/// Finds references to one project's tickets
#[derive(Debug, Clone)]
pub struct TicketMatcher {
    prefix: String,
    reference: Regex,
    key: Regex,
}

impl TicketMatcher {
    /// Build a matcher for `prefix`; the uppercased prefix is the canonical casing
    pub fn new(prefix: &str) -> Result<Self> {
        let prefix = prefix.trim();
        if !PROJECT_KEY.is_match(prefix) {
            return Err(Error::Config(format!(
                "\"{}\" is not a valid project prefix (e.g., HG)",
                prefix
            )));
        }

        let escaped = regex::escape(prefix);
        let reference = Regex::new(&format!(r"(?i){}[\s-]?([0-9]+)", escaped))
            .map_err(|e| Error::Config(e.to_string()))?;
        let key = Regex::new(&format!(r"(?i)^{}-([0-9]+)$", escaped))
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            prefix: prefix.to_uppercase(),
            reference,
            key,
        })
    }

    /// The canonical (uppercase) prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Extract the first ticket reference from free text
    /// (e.g., "hg 42: fix login" -> "HG-42")
    pub fn extract(&self, text: &str) -> Option<TicketId> {
        let captures = self.reference.captures(text)?;
        Some(self.make_id(&captures[1]))
    }

    /// Extract one reference per message and collect the distinct ones
    pub fn extract_all<'a, I>(&self, messages: I) -> TicketSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        messages
            .into_iter()
            .filter_map(|message| self.extract(message))
            .collect()
    }

    /// Accept an already well-formed key (as the tracker reports it), nothing else
    pub fn canonical(&self, key: &str) -> Option<TicketId> {
        let captures = self.key.captures(key.trim())?;
        Some(self.make_id(&captures[1]))
    }

    fn make_id(&self, digits: &str) -> TicketId {
        TicketId(format!("{}-{}", self.prefix, digits))
    }
}
