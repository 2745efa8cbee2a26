//! # ticket-check
//!
//! Lists the resolved tracker tickets whose changes have already shown up in
//! CI build history.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod jenkins;
pub mod jira;
pub mod reconcile;
pub mod ticket;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use reconcile::{Correlator, Credentials, Reconciliation};
pub use ticket::{TicketId, TicketMatcher, TicketSet};
