use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Issue tracker rejected the request to {url}: {detail}")]
    AuthOrQuery { url: String, detail: String },

    #[error("Could not reach {url}: {detail}")]
    Connectivity { url: String, detail: String },

    #[error("Unexpected response from {url}: {detail}")]
    DataIntegrity { url: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User cancelled operation")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl Error {
    pub(crate) fn auth_or_query(url: impl Into<String>, detail: impl ToString) -> Self {
        Error::AuthOrQuery {
            url: url.into(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn connectivity(url: impl Into<String>, detail: impl ToString) -> Self {
        Error::Connectivity {
            url: url.into(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn data_integrity(url: impl Into<String>, detail: impl ToString) -> Self {
        Error::DataIntegrity {
            url: url.into(),
            detail: detail.to_string(),
        }
    }

    /// What the user should look at next, if there is anything to suggest
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::AuthOrQuery { .. } => Some("Check your tracker credentials or the query string"),
            Error::Connectivity { .. } => {
                Some("Check that the service is up and that you are on the VPN")
            }
            Error::DataIntegrity { .. } => {
                Some("The service answered with an unexpected document shape")
            }
            Error::Config(_) | Error::Yaml(_) => Some("Check the configuration file"),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
