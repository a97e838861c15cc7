//! Document sources
//!
//! A source is decided once, when configuration is read: `http`/`https`
//! locations are fetched, anything else is read from disk.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// User agent sent with remote fetches
pub const USER_AGENT: &str = concat!("catalog-sync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source location is empty")]
    Empty,

    #[error("Failed to fetch {url}")]
    Fetch {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl FromStr for Source {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SourceError::Empty);
        }
        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Source::Remote(url)),
            _ => Ok(Source::Local(PathBuf::from(s))),
        }
    }
}

impl TryFrom<String> for Source {
    type Error = SourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => write!(f, "{}", url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Source {
    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Remote(_))
    }
}

/// Reads sources. Remote fetches block and are never retried.
pub struct Fetcher {
    http: reqwest::blocking::Client,
}

impl Fetcher {
    /// `timeout` of `None` waits as long as the server takes
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http })
    }

    /// Returns the raw bytes of a source
    pub fn read(&self, source: &Source) -> Result<Vec<u8>, SourceError> {
        match source {
            Source::Remote(url) => self.fetch(url),
            Source::Local(path) => fs::read(path).map_err(|source| SourceError::Read {
                path: path.clone(),
                source,
            }),
        }
    }

    fn fetch(&self, url: &Url) -> Result<Vec<u8>, SourceError> {
        let to_error = |source| SourceError::Fetch {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .get(url.as_str())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(to_error)?;
        let body = response.bytes().map_err(to_error)?;

        Ok(body.to_vec())
    }
}
