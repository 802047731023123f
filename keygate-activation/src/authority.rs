//! Authority sources deciding which keys may be activated.
//!
//! The authority list is fetched fresh for every activation and never
//! persisted. Sources implement [`AuthoritySource`]; the HTTP source is
//! behind the `online` feature.

use crate::error::ActivationResult;
use async_trait::async_trait;
use std::collections::HashSet;

#[cfg(feature = "online")]
use crate::error::ActivationError;
#[cfg(feature = "online")]
use std::time::Duration;
#[cfg(feature = "online")]
use tracing::{debug, warn};

/// Default timeout for a remote authority fetch.
#[cfg(feature = "online")]
pub const DEFAULT_AUTHORITY_TIMEOUT: Duration = Duration::from_secs(10);

/// The set of keys eligible for first-time activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityList {
    /// Only the listed keys are eligible.
    Listed(HashSet<String>),
    /// Every key is eligible.
    Unrestricted,
}

impl AuthorityList {
    /// Returns true if `key` may be activated.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        match self {
            Self::Listed(keys) => keys.contains(key),
            Self::Unrestricted => true,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for AuthorityList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Listed(iter.into_iter().map(Into::into).collect())
    }
}

/// Parses a newline-separated key list. Lines are trimmed; blank lines are skipped.
#[must_use]
pub fn parse_authority_list(body: &str) -> HashSet<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// A provider of the authority list.
#[async_trait]
pub trait AuthoritySource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetches the current authority list.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ActivationError::AuthorityUnavailable`] if the list
    /// cannot be obtained.
    async fn fetch(&self) -> ActivationResult<AuthorityList>;
}

/// A fixed, in-memory authority list.
#[derive(Debug, Clone)]
pub struct StaticAuthority {
    keys: HashSet<String>,
}

impl StaticAuthority {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl AuthoritySource for StaticAuthority {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> ActivationResult<AuthorityList> {
        Ok(AuthorityList::Listed(self.keys.clone()))
    }
}

/// Accepts every key: a key becomes valid on first use.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAuthority;

#[async_trait]
impl AuthoritySource for OpenAuthority {
    fn name(&self) -> &str {
        "open"
    }

    async fn fetch(&self) -> ActivationResult<AuthorityList> {
        Ok(AuthorityList::Unrestricted)
    }
}

/// Fetches a newline-separated key list from a remote URL on every call.
#[cfg(feature = "online")]
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "online")]
impl HttpAuthority {
    /// Creates a source for `url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> ActivationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ActivationError::AuthorityUnavailable(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Returns the configured URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(feature = "online")]
#[async_trait]
impl AuthoritySource for HttpAuthority {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> ActivationResult<AuthorityList> {
        debug!("Fetching authority list from {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            warn!("Authority request to {} failed: {}", self.url, e);
            ActivationError::AuthorityUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Authority {} returned {}", self.url, status);
            return Err(ActivationError::AuthorityUnavailable(format!(
                "authority returned status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ActivationError::AuthorityUnavailable(e.to_string()))?;

        let keys = parse_authority_list(&body);
        debug!("Authority list has {} keys", keys.len());
        Ok(AuthorityList::Listed(keys))
    }
}
