//! Configuration types for the zonesync system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default API host of the Robot web interface
pub const DEFAULT_API_ENDPOINT: &str = "https://robot.your-server.de";

/// Default host of the account login flow
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://accounts.hetzner.com";

/// Default record TTL when the front-end does not supply one
pub const DEFAULT_TTL: u32 = 3600;

/// Main zonesync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Provider account and behaviour switches
    pub provider: ProviderConfig,

    /// Retry budgets and sleeps
    #[serde(default)]
    pub timing: TimingConfig,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()
    }
}

/// Provider configuration
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Account user name
    pub auth_username: String,

    /// Account password
    pub auth_password: String,

    /// Follow an existing CNAME chain and edit the record at its tip
    #[serde(default = "default_true")]
    pub concatenate: bool,

    /// Wait until the change is visible on the authoritative nameservers
    #[serde(default = "default_true")]
    pub propagated: bool,

    /// Live test mode. `None` is production.
    #[serde(default)]
    pub live_tests: Option<bool>,

    /// API host
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Login host
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("auth_username", &self.auth_username)
            .field("auth_password", &"<REDACTED>")
            .field("concatenate", &self.concatenate)
            .field("propagated", &self.propagated)
            .field("live_tests", &self.live_tests)
            .field("api_endpoint", &self.api_endpoint)
            .field("auth_endpoint", &self.auth_endpoint)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a production configuration for the given account
    pub fn new(auth_username: impl Into<String>, auth_password: impl Into<String>) -> Self {
        Self {
            auth_username: auth_username.into(),
            auth_password: auth_password.into(),
            concatenate: true,
            propagated: true,
            live_tests: None,
            api_endpoint: default_api_endpoint(),
            auth_endpoint: default_auth_endpoint(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.auth_username.is_empty() {
            return Err(crate::Error::config("auth_username is required"));
        }
        if self.auth_password.is_empty() {
            return Err(crate::Error::config("auth_password is required"));
        }
        if self.api_endpoint.is_empty() || self.auth_endpoint.is_empty() {
            return Err(crate::Error::config("endpoints cannot be empty"));
        }
        Ok(())
    }

    /// Whether closing a session performs the logout request
    ///
    /// Live test runs keep the session so repeated tests can reuse it.
    pub fn logout_on_close(&self) -> bool {
        self.live_tests.is_none()
    }

    /// Whether a confirmed zone submit is followed by the settle delay
    pub fn settle_after_submit(&self) -> bool {
        self.live_tests != Some(false)
    }

    /// Set the CNAME concatenation switch
    pub fn with_concatenate(mut self, concatenate: bool) -> Self {
        self.concatenate = concatenate;
        self
    }

    /// Set the propagation check switch
    pub fn with_propagated(mut self, propagated: bool) -> Self {
        self.propagated = propagated;
        self
    }

    /// Set the live test mode
    pub fn with_live_tests(mut self, live_tests: Option<bool>) -> Self {
        self.live_tests = live_tests;
        self
    }

    /// Point the provider at other hosts
    pub fn with_endpoints(
        mut self,
        api_endpoint: impl Into<String>,
        auth_endpoint: impl Into<String>,
    ) -> Self {
        self.api_endpoint = api_endpoint.into().trim_end_matches('/').to_string();
        self.auth_endpoint = auth_endpoint.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

/// Retry budgets and sleeps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Attempts per HTTP call on connection-level failures
    #[serde(default = "default_transport_attempts")]
    pub transport_attempts: usize,

    /// Delay between transport attempts (in seconds)
    #[serde(default = "default_transport_backoff_secs")]
    pub transport_backoff_secs: u64,

    /// Backend processing time granted after a confirmed submit (in seconds)
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// DNS polls before propagation is reported as not confirmed
    #[serde(default = "default_propagation_attempts")]
    pub propagation_attempts: usize,

    /// Delay between propagation polls (in seconds)
    #[serde(default = "default_propagation_interval_secs")]
    pub propagation_interval_secs: u64,
}

impl TimingConfig {
    /// No sleeps at all, for tests and dry runs
    pub fn immediate() -> Self {
        Self {
            transport_backoff_secs: 0,
            settle_delay_secs: 0,
            propagation_interval_secs: 0,
            ..Self::default()
        }
    }

    /// Delay between transport attempts
    pub fn transport_backoff(&self) -> Duration {
        Duration::from_secs(self.transport_backoff_secs)
    }

    /// Backend processing time after a confirmed submit
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    /// Delay between propagation polls
    pub fn propagation_interval(&self) -> Duration {
        Duration::from_secs(self.propagation_interval_secs)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            transport_attempts: default_transport_attempts(),
            transport_backoff_secs: default_transport_backoff_secs(),
            settle_delay_secs: default_settle_delay_secs(),
            propagation_attempts: default_propagation_attempts(),
            propagation_interval_secs: default_propagation_interval_secs(),
        }
    }
}

/// Provider action requested by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create a record
    Create,
    /// List records
    List,
    /// Update a record
    Update,
    /// Delete a record
    Delete,
}

impl std::str::FromStr for Action {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "list" => Ok(Action::List),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(crate::Error::config(format!("Unknown action: {}", other))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Create => "create",
            Action::List => "list",
            Action::Update => "update",
            Action::Delete => "delete",
        })
    }
}

/// Per-invocation options consumed from the front-end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Action to perform
    pub action: Action,

    /// Domain the record lives in (e.g. "example.com")
    pub domain: String,

    /// Record identifier (hash or raw form)
    #[serde(default)]
    pub identifier: Option<String>,

    /// Record type (e.g. "TXT")
    #[serde(default, rename = "type")]
    pub rtype: Option<String>,

    /// Record name
    #[serde(default)]
    pub name: Option<String>,

    /// Record content
    #[serde(default)]
    pub content: Option<String>,

    /// TTL for new record sets
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl RecordRequest {
    /// Create a request without any record selectors
    pub fn new(action: Action, domain: impl Into<String>) -> Self {
        Self {
            action,
            domain: domain.into().trim_end_matches('.').to_string(),
            identifier: None,
            rtype: None,
            name: None,
            content: None,
            ttl: DEFAULT_TTL,
        }
    }

    /// Set the identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the record type (upper-cased)
    pub fn with_type(mut self, rtype: impl Into<String>) -> Self {
        self.rtype = Some(rtype.into().to_ascii_uppercase());
        self
    }

    /// Set the record name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the record content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Validate the request
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.is_empty() {
            return Err(crate::Error::config("domain is required"));
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("ttl must be > 0"));
        }
        Ok(())
    }
}

/// Parse a `yes`/`no` option value
pub fn parse_toggle(value: &str) -> Result<bool, crate::Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Ok(true),
        "no" | "false" | "0" => Ok(false),
        other => Err(crate::Error::config(format!(
            "Expected 'yes' or 'no', got '{}'",
            other
        ))),
    }
}

fn default_true() -> bool {
    true
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_auth_endpoint() -> String {
    DEFAULT_AUTH_ENDPOINT.to_string()
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_transport_attempts() -> usize {
    10
}

fn default_transport_backoff_secs() -> u64 {
    1
}

fn default_settle_delay_secs() -> u64 {
    30
}

fn default_propagation_attempts() -> usize {
    20
}

fn default_propagation_interval_secs() -> u64 {
    30
}
